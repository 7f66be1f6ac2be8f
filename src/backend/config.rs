//! Generator configuration.
//!
//! One value per generation pass, handed to the codegen facade at construction. Nothing here is global.

use std::path::PathBuf;

/// Configuration for a generation pass.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Roots that interface module paths are made relative to when emitting imports
    pub search_paths: Vec<PathBuf>,
    /// Path of the runtime support module as seen from generated code
    pub runtime_path: String,
    /// Crate-relative module that generated imports hang off
    pub module_root: String,
    /// Parse and pretty-print the generated source before returning it
    pub format_output: bool,
    /// Prepend a `// Generated by ...` header
    pub emit_header: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            runtime_path: "webidl_bindgen::runtime".to_string(),
            module_root: "crate".to_string(),
            format_output: true,
            emit_header: true,
        }
    }
}

impl GeneratorConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a search path used to relativize import paths
    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Set the runtime module path used by generated code
    pub fn with_runtime_path(mut self, path: impl Into<String>) -> Self {
        self.runtime_path = path.into();
        self
    }

    /// Set the module that imported implementation modules live under
    pub fn with_module_root(mut self, root: impl Into<String>) -> Self {
        self.module_root = root.into();
        self
    }

    /// Enable or disable parsing + pretty-printing of the output
    pub fn with_format_output(mut self, format: bool) -> Self {
        self.format_output = format;
        self
    }

    /// Enable or disable the generated-file header
    pub fn with_header(mut self, header: bool) -> Self {
        self.emit_header = header;
        self
    }
}
