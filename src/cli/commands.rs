//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.
//!
//! Reports are built as strings by pure functions (`classification_report`, `overload_report`) and printed by
//! the commands, so output never interleaves with a failure halfway through.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use webidl_core::{Interface, Parameter, Type};

use crate::backend::overload::{OverloadPlan, plan_overloads};
use crate::backend::{BindingsCodegen, GenerationError, GeneratorConfig, classify};

use super::{CliError, CliResult, ExitCode};

/// Maximum interface description size (16 MB)
///
/// Larger files are rejected before they are read.
const MAX_INPUT_SIZE: u64 = 16 * 1024 * 1024;

/// Options of the `generate` command.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub output: Option<PathBuf>,
    pub search_paths: Vec<PathBuf>,
    pub runtime_path: Option<String>,
    pub format_output: bool,
}

impl GenerateOptions {
    fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::new().with_format_output(self.format_output);
        for path in &self.search_paths {
            config = config.with_search_path(path);
        }
        if let Some(runtime_path) = &self.runtime_path {
            config = config.with_runtime_path(runtime_path);
        }
        config
    }
}

// ============================================================================
// Input
// ============================================================================

/// Read and deserialize an interface description.
///
/// ## Errors
///
/// Returns an input error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_INPUT_SIZE`
/// - The contents are not a valid JSON interface description
pub fn read_interface(path: &Path) -> CliResult<Interface> {
    let display = path.display();
    let metadata = fs::metadata(path).map_err(|e| CliError::input(format!("Cannot access file '{display}': {e}")))?;
    if metadata.len() > MAX_INPUT_SIZE {
        return Err(CliError::input(format!(
            "Interface description '{}' is too large ({} bytes, max {} bytes)",
            display,
            metadata.len(),
            MAX_INPUT_SIZE
        )));
    }
    let source =
        fs::read_to_string(path).map_err(|e| CliError::input(format!("Error reading file '{display}': {e}")))?;
    serde_json::from_str(&source)
        .map_err(|e| CliError::input(format!("Invalid interface description '{display}': {e}")))
}

/// Render a generation error with its diagnostic code.
fn diagnostic(error: GenerationError) -> CliError {
    CliError::failure(format!("{:?}", miette::Report::new(error)))
}

// ============================================================================
// generate
// ============================================================================

/// Generate the binding source for the interface in `input`.
///
/// The output file is only written once generation has succeeded.
pub fn generate(input: &Path, options: &GenerateOptions) -> CliResult<ExitCode> {
    let interface = read_interface(input)?;
    let source = BindingsCodegen::new(options.config())
        .try_generate(&interface)
        .map_err(diagnostic)?;

    match &options.output {
        Some(path) => {
            fs::write(path, &source)
                .map_err(|e| CliError::failure(format!("Error writing '{}': {}", path.display(), e)))?;
            tracing::info!(interface = %interface.name, output = %path.display(), "wrote bindings");
        }
        None => print!("{source}"),
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// classify
// ============================================================================

/// Every distinct IDL type the interface mentions, in first-use order.
pub fn interface_types(interface: &Interface) -> Vec<&Type> {
    let mut used: Vec<&Type> = Vec::new();
    for attribute in interface.attributes.iter().chain(&interface.static_attributes) {
        used.push(&attribute.ty);
    }
    for function in interface.functions.iter().chain(&interface.static_functions) {
        used.push(&function.return_type);
        used.extend(function.parameters.iter().map(|p| &p.ty));
    }
    for constructor in &interface.constructors {
        used.extend(constructor.parameters.iter().map(|p| &p.ty));
    }
    used.extend(interface.constants.iter().map(|c| &c.ty));
    for dictionary in interface.dictionaries.values() {
        used.extend(dictionary.members.iter().map(|m| &m.ty));
    }

    let mut distinct: IndexMap<String, &Type> = IndexMap::new();
    for ty in used {
        distinct.entry(ty.to_string()).or_insert(ty);
    }
    distinct.into_values().collect()
}

/// One line per used type: `type -> host storage (flat|heap-tracked)`.
pub fn classification_report(interface: &Interface) -> CliResult<String> {
    let mut report = String::new();
    for ty in interface_types(interface) {
        let host = classify(ty, interface).map_err(diagnostic)?;
        let storage = if host.is_heap_tracked() { "heap-tracked" } else { "flat" };
        report.push_str(&format!("{ty} -> {host} ({storage})\n"));
    }
    Ok(report)
}

/// Print the storage classification of every type the interface in `input` uses.
pub fn classify_types(input: &Path) -> CliResult<ExitCode> {
    let interface = read_interface(input)?;
    print!("{}", classification_report(&interface)?);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// overloads
// ============================================================================

/// Plans for every overload set of the interface: regular operations, static operations, then constructors.
pub fn overload_plans(interface: &Interface) -> CliResult<Vec<OverloadPlan>> {
    let mut plans = Vec::new();
    for sets in [interface.overload_sets(), interface.static_overload_sets()] {
        for (name, functions) in sets {
            let callables: Vec<&[Parameter]> = functions.iter().map(|f| f.parameters.as_slice()).collect();
            plans.push(plan_overloads(name, &callables, interface).map_err(diagnostic)?);
        }
    }
    if !interface.constructors.is_empty() {
        let callables: Vec<&[Parameter]> = interface.constructors.iter().map(|c| c.parameters.as_slice()).collect();
        plans.push(plan_overloads("constructor", &callables, interface).map_err(diagnostic)?);
    }
    Ok(plans)
}

/// The overload plans as pretty-printed JSON.
pub fn overload_report(interface: &Interface) -> CliResult<String> {
    let plans = overload_plans(interface)?;
    serde_json::to_string_pretty(&plans).map_err(|e| CliError::failure(format!("Error serializing plans: {e}")))
}

/// Print the overload plans of the interface in `input`.
pub fn print_overloads(input: &Path) -> CliResult<ExitCode> {
    let interface = read_interface(input)?;
    println!("{}", overload_report(&interface)?);
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Tests
// ============================================================================
