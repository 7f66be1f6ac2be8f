//! Templated source emitter.
//!
//! Converters never concatenate output themselves: they bind named variables with [`SourceGenerator::set`] and
//! append template blocks in which `@name@` is replaced by the bound value. [`SourceGenerator::fork`] opens a
//! child scope that writes into the same buffer but keeps its own variables, so nested conversions cannot leak
//! bindings into their parent.
//!
//! ## Notes
//! - An `@...@` span whose name is unbound is written verbatim and reported with `tracing::error!`; templates
//!   are authored in this crate, so that always indicates a generator bug.
//! - Forks share the buffer through `Rc<RefCell<_>>`: appends from a parent and a fork interleave in call order.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A buffer for building generated source from templates.
#[derive(Debug, Clone, Default)]
pub struct SourceGenerator {
    buffer: Rc<RefCell<String>>,
    mapping: HashMap<String, String>,
}

impl SourceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `@key@` to `value` in this scope.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.mapping.insert(key.to_string(), value.into());
    }

    /// Look up a binding in this scope.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.mapping.get(key).map(String::as_str)
    }

    /// Open a child scope that inherits the current bindings and writes to the same buffer.
    pub fn fork(&self) -> SourceGenerator {
        SourceGenerator {
            buffer: Rc::clone(&self.buffer),
            mapping: self.mapping.clone(),
        }
    }

    /// Append a template, substituting bound `@key@` placeholders.
    pub fn append(&mut self, template: &str) {
        let rendered = self.render(template);
        self.buffer.borrow_mut().push_str(&rendered);
    }

    /// Append a template followed by a newline.
    pub fn appendln(&mut self, template: &str) {
        self.append(template);
        self.buffer.borrow_mut().push('\n');
    }

    /// Write a blank line
    pub fn blank_line(&mut self) {
        self.buffer.borrow_mut().push('\n');
    }

    /// Snapshot of everything written so far (by this generator and all forks).
    pub fn as_string(&self) -> String {
        self.buffer.borrow().clone()
    }

    /// Get the generated code
    pub fn finish(self) -> String {
        self.as_string()
    }

    fn render(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(start) = rest.find('@') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('@') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            let is_name = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            match self.mapping.get(key) {
                Some(value) if is_name => {
                    out.push_str(value);
                    rest = &after[end + 1..];
                }
                _ => {
                    if is_name {
                        tracing::error!(placeholder = key, "unbound template placeholder");
                    }
                    out.push('@');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}
