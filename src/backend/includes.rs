//! Import emission for generated bindings.
//!
//! Each interface names the module its implementation lives in (`module_path`, e.g.
//! `src/web/DOM/Node`). Generated code imports that module for the interface itself and for every
//! transitively imported interface, so platform-object handles and implementation types resolve.
//!
//! ## Notes
//! - Module paths are made relative to the first configured search path that prefixes them.
//! - Every path segment is snake-cased and keyword-escaped; the result hangs off the configured module root.

use std::path::{Component, Path};

use indexmap::IndexSet;
use webidl_core::Interface;

use super::config::GeneratorConfig;
use super::naming::host_identifier;

/// Module path (`crate::dom::node`) for an interface's implementation, or `None` if it has no module path.
pub fn module_for(interface: &Interface, config: &GeneratorConfig) -> Option<String> {
    if interface.module_path.is_empty() {
        return None;
    }
    let path = Path::new(&interface.module_path);
    let relative = config
        .search_paths
        .iter()
        .find_map(|root| path.strip_prefix(root).ok())
        .unwrap_or(path);
    let segments: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => segment.to_str(),
            _ => None,
        })
        .map(|segment| host_identifier(segment.trim_end_matches(".idl")))
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(format!("{}::{}", config.module_root, segments.join("::")))
}

/// `use` lines for the interface and everything it transitively imports, deduplicated, in discovery order.
pub fn import_lines(interface: &Interface, config: &GeneratorConfig) -> Vec<String> {
    let modules: IndexSet<String> = interface
        .transitive_imports()
        .into_iter()
        .filter_map(|imported| module_for(imported, config))
        .collect();
    modules.into_iter().map(|module| format!("use {module}::*;")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface(name: &str, module_path: &str) -> Interface {
        let mut interface = Interface::new(name);
        interface.module_path = module_path.to_string();
        interface
    }

    #[test]
    fn paths_are_relative_to_search_paths() {
        let config = GeneratorConfig::new().with_search_path("src");
        let node = interface("Node", "src/web/DOM/Node");
        assert_eq!(module_for(&node, &config).as_deref(), Some("crate::web::dom::node"));
    }

    #[test]
    fn unmatched_paths_are_kept_whole() {
        let config = GeneratorConfig::new().with_module_root("bindings");
        let event = interface("Event", "DOM/Event.idl");
        assert_eq!(module_for(&event, &config).as_deref(), Some("bindings::dom::event"));
        assert_eq!(module_for(&Interface::new("Bare"), &config), None);
    }

    #[test]
    fn imports_are_transitive_and_deduplicated() {
        let config = GeneratorConfig::new();
        let event = interface("Event", "DOM/Event");
        let mut target = interface("EventTarget", "DOM/EventTarget");
        target.imported_interfaces.push(event.clone());
        let mut node = interface("Node", "DOM/Node");
        node.imported_interfaces.push(target);
        node.imported_interfaces.push(event);
        assert_eq!(
            import_lines(&node, &config),
            [
                "use crate::dom::node::*;",
                "use crate::dom::event_target::*;",
                "use crate::dom::event::*;",
            ]
        );
    }
}
