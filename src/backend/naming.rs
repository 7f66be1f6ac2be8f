//! Identifier helpers for generated code.
//!
//! IDL names are camelCase and may collide with Rust keywords or contain `-`; generated bindings use
//! snake_case locals and escape keywords.

use webidl_core::lang::rust_keywords;

/// Make an IDL-derived name usable as a Rust identifier.
///
/// `-` becomes `_`; keywords are written as raw identifiers, except the few that cannot be raw
/// (`self`, `super`, `crate`, `Self`), which get a trailing `_`.
pub fn escape_identifier(name: &str) -> String {
    let name = name.replace('-', "_");
    if rust_keywords::needs_rename(&name) {
        format!("{name}_")
    } else if rust_keywords::is_keyword(&name) {
        format!("r#{name}")
    } else {
        name
    }
}

/// Convert a camelCase / PascalCase IDL name to snake_case (`innerHTML` -> `inner_html`).
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' {
            out.push('_');
            continue;
        }
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let after_lower = prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit());
            let acronym_end = prev.is_some_and(|p| p.is_ascii_uppercase()) && next.is_some_and(|n| n.is_ascii_lowercase());
            if after_lower || acronym_end {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// snake_case + keyword escaping: the name a generated binding or host method uses.
pub fn host_identifier(name: &str) -> String {
    escape_identifier(&to_snake_case(name))
}
