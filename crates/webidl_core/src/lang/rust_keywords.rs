//! Rust keyword vocabulary (for escaping generated identifiers).

/// Reserved + strict keywords in Rust.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for", "if", "impl", "in",
    "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
    "super", "trait", "true", "type", "unsafe", "use", "where", "while", "async", "await", "dyn", "abstract",
    "become", "box", "do", "final", "gen", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield",
    "try",
];

/// Keywords that cannot be written as raw identifiers (`r#self` is rejected by rustc).
pub const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Check whether an identifier is a Rust keyword.
pub fn is_keyword(name: &str) -> bool {
    RUST_KEYWORDS.contains(&name)
}

/// Check whether a keyword must be escaped by renaming rather than with `r#`.
pub fn needs_rename(name: &str) -> bool {
    NON_RAW_KEYWORDS.contains(&name)
}
