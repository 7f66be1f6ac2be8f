//! Generator version information.
//!
//! The CLI `--version` output and the header of every generated file read the same constant.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The generator version string (for example, `0.1.0-alpha.1`).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
