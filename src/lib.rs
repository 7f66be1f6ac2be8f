#![forbid(unsafe_code)]
//! WebIDL bindings generator.
//!
//! Reads a parsed WebIDL interface description and emits the Rust glue that exposes it to a script engine:
//! conversions from script values to host values, wraps of host values back into script values, overload
//! dispatch, and the per-interface prototype and constructor objects. The [`runtime`] module is the support
//! library that generated code links against.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Generated code**: Templates only emit `?` propagation; a generated file never panics on bad input.

pub mod backend;
pub mod cli;
pub mod runtime;
pub mod version;

pub use backend::{BindingsCodegen, GenerationError, GeneratorConfig};
pub use webidl_core::{Interface, Type};
