//! Bindings generator backend.
//!
//! This module turns a WebIDL [`Interface`](webidl_core::Interface) description into Rust source for the
//! binding layer that sits between a script engine and the host implementation.
//!
//! The pipeline is:
//! 1. Classify every IDL type into its host representation (`classify`)
//! 2. Author inbound conversions for arguments and setters (`convert`)
//! 3. Author outbound conversions for return values and getters (`wrap`)
//! 4. Plan and emit overload dispatch for overloaded operations (`overload`)
//! 5. Assemble, format and label the file (`codegen`)
//!
//! ## Module Organization
//!
//! - `codegen.rs` - [`BindingsCodegen`] facade and file assembly
//! - `classify.rs` - Type classification and distinguishability
//! - `convert/` - Inbound converters, one submodule per category
//! - `wrap.rs` - Outbound converter
//! - `overload.rs` - Effective overload sets and dispatcher emission
//! - `includes.rs` - Import lines for the interface and its imports
//! - `naming.rs` - Host identifier mangling
//! - `source_generator.rs` - Templated source buffer
//! - `config.rs` - [`GeneratorConfig`]
//! - `errors.rs` - [`GenerationError`]

pub mod classify;
pub mod codegen;
pub mod config;
pub mod convert;
pub mod errors;
pub mod includes;
pub mod naming;
pub mod overload;
pub mod source_generator;
pub mod wrap;

pub use classify::{HostType, TypeCategory, are_distinguishable, classify};
pub use codegen::BindingsCodegen;
pub use config::GeneratorConfig;
pub use errors::{GenerationError, GenerationResult};
pub use overload::{OverloadPlan, plan_overloads};
