//! Provide the WebIDL data model and canonical vocabulary shared by the bindings generator and its runtime.
//!
//! This crate is intentionally small and dependency-light. It contains the descriptors that an IDL parser
//! produces (types, interfaces, dictionaries, enumerations, callbacks) and the fixed registries both:
//! - the generator uses to classify types and author conversion code, and
//! - the runtime uses to perform the same conversions against live script values.
//!
//! ## Notes
//!
//! - This is a "model core" crate: **no IO**, no global state, and no generator-specific types.
//! - Descriptors are immutable once built; the generator only ever borrows them.

pub mod errors;
pub mod interface;
pub mod lang;
pub mod types;

pub use errors::ModelError;
pub use interface::{
    Attribute, CallbackFunction, Constant, Constructor, Dictionary, DictionaryMember, Enumeration,
    ExtendedAttributes, Function, Interface, Parameter,
};
pub use types::Type;
