//! Errors raised while querying the IDL model.
//!
//! These are lookup failures (a name that resolves to nothing). The generator wraps them into its own
//! `GenerationError` so the CLI reports a single diagnostic type.

use thiserror::Error;

/// A failed lookup against an [`Interface`](crate::Interface) tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("dictionary '{name}' is not declared by interface '{interface}' or its imports")]
    UnknownDictionary { name: String, interface: String },
    #[error("enumeration '{name}' is not declared by interface '{interface}' or its imports")]
    UnknownEnumeration { name: String, interface: String },
    #[error("dictionary '{name}' inherits from itself")]
    CyclicDictionary { name: String },
}
