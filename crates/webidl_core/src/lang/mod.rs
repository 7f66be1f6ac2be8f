//! WebIDL vocabulary registries.
//!
//! This module is the "front door" for fixed IDL vocabulary: numeric keywords, string types, parameterized
//! types, platform-object and buffer-source names, extended attributes, and the host-language keywords generated
//! identifiers must avoid.
//!
//! Callers work with **stable IDs** (e.g. `IntegerKeyword`, `StringTypeId`) and look up spellings and metadata
//! via registry tables instead of scattering string comparisons across the generator.
//!
//! ## Notes
//! - Registries are **pure**: no descriptors, no IO, no side effects.
//! - Lookups are exact (IDL is case-sensitive).
//!
//! ## Examples
//! ```rust
//! use webidl_core::lang::numerics::{self, IntegerKeyword};
//!
//! assert_eq!(numerics::integer_from_str("unsigned short"), Some(IntegerKeyword::UnsignedShort));
//! assert_eq!(numerics::integer_info(IntegerKeyword::Octet).host_type, "u8");
//! ```

pub mod extended_attributes;
pub mod numerics;
pub mod objects;
pub mod parameterized;
pub mod rust_keywords;
pub mod strings;
