//! Runtime support for generated bindings.
//!
//! Generated code runs against a small in-process object model: a [`Realm`] arena of objects addressed by
//! [`ObjectId`], the ECMAScript abstract operations the WebIDL conversions are defined in terms of, checked
//! object handles, and the runtime half of overload resolution.
//!
//! ## Module Organization
//! - [`value`]: script values and numerics
//! - [`realm`]: object arena, property access, calls and iteration
//! - [`abstract_ops`]: `ToNumber`, `ToString`, integer and float conversion
//! - [`handle`]: typed handles, union carriers and checked object conversions
//! - [`errors`]: `TypeError` kinds and message templates
//! - [`overload`]: overload dispatch by argument inspection
//! - [`convert`]: [`RuntimeConverter`], an interpreter for the generated conversions
//! - [`prelude`]: everything generated files import

pub mod abstract_ops;
pub mod convert;
pub mod errors;
pub mod handle;
pub mod overload;
pub mod prelude;
pub mod realm;
pub mod value;
mod wrap;

pub use convert::{ConvertError, ConvertResult, HostValue, RuntimeConverter};
pub use errors::{ErrorType, ThrowCompletionOr, TypeError};
pub use realm::Realm;
pub use value::{ObjectId, Value};
