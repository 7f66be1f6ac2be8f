//! Names generated binding files bring in with `use <runtime>::prelude::*;`.

pub use indexmap::IndexMap;

pub use super::abstract_ops::{
    FloatMode, IdlInteger, IntegerMode, argument, convert_number_to_integer, convert_to_double, convert_to_float,
    convert_to_int, number_to_string, string_to_number, to_bigint, to_boolean, to_byte_string, to_display_string,
    to_number, to_numeric, to_string, to_usv_string,
};
pub use super::errors::{ErrorType, ThrowCompletionOr, TypeError};
pub use super::handle::{
    CallbackType, Empty, Handle, MarkedVector, Object, Promise, Union2, Union3, Union4, Union5, Union6, Union7, Union8,
    impl_from, promise_resolve, require_object, to_buffer_source, to_callback, to_platform_object,
};
pub use super::overload::{ArgumentTest, DispatchGroup, Optionality, OverloadCandidate, resolve_overload};
pub use super::realm::{IteratorMethod, IteratorRecord, PropertyDescriptor, Realm};
pub use super::value::{BigInt, Numeric, ObjectId, Value};
