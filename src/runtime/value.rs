//! Script values.
//!
//! [`Value`] is the tagged value every binding receives and returns. Objects live in a
//! [`Realm`](super::realm::Realm) and are referred to by [`ObjectId`]; values are therefore cheap to clone.

use super::handle::Handle;

/// Host type of IDL `bigint`.
pub use num_bigint::BigInt;

/// Index of an object in its realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A script value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    BigInt(BigInt),
    String(String),
    /// A symbol, identified by its description.
    Symbol(String),
    Object(ObjectId),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `null` or `undefined`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_bigint(&self) -> bool {
        matches!(self, Value::BigInt(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// The `typeof` name of the value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Object(_) => "object",
        }
    }
}

/// Result of `ToNumeric`.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Number(f64),
    BigInt(BigInt),
}

// ============================================================================
// Conversions from host values
// ============================================================================

macro_rules! number_from {
    ($($host:ty),+) => {
        $(
            impl From<$host> for Value {
                fn from(value: $host) -> Self {
                    Value::Number(f64::from(value))
                }
            }
        )+
    };
}

number_from!(i8, u8, i16, u16, i32, u32, f32, f64);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::Object(value)
    }
}

impl<T> From<Handle<T>> for Value {
    fn from(value: Handle<T>) -> Self {
        Value::Object(value.object())
    }
}

impl From<Numeric> for Value {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Number(number) => Value::Number(number),
            Numeric::BigInt(bigint) => Value::BigInt(bigint),
        }
    }
}
