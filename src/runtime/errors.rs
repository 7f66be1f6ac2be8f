//! Script-visible errors raised by generated bindings.
//!
//! Every failure a conversion can raise is a `TypeError` whose message comes from a fixed template in
//! [`ErrorType`]. Generated code builds them with [`TypeError::new`] and propagates them with `?`.

use thiserror::Error;

/// Message templates for the errors conversions raise. `{}` slots are filled in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    NotAnObject,
    NotAnObjectOfType,
    NotIterable,
    NotAFunction,
    InvalidEnumerationValue,
    MissingRequiredProperty,
    NumberIsNaNOrInfinity,
    NumberIsNotInRange,
    InvalidByteString,
    NoUnionTypesMatched,
    OverloadResolutionFailed,
    BadArgCountOne,
    BadArgCountMany,
    BigIntConversion,
    BigIntToNumber,
    SymbolConversion,
}

impl ErrorType {
    pub fn template(self) -> &'static str {
        match self {
            ErrorType::NotAnObject => "{} is not an object",
            ErrorType::NotAnObjectOfType => "{} is not an object of type {}",
            ErrorType::NotIterable => "{} is not iterable",
            ErrorType::NotAFunction => "{} is not a function",
            ErrorType::InvalidEnumerationValue => "Invalid value '{}' for enumeration type '{}'",
            ErrorType::MissingRequiredProperty => "Required property {} is missing or undefined",
            ErrorType::NumberIsNaNOrInfinity => "{} must not be NaN or Infinity",
            ErrorType::NumberIsNotInRange => "{} is out of range for {}",
            ErrorType::InvalidByteString => "{} contains a character above U+00FF",
            ErrorType::NoUnionTypesMatched => "{} does not match any member of {}",
            ErrorType::OverloadResolutionFailed => "Overload resolution failed for {}",
            ErrorType::BadArgCountOne => "{}() needs one argument",
            ErrorType::BadArgCountMany => "{}() needs {} arguments",
            ErrorType::BigIntConversion => "Cannot convert {} to BigInt",
            ErrorType::BigIntToNumber => "Cannot convert BigInt {} to a number",
            ErrorType::SymbolConversion => "Cannot convert a Symbol value to a {}",
        }
    }
}

/// A thrown `TypeError`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TypeError: {message}")]
pub struct TypeError {
    kind: ErrorType,
    message: String,
}

impl TypeError {
    /// Fill the template of `kind` with `arguments`. Missing arguments leave their slot empty.
    pub fn new(kind: ErrorType, arguments: &[&str]) -> Self {
        let mut message = String::new();
        let mut arguments = arguments.iter();
        let mut pieces = kind.template().split("{}").peekable();
        while let Some(piece) = pieces.next() {
            message.push_str(piece);
            if pieces.peek().is_some() {
                message.push_str(arguments.next().copied().unwrap_or_default());
            }
        }
        TypeError { kind, message }
    }

    pub fn kind(&self) -> ErrorType {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result of anything that can throw.
pub type ThrowCompletionOr<T> = Result<T, TypeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_filled_in_order() {
        let error = TypeError::new(ErrorType::InvalidEnumerationValue, &["sideways", "ScrollDirection"]);
        assert_eq!(error.kind(), ErrorType::InvalidEnumerationValue);
        assert_eq!(error.message(), "Invalid value 'sideways' for enumeration type 'ScrollDirection'");
        assert_eq!(
            error.to_string(),
            "TypeError: Invalid value 'sideways' for enumeration type 'ScrollDirection'"
        );
    }

    #[test]
    fn owned_strings_coerce_into_arguments() {
        let shown = String::from("42");
        let error = TypeError::new(ErrorType::NotAnObjectOfType, &[&shown, "Node"]);
        assert_eq!(error.message(), "42 is not an object of type Node");
    }

    #[test]
    fn missing_arguments_leave_slots_empty() {
        let error = TypeError::new(ErrorType::BadArgCountMany, &["fill"]);
        assert_eq!(error.message(), "fill() needs  arguments");
    }
}
