//! Default-value literals.
//!
//! IDL default literals (`null`, `true`, `42`, `1.5`, `"text"`, `[]`, `{}`) are parsed once into a
//! [`DefaultValue`] and checked against the type they default. The generator renders them as Rust
//! expressions; the runtime materializes them as host values.

use webidl_core::{Interface, Type};

use crate::backend::errors::{GenerationError, GenerationResult};

/// A parsed default literal.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Undefined,
    Boolean(bool),
    Integer(i128),
    Float(f64),
    String(String),
    EmptySequence,
    EmptyDictionary,
}

impl DefaultValue {
    /// `null` (and an absent literal) leave an optional value empty.
    pub fn is_null(&self) -> bool {
        matches!(self, DefaultValue::Null)
    }
}

/// Parse `literal` and check it is a valid default for `ty`.
///
/// ## Errors
/// - [`GenerationError::UnsupportedDefault`] if the literal does not parse or does not fit the type.
pub fn parse_default(literal: &str, ty: &Type, interface: &Interface) -> GenerationResult<DefaultValue> {
    let unsupported = || GenerationError::UnsupportedDefault {
        literal: literal.to_string(),
        ty: ty.to_string(),
    };
    let value = parse_literal(literal.trim()).ok_or_else(unsupported)?;
    if fits(&value, ty, interface) {
        Ok(value)
    } else {
        Err(unsupported())
    }
}

fn parse_literal(literal: &str) -> Option<DefaultValue> {
    let value = match literal {
        "null" => DefaultValue::Null,
        "undefined" => DefaultValue::Undefined,
        "true" => DefaultValue::Boolean(true),
        "false" => DefaultValue::Boolean(false),
        "[]" => DefaultValue::EmptySequence,
        "{}" => DefaultValue::EmptyDictionary,
        "Infinity" => DefaultValue::Float(f64::INFINITY),
        "-Infinity" => DefaultValue::Float(f64::NEG_INFINITY),
        "NaN" => DefaultValue::Float(f64::NAN),
        _ if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') => {
            DefaultValue::String(literal[1..literal.len() - 1].to_string())
        }
        _ => return parse_number(literal),
    };
    Some(value)
}

fn parse_number(literal: &str) -> Option<DefaultValue> {
    let (negative, digits) = match literal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, literal),
    };
    let sign = if negative { -1 } else { 1 };
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        return i128::from_str_radix(hex, 16).ok().map(|n| DefaultValue::Integer(sign * n));
    }
    if digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()) {
        return i128::from_str_radix(&digits[1..], 8).ok().map(|n| DefaultValue::Integer(sign * n));
    }
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.parse::<i128>().ok().map(|n| DefaultValue::Integer(sign * n));
    }
    let looks_decimal = digits.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if looks_decimal && digits.bytes().any(|b| b.is_ascii_digit()) {
        return literal.parse::<f64>().ok().map(DefaultValue::Float);
    }
    None
}

fn fits(value: &DefaultValue, ty: &Type, interface: &Interface) -> bool {
    if ty.is_any() {
        return !matches!(value, DefaultValue::EmptySequence | DefaultValue::EmptyDictionary);
    }
    if ty.is_union() {
        return match value {
            DefaultValue::Null => ty.includes_nullable_type(),
            DefaultValue::Undefined => ty.includes_undefined(),
            _ => ty
                .flattened_member_types()
                .iter()
                .any(|member| fits(value, member, interface)),
        };
    }
    match value {
        DefaultValue::Null => ty.is_nullable(),
        DefaultValue::Undefined => ty.is_undefined(),
        DefaultValue::Boolean(_) => ty.is_boolean(),
        DefaultValue::Integer(_) => ty.is_numeric(),
        DefaultValue::Float(_) => ty.is_floating_point(),
        DefaultValue::String(s) => {
            ty.is_string()
                || interface
                    .enumeration(ty.name())
                    .is_some_and(|enumeration| enumeration.host_identifier_for(s).is_some())
        }
        DefaultValue::EmptySequence => ty.is_sequence(),
        DefaultValue::EmptyDictionary => interface.is_dictionary(ty.name()),
    }
}

/// Render a float literal for a Rust host type (`f32` or `f64`).
pub fn float_literal(value: f64, host_type: &str) -> String {
    if value.is_nan() {
        format!("{host_type}::NAN")
    } else if value == f64::INFINITY {
        format!("{host_type}::INFINITY")
    } else if value == f64::NEG_INFINITY {
        format!("{host_type}::NEG_INFINITY")
    } else {
        format!("{value:?}")
    }
}

/// Render a string literal as an owned Rust `String` expression.
pub fn string_literal(value: &str) -> String {
    format!("String::from({value:?})")
}

/// Render a default as a script `Value` expression (used for `any` defaults and constants).
pub fn script_value_literal(value: &DefaultValue) -> String {
    match value {
        DefaultValue::Null => "Value::Null".to_string(),
        DefaultValue::Undefined | DefaultValue::EmptySequence | DefaultValue::EmptyDictionary => {
            "Value::Undefined".to_string()
        }
        DefaultValue::Boolean(b) => format!("Value::Boolean({b})"),
        DefaultValue::Integer(n) => format!("Value::Number({n}.0)"),
        DefaultValue::Float(x) => format!("Value::Number({})", float_literal(*x, "f64")),
        DefaultValue::String(s) => format!("Value::String({})", string_literal(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webidl_core::Enumeration;

    fn interface() -> Interface {
        let mut interface = Interface::new("I");
        interface
            .enumerations
            .insert("Mode".into(), Enumeration::from_values(["open", "closed"]));
        interface
    }

    fn parse(literal: &str, ty: Type) -> GenerationResult<DefaultValue> {
        parse_default(literal, &ty, &interface())
    }

    #[test]
    fn numeric_literals() {
        assert_eq!(parse("42", Type::plain("long")), Ok(DefaultValue::Integer(42)));
        assert_eq!(parse("-0x10", Type::plain("long")), Ok(DefaultValue::Integer(-16)));
        assert_eq!(parse("010", Type::plain("octet")), Ok(DefaultValue::Integer(8)));
        assert_eq!(parse("1.5", Type::plain("double")), Ok(DefaultValue::Float(1.5)));
        assert!(parse("1.5", Type::plain("long")).is_err());
    }

    #[test]
    fn strings_and_enumerations() {
        assert_eq!(
            parse("\"\"", Type::plain("DOMString")),
            Ok(DefaultValue::String(String::new()))
        );
        assert_eq!(
            parse("\"closed\"", Type::plain("Mode")),
            Ok(DefaultValue::String("closed".into()))
        );
        assert!(parse("\"ajar\"", Type::plain("Mode")).is_err());
    }

    #[test]
    fn null_requires_a_nullable_type() {
        assert_eq!(parse("null", Type::plain("DOMString").nullable()), Ok(DefaultValue::Null));
        assert!(parse("null", Type::plain("DOMString")).is_err());
        assert_eq!(parse("null", Type::plain("any")), Ok(DefaultValue::Null));
    }

    #[test]
    fn union_defaults_need_a_matching_member() {
        let union = Type::union(vec![Type::plain("DOMString"), Type::plain("long")]);
        assert_eq!(parse("7", union.clone()), Ok(DefaultValue::Integer(7)));
        assert!(parse("true", union).is_err());
    }

    #[test]
    fn rendering_helpers() {
        assert_eq!(float_literal(2.0, "f64"), "2.0");
        assert_eq!(float_literal(f64::NEG_INFINITY, "f32"), "f32::NEG_INFINITY");
        assert_eq!(string_literal("a\"b"), "String::from(\"a\\\"b\")");
        assert_eq!(script_value_literal(&DefaultValue::Integer(3)), "Value::Number(3.0)");
        assert_eq!(script_value_literal(&DefaultValue::Float(f64::NAN)), "Value::Number(f64::NAN)");
    }
}
