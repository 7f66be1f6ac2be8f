//! Abstract operations: `ToPrimitive`, `ToNumber`, `ToString`, `ToBoolean`, `ToNumeric`, `ToBigInt`, and the
//! WebIDL integer and floating-point conversions built on them.
//!
//! ## Notes
//! - Integer conversion is table-driven: bounds and bit widths come from
//!   [`webidl_core::lang::numerics::INTEGER_TYPES`], so the generator and the runtime agree on every keyword.
//! - Host strings are UTF-8 and cannot hold lone surrogates, so `USVString` conversion is `ToString`.

use webidl_core::lang::numerics::{self, IntegerInfo, IntegerKeyword};

use super::errors::{ErrorType, ThrowCompletionOr, TypeError};
use super::realm::{ObjectKind, Realm};
use num_bigint::Sign;

use super::value::{BigInt, Numeric, Value};

/// Which integer conversion applies: `[EnforceRange]`, `[Clamp]`, or the default modulo conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerMode {
    Wrapping,
    Clamp,
    EnforceRange,
}

/// Whether a floating-point type admits NaN and the infinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatMode {
    Restricted,
    Unrestricted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreferredType {
    Number,
    String,
}

/// Argument `index`, or `undefined` when the caller passed fewer.
pub fn argument(arguments: &[Value], index: usize) -> Value {
    arguments.get(index).cloned().unwrap_or_default()
}

// ============================================================================
// Primitive conversions
// ============================================================================

fn to_primitive(realm: &mut Realm, value: &Value, preferred: PreferredType) -> ThrowCompletionOr<Value> {
    let Some(object) = value.as_object() else {
        return Ok(value.clone());
    };
    let order = match preferred {
        PreferredType::Number => ["valueOf", "toString"],
        PreferredType::String => ["toString", "valueOf"],
    };
    for name in order {
        let method = realm.get(object, name)?;
        if realm.is_callable(&method) {
            let result = realm.call(&method, value, &[])?;
            if !result.is_object() {
                return Ok(result);
            }
        }
    }
    Ok(Value::String(default_object_string(realm, value)))
}

/// `Object.prototype.toString` for objects without their own conversion methods.
fn default_object_string(realm: &Realm, value: &Value) -> String {
    let tag = match value.as_object().and_then(|id| realm.kind(id)) {
        Some(ObjectKind::Array) => "Array",
        Some(ObjectKind::Function { .. }) => "Function",
        Some(ObjectKind::PlatformObject { interfaces }) => {
            return format!("[object {}]", interfaces.first().map(String::as_str).unwrap_or("Object"));
        }
        Some(ObjectKind::WindowProxy) => "Window",
        Some(ObjectKind::Buffer { kind }) => return format!("[object {kind}]"),
        Some(ObjectKind::Promise { .. }) => "Promise",
        Some(ObjectKind::Ordinary) | None => "Object",
    };
    format!("[object {tag}]")
}

pub fn to_boolean(value: &Value) -> bool {
    match value {
        Value::Undefined | Value::Null => false,
        Value::Boolean(boolean) => *boolean,
        Value::Number(number) => !(*number == 0.0 || number.is_nan()),
        Value::BigInt(bigint) => bigint.sign() != Sign::NoSign,
        Value::String(string) => !string.is_empty(),
        Value::Symbol(_) | Value::Object(_) => true,
    }
}

pub fn to_number(realm: &mut Realm, value: &Value) -> ThrowCompletionOr<f64> {
    match value {
        Value::Undefined => Ok(f64::NAN),
        Value::Null => Ok(0.0),
        Value::Boolean(boolean) => Ok(if *boolean { 1.0 } else { 0.0 }),
        Value::Number(number) => Ok(*number),
        Value::String(string) => Ok(string_to_number(string)),
        Value::BigInt(bigint) => Err(TypeError::new(ErrorType::BigIntToNumber, &[&bigint.to_string()])),
        Value::Symbol(_) => Err(TypeError::new(ErrorType::SymbolConversion, &["number"])),
        Value::Object(_) => {
            let primitive = to_primitive(realm, value, PreferredType::Number)?;
            to_number(realm, &primitive)
        }
    }
}

/// `StringToNumber`: decimal, `0x`/`0o`/`0b` integers, `Infinity`; anything else is NaN.
pub fn string_to_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return digits
            .chars()
            .filter_map(|c| c.to_digit(radix))
            .fold(0.0, |acc, digit| acc * f64::from(radix) + f64::from(digit));
    }
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    if !is_decimal_literal(unsigned) {
        return f64::NAN;
    }
    trimmed.parse().unwrap_or(f64::NAN)
}

fn is_decimal_literal(text: &str) -> bool {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(position) => (&text[..position], Some(&text[position + 1..])),
        None => (text, None),
    };
    let mut parts = mantissa.splitn(2, '.');
    let integer = parts.next().unwrap_or_default();
    let fraction = parts.next().unwrap_or_default();
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if integer.is_empty() && fraction.is_empty() {
        return false;
    }
    if !digits(integer) || !digits(fraction) {
        return false;
    }
    match exponent {
        None => true,
        Some(exponent) => {
            let exponent = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
            !exponent.is_empty() && digits(exponent)
        }
    }
}

/// `Number::toString(10)`.
pub fn number_to_string(number: f64) -> String {
    if number.is_nan() {
        return "NaN".to_string();
    }
    if number == 0.0 {
        return "0".to_string();
    }
    if number.is_infinite() {
        return if number > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = number.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{number}");
    }
    let formatted = format!("{number:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{mantissa}e+{exponent}"),
        _ => formatted,
    }
}

pub fn to_string(realm: &mut Realm, value: &Value) -> ThrowCompletionOr<String> {
    match value {
        Value::Undefined => Ok("undefined".to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Boolean(boolean) => Ok(boolean.to_string()),
        Value::Number(number) => Ok(number_to_string(*number)),
        Value::BigInt(bigint) => Ok(bigint.to_string()),
        Value::String(string) => Ok(string.clone()),
        Value::Symbol(_) => Err(TypeError::new(ErrorType::SymbolConversion, &["string"])),
        Value::Object(_) => {
            let primitive = to_primitive(realm, value, PreferredType::String)?;
            to_string(realm, &primitive)
        }
    }
}

pub fn to_usv_string(realm: &mut Realm, value: &Value) -> ThrowCompletionOr<String> {
    to_string(realm, value)
}

/// `ToString`, then reject any code point above U+00FF.
pub fn to_byte_string(realm: &mut Realm, value: &Value) -> ThrowCompletionOr<String> {
    let string = to_string(realm, value)?;
    if string.chars().any(|c| u32::from(c) > 0xFF) {
        return Err(TypeError::new(ErrorType::InvalidByteString, &[&string]));
    }
    Ok(string)
}

/// A description of `value` for error messages. Never runs script code and never throws.
pub fn to_display_string(realm: &Realm, value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Boolean(boolean) => boolean.to_string(),
        Value::Number(number) => number_to_string(*number),
        Value::BigInt(bigint) => format!("{bigint}n"),
        Value::String(string) => string.clone(),
        Value::Symbol(description) => format!("Symbol({description})"),
        Value::Object(_) => default_object_string(realm, value),
    }
}

pub fn to_numeric(realm: &mut Realm, value: &Value) -> ThrowCompletionOr<Numeric> {
    let primitive = to_primitive(realm, value, PreferredType::Number)?;
    match primitive {
        Value::BigInt(bigint) => Ok(Numeric::BigInt(bigint)),
        other => Ok(Numeric::Number(to_number(realm, &other)?)),
    }
}

pub fn to_bigint(realm: &mut Realm, value: &Value) -> ThrowCompletionOr<BigInt> {
    let primitive = to_primitive(realm, value, PreferredType::Number)?;
    let fail = |realm: &Realm| TypeError::new(ErrorType::BigIntConversion, &[&to_display_string(realm, &primitive)]);
    match &primitive {
        Value::Boolean(boolean) => Ok(BigInt::from(u8::from(*boolean))),
        Value::BigInt(bigint) => Ok(bigint.clone()),
        Value::String(string) => {
            let trimmed = string.trim();
            if trimmed.is_empty() {
                return Ok(BigInt::from(0u8));
            }
            if trimmed.contains('_') {
                return Err(fail(&*realm));
            }
            trimmed.parse::<BigInt>().map_err(|_| fail(&*realm))
        }
        _ => Err(fail(&*realm)),
    }
}

// ============================================================================
// WebIDL numeric conversions
// ============================================================================

/// Host integer types an IDL integer keyword converts to.
pub trait IdlInteger: Copy {
    const KEYWORD: IntegerKeyword;

    /// Narrow a value already known to be in range.
    fn from_i128(value: i128) -> Self;
}

macro_rules! idl_integer {
    ($($host:ty => $keyword:ident),+) => {
        $(
            impl IdlInteger for $host {
                const KEYWORD: IntegerKeyword = IntegerKeyword::$keyword;

                fn from_i128(value: i128) -> Self {
                    value as $host
                }
            }
        )+
    };
}

idl_integer!(
    i8 => Byte,
    u8 => Octet,
    i16 => Short,
    u16 => UnsignedShort,
    i32 => Long,
    u32 => UnsignedLong,
    i64 => LongLong,
    u64 => UnsignedLongLong
);

/// The WebIDL `ConvertToInt` steps after `ToNumber`.
///
/// ## Parameters
/// - `number`: The result of `ToNumber`.
/// - `info`: The integer keyword's registry entry.
/// - `mode`: Conversion mode from the extended attributes.
/// - `label`: Parameter name cited in errors.
///
/// ## Errors
/// - `NumberIsNaNOrInfinity` / `NumberIsNotInRange` under [`IntegerMode::EnforceRange`].
pub fn convert_number_to_integer(
    number: f64,
    info: &IntegerInfo,
    mode: IntegerMode,
    label: &str,
) -> ThrowCompletionOr<i128> {
    match mode {
        IntegerMode::EnforceRange => {
            if !number.is_finite() {
                return Err(TypeError::new(ErrorType::NumberIsNaNOrInfinity, &[label]));
            }
            let truncated = number.trunc();
            if truncated < info.lower_bound as f64 || truncated > info.upper_bound as f64 {
                return Err(TypeError::new(ErrorType::NumberIsNotInRange, &[label, info.keyword]));
            }
            Ok(truncated as i128)
        }
        IntegerMode::Clamp => {
            if number.is_nan() {
                return Ok(0);
            }
            let clamped = number.clamp(info.lower_bound as f64, info.upper_bound as f64);
            Ok(clamped.round_ties_even() as i128)
        }
        IntegerMode::Wrapping => {
            if !number.is_finite() || number == 0.0 {
                return Ok(0);
            }
            let modulus = 1i128 << info.bits;
            // Both steps are exact: `%` on integral doubles never rounds, and the remainder fits in i128.
            let remainder = (number.trunc() % (modulus as f64)) as i128;
            let mut wrapped = remainder.rem_euclid(modulus);
            if info.signed && wrapped >= modulus / 2 {
                wrapped -= modulus;
            }
            Ok(wrapped)
        }
    }
}

/// `ToNumber`, then [`convert_number_to_integer`] for `T`'s keyword.
pub fn convert_to_int<T: IdlInteger>(
    realm: &mut Realm,
    value: &Value,
    mode: IntegerMode,
    label: &str,
) -> ThrowCompletionOr<T> {
    let number = to_number(realm, value)?;
    let info = numerics::integer_info(T::KEYWORD);
    convert_number_to_integer(number, info, mode, label).map(T::from_i128)
}

/// IDL `double` / `unrestricted double`.
pub fn convert_to_double(realm: &mut Realm, value: &Value, mode: FloatMode, label: &str) -> ThrowCompletionOr<f64> {
    let number = to_number(realm, value)?;
    if mode == FloatMode::Restricted && !number.is_finite() {
        return Err(TypeError::new(ErrorType::NumberIsNaNOrInfinity, &[label]));
    }
    Ok(number)
}

/// IDL `float` / `unrestricted float`. Restricted floats also reject values that overflow `f32`.
pub fn convert_to_float(realm: &mut Realm, value: &Value, mode: FloatMode, label: &str) -> ThrowCompletionOr<f32> {
    let number = convert_to_double(realm, value, mode, label)?;
    let single = number as f32;
    if mode == FloatMode::Restricted && single.is_infinite() {
        return Err(TypeError::new(ErrorType::NumberIsNaNOrInfinity, &[label]));
    }
    Ok(single)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int<T: IdlInteger>(value: f64, mode: IntegerMode) -> ThrowCompletionOr<T> {
        convert_to_int::<T>(&mut Realm::new(), &Value::Number(value), mode, "x")
    }

    // ========================================================================
    // Integers
    // ========================================================================

    #[test]
    fn wrapping_is_modulo_two_to_the_bits() {
        assert_eq!(int::<u8>(256.0, IntegerMode::Wrapping).unwrap(), 0);
        assert_eq!(int::<u8>(-1.0, IntegerMode::Wrapping).unwrap(), 255);
        assert_eq!(int::<i8>(128.0, IntegerMode::Wrapping).unwrap(), -128);
        assert_eq!(int::<i32>(2147483648.0, IntegerMode::Wrapping).unwrap(), i32::MIN);
        assert_eq!(int::<u32>(-1.5, IntegerMode::Wrapping).unwrap(), u32::MAX);
        assert_eq!(int::<i64>(-1.0, IntegerMode::Wrapping).unwrap(), -1);
        assert_eq!(int::<u64>(-1.0, IntegerMode::Wrapping).unwrap(), u64::MAX);
        assert_eq!(int::<i16>(f64::NAN, IntegerMode::Wrapping).unwrap(), 0);
        assert_eq!(int::<i16>(f64::INFINITY, IntegerMode::Wrapping).unwrap(), 0);
    }

    #[test]
    fn clamp_saturates_and_rounds_half_to_even() {
        assert_eq!(int::<u8>(300.0, IntegerMode::Clamp).unwrap(), 255);
        assert_eq!(int::<u8>(-5.0, IntegerMode::Clamp).unwrap(), 0);
        assert_eq!(int::<u8>(2.5, IntegerMode::Clamp).unwrap(), 2);
        assert_eq!(int::<u8>(3.5, IntegerMode::Clamp).unwrap(), 4);
        assert_eq!(int::<i8>(f64::NEG_INFINITY, IntegerMode::Clamp).unwrap(), -128);
        assert_eq!(int::<i32>(f64::NAN, IntegerMode::Clamp).unwrap(), 0);
    }

    #[test]
    fn enforce_range_rejects_out_of_range_and_non_finite() {
        assert_eq!(int::<u16>(65535.9, IntegerMode::EnforceRange).unwrap(), 65535);
        let err = int::<u16>(65536.0, IntegerMode::EnforceRange).unwrap_err();
        assert_eq!(err.kind(), ErrorType::NumberIsNotInRange);
        assert_eq!(err.message(), "x is out of range for unsigned short");
        let err = int::<i32>(f64::NAN, IntegerMode::EnforceRange).unwrap_err();
        assert_eq!(err.kind(), ErrorType::NumberIsNaNOrInfinity);
        assert!(int::<i64>(9007199254740992.0, IntegerMode::EnforceRange).is_err());
    }

    #[test]
    fn integers_go_through_to_number() {
        let mut realm = Realm::new();
        let value = Value::from(" 0x10 ");
        assert_eq!(convert_to_int::<i32>(&mut realm, &value, IntegerMode::Wrapping, "x").unwrap(), 16);
        assert_eq!(convert_to_int::<i32>(&mut realm, &Value::Boolean(true), IntegerMode::Wrapping, "x").unwrap(), 1);
        assert!(convert_to_int::<i32>(&mut realm, &Value::BigInt(BigInt::from(1)), IntegerMode::Wrapping, "x").is_err());
    }

    // ========================================================================
    // Floats and primitives
    // ========================================================================

    #[test]
    fn restricted_floats_reject_non_finite() {
        let mut realm = Realm::new();
        let nan = Value::Number(f64::NAN);
        assert!(convert_to_double(&mut realm, &nan, FloatMode::Restricted, "x").is_err());
        assert!(convert_to_double(&mut realm, &nan, FloatMode::Unrestricted, "x").unwrap().is_nan());
        let huge = Value::Number(1e300);
        assert!(convert_to_float(&mut realm, &huge, FloatMode::Restricted, "x").is_err());
        assert_eq!(
            convert_to_float(&mut realm, &huge, FloatMode::Unrestricted, "x").unwrap(),
            f32::INFINITY
        );
    }

    #[test]
    fn string_to_number_follows_the_grammar() {
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("  12.5 "), 12.5);
        assert_eq!(string_to_number(".5"), 0.5);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert_eq!(string_to_number("0b101"), 5.0);
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("1e").is_nan());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(0.1), "0.1");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(f64::NAN), "NaN");
    }

    #[test]
    fn strings_booleans_and_bigints() {
        let mut realm = Realm::new();
        assert_eq!(to_string(&mut realm, &Value::Null).unwrap(), "null");
        assert!(to_byte_string(&mut realm, &Value::from("caf\u{e9}")).is_ok());
        let err = to_byte_string(&mut realm, &Value::from("\u{263a}")).unwrap_err();
        assert_eq!(err.kind(), ErrorType::InvalidByteString);
        assert!(!to_boolean(&Value::Number(f64::NAN)));
        assert!(to_boolean(&Value::from("0")));
        assert_eq!(to_bigint(&mut realm, &Value::from("42")).unwrap(), BigInt::from(42));
        assert_eq!(to_bigint(&mut realm, &Value::Boolean(true)).unwrap(), BigInt::from(1));
        assert!(to_bigint(&mut realm, &Value::Number(1.0)).is_err());
        assert_eq!(
            to_numeric(&mut realm, &Value::BigInt(BigInt::from(3))).unwrap(),
            Numeric::BigInt(BigInt::from(3))
        );
        assert!(!to_boolean(&Value::BigInt(BigInt::from(0))));
    }

    #[test]
    fn bigints_are_not_limited_to_machine_width() {
        let mut realm = Realm::new();
        let text = "170141183460469231731687303715884105728";
        let bigint = to_bigint(&mut realm, &Value::from(text)).unwrap();
        assert_eq!(bigint, BigInt::from(2).pow(127));
        assert_eq!(to_string(&mut realm, &Value::BigInt(bigint.clone())).unwrap(), text);
        let negative = to_bigint(&mut realm, &Value::from("-340282366920938463463374607431768211457")).unwrap();
        assert_eq!(negative, -(BigInt::from(2).pow(128) + BigInt::from(1)));
        assert!(to_bigint(&mut realm, &Value::from("1_000")).is_err());
        assert!(to_bigint(&mut realm, &Value::from("12n")).is_err());
    }

    #[test]
    fn objects_convert_through_value_of() {
        let mut realm = Realm::new();
        let object = realm.create_object();
        let value_of = realm.create_function("valueOf", |_, _, _| Ok(Value::Number(7.0)));
        realm.create_data_property(object, "valueOf", Value::Object(value_of));
        assert_eq!(to_number(&mut realm, &Value::Object(object)).unwrap(), 7.0);
        let plain = realm.create_object();
        assert_eq!(to_string(&mut realm, &Value::Object(plain)).unwrap(), "[object Object]");
    }
}
