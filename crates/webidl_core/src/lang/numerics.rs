//! Numeric keyword vocabulary.
//!
//! One entry per IDL numeric keyword, each with exactly one host type. The integer table also carries the
//! conversion bounds used by `[EnforceRange]` / `[Clamp]` and the bit width used by the default modulo
//! conversion.
//!
//! ## Notes
//! - The 64-bit keywords use the WebIDL safe-integer bounds (`±(2^53 - 1)`), not the host type's range.
//! - Lookup is exact: `"unsigned long"` resolves, `"Unsigned Long"` does not.

/// Largest integer a script number represents exactly.
pub const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

/// Stable identifier for integer keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKeyword {
    Byte,
    Octet,
    Short,
    UnsignedShort,
    Long,
    UnsignedLong,
    LongLong,
    UnsignedLongLong,
}

/// Metadata for an integer keyword.
#[derive(Debug, Clone, Copy)]
pub struct IntegerInfo {
    pub id: IntegerKeyword,
    pub keyword: &'static str,
    pub host_type: &'static str,
    pub bits: u32,
    pub signed: bool,
    pub lower_bound: i128,
    pub upper_bound: i128,
}

/// Registry of integer keywords, in declaration order of the WebIDL integer types.
pub const INTEGER_TYPES: &[IntegerInfo] = &[
    integer(IntegerKeyword::Byte, "byte", "i8", 8, true),
    integer(IntegerKeyword::Octet, "octet", "u8", 8, false),
    integer(IntegerKeyword::Short, "short", "i16", 16, true),
    integer(IntegerKeyword::UnsignedShort, "unsigned short", "u16", 16, false),
    integer(IntegerKeyword::Long, "long", "i32", 32, true),
    integer(IntegerKeyword::UnsignedLong, "unsigned long", "u32", 32, false),
    integer(IntegerKeyword::LongLong, "long long", "i64", 64, true),
    integer(IntegerKeyword::UnsignedLongLong, "unsigned long long", "u64", 64, false),
];

/// Resolve a type name to an [`IntegerKeyword`].
///
/// ## Parameters
/// - `name`: Candidate IDL type name.
///
/// ## Returns
/// - `Some(IntegerKeyword)` if the spelling is an integer keyword.
/// - `None` otherwise.
pub fn integer_from_str(name: &str) -> Option<IntegerKeyword> {
    INTEGER_TYPES.iter().find(|t| t.keyword == name).map(|t| t.id)
}

/// Return the full metadata entry for an integer keyword.
///
/// ## Parameters
/// - `id`: Integer keyword identifier.
///
/// ## Returns
/// - The associated [`IntegerInfo`] from [`INTEGER_TYPES`].
pub fn integer_info(id: IntegerKeyword) -> &'static IntegerInfo {
    let index = match id {
        IntegerKeyword::Byte => 0,
        IntegerKeyword::Octet => 1,
        IntegerKeyword::Short => 2,
        IntegerKeyword::UnsignedShort => 3,
        IntegerKeyword::Long => 4,
        IntegerKeyword::UnsignedLong => 5,
        IntegerKeyword::LongLong => 6,
        IntegerKeyword::UnsignedLongLong => 7,
    };
    &INTEGER_TYPES[index]
}

/// Stable identifier for floating-point keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKeyword {
    Float,
    UnrestrictedFloat,
    Double,
    UnrestrictedDouble,
}

/// Metadata for a floating-point keyword.
#[derive(Debug, Clone, Copy)]
pub struct FloatInfo {
    pub id: FloatKeyword,
    pub keyword: &'static str,
    pub host_type: &'static str,
    /// Restricted keywords reject NaN and the infinities.
    pub restricted: bool,
    pub single_precision: bool,
}

/// Registry of floating-point keywords.
pub const FLOAT_TYPES: &[FloatInfo] = &[
    FloatInfo {
        id: FloatKeyword::Float,
        keyword: "float",
        host_type: "f32",
        restricted: true,
        single_precision: true,
    },
    FloatInfo {
        id: FloatKeyword::UnrestrictedFloat,
        keyword: "unrestricted float",
        host_type: "f32",
        restricted: false,
        single_precision: true,
    },
    FloatInfo {
        id: FloatKeyword::Double,
        keyword: "double",
        host_type: "f64",
        restricted: true,
        single_precision: false,
    },
    FloatInfo {
        id: FloatKeyword::UnrestrictedDouble,
        keyword: "unrestricted double",
        host_type: "f64",
        restricted: false,
        single_precision: false,
    },
];

/// Resolve a type name to a [`FloatKeyword`].
pub fn float_from_str(name: &str) -> Option<FloatKeyword> {
    FLOAT_TYPES.iter().find(|t| t.keyword == name).map(|t| t.id)
}

/// Return the full metadata entry for a floating-point keyword.
pub fn float_info(id: FloatKeyword) -> &'static FloatInfo {
    let index = match id {
        FloatKeyword::Float => 0,
        FloatKeyword::UnrestrictedFloat => 1,
        FloatKeyword::Double => 2,
        FloatKeyword::UnrestrictedDouble => 3,
    };
    &FLOAT_TYPES[index]
}

const fn integer(id: IntegerKeyword, keyword: &'static str, host_type: &'static str, bits: u32, signed: bool) -> IntegerInfo {
    let (lower_bound, upper_bound) = if bits == 64 {
        if signed { (-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER) } else { (0, MAX_SAFE_INTEGER) }
    } else if signed {
        (-(1 << (bits - 1)), (1 << (bits - 1)) - 1)
    } else {
        (0, (1 << bits) - 1)
    };
    IntegerInfo {
        id,
        keyword,
        host_type,
        bits,
        signed,
        lower_bound,
        upper_bound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_integer_keyword_resolves_to_its_own_entry() {
        for info in INTEGER_TYPES {
            assert_eq!(integer_from_str(info.keyword), Some(info.id));
            assert_eq!(integer_info(info.id).keyword, info.keyword);
        }
    }

    #[test]
    fn every_float_keyword_resolves_to_its_own_entry() {
        for info in FLOAT_TYPES {
            assert_eq!(float_from_str(info.keyword), Some(info.id));
            assert_eq!(float_info(info.id).keyword, info.keyword);
        }
    }

    #[test]
    fn bounds_match_host_widths() {
        let octet = integer_info(IntegerKeyword::Octet);
        assert_eq!((octet.lower_bound, octet.upper_bound), (0, 255));
        let byte = integer_info(IntegerKeyword::Byte);
        assert_eq!((byte.lower_bound, byte.upper_bound), (-128, 127));
        let long = integer_info(IntegerKeyword::Long);
        assert_eq!((long.lower_bound, long.upper_bound), (i32::MIN as i128, i32::MAX as i128));
        let ulong = integer_info(IntegerKeyword::UnsignedLong);
        assert_eq!(ulong.upper_bound, u32::MAX as i128);
    }

    #[test]
    fn sixty_four_bit_keywords_use_safe_integer_bounds() {
        let long_long = integer_info(IntegerKeyword::LongLong);
        assert_eq!(long_long.lower_bound, -MAX_SAFE_INTEGER);
        assert_eq!(long_long.upper_bound, MAX_SAFE_INTEGER);
        assert_eq!(integer_info(IntegerKeyword::UnsignedLongLong).lower_bound, 0);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(integer_from_str("Long"), None);
        assert_eq!(float_from_str("Double"), None);
    }
}
