//! String type vocabulary.
//!
//! ## Notes
//! - All four string types share one host type (`String`); only `ByteString` has an extra conversion step
//!   (it rejects code points above U+00FF).

/// Stable identifier for IDL string types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringTypeId {
    DomString,
    ByteString,
    UsvString,
    CssomString,
}

/// Metadata for a string type.
#[derive(Debug, Clone, Copy)]
pub struct StringTypeInfo {
    pub id: StringTypeId,
    pub canonical: &'static str,
    /// Name of the runtime routine that performs the conversion.
    pub conversion: &'static str,
}

/// Registry of string types.
pub const STRING_TYPES: &[StringTypeInfo] = &[
    StringTypeInfo {
        id: StringTypeId::DomString,
        canonical: "DOMString",
        conversion: "to_string",
    },
    StringTypeInfo {
        id: StringTypeId::ByteString,
        canonical: "ByteString",
        conversion: "to_byte_string",
    },
    StringTypeInfo {
        id: StringTypeId::UsvString,
        canonical: "USVString",
        conversion: "to_usv_string",
    },
    StringTypeInfo {
        id: StringTypeId::CssomString,
        canonical: "CSSOMString",
        conversion: "to_string",
    },
];

/// Resolve a type name to a [`StringTypeId`].
pub fn from_str(name: &str) -> Option<StringTypeId> {
    STRING_TYPES.iter().find(|t| t.canonical == name).map(|t| t.id)
}

/// Return the canonical spelling for a string type.
pub fn as_str(id: StringTypeId) -> &'static str {
    info_for(id).canonical
}

/// Return the full metadata entry for a string type.
pub fn info_for(id: StringTypeId) -> &'static StringTypeInfo {
    let index = match id {
        StringTypeId::DomString => 0,
        StringTypeId::ByteString => 1,
        StringTypeId::UsvString => 2,
        StringTypeId::CssomString => 3,
    };
    &STRING_TYPES[index]
}

/// Check whether a type name is one of the IDL string types.
pub fn is_string_type(name: &str) -> bool {
    from_str(name).is_some()
}
