//! Extended attribute vocabulary.
//!
//! Only the attributes that change conversion or naming behavior are listed; anything else in an input bag is
//! ignored by [`ExtendedAttributes`](crate::ExtendedAttributes).

/// Stable identifier for recognized extended attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedAttributeId {
    LegacyNullToEmptyString,
    Clamp,
    EnforceRange,
    ImplementedAs,
    LegacyTreatNonObjectAsNull,
}

/// Metadata for an extended attribute.
#[derive(Debug, Clone, Copy)]
pub struct ExtendedAttributeInfo {
    pub id: ExtendedAttributeId,
    pub canonical: &'static str,
    /// `true` when the attribute carries an identifier (`[ImplementedAs=name]`).
    pub takes_value: bool,
}

/// Registry of recognized extended attributes.
pub const EXTENDED_ATTRIBUTES: &[ExtendedAttributeInfo] = &[
    ExtendedAttributeInfo {
        id: ExtendedAttributeId::LegacyNullToEmptyString,
        canonical: "LegacyNullToEmptyString",
        takes_value: false,
    },
    ExtendedAttributeInfo {
        id: ExtendedAttributeId::Clamp,
        canonical: "Clamp",
        takes_value: false,
    },
    ExtendedAttributeInfo {
        id: ExtendedAttributeId::EnforceRange,
        canonical: "EnforceRange",
        takes_value: false,
    },
    ExtendedAttributeInfo {
        id: ExtendedAttributeId::ImplementedAs,
        canonical: "ImplementedAs",
        takes_value: true,
    },
    ExtendedAttributeInfo {
        id: ExtendedAttributeId::LegacyTreatNonObjectAsNull,
        canonical: "LegacyTreatNonObjectAsNull",
        takes_value: false,
    },
];

/// Resolve an attribute name to an [`ExtendedAttributeId`].
pub fn from_str(name: &str) -> Option<ExtendedAttributeId> {
    EXTENDED_ATTRIBUTES.iter().find(|a| a.canonical == name).map(|a| a.id)
}

/// Return the canonical spelling for an extended attribute.
pub fn as_str(id: ExtendedAttributeId) -> &'static str {
    EXTENDED_ATTRIBUTES
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.canonical)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spellings_round_trip() {
        for info in EXTENDED_ATTRIBUTES {
            assert_eq!(from_str(info.canonical), Some(info.id));
            assert_eq!(as_str(info.id), info.canonical);
        }
    }
}
