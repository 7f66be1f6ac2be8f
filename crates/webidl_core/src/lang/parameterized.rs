//! Parameterized type vocabulary: `sequence<T>`, `record<K, V>` and `Promise<T>`.
//!
//! ## Notes
//! - The arity is checked before classification; a `record` key must additionally be a non-nullable string
//!   type, which is a shape rule of the classifier rather than a vocabulary fact.

use super::objects;

/// Stable identifier for parameterized IDL types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterizedTypeId {
    Sequence,
    Record,
    Promise,
}

/// Metadata for a parameterized type.
#[derive(Debug, Clone, Copy)]
pub struct ParameterizedTypeInfo {
    pub id: ParameterizedTypeId,
    pub canonical: &'static str,
    /// Number of type parameters the type takes.
    pub arity: usize,
}

pub const SEQUENCE: &str = "sequence";
pub const RECORD: &str = "record";

/// Registry of parameterized types.
pub const PARAMETERIZED_TYPES: &[ParameterizedTypeInfo] = &[
    ParameterizedTypeInfo {
        id: ParameterizedTypeId::Sequence,
        canonical: SEQUENCE,
        arity: 1,
    },
    ParameterizedTypeInfo {
        id: ParameterizedTypeId::Record,
        canonical: RECORD,
        arity: 2,
    },
    ParameterizedTypeInfo {
        id: ParameterizedTypeId::Promise,
        canonical: objects::PROMISE,
        arity: 1,
    },
];

pub fn from_str(name: &str) -> Option<ParameterizedTypeId> {
    PARAMETERIZED_TYPES
        .iter()
        .find(|info| info.canonical == name)
        .map(|info| info.id)
}

pub fn info(id: ParameterizedTypeId) -> &'static ParameterizedTypeInfo {
    let index = match id {
        ParameterizedTypeId::Sequence => 0,
        ParameterizedTypeId::Record => 1,
        ParameterizedTypeId::Promise => 2,
    };
    &PARAMETERIZED_TYPES[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_exact() {
        assert_eq!(from_str("sequence"), Some(ParameterizedTypeId::Sequence));
        assert_eq!(from_str("Promise"), Some(ParameterizedTypeId::Promise));
        assert_eq!(from_str("Sequence"), None);
        assert_eq!(from_str("FrozenArray"), None);
    }

    #[test]
    fn every_id_has_its_own_entry() {
        for entry in PARAMETERIZED_TYPES {
            assert_eq!(info(entry.id).canonical, entry.canonical);
        }
        assert_eq!(info(ParameterizedTypeId::Record).arity, 2);
    }
}
