//! IDL type descriptors.
//!
//! A [`Type`] is one of three shapes: a plain named type (`long`, `DOMString`, `Node`), a parameterized type
//! (`sequence<T>`, `record<K, V>`, `Promise<T>`) or a union. Every shape carries its own nullability.
//!
//! ## Notes
//! - Descriptors are value types: cloning is cheap enough for the generator's needs and equality is structural.
//! - Shape invariants (`sequence` has one parameter, `record` has two with a string key) are checked by the
//!   generator's classifier, which reports violations as errors instead of panicking here.
//!
//! ## Examples
//! ```rust
//! use webidl_core::Type;
//!
//! let ty = Type::union(vec![Type::plain("DOMString"), Type::sequence(Type::plain("long"))]).nullable();
//! assert_eq!(ty.to_string(), "(DOMString or sequence<long>)?");
//! assert_eq!(ty.flattened_member_types().len(), 2);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lang::{numerics, objects, parameterized, strings};

/// Descriptor of an IDL type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Type {
    Plain {
        name: String,
        #[serde(default)]
        nullable: bool,
    },
    Parameterized {
        name: String,
        #[serde(default)]
        nullable: bool,
        parameters: Vec<Type>,
    },
    Union {
        #[serde(default = "union_name")]
        name: String,
        #[serde(default)]
        nullable: bool,
        members: Vec<Type>,
    },
}

fn union_name() -> String {
    "union".to_string()
}

// ============================================================================
// Construction
// ============================================================================

impl Type {
    pub fn plain(name: impl Into<String>) -> Self {
        Type::Plain {
            name: name.into(),
            nullable: false,
        }
    }

    pub fn parameterized(name: impl Into<String>, parameters: Vec<Type>) -> Self {
        Type::Parameterized {
            name: name.into(),
            nullable: false,
            parameters,
        }
    }

    pub fn sequence(element: Type) -> Self {
        Self::parameterized(parameterized::SEQUENCE, vec![element])
    }

    pub fn record(key: Type, value: Type) -> Self {
        Self::parameterized(parameterized::RECORD, vec![key, value])
    }

    pub fn union(members: Vec<Type>) -> Self {
        Type::Union {
            name: union_name(),
            nullable: false,
            members,
        }
    }

    /// Return a copy of this type marked nullable (`T?`).
    pub fn nullable(self) -> Self {
        self.with_nullable(true)
    }

    /// Return a copy of this type with nullability set to `nullable`.
    pub fn with_nullable(mut self, value: bool) -> Self {
        match &mut self {
            Type::Plain { nullable, .. } | Type::Parameterized { nullable, .. } | Type::Union { nullable, .. } => {
                *nullable = value
            }
        }
        self
    }
}

// ============================================================================
// Accessors and predicates
// ============================================================================

impl Type {
    pub fn name(&self) -> &str {
        match self {
            Type::Plain { name, .. } | Type::Parameterized { name, .. } | Type::Union { name, .. } => name,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Type::Plain { nullable, .. } | Type::Parameterized { nullable, .. } | Type::Union { nullable, .. } => {
                *nullable
            }
        }
    }

    /// Type parameters of a parameterized type; empty for the other shapes.
    pub fn parameters(&self) -> &[Type] {
        match self {
            Type::Parameterized { parameters, .. } => parameters,
            _ => &[],
        }
    }

    /// Direct (unflattened) members of a union; empty for the other shapes.
    pub fn members(&self) -> &[Type] {
        match self {
            Type::Union { members, .. } => members,
            _ => &[],
        }
    }

    fn is_plain_named(&self, expected: &str) -> bool {
        matches!(self, Type::Plain { name, .. } if name == expected)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Plain { name, .. } if strings::is_string_type(name))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Plain { name, .. } if numerics::integer_from_str(name).is_some())
    }

    pub fn is_floating_point(&self) -> bool {
        matches!(self, Type::Plain { name, .. } if numerics::float_from_str(name).is_some())
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_floating_point()
    }

    pub fn is_boolean(&self) -> bool {
        self.is_plain_named("boolean")
    }

    pub fn is_bigint(&self) -> bool {
        self.is_plain_named("bigint")
    }

    /// WebIDL primitive types: `bigint`, `boolean` and the numeric types.
    pub fn is_primitive(&self) -> bool {
        self.is_numeric() || self.is_boolean() || self.is_bigint()
    }

    pub fn is_any(&self) -> bool {
        self.is_plain_named("any")
    }

    pub fn is_undefined(&self) -> bool {
        self.is_plain_named("undefined")
    }

    pub fn is_object(&self) -> bool {
        self.is_plain_named(objects::OBJECT)
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Type::Parameterized { name, .. } if name == parameterized::SEQUENCE)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Type::Parameterized { name, .. } if name == parameterized::RECORD)
    }

    pub fn is_promise(&self) -> bool {
        self.name() == objects::PROMISE && !self.is_union()
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Type::Union { .. })
    }
}

// ============================================================================
// Union helpers
// ============================================================================

impl Type {
    /// Flattened member types of a union.
    ///
    /// Nested unions are inlined into the parent's member list and nullability is stripped from every member
    /// (it is accounted for by [`Type::number_of_nullable_member_types`] instead). Non-union types have no
    /// flattened members.
    pub fn flattened_member_types(&self) -> Vec<Type> {
        let mut flattened = Vec::new();
        for member in self.members() {
            if member.is_union() {
                flattened.extend(member.flattened_member_types());
            } else {
                flattened.push(member.clone().with_nullable(false));
            }
        }
        flattened
    }

    /// Count the nullable members of a union, descending into nested unions.
    pub fn number_of_nullable_member_types(&self) -> usize {
        self.members()
            .iter()
            .map(|member| {
                let own = usize::from(member.is_nullable());
                if member.is_union() {
                    own + member.number_of_nullable_member_types()
                } else {
                    own
                }
            })
            .sum()
    }

    /// A type includes a nullable type when it is nullable itself or is a union with exactly one nullable member.
    pub fn includes_nullable_type(&self) -> bool {
        self.is_nullable() || (self.is_union() && self.number_of_nullable_member_types() == 1)
    }

    /// A type includes `undefined` when it is `undefined` or a union with `undefined` among its members.
    pub fn includes_undefined(&self) -> bool {
        self.is_undefined() || self.members().iter().any(Type::includes_undefined)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Plain { name, .. } => write!(f, "{name}")?,
            Type::Parameterized { name, parameters, .. } => {
                write!(f, "{name}<")?;
                for (i, parameter) in parameters.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{parameter}")?;
                }
                write!(f, ">")?;
            }
            Type::Union { members, .. } => {
                write!(f, "(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " or ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, ")")?;
            }
        }
        if self.is_nullable() {
            write!(f, "?")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_idl_syntax() {
        let ty = Type::record(Type::plain("DOMString"), Type::plain("long").nullable());
        assert_eq!(ty.to_string(), "record<DOMString, long?>");
    }

    #[test]
    fn flattening_inlines_nested_unions_and_strips_nullability() {
        let inner = Type::union(vec![Type::plain("Node").nullable(), Type::plain("DOMString")]);
        let outer = Type::union(vec![inner, Type::plain("long")]);
        let flattened = outer.flattened_member_types();
        assert_eq!(
            flattened,
            vec![Type::plain("Node"), Type::plain("DOMString"), Type::plain("long")]
        );
        assert_eq!(outer.number_of_nullable_member_types(), 1);
        assert!(outer.includes_nullable_type());
    }

    #[test]
    fn includes_undefined_descends_into_members() {
        let nested = Type::union(vec![Type::plain("undefined"), Type::plain("boolean")]);
        let outer = Type::union(vec![nested, Type::plain("DOMString")]);
        assert!(outer.includes_undefined());
        assert!(!Type::union(vec![Type::plain("long"), Type::plain("DOMString")]).includes_undefined());
    }

    #[test]
    fn predicates_follow_vocabulary() {
        assert!(Type::plain("unsigned long long").is_integer());
        assert!(Type::plain("unrestricted float").is_numeric());
        assert!(Type::plain("bigint").is_primitive());
        assert!(!Type::plain("DOMString").is_primitive());
        assert!(Type::plain("USVString").is_string());
        assert!(Type::sequence(Type::plain("long")).is_sequence());
        assert!(!Type::plain("sequence").is_sequence());
    }

    #[test]
    fn deserializes_tagged_json() {
        let json = r#"{"kind":"parameterized","name":"sequence","parameters":[{"kind":"plain","name":"Node"}]}"#;
        let ty: Type = serde_json::from_str(json).unwrap();
        assert_eq!(ty, Type::sequence(Type::plain("Node")));
    }
}
