//! Generation errors.
//!
//! Every failure the generator can hit is a malformed or unsupported piece of IDL input. The core returns these
//! as values; only the CLI turns them into a process exit.

use miette::Diagnostic;
use thiserror::Error;
use webidl_core::ModelError;

/// Fatal generation error for one interface.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum GenerationError {
    #[error("unsupported type '{ty}' in {context}")]
    #[diagnostic(
        code(webidl::unsupported_type),
        help("only primitive, string, platform-object, buffer, dictionary, enumeration, callback, sequence, record and union types can be mapped")
    )]
    UnsupportedType { ty: String, context: String },

    #[error("malformed type '{ty}': {reason}")]
    #[diagnostic(code(webidl::malformed_type))]
    MalformedType { ty: String, reason: String },

    #[error("unknown dictionary '{name}'")]
    #[diagnostic(code(webidl::unknown_dictionary))]
    UnknownDictionary { name: String },

    #[error("unknown enumeration '{name}'")]
    #[diagnostic(code(webidl::unknown_enumeration))]
    UnknownEnumeration { name: String },

    #[error("enumeration '{name}' declares no values")]
    #[diagnostic(code(webidl::empty_enumeration))]
    EmptyEnumeration { name: String },

    #[error("dictionary '{name}' inherits from itself")]
    #[diagnostic(code(webidl::cyclic_dictionary))]
    CyclicDictionary { name: String },

    #[error("default value '{literal}' is not supported for type '{ty}'")]
    #[diagnostic(code(webidl::unsupported_default))]
    UnsupportedDefault { literal: String, ty: String },

    #[error("inconsistent union '{union}': {reason}")]
    #[diagnostic(
        code(webidl::inconsistent_union),
        help("the flattened member types of a union must be pairwise distinguishable")
    )]
    InconsistentUnion { union: String, reason: String },

    #[error("'{name}' cannot combine [{first}] and [{second}]")]
    #[diagnostic(code(webidl::conflicting_extended_attributes))]
    ConflictingExtendedAttributes {
        name: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("overloads of '{operation}' taking {argument_count} argument(s) have no distinguishing argument index")]
    #[diagnostic(
        code(webidl::no_distinguishing_index),
        help("overloads with the same argument count must differ by type at some argument position")
    )]
    NoDistinguishingIndex { operation: String, argument_count: usize },

    #[error("generated source does not parse: {0}")]
    #[diagnostic(code(webidl::syn_parse))]
    SynParse(String),
}

impl From<ModelError> for GenerationError {
    fn from(error: ModelError) -> Self {
        match error {
            ModelError::UnknownDictionary { name, .. } => GenerationError::UnknownDictionary { name },
            ModelError::UnknownEnumeration { name, .. } => GenerationError::UnknownEnumeration { name },
            ModelError::CyclicDictionary { name } => GenerationError::CyclicDictionary { name },
        }
    }
}

/// Shorthand for results of generation steps.
pub type GenerationResult<T> = Result<T, GenerationError>;
