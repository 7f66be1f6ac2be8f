//! Type classifier: IDL type descriptor -> host storage type.
//!
//! [`classify`] is a pure function of the type and the interface it is looked up in. It decides the Rust type a
//! converted value is stored in and whether that storage holds heap-tracked handles (which the host must keep
//! visible to its collector) or flat values.
//!
//! The same module derives the WebIDL distinguishability categories used by the overload resolver and by union
//! validation ([`category_of`], [`are_distinguishable`]).
//!
//! ## Notes
//! - There is no fallback mapping: a name that is not primitive, string, platform object, buffer, callback,
//!   dictionary or enumeration is [`GenerationError::UnsupportedType`].
//! - Shape invariants of parameterized types are checked here, before anything recurses into them.

use std::fmt;

use webidl_core::lang::parameterized::{self, ParameterizedTypeId};
use webidl_core::lang::{numerics, objects};
use webidl_core::{Interface, Type};

use super::errors::{GenerationError, GenerationResult};

/// Whether a host value is a flat value or holds handles into the script heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Flat,
    HeapTracked,
}

/// Host storage for an IDL type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostType {
    pub name: String,
    pub storage: StorageKind,
}

impl HostType {
    fn flat(name: impl Into<String>) -> Self {
        HostType {
            name: name.into(),
            storage: StorageKind::Flat,
        }
    }

    fn heap_tracked(name: impl Into<String>) -> Self {
        HostType {
            name: name.into(),
            storage: StorageKind::HeapTracked,
        }
    }

    pub fn is_heap_tracked(&self) -> bool {
        self.storage == StorageKind::HeapTracked
    }

    fn optional(self) -> Self {
        HostType {
            name: format!("Option<{}>", self.name),
            storage: self.storage,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============================================================================
// Shape validation
// ============================================================================

/// Check the structural invariants of a type descriptor, recursively.
pub fn check_shape(ty: &Type) -> GenerationResult<()> {
    let malformed = |reason: &str| GenerationError::MalformedType {
        ty: ty.to_string(),
        reason: reason.to_string(),
    };
    match ty {
        Type::Plain { .. } => Ok(()),
        Type::Parameterized { name, parameters, .. } => {
            if let Some(id) = parameterized::from_str(name) {
                let arity = parameterized::info(id).arity;
                if parameters.len() != arity {
                    let plural = if arity == 1 { "" } else { "s" };
                    return Err(malformed(&format!("{name} takes exactly {arity} type parameter{plural}")));
                }
                if id == ParameterizedTypeId::Record && (!parameters[0].is_string() || parameters[0].is_nullable()) {
                    return Err(malformed("record keys must be a non-nullable string type"));
                }
            }
            parameters.iter().try_for_each(check_shape)
        }
        Type::Union { members, .. } => {
            if members.len() < 2 {
                return Err(malformed("a union needs at least two member types"));
            }
            members.iter().try_for_each(check_shape)
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Map an IDL type to its host storage type.
///
/// ## Parameters
/// - `ty`: Type to classify.
/// - `interface`: Interface used to resolve dictionary, enumeration and callback names.
///
/// ## Returns
/// - The [`HostType`]; nullable types are wrapped in `Option<..>` except `any`, whose host type already carries
///   null.
///
/// ## Errors
/// - [`GenerationError::MalformedType`] for shape violations.
/// - [`GenerationError::UnsupportedType`] for names with no mapping.
pub fn classify(ty: &Type, interface: &Interface) -> GenerationResult<HostType> {
    check_shape(ty)?;
    let host = classify_inner(ty, interface)?;
    if ty.is_nullable() && !ty.is_any() {
        Ok(host.optional())
    } else {
        Ok(host)
    }
}

/// Host type of a union ignoring its own nullability: `Union{N}<...>` over the flattened members.
pub fn classify_union_members(ty: &Type, interface: &Interface) -> GenerationResult<HostType> {
    let mut names = Vec::new();
    let mut storage = StorageKind::Flat;
    for member in ty.flattened_member_types() {
        if member.is_undefined() {
            continue;
        }
        let host = classify(&member, interface)?;
        if host.is_heap_tracked() {
            storage = StorageKind::HeapTracked;
        }
        names.push(host.name);
    }
    if ty.includes_undefined() {
        names.push("Empty".to_string());
    }
    Ok(HostType {
        name: format!("Union{}<{}>", names.len(), names.join(", ")),
        storage,
    })
}

fn classify_inner(ty: &Type, interface: &Interface) -> GenerationResult<HostType> {
    match ty {
        Type::Union { .. } => classify_union_members(ty, interface),
        Type::Parameterized { name, parameters, .. } => match parameterized::from_str(name) {
            Some(ParameterizedTypeId::Sequence) => {
                let element = classify(&parameters[0], interface)?;
                if element.is_heap_tracked() {
                    Ok(HostType::heap_tracked(format!("MarkedVector<{}>", element.name)))
                } else {
                    Ok(HostType::flat(format!("Vec<{}>", element.name)))
                }
            }
            Some(ParameterizedTypeId::Record) => {
                let key = classify(&parameters[0], interface)?;
                let value = classify(&parameters[1], interface)?;
                let name = format!("IndexMap<{}, {}>", key.name, value.name);
                if value.is_heap_tracked() {
                    Ok(HostType::heap_tracked(name))
                } else {
                    Ok(HostType::flat(name))
                }
            }
            Some(ParameterizedTypeId::Promise) => Ok(HostType::heap_tracked("Handle<Promise>")),
            None => Err(unsupported(ty, "parameterized type")),
        },
        Type::Plain { name, .. } => classify_plain(ty, name, interface),
    }
}

fn classify_plain(ty: &Type, name: &str, interface: &Interface) -> GenerationResult<HostType> {
    if ty.is_any() || ty.is_undefined() {
        return Ok(HostType::heap_tracked("Value"));
    }
    if ty.is_object() {
        return Ok(HostType::heap_tracked("Handle<Object>"));
    }
    if ty.is_string() {
        return Ok(HostType::flat("String"));
    }
    if ty.is_boolean() {
        return Ok(HostType::flat("bool"));
    }
    if let Some(keyword) = numerics::integer_from_str(name) {
        return Ok(HostType::flat(numerics::integer_info(keyword).host_type));
    }
    if let Some(keyword) = numerics::float_from_str(name) {
        return Ok(HostType::flat(numerics::float_info(keyword).host_type));
    }
    if ty.is_bigint() {
        return Ok(HostType::heap_tracked("BigInt"));
    }
    if objects::is_platform_object(name) || name == objects::WINDOW_PROXY {
        return Ok(HostType::heap_tracked(format!("Handle<{name}>")));
    }
    if objects::buffer_source_from_str(name).is_some() {
        return Ok(HostType::heap_tracked("Handle<Object>"));
    }
    if name == objects::PROMISE {
        return Ok(HostType::heap_tracked("Handle<Promise>"));
    }
    if interface.is_callback_function(name) {
        return Ok(HostType::heap_tracked("Handle<CallbackType>"));
    }
    if interface.is_dictionary(name) || interface.is_enumeration(name) {
        return Ok(HostType::flat(name));
    }
    Err(unsupported(ty, &format!("interface '{}'", interface.name)))
}

fn unsupported(ty: &Type, context: &str) -> GenerationError {
    GenerationError::UnsupportedType {
        ty: ty.to_string(),
        context: context.to_string(),
    }
}

// ============================================================================
// Distinguishability
// ============================================================================

/// WebIDL distinguishability categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Any,
    Undefined,
    Boolean,
    Numeric,
    BigInt,
    /// String types and enumerations.
    String,
    Object,
    Symbol,
    /// Platform objects, buffer sources and `WindowProxy`.
    InterfaceLike,
    CallbackFunction,
    /// Dictionaries and records.
    DictionaryLike,
    SequenceLike,
    Union,
}

/// Determine the distinguishability category of a type.
pub fn category_of(ty: &Type, interface: &Interface) -> GenerationResult<TypeCategory> {
    if ty.is_union() {
        return Ok(TypeCategory::Union);
    }
    if ty.is_sequence() {
        return Ok(TypeCategory::SequenceLike);
    }
    if ty.is_record() {
        return Ok(TypeCategory::DictionaryLike);
    }
    if ty.is_promise() {
        return Ok(TypeCategory::Object);
    }
    let name = ty.name();
    let category = if ty.is_any() {
        TypeCategory::Any
    } else if ty.is_undefined() {
        TypeCategory::Undefined
    } else if ty.is_boolean() {
        TypeCategory::Boolean
    } else if ty.is_numeric() {
        TypeCategory::Numeric
    } else if ty.is_bigint() {
        TypeCategory::BigInt
    } else if ty.is_string() || interface.is_enumeration(name) {
        TypeCategory::String
    } else if ty.is_object() {
        TypeCategory::Object
    } else if name == objects::SYMBOL {
        TypeCategory::Symbol
    } else if objects::is_platform_object(name)
        || objects::buffer_source_from_str(name).is_some()
        || name == objects::WINDOW_PROXY
    {
        TypeCategory::InterfaceLike
    } else if interface.is_callback_function(name) {
        TypeCategory::CallbackFunction
    } else if interface.is_dictionary(name) {
        TypeCategory::DictionaryLike
    } else {
        return Err(unsupported(ty, "distinguishability check"));
    };
    Ok(category)
}

/// Decide whether two types are distinguishable per WebIDL.
///
/// Two interface-like types with different names are treated as distinguishable; telling them apart is left to
/// the runtime `implements` test performed during dispatch.
pub fn are_distinguishable(a: &Type, b: &Type, interface: &Interface) -> GenerationResult<bool> {
    if (a.includes_nullable_type() && accepts_null_or_dictionary(b, interface)?)
        || (b.includes_nullable_type() && accepts_null_or_dictionary(a, interface)?)
    {
        return Ok(false);
    }
    let left = members_or_self(a);
    let right = members_or_self(b);
    for x in &left {
        for y in &right {
            let cx = category_of(x, interface)?;
            let cy = category_of(y, interface)?;
            if !categories_distinguishable(cx, cy, x.name(), y.name()) {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Does `ty` include a nullable type, or a dictionary type (possibly as a union member)?
fn accepts_null_or_dictionary(ty: &Type, interface: &Interface) -> GenerationResult<bool> {
    if ty.includes_nullable_type() {
        return Ok(true);
    }
    for member in members_or_self(ty) {
        if category_of(&member, interface)? == TypeCategory::DictionaryLike && !member.is_record() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn members_or_self(ty: &Type) -> Vec<Type> {
    if ty.is_union() {
        ty.flattened_member_types()
    } else {
        vec![ty.clone().with_nullable(false)]
    }
}

fn categories_distinguishable(a: TypeCategory, b: TypeCategory, a_name: &str, b_name: &str) -> bool {
    use TypeCategory::*;
    match (a, b) {
        (Any, _) | (_, Any) => false,
        (InterfaceLike, InterfaceLike) => a_name != b_name,
        (x, y) if x == y => false,
        (Object, InterfaceLike | CallbackFunction | DictionaryLike | SequenceLike)
        | (InterfaceLike | CallbackFunction | DictionaryLike | SequenceLike, Object) => false,
        (Undefined, DictionaryLike) | (DictionaryLike, Undefined) => false,
        _ => true,
    }
}
