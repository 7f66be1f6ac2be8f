//! Interpretive converters: script value <-> [`HostValue`], driven by an IDL type at runtime.
//!
//! Generated bindings convert with straight-line code specialised per type. [`RuntimeConverter`] performs the
//! same conversions by walking the type instead, using the generator's own plans ([`UnionPlan`], dictionary
//! member order, default parsing), so both sides can be checked against each other and against scripted
//! values without compiling generated code.
//!
//! ## Notes
//! - Dictionaries convert into a map keyed by IDL member name, holding only the members that are present or
//!   defaulted.
//! - Enumerations convert to their host identifier; wrapping maps the identifier back to the wire string.
//! - The attribute-setter enum fallback (silently ignoring the assignment) is a call-site concern and is not
//!   modelled here; unknown enum values always throw.

use indexmap::IndexMap;
use thiserror::Error;
use webidl_core::lang::{numerics, objects, strings};
use webidl_core::{ExtendedAttributes, Interface, Parameter, Type};

use super::abstract_ops::{
    FloatMode, convert_number_to_integer, convert_to_double, convert_to_float, to_bigint, to_boolean,
    to_byte_string, to_display_string, to_numeric, to_number, to_string, to_usv_string,
};
use super::errors::{ErrorType, TypeError};
use super::handle::{Object, promise_resolve, require_object, to_buffer_source, to_callback, to_platform_object};
use super::realm::Realm;
use super::value::{BigInt, Numeric, ObjectId, Value};
use crate::backend::convert::defaults::{DefaultValue, parse_default};
use crate::backend::classify::check_shape;
use crate::backend::convert::dictionary::dictionary_members;
use crate::backend::convert::{NO_ATTRIBUTES, integer_mode};
use crate::backend::convert::union::{ArmTest, UnionFallback, UnionPlan};
use crate::backend::errors::GenerationError;

/// A converted IDL value.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    /// `None` of a nullable or optional value.
    Null,
    /// `any` / `undefined`: the script value itself.
    Any(Value),
    Boolean(bool),
    Integer(i128),
    Float(f64),
    BigInt(BigInt),
    String(String),
    /// An enumeration value, by host identifier.
    Enum(String),
    /// Any checked object handle.
    Object(ObjectId),
    Sequence(Vec<HostValue>),
    Record(IndexMap<String, HostValue>),
    Dictionary(IndexMap<String, HostValue>),
    Union { variant: usize, value: Box<HostValue> },
    /// The `undefined` case of a union.
    Empty,
}

/// Failure of an interpretive conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// The script threw.
    #[error(transparent)]
    Thrown(#[from] TypeError),
    /// The type itself cannot be converted.
    #[error(transparent)]
    Generation(#[from] GenerationError),
    /// A host value does not have the shape its type requires.
    #[error("host value {value} does not fit type '{ty}'")]
    Mismatch { ty: String, value: String },
}

pub type ConvertResult<T> = Result<T, ConvertError>;

/// Converts between script values and host values for the types of one interface.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeConverter<'a> {
    pub(super) interface: &'a Interface,
}

impl<'a> RuntimeConverter<'a> {
    pub fn new(interface: &'a Interface) -> Self {
        RuntimeConverter { interface }
    }

    /// Convert `value` to `ty` with no extended attributes, citing `label` in errors.
    pub fn to_host(&self, realm: &mut Realm, value: &Value, ty: &Type, label: &str) -> ConvertResult<HostValue> {
        self.to_host_with(realm, value, ty, &NO_ATTRIBUTES, label)
    }

    /// Convert `value` to `ty` under `attributes`.
    ///
    /// ## Errors
    /// - [`ConvertError::Thrown`] for every `TypeError` the conversion raises.
    /// - [`ConvertError::Generation`] when the type is unsupported or its attributes conflict.
    pub fn to_host_with(
        &self,
        realm: &mut Realm,
        value: &Value,
        ty: &Type,
        attributes: &ExtendedAttributes,
        label: &str,
    ) -> ConvertResult<HostValue> {
        check_shape(ty)?;
        let name = ty.name();
        if ty.is_nullable() && !ty.is_any() && !self.interface.is_dictionary(name) {
            if self.legacy_callback(ty, attributes) {
                return Ok(match value.as_object() {
                    Some(object) => HostValue::Object(object),
                    None => HostValue::Null,
                });
            }
            if value.is_nullish() {
                return Ok(HostValue::Null);
            }
            return self.to_host_with(realm, value, &ty.clone().with_nullable(false), attributes, label);
        }

        if ty.is_union() {
            return self.union(realm, value, ty, label);
        }
        if let Some(string_type) = strings::from_str(name) {
            if attributes.legacy_null_to_empty_string && value.is_null() {
                return Ok(HostValue::String(String::new()));
            }
            let converted = match string_type {
                strings::StringTypeId::ByteString => to_byte_string(realm, value)?,
                strings::StringTypeId::UsvString => to_usv_string(realm, value)?,
                strings::StringTypeId::DomString | strings::StringTypeId::CssomString => to_string(realm, value)?,
            };
            return Ok(HostValue::String(converted));
        }
        if ty.is_any() || ty.is_undefined() {
            return Ok(HostValue::Any(value.clone()));
        }
        if let Some(keyword) = numerics::integer_from_str(name) {
            let mode = integer_mode(attributes, label)?;
            let number = to_number(realm, value)?;
            let integer = convert_number_to_integer(number, numerics::integer_info(keyword), mode, label)?;
            return Ok(HostValue::Integer(integer));
        }
        if let Some(keyword) = numerics::float_from_str(name) {
            let info = numerics::float_info(keyword);
            let mode = if info.restricted { FloatMode::Restricted } else { FloatMode::Unrestricted };
            let number = if info.single_precision {
                f64::from(convert_to_float(realm, value, mode, label)?)
            } else {
                convert_to_double(realm, value, mode, label)?
            };
            return Ok(HostValue::Float(number));
        }
        if ty.is_boolean() {
            return Ok(HostValue::Boolean(to_boolean(value)));
        }
        if ty.is_bigint() {
            return Ok(HostValue::BigInt(to_bigint(realm, value)?));
        }
        if ty.is_sequence() {
            return self.sequence(realm, value, &ty.parameters()[0], label);
        }
        if ty.is_record() {
            return self.record(realm, value, ty, label);
        }
        if self.interface.is_enumeration(name) {
            return self.enumeration(realm, value, name);
        }
        if self.interface.is_dictionary(name) {
            return self.dictionary(realm, value, name);
        }
        if self.interface.is_callback_function(name) {
            return Ok(HostValue::Object(to_callback(realm, value, label)?.object()));
        }
        let object = if ty.is_object() {
            require_object(realm, value)?.object()
        } else if ty.is_promise() {
            promise_resolve(realm, value).object()
        } else if objects::buffer_source_from_str(name).is_some() {
            to_buffer_source(realm, value, name)?.object()
        } else if objects::is_platform_object(name) || name == objects::WINDOW_PROXY {
            to_platform_object::<Object>(realm, value, name)?.object()
        } else {
            return Err(GenerationError::UnsupportedType {
                ty: ty.to_string(),
                context: format!("runtime conversion of '{label}'"),
            }
            .into());
        };
        Ok(HostValue::Object(object))
    }

    /// Convert argument `index` of a call for `parameter`, the way a generated operation body does.
    ///
    /// A variadic parameter collects every remaining argument into a sequence. An optional parameter passed
    /// `undefined` takes, in order: an enumeration's first member (even when a default literal names another),
    /// its default literal, a dictionary converted from `undefined`, or `Null`.
    pub fn argument_to_host(
        &self,
        realm: &mut Realm,
        arguments: &[Value],
        index: usize,
        parameter: &Parameter,
    ) -> ConvertResult<HostValue> {
        let attributes = &parameter.extended_attributes;
        if parameter.variadic {
            let rest = arguments.get(index..).unwrap_or_default();
            let mut items = Vec::with_capacity(rest.len());
            for value in rest {
                items.push(self.to_host_with(realm, value, &parameter.ty, attributes, &parameter.name)?);
            }
            return Ok(HostValue::Sequence(items));
        }

        let value = arguments.get(index).cloned().unwrap_or_default();
        if parameter.optional && value.is_undefined() {
            if let Some(first) = self.absent_enumeration(&parameter.ty, parameter.default_value.as_deref())? {
                return Ok(first);
            }
            if let Some(literal) = &parameter.default_value {
                let default = parse_default(literal, &parameter.ty, self.interface)?;
                return self.default_to_host(realm, &default, &parameter.ty);
            }
            if !self.interface.is_dictionary(parameter.ty.name()) {
                return Ok(HostValue::Null);
            }
        }
        self.to_host_with(realm, &value, &parameter.ty, attributes, &parameter.name)
    }

    /// The value an absent optional enumeration takes: its first declared member, whatever the default literal
    /// says. The literal is still checked. `None` when `ty` is not an enumeration.
    fn absent_enumeration(&self, ty: &Type, default_value: Option<&str>) -> ConvertResult<Option<HostValue>> {
        let name = ty.name();
        let Some(enumeration) = self.interface.enumeration(name) else {
            return Ok(None);
        };
        if let Some(literal) = default_value {
            parse_default(literal, ty, self.interface)?;
        }
        let (_, first) = enumeration
            .first_member()
            .ok_or_else(|| GenerationError::EmptyEnumeration { name: name.to_string() })?;
        Ok(Some(HostValue::Enum(first.to_string())))
    }

    fn legacy_callback(&self, ty: &Type, attributes: &ExtendedAttributes) -> bool {
        self.interface
            .callback_function(ty.name())
            .is_some_and(|callback| callback.is_legacy_treat_non_object_as_null || attributes.legacy_treat_non_object_as_null)
    }

    // ========================================================================
    // Composites
    // ========================================================================

    fn sequence(&self, realm: &mut Realm, value: &Value, element: &Type, label: &str) -> ConvertResult<HostValue> {
        if !value.is_object() {
            return Err(TypeError::new(ErrorType::NotAnObject, &[&to_display_string(realm, value)]).into());
        }
        let Some(method) = realm.get_iterator_method(value)? else {
            return Err(TypeError::new(ErrorType::NotIterable, &[&to_display_string(realm, value)]).into());
        };
        let mut iterator = realm.get_iterator(value, method)?;
        let mut items = Vec::new();
        while let Some(item) = realm.iterator_step(&mut iterator)? {
            items.push(self.to_host(realm, &item, element, label)?);
        }
        Ok(HostValue::Sequence(items))
    }

    fn record(&self, realm: &mut Realm, value: &Value, ty: &Type, label: &str) -> ConvertResult<HostValue> {
        let Some(object) = value.as_object() else {
            return Err(TypeError::new(ErrorType::NotAnObject, &[&to_display_string(realm, value)]).into());
        };
        let key_type = &ty.parameters()[0];
        let value_type = &ty.parameters()[1];
        let mut entries = IndexMap::new();
        for key in realm.own_property_keys(object) {
            if !realm.get_own_property(object, &key).is_some_and(|descriptor| descriptor.enumerable) {
                continue;
            }
            let typed_key = match self.to_host(realm, &Value::String(key.clone()), key_type, label)? {
                HostValue::String(typed_key) => typed_key,
                other => return Err(mismatch(key_type, &other)),
            };
            let property = realm.get(object, &key)?;
            entries.insert(typed_key, self.to_host(realm, &property, value_type, label)?);
        }
        Ok(HostValue::Record(entries))
    }

    fn enumeration(&self, realm: &mut Realm, value: &Value, name: &str) -> ConvertResult<HostValue> {
        let enumeration = self
            .interface
            .enumeration(name)
            .ok_or_else(|| GenerationError::UnknownEnumeration { name: name.to_string() })?;
        let wire = to_string(realm, value)?;
        match enumeration.host_identifier_for(&wire) {
            Some(host) => Ok(HostValue::Enum(host.to_string())),
            None => Err(TypeError::new(ErrorType::InvalidEnumerationValue, &[&wire, name]).into()),
        }
    }

    fn dictionary(&self, realm: &mut Realm, value: &Value, name: &str) -> ConvertResult<HostValue> {
        if !value.is_nullish() && !value.is_object() {
            return Err(TypeError::new(ErrorType::NotAnObjectOfType, &[&to_display_string(realm, value), name]).into());
        }
        let mut members = IndexMap::new();
        for member in dictionary_members(self.interface, name)? {
            let property = match value.as_object() {
                Some(object) => realm.get(object, &member.name)?,
                None => Value::Undefined,
            };
            if property.is_undefined() {
                if member.required {
                    return Err(TypeError::new(ErrorType::MissingRequiredProperty, &[&member.name]).into());
                }
                if let Some(literal) = &member.default_value {
                    let host = match self.absent_enumeration(&member.ty, Some(literal))? {
                        Some(first) => first,
                        None => {
                            let default = parse_default(literal, &member.ty, self.interface)?;
                            self.default_to_host(realm, &default, &member.ty)?
                        }
                    };
                    members.insert(member.name.clone(), host);
                }
                continue;
            }
            let converted = self.to_host_with(realm, &property, &member.ty, &member.extended_attributes, &member.name)?;
            members.insert(member.name.clone(), converted);
        }
        Ok(HostValue::Dictionary(members))
    }

    /// Materialise a parsed default literal as a host value of `ty`.
    pub fn default_to_host(&self, realm: &mut Realm, default: &DefaultValue, ty: &Type) -> ConvertResult<HostValue> {
        let value = match default {
            DefaultValue::Null => HostValue::Null,
            DefaultValue::Undefined if ty.is_union() => HostValue::Empty,
            DefaultValue::Undefined => HostValue::Any(Value::Undefined),
            DefaultValue::Boolean(boolean) => self.to_host(realm, &Value::Boolean(*boolean), ty, "default")?,
            DefaultValue::Integer(integer) => self.to_host(realm, &Value::Number(*integer as f64), ty, "default")?,
            DefaultValue::Float(float) => self.to_host(realm, &Value::Number(*float), ty, "default")?,
            DefaultValue::String(string) => self.to_host(realm, &Value::String(string.clone()), ty, "default")?,
            DefaultValue::EmptySequence => HostValue::Sequence(Vec::new()),
            DefaultValue::EmptyDictionary => self.to_host(realm, &Value::Undefined, ty, "default")?,
        };
        Ok(value)
    }

    // ========================================================================
    // Unions
    // ========================================================================

    fn union(&self, realm: &mut Realm, value: &Value, ty: &Type, label: &str) -> ConvertResult<HostValue> {
        let plan = UnionPlan::build(ty, self.interface)?;
        let variant = |index: usize, host: HostValue| HostValue::Union {
            variant: index,
            value: Box::new(host),
        };

        if let Some(empty) = plan.empty_variant() {
            if value.is_undefined() {
                return Ok(variant(empty, HostValue::Empty));
            }
        }
        if let Some(index) = plan.nullish_dictionary {
            if value.is_nullish() {
                return Ok(variant(index, self.to_host(realm, value, &plan.members[index], label)?));
            }
        }
        if let Some(object) = value.as_object() {
            for arm in plan.arms.iter().filter(|arm| arm.test.requires_object()) {
                let matched = match &arm.test {
                    ArmTest::PlatformObject(name) => realm.implements(object, name),
                    ArmTest::WindowProxy => realm.is_window_proxy(object),
                    ArmTest::BufferSource(name) => realm.is_buffer_source(object, name),
                    ArmTest::Callback => realm.is_callable(value),
                    ArmTest::Sequence => realm.get_iterator_method(value)?.is_some(),
                    _ => true,
                };
                if matched {
                    let member = &plan.members[arm.member];
                    return Ok(variant(arm.member, self.to_host(realm, value, member, label)?));
                }
            }
        }
        for arm in plan.arms.iter().filter(|arm| !arm.test.requires_object()) {
            let matched = match arm.test {
                ArmTest::Boolean => value.is_boolean(),
                ArmTest::Number => value.is_number(),
                ArmTest::BigInt => value.is_bigint(),
                _ => false,
            };
            if matched {
                let member = &plan.members[arm.member];
                return Ok(variant(arm.member, self.to_host(realm, value, member, label)?));
            }
        }

        let fallback_member = match plan.fallback {
            UnionFallback::Exhaustive => plan
                .arms
                .iter()
                .find(|arm| arm.test == ArmTest::AnyValue)
                .map(|arm| arm.member),
            UnionFallback::NumericOrBigInt { numeric, bigint } => {
                return match to_numeric(realm, value)? {
                    Numeric::BigInt(bigint_value) => Ok(variant(bigint, HostValue::BigInt(bigint_value))),
                    number => {
                        let host = self.to_host(realm, &Value::from(number), &plan.members[numeric], label)?;
                        Ok(variant(numeric, host))
                    }
                };
            }
            UnionFallback::Numeric(index) | UnionFallback::Boolean(index) | UnionFallback::BigInt(index) => Some(index),
            UnionFallback::TypeError => None,
        };
        match fallback_member {
            Some(index) => Ok(variant(index, self.to_host(realm, value, &plan.members[index], label)?)),
            None => Err(TypeError::new(
                ErrorType::NoUnionTypesMatched,
                &[&to_display_string(realm, value), &ty.to_string()],
            )
            .into()),
        }
    }
}

pub(super) fn mismatch(ty: &Type, value: &HostValue) -> ConvertError {
    ConvertError::Mismatch {
        ty: ty.to_string(),
        value: format!("{value:?}"),
    }
}
