//! Interpretive wrap: [`HostValue`] -> script value, driven by an IDL type.
//!
//! Mirrors the generated wrap code: nullable values check for `Null` first, unions dispatch on the variant,
//! dictionaries write present members in inbound chain order, and 64-bit integers become doubles.

use webidl_core::Type;

use super::convert::{ConvertResult, HostValue, RuntimeConverter, mismatch};
use super::realm::Realm;
use super::value::Value;
use crate::backend::convert::dictionary::dictionary_members;
use crate::backend::convert::union::UnionPlan;
use crate::backend::errors::GenerationError;

impl RuntimeConverter<'_> {
    /// Convert a host value of type `ty` into a script value.
    ///
    /// ## Errors
    /// - [`ConvertError::Mismatch`](super::convert::ConvertError::Mismatch) when `host` does not have the shape `ty` requires.
    /// - [`ConvertError::Generation`](super::convert::ConvertError::Generation) for types with no outbound mapping.
    pub fn to_script(&self, realm: &mut Realm, host: &HostValue, ty: &Type) -> ConvertResult<Value> {
        if ty.is_nullable() && !ty.is_any() {
            if *host == HostValue::Null {
                return Ok(Value::Null);
            }
            return self.to_script(realm, host, &ty.clone().with_nullable(false));
        }

        let value = match host {
            HostValue::Any(value) if ty.is_any() || ty.is_undefined() => value.clone(),
            HostValue::Boolean(boolean) if ty.is_boolean() => Value::Boolean(*boolean),
            HostValue::Integer(integer) if ty.is_integer() => Value::Number(*integer as f64),
            HostValue::Float(float) if ty.is_floating_point() => Value::Number(*float),
            HostValue::BigInt(bigint) if ty.is_bigint() => Value::BigInt(bigint.clone()),
            HostValue::String(string) if ty.is_string() => Value::String(string.clone()),
            HostValue::Enum(host_name) => {
                let enumeration = self
                    .interface
                    .enumeration(ty.name())
                    .ok_or_else(|| GenerationError::UnknownEnumeration { name: ty.name().to_string() })?;
                let wire = enumeration
                    .wire_string_for(host_name)
                    .ok_or_else(|| mismatch(ty, host))?;
                Value::String(wire.to_string())
            }
            HostValue::Object(object) => Value::Object(*object),
            HostValue::Sequence(items) if ty.is_sequence() => {
                let element_type = &ty.parameters()[0];
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push(self.to_script(realm, item, element_type)?);
                }
                Value::Object(realm.create_array(elements))
            }
            HostValue::Record(entries) if ty.is_record() => {
                let value_type = &ty.parameters()[1];
                let object = realm.create_object();
                for (key, entry) in entries {
                    let wrapped = self.to_script(realm, entry, value_type)?;
                    realm.create_data_property(object, key, wrapped);
                }
                Value::Object(object)
            }
            HostValue::Dictionary(members) => {
                let object = realm.create_object();
                for member in dictionary_members(self.interface, ty.name())? {
                    if let Some(present) = members.get(&member.name) {
                        let wrapped = self.to_script(realm, present, &member.ty)?;
                        realm.create_data_property(object, &member.name, wrapped);
                    }
                }
                Value::Object(object)
            }
            HostValue::Union { variant, value } if ty.is_union() => {
                let plan = UnionPlan::build(ty, self.interface)?;
                if Some(*variant) == plan.empty_variant() {
                    Value::Undefined
                } else {
                    let member = plan.members.get(*variant).ok_or_else(|| mismatch(ty, host))?;
                    self.to_script(realm, value, member)?
                }
            }
            HostValue::Empty => Value::Undefined,
            _ => return Err(mismatch(ty, host)),
        };
        Ok(value)
    }

    /// Wrap then convert back: the value a host value reads as after a trip through script.
    pub fn round_trip(&self, realm: &mut Realm, host: &HostValue, ty: &Type) -> ConvertResult<HostValue> {
        let script = self.to_script(realm, host, ty)?;
        self.to_host(realm, &script, ty, "round trip")
    }
}
