//! Dictionary conversions.
//!
//! The source must be `undefined`, `null` or an object. Members are read from the most-derived dictionary up
//! through its ancestors; a nullish source reads every member as `undefined`. Each member is converted with its
//! own type's converter:
//!
//! - `required` members throw `MissingRequiredProperty` when absent.
//! - Members with a default take it when absent.
//! - All other members are `Option`s that stay `None` when absent, so presence remains observable. The presence
//!   check happens here, once, before the member's own converter runs; a nullable member therefore becomes
//!   `Option<Option<T>>` with `Some(None)` for an explicit `null`.
//!
//! Dictionaries ignore the optional flag of the parameter they arrive through: an absent dictionary argument is
//! converted like `{}`.

use webidl_core::{DictionaryMember, Interface};

use super::{ConversionSite, ConversionTarget, Converter};
use crate::backend::classify::classify;
use crate::backend::errors::GenerationResult;
use crate::backend::naming::{host_identifier, to_snake_case};
use crate::backend::source_generator::SourceGenerator;

/// Every member of a dictionary and its ancestors, most-derived first.
pub(crate) fn dictionary_members<'a>(interface: &'a Interface, name: &'a str) -> GenerationResult<Vec<&'a DictionaryMember>> {
    let chain = interface.dictionary_chain(name)?;
    Ok(chain
        .into_iter()
        .flat_map(|(_, dictionary)| dictionary.members.iter())
        .collect())
}

/// Host field type of a dictionary member.
pub(crate) fn member_field_type(member: &DictionaryMember, interface: &Interface) -> GenerationResult<String> {
    let host = classify(&member.ty, interface)?;
    if member_is_presence_tracked(member, interface) {
        Ok(format!("Option<{}>", host.name))
    } else {
        Ok(host.name)
    }
}

/// Whether a member's host field records presence: no `required`, no default, and not itself a dictionary
/// (an absent dictionary member converts like `{}`).
pub(crate) fn member_is_presence_tracked(member: &DictionaryMember, interface: &Interface) -> bool {
    !member.required && member.default_value.is_none() && !interface.is_dictionary(member.ty.name())
}

impl Converter<'_> {
    pub(super) fn dictionary(
        &self,
        generator: &mut SourceGenerator,
        target: &ConversionTarget<'_>,
    ) -> GenerationResult<()> {
        let name = target.ty.name();
        let members = dictionary_members(self.interface, name)?;
        let depth = target.depth;

        let mut scoped = generator.fork();
        scoped.set("dictionary", name);
        let result = if target.ty.is_nullable() {
            format!("{}_value", target.host_name)
        } else {
            target.host_name.clone()
        };
        scoped.set("result", result.as_str());
        scoped.append(&format!(
            r#"    if !@js@.is_nullish() && !@js@.is_object() {{
        return Err(TypeError::new(ErrorType::NotAnObjectOfType, &[&to_display_string(realm, &@js@), {name:?}]));
    }}
"#
        ));

        let mut fields = Vec::with_capacity(members.len());
        for member in members {
            let snake = to_snake_case(&member.name);
            let js_name = format!("{snake}_property_value");
            let host_name = format!("{snake}_member{depth}");
            let mut member_scope = scoped.fork();
            member_scope.set("key", format!("{:?}", member.name));
            member_scope.set("property", format!("{js_name}{depth}"));
            member_scope.append(
                r#"    let @property@ = match @js@.as_object() {
        Some(dictionary_object@depth@) => realm.get(dictionary_object@depth@, @key@)?,
        None => Value::Undefined,
    };
"#,
            );
            if member.required {
                member_scope.append(
                    r#"    if @property@.is_undefined() {
        return Err(TypeError::new(ErrorType::MissingRequiredProperty, &[@key@]));
    }
"#,
                );
            }
            let tracked = member_is_presence_tracked(member, self.interface);
            let converted_name = if tracked { format!("{host_name}_present") } else { host_name.clone() };
            let member_target = ConversionTarget::new(&member.ty, js_name, converted_name.clone())
                .with_suffix(depth.to_string())
                .with_label(member.name.clone())
                .with_optional(!member.required && !tracked)
                .with_default(member.default_value.as_deref())
                .with_attributes(&member.extended_attributes)
                .with_site(ConversionSite::DictionaryMember)
                .with_depth(depth + 1);
            if tracked {
                member_scope.set("member", host_name.as_str());
                member_scope.set("field_type", member_field_type(member, self.interface)?);
                member_scope.appendln("    let @member@: @field_type@ = if @property@.is_undefined() { None } else {");
                self.to_host(&mut member_scope, &member_target)?;
                member_scope.appendln(&format!("    Some({converted_name}) }};"));
            } else {
                self.to_host(&mut member_scope, &member_target)?;
            }
            fields.push(format!("{}: {host_name}", host_identifier(&member.name)));
        }

        scoped.appendln(&format!("    let @result@ = @dictionary@ {{ {} }};", fields.join(", ")));
        if target.ty.is_nullable() {
            scoped.appendln("    let @host@: Option<@dictionary@> = Some(@result@);");
        }
        Ok(())
    }
}
