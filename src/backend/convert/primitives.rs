//! Numeric, boolean, bigint and `any` conversions.
//!
//! ## Notes
//! - Integer mode comes from the target's extended attributes: `[EnforceRange]`, `[Clamp]`, or the default
//!   modulo conversion when neither is present. Both at once is rejected at generation time.
//! - Restricted floats reject NaN and the infinities at runtime, naming the parameter.

use webidl_core::lang::numerics;

use super::defaults::{parse_default, script_value_literal};
use super::{ConversionTarget, Converter, integer_mode};
use crate::backend::errors::{GenerationError, GenerationResult};
use crate::backend::source_generator::SourceGenerator;

impl Converter<'_> {
    pub(super) fn integer(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let keyword = numerics::integer_from_str(target.ty.name()).ok_or_else(|| GenerationError::UnsupportedType {
            ty: target.ty.to_string(),
            context: "integer conversion".to_string(),
        })?;
        let host_type = numerics::integer_info(keyword).host_type;
        let mode = integer_mode(target.attributes, &target.label)?;
        let default = self.scalar_default(target, host_type)?;
        let expression = format!(
            "convert_to_int::<{host_type}>(realm, &@js@, IntegerMode::{mode:?}, {:?})?",
            target.label
        );
        self.bind_expression(generator, target, host_type, default, &expression)
    }

    pub(super) fn floating_point(
        &self,
        generator: &mut SourceGenerator,
        target: &ConversionTarget<'_>,
    ) -> GenerationResult<()> {
        let keyword = numerics::float_from_str(target.ty.name()).ok_or_else(|| GenerationError::UnsupportedType {
            ty: target.ty.to_string(),
            context: "floating-point conversion".to_string(),
        })?;
        let info = numerics::float_info(keyword);
        let function = if info.single_precision { "convert_to_float" } else { "convert_to_double" };
        let mode = if info.restricted { "Restricted" } else { "Unrestricted" };
        let default = self.scalar_default(target, info.host_type)?;
        let expression = format!("{function}(realm, &@js@, FloatMode::{mode}, {:?})?", target.label);
        self.bind_expression(generator, target, info.host_type, default, &expression)
    }

    pub(super) fn boolean(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let default = self.scalar_default(target, "bool")?;
        self.bind_expression(generator, target, "bool", default, "to_boolean(&@js@)")
    }

    pub(super) fn bigint(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        self.usable_default(target)?;
        self.bind_expression(generator, target, "BigInt", None, "to_bigint(realm, &@js@)?")
    }

    /// `any` (and `undefined`) keep the script value itself; the only special case is an explicit default.
    pub(super) fn any(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let default = match target.default_value {
            Some(literal) if target.optional => Some(script_value_literal(&parse_default(literal, target.ty, self.interface)?)),
            _ => None,
        };
        match default {
            Some(default) => generator.appendln(&format!(
                "    let @host@: Value = if @js@.is_undefined() {{ {default} }} else {{ @js@.clone() }};"
            )),
            None => generator.appendln("    let @host@: Value = @js@.clone();"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{ExtendedAttributes, Interface, Parameter, Type};

    use super::super::ConversionTarget;
    use super::super::test_support::{assert_parses, render};
    use super::super::Converter;
    use crate::backend::errors::GenerationError;
    use crate::backend::source_generator::SourceGenerator;

    fn render_parameter(parameter: &Parameter) -> String {
        render(&Interface::new("I"), &ConversionTarget::for_parameter(parameter, 0))
    }

    // ========================================================================
    // Integers
    // ========================================================================

    #[test]
    fn integer_modes_follow_extended_attributes() {
        let wrapping = Parameter::new("index", Type::plain("unsigned long"));
        assert!(render_parameter(&wrapping)
            .contains("convert_to_int::<u32>(realm, &arg0, IntegerMode::Wrapping, \"index\")?"));

        let clamped = Parameter::new("level", Type::plain("octet"))
            .with_extended_attributes(ExtendedAttributes::default().with_clamp());
        assert!(render_parameter(&clamped).contains("IntegerMode::Clamp"));

        let enforced = Parameter::new("count", Type::plain("long long"))
            .with_extended_attributes(ExtendedAttributes::default().with_enforce_range());
        let out = render_parameter(&enforced);
        assert!(out.contains("convert_to_int::<i64>(realm, &arg0, IntegerMode::EnforceRange, \"count\")?"));
        assert_parses(&out);
    }

    #[test]
    fn clamp_and_enforce_range_conflict() {
        let parameter = Parameter::new("x", Type::plain("short")).with_extended_attributes(
            ExtendedAttributes::default().with_clamp().with_enforce_range(),
        );
        let interface = Interface::new("I");
        let mut generator = SourceGenerator::new();
        let err = Converter::new(&interface)
            .to_host(&mut generator, &ConversionTarget::for_parameter(&parameter, 0))
            .unwrap_err();
        assert!(matches!(err, GenerationError::ConflictingExtendedAttributes { .. }));
    }

    #[test]
    fn optional_integer_with_default() {
        let parameter = Parameter::new("depth", Type::plain("long")).with_default("-1");
        let out = render_parameter(&parameter);
        assert!(out.contains("let depth: i32 = if arg0.is_undefined() { -1i32 }"));
        assert_parses(&out);
    }

    // ========================================================================
    // Floats, booleans, bigint, any
    // ========================================================================

    #[test]
    fn restricted_and_unrestricted_floats() {
        let restricted = Parameter::new("x", Type::plain("double"));
        assert!(render_parameter(&restricted).contains("convert_to_double(realm, &arg0, FloatMode::Restricted, \"x\")?"));

        let unrestricted = Parameter::new("y", Type::plain("unrestricted float")).with_default("1");
        let out = render_parameter(&unrestricted);
        assert!(out.contains("convert_to_float(realm, &arg0, FloatMode::Unrestricted, \"y\")?"));
        assert!(out.contains("{ 1.0 }"));
        assert_parses(&out);
    }

    #[test]
    fn boolean_uses_to_boolean() {
        let parameter = Parameter::new("deep", Type::plain("boolean")).with_default("false");
        let out = render_parameter(&parameter);
        assert!(out.contains("let deep: bool = if arg0.is_undefined() { false }"));
        assert!(out.contains("to_boolean(&arg0)"));
        assert_parses(&out);
    }

    #[test]
    fn bigint_and_any() {
        let bigint = Parameter::new("big", Type::plain("bigint"));
        assert!(render_parameter(&bigint).contains("let big: BigInt = to_bigint(realm, &arg0)?;"));

        let any = Parameter::new("value", Type::plain("any")).with_default("null");
        let out = render_parameter(&any);
        assert!(out.contains("let value: Value = if arg0.is_undefined() { Value::Null } else { arg0.clone() };"));
        assert_parses(&out);
    }
}
