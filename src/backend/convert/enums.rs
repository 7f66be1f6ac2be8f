//! Enumeration conversions.
//!
//! The script value is stringified and matched against every wire string in declaration order. An unknown
//! value throws `InvalidEnumerationValue`, except in attribute setters where the assignment is ignored.
//! An optional enumeration that is `undefined` becomes the first declared member; any default literal is
//! checked for validity but does not change that fallback.

use super::{ConversionSite, ConversionTarget, Converter};
use crate::backend::errors::{GenerationError, GenerationResult};
use crate::backend::source_generator::SourceGenerator;

impl Converter<'_> {
    pub(super) fn enumeration(
        &self,
        generator: &mut SourceGenerator,
        target: &ConversionTarget<'_>,
    ) -> GenerationResult<()> {
        let name = target.ty.name();
        let enumeration = self
            .interface
            .enumeration(name)
            .ok_or_else(|| GenerationError::UnknownEnumeration { name: name.to_string() })?;
        let Some((_, first)) = enumeration.first_member() else {
            return Err(GenerationError::EmptyEnumeration { name: name.to_string() });
        };
        self.usable_default(target)?;

        let fallback = if target.site == ConversionSite::AttributeSetter {
            "return Ok(Value::Undefined)".to_string()
        } else {
            format!(
                "return Err(TypeError::new(ErrorType::InvalidEnumerationValue, &[&enum_wire{depth}, {name:?}]))",
                depth = target.depth
            )
        };
        let default = target.optional.then(|| format!("{name}::{first}"));

        self.bind(generator, target, name, default, |generator, result| {
            let mut scoped = generator.fork();
            scoped.set("result", result);
            scoped.set("enum_name", name);
            scoped.appendln("    let enum_wire@depth@ = to_string(realm, &@js@)?;");
            scoped.appendln("    let @result@: @enum_name@ = match enum_wire@depth@.as_str() {");
            for (wire, host) in enumeration.members() {
                scoped.appendln(&format!("        {wire:?} => {name}::{host},"));
            }
            scoped.appendln(&format!("        _ => {fallback},"));
            scoped.appendln("    };");
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{Enumeration, Interface, Parameter, Type};

    use super::super::test_support::{assert_parses, render};
    use super::super::{ConversionSite, ConversionTarget, Converter};
    use crate::backend::errors::GenerationError;
    use crate::backend::source_generator::SourceGenerator;

    fn interface() -> Interface {
        let mut interface = Interface::new("I");
        interface
            .enumerations
            .insert("Mode".into(), Enumeration::from_values(["foo", "bar"]));
        interface
            .enumerations
            .insert("Nothing".into(), Enumeration::from_values(Vec::<String>::new()));
        interface
    }

    #[test]
    fn matches_every_wire_string_in_order() {
        let parameter = Parameter::new("mode", Type::plain("Mode"));
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        let foo = out.find("\"foo\" => Mode::Foo").unwrap();
        let bar = out.find("\"bar\" => Mode::Bar").unwrap();
        assert!(foo < bar);
        assert!(out.contains("ErrorType::InvalidEnumerationValue, &[&enum_wire0, \"Mode\"]"));
        assert_parses(&out);
    }

    #[test]
    fn optional_enumeration_falls_back_to_first_member() {
        let parameter = Parameter::new("mode", Type::plain("Mode")).optional();
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("let mode: Mode = if arg0.is_undefined() { Mode::Foo }"));
        assert_parses(&out);
    }

    #[test]
    fn default_literal_does_not_change_fallback() {
        let parameter = Parameter::new("mode", Type::plain("Mode")).with_default("\"bar\"");
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("{ Mode::Foo }"));
    }

    #[test]
    fn setters_ignore_invalid_values() {
        let ty = Type::plain("Mode");
        let target = ConversionTarget::new(&ty, "value", "host_value").with_site(ConversionSite::AttributeSetter);
        let out = render(&interface(), &target);
        assert!(out.contains("_ => return Ok(Value::Undefined),"));
        assert_parses(&out);
    }

    #[test]
    fn empty_enumerations_are_errors() {
        let interface = interface();
        let converter = Converter::new(&interface);
        let empty = Type::plain("Nothing");
        let err = converter
            .to_host(&mut SourceGenerator::new(), &ConversionTarget::new(&empty, "v", "x"))
            .unwrap_err();
        assert_eq!(err, GenerationError::EmptyEnumeration { name: "Nothing".into() });
    }
}
