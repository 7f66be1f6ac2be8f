//! Conversions that produce heap handles: `object`, platform objects, `WindowProxy`, buffer sources and
//! promises.

use webidl_core::lang::objects;

use super::{ConversionTarget, Converter};
use crate::backend::errors::GenerationResult;
use crate::backend::source_generator::SourceGenerator;

impl Converter<'_> {
    pub(super) fn handle(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        // Only `null` is a valid default for these types.
        self.usable_default(target)?;
        let name = target.ty.name();
        let (host_type, expression) = if target.ty.is_object() {
            ("Handle<Object>".to_string(), "require_object(realm, &@js@)?".to_string())
        } else if target.ty.is_promise() {
            ("Handle<Promise>".to_string(), "promise_resolve(realm, &@js@)".to_string())
        } else if objects::buffer_source_from_str(name).is_some() {
            (
                "Handle<Object>".to_string(),
                format!("to_buffer_source(realm, &@js@, {name:?})?"),
            )
        } else {
            (
                format!("Handle<{name}>"),
                format!("to_platform_object::<{name}>(realm, &@js@, {name:?})?"),
            )
        };
        self.bind_expression(generator, target, &host_type, None, &expression)
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{Interface, Parameter, Type};

    use super::super::ConversionTarget;
    use super::super::test_support::{assert_parses, render};

    fn render_parameter(parameter: &Parameter) -> String {
        render(&Interface::new("I"), &ConversionTarget::for_parameter(parameter, 0))
    }

    #[test]
    fn platform_objects_check_their_interface() {
        let out = render_parameter(&Parameter::new("child", Type::plain("Node")));
        assert_eq!(
            out.trim(),
            "let child: Handle<Node> = to_platform_object::<Node>(realm, &arg0, \"Node\")?;"
        );
    }

    #[test]
    fn nullable_platform_object() {
        let out = render_parameter(&Parameter::new("before", Type::plain("HTMLElement").nullable()));
        assert!(out.contains("let before: Option<Handle<HTMLElement>> = if arg0.is_nullish() { None }"));
        assert_parses(&out);
    }

    #[test]
    fn object_buffer_and_promise() {
        assert!(render_parameter(&Parameter::new("o", Type::plain("object"))).contains("require_object(realm, &arg0)?"));
        assert!(render_parameter(&Parameter::new("data", Type::plain("Uint8Array")))
            .contains("to_buffer_source(realm, &arg0, \"Uint8Array\")?"));
        let promise = Type::parameterized("Promise", vec![Type::plain("any")]);
        let out = render_parameter(&Parameter::new("p", promise));
        assert!(out.contains("let p: Handle<Promise> = promise_resolve(realm, &arg0);"));
        assert_parses(&out);
    }
}
