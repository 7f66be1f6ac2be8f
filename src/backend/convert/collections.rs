//! Sequence and record conversions.
//!
//! ## Notes
//! - A sequence is read through the iterator protocol; a value without `@@iterator` throws `NotIterable`.
//! - A record walks the object's own enumerable string keys in property order. Keys are converted with the
//!   record's key type, values with its value type.
//! - Element and entry temporaries carry the recursion depth so nested collections never shadow each other.

use super::defaults::DefaultValue;
use super::{ConversionTarget, Converter};
use crate::backend::classify::classify;
use crate::backend::errors::GenerationResult;
use crate::backend::source_generator::SourceGenerator;

impl Converter<'_> {
    pub(super) fn sequence(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let element_type = &target.ty.parameters()[0];
        let host_type = classify(&target.ty.clone().with_nullable(false), self.interface)?.name;
        let default = match self.usable_default(target)? {
            Some(DefaultValue::EmptySequence) => Some("Default::default()".to_string()),
            _ => None,
        };

        let depth = target.depth;
        self.bind(generator, target, &host_type, default, |generator, result| {
            let mut scoped = generator.fork();
            scoped.set("result", result);
            scoped.set("host_type", host_type.as_str());
            scoped.append(
                r#"    if !@js@.is_object() {
        return Err(TypeError::new(ErrorType::NotAnObject, &[&to_display_string(realm, &@js@)]));
    }
    let Some(iterator_method@depth@) = realm.get_iterator_method(&@js@)? else {
        return Err(TypeError::new(ErrorType::NotIterable, &[&to_display_string(realm, &@js@)]));
    };
    let mut iterator@depth@ = realm.get_iterator(&@js@, iterator_method@depth@)?;
    let mut @result@: @host_type@ = Default::default();
    while let Some(next_item@depth@) = realm.iterator_step(&mut iterator@depth@)? {
"#,
            );
            let element = target.nested(element_type, "next_item", depth.to_string(), format!("sequence_item{depth}"));
            self.to_host(&mut scoped, &element)?;
            scoped.append(
                r#"        @result@.push(sequence_item@depth@);
    }
"#,
            );
            Ok(())
        })
    }

    pub(super) fn record(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let key_type = &target.ty.parameters()[0];
        let value_type = &target.ty.parameters()[1];
        let host_type = classify(&target.ty.clone().with_nullable(false), self.interface)?.name;
        self.usable_default(target)?;

        let depth = target.depth;
        self.bind(generator, target, &host_type, None, |generator, result| {
            let mut scoped = generator.fork();
            scoped.set("result", result);
            scoped.set("host_type", host_type.as_str());
            scoped.append(
                r#"    let Some(record_object@depth@) = @js@.as_object() else {
        return Err(TypeError::new(ErrorType::NotAnObject, &[&to_display_string(realm, &@js@)]));
    };
    let mut @result@: @host_type@ = IndexMap::new();
    for property_key@depth@ in realm.own_property_keys(record_object@depth@) {
        let Some(descriptor@depth@) = realm.get_own_property(record_object@depth@, &property_key@depth@) else {
            continue;
        };
        if !descriptor@depth@.enumerable {
            continue;
        }
        let key@depth@ = Value::String(property_key@depth@.clone());
"#,
            );
            let key = target.nested(key_type, "key", depth.to_string(), format!("typed_key{depth}"));
            self.to_host(&mut scoped, &key)?;
            scoped.appendln("        let value@depth@ = realm.get(record_object@depth@, &property_key@depth@)?;");
            let value = target.nested(value_type, "value", depth.to_string(), format!("typed_value{depth}"));
            self.to_host(&mut scoped, &value)?;
            scoped.append(
                r#"        @result@.insert(typed_key@depth@, typed_value@depth@);
    }
"#,
            );
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{Interface, Parameter, Type};

    use super::super::ConversionTarget;
    use super::super::test_support::{assert_parses, render};

    #[test]
    fn sequence_of_platform_objects_uses_marked_storage() {
        let parameter = Parameter::new("nodes", Type::sequence(Type::plain("Node")));
        let out = render(&Interface::new("I"), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("let Some(iterator_method0) = realm.get_iterator_method(&arg0)? else {"));
        assert!(out.contains("let mut nodes: MarkedVector<Handle<Node>> = Default::default();"));
        assert!(out.contains("let sequence_item0: Handle<Node> = to_platform_object::<Node>(realm, &next_item0, \"Node\")?;"));
        assert!(out.contains("nodes.push(sequence_item0);"));
        assert_parses(&out);
    }

    #[test]
    fn nested_sequences_use_distinct_temporaries() {
        let ty = Type::sequence(Type::sequence(Type::plain("long")));
        let parameter = Parameter::new("grid", ty);
        let out = render(&Interface::new("I"), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("let mut grid: Vec<Vec<i32>> = Default::default();"));
        assert!(out.contains("let mut sequence_item0: Vec<i32> = Default::default();"));
        assert!(out.contains("realm.iterator_step(&mut iterator1)?"));
        assert!(out.contains("sequence_item0.push(sequence_item1);"));
        assert_parses(&out);
    }

    #[test]
    fn optional_sequence_with_empty_default() {
        let parameter = Parameter::new("items", Type::sequence(Type::plain("DOMString"))).with_default("[]");
        let out = render(&Interface::new("I"), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("let items: Vec<String> = if arg0.is_undefined() { Default::default() }"));
        assert!(out.contains("items_value.push(sequence_item0);"));
        assert_parses(&out);
    }

    #[test]
    fn record_walks_own_enumerable_keys() {
        let ty = Type::record(Type::plain("DOMString"), Type::plain("long"));
        let parameter = Parameter::new("headers", ty);
        let out = render(&Interface::new("I"), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("let mut headers: IndexMap<String, i32> = IndexMap::new();"));
        assert!(out.contains("if !descriptor0.enumerable {"));
        assert!(out.contains("let typed_key0: String = to_string(realm, &key0)?;"));
        assert!(out.contains("convert_to_int::<i32>(realm, &value0, IntegerMode::Wrapping, \"headers\")?"));
        assert!(out.contains("headers.insert(typed_key0, typed_value0);"));
        assert_parses(&out);
    }
}
