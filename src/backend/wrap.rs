//! Outbound converters: host value -> script value.
//!
//! [`Wrapper::to_script`] authors statements that read a host binding and hand the resulting script value to a
//! [`WrapSink`]: either `return Ok(value);` or an assignment to a pre-declared `Value` binding (used for
//! elements, entries and members, which are then stored into a fresh array or object).
//!
//! ## Notes
//! - Nullable types branch on the `Option` first and produce `null` for `None`; the non-null branch wraps the
//!   unwrapped value with the non-nullable type.
//! - Enumerations use a total match from host identifier to wire string.
//! - Dictionary members are written in the same most-derived-first order they are read in. Members whose host
//!   field tracks presence are only written when present; a present nullable member still writes `null`.
//! - Host values are read through shared references and cloned at the leaves.

use webidl_core::lang::{numerics, objects};
use webidl_core::{Interface, Type};

use crate::backend::classify::check_shape;
use crate::backend::convert::dictionary::{dictionary_members, member_is_presence_tracked};
use crate::backend::convert::union::UnionPlan;
use crate::backend::errors::{GenerationError, GenerationResult};
use crate::backend::naming::host_identifier;
use crate::backend::source_generator::SourceGenerator;

/// Where a wrapped value goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrapSink {
    /// `return Ok(value);`
    Return,
    /// `name = value;` for a binding declared as `let name: Value;`.
    Assign(String),
}

impl WrapSink {
    fn statement(&self, expression: &str) -> String {
        match self {
            WrapSink::Return => format!("return Ok({expression});"),
            WrapSink::Assign(name) => format!("{name} = {expression};"),
        }
    }
}

/// Authors outbound conversions for one interface.
#[derive(Debug, Clone, Copy)]
pub struct Wrapper<'a> {
    pub interface: &'a Interface,
}

impl<'a> Wrapper<'a> {
    pub fn new(interface: &'a Interface) -> Self {
        Wrapper { interface }
    }

    /// Emit statements that wrap the host expression `value` of type `ty` and deliver it to `sink`.
    ///
    /// ## Errors
    /// - [`GenerationError::UnsupportedType`] (and the lookup errors of dictionaries and enumerations) when the
    ///   type has no outbound mapping.
    pub fn to_script(
        &self,
        generator: &mut SourceGenerator,
        ty: &Type,
        value: &str,
        sink: &WrapSink,
        depth: usize,
    ) -> GenerationResult<()> {
        check_shape(ty)?;
        let mut scoped = generator.fork();
        scoped.set("value", value);
        scoped.set("depth", depth.to_string());

        if ty.is_nullable() && !ty.is_any() {
            scoped.appendln("    if let Some(non_null@depth@) = &@value@ {");
            let inner = ty.clone().with_nullable(false);
            self.to_script(&mut scoped, &inner, &format!("non_null{depth}"), sink, depth + 1)?;
            scoped.appendln("    } else {");
            scoped.appendln(&format!("        {}", sink.statement("Value::Null")));
            scoped.appendln("    }");
            return Ok(());
        }

        let name = ty.name();
        if ty.is_union() {
            return self.union(&mut scoped, ty, sink, depth);
        }
        if ty.is_sequence() {
            return self.sequence(&mut scoped, ty, sink, depth);
        }
        if ty.is_record() {
            return self.record(&mut scoped, ty, sink, depth);
        }
        if self.interface.is_dictionary(name) {
            return self.dictionary(&mut scoped, name, sink, depth);
        }
        if let Some(enumeration) = self.interface.enumeration(name) {
            scoped.appendln("    let enum_wire@depth@ = match &@value@ {");
            for (wire, host) in enumeration.members() {
                scoped.appendln(&format!("        {name}::{host} => {wire:?},"));
            }
            scoped.appendln("    };");
            scoped.appendln(&format!("    {}", sink.statement("Value::from(enum_wire@depth@.to_string())")));
            return Ok(());
        }

        let expression = if ty.is_any() || ty.is_undefined() {
            "@value@.clone()".to_string()
        } else if let Some(keyword) = numerics::integer_from_str(name) {
            if numerics::integer_info(keyword).bits == 64 {
                "Value::Number(@value@.clone() as f64)".to_string()
            } else {
                "Value::from(@value@.clone())".to_string()
            }
        } else if ty.is_bigint() {
            "Value::BigInt(@value@.clone())".to_string()
        } else if ty.is_string()
            || ty.is_boolean()
            || ty.is_floating_point()
            || ty.is_object()
            || ty.is_promise()
            || objects::is_platform_object(name)
            || objects::buffer_source_from_str(name).is_some()
            || name == objects::WINDOW_PROXY
            || self.interface.is_callback_function(name)
        {
            "Value::from(@value@.clone())".to_string()
        } else {
            return Err(GenerationError::UnsupportedType {
                ty: ty.to_string(),
                context: "wrapping a return value".to_string(),
            });
        };
        scoped.appendln(&format!("    {}", sink.statement(&expression)));
        Ok(())
    }

    fn sequence(&self, generator: &mut SourceGenerator, ty: &Type, sink: &WrapSink, depth: usize) -> GenerationResult<()> {
        generator.append(
            r#"    let mut new_array@depth@: Vec<Value> = Vec::new();
    for element@depth@ in @value@.iter() {
        let wrapped_element@depth@: Value;
"#,
        );
        let element_sink = WrapSink::Assign(format!("wrapped_element{depth}"));
        self.to_script(generator, &ty.parameters()[0], &format!("element{depth}"), &element_sink, depth + 1)?;
        generator.append(
            r#"        new_array@depth@.push(wrapped_element@depth@);
    }
"#,
        );
        generator.appendln(&format!(
            "    {}",
            sink.statement("Value::Object(realm.create_array(new_array@depth@))")
        ));
        Ok(())
    }

    fn record(&self, generator: &mut SourceGenerator, ty: &Type, sink: &WrapSink, depth: usize) -> GenerationResult<()> {
        generator.append(
            r#"    let record_object@depth@ = realm.create_object();
    for (record_key@depth@, record_value@depth@) in @value@.iter() {
        let wrapped_value@depth@: Value;
"#,
        );
        let value_sink = WrapSink::Assign(format!("wrapped_value{depth}"));
        self.to_script(generator, &ty.parameters()[1], &format!("record_value{depth}"), &value_sink, depth + 1)?;
        generator.append(
            r#"        realm.create_data_property(record_object@depth@, record_key@depth@, wrapped_value@depth@);
    }
"#,
        );
        generator.appendln(&format!("    {}", sink.statement("Value::Object(record_object@depth@)")));
        Ok(())
    }

    fn dictionary(&self, generator: &mut SourceGenerator, name: &str, sink: &WrapSink, depth: usize) -> GenerationResult<()> {
        let value = generator.get("value").unwrap_or_default().to_string();
        generator.appendln("    let dictionary_object@depth@ = realm.create_object();");
        for member in dictionary_members(self.interface, name)? {
            let field = format!("{value}.{}", host_identifier(&member.name));
            let key = format!("{:?}", member.name);
            let member_sink = WrapSink::Assign(format!("wrapped_member{depth}"));
            if member_is_presence_tracked(member, self.interface) {
                generator.appendln(&format!("    if let Some(member_value{depth}) = &{field} {{"));
                generator.appendln("        let wrapped_member@depth@: Value;");
                self.to_script(generator, &member.ty, &format!("member_value{depth}"), &member_sink, depth + 1)?;
            } else {
                generator.appendln("    {");
                generator.appendln("        let wrapped_member@depth@: Value;");
                self.to_script(generator, &member.ty, &field, &member_sink, depth + 1)?;
            }
            generator.appendln(&format!(
                "        realm.create_data_property(dictionary_object@depth@, {key}, wrapped_member@depth@);"
            ));
            generator.appendln("    }");
        }
        generator.appendln(&format!("    {}", sink.statement("Value::Object(dictionary_object@depth@)")));
        Ok(())
    }

    fn union(&self, generator: &mut SourceGenerator, ty: &Type, sink: &WrapSink, depth: usize) -> GenerationResult<()> {
        let plan = UnionPlan::build(ty, self.interface)?;
        let union_name = format!("Union{}", plan.variant_count());
        generator.appendln("    match &@value@ {");
        for (index, member) in plan.members.iter().enumerate() {
            generator.appendln(&format!("        {union_name}::V{index}(union_member{depth}) => {{"));
            self.to_script(generator, member, &format!("union_member{depth}"), sink, depth + 1)?;
            generator.appendln("        }");
        }
        if let Some(empty) = plan.empty_variant() {
            generator.appendln(&format!(
                "        {union_name}::V{empty}(_) => {{ {} }}",
                sink.statement("Value::Undefined")
            ));
        }
        generator.appendln("    }");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{Dictionary, DictionaryMember, Enumeration};

    use super::*;

    fn interface() -> Interface {
        let mut interface = Interface::new("I");
        interface
            .enumerations
            .insert("Mode".into(), Enumeration::from_values(["open", "closed"]));
        interface.dictionaries.insert(
            "Size".into(),
            Dictionary::new(vec![
                DictionaryMember::new("width", Type::plain("long")).required(),
                DictionaryMember::new("unit", Type::plain("DOMString")),
                DictionaryMember::new("note", Type::plain("DOMString").nullable()),
            ]),
        );
        interface
    }

    fn wrap(ty: Type) -> String {
        let interface = interface();
        let mut generator = SourceGenerator::new();
        Wrapper::new(&interface)
            .to_script(&mut generator, &ty, "retval", &WrapSink::Return, 0)
            .expect("wrap should succeed");
        let body = generator.finish();
        let source = format!("fn generated() -> ThrowCompletionOr<Value> {{\n{body}\n}}");
        if let Err(err) = syn::parse_file(&source) {
            panic!("generated code does not parse: {err}\n{source}");
        }
        body
    }

    #[test]
    fn scalars_wrap_directly() {
        assert_eq!(wrap(Type::plain("DOMString")).trim(), "return Ok(Value::from(retval.clone()));");
        assert_eq!(
            wrap(Type::plain("unsigned long long")).trim(),
            "return Ok(Value::Number(retval.clone() as f64));"
        );
        assert_eq!(wrap(Type::plain("any")).trim(), "return Ok(retval.clone());");
    }

    #[test]
    fn nullable_branches_before_wrapping() {
        let out = wrap(Type::plain("Node").nullable());
        assert!(out.contains("if let Some(non_null0) = &retval {"));
        assert!(out.contains("return Ok(Value::from(non_null0.clone()));"));
        assert!(out.contains("return Ok(Value::Null);"));
    }

    #[test]
    fn enumerations_use_a_total_lookup() {
        let out = wrap(Type::plain("Mode"));
        assert!(out.contains("Mode::Open => \"open\","));
        assert!(out.contains("Mode::Closed => \"closed\","));
        assert!(!out.contains("TypeError"));
    }

    #[test]
    fn sequences_build_an_array() {
        let out = wrap(Type::sequence(Type::plain("DOMString")));
        assert!(out.contains("for element0 in retval.iter() {"));
        assert!(out.contains("wrapped_element0 = Value::from(element0.clone());"));
        assert!(out.contains("return Ok(Value::Object(realm.create_array(new_array0)));"));
    }

    #[test]
    fn records_write_each_entry() {
        let out = wrap(Type::record(Type::plain("DOMString"), Type::plain("boolean")));
        assert!(out.contains("realm.create_data_property(record_object0, record_key0, wrapped_value0);"));
    }

    #[test]
    fn dictionaries_skip_absent_members() {
        let out = wrap(Type::plain("Size"));
        assert!(out.contains("wrapped_member0 = Value::from(retval.width.clone());"));
        assert!(out.contains("if let Some(member_value0) = &retval.unit {"));
        assert!(out.contains("realm.create_data_property(dictionary_object0, \"unit\", wrapped_member0);"));
    }

    #[test]
    fn present_null_members_are_written_as_null() {
        let out = wrap(Type::plain("Size"));
        let note = out.find("if let Some(member_value0) = &retval.note {").unwrap();
        let inner = &out[note..];
        assert!(inner.contains("if let Some(non_null1) = &member_value0 {"));
        assert!(inner.contains("wrapped_member0 = Value::Null;"));
        assert!(inner.contains("realm.create_data_property(dictionary_object0, \"note\", wrapped_member0);"));
    }

    #[test]
    fn unions_visit_every_variant() {
        let ty = Type::union(vec![Type::plain("DOMString"), Type::plain("long"), Type::plain("undefined")]);
        let out = wrap(ty);
        assert!(out.contains("Union3::V0(union_member0) => {"));
        assert!(out.contains("Union3::V1(union_member0) => {"));
        assert!(out.contains("Union3::V2(_) => { return Ok(Value::Undefined); }"));
    }
}
