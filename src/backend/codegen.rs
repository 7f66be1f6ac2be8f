//! Bindings generation facade.
//!
//! [`BindingsCodegen::try_generate`] turns one interface description into one Rust source file:
//!
//! 1. Imports: the runtime prelude and the implementation modules of the interface and its imports.
//! 2. Declarations: a Rust enum per IDL enumeration and a struct per IDL dictionary.
//! 3. `{Name}Prototype`: one native function per operation (with an overload dispatcher when an operation is
//!    overloaded), attribute getters and setters, and constant definitions.
//! 4. `{Name}Constructor` when the interface declares constructors.
//!
//! The generated text is parsed with `syn` and pretty-printed with `prettyplease` unless formatting is
//! disabled; the header is prepended afterwards because the printer drops comments.
//!
//! ## Examples
//!
//! ```rust
//! use webidl_bindgen::backend::{BindingsCodegen, GeneratorConfig};
//! use webidl_core::{Function, Interface, Parameter, Type};
//!
//! let mut interface = Interface::new("Counter");
//! interface.functions.push(Function::new(
//!     "add",
//!     Type::plain("undefined"),
//!     vec![Parameter::new("amount", Type::plain("long"))],
//! ));
//! let source = BindingsCodegen::new(GeneratorConfig::new()).try_generate(&interface)?;
//! assert!(source.contains("pub struct CounterPrototype"));
//! # Ok::<(), webidl_bindgen::backend::GenerationError>(())
//! ```

use webidl_core::{Attribute, Interface, Parameter, Type};

use super::classify::classify;
use super::config::GeneratorConfig;
use super::convert::defaults::{parse_default, script_value_literal};
use super::convert::dictionary::{dictionary_members, member_field_type};
use super::convert::{ConversionSite, ConversionTarget, Converter};
use super::errors::{GenerationError, GenerationResult};
use super::includes::import_lines;
use super::naming::host_identifier;
use super::overload::{emit_arbiter, plan_overloads};
use super::source_generator::SourceGenerator;
use super::wrap::{WrapSink, Wrapper};
use crate::version::VERSION;

/// Who a native function acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver {
    /// Regular operations and attributes: the implementation object behind `this`.
    Instance,
    /// Static operations and attributes.
    Static,
    /// Constructors: no receiver, the call returns the new object.
    Constructor,
}

/// One callable to emit: its IDL name, parameters and the implementation method it forwards to.
struct Callable<'a> {
    idl_name: &'a str,
    parameters: &'a [Parameter],
    /// `None` for constructors.
    return_type: Option<&'a Type>,
    method: String,
    receiver: Receiver,
}

/// Generates binding source for interfaces.
#[derive(Debug, Clone, Default)]
pub struct BindingsCodegen {
    config: GeneratorConfig,
}

impl BindingsCodegen {
    pub fn new(config: GeneratorConfig) -> Self {
        BindingsCodegen { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the bindings source for `interface`.
    ///
    /// ## Errors
    /// - Any [`GenerationError`] raised by classification, conversion, wrapping or overload planning.
    /// - [`GenerationError::SynParse`] if formatting is enabled and the output is not valid Rust.
    #[tracing::instrument(skip_all, fields(interface = %interface.name))]
    pub fn try_generate(&self, interface: &Interface) -> GenerationResult<String> {
        let mut generator = SourceGenerator::new();
        generator.set("interface", interface.name.as_str());
        generator.set("impl", interface.implemented_name());
        generator.set("prototype", interface.prototype_class());
        generator.set("constructor", interface.constructor_class());

        generator.appendln("#![allow(unused_variables, unused_mut, unreachable_code, clippy::all)]");
        generator.appendln(&format!("use {}::prelude::*;", self.config.runtime_path));
        for line in import_lines(interface, &self.config) {
            generator.appendln(&line);
        }
        generator.blank_line();

        self.emit_declarations(&mut generator, interface)?;
        self.emit_prototype(&mut generator, interface)?;
        if !interface.constructors.is_empty() {
            self.emit_constructor(&mut generator, interface)?;
        }

        let source = generator.finish();
        let body = if self.config.format_output {
            let syntax_tree = syn::parse_file(&source).map_err(|e| GenerationError::SynParse(e.to_string()))?;
            prettyplease::unparse(&syntax_tree)
        } else {
            source
        };
        tracing::debug!(bytes = body.len(), "generated bindings");

        if self.config.emit_header {
            Ok(format!(
                "// Generated by webidl-bindgen v{VERSION} from interface {}. Do not edit.\n\n{body}",
                interface.name
            ))
        } else {
            Ok(body)
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn emit_declarations(&self, generator: &mut SourceGenerator, interface: &Interface) -> GenerationResult<()> {
        for (name, enumeration) in &interface.enumerations {
            if enumeration.is_empty() {
                return Err(GenerationError::EmptyEnumeration { name: name.clone() });
            }
            let variants: Vec<&str> = enumeration.members().values().map(String::as_str).collect();
            generator.appendln("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
            generator.appendln(&format!("pub enum {name} {{ {} }}", variants.join(", ")));
            generator.blank_line();
        }
        for name in interface.dictionaries.keys() {
            let mut fields = Vec::new();
            for member in dictionary_members(interface, name)? {
                fields.push(format!(
                    "    pub {}: {},",
                    host_identifier(&member.name),
                    member_field_type(member, interface)?
                ));
            }
            generator.appendln("#[derive(Debug, Clone, PartialEq)]");
            generator.appendln(&format!("pub struct {name} {{"));
            for field in fields {
                generator.appendln(&field);
            }
            generator.appendln("}");
            generator.blank_line();
        }
        Ok(())
    }

    // ========================================================================
    // Prototype
    // ========================================================================

    fn emit_prototype(&self, generator: &mut SourceGenerator, interface: &Interface) -> GenerationResult<()> {
        generator.appendln("pub struct @prototype@;");
        generator.blank_line();
        generator.appendln("impl @prototype@ {");

        for (receiver, sets) in [
            (Receiver::Instance, interface.overload_sets()),
            (Receiver::Static, interface.static_overload_sets()),
        ] {
            for (name, functions) in sets {
                let method = host_identifier(name);
                let overloaded = functions.len() > 1;
                for (index, function) in functions.iter().enumerate() {
                    let implementation = match &function.extended_attributes.implemented_as {
                        Some(renamed) => host_identifier(renamed),
                        None if overloaded => format!("{method}{index}"),
                        None => method.clone(),
                    };
                    let callable = Callable {
                        idl_name: name,
                        parameters: &function.parameters,
                        return_type: Some(&function.return_type),
                        method: implementation,
                        receiver,
                    };
                    let native = if overloaded { format!("{method}{index}") } else { method.clone() };
                    self.emit_native_function(generator, interface, &native, !overloaded, &callable)?;
                }
                if overloaded {
                    let parameter_lists: Vec<&[Parameter]> =
                        functions.iter().map(|function| function.parameters.as_slice()).collect();
                    let plan = plan_overloads(name, &parameter_lists, interface)?;
                    generator.appendln(&format!(
                        "    pub fn {method}(realm: &mut Realm, this_value: &Value, arguments: &[Value]) -> ThrowCompletionOr<Value> {{"
                    ));
                    emit_arbiter(generator, &plan, interface, |index| {
                        format!("Self::{method}{index}(realm, this_value, arguments)")
                    })?;
                    generator.appendln("    }");
                    generator.blank_line();
                }
            }
        }

        for attribute in &interface.attributes {
            self.emit_attribute(generator, interface, attribute, Receiver::Instance)?;
        }
        for attribute in &interface.static_attributes {
            self.emit_attribute(generator, interface, attribute, Receiver::Static)?;
        }
        if !interface.constants.is_empty() {
            self.emit_constants(generator, interface)?;
        }
        generator.appendln("}");
        generator.blank_line();
        Ok(())
    }

    fn emit_native_function(
        &self,
        generator: &mut SourceGenerator,
        interface: &Interface,
        native_name: &str,
        public: bool,
        callable: &Callable<'_>,
    ) -> GenerationResult<()> {
        let visibility = if public { "pub " } else { "" };
        let signature = match callable.receiver {
            Receiver::Constructor => "realm: &mut Realm, arguments: &[Value]",
            _ => "realm: &mut Realm, this_value: &Value, arguments: &[Value]",
        };
        generator.appendln(&format!(
            "    {visibility}fn {native_name}({signature}) -> ThrowCompletionOr<Value> {{"
        ));
        self.emit_callable_body(generator, interface, callable)?;
        generator.appendln("    }");
        generator.blank_line();
        Ok(())
    }

    fn emit_callable_body(
        &self,
        generator: &mut SourceGenerator,
        interface: &Interface,
        callable: &Callable<'_>,
    ) -> GenerationResult<()> {
        let mut scoped = generator.fork();
        scoped.set("idl_name", format!("{:?}", callable.idl_name));
        let mut call_arguments = vec!["realm".to_string()];
        if callable.receiver == Receiver::Instance {
            scoped.appendln("    let imp = impl_from::<@impl@>(realm, this_value, \"@interface@\")?;");
            call_arguments.push("&imp".to_string());
        }

        let required = callable
            .parameters
            .iter()
            .take_while(|parameter| !parameter.optional && !parameter.variadic)
            .count();
        match required {
            0 => {}
            1 => scoped.appendln(
                "    if arguments.is_empty() { return Err(TypeError::new(ErrorType::BadArgCountOne, &[@idl_name@])); }",
            ),
            n => scoped.appendln(&format!(
                "    if arguments.len() < {n} {{ return Err(TypeError::new(ErrorType::BadArgCountMany, &[@idl_name@, \"{n}\"])); }}"
            )),
        }

        let converter = Converter::new(interface);
        for (index, parameter) in callable.parameters.iter().enumerate() {
            if !parameter.variadic {
                scoped.appendln(&format!("    let arg{index} = argument(arguments, {index});"));
            }
            let target = ConversionTarget::for_parameter(parameter, index);
            call_arguments.push(target.host_name.clone());
            converter.to_host(&mut scoped, &target)?;
        }

        let call = format!("@impl@::{}({})", callable.method, call_arguments.join(", "));
        match callable.return_type {
            None => {
                scoped.appendln(&format!("    let retval = {call}?;"));
                scoped.appendln("    Ok(Value::from(retval))");
            }
            Some(ty) if ty.is_undefined() => {
                scoped.appendln(&format!("    {call}?;"));
                scoped.appendln("    Ok(Value::Undefined)");
            }
            Some(ty) => {
                scoped.appendln(&format!("    let retval = {call}?;"));
                Wrapper::new(interface).to_script(&mut scoped, ty, "retval", &WrapSink::Return, 0)?;
            }
        }
        Ok(())
    }

    fn emit_attribute(
        &self,
        generator: &mut SourceGenerator,
        interface: &Interface,
        attribute: &Attribute,
        receiver: Receiver,
    ) -> GenerationResult<()> {
        classify(&attribute.ty, interface)?;
        let name = attribute
            .extended_attributes
            .implemented_as
            .as_deref()
            .map(host_identifier)
            .unwrap_or_else(|| host_identifier(&attribute.name));
        let native = host_identifier(&attribute.name);
        let mut scoped = generator.fork();
        scoped.set("name", name.as_str());
        scoped.set("native", native.trim_start_matches("r#"));
        let receiver_argument = if receiver == Receiver::Instance { ", &imp" } else { "" };
        scoped.set("receiver", receiver_argument);

        scoped.appendln(
            "    pub fn @native@_getter(realm: &mut Realm, this_value: &Value, arguments: &[Value]) -> ThrowCompletionOr<Value> {",
        );
        if receiver == Receiver::Instance {
            scoped.appendln("    let imp = impl_from::<@impl@>(realm, this_value, \"@interface@\")?;");
        }
        scoped.appendln("    let retval = @impl@::@name@(realm@receiver@)?;");
        Wrapper::new(interface).to_script(&mut scoped, &attribute.ty, "retval", &WrapSink::Return, 0)?;
        scoped.appendln("    }");
        scoped.blank_line();

        if attribute.readonly {
            return Ok(());
        }
        scoped.appendln(
            "    pub fn @native@_setter(realm: &mut Realm, this_value: &Value, arguments: &[Value]) -> ThrowCompletionOr<Value> {",
        );
        if receiver == Receiver::Instance {
            scoped.appendln("    let imp = impl_from::<@impl@>(realm, this_value, \"@interface@\")?;");
        }
        scoped.appendln("    let value = argument(arguments, 0);");
        let target = ConversionTarget::new(&attribute.ty, "value", "host_value")
            .with_label(attribute.name.clone())
            .with_attributes(&attribute.extended_attributes)
            .with_site(ConversionSite::AttributeSetter);
        Converter::new(interface).to_host(&mut scoped, &target)?;
        scoped.appendln(&format!(
            "    @impl@::set_{}(realm@receiver@, host_value)?;",
            name.trim_start_matches("r#")
        ));
        scoped.appendln("    Ok(Value::Undefined)");
        scoped.appendln("    }");
        scoped.blank_line();
        Ok(())
    }

    fn emit_constants(&self, generator: &mut SourceGenerator, interface: &Interface) -> GenerationResult<()> {
        generator.appendln("    pub fn define_constants(realm: &mut Realm, object: ObjectId) {");
        for constant in &interface.constants {
            let value = script_value_literal(&parse_default(&constant.value, &constant.ty, interface)?);
            generator.appendln(&format!(
                "    realm.define_property(object, {:?}, {value}, false);",
                constant.name
            ));
        }
        generator.appendln("    }");
        Ok(())
    }

    // ========================================================================
    // Constructor
    // ========================================================================

    fn emit_constructor(&self, generator: &mut SourceGenerator, interface: &Interface) -> GenerationResult<()> {
        generator.appendln("pub struct @constructor@;");
        generator.blank_line();
        generator.appendln("impl @constructor@ {");
        let overloaded = interface.constructors.len() > 1;
        for (index, constructor) in interface.constructors.iter().enumerate() {
            let callable = Callable {
                idl_name: &interface.name,
                parameters: &constructor.parameters,
                return_type: None,
                method: if overloaded { format!("construct{index}") } else { "construct".to_string() },
                receiver: Receiver::Constructor,
            };
            let native = if overloaded { format!("construct{index}") } else { "construct".to_string() };
            self.emit_native_function(generator, interface, &native, !overloaded, &callable)?;
        }
        if overloaded {
            let parameter_lists: Vec<&[Parameter]> = interface
                .constructors
                .iter()
                .map(|constructor| constructor.parameters.as_slice())
                .collect();
            let plan = plan_overloads(&interface.name, &parameter_lists, interface)?;
            generator.appendln(
                "    pub fn construct(realm: &mut Realm, arguments: &[Value]) -> ThrowCompletionOr<Value> {",
            );
            emit_arbiter(generator, &plan, interface, |index| format!("Self::construct{index}(realm, arguments)"))?;
            generator.appendln("    }");
        }
        generator.appendln("}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{Constant, Constructor, Dictionary, DictionaryMember, Enumeration, ExtendedAttributes, Function};

    use super::*;

    fn generate(interface: &Interface) -> String {
        BindingsCodegen::new(GeneratorConfig::new())
            .try_generate(interface)
            .expect("generation should succeed")
    }

    fn node() -> Interface {
        let mut interface = Interface::new("Node");
        interface.module_path = "DOM/Node".into();
        interface.functions.push(Function::new(
            "appendChild",
            Type::plain("Node"),
            vec![Parameter::new("node", Type::plain("Node"))],
        ));
        interface.attributes.push(Attribute::new("textContent", Type::plain("DOMString").nullable()));
        interface.attributes.push(Attribute::new("nodeType", Type::plain("unsigned short")).readonly());
        interface.constants.push(Constant {
            ty: Type::plain("unsigned short"),
            name: "ELEMENT_NODE".into(),
            value: "1".into(),
        });
        interface
    }

    #[test]
    fn generates_a_prototype_for_operations_and_attributes() {
        let out = generate(&node());
        assert!(out.starts_with("// Generated by webidl-bindgen v"));
        assert!(out.contains("use webidl_bindgen::runtime::prelude::*;"));
        assert!(out.contains("use crate::dom::node::*;"));
        assert!(out.contains("pub struct NodePrototype;"));
        assert!(out.contains("pub fn append_child("));
        assert!(out.contains("let retval = Node::append_child(realm, &imp, node)?;"));
        assert!(out.contains("pub fn text_content_getter("));
        assert!(out.contains("pub fn text_content_setter("));
        assert!(out.contains("Node::set_text_content(realm, &imp, host_value)?;"));
        assert!(out.contains("pub fn node_type_getter("));
        assert!(!out.contains("node_type_setter"));
        assert!(out.contains("realm.define_property(object, \"ELEMENT_NODE\", Value::Number(1.0), false);"));
    }

    #[test]
    fn checks_the_argument_count() {
        let out = generate(&node());
        assert!(out.contains("ErrorType::BadArgCountOne"));
    }

    #[test]
    fn overloaded_operations_get_a_dispatcher() {
        let mut interface = Interface::new("Canvas");
        interface.functions.push(Function::new(
            "fill",
            Type::plain("undefined"),
            vec![Parameter::new("rule", Type::plain("DOMString"))],
        ));
        interface.functions.push(Function::new(
            "fill",
            Type::plain("undefined"),
            vec![Parameter::new("path", Type::plain("Path2D")), Parameter::new("rule", Type::plain("DOMString"))],
        ));
        let out = generate(&interface);
        assert!(out.contains("fn fill0("));
        assert!(out.contains("fn fill1("));
        assert!(out.contains("pub fn fill("));
        assert!(out.contains("resolve_overload(realm, &dispatch, arguments)?"));
        assert!(out.contains("Canvas::fill1(realm, &imp, path, rule)?;"));
    }

    #[test]
    fn declarations_and_constructors() {
        let mut interface = Interface::new("Request");
        interface
            .enumerations
            .insert("RequestMode".into(), Enumeration::from_values(["cors", "no-cors"]));
        interface.dictionaries.insert(
            "RequestInit".into(),
            Dictionary::new(vec![
                DictionaryMember::new("mode", Type::plain("RequestMode")),
                DictionaryMember::new("keepalive", Type::plain("boolean")).with_default("false"),
            ]),
        );
        interface.constructors.push(Constructor::new(vec![
            Parameter::new("input", Type::plain("USVString")),
            Parameter::new("init", Type::plain("RequestInit")).optional(),
        ]));
        let out = generate(&interface);
        assert!(out.contains("pub enum RequestMode {"));
        assert!(out.contains("NoCors"));
        assert!(out.contains("pub mode: Option<RequestMode>,"));
        assert!(out.contains("pub keepalive: bool,"));
        assert!(out.contains("pub struct RequestConstructor;"));
        assert!(out.contains("let retval = Request::construct(realm, input, init)?;"));
    }

    #[test]
    fn implemented_as_renames_the_host_method() {
        let mut interface = Interface::new("Window");
        let mut function = Function::new("close", Type::plain("undefined"), vec![]);
        function.extended_attributes = ExtendedAttributes::default().with_implemented_as("closeWindow");
        interface.functions.push(function);
        let out = generate(&interface);
        assert!(out.contains("Window::close_window(realm, &imp)?;"));
    }

    #[test]
    fn unformatted_output_skips_the_printer() {
        let config = GeneratorConfig::new().with_format_output(false).with_header(false);
        let out = BindingsCodegen::new(config).try_generate(&node()).unwrap();
        assert!(out.starts_with("#![allow("));
    }

    #[test]
    fn unsupported_types_fail_generation() {
        let mut interface = Interface::new("Broken");
        interface.attributes.push(Attribute::new("thing", Type::plain("Mystery")));
        let err = BindingsCodegen::new(GeneratorConfig::new()).try_generate(&interface).unwrap_err();
        assert!(matches!(err, GenerationError::UnsupportedType { .. }));
    }
}
