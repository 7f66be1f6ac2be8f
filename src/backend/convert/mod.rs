//! Inbound converters: script value -> host value.
//!
//! A [`Converter`] authors the statements that turn one script value (a binding in generated code) into a
//! host binding of the classified type. Every category lives in its own submodule; this module holds the
//! shared request type ([`ConversionTarget`]), the dispatch, and the optional / nullable / default wrapper
//! ([`Converter::bind`]) that every category goes through.
//!
//! ## Module Organization
//!
//! - `defaults.rs` - Default-value literal parsing
//! - `strings.rs` - String types
//! - `primitives.rs` - Integers, floats, booleans, bigint, `any`
//! - `enums.rs` - Enumerations
//! - `handles.rs` - Platform objects, buffers, promises, `object`
//! - `callbacks.rs` - Callback functions
//! - `collections.rs` - Sequences and records
//! - `dictionary.rs` - Dictionaries
//! - `union.rs` - Unions and the shared [`UnionPlan`](union::UnionPlan)
//!
//! ## Notes
//! - Generated code works against `realm: &mut Realm` and `arguments: &[Value]`; every conversion that can
//!   fail uses `?` so TypeErrors propagate out of the generated function.
//! - The recursion depth in [`ConversionTarget::depth`] only names temporaries (`iterator1`, `typed_key2`).

mod callbacks;
mod collections;
pub mod defaults;
pub(crate) mod dictionary;
mod enums;
mod handles;
mod primitives;
mod strings;
pub mod union;

use webidl_core::lang::extended_attributes::{self, ExtendedAttributeId};
use webidl_core::lang::objects;
use webidl_core::{ExtendedAttributes, Interface, Parameter, Type};

use self::defaults::{DefaultValue, float_literal, parse_default, string_literal};
use super::classify::{check_shape, classify};
use super::errors::{GenerationError, GenerationResult};
use super::naming::host_identifier;
use super::source_generator::SourceGenerator;
use crate::runtime::abstract_ops::IntegerMode;

pub(crate) static NO_ATTRIBUTES: ExtendedAttributes = ExtendedAttributes {
    legacy_null_to_empty_string: false,
    clamp: false,
    enforce_range: false,
    implemented_as: None,
    legacy_treat_non_object_as_null: false,
};

/// Integer conversion mode under `attributes`: `[EnforceRange]`, `[Clamp]`, or the default modulo conversion.
///
/// ## Errors
/// - [`GenerationError::ConflictingExtendedAttributes`] when both are present; `label` names the culprit.
pub(crate) fn integer_mode(attributes: &ExtendedAttributes, label: &str) -> GenerationResult<IntegerMode> {
    match (attributes.clamp, attributes.enforce_range) {
        (true, true) => Err(GenerationError::ConflictingExtendedAttributes {
            name: label.to_string(),
            first: extended_attributes::as_str(ExtendedAttributeId::Clamp),
            second: extended_attributes::as_str(ExtendedAttributeId::EnforceRange),
        }),
        (true, false) => Ok(IntegerMode::Clamp),
        (false, true) => Ok(IntegerMode::EnforceRange),
        (false, false) => Ok(IntegerMode::Wrapping),
    }
}

/// Where a conversion is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionSite {
    Argument,
    /// An attribute setter; an invalid enumeration value leaves the attribute unchanged.
    AttributeSetter,
    DictionaryMember,
    /// Element, key, value or member conversions inside a composite converter.
    Nested,
}

/// One conversion to author: which script binding, into which host binding, under which rules.
#[derive(Debug, Clone)]
pub struct ConversionTarget<'a> {
    pub ty: &'a Type,
    pub js_name: String,
    pub js_suffix: String,
    pub host_name: String,
    /// Name cited in runtime error messages.
    pub label: String,
    pub optional: bool,
    pub variadic: bool,
    pub default_value: Option<&'a str>,
    pub attributes: &'a ExtendedAttributes,
    pub site: ConversionSite,
    pub depth: usize,
}

impl<'a> ConversionTarget<'a> {
    pub fn new(ty: &'a Type, js_name: impl Into<String>, host_name: impl Into<String>) -> Self {
        let host_name = host_name.into();
        ConversionTarget {
            ty,
            js_name: js_name.into(),
            js_suffix: String::new(),
            label: host_name.clone(),
            host_name,
            optional: false,
            variadic: false,
            default_value: None,
            attributes: &NO_ATTRIBUTES,
            site: ConversionSite::Nested,
            depth: 0,
        }
    }

    /// Target for operation argument `index` (`arg{index}` -> the parameter's host name).
    pub fn for_parameter(parameter: &'a Parameter, index: usize) -> Self {
        ConversionTarget {
            js_suffix: index.to_string(),
            label: parameter.name.clone(),
            optional: parameter.optional,
            variadic: parameter.variadic,
            default_value: parameter.default_value.as_deref(),
            attributes: &parameter.extended_attributes,
            site: ConversionSite::Argument,
            ..ConversionTarget::new(&parameter.ty, "arg", host_identifier(&parameter.name))
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.js_suffix = suffix.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_default(mut self, default_value: Option<&'a str>) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn with_attributes(mut self, attributes: &'a ExtendedAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_site(mut self, site: ConversionSite) -> Self {
        self.site = site;
        self
    }

    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// The script binding this target reads.
    pub fn js(&self) -> String {
        format!("{}{}", self.js_name, self.js_suffix)
    }

    /// A plain nested conversion one level deeper (sequence element, record value, union member).
    pub fn nested(
        &self,
        ty: &'a Type,
        js_name: impl Into<String>,
        js_suffix: impl Into<String>,
        host_name: impl Into<String>,
    ) -> ConversionTarget<'a> {
        ConversionTarget::new(ty, js_name, host_name)
            .with_suffix(js_suffix)
            .with_label(self.label.clone())
            .with_depth(self.depth + 1)
    }
}

/// Authors inbound conversions for one interface.
#[derive(Debug, Clone, Copy)]
pub struct Converter<'a> {
    pub interface: &'a Interface,
}

impl<'a> Converter<'a> {
    pub fn new(interface: &'a Interface) -> Self {
        Converter { interface }
    }

    /// Emit statements that bind `target.host_name` to the converted value of `target.js()`.
    ///
    /// ## Errors
    /// - Any [`GenerationError`] raised while classifying the type or parsing its default.
    pub fn to_host(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        check_shape(target.ty)?;
        let mut scoped = generator.fork();
        scoped.set("js", target.js());
        scoped.set("js_name", target.js_name.as_str());
        scoped.set("js_suffix", target.js_suffix.as_str());
        scoped.set("host", target.host_name.as_str());
        scoped.set("label", target.label.as_str());
        scoped.set("depth", target.depth.to_string());

        if target.variadic {
            return self.variadic(&mut scoped, target);
        }

        let ty = target.ty;
        let name = ty.name();
        if ty.is_union() {
            self.union(&mut scoped, target)
        } else if ty.is_string() {
            self.string(&mut scoped, target)
        } else if ty.is_any() || ty.is_undefined() {
            self.any(&mut scoped, target)
        } else if ty.is_integer() {
            self.integer(&mut scoped, target)
        } else if ty.is_floating_point() {
            self.floating_point(&mut scoped, target)
        } else if ty.is_boolean() {
            self.boolean(&mut scoped, target)
        } else if ty.is_bigint() {
            self.bigint(&mut scoped, target)
        } else if ty.is_sequence() {
            self.sequence(&mut scoped, target)
        } else if ty.is_record() {
            self.record(&mut scoped, target)
        } else if self.interface.is_enumeration(name) {
            self.enumeration(&mut scoped, target)
        } else if self.interface.is_dictionary(name) {
            self.dictionary(&mut scoped, target)
        } else if self.interface.is_callback_function(name) {
            self.callback(&mut scoped, target)
        } else if ty.is_object()
            || ty.is_promise()
            || objects::is_platform_object(name)
            || objects::buffer_source_from_str(name).is_some()
            || name == objects::WINDOW_PROXY
        {
            self.handle(&mut scoped, target)
        } else {
            Err(GenerationError::UnsupportedType {
                ty: ty.to_string(),
                context: format!("conversion of '{}'", target.label),
            })
        }
    }

    /// Parse the target's default literal, treating `null` like an absent default.
    fn usable_default(&self, target: &ConversionTarget<'_>) -> GenerationResult<Option<DefaultValue>> {
        let Some(literal) = target.default_value else {
            return Ok(None);
        };
        let value = parse_default(literal, target.ty, self.interface)?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    /// Render the target's default as a Rust expression of `host_type`, if it has a usable one.
    fn scalar_default(&self, target: &ConversionTarget<'_>, host_type: &str) -> GenerationResult<Option<String>> {
        Ok(self
            .usable_default(target)?
            .and_then(|value| render_default(&value, host_type)))
    }

    /// Bind `@host@` around a category-specific conversion.
    ///
    /// `produce` must emit statements that bind its second argument to the converted, non-null value of type
    /// `host_type`. Depending on optionality, nullability and the default, the result is stored directly,
    /// wrapped in `Option`, or replaced by `default_expr` when the script value is `undefined`.
    fn bind<F>(
        &self,
        generator: &mut SourceGenerator,
        target: &ConversionTarget<'_>,
        host_type: &str,
        default_expr: Option<String>,
        produce: F,
    ) -> GenerationResult<()>
    where
        F: FnOnce(&mut SourceGenerator, &str) -> GenerationResult<()>,
    {
        let nullable = target.ty.is_nullable();
        let optional = target.optional;
        if !optional && !nullable {
            return produce(generator, &target.host_name);
        }

        let (binding_type, guard) = match (optional, default_expr, nullable) {
            (true, Some(default), false) => (host_type.to_string(), format!("if @js@.is_undefined() {{ {default} }}")),
            (true, Some(default), true) => (
                format!("Option<{host_type}>"),
                format!("if @js@.is_undefined() {{ Some({default}) }} else if @js@.is_null() {{ None }}"),
            ),
            (true, None, false) => (format!("Option<{host_type}>"), "if @js@.is_undefined() { None }".to_string()),
            _ => (format!("Option<{host_type}>"), "if @js@.is_nullish() { None }".to_string()),
        };
        let wraps_in_some = binding_type.starts_with("Option<");
        generator.appendln(&format!("    let @host@: {binding_type} = {guard} else {{"));

        let inner = format!("{}_value", target.host_name);
        produce(generator, &inner)?;

        if wraps_in_some {
            generator.appendln(&format!("        Some({inner})"));
        } else {
            generator.appendln(&format!("        {inner}"));
        }
        generator.appendln("    };");
        Ok(())
    }

    /// Shorthand for [`Converter::bind`] when the conversion is one expression.
    fn bind_expression(
        &self,
        generator: &mut SourceGenerator,
        target: &ConversionTarget<'_>,
        host_type: &str,
        default_expr: Option<String>,
        expression: &str,
    ) -> GenerationResult<()> {
        self.bind(generator, target, host_type, default_expr, |generator, result| {
            generator.appendln(&format!("    let {result}: {host_type} = {expression};"));
            Ok(())
        })
    }

    /// Collect every argument from `arguments[index..]`, converting each independently.
    fn variadic(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let element_host = classify(target.ty, self.interface)?;
        let storage = if element_host.is_heap_tracked() { "MarkedVector" } else { "Vec" };
        generator.set("storage", storage);
        generator.set("element_type", element_host.name.as_str());
        generator.append(
            r#"    let mut @host@: @storage@<@element_type@> = Default::default();
    for variadic_index@depth@ in @js_suffix@..arguments.len() {
        let variadic_argument@depth@ = arguments[variadic_index@depth@].clone();
"#,
        );
        let depth = target.depth;
        let element = ConversionTarget {
            variadic: false,
            optional: false,
            default_value: None,
            js_name: "variadic_argument".to_string(),
            js_suffix: depth.to_string(),
            host_name: format!("variadic_item{depth}"),
            site: ConversionSite::Nested,
            ..target.clone()
        };
        self.to_host(generator, &element)?;
        generator.append(
            r#"        @host@.push(variadic_item@depth@);
    }
"#,
        );
        Ok(())
    }
}

/// Render a scalar default as a Rust expression of `host_type`; `null` and `undefined` have no rendering.
pub(crate) fn render_default(value: &DefaultValue, host_type: &str) -> Option<String> {
    let rendered = match value {
        DefaultValue::Null | DefaultValue::Undefined => return None,
        DefaultValue::Boolean(b) => b.to_string(),
        DefaultValue::Integer(n) if host_type.starts_with('f') => format!("{n}.0"),
        DefaultValue::Integer(n) => format!("{n}{host_type}"),
        DefaultValue::Float(x) => float_literal(*x, host_type),
        DefaultValue::String(s) => string_literal(s),
        DefaultValue::EmptySequence | DefaultValue::EmptyDictionary => "Default::default()".to_string(),
    };
    Some(rendered)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Render one conversion into a fresh generator.
    pub fn render(interface: &Interface, target: &ConversionTarget<'_>) -> String {
        let mut generator = SourceGenerator::new();
        Converter::new(interface)
            .to_host(&mut generator, target)
            .expect("conversion should succeed");
        generator.finish()
    }

    /// Parse generated statements as the body of a function to prove they are valid Rust.
    pub fn assert_parses(statements: &str) {
        let source = format!("fn generated() -> ThrowCompletionOr<Value> {{\n{statements}\n    Ok(Value::Undefined)\n}}");
        if let Err(err) = syn::parse_file(&source) {
            panic!("generated code does not parse: {err}\n{source}");
        }
    }
}
