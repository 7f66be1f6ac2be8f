//! Union conversions.
//!
//! A union value is converted by an ordered disjunction over the flattened member types:
//!
//! 1. `undefined` becomes the `Empty` variant when the union includes `undefined`.
//! 2. `null`/`undefined` go to the dictionary member, if there is one.
//! 3. Objects try, in order: platform objects (exact interface), `WindowProxy`, buffer sources, callbacks,
//!    sequences (iterable objects), dictionaries, records, then a bare `object` member.
//! 4. Booleans, numbers and bigints go to a member of their own category.
//! 5. Anything left goes to the string (or enumeration) member if there is one, otherwise through the first
//!    applicable numeric / boolean / bigint fallback, otherwise throws `NoUnionTypesMatched`.
//!
//! [`UnionPlan`] computes that order once. The generator emits it as a local closure returning the union
//! variant; the runtime converter walks the same plan directly.
//!
//! ## Notes
//! - Variant `V{i}` holds flattened member `i`; `Empty` is always the last variant.
//! - A nullable *member* (as opposed to a nullable union) is not given its own null step; null values fall
//!   through the remaining rules. Plans containing one log a warning.

use webidl_core::lang::objects;
use webidl_core::{Interface, Type};

use super::defaults::{DefaultValue, parse_default};
use super::{ConversionTarget, Converter, render_default};
use crate::backend::classify::{TypeCategory, are_distinguishable, category_of, classify, classify_union_members};
use crate::backend::errors::{GenerationError, GenerationResult};
use crate::backend::source_generator::SourceGenerator;

/// Largest number of variants a host union type provides.
pub const MAX_UNION_VARIANTS: usize = 8;

/// Runtime check that selects one union member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArmTest {
    PlatformObject(String),
    WindowProxy,
    BufferSource(String),
    Callback,
    Sequence,
    Dictionary,
    Record,
    Object,
    Boolean,
    Number,
    BigInt,
    /// The string or enumeration member: accepts any value that reaches it.
    AnyValue,
}

impl ArmTest {
    /// Whether the arm is tried only for object values.
    pub fn requires_object(&self) -> bool {
        matches!(
            self,
            ArmTest::PlatformObject(_)
                | ArmTest::WindowProxy
                | ArmTest::BufferSource(_)
                | ArmTest::Callback
                | ArmTest::Sequence
                | ArmTest::Dictionary
                | ArmTest::Record
                | ArmTest::Object
        )
    }

    fn rank(&self) -> usize {
        match self {
            ArmTest::PlatformObject(_) => 0,
            ArmTest::WindowProxy => 1,
            ArmTest::BufferSource(_) => 2,
            ArmTest::Callback => 3,
            ArmTest::Sequence => 4,
            ArmTest::Dictionary => 5,
            ArmTest::Record => 6,
            ArmTest::Object => 7,
            ArmTest::Boolean => 8,
            ArmTest::Number => 9,
            ArmTest::BigInt => 10,
            ArmTest::AnyValue => 11,
        }
    }
}

/// One arm of the disjunction: a test and the member it selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionArm {
    pub member: usize,
    pub test: ArmTest,
}

/// What happens to a value no arm accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionFallback {
    /// The string member accepts everything; nothing reaches the fallback.
    Exhaustive,
    /// `ToNumeric`, then the bigint member for bigints and the numeric member otherwise.
    NumericOrBigInt { numeric: usize, bigint: usize },
    Numeric(usize),
    Boolean(usize),
    BigInt(usize),
    TypeError,
}

/// The conversion order for one union type.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionPlan {
    pub union_type: Type,
    /// Flattened member types without `undefined`, nullability stripped. Index = variant index.
    pub members: Vec<Type>,
    pub includes_undefined: bool,
    /// The dictionary member that receives `null` and `undefined`.
    pub nullish_dictionary: Option<usize>,
    pub arms: Vec<UnionArm>,
    pub fallback: UnionFallback,
}

impl UnionPlan {
    /// Validate a union type and compute its conversion order.
    ///
    /// ## Errors
    /// - [`GenerationError::InconsistentUnion`] when members are not pairwise distinguishable, more than one
    ///   member is nullable, or the union has more than [`MAX_UNION_VARIANTS`] variants.
    /// - [`GenerationError::UnsupportedType`] for members with no arm (for example `symbol`).
    pub fn build(union_type: &Type, interface: &Interface) -> GenerationResult<UnionPlan> {
        let inconsistent = |reason: String| GenerationError::InconsistentUnion {
            union: union_type.to_string(),
            reason,
        };

        let members: Vec<Type> = union_type
            .flattened_member_types()
            .into_iter()
            .filter(|member| !member.is_undefined())
            .collect();
        let includes_undefined = union_type.includes_undefined();
        let variant_count = members.len() + usize::from(includes_undefined);
        if variant_count > MAX_UNION_VARIANTS {
            return Err(inconsistent(format!(
                "{variant_count} variants exceed the maximum of {MAX_UNION_VARIANTS}"
            )));
        }
        if union_type.number_of_nullable_member_types() > 1 {
            return Err(inconsistent("more than one member type is nullable".to_string()));
        }
        if union_type.members().iter().any(|member| member.is_nullable() && !member.is_union()) {
            tracing::warn!(ty = %union_type, "nullable union member types get no dedicated null step");
        }
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if !are_distinguishable(a, b, interface)? {
                    return Err(inconsistent(format!("member types '{a}' and '{b}' are not distinguishable")));
                }
            }
        }

        let mut arms = Vec::with_capacity(members.len());
        for (index, member) in members.iter().enumerate() {
            arms.push(UnionArm {
                member: index,
                test: arm_test(member, interface)?,
            });
        }
        arms.sort_by_key(|arm| arm.test.rank());

        let find = |test: &ArmTest| arms.iter().find(|arm| &arm.test == test).map(|arm| arm.member);
        let nullish_dictionary = find(&ArmTest::Dictionary);
        let fallback = match (find(&ArmTest::AnyValue), find(&ArmTest::Number), find(&ArmTest::BigInt)) {
            (Some(_), _, _) => UnionFallback::Exhaustive,
            (None, Some(numeric), Some(bigint)) => UnionFallback::NumericOrBigInt { numeric, bigint },
            (None, Some(numeric), None) => UnionFallback::Numeric(numeric),
            (None, None, bigint) => match (find(&ArmTest::Boolean), bigint) {
                (Some(boolean), _) => UnionFallback::Boolean(boolean),
                (None, Some(bigint)) => UnionFallback::BigInt(bigint),
                (None, None) => UnionFallback::TypeError,
            },
        };

        Ok(UnionPlan {
            union_type: union_type.clone(),
            members,
            includes_undefined,
            nullish_dictionary,
            arms,
            fallback,
        })
    }

    /// Number of host variants, counting `Empty`.
    pub fn variant_count(&self) -> usize {
        self.members.len() + usize::from(self.includes_undefined)
    }

    /// Variant index of `Empty`, if the union includes `undefined`.
    pub fn empty_variant(&self) -> Option<usize> {
        self.includes_undefined.then_some(self.members.len())
    }
}

fn arm_test(member: &Type, interface: &Interface) -> GenerationResult<ArmTest> {
    let name = member.name();
    let test = match category_of(member, interface)? {
        TypeCategory::InterfaceLike if name == objects::WINDOW_PROXY => ArmTest::WindowProxy,
        TypeCategory::InterfaceLike if objects::buffer_source_from_str(name).is_some() => {
            ArmTest::BufferSource(name.to_string())
        }
        TypeCategory::InterfaceLike => ArmTest::PlatformObject(name.to_string()),
        TypeCategory::CallbackFunction => ArmTest::Callback,
        TypeCategory::SequenceLike => ArmTest::Sequence,
        TypeCategory::DictionaryLike if member.is_record() => ArmTest::Record,
        TypeCategory::DictionaryLike => ArmTest::Dictionary,
        TypeCategory::Object => ArmTest::Object,
        TypeCategory::Boolean => ArmTest::Boolean,
        TypeCategory::Numeric => ArmTest::Number,
        TypeCategory::BigInt => ArmTest::BigInt,
        TypeCategory::String => ArmTest::AnyValue,
        TypeCategory::Any | TypeCategory::Undefined | TypeCategory::Symbol | TypeCategory::Union => {
            return Err(GenerationError::UnsupportedType {
                ty: member.to_string(),
                context: "union member".to_string(),
            });
        }
    };
    Ok(test)
}

// ============================================================================
// Emission
// ============================================================================

impl Converter<'_> {
    pub(super) fn union(&self, generator: &mut SourceGenerator, target: &ConversionTarget<'_>) -> GenerationResult<()> {
        let plan = UnionPlan::build(target.ty, self.interface)?;
        let host_type = classify_union_members(target.ty, self.interface)?.name;
        let union_name = format!("Union{}", plan.variant_count());

        let mut scoped = generator.fork();
        scoped.set("union_type", host_type.as_str());
        scoped.set("union_name", union_name.as_str());
        scoped.set("idl_type", format!("{:?}", target.ty.to_string()));
        self.emit_variant_closure(&mut scoped, target, &plan)?;

        let default = self.union_default(target, &plan, &union_name)?;
        // `undefined` is a member value here, never an absent one.
        let bind_target = ConversionTarget {
            optional: target.optional && !plan.includes_undefined,
            ..target.clone()
        };
        self.bind_expression(
            &mut scoped,
            &bind_target,
            &host_type,
            default,
            "@js@_to_variant(realm, @js@.clone())?",
        )
    }

    fn emit_variant_closure(
        &self,
        generator: &mut SourceGenerator,
        target: &ConversionTarget<'_>,
        plan: &UnionPlan,
    ) -> GenerationResult<()> {
        let depth = target.depth;
        generator.appendln("    let @js@_to_variant = |realm: &mut Realm, @js@: Value| -> ThrowCompletionOr<@union_type@> {");
        if let Some(empty) = plan.empty_variant() {
            generator.appendln(&format!(
                "        if @js@.is_undefined() {{ return Ok(@union_name@::V{empty}(Empty)); }}"
            ));
        }
        if let Some(index) = plan.nullish_dictionary {
            generator.appendln("        if @js@.is_nullish() {");
            self.emit_member(generator, target, plan, index)?;
            generator.appendln("        }");
        }

        let object_arms: Vec<&UnionArm> = plan.arms.iter().filter(|arm| arm.test.requires_object()).collect();
        if !object_arms.is_empty() {
            generator.appendln("        if let Some(@js@_object) = @js@.as_object() {");
            for arm in object_arms {
                let handle = format!("return Ok(@union_name@::V{}(Handle::new(@js@_object)));", arm.member);
                match &arm.test {
                    ArmTest::PlatformObject(name) => {
                        generator.appendln(&format!("            if realm.implements(@js@_object, {name:?}) {{ {handle} }}"));
                    }
                    ArmTest::WindowProxy => {
                        generator.appendln(&format!("            if realm.is_window_proxy(@js@_object) {{ {handle} }}"));
                    }
                    ArmTest::BufferSource(name) => {
                        generator.appendln(&format!(
                            "            if realm.is_buffer_source(@js@_object, {name:?}) {{ {handle} }}"
                        ));
                    }
                    ArmTest::Callback => {
                        generator.appendln(&format!("            if realm.is_callable(&@js@) {{ {handle} }}"));
                    }
                    ArmTest::Sequence => {
                        generator.appendln("            if realm.get_iterator_method(&@js@)?.is_some() {");
                        self.emit_member(generator, target, plan, arm.member)?;
                        generator.appendln("            }");
                    }
                    ArmTest::Dictionary | ArmTest::Record => {
                        self.emit_member(generator, target, plan, arm.member)?;
                    }
                    ArmTest::Object => generator.appendln(&format!("            {handle}")),
                    _ => {}
                }
            }
            generator.appendln("        }");
        }

        for arm in plan.arms.iter().filter(|arm| !arm.test.requires_object()) {
            let condition = match arm.test {
                ArmTest::Boolean => "@js@.is_boolean()",
                ArmTest::Number => "@js@.is_number()",
                ArmTest::BigInt => "@js@.is_bigint()",
                _ => continue,
            };
            generator.appendln(&format!("        if {condition} {{"));
            self.emit_member(generator, target, plan, arm.member)?;
            generator.appendln("        }");
        }

        match plan.fallback {
            UnionFallback::Exhaustive => {
                let string_member = plan
                    .arms
                    .iter()
                    .find(|arm| arm.test == ArmTest::AnyValue)
                    .map(|arm| arm.member)
                    .unwrap_or_default();
                self.emit_member(generator, target, plan, string_member)?;
            }
            UnionFallback::NumericOrBigInt { numeric, bigint } => {
                generator.appendln(&format!("        let union_numeric{depth} = to_numeric(realm, &@js@)?;"));
                generator.appendln(&format!(
                    "        if let Numeric::BigInt(union_bigint{depth}) = union_numeric{depth} {{ return Ok(@union_name@::V{bigint}(union_bigint{depth})); }}"
                ));
                generator.appendln(&format!("        let union_number{depth} = Value::from(union_numeric{depth});"));
                let member = &plan.members[numeric];
                let nested = target.nested(member, "union_number", depth.to_string(), format!("union_member{depth}"));
                self.to_host(generator, &nested)?;
                generator.appendln(&format!("        Ok(@union_name@::V{numeric}(union_member{depth}))"));
            }
            UnionFallback::Numeric(index) | UnionFallback::Boolean(index) | UnionFallback::BigInt(index) => {
                self.emit_member(generator, target, plan, index)?;
            }
            UnionFallback::TypeError => {
                generator.appendln(
                    "        Err(TypeError::new(ErrorType::NoUnionTypesMatched, &[&to_display_string(realm, &@js@), @idl_type@]))",
                );
            }
        }
        generator.appendln("    };");
        Ok(())
    }

    /// Convert `@js@` as member `index` and return its variant.
    fn emit_member(
        &self,
        generator: &mut SourceGenerator,
        target: &ConversionTarget<'_>,
        plan: &UnionPlan,
        index: usize,
    ) -> GenerationResult<()> {
        let depth = target.depth;
        let member = &plan.members[index];
        let nested = target.nested(member, target.js_name.clone(), target.js_suffix.clone(), format!("union_member{depth}"));
        self.to_host(generator, &nested)?;
        generator.appendln(&format!("        return Ok(@union_name@::V{index}(union_member{depth}));"));
        Ok(())
    }

    /// Render a union default by routing the literal to the member it belongs to.
    fn union_default(
        &self,
        target: &ConversionTarget<'_>,
        plan: &UnionPlan,
        union_name: &str,
    ) -> GenerationResult<Option<String>> {
        let Some(literal) = target.default_value else {
            return Ok(None);
        };
        let value = parse_default(literal, target.ty, self.interface)?;
        let rendered = match value {
            DefaultValue::Null => None,
            DefaultValue::Undefined => plan.empty_variant().map(|index| format!("{union_name}::V{index}(Empty)")),
            DefaultValue::EmptyDictionary => plan
                .nullish_dictionary
                .map(|_| "@js@_to_variant(realm, Value::Undefined)?".to_string()),
            _ => {
                let mut rendered = None;
                for (index, member) in plan.members.iter().enumerate() {
                    if parse_default(literal, member, self.interface).is_err() {
                        continue;
                    }
                    let expression = match self.interface.enumeration(member.name()) {
                        Some(enumeration) => match &value {
                            DefaultValue::String(wire) => enumeration
                                .host_identifier_for(wire)
                                .map(|host| format!("{}::{host}", member.name())),
                            _ => None,
                        },
                        None => render_default(&value, &classify(member, self.interface)?.name),
                    };
                    rendered = expression.map(|expression| format!("{union_name}::V{index}({expression})"));
                    break;
                }
                rendered
            }
        };
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use webidl_core::{Dictionary, DictionaryMember, Enumeration, Interface, Parameter, Type};

    use super::*;
    use crate::backend::convert::test_support::{assert_parses, render};

    fn interface() -> Interface {
        let mut interface = Interface::new("I");
        interface.dictionaries.insert(
            "Options".into(),
            Dictionary::new(vec![DictionaryMember::new("capture", Type::plain("boolean"))]),
        );
        interface
            .enumerations
            .insert("Mode".into(), Enumeration::from_values(["open", "closed"]));
        interface
    }

    fn union(members: &[&str]) -> Type {
        Type::union(members.iter().map(|name| Type::plain(*name)).collect())
    }

    // ========================================================================
    // Planning
    // ========================================================================

    #[test]
    fn one_arm_per_member_in_conversion_order() {
        let ty = union(&["DOMString", "Node", "boolean", "Options"]);
        let plan = UnionPlan::build(&ty, &interface()).unwrap();
        let tests: Vec<&ArmTest> = plan.arms.iter().map(|arm| &arm.test).collect();
        assert_eq!(
            tests,
            [
                &ArmTest::PlatformObject("Node".into()),
                &ArmTest::Dictionary,
                &ArmTest::Boolean,
                &ArmTest::AnyValue
            ]
        );
        let mut members: Vec<usize> = plan.arms.iter().map(|arm| arm.member).collect();
        members.sort_unstable();
        assert_eq!(members, [0, 1, 2, 3]);
        assert_eq!(plan.nullish_dictionary, Some(3));
        assert_eq!(plan.fallback, UnionFallback::Exhaustive);
    }

    #[test]
    fn undefined_becomes_the_last_variant() {
        let ty = union(&["long", "undefined"]);
        let plan = UnionPlan::build(&ty, &interface()).unwrap();
        assert_eq!(plan.members, [Type::plain("long")]);
        assert_eq!(plan.empty_variant(), Some(1));
        assert_eq!(plan.fallback, UnionFallback::Numeric(0));
    }

    #[test]
    fn numeric_and_bigint_share_a_to_numeric_fallback() {
        let plan = UnionPlan::build(&union(&["double", "bigint"]), &interface()).unwrap();
        assert_eq!(plan.fallback, UnionFallback::NumericOrBigInt { numeric: 0, bigint: 1 });
    }

    #[test]
    fn indistinguishable_members_are_rejected() {
        let err = UnionPlan::build(&union(&["DOMString", "Mode"]), &interface()).unwrap_err();
        assert!(matches!(err, GenerationError::InconsistentUnion { .. }));
        let err = UnionPlan::build(&union(&["long", "double"]), &interface()).unwrap_err();
        assert!(matches!(err, GenerationError::InconsistentUnion { .. }));
    }

    #[test]
    fn too_many_variants_are_rejected() {
        let ty = union(&[
            "Node", "Document", "Text", "Attr", "Range", "Blob", "FormData", "Path2D", "Selection",
        ]);
        let err = UnionPlan::build(&ty, &interface()).unwrap_err();
        assert!(matches!(err, GenerationError::InconsistentUnion { .. }));
    }

    // ========================================================================
    // Emission
    // ========================================================================

    #[test]
    fn emits_a_variant_closure() {
        let parameter = Parameter::new("node", union(&["Node", "DOMString"]));
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("let arg0_to_variant = |realm: &mut Realm, arg0: Value| -> ThrowCompletionOr<Union2<Handle<Node>, String>> {"));
        assert!(out.contains("if realm.implements(arg0_object, \"Node\") { return Ok(Union2::V0(Handle::new(arg0_object))); }"));
        assert!(out.contains("let union_member0: String = to_string(realm, &arg0)?;"));
        assert!(out.contains("let node: Union2<Handle<Node>, String> = arg0_to_variant(realm, arg0.clone())?;"));
        assert_eq!(out.matches("return Ok(Union2::V").count(), 2);
        assert_parses(&out);
    }

    #[test]
    fn boolean_fallback_and_exhausted_union() {
        let parameter = Parameter::new("target", union(&["Node", "boolean"]));
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("if arg0.is_boolean() {"));
        assert!(out.contains("return Ok(Union2::V1(union_member0));"));
        assert!(!out.contains("NoUnionTypesMatched"));
        assert_parses(&out);

        let parameter = Parameter::new("target", union(&["Node", "Options"]));
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("if arg0.is_nullish() {"));
        assert!(out.contains("ErrorType::NoUnionTypesMatched"));
        assert!(out.contains("\"(Node or Options)\""));
        assert_parses(&out);
    }

    #[test]
    fn empty_variant_and_defaults() {
        let parameter = Parameter::new("value", union(&["long", "undefined"])).optional();
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("if arg0.is_undefined() { return Ok(Union2::V1(Empty)); }"));
        assert!(out.contains("let value: Union2<i32, Empty> = arg0_to_variant(realm, arg0.clone())?;"));

        let parameter = Parameter::new("mode", union(&["Mode", "long"])).with_default("\"closed\"");
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("if arg0.is_undefined() { Union2::V0(Mode::Closed) }"));
        assert_parses(&out);

        let parameter = Parameter::new("options", union(&["Options", "boolean"])).with_default("{}");
        let out = render(&interface(), &ConversionTarget::for_parameter(&parameter, 0));
        assert!(out.contains("if arg0.is_undefined() { arg0_to_variant(realm, Value::Undefined)? }"));
        assert_parses(&out);
    }
}
