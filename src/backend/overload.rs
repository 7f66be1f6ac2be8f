//! Overload resolution planning.
//!
//! For an overload set (same-named operations, or the constructors of an interface) this module computes the
//! WebIDL effective overload set, partitions it by argument count, and finds the distinguishing argument index
//! of every partition. The generator turns the resulting [`OverloadPlan`] into a two-level dispatcher: a match
//! on the clamped argument count that selects a [`DispatchGroup`](crate::runtime::overload::DispatchGroup),
//! then a call to [`resolve_overload`](crate::runtime::overload::resolve_overload) that picks the candidate.
//!
//! ## Notes
//! - Items are partitioned purely by type-list length; two partitions never claim the same count.
//! - A partition with a single item needs no distinguishing index.
//! - A partition with several items and no distinguishing index is a generation error.

use std::collections::BTreeMap;

use serde::Serialize;
use webidl_core::lang::objects;
use webidl_core::{Interface, Parameter, Type};

use crate::backend::classify::{TypeCategory, are_distinguishable, category_of, check_shape};
use crate::backend::errors::{GenerationError, GenerationResult};
use crate::backend::source_generator::SourceGenerator;
use crate::runtime::overload::{ArgumentTest, Optionality};

/// One entry of an effective overload set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadItem {
    /// Index of the callable in declaration order.
    pub callable_id: usize,
    pub types: Vec<Type>,
    pub optionality_values: Vec<Optionality>,
}

/// The items of one argument count, with their distinguishing index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveOverloadSet {
    pub items: Vec<OverloadItem>,
    pub distinguishing_argument_index: Option<usize>,
}

/// Dispatch plan for one overload set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverloadPlan {
    pub name: String,
    pub callable_count: usize,
    pub maximum_argument_count: usize,
    /// Partitions keyed by type-list length.
    pub buckets: BTreeMap<usize, EffectiveOverloadSet>,
}

impl OverloadPlan {
    /// The partition a call with `argument_count` arguments dispatches into, if any.
    pub fn bucket_for(&self, argument_count: usize) -> Option<&EffectiveOverloadSet> {
        self.buckets.get(&argument_count.min(self.maximum_argument_count))
    }
}

// ============================================================================
// Effective overload set
// ============================================================================

/// Compute the effective overload set of a list of callables.
///
/// ## Parameters
/// - `callables`: Parameter lists, one per callable, in declaration order.
///
/// ## Returns
/// - One item per declared signature, plus one per extra variadic slot up to the longest declared arity, plus
///   one per omissible trailing argument.
pub fn compute_effective_overload_set(callables: &[&[Parameter]]) -> Vec<OverloadItem> {
    let maximum = callables.iter().map(|parameters| parameters.len()).max().unwrap_or(0);
    let mut items: Vec<OverloadItem> = Vec::new();
    let mut push = |item: OverloadItem| {
        if !items.contains(&item) {
            items.push(item);
        }
    };

    for (callable_id, parameters) in callables.iter().enumerate() {
        let types: Vec<Type> = parameters.iter().map(|p| p.ty.clone()).collect();
        let optionality_values: Vec<Optionality> = parameters.iter().map(optionality_of).collect();
        push(OverloadItem {
            callable_id,
            types: types.clone(),
            optionality_values: optionality_values.clone(),
        });

        let count = parameters.len();
        if let Some(last) = parameters.last().filter(|p| p.variadic) {
            for length in count + 1..=maximum {
                let mut types = types.clone();
                let mut optionality_values = optionality_values.clone();
                types.resize(length, last.ty.clone());
                optionality_values.resize(length, Optionality::Variadic);
                push(OverloadItem {
                    callable_id,
                    types,
                    optionality_values,
                });
            }
        }

        for length in (0..count).rev() {
            let omitted = &parameters[length];
            if !omitted.optional && !omitted.variadic {
                break;
            }
            push(OverloadItem {
                callable_id,
                types: types[..length].to_vec(),
                optionality_values: optionality_values[..length].to_vec(),
            });
        }
    }
    items
}

fn optionality_of(parameter: &Parameter) -> Optionality {
    if parameter.variadic {
        Optionality::Variadic
    } else if parameter.optional {
        Optionality::Optional
    } else {
        Optionality::Required
    }
}

/// Partition an overload set by argument count and compute every distinguishing index.
///
/// ## Errors
/// - [`GenerationError::NoDistinguishingIndex`] when a partition with several items has no position at which
///   all of them are pairwise distinguishable.
/// - Classification errors for argument types in multi-item partitions.
pub fn plan_overloads(name: &str, callables: &[&[Parameter]], interface: &Interface) -> GenerationResult<OverloadPlan> {
    let mut buckets: BTreeMap<usize, Vec<OverloadItem>> = BTreeMap::new();
    for item in compute_effective_overload_set(callables) {
        buckets.entry(item.types.len()).or_default().push(item);
    }
    let maximum_argument_count = buckets.keys().next_back().copied().unwrap_or(0);

    let mut planned = BTreeMap::new();
    for (argument_count, items) in buckets {
        let distinguishing_argument_index = if items.len() < 2 {
            None
        } else {
            let index = distinguishing_index(&items, argument_count, interface)?;
            if index.is_none() {
                return Err(GenerationError::NoDistinguishingIndex {
                    operation: name.to_string(),
                    argument_count,
                });
            }
            index
        };
        tracing::debug!(
            operation = name,
            argument_count,
            items = items.len(),
            ?distinguishing_argument_index,
            "planned overload partition"
        );
        planned.insert(
            argument_count,
            EffectiveOverloadSet {
                items,
                distinguishing_argument_index,
            },
        );
    }

    Ok(OverloadPlan {
        name: name.to_string(),
        callable_count: callables.len(),
        maximum_argument_count,
        buckets: planned,
    })
}

fn distinguishing_index(
    items: &[OverloadItem],
    argument_count: usize,
    interface: &Interface,
) -> GenerationResult<Option<usize>> {
    'positions: for index in 0..argument_count {
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                if !are_distinguishable(&a.types[index], &b.types[index], interface)? {
                    continue 'positions;
                }
            }
        }
        return Ok(Some(index));
    }
    Ok(None)
}

// ============================================================================
// Runtime argument tests
// ============================================================================

/// The runtime test that recognizes values of `ty` during overload resolution.
pub fn argument_test(ty: &Type, interface: &Interface) -> GenerationResult<ArgumentTest> {
    check_shape(ty)?;
    if ty.is_nullable() && !ty.is_any() {
        let inner = argument_test(&ty.clone().with_nullable(false), interface)?;
        return Ok(ArgumentTest::Nullable(Box::new(inner)));
    }
    let name = ty.name();
    let test = match category_of(ty, interface)? {
        TypeCategory::Union => ArgumentTest::Union(
            ty.members()
                .iter()
                .map(|member| argument_test(member, interface))
                .collect::<GenerationResult<_>>()?,
        ),
        TypeCategory::Any => ArgumentTest::Any,
        TypeCategory::Undefined => ArgumentTest::Undefined,
        TypeCategory::Boolean => ArgumentTest::Boolean,
        TypeCategory::Numeric => ArgumentTest::Numeric,
        TypeCategory::BigInt => ArgumentTest::BigInt,
        TypeCategory::String => ArgumentTest::String,
        TypeCategory::Object => ArgumentTest::Object,
        TypeCategory::InterfaceLike if objects::buffer_source_from_str(name).is_some() => {
            ArgumentTest::BufferSource(name.to_string())
        }
        TypeCategory::InterfaceLike => ArgumentTest::Interface(name.to_string()),
        TypeCategory::CallbackFunction => ArgumentTest::Callback,
        TypeCategory::DictionaryLike if ty.is_record() => ArgumentTest::Record,
        TypeCategory::DictionaryLike => ArgumentTest::Dictionary,
        TypeCategory::SequenceLike => ArgumentTest::Sequence,
        TypeCategory::Symbol => {
            return Err(GenerationError::UnsupportedType {
                ty: ty.to_string(),
                context: "overload resolution".to_string(),
            });
        }
    };
    Ok(test)
}

/// Render an [`ArgumentTest`] as a Rust expression.
pub fn render_argument_test(test: &ArgumentTest) -> String {
    match test {
        ArgumentTest::Interface(name) => format!("ArgumentTest::Interface({name:?}.to_string())"),
        ArgumentTest::BufferSource(name) => format!("ArgumentTest::BufferSource({name:?}.to_string())"),
        ArgumentTest::Nullable(inner) => format!("ArgumentTest::Nullable(Box::new({}))", render_argument_test(inner)),
        ArgumentTest::Union(members) => format!(
            "ArgumentTest::Union(vec![{}])",
            members.iter().map(render_argument_test).collect::<Vec<_>>().join(", ")
        ),
        other => format!("ArgumentTest::{other:?}"),
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit the dispatcher body for an overload set.
///
/// `call` renders the call to overload `i` (for example `Self::append0(realm, this_value, arguments)`).
pub fn emit_arbiter<F>(
    generator: &mut SourceGenerator,
    plan: &OverloadPlan,
    interface: &Interface,
    call: F,
) -> GenerationResult<()>
where
    F: Fn(usize) -> String,
{
    let mut scoped = generator.fork();
    scoped.set("overload_name", format!("{:?}", plan.name));
    scoped.set("maximum", plan.maximum_argument_count.to_string());
    scoped.appendln("    let dispatch = match arguments.len().min(@maximum@) {");
    for (argument_count, bucket) in &plan.buckets {
        let Some(index) = bucket.distinguishing_argument_index else {
            let callable = bucket.items.first().map(|item| item.callable_id).unwrap_or_default();
            scoped.appendln(&format!("        {argument_count} => DispatchGroup::single({callable}),"));
            continue;
        };
        let mut candidates = Vec::with_capacity(bucket.items.len());
        for item in &bucket.items {
            candidates.push(format!(
                "OverloadCandidate::new({}, Optionality::{:?}, {})",
                item.callable_id,
                item.optionality_values[index],
                render_argument_test(&argument_test(&item.types[index], interface)?)
            ));
        }
        scoped.appendln(&format!(
            "        {argument_count} => DispatchGroup::new(Some({index}), vec![{}]),",
            candidates.join(", ")
        ));
    }
    scoped.appendln(
        "        _ => return Err(TypeError::new(ErrorType::OverloadResolutionFailed, &[@overload_name@])),",
    );
    scoped.appendln("    };");
    scoped.appendln("    match resolve_overload(realm, &dispatch, arguments)? {");
    for callable in 0..plan.callable_count {
        scoped.appendln(&format!("        {callable} => {},", call(callable)));
    }
    scoped.appendln("        _ => Err(TypeError::new(ErrorType::OverloadResolutionFailed, &[@overload_name@])),");
    scoped.appendln("    }");
    Ok(())
}
