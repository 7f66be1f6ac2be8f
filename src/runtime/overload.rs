//! Runtime half of overload resolution.
//!
//! Generated dispatchers select a [`DispatchGroup`] by argument count (the generation-time partition of the
//! effective overload set) and call [`resolve_overload`], which inspects the argument at the group's
//! distinguishing index and returns the callable id to invoke.
//!
//! ## Notes
//! - Candidates are examined stage by stage in the order of the WebIDL overload resolution algorithm; within a
//!   stage, declaration order wins.
//! - Interface tests are checked against the realm, so two distinguishable interface types resolve here rather
//!   than at generation time.

use serde::Serialize;

use super::errors::{ErrorType, ThrowCompletionOr, TypeError};
use super::realm::Realm;
use super::value::Value;

/// The runtime test that recognizes values of one IDL type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ArgumentTest {
    Any,
    Undefined,
    Boolean,
    Numeric,
    BigInt,
    String,
    Object,
    Interface(String),
    BufferSource(String),
    Callback,
    Dictionary,
    Record,
    Sequence,
    Nullable(Box<ArgumentTest>),
    Union(Vec<ArgumentTest>),
}

impl ArgumentTest {
    /// Whether this test, or any member of a union it describes, satisfies `predicate`.
    fn has(&self, predicate: &dyn Fn(&ArgumentTest) -> bool) -> bool {
        match self {
            ArgumentTest::Nullable(inner) => inner.has(predicate),
            ArgumentTest::Union(members) => members.iter().any(|member| member.has(predicate)),
            other => predicate(other),
        }
    }

    /// Nullable types, dictionaries, and unions that include either.
    fn accepts_nullish(&self) -> bool {
        match self {
            ArgumentTest::Nullable(_) | ArgumentTest::Dictionary => true,
            ArgumentTest::Union(members) => members.iter().any(ArgumentTest::accepts_nullish),
            _ => false,
        }
    }
}

/// Optionality of an argument position within an overload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Optionality {
    Required,
    Optional,
    Variadic,
}

/// One overload as seen from the distinguishing argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadCandidate {
    pub callable_id: usize,
    pub optionality: Optionality,
    pub test: ArgumentTest,
}

impl OverloadCandidate {
    pub fn new(callable_id: usize, optionality: Optionality, test: ArgumentTest) -> Self {
        OverloadCandidate {
            callable_id,
            optionality,
            test,
        }
    }
}

/// The candidates for one argument count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchGroup {
    pub distinguishing_argument_index: Option<usize>,
    pub candidates: Vec<OverloadCandidate>,
}

impl DispatchGroup {
    pub fn new(distinguishing_argument_index: Option<usize>, candidates: Vec<OverloadCandidate>) -> Self {
        DispatchGroup {
            distinguishing_argument_index,
            candidates,
        }
    }

    /// A group with exactly one overload; no argument inspection is needed.
    pub fn single(callable_id: usize) -> Self {
        DispatchGroup::new(
            None,
            vec![OverloadCandidate::new(callable_id, Optionality::Required, ArgumentTest::Any)],
        )
    }
}

/// Pick the overload to call.
///
/// ## Errors
/// - `OverloadResolutionFailed` when no candidate accepts the distinguishing argument.
pub fn resolve_overload(realm: &Realm, group: &DispatchGroup, arguments: &[Value]) -> ThrowCompletionOr<usize> {
    let Some(index) = group.distinguishing_argument_index else {
        return group
            .candidates
            .first()
            .map(|candidate| candidate.callable_id)
            .ok_or_else(|| failure(0));
    };
    let value = arguments.get(index).cloned().unwrap_or_default();
    let candidates = &group.candidates;
    let find = |predicate: &dyn Fn(&OverloadCandidate) -> bool| {
        candidates.iter().find(|candidate| predicate(candidate)).map(|candidate| candidate.callable_id)
    };
    let has = |candidate: &OverloadCandidate, predicate: &dyn Fn(&ArgumentTest) -> bool| candidate.test.has(predicate);

    if value.is_undefined() {
        if let Some(id) = find(&|c| c.optionality == Optionality::Optional) {
            return Ok(id);
        }
    }
    if value.is_nullish() {
        if let Some(id) = find(&|c| c.test.accepts_nullish()) {
            return Ok(id);
        }
    }
    if let Some(object) = value.as_object() {
        let stages: [&dyn Fn(&OverloadCandidate) -> bool; 6] = [
            &|c| has(c, &|t| matches!(t, ArgumentTest::Interface(name) if realm.implements(object, name))),
            &|c| has(c, &|t| matches!(t, ArgumentTest::Object)) && realm.is_buffer_source(object, "BufferSource"),
            &|c| has(c, &|t| matches!(t, ArgumentTest::BufferSource(kind) if realm.is_buffer_source(object, kind))),
            &|c| has(c, &|t| matches!(t, ArgumentTest::Callback | ArgumentTest::Object)) && realm.is_callable(&value),
            &|c| has(c, &|t| matches!(t, ArgumentTest::Sequence)) && is_iterable(realm, &value),
            &|c| {
                has(c, &|t| {
                    matches!(
                        t,
                        ArgumentTest::Callback | ArgumentTest::Dictionary | ArgumentTest::Record | ArgumentTest::Object
                    )
                })
            },
        ];
        for stage in stages {
            if let Some(id) = find(stage) {
                return Ok(id);
            }
        }
    }
    let primitive_stage = match &value {
        Value::Boolean(_) => Some(ArgumentTest::Boolean),
        Value::Number(_) => Some(ArgumentTest::Numeric),
        Value::BigInt(_) => Some(ArgumentTest::BigInt),
        _ => None,
    };
    if let Some(expected) = primitive_stage {
        if let Some(id) = find(&|c| has(c, &|t| *t == expected)) {
            return Ok(id);
        }
    }
    for fallback in [
        ArgumentTest::String,
        ArgumentTest::Numeric,
        ArgumentTest::Boolean,
        ArgumentTest::BigInt,
        ArgumentTest::Any,
    ] {
        if let Some(id) = find(&|c| has(c, &|t| *t == fallback)) {
            return Ok(id);
        }
    }
    Err(failure(index))
}

fn is_iterable(realm: &Realm, value: &Value) -> bool {
    matches!(realm.get_iterator_method(value), Ok(Some(_)))
}

fn failure(index: usize) -> TypeError {
    TypeError::new(ErrorType::OverloadResolutionFailed, &[&format!("argument {}", index + 1)])
}
