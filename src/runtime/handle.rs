//! Typed object handles and the host containers generated code stores converted values in.
//!
//! ## Notes
//! - [`Handle<T>`] is an [`ObjectId`] tagged with the host type it was checked against. The tag carries no
//!   data; any `T` works, including implementation types the runtime never sees.
//! - [`MarkedVector`] holds heap-tracked elements. A collecting engine would root its contents; in this
//!   runtime objects live as long as their realm, so it only marks the distinction in the type.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;

use super::abstract_ops::to_display_string;
use super::errors::{ErrorType, ThrowCompletionOr, TypeError};
use super::realm::Realm;
use super::value::{ObjectId, Value};

/// Tag for handles of IDL `object` and buffer sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object;

/// Tag for handles of `Promise<T>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Promise;

/// Tag for handles of callback functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackType;

/// The `undefined` case of a union that includes `undefined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Empty;

/// A checked reference to an object.
pub struct Handle<T> {
    object: ObjectId,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn new(object: ObjectId) -> Self {
        Handle {
            object,
            marker: PhantomData,
        }
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.object == other.object
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.object.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", std::any::type_name::<T>(), self.object.index())
    }
}

// ============================================================================
// Containers
// ============================================================================

/// A vector of heap-tracked values.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkedVector<T> {
    items: Vec<T>,
}

impl<T> MarkedVector<T> {
    pub fn new() -> Self {
        MarkedVector { items: Vec::new() }
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for MarkedVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for MarkedVector<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> FromIterator<T> for MarkedVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        MarkedVector {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for MarkedVector<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

macro_rules! define_union {
    ($($(#[$doc:meta])* $name:ident { $($variant:ident($param:ident)),+ })+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, PartialEq)]
            pub enum $name<$($param),+> {
                $($variant($param)),+
            }
        )+
    };
}

define_union! {
    /// Host type of a two-member union; `V{i}` holds flattened member `i`.
    Union2 { V0(A), V1(B) }
    Union3 { V0(A), V1(B), V2(C) }
    Union4 { V0(A), V1(B), V2(C), V3(D) }
    Union5 { V0(A), V1(B), V2(C), V3(D), V4(E) }
    Union6 { V0(A), V1(B), V2(C), V3(D), V4(E), V5(F) }
    Union7 { V0(A), V1(B), V2(C), V3(D), V4(E), V5(F), V6(G) }
    Union8 { V0(A), V1(B), V2(C), V3(D), V4(E), V5(F), V6(G), V7(H) }
}

// ============================================================================
// Checked handle construction
// ============================================================================

/// IDL `object`: any object.
pub fn require_object(realm: &Realm, value: &Value) -> ThrowCompletionOr<Handle<Object>> {
    match value.as_object() {
        Some(object) => Ok(Handle::new(object)),
        None => Err(TypeError::new(ErrorType::NotAnObject, &[&to_display_string(realm, value)])),
    }
}

/// A platform object implementing `interface`.
pub fn to_platform_object<T>(realm: &Realm, value: &Value, interface: &str) -> ThrowCompletionOr<Handle<T>> {
    match value.as_object() {
        Some(object) if realm.implements(object, interface) => Ok(Handle::new(object)),
        _ => Err(TypeError::new(
            ErrorType::NotAnObjectOfType,
            &[&to_display_string(realm, value), interface],
        )),
    }
}

/// The implementation object behind `this` for a regular operation or attribute.
pub fn impl_from<T>(realm: &Realm, this_value: &Value, interface: &str) -> ThrowCompletionOr<Handle<T>> {
    to_platform_object(realm, this_value, interface)
}

/// A buffer source of the named kind (`ArrayBuffer`, `Uint8Array`, `BufferSource`, ...).
pub fn to_buffer_source(realm: &Realm, value: &Value, kind: &str) -> ThrowCompletionOr<Handle<Object>> {
    match value.as_object() {
        Some(object) if realm.is_buffer_source(object, kind) => Ok(Handle::new(object)),
        _ => Err(TypeError::new(ErrorType::NotAnObjectOfType, &[&to_display_string(realm, value), kind])),
    }
}

/// `Promise.resolve(value)`: promises pass through, anything else is wrapped in a resolved promise.
pub fn promise_resolve(realm: &mut Realm, value: &Value) -> Handle<Promise> {
    match value.as_object() {
        Some(object) if realm.is_promise(object) => Handle::new(object),
        _ => Handle::new(realm.create_promise(value.clone())),
    }
}

/// A callback function: any callable object.
pub fn to_callback(realm: &Realm, value: &Value, label: &str) -> ThrowCompletionOr<Handle<CallbackType>> {
    match value.as_object() {
        Some(object) if realm.is_callable(value) => Ok(Handle::new(object)),
        _ => {
            tracing::debug!(label, "callback argument is not callable");
            Err(TypeError::new(ErrorType::NotAFunction, &[&to_display_string(realm, value)]))
        }
    }
}
