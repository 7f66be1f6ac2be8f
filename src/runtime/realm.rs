//! The object heap conversions run against.
//!
//! A [`Realm`] owns every object a script can reach. Objects are ordinary property bags tagged with an
//! [`ObjectKind`]: arrays, native functions, platform objects (with the interfaces they implement),
//! `WindowProxy`, buffer sources and settled promises.
//!
//! ## Notes
//! - Properties keep insertion order, which is the order `own_property_keys` reports. Array elements are
//!   inserted in index order, so they come out ascending.
//! - Iteration follows the script protocol: an object is iterable when it is an array or has a callable
//!   [`ITERATOR_KEY`] property returning an object with a callable `next`.
//! - There is no prototype chain; `get` reads own properties only.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use webidl_core::lang::objects::{self, BufferSourceId};

use super::abstract_ops::{to_boolean, to_display_string};
use super::errors::{ErrorType, ThrowCompletionOr, TypeError};
use super::value::{ObjectId, Value};

/// Property key under which an object exposes its `@@iterator` method.
pub const ITERATOR_KEY: &str = "@@iterator";

/// A native function body: `(realm, this, arguments) -> completion`.
pub type NativeFunction = Rc<dyn Fn(&mut Realm, &Value, &[Value]) -> ThrowCompletionOr<Value>>;

/// An own data property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub value: Value,
    pub writable: bool,
    pub enumerable: bool,
}

/// What an object is, beyond its properties.
#[derive(Clone)]
pub enum ObjectKind {
    Ordinary,
    Array,
    Function { name: String, body: NativeFunction },
    /// A platform object and every interface it implements, most-derived first.
    PlatformObject { interfaces: Vec<String> },
    WindowProxy,
    /// A buffer source; `kind` is its concrete type name (`ArrayBuffer`, `Uint8Array`, `DataView`, ...).
    Buffer { kind: String },
    /// A settled promise and its result.
    Promise { result: Value },
}

impl fmt::Debug for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Ordinary => f.write_str("Ordinary"),
            ObjectKind::Array => f.write_str("Array"),
            ObjectKind::Function { name, .. } => f.debug_struct("Function").field("name", name).finish_non_exhaustive(),
            ObjectKind::PlatformObject { interfaces } => {
                f.debug_struct("PlatformObject").field("interfaces", interfaces).finish()
            }
            ObjectKind::WindowProxy => f.write_str("WindowProxy"),
            ObjectKind::Buffer { kind } => f.debug_struct("Buffer").field("kind", kind).finish(),
            ObjectKind::Promise { result } => f.debug_struct("Promise").field("result", result).finish(),
        }
    }
}

#[derive(Debug, Clone)]
struct ObjectData {
    kind: ObjectKind,
    properties: IndexMap<String, PropertyDescriptor>,
}

/// How an iterable is iterated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IteratorMethod {
    /// Built-in array iteration.
    ArrayValues,
    /// A user-supplied `@@iterator` function.
    Function(ObjectId),
}

/// An iterator in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum IteratorRecord {
    Array { array: ObjectId, next_index: usize },
    Object { iterator: ObjectId, next: ObjectId, done: bool },
}

/// An arena of objects.
#[derive(Debug, Clone, Default)]
pub struct Realm {
    objects: Vec<ObjectData>,
}

impl Realm {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Allocation
    // ========================================================================

    fn allocate(&mut self, kind: ObjectKind) -> ObjectId {
        self.objects.push(ObjectData {
            kind,
            properties: IndexMap::new(),
        });
        ObjectId(self.objects.len() - 1)
    }

    pub fn create_object(&mut self) -> ObjectId {
        self.allocate(ObjectKind::Ordinary)
    }

    /// A dense array holding `elements`.
    pub fn create_array(&mut self, elements: Vec<Value>) -> ObjectId {
        let array = self.allocate(ObjectKind::Array);
        let length = elements.len();
        for (index, element) in elements.into_iter().enumerate() {
            self.create_data_property(array, &index.to_string(), element);
        }
        self.define_property(array, "length", Value::Number(length as f64), true);
        if let Some(descriptor) = self.descriptor_mut(array, "length") {
            descriptor.enumerable = false;
        }
        array
    }

    pub fn create_function<F>(&mut self, name: &str, body: F) -> ObjectId
    where
        F: Fn(&mut Realm, &Value, &[Value]) -> ThrowCompletionOr<Value> + 'static,
    {
        self.allocate(ObjectKind::Function {
            name: name.to_string(),
            body: Rc::new(body),
        })
    }

    /// A platform object implementing `interfaces` (list the whole inheritance chain).
    pub fn create_platform_object(&mut self, interfaces: &[&str]) -> ObjectId {
        self.allocate(ObjectKind::PlatformObject {
            interfaces: interfaces.iter().map(|name| name.to_string()).collect(),
        })
    }

    pub fn create_window_proxy(&mut self) -> ObjectId {
        self.allocate(ObjectKind::WindowProxy)
    }

    pub fn create_buffer(&mut self, kind: &str) -> ObjectId {
        self.allocate(ObjectKind::Buffer { kind: kind.to_string() })
    }

    pub fn create_promise(&mut self, result: Value) -> ObjectId {
        self.allocate(ObjectKind::Promise { result })
    }

    /// An object whose `@@iterator` yields `items`, for exercising the generic iteration path.
    pub fn create_iterable(&mut self, items: Vec<Value>) -> ObjectId {
        let items = Rc::new(items);
        let iterable = self.create_object();
        let method = self.create_function("[Symbol.iterator]", move |realm, _, _| {
            let items = Rc::clone(&items);
            let position = Rc::new(std::cell::Cell::new(0usize));
            let iterator = realm.create_object();
            let next = realm.create_function("next", move |realm, _, _| {
                let index = position.get();
                position.set(index + 1);
                let result = realm.create_object();
                match items.get(index) {
                    Some(item) => {
                        realm.create_data_property(result, "value", item.clone());
                        realm.create_data_property(result, "done", Value::Boolean(false));
                    }
                    None => realm.create_data_property(result, "done", Value::Boolean(true)),
                }
                Ok(Value::Object(result))
            });
            realm.create_data_property(iterator, "next", Value::Object(next));
            Ok(Value::Object(iterator))
        });
        self.create_data_property(iterable, ITERATOR_KEY, Value::Object(method));
        iterable
    }

    // ========================================================================
    // Properties
    // ========================================================================

    fn object(&self, id: ObjectId) -> Option<&ObjectData> {
        self.objects.get(id.0)
    }

    fn descriptor_mut(&mut self, id: ObjectId, key: &str) -> Option<&mut PropertyDescriptor> {
        self.objects.get_mut(id.0)?.properties.get_mut(key)
    }

    pub fn kind(&self, id: ObjectId) -> Option<&ObjectKind> {
        self.object(id).map(|data| &data.kind)
    }

    /// `[[Get]]` of an own property; missing properties read as `undefined`.
    pub fn get(&self, id: ObjectId, key: &str) -> ThrowCompletionOr<Value> {
        Ok(self
            .get_own_property(id, key)
            .map(|descriptor| descriptor.value.clone())
            .unwrap_or_default())
    }

    pub fn get_own_property(&self, id: ObjectId, key: &str) -> Option<&PropertyDescriptor> {
        self.object(id)?.properties.get(key)
    }

    /// Own property keys in property order.
    pub fn own_property_keys(&self, id: ObjectId) -> Vec<String> {
        self.object(id)
            .map(|data| data.properties.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// `CreateDataProperty`: a writable, enumerable own property.
    pub fn create_data_property(&mut self, id: ObjectId, key: &str, value: Value) {
        if let Some(data) = self.objects.get_mut(id.0) {
            data.properties.insert(
                key.to_string(),
                PropertyDescriptor {
                    value,
                    writable: true,
                    enumerable: true,
                },
            );
        }
    }

    /// Define an enumerable own property with the given writability (constants are not writable).
    pub fn define_property(&mut self, id: ObjectId, key: &str, value: Value, writable: bool) {
        if let Some(data) = self.objects.get_mut(id.0) {
            data.properties.insert(
                key.to_string(),
                PropertyDescriptor {
                    value,
                    writable,
                    enumerable: true,
                },
            );
        }
    }

    // ========================================================================
    // Brand checks
    // ========================================================================

    pub fn is_callable(&self, value: &Value) -> bool {
        value
            .as_object()
            .and_then(|id| self.kind(id))
            .is_some_and(|kind| matches!(kind, ObjectKind::Function { .. }))
    }

    pub fn is_array(&self, id: ObjectId) -> bool {
        matches!(self.kind(id), Some(ObjectKind::Array))
    }

    pub fn is_platform_object(&self, id: ObjectId) -> bool {
        matches!(self.kind(id), Some(ObjectKind::PlatformObject { .. }))
    }

    /// Whether `id` is a platform object implementing `interface`. A `WindowProxy` implements only itself.
    pub fn implements(&self, id: ObjectId, interface: &str) -> bool {
        match self.kind(id) {
            Some(ObjectKind::PlatformObject { interfaces }) => interfaces.iter().any(|name| name == interface),
            Some(ObjectKind::WindowProxy) => interface == objects::WINDOW_PROXY,
            _ => false,
        }
    }

    pub fn is_window_proxy(&self, id: ObjectId) -> bool {
        matches!(self.kind(id), Some(ObjectKind::WindowProxy))
    }

    /// Whether `id` is a buffer source acceptable as `expected`.
    ///
    /// `BufferSource` accepts every buffer; `ArrayBufferView` accepts data views and typed arrays; any other
    /// name must match the buffer's concrete kind.
    pub fn is_buffer_source(&self, id: ObjectId, expected: &str) -> bool {
        let Some(ObjectKind::Buffer { kind }) = self.kind(id) else {
            return false;
        };
        match objects::buffer_source_from_str(expected) {
            Some(BufferSourceId::BufferSource) => true,
            Some(BufferSourceId::ArrayBufferView) => {
                objects::buffer_source_from_str(kind) != Some(BufferSourceId::ArrayBuffer)
            }
            _ => kind == expected,
        }
    }

    pub fn is_promise(&self, id: ObjectId) -> bool {
        matches!(self.kind(id), Some(ObjectKind::Promise { .. }))
    }

    // ========================================================================
    // Calls and iteration
    // ========================================================================

    /// `Call(function, this, arguments)`.
    pub fn call(&mut self, function: &Value, this_value: &Value, arguments: &[Value]) -> ThrowCompletionOr<Value> {
        let body = match function.as_object().and_then(|id| self.kind(id)) {
            Some(ObjectKind::Function { body, .. }) => Rc::clone(body),
            _ => {
                return Err(TypeError::new(
                    ErrorType::NotAFunction,
                    &[&to_display_string(self, function)],
                ));
            }
        };
        body(self, this_value, arguments)
    }

    /// `GetMethod(value, @@iterator)`: `None` when the value is not iterable.
    pub fn get_iterator_method(&self, value: &Value) -> ThrowCompletionOr<Option<IteratorMethod>> {
        let Some(id) = value.as_object() else {
            return Ok(None);
        };
        if self.is_array(id) {
            return Ok(Some(IteratorMethod::ArrayValues));
        }
        let method = self.get(id, ITERATOR_KEY)?;
        if method.is_nullish() {
            return Ok(None);
        }
        match method.as_object() {
            Some(function) if self.is_callable(&method) => Ok(Some(IteratorMethod::Function(function))),
            _ => Err(TypeError::new(ErrorType::NotAFunction, &[&to_display_string(self, &method)])),
        }
    }

    /// `GetIteratorFromMethod`.
    pub fn get_iterator(&mut self, value: &Value, method: IteratorMethod) -> ThrowCompletionOr<IteratorRecord> {
        match method {
            IteratorMethod::ArrayValues => match value.as_object() {
                Some(array) => Ok(IteratorRecord::Array { array, next_index: 0 }),
                None => Err(TypeError::new(ErrorType::NotIterable, &[&to_display_string(self, value)])),
            },
            IteratorMethod::Function(function) => {
                let iterator = self.call(&Value::Object(function), value, &[])?;
                let Some(iterator) = iterator.as_object() else {
                    return Err(TypeError::new(ErrorType::NotAnObject, &[&to_display_string(self, &iterator)]));
                };
                let next = self.get(iterator, "next")?;
                match next.as_object() {
                    Some(next) if self.is_callable(&Value::Object(next)) => Ok(IteratorRecord::Object {
                        iterator,
                        next,
                        done: false,
                    }),
                    _ => Err(TypeError::new(ErrorType::NotAFunction, &[&to_display_string(self, &next)])),
                }
            }
        }
    }

    /// `IteratorStepValue`: the next value, or `None` once the iterator is done.
    pub fn iterator_step(&mut self, record: &mut IteratorRecord) -> ThrowCompletionOr<Option<Value>> {
        match record {
            IteratorRecord::Array { array, next_index } => {
                let length = match self.get(*array, "length")? {
                    Value::Number(length) => length as usize,
                    _ => 0,
                };
                if *next_index >= length {
                    return Ok(None);
                }
                let value = self.get(*array, &next_index.to_string())?;
                *next_index += 1;
                Ok(Some(value))
            }
            IteratorRecord::Object { iterator, next, done } => {
                if *done {
                    return Ok(None);
                }
                let result = self.call(&Value::Object(*next), &Value::Object(*iterator), &[])?;
                let Some(result) = result.as_object() else {
                    return Err(TypeError::new(ErrorType::NotAnObject, &[&to_display_string(self, &result)]));
                };
                if to_boolean(&self.get(result, "done")?) {
                    *done = true;
                    return Ok(None);
                }
                Ok(Some(self.get(result, "value")?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(realm: &mut Realm, value: &Value) -> ThrowCompletionOr<Vec<Value>> {
        let method = realm.get_iterator_method(value)?.expect("iterable");
        let mut iterator = realm.get_iterator(value, method)?;
        let mut items = Vec::new();
        while let Some(item) = realm.iterator_step(&mut iterator)? {
            items.push(item);
        }
        Ok(items)
    }

    #[test]
    fn arrays_iterate_in_index_order() {
        let mut realm = Realm::new();
        let array = realm.create_array(vec![Value::Number(1.0), Value::from("two")]);
        assert_eq!(
            collect(&mut realm, &Value::Object(array)).unwrap(),
            [Value::Number(1.0), Value::from("two")]
        );
        assert_eq!(realm.own_property_keys(array), ["0", "1", "length"]);
        assert!(!realm.get_own_property(array, "length").unwrap().enumerable);
    }

    #[test]
    fn custom_iterables_use_the_protocol() {
        let mut realm = Realm::new();
        let iterable = realm.create_iterable(vec![Value::Boolean(true), Value::Null]);
        assert_eq!(
            collect(&mut realm, &Value::Object(iterable)).unwrap(),
            [Value::Boolean(true), Value::Null]
        );
    }

    #[test]
    fn plain_objects_are_not_iterable() {
        let mut realm = Realm::new();
        let object = realm.create_object();
        assert_eq!(realm.get_iterator_method(&Value::Object(object)).unwrap(), None);
        realm.create_data_property(object, ITERATOR_KEY, Value::Number(1.0));
        let err = realm.get_iterator_method(&Value::Object(object)).unwrap_err();
        assert_eq!(err.kind(), ErrorType::NotAFunction);
    }

    #[test]
    fn buffer_source_checks() {
        let mut realm = Realm::new();
        let buffer = realm.create_buffer("ArrayBuffer");
        let bytes = realm.create_buffer("Uint8Array");
        assert!(realm.is_buffer_source(buffer, "BufferSource"));
        assert!(!realm.is_buffer_source(buffer, "ArrayBufferView"));
        assert!(realm.is_buffer_source(bytes, "ArrayBufferView"));
        assert!(realm.is_buffer_source(bytes, "Uint8Array"));
        assert!(!realm.is_buffer_source(bytes, "Int8Array"));
    }

    #[test]
    fn calls_reach_native_bodies() {
        let mut realm = Realm::new();
        let double = realm.create_function("double", |_, _, arguments| match arguments.first() {
            Some(Value::Number(n)) => Ok(Value::Number(n * 2.0)),
            _ => Ok(Value::Undefined),
        });
        let result = realm
            .call(&Value::Object(double), &Value::Undefined, &[Value::Number(21.0)])
            .unwrap();
        assert_eq!(result, Value::Number(42.0));
        assert!(realm.call(&Value::Null, &Value::Undefined, &[]).is_err());
    }
}
