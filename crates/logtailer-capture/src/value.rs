//! Dynamic argument model for console calls made inside a page.
//!
//! Arrays and objects are shared, mutable references with identity, the same
//! way page objects are, so argument graphs may contain cycles.

use std::cell::RefCell;
use std::rc::Rc;

/// A value passed to a console entry point
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Function(Function),
    Error(ErrorObject),
    Array(ArrayRef),
    Object(ObjectRef),
    /// Handle with no data representation (symbols, DOM nodes, sockets...)
    Opaque(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorObject {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
}

/// Shared array reference
#[derive(Debug, Clone, Default)]
pub struct ArrayRef(Rc<RefCell<Vec<Value>>>);

/// Shared object reference; members keep insertion order
#[derive(Debug, Clone, Default)]
pub struct ObjectRef(Rc<RefCell<Vec<(String, Value)>>>);

/// Address used to detect a reference revisiting one of its ancestors
pub(crate) type Identity = *const ();

impl ArrayRef {
    pub fn new(items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub(crate) fn identity(&self) -> Identity {
        Rc::as_ptr(&self.0) as Identity
    }

    pub(crate) fn cell(&self) -> &RefCell<Vec<Value>> {
        &self.0
    }
}

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a member, replacing an existing one with the same key in place.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        let key = key.into();
        let mut members = self.0.borrow_mut();
        match members.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => members.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.clone())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub(crate) fn identity(&self) -> Identity {
        Rc::as_ptr(&self.0) as Identity
    }

    pub(crate) fn cell(&self) -> &RefCell<Vec<(String, Value)>> {
        &self.0
    }
}

impl Value {
    pub fn function(name: impl Into<String>) -> Self {
        Value::Function(Function {
            name: Some(name.into()),
        })
    }

    pub fn anonymous_function() -> Self {
        Value::Function(Function { name: None })
    }

    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Value::Error(ErrorObject {
            name: name.into(),
            message: message.into(),
            stack: None,
        })
    }

    pub fn error_with_stack(
        name: impl Into<String>,
        message: impl Into<String>,
        stack: impl Into<String>,
    ) -> Self {
        Value::Error(ErrorObject {
            name: name.into(),
            message: message.into(),
            stack: Some(stack.into()),
        })
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(ArrayRef::new(items.into_iter().collect()))
    }

    pub fn object<K: Into<String>>(members: impl IntoIterator<Item = (K, Value)>) -> Self {
        let object = ObjectRef::new();
        for (key, value) in members {
            object.set(key, value);
        }
        Value::Object(object)
    }

    pub fn opaque(description: impl Into<String>) -> Self {
        Value::Opaque(description.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

impl From<ArrayRef> for Value {
    fn from(array: ArrayRef) -> Self {
        Value::Array(array)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::array(items.into_iter().map(Value::from)),
            serde_json::Value::Object(members) => {
                Value::object(members.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_set_replaces_in_place() {
        let object = ObjectRef::new();
        object.set("a", Value::from(1));
        object.set("b", Value::from(2));
        object.set("a", Value::from("again"));

        assert_eq!(object.len(), 2);
        assert!(matches!(object.get("a"), Some(Value::String(s)) if s == "again"));
    }

    #[test]
    fn test_clones_share_identity() {
        let object = ObjectRef::new();
        let alias = object.clone();
        alias.set("seen", Value::from(true));

        assert_eq!(object.identity(), alias.identity());
        assert_eq!(object.len(), 1);
        assert_ne!(object.identity(), ObjectRef::new().identity());
    }
}
