//! Argument serializer: turns console arguments into plain JSON data.
//!
//! Total by construction: anything the copier cannot represent becomes a
//! placeholder string, and an internal failure replaces the whole call with
//! [`FALLBACK_MESSAGE`].

use serde_json::{json, Map, Number, Value as Json};
use std::fmt;

use crate::value::{ErrorObject, Function, Identity, Value};

pub const FALLBACK_MESSAGE: &str = "Could not serialize arguments";
pub const CIRCULAR_MARKER: &str = "[Circular]";
pub const DEFAULT_MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SerializeError {
    TooDeep,
    Borrowed,
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializeError::TooDeep => write!(f, "argument nesting exceeds depth limit"),
            SerializeError::Borrowed => write!(f, "argument is being mutated"),
        }
    }
}

/// Serialize with the default depth limit.
pub fn serialize_args(args: &[Value]) -> Vec<Json> {
    Serializer::default().serialize(args)
}

#[derive(Debug, Clone, Copy)]
pub struct Serializer {
    max_depth: usize,
}

impl Default for Serializer {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Serializer {
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn serialize(&self, args: &[Value]) -> Vec<Json> {
        match self.try_serialize(args) {
            Ok(values) => values,
            Err(err) => {
                tracing::debug!(error = %err, "falling back to placeholder arguments");
                vec![Json::String(FALLBACK_MESSAGE.to_string())]
            }
        }
    }

    fn try_serialize(&self, args: &[Value]) -> Result<Vec<Json>, SerializeError> {
        let mut ancestors = Vec::new();
        args.iter()
            .map(|arg| {
                self.copy(arg, &mut ancestors)
                    .map(|copied| copied.unwrap_or(Json::Null))
            })
            .collect()
    }

    /// `Ok(None)` means "no representation": dropped from objects, `null` elsewhere.
    fn copy(&self, value: &Value, ancestors: &mut Vec<Identity>) -> Result<Option<Json>, SerializeError> {
        let copied = match value {
            Value::Undefined => return Ok(None),
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Function(function) => Json::String(function_placeholder(function)),
            Value::Error(error) => error_record(error),
            Value::Opaque(description) => Json::String(format!("[Unserializable: {}]", description)),
            Value::Array(array) => {
                let identity = array.identity();
                if ancestors.contains(&identity) {
                    return Ok(Some(Json::String(CIRCULAR_MARKER.to_string())));
                }
                self.enter(ancestors, identity)?;
                let items = array.cell().try_borrow().map_err(|_| SerializeError::Borrowed)?;
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    out.push(self.copy(item, ancestors)?.unwrap_or(Json::Null));
                }
                ancestors.pop();
                Json::Array(out)
            }
            Value::Object(object) => {
                let identity = object.identity();
                if ancestors.contains(&identity) {
                    return Ok(Some(Json::String(CIRCULAR_MARKER.to_string())));
                }
                self.enter(ancestors, identity)?;
                let members = object.cell().try_borrow().map_err(|_| SerializeError::Borrowed)?;
                let mut out = Map::new();
                for (key, member) in members.iter() {
                    if let Some(copied) = self.copy(member, ancestors)? {
                        out.insert(key.clone(), copied);
                    }
                }
                ancestors.pop();
                Json::Object(out)
            }
        };
        Ok(Some(copied))
    }

    fn enter(&self, ancestors: &mut Vec<Identity>, identity: Identity) -> Result<(), SerializeError> {
        if ancestors.len() >= self.max_depth {
            return Err(SerializeError::TooDeep);
        }
        ancestors.push(identity);
        Ok(())
    }
}

fn number(n: f64) -> Json {
    if !n.is_finite() {
        return Json::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Json::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map_or(Json::Null, Json::Number)
}

fn function_placeholder(function: &Function) -> String {
    match function.name.as_deref() {
        Some(name) if !name.is_empty() => format!("[Function: {}]", name),
        _ => "[Function: anonymous]".to_string(),
    }
}

fn error_record(error: &ErrorObject) -> Json {
    json!({
        "message": error.message,
        "stack": error.stack,
        "name": error.name,
        "isError": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ArrayRef, ObjectRef};

    #[test]
    fn test_primitives_pass_through() {
        let out = serialize_args(&[
            Value::from("hello"),
            Value::from(42),
            Value::from(1.5),
            Value::from(true),
            Value::Null,
        ]);
        assert_eq!(out, vec![json!("hello"), json!(42), json!(1.5), json!(true), Json::Null]);
    }

    #[test]
    fn test_non_finite_numbers_become_null() {
        let out = serialize_args(&[Value::from(f64::NAN), Value::from(f64::INFINITY)]);
        assert_eq!(out, vec![Json::Null, Json::Null]);
    }

    #[test]
    fn test_error_arguments_are_tagged() {
        let out = serialize_args(&[Value::error_with_stack(
            "TypeError",
            "x is not a function",
            "TypeError: x is not a function\n    at main.js:3:5",
        )]);
        assert_eq!(
            out,
            vec![json!({
                "message": "x is not a function",
                "stack": "TypeError: x is not a function\n    at main.js:3:5",
                "name": "TypeError",
                "isError": true,
            })]
        );
    }

    #[test]
    fn test_functions_become_placeholders_at_any_depth() {
        let out = serialize_args(&[
            Value::function("onClick"),
            Value::object([("handler", Value::anonymous_function())]),
        ]);
        assert_eq!(
            out,
            vec![json!("[Function: onClick]"), json!({ "handler": "[Function: anonymous]" })]
        );
    }

    #[test]
    fn test_direct_cycle_is_marked_without_losing_other_args() {
        let node = ObjectRef::new();
        node.set("name", Value::from("root"));
        node.set("self", Value::Object(node.clone()));

        let out = serialize_args(&[Value::from("before"), Value::Object(node), Value::from(3)]);
        assert_eq!(
            out,
            vec![
                json!("before"),
                json!({ "name": "root", "self": CIRCULAR_MARKER }),
                json!(3),
            ]
        );
    }

    #[test]
    fn test_indirect_cycle_through_array() {
        let parent = ObjectRef::new();
        let children = ArrayRef::new(vec![]);
        let child = ObjectRef::new();
        child.set("parent", Value::Object(parent.clone()));
        children.push(Value::Object(child));
        parent.set("children", Value::Array(children));

        let out = serialize_args(&[Value::Object(parent)]);
        assert_eq!(out, vec![json!({ "children": [{ "parent": CIRCULAR_MARKER }] })]);
    }

    #[test]
    fn test_shared_reference_is_not_circular() {
        let shared = Value::object([("k", Value::from(1))]);
        let out = serialize_args(&[Value::array([shared.clone(), shared])]);
        assert_eq!(out, vec![json!([{ "k": 1 }, { "k": 1 }])]);
    }

    #[test]
    fn test_undefined_handling() {
        let out = serialize_args(&[
            Value::Undefined,
            Value::array([Value::Undefined]),
            Value::object([("gone", Value::Undefined), ("kept", Value::Null)]),
        ]);
        assert_eq!(out, vec![Json::Null, json!([null]), json!({ "kept": null })]);
    }

    #[test]
    fn test_opaque_handles_get_placeholder() {
        let out = serialize_args(&[Value::opaque("Symbol(token)")]);
        assert_eq!(out, vec![json!("[Unserializable: Symbol(token)]")]);
    }

    #[test]
    fn test_excessive_depth_falls_back() {
        let mut value = Value::from("leaf");
        for _ in 0..4 {
            value = Value::array([value]);
        }
        let out = Serializer::with_max_depth(3).serialize(&[Value::from("ok"), value]);
        assert_eq!(out, vec![json!(FALLBACK_MESSAGE)]);
    }

    #[test]
    fn test_mutably_borrowed_argument_falls_back() {
        let array = ArrayRef::new(vec![Value::from(1)]);
        let _guard = array.cell().borrow_mut();
        let out = serialize_args(&[Value::Array(array.clone())]);
        assert_eq!(out, vec![json!(FALLBACK_MESSAGE)]);
    }

    #[test]
    fn test_object_member_order_is_preserved() {
        let out = serialize_args(&[Value::object([
            ("zeta", Value::from(1)),
            ("alpha", Value::from(2)),
        ])]);
        let keys: Vec<&String> = out[0].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
