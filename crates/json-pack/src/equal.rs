use std::collections::HashSet;
use std::sync::Arc;

use crate::value::{NodeId, Value};

/// Performs a deep structural equality check between two values.
///
/// Compares values recursively:
/// - Primitives compare by value; `Integer` and `UInteger` are equal when they
///   denote the same number.
/// - Arrays compare element by element.
/// - Objects compare entry by entry, in order: key order is part of the value.
/// - Opaque values compare by identity, or else by fallback text.
///
/// Two handles to the same node are equal without looking inside, and a pair
/// of composites already under comparison is assumed equal, so cyclic graphs
/// terminate.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sizeguard_json_pack::{deep_equal, Value};
///
/// let a = Value::from(json!({"foo": [1, 2, 3]}));
/// let b = Value::from(json!({"foo": [1, 2, 3]}));
/// let c = Value::from(json!({"foo": [1, 2, 4]}));
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    let mut assumed = HashSet::new();
    equal(a, b, &mut assumed)
}

fn equal(a: &Value, b: &Value, assumed: &mut HashSet<(NodeId, NodeId)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::UInteger(a), Value::UInteger(b)) => a == b,
        (Value::Integer(i), Value::UInteger(u)) | (Value::UInteger(u), Value::Integer(i)) => {
            u64::try_from(*i).is_ok_and(|i| i == *u)
        }
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bytes(a), Value::Bytes(b)) => a == b,
        (Value::Opaque(a), Value::Opaque(b)) => {
            Arc::ptr_eq(a, b) || a.fallback() == b.fallback()
        }

        // Arrays
        (Value::Array(arr_a), Value::Array(arr_b)) => {
            if arr_a.ptr_eq(arr_b) || !assumed.insert((arr_a.id(), arr_b.id())) {
                return true;
            }
            let items_a = arr_a.snapshot();
            let items_b = arr_b.snapshot();
            items_a.len() == items_b.len()
                && items_a
                    .iter()
                    .zip(&items_b)
                    .all(|(x, y)| equal(x, y, assumed))
        }

        // Objects
        (Value::Object(obj_a), Value::Object(obj_b)) => {
            if obj_a.ptr_eq(obj_b) || !assumed.insert((obj_a.id(), obj_b.id())) {
                return true;
            }
            let entries_a = obj_a.snapshot();
            let entries_b = obj_b.snapshot();
            entries_a.len() == entries_b.len()
                && entries_a
                    .iter()
                    .zip(&entries_b)
                    .all(|((ka, va), (kb, vb))| equal(ka, kb, assumed) && equal(va, vb, assumed))
        }

        // Different types are never equal
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Array, Object};
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert!(deep_equal(&Value::Null, &Value::Null));
        assert!(deep_equal(&Value::Bool(true), &Value::Bool(true)));
        assert!(!deep_equal(&Value::Bool(true), &Value::Bool(false)));
        assert!(deep_equal(&Value::from("a"), &Value::from("a")));
        assert!(!deep_equal(&Value::from("a"), &Value::Null));
    }

    #[test]
    fn test_integer_kinds_compare_by_number() {
        assert!(deep_equal(&Value::Integer(5), &Value::UInteger(5)));
        assert!(!deep_equal(&Value::Integer(-1), &Value::UInteger(u64::MAX)));
        assert!(!deep_equal(&Value::Integer(1), &Value::Float(1.0)));
    }

    #[test]
    fn test_object_key_order_matters() {
        let a = Value::from(json!({"a": 1, "b": 2}));
        let b = Value::from(json!({"b": 2, "a": 1}));
        assert!(!deep_equal(&a, &b));
    }

    #[test]
    fn test_nested_structures() {
        let a = Value::from(json!({"blocks": [], "tags": ["a", "b"], "disabled": false}));
        let b = Value::from(json!({"blocks": [], "tags": ["a", "b"], "disabled": false}));
        let c = Value::from(json!({"blocks": [], "tags": ["a", "c"], "disabled": false}));
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }

    #[test]
    fn test_cyclic_graphs_terminate() {
        let a = Array::new();
        a.push(Value::Integer(1));
        a.push(Value::Array(a.clone()));
        let b = Array::new();
        b.push(Value::Integer(1));
        b.push(Value::Array(b.clone()));
        assert!(deep_equal(&Value::Array(a.clone()), &Value::Array(b)));

        let c = Array::new();
        c.push(Value::Integer(2));
        c.push(Value::Array(c.clone()));
        assert!(!deep_equal(&Value::Array(a), &Value::Array(c)));
    }

    #[test]
    fn test_same_handle_is_equal() {
        let obj = Object::new();
        obj.insert("self", Value::Object(obj.clone()));
        assert!(deep_equal(&Value::Object(obj.clone()), &Value::Object(obj)));
    }
}
