//! The value graph handed to the encoders.
//!
//! Scalars and strings are plain data. Arrays, objects and opaque values are
//! shared handles: cloning one shares the node, so two parents can point at
//! the same child and a container can (pathologically) contain itself.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::equal::deep_equal;

/// Identity of a shared node, stable for as long as the node is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    fn of<T: ?Sized>(ptr: *const T) -> Self {
        NodeId(ptr.cast::<()>() as usize)
    }
}

/// A reference type that is encoded through its to-string fallback.
pub trait Opaque: Send + Sync {
    /// Name of the underlying type, used in diagnostics and errors.
    fn type_name(&self) -> &str;

    /// Text written in place of the value.
    fn fallback(&self) -> String;

    /// Byte length of [`Opaque::fallback`].
    ///
    /// Override when the length is known without rendering the text.
    fn fallback_len(&self) -> u64 {
        u64::try_from(self.fallback().len()).unwrap_or(u64::MAX)
    }
}

/// [`Opaque`] adapter for anything that implements [`fmt::Display`].
pub struct DisplayOpaque<T> {
    inner: T,
}

impl<T> DisplayOpaque<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn get(&self) -> &T {
        &self.inner
    }
}

impl<T: fmt::Display + Send + Sync> Opaque for DisplayOpaque<T> {
    fn type_name(&self) -> &str {
        std::any::type_name::<T>()
    }

    fn fallback(&self) -> String {
        self.inner.to_string()
    }
}

/// The universal value type accepted by every encoder.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Unsigned integer > i64::MAX (smaller ones may appear here too).
    UInteger(u64),
    Float(f64),
    /// UTF-8 string.
    Str(Arc<str>),
    /// Raw byte sequence.
    Bytes(Arc<[u8]>),
    /// Shared sequence.
    Array(Array),
    /// Shared insertion-ordered mapping.
    Object(Object),
    /// Shared reference type written through its fallback text.
    Opaque(Arc<dyn Opaque>),
}

impl Value {
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn bytes(b: impl Into<Arc<[u8]>>) -> Self {
        Value::Bytes(b.into())
    }

    /// Wraps any displayable value as an opaque reference.
    pub fn opaque<T>(inner: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Value::Opaque(Arc::new(DisplayOpaque::new(inner)))
    }

    /// Identity of the node for arrays, objects and opaque values.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Value::Array(arr) => Some(arr.id()),
            Value::Object(obj) => Some(obj.id()),
            Value::Opaque(o) => Some(NodeId::of(Arc::as_ptr(o))),
            _ => None,
        }
    }

    /// Short name of the value kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) | Value::UInteger(_) => "integer",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Opaque(_) => "opaque",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for Value {
    // Composites print as handles so cyclic graphs stay printable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Integer(i) => write!(f, "Integer({i})"),
            Value::UInteger(u) => write!(f, "UInteger({u})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) if s.len() > 64 => write!(f, "Str(<{} bytes>)", s.len()),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Bytes(b) => write!(f, "Bytes(<{} bytes>)", b.len()),
            Value::Array(arr) => arr.fmt(f),
            Value::Object(obj) => obj.fmt(f),
            Value::Opaque(o) => write!(f, "Opaque({})", o.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to a sequence of values.
#[derive(Clone, Default)]
pub struct Array(Arc<RwLock<Vec<Value>>>);

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Array(Arc::new(RwLock::new(values)))
    }

    pub fn id(&self) -> NodeId {
        NodeId::of(Arc::as_ptr(&self.0))
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn push(&self, value: Value) {
        write(&self.0).push(value);
    }

    pub fn len(&self) -> usize {
        read(&self.0).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        read(&self.0).get(index).cloned()
    }

    /// Copies the element handles out, releasing the lock.
    pub fn snapshot(&self) -> Vec<Value> {
        read(&self.0).clone()
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array({:?}, len={})", self.id(), self.len())
    }
}

/// Shared handle to an insertion-ordered mapping with unique keys.
#[derive(Clone, Default)]
pub struct Object(Arc<RwLock<Vec<(Value, Value)>>>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping from entries, later duplicates replacing earlier ones.
    pub fn from_entries<K: Into<Value>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let obj = Object::new();
        for (k, v) in entries {
            obj.insert(k, v);
        }
        obj
    }

    pub fn id(&self) -> NodeId {
        NodeId::of(Arc::as_ptr(&self.0))
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Inserts an entry; an equal existing key keeps its position and
    /// gets the new value, which is returned as the old one.
    pub fn insert(&self, key: impl Into<Value>, value: Value) -> Option<Value> {
        let key = key.into();
        // Compare outside the lock: a key may itself reach this mapping.
        let existing = self.snapshot().iter().position(|(k, _)| deep_equal(k, &key));
        let mut entries = write(&self.0);
        match existing.and_then(|i| entries.get_mut(i)) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        read(&self.0)
            .iter()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v.clone())
    }

    pub fn len(&self) -> usize {
        read(&self.0).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies the entry handles out, releasing the lock.
    pub fn snapshot(&self) -> Vec<(Value, Value)> {
        read(&self.0).clone()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:?}, len={})", self.id(), self.len())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Integer(i),
            Err(_) => Value::UInteger(u),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Array::from_values(values))
    }
}

impl From<Array> for Value {
    fn from(arr: Array) -> Self {
        Value::Array(arr)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInteger(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(arr) => {
                Value::from(arr.into_iter().map(Value::from).collect::<Vec<_>>())
            }
            serde_json::Value::Object(obj) => Value::Object(Object(Arc::new(RwLock::new(
                obj.into_iter()
                    .map(|(k, v)| (Value::from(k), Value::from(v)))
                    .collect(),
            )))),
        }
    }
}
