//! Typed entry values and declared types
//!
//! [`TypeTag`] is the declared type of an entry. [`Value`] is the typed
//! content of a slot. Conversion from untyped document values is strict:
//! a string is never turned into a number, a float is never truncated to an
//! integer. The only widening performed is integer to float.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::{Map, Number};

/// Declared type of a configuration entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Integer,
    Float,
    String,
    /// Homogeneous sequence
    List(Box<TypeTag>),
    /// String-keyed mapping with homogeneous values
    Map(Box<TypeTag>),
}

/// Typed value held by a configuration slot
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Where and why a value failed to match its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Location below the entry, e.g. `[2]` or `.limits[0]`; empty at the root
    pub path: String,
    pub expected: String,
    pub found: String,
}

impl Mismatch {
    fn new(expected: &TypeTag, found: impl Into<String>) -> Self {
        Self {
            path: String::new(),
            expected: expected.to_string(),
            found: found.into(),
        }
    }

    fn under(mut self, segment: String) -> Self {
        self.path.insert_str(0, &segment);
        self
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "expected {}, found {}", self.expected, self.found)
        } else {
            write!(
                f,
                "expected {} at {}, found {}",
                self.expected, self.path, self.found
            )
        }
    }
}

impl TypeTag {
    pub fn list(element: TypeTag) -> Self {
        Self::List(Box::new(element))
    }

    pub fn map(value: TypeTag) -> Self {
        Self::Map(Box::new(value))
    }

    /// Convert an untyped document value into this type.
    pub fn coerce(&self, raw: &serde_json::Value) -> Result<Value, Mismatch> {
        use serde_json::Value as Raw;

        match (self, raw) {
            (Self::Bool, Raw::Bool(b)) => Ok(Value::Bool(*b)),
            (Self::Integer, Raw::Number(n)) => n
                .as_i64()
                .map(Value::Integer)
                .ok_or_else(|| Mismatch::new(self, format!("number {n}"))),
            (Self::Float, Raw::Number(n)) => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| Mismatch::new(self, format!("number {n}"))),
            (Self::String, Raw::String(s)) => Ok(Value::String(s.clone())),
            (Self::List(element), Raw::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    element
                        .coerce(item)
                        .map_err(|m| m.under(format!("[{i}]")))
                })
                .collect::<Result<_, _>>()
                .map(Value::List),
            (Self::Map(value), Raw::Object(map)) => map
                .iter()
                .map(|(key, item)| {
                    value
                        .coerce(item)
                        .map(|v| (key.clone(), v))
                        .map_err(|m| m.under(format!(".{key}")))
                })
                .collect::<Result<_, _>>()
                .map(Value::Map),
            (_, other) => Err(Mismatch::new(self, raw_kind(other))),
        }
    }

    /// Check a typed value against this type, widening integers to floats.
    ///
    /// Non-finite floats are rejected since no supported format can carry them.
    pub fn conform(&self, value: Value) -> Result<Value, Mismatch> {
        match (self, value) {
            (Self::Bool, v @ Value::Bool(_)) => Ok(v),
            (Self::Integer, v @ Value::Integer(_)) => Ok(v),
            (Self::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
            (Self::Float, Value::Float(f)) if f.is_finite() => Ok(Value::Float(f)),
            (Self::Float, Value::Float(f)) => Err(Mismatch::new(self, format!("non-finite {f}"))),
            (Self::String, v @ Value::String(_)) => Ok(v),
            (Self::List(element), Value::List(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    element
                        .conform(item)
                        .map_err(|m| m.under(format!("[{i}]")))
                })
                .collect::<Result<_, _>>()
                .map(Value::List),
            (Self::Map(value_tag), Value::Map(map)) => map
                .into_iter()
                .map(|(key, item)| {
                    let segment = format!(".{key}");
                    value_tag
                        .conform(item)
                        .map(|v| (key, v))
                        .map_err(|m| m.under(segment))
                })
                .collect::<Result<_, _>>()
                .map(Value::Map),
            (_, other) => Err(Mismatch::new(self, other.kind())),
        }
    }

    /// Best-effort type of an untyped value.
    ///
    /// Empty containers are assumed to hold strings. Returns `None` for
    /// `null` and for containers whose elements do not share a type.
    pub fn infer(raw: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as Raw;

        match raw {
            Raw::Null => None,
            Raw::Bool(_) => Some(Self::Bool),
            Raw::Number(n) if n.is_i64() => Some(Self::Integer),
            Raw::Number(_) => Some(Self::Float),
            Raw::String(_) => Some(Self::String),
            Raw::Array(items) => Self::infer_all(items.iter()).map(Self::list),
            Raw::Object(map) => Self::infer_all(map.values()).map(Self::map),
        }
    }

    fn infer_all<'a>(mut items: impl Iterator<Item = &'a serde_json::Value>) -> Option<Self> {
        let Some(first) = items.next() else {
            return Some(Self::String);
        };
        items.try_fold(Self::infer(first)?, |acc, item| {
            acc.unify(&Self::infer(item)?)
        })
    }

    fn unify(&self, other: &Self) -> Option<Self> {
        match (self, other) {
            (a, b) if a == b => Some(a.clone()),
            (Self::Integer, Self::Float) | (Self::Float, Self::Integer) => Some(Self::Float),
            (Self::List(a), Self::List(b)) => a.unify(b).map(Self::list),
            (Self::Map(a), Self::Map(b)) => a.unify(b).map(Self::map),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::String => f.write_str("string"),
            Self::List(element) => write!(f, "list<{element}>"),
            Self::Map(value) => write!(f, "map<{value}>"),
        }
    }
}

fn raw_kind(raw: &serde_json::Value) -> &'static str {
    use serde_json::Value as Raw;

    match raw {
        Raw::Null => "null",
        Raw::Bool(_) => "bool",
        Raw::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Raw::Number(_) => "float",
        Raw::String(_) => "string",
        Raw::Array(_) => "list",
        Raw::Object(_) => "map",
    }
}

impl Value {
    /// Short name of the value's shape, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Project into the untyped document representation.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Raw;

        match self {
            Self::Bool(b) => Raw::Bool(*b),
            Self::Integer(i) => Raw::Number((*i).into()),
            Self::Float(f) => Number::from_f64(*f).map_or(Raw::Null, Raw::Number),
            Self::String(s) => Raw::String(s.clone()),
            Self::List(items) => Raw::Array(items.iter().map(Value::to_json).collect()),
            Self::Map(map) => Raw::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Conversion out of a typed slot value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|f| f as f32)
    }
}

macro_rules! integer_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Integer(i) => <$ty>::try_from(*i).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer_from_value!(i64, i32, i16, i8, u64, u32, u16, u8, usize);

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k.clone(), v)))
                .collect(),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! integer_into_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Self::Integer(i64::from(i))
                }
            }
        )*
    };
}

integer_into_value!(i64, i32, i16, i8, u32, u16, u8);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}
