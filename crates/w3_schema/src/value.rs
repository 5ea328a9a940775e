//! Decoded values and the documents that hold them.

use derive_more::derive::{Deref, DerefMut, IntoIterator};
use indexmap::IndexMap;
use std::fmt;

/// A single decoded value
///
/// Floats compare by their bit pattern so that documents holding NaN payloads still
/// compare equal after a round trip.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f32),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
    /// A four character identifier such as `hfoo`
    Id([u8; 4]),
    /// An enumerated value; `name` is `None` when `raw` is outside the known set
    Enum {
        name: Option<String>,
        raw: Box<Value>,
    },
    /// A flag set; `bits` is authoritative, `names` lists the recognized flags
    Flags {
        bits: u64,
        names: Vec<String>,
    },
    Struct(Document),
    Array(Vec<Value>),
}

impl Value {
    /// Short name of the variant, used in error messages
    pub const fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "an integer",
            Value::Float(_) => "a float",
            Value::Bool(_) => "a boolean",
            Value::Str(_) => "a string",
            Value::Bytes(_) => "bytes",
            Value::Id(_) => "an identifier",
            Value::Enum { .. } => "an enum",
            Value::Flags { .. } => "flags",
            Value::Struct(_) => "a struct",
            Value::Array(_) => "an array",
        }
    }

    /// Integer view of the value, looking through enums, flags and booleans
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Enum { raw, .. } => raw.as_int(),
            Value::Flags { bits, .. } => i64::try_from(*bits).ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Enum { raw, .. } => raw.as_str(),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<[u8; 4]> {
        match self {
            Value::Id(id) => Some(*id),
            Value::Bytes(b) => b.as_slice().try_into().ok(),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Document> {
        match self {
            Value::Struct(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The symbolic name of an enum value, if it was recognized
    pub fn enum_name(&self) -> Option<&str> {
        match self {
            Value::Enum { name, .. } => name.as_deref(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Id(a), Value::Id(b)) => a == b,
            (Value::Enum { name: n1, raw: r1 }, Value::Enum { name: n2, raw: r2 }) => {
                n1 == n2 && r1 == r2
            }
            (Value::Flags { bits: a, .. }, Value::Flags { bits: b, .. }) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "{b:02X?}"),
            Value::Id(id) => write!(f, "'{}'", String::from_utf8_lossy(id)),
            Value::Enum {
                name: Some(name), ..
            } => f.write_str(name),
            Value::Enum { name: None, raw } => write!(f, "unrecognized({raw})"),
            Value::Flags { bits, .. } => write!(f, "{bits:#x}"),
            Value::Struct(doc) => write!(f, "{{{} fields}}", doc.len()),
            Value::Array(items) => write!(f, "[{} items]", items.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<[u8; 4]> for Value {
    fn from(value: [u8; 4]) -> Self {
        Value::Id(value)
    }
}

impl From<&[u8; 4]> for Value {
    fn from(value: &[u8; 4]) -> Self {
        Value::Id(*value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Value::Struct(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

/// An ordered mapping of field names to decoded values
///
/// Field order always mirrors the schema that produced the document.
#[derive(Debug, Clone, Default, PartialEq, Deref, DerefMut, IntoIterator)]
#[into_iterator(owned, ref)]
pub struct Document(IndexMap<String, Value>);

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the previous value if the name was already present
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Builder style [`Document::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Follow a dotted path (`header.width`) through nested structs
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_struct()?.0.get(segment)?;
        }
        Some(current)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
