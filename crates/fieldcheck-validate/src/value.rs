//! Dynamic values threaded through rule functions.
//!
//! Every input reaching a rule (a trimmed form value, an uploaded file, or a
//! member of a flattened record) is represented as a [`Value`]. Rules pattern
//! match on the variant instead of inspecting types at runtime.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent or `null`.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Seq(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// A boxed nullable scalar, see [`Nullable`].
    Nullable { value: Box<Value>, is_set: bool },
    /// An uploaded file.
    File(FileHandle),
}

impl Value {
    /// Short name of the variant, used in log output.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) | Value::UInt(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "map",
            Value::Nullable { .. } => "nullable",
            Value::File(_) => "file",
        }
    }

    /// Whether the value is the zero value of its type.
    ///
    /// Null, `false`, numeric zero, empty strings and empty collections are
    /// empty. A nullable scalar is empty only when it was never set and holds
    /// the zero value, so an explicit `0` counts as present. Files are never
    /// empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::UInt(u) => *u == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Seq(items) => items.is_empty(),
            Value::Map(entries) => entries.is_empty(),
            Value::Nullable { value, is_set } => !is_set && value.is_empty(),
            Value::File(_) => false,
        }
    }

    /// Unwraps nullable scalars to the value they carry.
    pub fn inner(&self) -> &Value {
        match self {
            Value::Nullable { value, .. } => value.inner(),
            other => other,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.inner() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.inner() {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.inner() {
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.inner() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileHandle> {
        match self {
            Value::File(file) => Some(file),
            _ => None,
        }
    }

    /// Number of items for strings (in characters) and collections.
    pub fn length(&self) -> Option<usize> {
        match self.inner() {
            Value::String(s) => Some(s.chars().count()),
            Value::Seq(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Textual form used by format rules.
    ///
    /// Strings are returned as-is, numbers in their shortest decimal form,
    /// null as the empty string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self.inner() {
            Value::Null => Cow::Borrowed(""),
            Value::String(s) => Cow::Borrowed(s.as_str()),
            Value::Bool(b) => Cow::Owned(b.to_string()),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::UInt(u) => Cow::Owned(u.to_string()),
            Value::Float(f) => Cow::Owned(f.to_string()),
            Value::File(file) => Cow::Borrowed(file.filename()),
            other => Cow::Owned(serde_json::Value::from(other).to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

macro_rules! impl_from_number {
    ($variant:ident as $target:ty: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from_number!(Int as i64: i8, i16, i32, i64, isize);
impl_from_number!(UInt as u64: u8, u16, u32, u64, usize);
impl_from_number!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::String(v.to_string())
    }
}

impl From<FileHandle> for Value {
    fn from(v: FileHandle) -> Self {
        Value::File(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => {
                Value::Map(entries.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::json!(i),
            Value::UInt(u) => serde_json::json!(u),
            Value::Float(f) => serde_json::json!(f),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Seq(items) => items.iter().map(serde_json::Value::from).collect(),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
            Value::Nullable { value, is_set } => {
                if *is_set {
                    serde_json::Value::from(value.as_ref())
                } else {
                    serde_json::Value::Null
                }
            }
            Value::File(file) => serde_json::json!({
                "filename": file.filename(),
                "mime": file.mime(),
                "size": file.size(),
            }),
        }
    }
}

/// An uploaded file as handed over by the transport layer.
///
/// The MIME type is detected by the transport from the file content, not
/// taken from the client-declared `Content-Type`.
#[derive(Clone, PartialEq)]
pub struct FileHandle {
    filename: String,
    mime: String,
    data: Bytes,
}

impl FileHandle {
    pub fn new(filename: impl Into<String>, mime: impl Into<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            mime: mime.into(),
            data,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Extension of the filename without the leading dot, empty if none.
    pub fn extension(&self) -> &str {
        let base = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.filename);
        match base.rfind('.') {
            Some(pos) => &base[pos + 1..],
            None => "",
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("filename", &self.filename)
            .field("mime", &self.mime)
            .field("size", &self.data.len())
            .finish()
    }
}

/// A scalar that remembers whether it was present in the source document.
///
/// Deserializing a value sets the presence flag; a missing member or an
/// explicit `null` leaves it unset. This lets the `required` rule accept an
/// explicit `0` or `false` while still rejecting an omitted field.
///
/// ```rust,ignore
/// #[derive(Deserialize, Record)]
/// struct Filter {
///     #[field(json = "limit")]
///     limit: Int,
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Nullable<T> {
    pub value: T,
    is_set: bool,
}

/// Nullable `i32`.
pub type Int = Nullable<i32>;
/// Nullable `i64`.
pub type Int64 = Nullable<i64>;
/// Nullable `f32`.
pub type Float32 = Nullable<f32>;
/// Nullable `f64`.
pub type Float64 = Nullable<f64>;
/// Nullable `bool`.
pub type Bool = Nullable<bool>;

impl<T> Nullable<T> {
    /// A present value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            is_set: true,
        }
    }

    pub fn is_set(&self) -> bool {
        self.is_set
    }

    pub fn get(&self) -> Option<&T> {
        self.is_set.then_some(&self.value)
    }
}

impl<T: Clone + Into<Value>> Nullable<T> {
    pub fn to_value(&self) -> Value {
        Value::Nullable {
            value: Box::new(self.value.clone().into()),
            is_set: self.is_set,
        }
    }
}

impl<T> From<T> for Nullable<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Missing members reach here through `deserialize_option` as well.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::new(value),
            None => Self::default(),
        })
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.get().serialize(serializer)
    }
}
