//! Form sources: parsed request parameters plus uploaded files.

use crate::value::FileHandle;
use std::collections::HashMap;

/// Boxed error returned by form parsers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Parsed form values, multi-valued per key.
pub type FormValues = HashMap<String, Vec<String>>;

/// Anything that can hand over form values and files for validation.
///
/// The transport crate implements this for its request type. [`Form`] is an
/// in-memory implementation for callers that already hold the values.
pub trait FormSource {
    /// Parse the underlying payload, reading at most `max_size` bytes.
    ///
    /// Called once per validation before any value is read. Implementations
    /// that are already parsed return `Ok(())`.
    fn parse_form(&mut self, max_size: u64) -> Result<(), BoxError>;

    /// Values parsed so far.
    fn form(&self) -> &FormValues;

    /// Uploaded file under `name`, if any.
    fn file(&self, name: &str) -> Option<&FileHandle>;
}

/// In-memory form source.
#[derive(Debug, Clone, Default)]
pub struct Form {
    values: FormValues,
    files: HashMap<String, FileHandle>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `key`.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_value(key, value);
        self
    }

    pub fn with_file(mut self, key: impl Into<String>, file: FileHandle) -> Self {
        self.insert_file(key, file);
        self
    }

    pub fn insert_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    pub fn insert_file(&mut self, key: impl Into<String>, file: FileHandle) {
        self.files.insert(key.into(), file);
    }
}

impl FormSource for Form {
    fn parse_form(&mut self, _max_size: u64) -> Result<(), BoxError> {
        Ok(())
    }

    fn form(&self) -> &FormValues {
        &self.values
    }

    fn file(&self, name: &str) -> Option<&FileHandle> {
        self.files.get(name)
    }
}

impl<F: FormSource + ?Sized> FormSource for &mut F {
    fn parse_form(&mut self, max_size: u64) -> Result<(), BoxError> {
        (**self).parse_form(max_size)
    }

    fn form(&self) -> &FormValues {
        (**self).form()
    }

    fn file(&self, name: &str) -> Option<&FileHandle> {
        (**self).file(name)
    }
}

impl<K, V> FromIterator<(K, V)> for Form
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Form::new();
        for (k, v) in iter {
            form.insert_value(k, v);
        }
        form
    }
}
