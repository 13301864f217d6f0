//! Form parsing for [`Request`].
//!
//! Values come from the query string and, depending on the Content-Type,
//! from an `application/x-www-form-urlencoded` or `multipart/form-data`
//! body. Body values are listed before query values for the same name.

use crate::error::{ApiError, Result};
use crate::multipart;
use crate::request::Request;
use crate::sniff::{essence, sniff};
use bytes::Bytes;
use fieldcheck_validate::{BoxError, FileHandle, FormSource, FormValues};
use std::collections::HashMap;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Parsed form values and uploaded files.
#[derive(Debug, Default, Clone)]
pub struct ParsedForm {
    pub values: FormValues,
    pub files: HashMap<String, FileHandle>,
}

impl ParsedForm {
    fn push_value(&mut self, name: String, value: String) {
        self.values.entry(name).or_default().push(value);
    }

    fn append(&mut self, pairs: Vec<(String, String)>) {
        for (name, value) in pairs {
            self.push_value(name, value);
        }
    }
}

impl Request {
    /// Parse the form once; later calls reuse the result.
    ///
    /// Bodies larger than `max_size` bytes are rejected.
    pub fn parse_form(&mut self, max_size: u64) -> Result<&ParsedForm> {
        if self.form.is_none() {
            let form = self.read_form(max_size)?;
            self.form = Some(form);
        }
        Ok(self.form.get_or_insert_with(ParsedForm::default))
    }

    /// The parsed form, if [`Request::parse_form`] succeeded.
    pub fn parsed_form(&self) -> Option<&ParsedForm> {
        self.form.as_ref()
    }

    fn read_form(&mut self, max_size: u64) -> Result<ParsedForm> {
        let mut form = ParsedForm::default();
        let media_type = self.content_type().map(essence).unwrap_or_default();

        match media_type.as_str() {
            URLENCODED => {
                let body = self.take_limited_body(max_size)?;
                form.append(serde_urlencoded::from_bytes(&body)?);
            }
            MULTIPART => {
                let boundary = self
                    .content_type()
                    .and_then(multipart::extract_boundary)
                    .ok_or_else(|| ApiError::bad_request("Missing boundary in Content-Type"))?;
                let body = self.take_limited_body(max_size)?;
                for part in multipart::parse(&body, &boundary, multipart::DEFAULT_MAX_PARTS)? {
                    add_part(&mut form, part)?;
                }
            }
            other => {
                tracing::trace!(content_type = other, "no form body to parse");
            }
        }

        if let Some(query) = self.query_string() {
            form.append(serde_urlencoded::from_str(query)?);
        }

        tracing::debug!(
            values = form.values.len(),
            files = form.files.len(),
            content_type = %media_type,
            "form parsed"
        );
        Ok(form)
    }

    /// Take the body if it fits in `max_size`; an oversized body stays in place.
    fn take_limited_body(&mut self, max_size: u64) -> Result<Bytes> {
        let size = self
            .body
            .as_ref()
            .map(Bytes::len)
            .ok_or_else(|| ApiError::internal("Body already consumed"))?;
        if size as u64 > max_size {
            tracing::warn!(size, limit = max_size, "form body too large");
            return Err(ApiError::payload_too_large(max_size));
        }
        Ok(self.take_body().unwrap_or_default())
    }
}

fn add_part(form: &mut ParsedForm, part: multipart::Part) -> Result<()> {
    let Some(name) = part.name().map(str::to_string) else {
        tracing::debug!("skipping multipart part without a name");
        return Ok(());
    };

    if part.is_file() {
        let file_name = part.file_name().unwrap_or_default().to_string();
        let mime = sniff(part.data());
        // The first upload under a name is the one exposed.
        form.files
            .entry(name)
            .or_insert_with(|| FileHandle::new(file_name, mime, part.data().clone()));
    } else {
        let value = part.text()?;
        form.push_value(name, value);
    }
    Ok(())
}

impl FormSource for Request {
    fn parse_form(&mut self, max_size: u64) -> std::result::Result<(), BoxError> {
        Request::parse_form(self, max_size)?;
        Ok(())
    }

    fn form(&self) -> &FormValues {
        static EMPTY: std::sync::OnceLock<FormValues> = std::sync::OnceLock::new();
        match &self.form {
            Some(form) => &form.values,
            None => EMPTY.get_or_init(FormValues::new),
        }
    }

    fn file(&self, name: &str) -> Option<&FileHandle> {
        self.form.as_ref()?.files.get(name)
    }
}
