//! `multipart/form-data` parsing
//!
//! The body is split on its boundary delimiter at the byte level, so file
//! contents are never decoded and parts share the request's buffer. A
//! delimiter only counts at the start of a line and when the boundary is not
//! followed by more boundary characters.
//!
//! ```text
//! --BOUNDARY\r\n
//! Content-Disposition: form-data; name="photo"; filename="me.png"\r\n
//! Content-Type: image/png\r\n
//! \r\n
//! <bytes>\r\n
//! --BOUNDARY--\r\n
//! ```

use crate::error::{ApiError, Result};
use bytes::Bytes;

/// Maximum number of parts in one body.
pub const DEFAULT_MAX_PARTS: usize = 100;

/// A single part of a multipart body.
#[derive(Clone, Debug)]
pub struct Part {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    pub fn new(
        name: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name,
            file_name,
            content_type,
            data,
        }
    }

    /// Get the field name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the original filename (if this is a file upload)
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Content type declared by the client
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Whether this part carries a file. An empty filename (no file chosen
    /// in a browser form) counts as a plain value.
    pub fn is_file(&self) -> bool {
        self.file_name.as_deref().is_some_and(|f| !f.is_empty())
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Get the part data as a string (UTF-8)
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.data.to_vec())
            .map_err(|e| ApiError::bad_request(format!("Invalid UTF-8 in field: {}", e)))
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Extract the boundary from a Content-Type header value
pub fn extract_boundary(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("boundary") {
            let boundary = value.trim().trim_matches('"');
            (!boundary.is_empty()).then(|| boundary.to_string())
        } else {
            None
        }
    })
}

/// Split `body` into its parts.
pub fn parse(body: &Bytes, boundary: &str, max_parts: usize) -> Result<Vec<Part>> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();

    let mut pos = find_delimiter(body, delimiter, 0)
        .ok_or_else(|| ApiError::bad_request("Multipart body has no opening boundary"))?;

    let mut parts = Vec::new();
    loop {
        pos += delimiter.len();
        if body[pos..].starts_with(b"--") {
            break;
        }
        pos = skip_line_break(body, pos);

        let next = find_delimiter(body, delimiter, pos)
            .ok_or_else(|| ApiError::bad_request("Multipart body is not terminated"))?;
        let end = trim_line_break(body, pos, next);

        if parts.len() == max_parts {
            return Err(ApiError::bad_request(format!(
                "Multipart body exceeds {} parts",
                max_parts
            )));
        }
        parts.push(parse_part(body.slice(pos..end))?);
        pos = next;
    }

    tracing::debug!(parts = parts.len(), "multipart body parsed");
    Ok(parts)
}

fn parse_part(raw: Bytes) -> Result<Part> {
    let (head_len, sep_len) = match find(&raw, b"\r\n\r\n", 0) {
        Some(at) => (at, 4),
        None => match find(&raw, b"\n\n", 0) {
            Some(at) => (at, 2),
            None => return Err(ApiError::bad_request("Multipart part has no header section")),
        },
    };
    let head = String::from_utf8_lossy(&raw[..head_len]);
    let data = raw.slice(head_len + sep_len..);

    let mut name = None;
    let mut file_name = None;
    let mut content_type = None;

    for line in head.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if key.trim().eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').skip(1) {
                let Some((key, value)) = param.split_once('=') else {
                    continue;
                };
                let value = value.trim().trim_matches('"').to_string();
                match key.trim().to_ascii_lowercase().as_str() {
                    "name" => name = Some(value),
                    "filename" => file_name = Some(value),
                    _ => {}
                }
            }
        } else if key.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.to_string());
        }
    }

    Ok(Part::new(name, file_name, content_type, data))
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|at| at + from)
}

/// Next delimiter at or after `from` that opens a line.
fn find_delimiter(body: &[u8], delimiter: &[u8], from: usize) -> Option<usize> {
    let mut from = from;
    while let Some(at) = find(body, delimiter, from) {
        let line_start = at == 0 || body[at - 1] == b'\n';
        let rest = &body[at + delimiter.len()..];
        let line_end = rest.starts_with(b"--")
            || rest
                .first()
                .map_or(true, |b| matches!(b, b'\r' | b'\n' | b' ' | b'\t'));
        if line_start && line_end {
            return Some(at);
        }
        from = at + 1;
    }
    None
}

fn skip_line_break(body: &[u8], pos: usize) -> usize {
    if body[pos..].starts_with(b"\r\n") {
        pos + 2
    } else if body[pos..].starts_with(b"\n") {
        pos + 1
    } else {
        pos
    }
}

/// End of the part content that precedes a delimiter at `next`.
fn trim_line_break(body: &[u8], start: usize, next: usize) -> usize {
    if next >= start + 2 && &body[next - 2..next] == b"\r\n" {
        next - 2
    } else if next > start && body[next - 1] == b'\n' {
        next - 1
    } else {
        next
    }
}
