//! Content sniffing for uploaded files.
//!
//! Only the leading [`SNIFF_LEN`] bytes are inspected. Known binary formats
//! are recognized by magic number and HTML by its leading tag. Anything else
//! that decodes as text is `text/plain`, the rest `application/octet-stream`.

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 512;

pub const TEXT_HTML: &str = "text/html";
pub const TEXT_PLAIN: &str = "text/plain";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Detect the MIME type of `data`, without parameters.
pub fn sniff(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];

    if let Some(kind) = infer::get(head) {
        return kind.mime_type();
    }
    if looks_like_html(head) {
        TEXT_HTML
    } else if looks_like_text(head) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

/// Media type of a header value, lowercased and without parameters:
/// `Text/HTML; charset=utf-8` → `text/html`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Tags that mark a document as HTML when they open it.
const HTML_SIGNATURES: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

fn looks_like_html(head: &[u8]) -> bool {
    let start = head
        .iter()
        .position(|b| !matches!(b, b'\t' | b'\n' | b'\x0c' | b'\r' | b' '))
        .unwrap_or(head.len());
    let head = &head[start..];

    HTML_SIGNATURES.iter().any(|sig| {
        head.len() > sig.len()
            && head[..sig.len()].eq_ignore_ascii_case(sig)
            && matches!(head[sig.len()], b' ' | b'>')
    })
}

fn looks_like_text(head: &[u8]) -> bool {
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        // A multi-byte character cut at the sniffing boundary is still text.
        Err(err) if err.error_len().is_none() => {
            match std::str::from_utf8(&head[..err.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };
    !text
        .chars()
        .any(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\x0c' | '\x1b'))
}
