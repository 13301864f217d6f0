//! # fieldcheck core
//!
//! HTTP transport adapter: buffers a request, parses its query string and
//! form body (urlencoded or multipart, with sniffed file types) and exposes
//! it to the validator as a [`FormSource`](fieldcheck_validate::FormSource).
//!
//! This crate is not meant to be used directly. Use `fieldcheck` instead.

mod error;
mod form;
pub mod multipart;
mod request;
pub mod sniff;
mod validate;

pub use error::{ApiError, FieldError, Result};
pub use form::ParsedForm;
pub use request::{Request, RequestBuilder};
pub use sniff::sniff;
pub use validate::{ensure_valid, json_body, validate_json_request, validate_request};
