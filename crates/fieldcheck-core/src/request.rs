//! Request type for the transport adapter

use crate::error::{ApiError, Result};
use crate::form::ParsedForm;
use bytes::Bytes;
use http::{request::Parts, HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use http_body::Body;
use http_body_util::{BodyExt, Limited};

/// HTTP request wrapper
///
/// Holds the request head and a fully buffered body. The body can be taken
/// once, either directly or by parsing it as a form.
pub struct Request {
    pub(crate) parts: Parts,
    pub(crate) body: Option<Bytes>,
    pub(crate) form: Option<ParsedForm>,
}

impl Request {
    /// Create a request from parts and an already buffered body
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            parts,
            body: Some(body),
            form: None,
        }
    }

    /// Buffer the body of `req`, rejecting bodies larger than `limit` bytes.
    pub async fn from_http<B>(req: http::Request<B>, limit: u64) -> Result<Self>
    where
        B: Body,
        B::Data: Send,
        B::Error: std::error::Error + Send + Sync + 'static,
    {
        let (parts, body) = req.into_parts();
        let limit_usize = usize::try_from(limit).unwrap_or(usize::MAX);

        let collected = Limited::new(body, limit_usize).collect().await.map_err(|err| {
            if err.is::<http_body_util::LengthLimitError>() {
                ApiError::payload_too_large(limit)
            } else {
                ApiError::bad_request("Failed to read request body").with_internal(err.to_string())
            }
        })?;

        Ok(Self::from_parts(parts, collected.to_bytes()))
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Get the HTTP method
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Get the URI
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Get the headers
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Get the query string
    pub fn query_string(&self) -> Option<&str> {
        self.parts.uri.query()
    }

    /// The Content-Type header, if present and valid ASCII
    pub fn content_type(&self) -> Option<&str> {
        self.parts
            .headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Take the body bytes (can only be called once)
    pub fn take_body(&mut self) -> Option<Bytes> {
        self.body.take()
    }

    /// Whether the body is still available
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.parts.method)
            .field("uri", &self.parts.uri)
            .field("version", &self.parts.version)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .field("form_parsed", &self.form.is_some())
            .finish()
    }
}

/// Builder for [`Request`]
///
/// ```rust,ignore
/// let req = Request::builder()
///     .method(Method::POST)
///     .uri("/signup?ref=mail")
///     .content_type("application/x-www-form-urlencoded")
///     .body("name=John&age=30")
///     .build()?;
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: "/".to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the Content-Type header
    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.header("content-type", content_type)
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the request; fails on an invalid URI or header.
    pub fn build(self) -> Result<Request> {
        let uri: Uri = self
            .uri
            .parse()
            .map_err(|e: http::uri::InvalidUri| ApiError::bad_request(format!("Invalid URI: {}", e)))?;

        let mut req = http::Request::new(());
        *req.method_mut() = self.method;
        *req.uri_mut() = uri;
        for (name, value) in self.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| ApiError::bad_request(format!("Invalid header name: {}", e)))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| ApiError::bad_request(format!("Invalid header value: {}", e)))?;
            req.headers_mut().append(name, value);
        }

        let (parts, ()) = req.into_parts();
        Ok(Request::from_parts(parts, self.body))
    }
}
