//! Error types for the transport adapter

use bytes::Bytes;
use fieldcheck_validate::{ConfigError, ErrorReport};
use http::StatusCode;
use serde::Serialize;
use std::fmt;

/// Result type alias for transport operations
pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Transport-level error
///
/// Describes malformed requests and rejected validation in a consistent
/// JSON envelope.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub status: StatusCode,
    /// Error type identifier
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Field-level validation errors
    pub fields: Option<Vec<FieldError>>,
    /// Details for logs, never serialized
    pub(crate) internal: Option<String>,
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    /// Field name as reported by the validator, e.g. "Address.city"
    pub field: String,
    /// Base rule name, e.g. "email" or "between"
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
            fields: None,
            internal: None,
        }
    }

    /// 422 carrying every failure of `report`, fields in sorted order.
    pub fn validation(report: &ErrorReport) -> Self {
        let fields = report
            .to_api_error()
            .error
            .fields
            .into_iter()
            .map(|f| FieldError {
                field: f.field,
                code: f.code,
                message: f.message,
            })
            .collect();

        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            error_type: "validation_error".to_string(),
            message: "Request validation failed".to_string(),
            fields: Some(fields),
            internal: None,
        }
    }

    /// Create a 400 Bad Request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    /// Create a 413 Payload Too Large error
    pub fn payload_too_large(limit: u64) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            format!("Request body exceeds limit of {} bytes", limit),
        )
    }

    /// Create a 415 Unsupported Media Type error
    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type", message)
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    /// Add internal details (logged, hidden from the response body)
    pub fn with_internal(mut self, details: impl Into<String>) -> Self {
        self.internal = Some(details.into());
        self
    }

    pub fn internal_details(&self) -> Option<&str> {
        self.internal.as_deref()
    }

    /// Render as a JSON HTTP response.
    pub fn into_response(self) -> http::Response<Bytes> {
        if self.status.is_server_error() {
            tracing::error!(
                status = self.status.as_u16(),
                error_type = %self.error_type,
                internal = ?self.internal,
                "{}",
                self.message
            );
        } else {
            tracing::debug!(status = self.status.as_u16(), error_type = %self.error_type, "{}", self.message);
        }

        let status = self.status;
        let body = serde_json::to_vec(&ErrorResponse::from(self)).unwrap_or_default();
        let mut response = http::Response::new(Bytes::from(body));
        *response.status_mut() = status;
        response.headers_mut().insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        response
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON representation of an error response
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            error: ErrorBody {
                error_type: err.error_type,
                message: err.message,
                fields: err.fields,
            },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

impl From<serde_urlencoded::de::Error> for ApiError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        ApiError::bad_request(format!("Invalid form data: {}", err))
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal("Validator misconfigured").with_internal(err.to_string())
    }
}

impl From<ErrorReport> for ApiError {
    fn from(report: ErrorReport) -> Self {
        ApiError::validation(&report)
    }
}
