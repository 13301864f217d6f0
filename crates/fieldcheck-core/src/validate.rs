//! Running a [`Validator`] against a [`Request`].

use crate::error::{ApiError, Result};
use crate::request::Request;
use crate::sniff::essence;
use fieldcheck_validate::{ConfigError, ErrorReport, Flatten, Validator};
use serde::de::DeserializeOwned;

/// Validate the request's query string and form body.
///
/// The form is parsed on first use; a body that cannot be parsed is
/// validated as an empty form.
pub fn validate_request(
    validator: &Validator,
    req: &mut Request,
) -> std::result::Result<ErrorReport, ConfigError> {
    validator.validate_form(req)
}

/// Decode the request's JSON body into `target` and validate it.
///
/// A body that was already taken validates `target` as it stands.
pub fn validate_json_request<T>(
    validator: &Validator,
    req: &mut Request,
    target: &mut T,
) -> std::result::Result<ErrorReport, ConfigError>
where
    T: DeserializeOwned + Flatten,
{
    let body = req.take_body().unwrap_or_default();
    validator.validate_json(&body, target)
}

/// `Ok` for an empty report, a 422 [`ApiError`] otherwise.
pub fn ensure_valid(report: ErrorReport) -> Result<()> {
    report.into_result().map_err(ApiError::from)
}

/// Decode, validate and return the JSON body as `T`.
///
/// A Content-Type other than JSON is rejected with 415; a missing one is
/// accepted.
///
/// ```rust,ignore
/// let signup: Signup = json_body(&validator, &mut req)?;
/// ```
pub fn json_body<T>(validator: &Validator, req: &mut Request) -> Result<T>
where
    T: DeserializeOwned + Flatten,
{
    if let Some(content_type) = req.content_type() {
        let media_type = essence(content_type);
        if !is_json(&media_type) {
            return Err(ApiError::unsupported_media_type(format!(
                "Expected a JSON body, got {}",
                media_type
            )));
        }
    }
    let body = req
        .take_body()
        .ok_or_else(|| ApiError::internal("Body already consumed"))?;
    let value: T = serde_json::from_slice(&body)?;
    ensure_valid(validator.validate_struct(&value)?)?;
    Ok(value)
}

fn is_json(media_type: &str) -> bool {
    media_type == "application/json" || media_type.ends_with("+json")
}
