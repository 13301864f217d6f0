//! Error types: configuration errors, rule failures and the error report.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Misconfiguration detected while registering or dispatching rules.
///
/// These abort a validation call instead of being recorded in the report.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("rule `{0}` is already registered")]
    DuplicateRule(String),

    #[error("invalid rule name `{0}`: names must be non-empty and must not contain ':'")]
    InvalidRuleName(String),

    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    #[error("rule table is empty")]
    EmptyRules,

    #[error("invalid argument for rule `{rule}`")]
    InvalidArgument { rule: String },

    #[error("rule `{rule}` expects a number, got `{value}`")]
    InvalidNumber { rule: String, value: String },

    #[error("rule `{rule}` carries an invalid pattern: {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("the global rule registry is already initialized")]
    RegistryInitialized,
}

/// Error from a single validation rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleError {
    /// Base name of the rule that failed (e.g. "email", "between")
    pub code: String,
    /// Human-readable message, already resolved against overrides
    pub message: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, serde_json::Value>,
}

impl RuleError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// Attach a parameter, kept for the API error envelope.
    pub fn param(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.params.insert(key.into(), v);
        }
        self
    }
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RuleError {}

/// Outcome of a rule that did not pass.
#[derive(Debug)]
pub enum RuleFailure {
    /// The value violates the rule; recorded in the report.
    Invalid(RuleError),
    /// The rule expression itself is unusable; aborts the call.
    Config(ConfigError),
}

impl From<RuleError> for RuleFailure {
    fn from(e: RuleError) -> Self {
        RuleFailure::Invalid(e)
    }
}

impl From<ConfigError> for RuleFailure {
    fn from(e: ConfigError) -> Self {
        RuleFailure::Config(e)
    }
}

/// Result type returned by rule functions.
pub type RuleResult = Result<(), RuleFailure>;

/// Validation failures keyed by field name.
///
/// Messages for a field keep the order in which rules were declared and are
/// never deduplicated. Serializes as a JSON object of message arrays:
///
/// ```json
/// { "email": ["The email field must be a valid email address"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorReport {
    fields: HashMap<String, Vec<RuleError>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, error: RuleError) {
        self.fields.entry(field.into()).or_default().push(error);
    }

    /// Merge another report into this one, appending per field.
    pub fn merge(&mut self, other: ErrorReport) {
        for (field, errors) in other.fields {
            self.fields.entry(field).or_default().extend(errors);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of failures across all fields.
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Number of fields with at least one failure.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&[RuleError]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    /// Messages recorded for `field`, in rule order.
    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.get(field)
            .map(|errs| errs.iter().map(|e| e.message.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Field names with failures, sorted.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RuleError])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok` when nothing failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Convert to the `validation_error` API envelope.
    ///
    /// Fields are emitted in sorted order so responses are stable.
    pub fn to_api_error(&self) -> ApiValidationError {
        let fields = self
            .field_names()
            .into_iter()
            .flat_map(|field| {
                self.fields[field].iter().map(move |e| FieldErrorResponse {
                    field: field.to_string(),
                    code: e.code.clone(),
                    message: e.message.clone(),
                    params: (!e.params.is_empty()).then(|| e.params.clone()),
                })
            })
            .collect();

        ApiValidationError {
            error: ErrorBody {
                error_type: "validation_error".to_string(),
                message: "Validation failed".to_string(),
                fields,
            },
        }
    }
}

impl Serialize for ErrorReport {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in self.field_names() {
            map.serialize_entry(field, &self.messages(field))?;
        }
        map.end()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation failed: {} error(s) in {} field(s)",
            self.len(),
            self.field_count()
        )
    }
}

impl std::error::Error for ErrorReport {}

/// API response format for validation errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiValidationError {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub fields: Vec<FieldErrorResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldErrorResponse {
    pub field: String,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<HashMap<String, serde_json::Value>>,
}
