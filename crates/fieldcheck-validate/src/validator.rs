//! The validation orchestrator.
//!
//! A [`Validator`] holds a rule table, optional message overrides and a
//! shared [`RuleRegistry`]. Each call checks the table against the registry,
//! collects the input values (from a form source or by flattening a record),
//! skips absent optional fields and runs every remaining rule in order.

use crate::error::{ConfigError, ErrorReport, RuleError, RuleFailure};
use crate::flatten::{flatten, Flatten};
use crate::form::{FormSource, FormValues};
use crate::registry::RuleRegistry;
use crate::rule::{override_message, RuleInput};
use crate::value::Value;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;

/// Field name to ordered rule expressions (or override messages).
pub type RuleTable = HashMap<String, Vec<String>>;

/// Default upper bound for form payloads, 1 MiB.
pub const DEFAULT_FORM_SIZE: u64 = 1024 * 1024;
pub const DEFAULT_TAG_IDENTIFIER: &str = "json";
pub const DEFAULT_TAG_SEPARATOR: &str = "|";

/// Prefix marking a rule table key as an uploaded file.
pub const FILE_PREFIX: &str = "file:";

/// Report key used when a JSON body cannot be decoded.
pub const DECODE_ERROR_FIELD: &str = "_error";

/// Validator configuration.
#[derive(Debug, Clone)]
pub struct Options {
    pub rules: RuleTable,
    /// Entries are `rule:message`, e.g. `"between:Age must be 18 to 60"`.
    pub messages: RuleTable,
    /// Treat every field as required even without a `required` rule.
    pub required_default: bool,
    pub tag_identifier: String,
    pub tag_separator: String,
    /// Maximum form payload in bytes; zero selects the default.
    pub form_size: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            rules: RuleTable::new(),
            messages: RuleTable::new(),
            required_default: false,
            tag_identifier: DEFAULT_TAG_IDENTIFIER.to_string(),
            tag_separator: DEFAULT_TAG_SEPARATOR.to_string(),
            form_size: DEFAULT_FORM_SIZE,
        }
    }
}

impl Options {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            ..Self::default()
        }
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_messages(mut self, messages: RuleTable) -> Self {
        self.messages = messages;
        self
    }

    pub fn required_default(mut self, required: bool) -> Self {
        self.required_default = required;
        self
    }

    pub fn tag_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.tag_identifier = identifier.into();
        self
    }

    pub fn form_size(mut self, bytes: u64) -> Self {
        self.form_size = bytes;
        self
    }

    /// Options seeded from environment settings, with an empty rule table.
    #[cfg(feature = "config")]
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self {
            required_default: settings.required_default,
            tag_identifier: settings.tag_identifier.clone(),
            tag_separator: settings.tag_separator.clone(),
            form_size: settings.form_size,
            ..Self::default()
        }
    }
}

/// Runs a rule table against forms, JSON bodies or records.
///
/// ```rust,ignore
/// let validator = Validator::new(Options::new(rule_table! {
///     "email" => ["required", "email"],
///     "age" => ["numeric_between:18,60"],
/// }));
/// let report = validator.validate_struct(&signup)?;
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    options: Options,
    registry: Arc<RuleRegistry>,
}

impl Validator {
    /// A validator backed by the process-wide registry.
    pub fn new(options: Options) -> Self {
        Self::with_registry(options, RuleRegistry::global())
    }

    pub fn with_registry(options: Options, registry: Arc<RuleRegistry>) -> Self {
        Self { options, registry }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    pub fn set_default_required(&mut self, required: bool) {
        self.options.required_default = required;
    }

    pub fn set_tag_identifier(&mut self, identifier: impl Into<String>) {
        self.options.tag_identifier = identifier.into();
    }

    /// Validate form values and uploaded files.
    ///
    /// A payload that fails to parse is treated as an empty form.
    pub fn validate_form<S>(&self, source: &mut S) -> Result<ErrorReport, ConfigError>
    where
        S: FormSource + ?Sized,
    {
        self.check_table()?;

        let limit = match self.options.form_size {
            0 => DEFAULT_FORM_SIZE,
            n => n,
        };
        let parsed = match source.parse_form(limit) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "form parsing failed, validating as empty form");
                false
            }
        };
        let empty = FormValues::new();
        let form = if parsed { source.form() } else { &empty };

        let mut report = ErrorReport::new();
        let mut exempt = 0usize;
        for (key, rules) in &self.options.rules {
            let is_file = key.starts_with(FILE_PREFIX);
            if !is_file && !form.contains_key(key) && self.is_optional(rules) {
                exempt += 1;
                continue;
            }

            let (field, value) = match key.strip_prefix(FILE_PREFIX) {
                Some(name) => {
                    let file = if parsed { source.file(name) } else { None };
                    let value = file
                        .filter(|f| !f.filename().is_empty())
                        .map_or(Value::Null, |f| Value::File(f.clone()));
                    (name, value)
                }
                None => {
                    let text = form
                        .get(key)
                        .and_then(|values| values.first())
                        .map(|v| v.trim().to_string())
                        .unwrap_or_default();
                    (key.as_str(), Value::String(text))
                }
            };

            for rule in rules {
                self.dispatch(&mut report, key, field, rule, &value)?;
            }
        }

        tracing::debug!(
            fields = self.options.rules.len(),
            exempt,
            failures = report.len(),
            "form validated"
        );
        Ok(report)
    }

    /// Decode `body` into `target`, then validate the decoded record.
    ///
    /// An empty body leaves `target` untouched. A body that fails to decode
    /// yields a report with a single entry under `_error`; no rule runs.
    pub fn validate_json<T>(&self, body: &[u8], target: &mut T) -> Result<ErrorReport, ConfigError>
    where
        T: DeserializeOwned + Flatten,
    {
        self.check_table()?;

        if !body.is_empty() {
            match serde_json::from_slice::<T>(body) {
                Ok(decoded) => *target = decoded,
                Err(err) => {
                    tracing::debug!(error = %err, "request body is not valid JSON");
                    let mut report = ErrorReport::new();
                    report.add(DECODE_ERROR_FIELD, RuleError::new("json", err.to_string()));
                    return Ok(report);
                }
            }
        }

        self.validate_record(&*target)
    }

    /// Validate a record, map or any other [`Flatten`] value.
    pub fn validate_struct<T>(&self, data: &T) -> Result<ErrorReport, ConfigError>
    where
        T: Flatten + ?Sized,
    {
        self.check_table()?;
        self.validate_record(&data)
    }

    fn validate_record(&self, data: &dyn Flatten) -> Result<ErrorReport, ConfigError> {
        let flat = flatten(
            data,
            &self.options.tag_identifier,
            &self.options.tag_separator,
        );
        tracing::trace!(fields = flat.len(), "record flattened");

        let mut report = ErrorReport::new();
        let mut exempt = 0usize;
        for (field, rules) in &self.options.rules {
            let value = flat.get(field);
            if value.map_or(true, Value::is_empty) && self.is_optional(rules) {
                exempt += 1;
                continue;
            }

            let value = value.cloned().unwrap_or_default();
            for rule in rules {
                self.dispatch(&mut report, field, field, rule, &value)?;
            }
        }

        tracing::debug!(
            fields = self.options.rules.len(),
            exempt,
            failures = report.len(),
            "record validated"
        );
        Ok(report)
    }

    /// Every table needs at least one field and only registered rules.
    fn check_table(&self) -> Result<(), ConfigError> {
        if self.options.rules.is_empty() {
            tracing::error!("validation called with an empty rule table");
            return Err(ConfigError::EmptyRules);
        }
        for (field, rules) in &self.options.rules {
            if let Some(rule) = rules.iter().find(|r| !self.registry.exists(r)) {
                tracing::error!(field = %field, rule = %rule, "unknown rule in rule table");
                return Err(ConfigError::UnknownRule(rule.clone()));
            }
        }
        Ok(())
    }

    fn is_optional(&self, rules: &[String]) -> bool {
        !self.options.required_default && !rules.iter().any(|r| r == "required")
    }

    /// Run one rule and record its failure under `field`.
    ///
    /// `key` is the rule table key, used for the override lookup.
    fn dispatch(
        &self,
        report: &mut ErrorReport,
        key: &str,
        field: &str,
        rule: &str,
        value: &Value,
    ) -> Result<(), ConfigError> {
        let run = self.registry.resolve(rule)?;
        let message = self
            .options
            .messages
            .get(key)
            .and_then(|messages| override_message(messages, rule));
        let input = RuleInput::new(field, rule, value).with_message(message);

        tracing::trace!(field, rule, kind = value.kind_name(), "dispatching rule");
        match run(&input) {
            Ok(()) => Ok(()),
            Err(RuleFailure::Invalid(error)) => {
                report.add(field, error);
                Ok(())
            }
            Err(RuleFailure::Config(error)) => {
                tracing::error!(field, rule, error = %error, "malformed rule expression");
                Err(error)
            }
        }
    }
}

/// Build a [`RuleTable`] from `field => [rules...]` pairs.
///
/// ```rust,ignore
/// let rules = rule_table! {
///     "username" => ["required", "between:3,8"],
///     "file:photo" => ["ext:jpg,png", "size:10000"],
/// };
/// ```
#[macro_export]
macro_rules! rule_table {
    () => {
        $crate::RuleTable::new()
    };
    ($($field:expr => [$($rule:expr),* $(,)?]),+ $(,)?) => {{
        let mut table = $crate::RuleTable::new();
        $(
            table.insert(
                ::std::string::String::from($field),
                ::std::vec![$(::std::string::String::from($rule)),*],
            );
        )+
        table
    }};
}
