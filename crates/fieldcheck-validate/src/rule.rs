//! Rule expressions and the calling contract shared by every rule.

use crate::error::{ConfigError, RuleError, RuleFailure, RuleResult};
use crate::value::Value;
use std::sync::Arc;

/// A registered rule function.
pub type RuleFn = Arc<dyn Fn(&RuleInput<'_>) -> RuleResult + Send + Sync>;

/// A parsed rule expression such as `between:3,5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleExpr<'a> {
    raw: &'a str,
    name: &'a str,
    params: Option<&'a str>,
}

impl<'a> RuleExpr<'a> {
    /// Split on the first `:`. Everything after it is the parameter tail.
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once(':') {
            Some((name, params)) => Self {
                raw,
                name,
                params: Some(params),
            },
            None => Self {
                raw,
                name: raw,
                params: None,
            },
        }
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Base rule name without parameters.
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn params(&self) -> Option<&'a str> {
        self.params
    }

    /// Parameter tail split on commas. Missing or empty tail is an error.
    pub fn list(&self) -> Result<Vec<&'a str>, ConfigError> {
        match self.params {
            Some(tail) if !tail.is_empty() => Ok(tail.split(',').collect()),
            _ => Err(self.invalid_argument()),
        }
    }

    /// Exactly two comma-separated items, each possibly empty.
    pub fn pair(&self) -> Result<(&'a str, &'a str), ConfigError> {
        let items = self.list()?;
        match items.as_slice() {
            [a, b] => Ok((a.trim(), b.trim())),
            _ => Err(self.invalid_argument()),
        }
    }

    /// Exactly two numeric bounds.
    pub fn bounds(&self) -> Result<(f64, f64), ConfigError> {
        let (a, b) = self.pair()?;
        Ok((self.number(a)?, self.number(b)?))
    }

    /// A single numeric parameter.
    pub fn single_number(&self) -> Result<f64, ConfigError> {
        match self.params {
            Some(tail) => self.number(tail.trim()),
            None => Err(self.invalid_argument()),
        }
    }

    /// A single non-negative integer parameter.
    pub fn single_usize(&self) -> Result<usize, ConfigError> {
        let tail = self.params.ok_or_else(|| self.invalid_argument())?.trim();
        tail.parse().map_err(|_| ConfigError::InvalidNumber {
            rule: self.raw.to_string(),
            value: tail.to_string(),
        })
    }

    pub fn number(&self, text: &str) -> Result<f64, ConfigError> {
        text.parse().map_err(|_| ConfigError::InvalidNumber {
            rule: self.raw.to_string(),
            value: text.to_string(),
        })
    }

    pub fn invalid_argument(&self) -> ConfigError {
        ConfigError::InvalidArgument {
            rule: self.raw.to_string(),
        }
    }
}

/// Everything a rule function receives for one invocation.
#[derive(Debug, Clone)]
pub struct RuleInput<'a> {
    /// Field key as reported back to the caller
    pub field: &'a str,
    /// Full rule expression including parameters
    pub rule: &'a str,
    /// Override message for this field and rule, if configured
    pub message: Option<&'a str>,
    pub value: &'a Value,
}

impl<'a> RuleInput<'a> {
    pub fn new(field: &'a str, rule: &'a str, value: &'a Value) -> Self {
        Self {
            field,
            rule,
            message: None,
            value,
        }
    }

    pub fn with_message(mut self, message: Option<&'a str>) -> Self {
        self.message = message;
        self
    }

    pub fn expr(&self) -> RuleExpr<'a> {
        RuleExpr::parse(self.rule)
    }

    /// The value as text, see [`Value::to_text`].
    pub fn text(&self) -> std::borrow::Cow<'a, str> {
        self.value.to_text()
    }

    /// Build a failure, preferring the override message over `default`.
    pub fn fail(&self, default: impl FnOnce() -> String) -> RuleFailure {
        RuleFailure::Invalid(self.error(default))
    }

    pub fn error(&self, default: impl FnOnce() -> String) -> RuleError {
        let message = match self.message {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => default(),
        };
        RuleError::new(self.expr().name(), message)
    }

    /// `Ok(())` when `passed`, otherwise a failure with `default` text.
    pub fn check(&self, passed: bool, default: impl FnOnce() -> String) -> RuleResult {
        if passed {
            Ok(())
        } else {
            Err(self.fail(default))
        }
    }
}

/// Look up the override text for `field` and `rule`.
///
/// Entries are `base:text`; the first entry whose prefix is the rule's base
/// name wins.
pub fn override_message<'m>(messages: &'m [String], rule: &str) -> Option<&'m str> {
    let base = RuleExpr::parse(rule).name();
    messages.iter().find_map(|m| {
        m.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix(':'))
    })
}
