//! Rule registry: name to rule function.

use crate::error::{ConfigError, RuleResult};
use crate::rule::{RuleExpr, RuleFn, RuleInput};
use crate::rules;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<Arc<RuleRegistry>> = OnceLock::new();

/// Registered rules, keyed by base name.
///
/// Registration takes `&mut self`; once the registry is wrapped in an `Arc`
/// and handed to validators it is read-only.
///
/// ```rust,ignore
/// let mut registry = RuleRegistry::with_defaults();
/// registry.register("over9000", |input| {
///     input.check(input.value.as_i64().unwrap_or(0) > 9000, || {
///         "The number must be over 9000".into()
///     })
/// })?;
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, RuleFn>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in rule catalogue.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        rules::register_builtins(&mut registry);
        registry
    }

    /// Register `rule` under `name`.
    ///
    /// Fails with [`ConfigError::DuplicateRule`] when the name is taken; the
    /// existing entry is left untouched.
    pub fn register<F>(&mut self, name: impl Into<String>, rule: F) -> Result<(), ConfigError>
    where
        F: Fn(&RuleInput<'_>) -> RuleResult + Send + Sync + 'static,
    {
        let name = name.into();
        if name.is_empty() || name.contains(':') {
            return Err(ConfigError::InvalidRuleName(name));
        }
        if self.rules.contains_key(&name) {
            tracing::error!(rule = %name, "duplicate rule registration");
            return Err(ConfigError::DuplicateRule(name));
        }
        tracing::debug!(rule = %name, "registered rule");
        self.rules.insert(name, Arc::new(rule));
        Ok(())
    }

    /// Whether the base name of `rule` is registered.
    pub fn exists(&self, rule: &str) -> bool {
        self.rules.contains_key(RuleExpr::parse(rule).name())
    }

    /// Find the function serving `rule`.
    pub fn resolve(&self, rule: &str) -> Result<&RuleFn, ConfigError> {
        self.rules
            .get(RuleExpr::parse(rule).name())
            .ok_or_else(|| ConfigError::UnknownRule(rule.to_string()))
    }

    /// Registered names, sorted.
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Process-wide registry holding the built-in rules.
    ///
    /// Created on first use unless [`RuleRegistry::init_global`] ran before.
    pub fn global() -> Arc<RuleRegistry> {
        GLOBAL
            .get_or_init(|| Arc::new(RuleRegistry::with_defaults()))
            .clone()
    }

    /// Initialize the process-wide registry with extra rules.
    ///
    /// Must run before the first call to [`RuleRegistry::global`]; later calls
    /// fail with [`ConfigError::RegistryInitialized`].
    pub fn init_global<F>(setup: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut RuleRegistry) -> Result<(), ConfigError>,
    {
        if GLOBAL.get().is_some() {
            return Err(ConfigError::RegistryInitialized);
        }
        let mut registry = RuleRegistry::with_defaults();
        setup(&mut registry)?;
        GLOBAL
            .set(Arc::new(registry))
            .map_err(|_| ConfigError::RegistryInitialized)
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.rule_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn always_ok(_: &RuleInput<'_>) -> RuleResult {
        Ok(())
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = RuleRegistry::new();
        registry
            .register("custom", |input: &RuleInput<'_>| {
                input.check(false, || "first".into())
            })
            .unwrap();

        let err = registry.register("custom", always_ok).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateRule(name) if name == "custom"));

        // The original entry is still the one that runs.
        let value = Value::Null;
        let rule = registry.resolve("custom").unwrap();
        assert!(rule(&RuleInput::new("f", "custom", &value)).is_err());
    }

    #[test]
    fn builtin_names_cannot_be_reused() {
        let mut registry = RuleRegistry::with_defaults();
        assert!(matches!(
            registry.register("email", always_ok),
            Err(ConfigError::DuplicateRule(_))
        ));
        assert!(matches!(
            registry.register("size", always_ok),
            Err(ConfigError::DuplicateRule(_))
        ));
    }

    #[test]
    fn invalid_names() {
        let mut registry = RuleRegistry::new();
        assert!(matches!(
            registry.register("", always_ok),
            Err(ConfigError::InvalidRuleName(_))
        ));
        assert!(matches!(
            registry.register("a:b", always_ok),
            Err(ConfigError::InvalidRuleName(_))
        ));
    }

    #[test]
    fn lookup_strips_parameters() {
        let registry = RuleRegistry::with_defaults();
        assert!(registry.exists("between:1,5"));
        assert!(registry.exists("required"));
        assert!(!registry.exists("betweenx:1,5"));
        assert!(registry.resolve("digits:5").is_ok());
        assert!(matches!(
            registry.resolve("nope"),
            Err(ConfigError::UnknownRule(_))
        ));
    }

    #[test]
    fn rule_names_are_sorted() {
        let registry = RuleRegistry::with_defaults();
        let names = registry.rule_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
        assert!(names.contains(&"mime"));
    }
}
