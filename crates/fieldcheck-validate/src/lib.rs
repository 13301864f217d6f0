//! # fieldcheck validation engine
//!
//! Rule-based validation of forms, JSON bodies and nested records.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fieldcheck_validate::prelude::*;
//!
//! #[derive(Deserialize, Record)]
//! struct Signup {
//!     #[field(json = "email")]
//!     email: String,
//!     #[field(json = "age")]
//!     age: Int,
//! }
//!
//! let validator = Validator::new(Options::new(rule_table! {
//!     "email" => ["required", "email"],
//!     "age" => ["required", "numeric_between:18,60"],
//! }));
//!
//! let mut signup = Signup::default();
//! let report = validator.validate_json(body, &mut signup)?;
//! ```
//!
//! ## Rule expressions
//!
//! A rule is a registered name, optionally followed by `:` and parameters:
//! `required`, `between:3,8`, `in:admin,user`, `regex:^[a-z]+$`. Keys prefixed
//! with `file:` address uploaded files in form mode.
//!
//! ## Error report
//!
//! Failures are collected per field, in rule order, and serialize as:
//!
//! ```json
//! {
//!   "email": ["The email field must be a valid email address"],
//!   "age": ["The age field must be numeric value between 18 and 60"]
//! }
//! ```
//!
//! Misconfiguration (unknown rules, malformed parameters, duplicate
//! registration) is reported separately as [`ConfigError`].

#[cfg(feature = "config")]
pub mod config;
mod error;
mod flatten;
mod form;
mod registry;
mod rule;
mod rules;
mod validator;
mod value;


pub use error::{
    ApiValidationError, ConfigError, ErrorBody, ErrorReport, FieldErrorResponse, RuleError,
    RuleFailure, RuleResult,
};
pub use flatten::{flatten, is_zero_record, value_of, Flatten, Kind, Member, Record, Roller};
pub use form::{BoxError, Form, FormSource, FormValues};
pub use registry::RuleRegistry;
pub use rule::{override_message, RuleExpr, RuleFn, RuleInput};
pub use rules::builtin_names;
pub use validator::{
    Options, RuleTable, Validator, DECODE_ERROR_FIELD, DEFAULT_FORM_SIZE, DEFAULT_TAG_IDENTIFIER,
    DEFAULT_TAG_SEPARATOR, FILE_PREFIX,
};
pub use value::{Bool, FileHandle, Float32, Float64, Int, Int64, Nullable, Value};

/// Prelude module for validation
pub mod prelude {
    pub use crate::error::{ConfigError, ErrorReport, RuleError, RuleFailure, RuleResult};
    pub use crate::flatten::{Flatten, Kind, Member, Record};
    pub use crate::form::{Form, FormSource};
    pub use crate::registry::RuleRegistry;
    pub use crate::rule::RuleInput;
    pub use crate::rule_table;
    pub use crate::validator::{Options, RuleTable, Validator};
    pub use crate::value::{Bool, FileHandle, Float32, Float64, Int, Int64, Nullable, Value};
}
