//! # fieldcheck
//!
//! Rule-based validation for HTTP forms, JSON bodies and nested records.
//!
//! Fields are described by a rule table (`field → ["rule", "rule:params"]`),
//! values come from a parsed request or from flattening a record, and every
//! failure is collected into an [`ErrorReport`] keyed by field name.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fieldcheck::prelude::*;
//!
//! #[derive(Default, Deserialize, Record)]
//! struct Signup {
//!     #[field(json = "email")]
//!     email: String,
//!     age: Int,
//!     address: Option<Address>,
//! }
//!
//! #[derive(Default, Deserialize, Record)]
//! struct Address {
//!     #[field(json = "zip")]
//!     zip: String,
//! }
//!
//! let validator = Validator::new(Options::new(rule_table! {
//!     "email" => ["required", "email"],
//!     "age" => ["required", "numeric_between:18,60"],
//!     "zip" => ["digits:5"],
//! }));
//!
//! let mut signup = Signup::default();
//! let report = validator.validate_json(body, &mut signup)?;
//! ensure_valid(report)?;
//! ```
//!
//! ## Forms and uploads
//!
//! ```rust,ignore
//! let mut req = Request::from_http(http_request, 1 << 20).await?;
//! let validator = Validator::new(Options::new(rule_table! {
//!     "username" => ["required", "alpha_dash"],
//!     "file:avatar" => ["ext:png,jpg", "mime:image/png,image/jpeg", "size:65536"],
//! }));
//! let report = validate_request(&validator, &mut req)?;
//! ```
//!
//! ## Custom rules
//!
//! ```rust,ignore
//! fn over9000(input: &RuleInput<'_>) -> RuleResult {
//!     let n = input.value.as_i64().unwrap_or_default();
//!     input.check(n > 9000, || format!("The {} field must be over 9000", input.field))
//! }
//!
//! RuleRegistry::init_global(|registry| registry.register("over9000", over9000))?;
//! ```
//!
//! ## Optional Features
//!
//! - `config` (default) - `Settings` loaded from `FIELDCHECK_*` environment
//!   variables and `.env` files

// Re-export the validation engine
pub use fieldcheck_validate::*;

// Re-export the transport adapter
pub use fieldcheck_core::{
    ensure_valid, json_body, multipart, sniff, validate_json_request, validate_request, ApiError,
    FieldError, ParsedForm, Request, RequestBuilder, Result,
};

// Re-export macros
pub use fieldcheck_macros::Record;

/// Prelude module - import everything you need with `use fieldcheck::prelude::*`
pub mod prelude {
    pub use fieldcheck_core::{
        ensure_valid, json_body, validate_json_request, validate_request, ApiError, Request,
        Result,
    };
    pub use fieldcheck_macros::Record;
    pub use fieldcheck_validate::prelude::*;

    #[cfg(feature = "config")]
    pub use fieldcheck_validate::config::Settings;

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, trace, warn};
}
