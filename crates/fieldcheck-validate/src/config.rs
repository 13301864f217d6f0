//! Environment-driven validator settings.
//!
//! ```ignore
//! use fieldcheck_validate::config::{load_dotenv, Settings};
//!
//! load_dotenv();
//! let settings = Settings::from_env()?; // FIELDCHECK_REQUIRED_DEFAULT, FIELDCHECK_FORM_SIZE, ...
//! let options = Options::from_settings(&settings).with_rules(rules);
//! ```

use crate::validator::{DEFAULT_FORM_SIZE, DEFAULT_TAG_IDENTIFIER, DEFAULT_TAG_SEPARATOR};
use serde::Deserialize;

/// Prefix of the environment variables read by [`Settings::from_env`].
pub const ENV_PREFIX: &str = "FIELDCHECK_";

/// Validator settings that can come from the environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub required_default: bool,
    pub tag_identifier: String,
    pub tag_separator: String,
    pub form_size: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            required_default: false,
            tag_identifier: DEFAULT_TAG_IDENTIFIER.to_string(),
            tag_separator: DEFAULT_TAG_SEPARATOR.to_string(),
            form_size: DEFAULT_FORM_SIZE,
        }
    }
}

impl Settings {
    /// Read `FIELDCHECK_*` variables; unset ones keep their defaults.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env()
    }

    /// Like [`Settings::from_env`] over explicit `(key, value)` pairs.
    pub fn from_vars<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter(vars)
    }
}

/// Load a `.env` file from the current directory, if present.
///
/// Existing variables win over file entries.
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv() {
        tracing::debug!(error = %err, "no .env file loaded");
    }
}

/// Load environment variables from a specific file.
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) {
    if let Err(err) = dotenvy::from_path(path.as_ref()) {
        tracing::debug!(path = %path.as_ref().display(), error = %err, "env file not loaded");
    }
}
