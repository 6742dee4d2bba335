//! Service settings for reply signing.
//!
//! Settings are read from TOML and merged with environment variables
//! prefixed with `SIGNED_REPLY__`, so `SIGNED_REPLY__SIGNING__SECRET`
//! overrides `signing.secret`.

use std::fmt;
use std::path::Path;
use std::str::{self, FromStr};

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::constants::{ENV_PREFIX, ENV_SEPARATOR};
use crate::error::ReplyError;
use crate::secret_context::SecretContext;

#[derive(Deserialize, Validate)]
#[validate(schema(function = "validate_signing"))]
pub struct Signing {
    /// Shared secret used to sign and verify replies.
    #[serde(default)]
    pub secret: String,
    /// Refuse to start without a non-empty secret.
    #[serde(default)]
    pub require_secret: bool,
}

impl fmt::Debug for Signing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signing")
            .field("secret", &"<redacted>")
            .field("require_secret", &self.require_secret)
            .finish()
    }
}

fn validate_signing(signing: &Signing) -> Result<(), ValidationError> {
    if signing.require_secret && signing.secret.is_empty() {
        return Err(ValidationError::new("secret_required"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct Logging {
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_log_level"))]
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    log::LevelFilter::from_str(level)
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_log_level"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct Settings {
    #[validate(nested)]
    pub signing: Signing,
    #[serde(default)]
    #[validate(nested)]
    pub logging: Logging,
}

impl Settings {
    /// Load the settings embedded at build time, with environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Configuration`] if the embedded TOML is invalid
    /// or fails validation.
    pub fn new() -> Result<Self, Report<ReplyError>> {
        let toml_bytes = include_bytes!("../../../signed-reply.toml");
        let toml_str = str::from_utf8(toml_bytes).change_context(ReplyError::Configuration {
            message: "embedded settings are not valid UTF-8".to_string(),
        })?;

        Self::from_toml(toml_str)
    }

    /// Parse settings from TOML, apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Configuration`] if the TOML cannot be parsed,
    /// required fields are missing or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<ReplyError>> {
        let environment = Environment::default()
            .prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(ReplyError::Configuration {
                message: "Failed to build configuration".to_string(),
            })?;

        let settings: Self = config
            .try_deserialize()
            .change_context(ReplyError::Configuration {
                message: "Failed to deserialize configuration".to_string(),
            })?;

        settings
            .validate()
            .change_context(ReplyError::Configuration {
                message: "Settings validation failed".to_string(),
            })?;

        Ok(settings)
    }

    /// Read settings from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Configuration`] if the file cannot be read or
    /// its content is rejected by [`Settings::from_toml`].
    pub fn from_file(path: &Path) -> Result<Self, Report<ReplyError>> {
        let content = std::fs::read_to_string(path).change_context(ReplyError::Configuration {
            message: format!("Failed to read settings file {}", path.display()),
        })?;
        log::debug!("Loading settings from {}", path.display());
        Self::from_toml(&content)
    }

    /// A fresh request context seeded with the configured secret.
    ///
    /// An empty configured secret yields an unset context.
    #[must_use]
    pub fn secret_context(&self) -> SecretContext {
        if self.signing.secret.is_empty() {
            SecretContext::new()
        } else {
            SecretContext::with_secret(self.signing.secret.as_str())
        }
    }

    /// The configured log level, falling back to `Info`.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.logging.level).unwrap_or(log::LevelFilter::Info)
    }
}
