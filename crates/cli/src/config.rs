//! Settings loading and secret resolution.
//!
//! Settings are loaded from a TOML file and merged with environment variables
//! prefixed with `SIGNED_REPLY__`. Without `--config` the defaults embedded in
//! the common crate are used, which still honour the environment.

use std::path::{Path, PathBuf};

use signed_reply_common::secret_context::SecretContext;
use signed_reply_common::settings::Settings;

use crate::error::CliError;

/// Load settings from `file`, or the embedded defaults when none is given.
///
/// Progress goes to the logger, never to stdout, which carries command output.
pub(crate) fn load_settings(file: Option<&Path>) -> Result<Settings, CliError> {
    let settings = match file {
        Some(path) => Settings::from_file(path),
        None => Settings::new(),
    };

    settings.map_err(|e| CliError::Config(format!("Failed to load settings: {e:?}")))
}

/// Build the secret context for this invocation.
///
/// An explicit secret wins over the configured one. Fails when neither
/// yields a non-empty secret.
pub(crate) fn resolve_secret(
    secret: Option<String>,
    file: Option<&Path>,
) -> Result<SecretContext, CliError> {
    if let Some(secret) = secret.filter(|s| !s.is_empty()) {
        return Ok(SecretContext::with_secret(secret));
    }

    let context = load_settings(file)?.secret_context();
    if context.is_set() {
        Ok(context)
    } else {
        Err(CliError::MissingSecret)
    }
}

/// Validate a settings file.
pub fn validate(file: PathBuf) -> Result<(), CliError> {
    let settings = load_settings(Some(&file))?;

    println!("Configuration is valid");
    println!("  File: {}", file.display());
    println!(
        "  Secret: {}",
        if settings.signing.secret.is_empty() {
            "not set"
        } else {
            "set"
        }
    );
    println!("  Log level: {}", settings.log_level());

    Ok(())
}
