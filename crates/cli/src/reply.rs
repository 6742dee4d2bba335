//! Reply creation, signing and verification commands.

use std::fs;
use std::path::Path;

use serde_json::Value;
use signed_reply_common::reply::Reply;
use signed_reply_common::secret_context::SecretContext;

use crate::error::CliError;

/// Parse a `key=value` result argument.
///
/// The value is read as JSON when it parses, otherwise kept as a string, so
/// `count=3` stores a number and `worker=rig-1` a string.
pub(crate) fn parse_result(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{arg}'"))?;
    if key.is_empty() {
        return Err(format!("empty result name in '{arg}'"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Build a reply and optionally sign it, returning its JSON form.
pub fn create(
    error: Option<String>,
    results: Vec<(String, Value)>,
    context: Option<&SecretContext>,
) -> Result<String, CliError> {
    let mut reply = match error {
        Some(message) => Reply::error(message),
        None => Reply::success(),
    };
    for (name, value) in results {
        reply.add_result(name, value);
    }
    if let Some(context) = context {
        reply.sign_with_context(context);
    }

    log::debug!("Created {reply}");
    encode(&reply)
}

/// Sign the reply stored at `path`, returning the signed JSON.
pub fn sign_file(path: &Path, context: &SecretContext) -> Result<String, CliError> {
    let mut reply = read_reply(path)?;
    if reply.is_signed() {
        log::warn!("Replacing existing hash in {}", path.display());
    }
    reply.sign_with_context(context);
    encode(&reply)
}

/// Verify the reply stored at `path`.
pub fn verify_file(path: &Path, context: &SecretContext) -> Result<bool, CliError> {
    let reply = read_reply(path)?;
    Ok(reply.verify_with_context(context))
}

fn read_reply(path: &Path) -> Result<Reply, CliError> {
    let content = fs::read_to_string(path)?;
    Reply::from_json(&content).map_err(|e| CliError::Json(format!("{e:?}")))
}

fn encode(reply: &Reply) -> Result<String, CliError> {
    reply.to_json().map_err(|e| CliError::Json(format!("{e:?}")))
}
