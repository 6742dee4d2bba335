//! Reply envelope returned by service API calls.
//!
//! A [`Reply`] carries an outcome flag, an optional failure message and a map
//! of named results. Every reply gets a random nonce at construction so two
//! otherwise identical replies never share a signature. Signing lives in
//! [`crate::signing`].

use std::fmt;

use error_stack::{Report, ResultExt};
use rand::rngs::ThreadRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::canonical::render_results;
use crate::error::ReplyError;
use crate::failure::Failure;

/// Response envelope for the service API.
///
/// Field names are the wire names; a transport layer must keep them and
/// their values intact for verification to succeed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub(crate) success: bool,
    pub(crate) random: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) results: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) hash: Option<String>,
}

impl Reply {
    fn with_random(success: bool, random: i64) -> Self {
        Self {
            success,
            random,
            message: None,
            results: Map::new(),
            hash: None,
        }
    }

    /// Successful reply without results.
    #[must_use]
    pub fn success() -> Self {
        ReplyFactory::<ThreadRng>::default().success()
    }

    /// Successful reply carrying one named result.
    #[must_use]
    pub fn success_with(name: impl Into<String>, value: impl Into<Value>) -> Self {
        ReplyFactory::<ThreadRng>::default().success_with(name, value)
    }

    /// Failed reply with a caller supplied message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        ReplyFactory::<ThreadRng>::default().error(message)
    }

    /// Failed reply describing a caught failure as `"<kind>: <detail>"`.
    #[must_use]
    pub fn failure(failure: &Failure) -> Self {
        ReplyFactory::<ThreadRng>::default().failure(failure)
    }

    /// Insert a result, replacing any previous value under the same name.
    ///
    /// Changing results after signing invalidates the signature.
    pub fn add_result(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.results.insert(name.into(), value.into());
    }

    /// Insert any serializable payload as a result.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Serialization`] if the payload cannot be
    /// represented as JSON (for example a map with non-string keys).
    pub fn try_add_result<T: Serialize + ?Sized>(
        &mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<(), Report<ReplyError>> {
        let name = name.into();
        let value = serde_json::to_value(value).change_context(ReplyError::Serialization {
            message: format!("Failed to serialize result '{name}'"),
        })?;
        self.results.insert(name, value);
        Ok(())
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.success
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub fn results(&self) -> &Map<String, Value> {
        &self.results
    }

    #[must_use]
    pub fn result(&self, name: &str) -> Option<&Value> {
        self.results.get(name)
    }

    /// The nonce drawn when this reply was created.
    #[must_use]
    pub fn random(&self) -> i64 {
        self.random
    }

    /// The signature digest, present once the reply has been signed.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    #[must_use]
    pub fn is_signed(&self) -> bool {
        self.hash.is_some()
    }

    /// Serialize to the JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, Report<ReplyError>> {
        serde_json::to_string(self).change_context(ReplyError::Serialization {
            message: "Failed to serialize reply".to_string(),
        })
    }

    /// Parse a reply from its JSON wire form.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyError::InvalidReply`] if the input is not a reply.
    pub fn from_json(json: &str) -> Result<Self, Report<ReplyError>> {
        serde_json::from_str(json).change_context(ReplyError::InvalidReply {
            message: "Failed to parse reply JSON".to_string(),
        })
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reply Success: {}", self.success)?;
        if let Some(message) = &self.message {
            write!(f, ", Message: {message}")?;
        }
        write!(f, ", Results: {}", render_results(&self.results))
    }
}

/// Builds replies drawing nonces from an owned random source.
///
/// The `Reply::success`/`Reply::error` shortcuts use a factory over the
/// calling thread's generator. Services that want a seeded or otherwise
/// dedicated source keep their own factory.
#[derive(Debug)]
pub struct ReplyFactory<R = ThreadRng> {
    rng: R,
}

impl<R: Rng> ReplyFactory<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn next(&mut self, success: bool) -> Reply {
        Reply::with_random(success, self.rng.gen())
    }

    #[must_use]
    pub fn success(&mut self) -> Reply {
        self.next(true)
    }

    #[must_use]
    pub fn success_with(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Reply {
        let mut reply = self.next(true);
        reply.add_result(name, value);
        reply
    }

    #[must_use]
    pub fn error(&mut self, message: impl Into<String>) -> Reply {
        let mut reply = self.next(false);
        reply.message = Some(message.into());
        reply
    }

    #[must_use]
    pub fn failure(&mut self, failure: &Failure) -> Reply {
        self.error(failure.to_string())
    }
}

impl Default for ReplyFactory<ThreadRng> {
    fn default() -> Self {
        Self::new(rand::thread_rng())
    }
}
