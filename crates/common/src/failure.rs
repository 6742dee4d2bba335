//! Structured description of a caught failure.

use core::error::Error;
use std::fmt;

/// A caught failure reduced to a classification and a description.
///
/// Error replies built from a `Failure` carry `"<kind>: <detail>"` as their
/// message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    kind: String,
    detail: String,
}

impl Failure {
    #[must_use]
    pub fn new(kind: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            detail: detail.into(),
        }
    }

    /// Describe `err` under the given classification, using its `Display`
    /// output as the detail.
    #[must_use]
    pub fn from_error<E: Error + ?Sized>(kind: impl Into<String>, err: &E) -> Self {
        Self::new(kind, err.to_string())
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}
