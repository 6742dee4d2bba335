//! Error types for signed replies.
//!
//! Signing and verification never fail; these errors cover the ambient
//! concerns around them: loading settings and turning payloads into JSON.

use core::error::Error;

use derive_more::Display;

/// Errors surfaced by the signed reply crate.
///
/// Carried inside [`error_stack::Report`] so callers can attach context as the
/// error travels up.
#[derive(Debug, Display)]
pub enum ReplyError {
    /// Settings could not be loaded or failed validation.
    #[display("Configuration error: {message}")]
    Configuration { message: String },

    /// A result payload could not be represented as JSON.
    #[display("Serialization error: {message}")]
    Serialization { message: String },

    /// Serialized reply data could not be turned back into a reply.
    #[display("Invalid reply: {message}")]
    InvalidReply { message: String },
}

impl Error for ReplyError {}
