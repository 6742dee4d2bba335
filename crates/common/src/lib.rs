//! Signed replies for the service API.
//!
//! This crate provides the reply envelope returned by API calls together
//! with the protocol that makes it tamper evident: a process holding a
//! shared secret signs the reply, and a receiver holding the same secret
//! verifies that nothing changed on the way.
//!
//! # Modules
//!
//! - [`canonical`]: Canonical string rendering of a reply for signing
//! - [`constants`]: Digest length and environment variable naming
//! - [`error`]: Error types and error handling utilities
//! - [`failure`]: Structured description of caught failures
//! - [`logging`]: Logger initialization
//! - [`reply`]: Reply envelope and its factories
//! - [`secret_context`]: Per-request holder of the signing secret
//! - [`settings`]: Configuration management and validation
//! - [`signing`]: SHA-256 signing and verification of replies
//! - [`test_support`]: Testing utilities
//!
//! # Example
//!
//! ```
//! use signed_reply_common::reply::Reply;
//! use signed_reply_common::secret_context::SecretContext;
//!
//! let ctx = SecretContext::with_secret("mysecret");
//! let reply = Reply::success_with_and_sign("dummy", "foo", &ctx);
//!
//! assert!(reply.verify("mysecret"));
//! assert!(!reply.verify("nosecrets"));
//! ```

pub mod canonical;
pub mod constants;
pub mod error;
pub mod failure;
pub mod logging;
pub mod reply;
pub mod secret_context;
pub mod settings;
pub mod signing;
