//! Per-request holder of the signing secret.
//!
//! A [`SecretContext`] is created for each request-handling task and passed
//! explicitly to whatever needs the secret. Child tasks receive a snapshot
//! through [`SecretContext::spawn_child`]: later changes on either side never
//! reach the other. When a worker is returned to a pool its context must be
//! cleared, either directly with [`SecretContext::clear`] or by holding a
//! [`ContextGuard`] for the lifetime of the request.
//!
//! Secret memory is zeroed whenever it is replaced, cleared or dropped.

use std::fmt;
use std::future::Future;
use std::ops::{Deref, DerefMut};

use tokio::task::JoinHandle;
use zeroize::Zeroizing;

/// Holder of a single signing secret for one execution context.
#[derive(Default)]
pub struct SecretContext {
    secret: Option<Zeroizing<String>>,
}

impl SecretContext {
    /// Create a context with no secret; [`secret`](Self::secret) returns `""`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(Zeroizing::new(secret.into())),
        }
    }

    /// The current secret, or the empty string if none has been set.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.secret.as_deref().map_or("", String::as_str)
    }

    pub fn set_secret(&mut self, secret: impl Into<String>) {
        self.secret = Some(Zeroizing::new(secret.into()));
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.secret.is_some()
    }

    /// Snapshot this context for a child task.
    ///
    /// The child starts with the secret held right now and is independent
    /// from then on.
    #[must_use]
    pub fn spawn_child(&self) -> Self {
        Self {
            secret: self.secret.clone(),
        }
    }

    /// Release the stored secret.
    pub fn clear(&mut self) {
        if self.secret.take().is_some() {
            log::trace!("Secret context cleared");
        }
    }

    /// Borrow this context for the duration of one request.
    ///
    /// The returned guard clears the secret when dropped, so a pooled worker
    /// never carries one request's secret into the next.
    pub fn enter(&mut self) -> ContextGuard<'_> {
        ContextGuard { context: self }
    }
}

impl fmt::Debug for SecretContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = if self.is_set() { "<redacted>" } else { "<unset>" };
        f.debug_struct("SecretContext")
            .field("secret", &secret)
            .finish()
    }
}

/// Scoped access to a [`SecretContext`] that clears it on drop.
pub struct ContextGuard<'a> {
    context: &'a mut SecretContext,
}

impl Deref for ContextGuard<'_> {
    type Target = SecretContext;

    fn deref(&self) -> &SecretContext {
        self.context
    }
}

impl DerefMut for ContextGuard<'_> {
    fn deref_mut(&mut self) -> &mut SecretContext {
        self.context
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.clear();
    }
}

/// Spawn a tokio task that receives a snapshot of `parent`.
///
/// # Panics
///
/// Panics if called outside of a tokio runtime, like [`tokio::spawn`].
pub fn spawn_with_context<F, Fut>(parent: &SecretContext, task: F) -> JoinHandle<Fut::Output>
where
    F: FnOnce(SecretContext) -> Fut,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
{
    let child = parent.spawn_child();
    tokio::spawn(task(child))
}
