//! Ambient scope context.
//!
//! A scope is a named logical execution span. [`run_with_scope`] associates a
//! [`ScopeId`] with the dynamic extent of a future, and any code running
//! inside that extent, including code after an `.await`, can read it back
//! with [`current_scope`] without the id being threaded through arguments.
//!
//! The slot is task-local: two concurrently running spans never observe each
//! other's id, and leaving a span (by return, error or panic) restores the
//! surrounding value. Tasks handed to `tokio::spawn` start with an empty
//! slot; wrap the spawned future with [`inherit`] to carry the caller's
//! scope over.

use core::fmt::{self, Display, Formatter};
use std::{future::Future, sync::Arc};

tokio::task_local! {
    static CURRENT_SCOPE: ScopeId;
}

/// Identifier of a scope span, keying the container's scoped instance cache.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(Arc<str>);

impl ScopeId {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ScopeId {
    fn from(value: &str) -> Self {
        Self(Arc::from(value))
    }
}

impl From<String> for ScopeId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runs the future with the given scope id active for its entire dynamic
/// extent. Nested invocations shadow the outer id and restore it when the
/// inner span ends.
pub async fn run_with_scope<Fut>(scope_id: impl Into<ScopeId>, fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    CURRENT_SCOPE.scope(scope_id.into(), fut).await
}

/// Synchronous variant of [`run_with_scope`] for callers outside an async
/// context.
pub fn run_with_scope_sync<T>(scope_id: impl Into<ScopeId>, f: impl FnOnce() -> T) -> T {
    CURRENT_SCOPE.sync_scope(scope_id.into(), f)
}

/// Returns the innermost active scope id, or `None` outside any scope span.
#[must_use]
pub fn current_scope() -> Option<ScopeId> {
    CURRENT_SCOPE.try_with(Clone::clone).ok()
}

/// Wraps a future so it runs under the scope that is active at the call
/// site, if any.
///
/// Spawned tasks do not carry task-locals, so a bare `tokio::spawn(fut)`
/// inside a scope span would observe no scope. Use
/// `tokio::spawn(scope::inherit(fut))` to keep the span's id.
pub fn inherit<Fut>(fut: Fut) -> impl Future<Output = Fut::Output>
where
    Fut: Future,
{
    let scope_id = current_scope();
    async move {
        match scope_id {
            Some(scope_id) => CURRENT_SCOPE.scope(scope_id, fut).await,
            None => fut.await,
        }
    }
}
