use core::fmt::{self, Display, Formatter};

/// Sharing policy for resolved instances.
///
/// The enum is closed: every `match` on it is exhaustive, so an unrecognized
/// lifetime value cannot reach the resolution algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// A fresh instance per resolution, never cached.
    Transient,
    /// At most one instance per token for the lifetime of the container,
    /// created lazily on first resolution.
    Singleton,
    /// At most one instance per `(token, scope id)` pair, created lazily on
    /// first resolution within that scope.
    Scoped,
}

impl Display for Lifetime {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lifetime::Transient => "transient",
            Lifetime::Singleton => "singleton",
            Lifetime::Scoped => "scoped",
        })
    }
}
