use crate::token::Token;

/// Failure of a single container resolution.
///
/// The container does no local recovery: every variant is surfaced
/// synchronously to the caller of `resolve`, and through it to whatever
/// triggered the construction in progress.
#[derive(thiserror::Error, Debug)]
pub enum ResolveErrorKind {
    #[error("token not registered: {0}")]
    UnregisteredToken(Token),
    #[error("scope id required to resolve scoped token {0}")]
    MissingScope(Token),
    #[error("constructor for token {token} produced an incompatible instance")]
    IncorrectType { token: Token },
    #[error(transparent)]
    Construction(Box<ConstructErrorKind>),
}

/// Failure of the injected-construction protocol.
///
/// Any variant aborts the construction in progress: no partially populated
/// object is handed to the caller.
#[derive(thiserror::Error, Debug)]
pub enum ConstructErrorKind {
    #[error("failed to resolve declared field `{field}`")]
    Resolve {
        field: &'static str,
        #[source]
        source: Box<ResolveErrorKind>,
    },
    #[error("no resolved instance for declared field `{field}`")]
    MissingField { field: &'static str },
    #[error("resolved instance for field `{field}` has an unexpected service type")]
    FieldType { field: &'static str },
}

/// Failure of the registration loader.
#[derive(thiserror::Error, Debug)]
pub enum LoadErrorKind {
    #[error("registration unit `{name}` failed")]
    Unit {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}
