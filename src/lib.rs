pub(crate) mod container;
pub(crate) mod errors;
pub(crate) mod inject;
pub(crate) mod lifetime;
pub(crate) mod loader;
pub(crate) mod token;

pub mod scope;

pub use container::{Container, Instance, LifetimeSelector};
pub use errors::{ConstructErrorKind, LoadErrorKind, ResolveErrorKind};
pub use inject::{build, build_with_scope, Declaration, FieldSet, Injectable};
pub use lifetime::Lifetime;
pub use loader::{LoadReport, Loader};
pub use scope::{current_scope, run_with_scope, run_with_scope_sync, ScopeId};
pub use token::Token;
