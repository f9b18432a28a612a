use tracing::{debug, info_span};

use crate::{
    container::{Container, Instance},
    errors::ConstructErrorKind,
    scope::{self, ScopeId},
    token::Token,
};

use std::sync::Arc;

/// One declared dependency of an injectable type: the field to populate and
/// the token to resolve it from.
///
/// Declarations are matched by field identity, never by structural type:
/// two fields declaring the same token are resolved separately.
#[derive(Debug, Clone, Copy)]
pub struct Declaration {
    pub field: &'static str,
    pub token: Token,
}

/// A type whose dependencies are populated from the container before the
/// constructed value is handed to its caller.
///
/// Construction is two-phase: [`build`] resolves every entry of
/// [`declarations`](Self::declarations) into a [`FieldSet`], then hands the
/// set to [`inject`](Self::inject), which returns the fully populated value.
/// Either phase failing aborts the construction; no partially injected value
/// escapes.
///
/// Implementations are normally generated by the [`injectable!`] macro.
pub trait Injectable: Sized + 'static {
    /// The static dependency table of this type.
    fn declarations() -> &'static [Declaration];

    /// Assembles the value from the resolved field set.
    ///
    /// # Errors
    /// Returns [`ConstructErrorKind`] if the set is missing a declared field
    /// or an entry does not downcast to the field's service type.
    fn inject(fields: FieldSet) -> Result<Self, ConstructErrorKind>;
}

/// Resolved instances for one construction, keyed by declared field name.
#[derive(Default)]
pub struct FieldSet {
    entries: Vec<(&'static str, Instance)>,
}

impl FieldSet {
    #[must_use]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn insert(&mut self, field: &'static str, instance: Instance) {
        self.entries.push((field, instance));
    }

    /// Removes the entry for `field` and downcasts it to the declared
    /// service type.
    ///
    /// # Errors
    /// - [`ConstructErrorKind::MissingField`] if no entry for `field` exists
    /// - [`ConstructErrorKind::FieldType`] if the entry holds a different service type
    pub fn take<S>(&mut self, field: &'static str) -> Result<Arc<S>, ConstructErrorKind>
    where
        S: Send + Sync + 'static,
    {
        let position = self
            .entries
            .iter()
            .position(|(name, _)| *name == field)
            .ok_or(ConstructErrorKind::MissingField { field })?;
        self.entries
            .swap_remove(position)
            .1
            .downcast::<S>()
            .map_err(|_| ConstructErrorKind::FieldType { field })
    }
}

/// Builds `I` through the injected-construction protocol, reading the
/// ambient scope once at construction time.
///
/// # Errors
/// Returns [`ConstructErrorKind::Resolve`] naming the first declared field
/// whose resolution failed; the value is never constructed on that path.
pub fn build<I: Injectable>(container: &Container) -> Result<I, ConstructErrorKind> {
    build_with_scope(container, scope::current_scope().as_ref())
}

/// [`build`] with an explicit scope id instead of the ambient one.
#[allow(clippy::missing_errors_doc)]
pub fn build_with_scope<I: Injectable>(container: &Container, scope: Option<&ScopeId>) -> Result<I, ConstructErrorKind> {
    let span = info_span!(
        "build",
        implementation = Token::of::<I>().short_name(),
        scope = scope.map(ScopeId::as_str),
    );
    let _guard = span.enter();

    let declarations = I::declarations();
    let mut fields = FieldSet::with_capacity(declarations.len());
    for &Declaration { field, token } in declarations {
        let instance = container.resolve_token(token, scope).map_err(|err| ConstructErrorKind::Resolve {
            field,
            source: Box::new(err),
        })?;
        fields.insert(field, instance);
    }

    debug!(fields = declarations.len(), "Declarations resolved");

    I::inject(fields)
}

/// Declares a struct with injected dependency fields and generates its
/// [`Injectable`] impl.
///
/// Fields marked `inject` become `Arc<service type>` slots resolved from the
/// container; remaining fields (listed after the injected ones) are filled
/// with `Default::default()`:
///
/// ```rust
/// use wirebox::injectable;
///
/// trait UserRepo: Send + Sync {}
///
/// injectable! {
///     pub struct RegisterUser {
///         inject repo: Box<dyn UserRepo + Send + Sync>,
///         attempts: u32,
///     }
/// }
/// ```
#[macro_export]
macro_rules! injectable {
    (@munch
        [$($meta:tt)*] [$vis:vis] $name:ident
        deps = [$($deps:tt)*]
        rest = [inject $dep_vis:vis $dep:ident : $dep_ty:ty, $($rest:tt)*]
    ) => {
        $crate::injectable!(@munch
            [$($meta)*] [$vis] $name
            deps = [$($deps)* { $dep_vis $dep : $dep_ty }]
            rest = [$($rest)*]
        );
    };
    (@munch
        [$($meta:tt)*] [$vis:vis] $name:ident
        deps = [$({ $dep_vis:vis $dep:ident : $dep_ty:ty })*]
        rest = [$($field_vis:vis $field:ident : $field_ty:ty,)*]
    ) => {
        $($meta)*
        $vis struct $name {
            $($dep_vis $dep: ::std::sync::Arc<$dep_ty>,)*
            $($field_vis $field: $field_ty,)*
        }

        impl $crate::Injectable for $name {
            fn declarations() -> &'static [$crate::Declaration] {
                static DECLARATIONS: ::std::sync::OnceLock<::std::vec::Vec<$crate::Declaration>> = ::std::sync::OnceLock::new();
                DECLARATIONS.get_or_init(|| ::std::vec![
                    $($crate::Declaration {
                        field: ::core::stringify!($dep),
                        token: $crate::Token::of::<$dep_ty>(),
                    },)*
                ])
            }

            #[allow(unused_mut, unused_variables)]
            fn inject(mut fields: $crate::FieldSet) -> ::core::result::Result<Self, $crate::ConstructErrorKind> {
                ::core::result::Result::Ok(Self {
                    $($dep: fields.take::<$dep_ty>(::core::stringify!($dep))?,)*
                    $($field: ::core::default::Default::default(),)*
                })
            }
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($body:tt)*
        }
    ) => {
        $crate::injectable!(@munch
            [$(#[$meta])*] [$vis] $name
            deps = []
            rest = [$($body)*]
        );
    };
}

/// Creates a `Box<dyn Trait>` from a value, optionally including supertraits.
///
/// # Syntax
/// ```text
/// boxed!(value; Trait [+ SuperTrait1 [+ SuperTrait2 ...]])
/// ```
///
/// # Examples
/// ```rust
/// use wirebox::boxed;
///
/// trait UserRepo {}
///
/// struct InMemoryUserRepo;
///
/// impl UserRepo for InMemoryUserRepo {}
///
/// let repo: Box<dyn UserRepo + Send + Sync> = boxed!(InMemoryUserRepo; UserRepo + Send + Sync);
/// ```
#[macro_export]
macro_rules! boxed {
    ($val:expr ; $trait:tt $($super_traits:tt)*) => {{
        Box::new($val) as Box<dyn $r#trait $($super_traits)*>
    }};
}
