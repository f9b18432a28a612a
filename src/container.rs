use parking_lot::Mutex;
use std::{any::Any, collections::BTreeMap, sync::Arc};
use tracing::{debug, error, info_span};

use crate::{
    errors::ResolveErrorKind,
    inject::{build_with_scope, Injectable},
    lifetime::Lifetime,
    scope::ScopeId,
    token::Token,
};

/// Type-erased resolved instance, downcast to `Arc<S>` by typed callers.
pub type Instance = Arc<dyn Any + Send + Sync>;

type BoxedConstructor = Arc<dyn Fn(&Container, Option<&ScopeId>) -> Result<Instance, ResolveErrorKind> + Send + Sync>;

struct Registration {
    constructor: BoxedConstructor,
    lifetime: Lifetime,
    /// Lazily filled singleton slot; unused for other lifetimes.
    instance: Option<Instance>,
}

/// Registration table, lifetime policy and resolution algorithm.
///
/// Cloning the container is cheap and clones share the same state, so a
/// container registered at start-up can be handed to every consumer.
#[derive(Clone, Default)]
pub struct Container {
    inner: Arc<Mutex<ContainerInner>>,
}

#[derive(Default)]
struct ContainerInner {
    registrations: BTreeMap<Token, Registration>,
    scopes: BTreeMap<ScopeId, BTreeMap<Token, Instance>>,
}

impl Container {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `Token::of::<S>()` to a zero-argument constructor with the
    /// default transient lifetime. The returned selector mutates the
    /// lifetime of this registration in place:
    ///
    /// ```rust
    /// use wirebox::Container;
    ///
    /// struct Clock;
    ///
    /// let container = Container::new();
    /// container.register(|| Clock).singleton();
    /// ```
    ///
    /// Re-registering the same token overwrites the previous binding and
    /// discards its cached singleton and scoped instances.
    pub fn register<S, C>(&self, construct: C) -> LifetimeSelector<'_>
    where
        S: Send + Sync + 'static,
        C: Fn() -> S + Send + Sync + 'static,
    {
        self.insert_registration(Token::of::<S>(), Arc::new(move |_, _| Ok(Arc::new(construct()) as Instance)))
    }

    /// Binds `Token::of::<S>()` to an implementation built through the
    /// injected-construction protocol, then coerced into the service type:
    ///
    /// ```rust
    /// use wirebox::{boxed, injectable, Container};
    ///
    /// trait UserRepo: Send + Sync {}
    ///
    /// injectable! {
    ///     struct InMemoryUserRepo {}
    /// }
    ///
    /// impl UserRepo for InMemoryUserRepo {}
    ///
    /// let container = Container::new();
    /// container
    ///     .register_injectable(|repo: InMemoryUserRepo| boxed!(repo; UserRepo + Send + Sync))
    ///     .scoped();
    /// ```
    ///
    /// The implementation's declared dependencies are resolved with the same
    /// scope id the outer resolution ran under.
    pub fn register_injectable<S, I, C>(&self, into_service: C) -> LifetimeSelector<'_>
    where
        S: Send + Sync + 'static,
        I: Injectable,
        C: Fn(I) -> S + Send + Sync + 'static,
    {
        self.insert_registration(
            Token::of::<S>(),
            Arc::new(move |container, scope| {
                let implementation =
                    build_with_scope::<I>(container, scope).map_err(|err| ResolveErrorKind::Construction(Box::new(err)))?;
                Ok(Arc::new(into_service(implementation)) as Instance)
            }),
        )
    }

    fn insert_registration(&self, token: Token, constructor: BoxedConstructor) -> LifetimeSelector<'_> {
        {
            let mut inner = self.inner.lock();
            inner.registrations.insert(
                token,
                Registration {
                    constructor,
                    lifetime: Lifetime::Transient,
                    instance: None,
                },
            );
            // A re-registered token must not keep serving instances built
            // from the previous implementation.
            for scoped in inner.scopes.values_mut() {
                scoped.remove(&token);
            }
        }

        debug!(token = token.name(), "Registered");

        LifetimeSelector { container: self, token }
    }

    /// Resolves the service type `S` per the lifetime of its registration.
    ///
    /// # Errors
    /// - [`ResolveErrorKind::UnregisteredToken`] if `Token::of::<S>()` has no registration
    /// - [`ResolveErrorKind::MissingScope`] if the registration is scoped and `scope` is `None`
    /// - [`ResolveErrorKind::Construction`] if an injectable implementation failed to build
    pub fn resolve<S>(&self, scope: Option<&ScopeId>) -> Result<Arc<S>, ResolveErrorKind>
    where
        S: Send + Sync + 'static,
    {
        let token = Token::of::<S>();
        self.resolve_token(token, scope)?.downcast::<S>().map_err(|_| {
            let err = ResolveErrorKind::IncorrectType { token };
            error!("{err}");
            err
        })
    }

    /// Type-erased resolution, dispatching on the registration's lifetime.
    ///
    /// Populating the singleton slot or a scope cache entry is an observable
    /// side effect of this otherwise read operation.
    #[allow(clippy::missing_errors_doc)]
    pub fn resolve_token(&self, token: Token, scope: Option<&ScopeId>) -> Result<Instance, ResolveErrorKind> {
        let span = info_span!("resolve", token = token.short_name(), scope = scope.map(ScopeId::as_str));
        let _guard = span.enter();

        let (constructor, lifetime) = {
            let inner = self.inner.lock();
            let Some(registration) = inner.registrations.get(&token) else {
                let err = ResolveErrorKind::UnregisteredToken(token);
                error!("{err}");
                return Err(err);
            };

            match registration.lifetime {
                Lifetime::Transient => {}
                Lifetime::Singleton => {
                    if let Some(instance) = &registration.instance {
                        debug!("Found in singleton cache");
                        return Ok(instance.clone());
                    }
                }
                Lifetime::Scoped => {
                    let Some(scope_id) = scope else {
                        let err = ResolveErrorKind::MissingScope(token);
                        error!("{err}");
                        return Err(err);
                    };
                    if let Some(instance) = inner.scopes.get(scope_id).and_then(|scoped| scoped.get(&token)) {
                        debug!("Found in scope cache");
                        return Ok(instance.clone());
                    }
                }
            }

            (registration.constructor.clone(), registration.lifetime)
        };

        // The lock is not held here: constructors of injectable
        // implementations re-enter `resolve_token` for their own declared
        // dependencies.
        let instance = constructor(self, scope)?;

        match lifetime {
            Lifetime::Transient => Ok(instance),
            Lifetime::Singleton => {
                let mut inner = self.inner.lock();
                match inner.registrations.get_mut(&token) {
                    // First write wins: a resolution that lost the race to
                    // fill the slot hands back the cached instance instead
                    // of the one it built.
                    Some(registration) if Arc::ptr_eq(&registration.constructor, &constructor) => {
                        debug!("Cached");
                        Ok(registration.instance.get_or_insert(instance).clone())
                    }
                    // Re-registered or cleared mid-construction; the new
                    // binding must not cache an instance of the old one.
                    _ => Ok(instance),
                }
            }
            Lifetime::Scoped => {
                let scope_id = scope.expect("scoped resolution checked the scope id before constructing").clone();

                let mut inner = self.inner.lock();
                let still_current = inner
                    .registrations
                    .get(&token)
                    .is_some_and(|registration| Arc::ptr_eq(&registration.constructor, &constructor));
                if !still_current {
                    return Ok(instance);
                }

                debug!("Cached in scope");
                Ok(inner.scopes.entry(scope_id).or_default().entry(token).or_insert(instance).clone())
            }
        }
    }

    /// Whether the token currently has a registration.
    #[must_use]
    pub fn contains(&self, token: Token) -> bool {
        self.inner.lock().registrations.contains_key(&token)
    }

    /// Empties the registration table and every instance cache under a
    /// single lock acquisition.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.registrations.clear();
        inner.scopes.clear();

        debug!("Container cleared");
    }
}

/// Fluent follow-up of a `register` call, setting the lifetime of the
/// registration it was returned for. Without a call the registration stays
/// transient.
pub struct LifetimeSelector<'a> {
    container: &'a Container,
    token: Token,
}

impl LifetimeSelector<'_> {
    pub fn transient(self) {
        self.set(Lifetime::Transient);
    }

    pub fn singleton(self) {
        self.set(Lifetime::Singleton);
    }

    pub fn scoped(self) {
        self.set(Lifetime::Scoped);
    }

    fn set(self, lifetime: Lifetime) {
        if let Some(registration) = self.container.inner.lock().registrations.get_mut(&self.token) {
            registration.lifetime = lifetime;
        }
    }
}
