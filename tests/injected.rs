//! Full pipeline: loader populates a container, use cases are built through
//! the injected-construction protocol, lifetimes decide what is shared.

use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use wirebox::{boxed, injectable, run_with_scope, Container, Lifetime, Loader};

trait UserRepository: Send + Sync {
    fn create(&self, name: &str, email: &str);
    fn calls(&self) -> u8;
}

type RepositoryService = Box<dyn UserRepository + Send + Sync>;

injectable! {
    struct InMemoryUserRepository {
        calls: AtomicU8,
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create(&self, _name: &str, _email: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn calls(&self) -> u8 {
        self.calls.load(Ordering::SeqCst)
    }
}

trait UserService: Send + Sync {
    fn create(&self, name: &str, email: &str);
    fn repository_calls(&self) -> u8;
}

type UserServiceHandle = Box<dyn UserService + Send + Sync>;

injectable! {
    struct InMemoryUserService {
        inject repository: RepositoryService,
    }
}

impl UserService for InMemoryUserService {
    fn create(&self, name: &str, email: &str) {
        self.repository.create(name, email);
    }

    fn repository_calls(&self) -> u8 {
        self.repository.calls()
    }
}

injectable! {
    struct RegisterUser {
        inject service: UserServiceHandle,
    }
}

impl RegisterUser {
    fn execute(&self, name: &str, email: &str) {
        self.service.create(name, email);
    }

    fn repository_calls(&self) -> u8 {
        self.service.repository_calls()
    }
}

fn load(lifetime: Lifetime) -> Container {
    let container = Container::new();
    Loader::new()
        .unit("user.units", move |container| {
            let repository = container.register_injectable(|repository: InMemoryUserRepository| {
                boxed!(repository; UserRepository + Send + Sync)
            });
            match lifetime {
                Lifetime::Transient => repository.transient(),
                Lifetime::Singleton => repository.singleton(),
                Lifetime::Scoped => repository.scoped(),
            }

            let service = container
                .register_injectable(|service: InMemoryUserService| boxed!(service; UserService + Send + Sync));
            match lifetime {
                Lifetime::Transient => service.transient(),
                Lifetime::Singleton => service.singleton(),
                Lifetime::Scoped => service.scoped(),
            }

            Ok(())
        })
        .load(&container)
        .unwrap();
    container
}

#[test]
fn test_transient_injection_is_isolated() {
    let container = load(Lifetime::Transient);

    let use_case = wirebox::build::<RegisterUser>(&container).unwrap();
    use_case.execute("John Doe", "johndoe@example.com");
    assert_eq!(use_case.repository_calls(), 1);

    let other = wirebox::build::<RegisterUser>(&container).unwrap();
    assert_eq!(other.repository_calls(), 0);
}

#[test]
fn test_singleton_injection_is_shared() {
    let container = load(Lifetime::Singleton);

    let use_case = wirebox::build::<RegisterUser>(&container).unwrap();
    use_case.execute("John Doe", "johndoe@example.com");
    assert_eq!(use_case.repository_calls(), 1);

    let other = wirebox::build::<RegisterUser>(&container).unwrap();
    assert_eq!(other.repository_calls(), 1);
    assert!(Arc::ptr_eq(&use_case.service, &other.service));
}

#[tokio::test]
async fn test_scoped_injection_is_shared_per_scope() {
    let container = load(Lifetime::Scoped);

    run_with_scope("scope-1", {
        let container = container.clone();
        async move {
            let use_case = wirebox::build::<RegisterUser>(&container).unwrap();
            use_case.execute("John Doe", "johndoe@example.com");
            assert_eq!(use_case.repository_calls(), 1);

            let other = wirebox::build::<RegisterUser>(&container).unwrap();
            assert_eq!(other.repository_calls(), 1);
            assert!(Arc::ptr_eq(&use_case.service, &other.service));
        }
    })
    .await;

    run_with_scope("scope-2", async move {
        let use_case = wirebox::build::<RegisterUser>(&container).unwrap();
        assert_eq!(use_case.repository_calls(), 0);
    })
    .await;
}

#[tokio::test]
async fn test_scoped_injected_fields_partition_by_scope() {
    let container = load(Lifetime::Scoped);

    let in_scope_1 = run_with_scope("scope-1", {
        let container = container.clone();
        async move { wirebox::build::<RegisterUser>(&container).unwrap() }
    })
    .await;
    let in_scope_2 = run_with_scope("scope-2", {
        let container = container.clone();
        async move { wirebox::build::<RegisterUser>(&container).unwrap() }
    })
    .await;

    assert!(!Arc::ptr_eq(&in_scope_1.service, &in_scope_2.service));
}

#[test]
fn test_clear_between_runs_discards_registrations() {
    let container = load(Lifetime::Singleton);
    assert!(wirebox::build::<RegisterUser>(&container).is_ok());

    container.clear();
    assert!(wirebox::build::<RegisterUser>(&container).is_err());
}
