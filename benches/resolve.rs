#![allow(dead_code)]

use criterion::{criterion_group, criterion_main, Criterion};
use wirebox::{injectable, Container, ScopeId};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("resolve_transient", |b| {
        struct A;

        let container = Container::new();
        container.register(|| A).transient();

        b.iter(|| container.resolve::<A>(None).unwrap());
    })
    .bench_function("resolve_singleton", |b| {
        struct A;

        let container = Container::new();
        container.register(|| A).singleton();

        b.iter(|| container.resolve::<A>(None).unwrap());
    })
    .bench_function("resolve_scoped", |b| {
        struct A;

        let container = Container::new();
        container.register(|| A).scoped();
        let scope = ScopeId::from("bench");

        b.iter(|| container.resolve::<A>(Some(&scope)).unwrap());
    })
    .bench_function("build_injected_chain", |b| {
        struct A;

        injectable! {
            struct B {
                inject a: A,
            }
        }

        injectable! {
            struct C {
                inject b: B,
            }
        }

        let container = Container::new();
        container.register(|| A).singleton();
        container.register_injectable(|b: B| b).singleton();
        container.register_injectable(|c: C| c).transient();

        b.iter(|| container.resolve::<C>(None).unwrap());
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
