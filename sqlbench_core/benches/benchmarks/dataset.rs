use criterion::{Criterion, criterion_group};
use sqlbench_core::dataset::{generate, insert, rng};
use sqlbench_drivers::MockConnection;
use tokio::runtime::Runtime;

pub fn generate_benchmark(criterion: &mut Criterion) {
    criterion.bench_function("generate-100000", |bencher| {
        bencher.iter(|| generate(100_000, &mut rng(Some(42))));
    });
}

pub fn insert_benchmark(criterion: &mut Criterion) {
    let users = generate(10_000, &mut rng(Some(42)));
    criterion.bench_function("insert-10000", |bencher| {
        let runtime = Runtime::new().expect("Failed to create Tokio runtime");
        bencher.to_async(runtime).iter(|| async {
            let mut connection = MockConnection::new();
            connection
                .expect_execute()
                .returning(|_, values| Ok((values.len() / 4) as u64));
            insert(&mut connection, &users, 1_000).await
        });
    });
}

criterion_group!(
    name = all;
    config = Criterion::default().sample_size(10);
    targets = generate_benchmark, insert_benchmark
);
