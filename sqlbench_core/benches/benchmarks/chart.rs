use criterion::{Criterion, criterion_group};
use sqlbench_core::chart::published;

pub fn svg_benchmark(criterion: &mut Criterion) {
    let charts = published().expect("published charts");
    criterion.bench_function("svg-published", |bencher| {
        bencher.iter(|| {
            for chart in &charts {
                chart.to_svg().ok();
            }
        });
    });
}

criterion_group!(
    name = all;
    config = Criterion::default().sample_size(10);
    targets = svg_benchmark
);
