use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pipeline_sort::{seeded_values, SortPipeline};

fn benchmark_chain_growth(c: &mut Criterion) {
    for n in [100usize, 1000] {
        c.bench_function(&format!("pipeline_sort_{n}_values_cap1"), |b| {
            b.iter(|| {
                let report = SortPipeline::new()
                    .run(seeded_values(42, black_box(n)))
                    .expect("Run failed");
                assert!(report.sorted);
            });
        });
    }
}

fn benchmark_buffer_capacity(c: &mut Criterion) {
    for capacity in [1usize, 4, 16] {
        c.bench_function(&format!("pipeline_sort_1000_values_cap{capacity}"), |b| {
            b.iter(|| {
                let report = SortPipeline::new()
                    .with_buffer_capacity(capacity)
                    .run(seeded_values(42, black_box(1000)))
                    .expect("Run failed");
                assert!(report.sorted);
            });
        });
    }
}

criterion_group!(benches, benchmark_chain_growth, benchmark_buffer_capacity);
criterion_main!(benches);
