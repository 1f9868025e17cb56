use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parconv::convolution::convolve;
use parconv::executor::convolve_with;
use parconv::generate::{Generator, NUMBER_LIMIT};
use parconv::{Matrix, Strategy, Vector};

fn inputs(rows: usize, cols: usize, kernel: usize) -> (Matrix, Matrix) {
    let mut generator = Generator::seeded(42);
    let m = generator.matrix(rows, cols, NUMBER_LIMIT).unwrap();
    let k = generator.matrix(kernel, kernel, NUMBER_LIMIT).unwrap();
    (m, k)
}

fn bench_convolution_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution");

    // Square, wide and tall inputs; column bands favour wide matrices
    let shapes = vec![(256, 256), (64, 1024), (1024, 64)];

    for (rows, cols) in shapes {
        let (m, k) = inputs(rows, cols, 5);

        group.bench_with_input(
            BenchmarkId::new("sequential", format!("{rows}x{cols}")),
            &(&m, &k),
            |bench, (m, k)| {
                bench.iter(|| black_box(convolve(black_box(m), black_box(k)).unwrap()));
            },
        );

        for strategy in Strategy::ALL {
            let id = format!("{rows}x{cols}_p4");
            group.bench_with_input(
                BenchmarkId::new(strategy.name(), id),
                &(&m, &k),
                |bench, (m, k)| {
                    bench.iter(|| {
                        black_box(convolve_with(black_box(m), black_box(k), strategy, 4).unwrap())
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_worker_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("convolution_workers");
    let (m, k) = inputs(512, 512, 3);

    for workers in [1, 2, 4, 8, 16] {
        group.bench_with_input(
            BenchmarkId::from_parameter(workers),
            &workers,
            |bench, &workers| {
                bench.iter(|| {
                    black_box(convolve_with(&m, &k, Strategy::Columns, workers).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_vector_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_add");

    for len in [1_000, 100_000] {
        let mut generator = Generator::seeded(7);
        let a = generator.vector(len, NUMBER_LIMIT).unwrap();
        let b = generator.vector(len, NUMBER_LIMIT).unwrap();

        group.bench_with_input(
            BenchmarkId::new("sequential", len),
            &(&a, &b),
            |bench, (a, b): &(&Vector, &Vector)| {
                bench.iter(|| black_box(a.add_sequential(b).unwrap()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("contiguous_p4", len),
            &(&a, &b),
            |bench, (a, b): &(&Vector, &Vector)| {
                bench.iter(|| black_box(a.add_contiguous(b, 4).unwrap()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("strided_p4", len),
            &(&a, &b),
            |bench, (a, b): &(&Vector, &Vector)| {
                bench.iter(|| black_box(a.add_strided(b, 4).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_convolution_strategies,
    bench_worker_counts,
    bench_vector_addition
);
criterion_main!(benches);
