use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use aisfix::fixes::Fix;
use aisfix::partition::{HilbertCurve, PartitionParams, Partitioner, TimeBounds};

const DAY_MS: i64 = 86_400_000;

fn random_fix(rng: &mut StdRng) -> Fix {
    Fix::new(
        rng.random_range(200_000_000..800_000_000),
        rng.random_range(-90.0..=90.0),
        rng.random_range(-180.0..=180.0),
        rng.random_range(0..DAY_MS),
    )
}

/// Raw curve mapping at the default resolution (16 bits, 3 dims)
fn bench_hilbert_index(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xA15F1);
    let curve = HilbertCurve::new(16, 3).unwrap();
    let samples = 10_000usize;

    c.bench_function("hilbert/index_16x3", |b| {
        b.iter_batched(
            || {
                (0..samples)
                    .map(|_| {
                        [
                            rng.random_range(0..65_536u64),
                            rng.random_range(0..65_536u64),
                            rng.random_range(0..65_536u64),
                        ]
                    })
                    .collect::<Vec<_>>()
            },
            |points| {
                for p in points {
                    black_box(curve.index(black_box(&p)));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Quantization + curve + bucket for default parameters
fn bench_bucket(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xB0C4E7);
    let partitioner =
        Partitioner::new(PartitionParams::default(), TimeBounds::new(0, DAY_MS)).unwrap();
    let samples = 10_000usize;

    c.bench_function("partition/bucket_default", |b| {
        b.iter_batched(
            || (0..samples).map(|_| random_fix(&mut rng)).collect::<Vec<_>>(),
            |fixes| {
                for fix in fixes {
                    black_box(partitioner.bucket(black_box(&fix)));
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_hilbert_index, bench_bucket);
criterion_main!(benches);
