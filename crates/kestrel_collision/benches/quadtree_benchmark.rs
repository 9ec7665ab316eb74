//! # Broad-phase Benchmark
//!
//! Quadtree build + resolve against exhaustive pair testing.
//!
//! Run with: `cargo bench --package kestrel_collision`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kestrel_collision::{brute_force_pairs, Aabb, QuadTree, QuadTreePolicy};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn boxes(count: usize) -> Vec<(u32, Aabb)> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..count as u32)
        .map(|i| {
            let x = rng.gen_range(0.0..790.0);
            let y = rng.gen_range(0.0..590.0);
            (i, Aabb::from_xywh(x, y, 10.0, 10.0))
        })
        .collect()
}

fn bench_broad_phase(c: &mut Criterion) {
    let field = Aabb::from_xywh(0.0, 0.0, 800.0, 600.0);
    let mut group = c.benchmark_group("broad_phase");

    for count in [100, 500, 2_000] {
        let items = boxes(count);
        let mut tree = QuadTree::new(QuadTreePolicy::default());

        group.bench_with_input(BenchmarkId::new("quadtree", count), &items, |b, items| {
            b.iter(|| {
                tree.rebuild(field, items.iter().copied());
                black_box(tree.overlapping_pairs().len())
            });
        });
        group.bench_with_input(BenchmarkId::new("brute_force", count), &items, |b, items| {
            b.iter(|| black_box(brute_force_pairs(items).len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_broad_phase);
criterion_main!(benches);
