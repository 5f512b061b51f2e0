//! N-point counting benchmarks.
//!
//! Key questions:
//! - How much does the tree search save over brute force as N grows?
//! - How does the cost change with tuple size?
//! - How much do clumpy point sets cost compared to uniform ones?
//! - What does reusing the parent's permutation status buy?

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use npoint::datasets::{clustered_points, uniform_points};
use npoint::{
    count_brute_force, CountParams, DistanceMatcher, KdTree, KdTreeParams, PermutationMode,
};

fn triangle_matcher() -> DistanceMatcher {
    let targets = vec![
        vec![0.0, 0.05, 0.08],
        vec![0.05, 0.0, 0.06],
        vec![0.08, 0.06, 0.0],
    ];
    DistanceMatcher::from_targets(&targets, 0.01, PermutationMode::All)
        .unwrap_or_else(|e| panic!("triangle template: {e}"))
}

// === Construction ===

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");

    for n in [1_000, 10_000, 50_000].iter() {
        group.throughput(Throughput::Elements(*n as u64));
        let points = uniform_points(*n, 3, 42).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| KdTree::build(black_box(&points), KdTreeParams::default()).unwrap());
        });
    }

    group.finish();
}

// === Tree vs brute force ===

fn bench_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairs");
    let matcher = DistanceMatcher::within(2, 0.05).unwrap();

    for n in [200, 1_000, 4_000].iter() {
        let points = uniform_points(*n, 2, 7).unwrap();
        let tree = KdTree::build(&points, KdTreeParams::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("tree", n), n, |bench, _| {
            bench.iter(|| tree.count_tuples(black_box(&matcher)).unwrap());
        });
        if *n <= 1_000 {
            group.bench_with_input(BenchmarkId::new("brute", n), n, |bench, _| {
                bench.iter(|| count_brute_force(black_box(&points), &matcher).unwrap());
            });
        }
    }

    group.finish();
}

fn bench_triangles(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangles");
    group.sample_size(20);
    let matcher = triangle_matcher();

    for n in [100, 400, 1_600].iter() {
        let points = uniform_points(*n, 2, 11).unwrap();
        let tree = KdTree::build(&points, KdTreeParams::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("tree", n), n, |bench, _| {
            bench.iter(|| tree.count_tuples(black_box(&matcher)).unwrap());
        });
        if *n <= 100 {
            group.bench_with_input(BenchmarkId::new("brute", n), n, |bench, _| {
                bench.iter(|| count_brute_force(black_box(&points), &matcher).unwrap());
            });
        }
    }

    group.finish();
}

// === Data shape ===

fn bench_clustered(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangles_by_shape");
    group.sample_size(20);
    let matcher = triangle_matcher();
    let n = 1_000;

    let uniform = KdTree::build(&uniform_points(n, 2, 3).unwrap(), KdTreeParams::default()).unwrap();
    let clustered =
        KdTree::build(&clustered_points(n, 2, 8, 0.05, 3).unwrap(), KdTreeParams::default()).unwrap();

    group.bench_function("uniform", |bench| {
        bench.iter(|| uniform.count_tuples(black_box(&matcher)).unwrap());
    });
    group.bench_function("clustered", |bench| {
        bench.iter(|| clustered.count_tuples(black_box(&matcher)).unwrap());
    });

    group.finish();
}

// === Search options ===

fn bench_status_reuse(c: &mut Criterion) {
    let mut group = c.benchmark_group("status_reuse");
    group.sample_size(20);
    let matcher = triangle_matcher();
    let tree = KdTree::build(&clustered_points(1_000, 2, 8, 0.05, 5).unwrap(), KdTreeParams::default())
        .unwrap();

    for reuse in [true, false] {
        let params = CountParams {
            reuse_parent_status: reuse,
            ..CountParams::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(reuse), &params, |bench, params| {
            bench.iter(|| {
                tree.count_tuples_with(black_box(&matcher), params.clone())
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_pairs,
    bench_triangles,
    bench_clustered,
    bench_status_reuse,
);
criterion_main!(benches);
