#[path = "shared.rs"]
mod shared;
use shared::*;

use criterion::{criterion_group, Criterion};
use spart::tree::Tree;
use std::hint::black_box;
use tracing::info;

fn bench_knn_search<T, Q>(
    name: &str,
    tree: &mut T,
    query: &Q,
    mut search_fn: impl FnMut(&mut T, &Q, usize),
    cc: &mut Criterion,
) {
    cc.bench_function(name, |b| {
        b.iter(|| {
            info!("running knn search benchmark: {}", name);
            search_fn(tree, query, BENCH_KNN_SIZE)
        })
    });
}

fn benchmark_knn_kdtree_2d(_c: &mut Criterion) {
    info!("setting up benchmark: knn_kdtree_2d");
    let points = generate_2d_data();
    let mut tree = Tree::new_2d(BENCH_BUCKET_CAPACITY).unwrap();
    for (i, p) in points.iter().enumerate() {
        tree.add_point(p, i, true).unwrap();
    }
    let target = [35.0, 45.0];
    let mut cc = configure_criterion();
    bench_knn_search(
        "knn_kdtree_2d",
        &mut tree,
        &target,
        |t, q, k| {
            black_box(t.search_knn(q, k));
        },
        &mut cc,
    );
}

fn benchmark_knn_kdtree_3d(_c: &mut Criterion) {
    info!("setting up benchmark: knn_kdtree_3d");
    let points = generate_3d_data();
    let mut tree = Tree::new_3d(BENCH_BUCKET_CAPACITY).unwrap();
    for (i, p) in points.iter().enumerate() {
        tree.add_point(p, i, true).unwrap();
    }
    let target = [35.0, 45.0, 35.0];
    let mut cc = configure_criterion();
    bench_knn_search(
        "knn_kdtree_3d",
        &mut tree,
        &target,
        |t, q, k| {
            black_box(t.search_knn(q, k));
        },
        &mut cc,
    );
}

fn benchmark_ball_kdtree_2d(_c: &mut Criterion) {
    info!("setting up benchmark: ball_kdtree_2d");
    let points = generate_2d_data();
    let mut tree = Tree::new_2d(BENCH_BUCKET_CAPACITY).unwrap();
    for (i, p) in points.iter().enumerate() {
        tree.add_point(p, i, true).unwrap();
    }
    let mut cc = configure_criterion();
    cc.bench_function("ball_kdtree_2d", |b| {
        b.iter(|| black_box(tree.search_ball(&[35.0, 45.0], 900.0)))
    });
}

criterion_group!(
    benches,
    benchmark_knn_kdtree_2d,
    benchmark_knn_kdtree_3d,
    benchmark_ball_kdtree_2d,
);
