#[path = "shared.rs"]
mod shared;
use shared::*;

use criterion::{criterion_group, Criterion};
use spart::tree::Tree;
use std::hint::black_box;
use tracing::info;

fn bench_insert<P: Clone>(
    bench_name: &str,
    points: Vec<P>,
    insert_fn: impl Fn(Vec<P>),
    cc: &mut Criterion,
) {
    cc.bench_function(bench_name, |b| {
        b.iter(|| insert_fn(black_box(points.clone())))
    });
}

fn insert_2d_kdtree(points: Vec<[f64; 2]>) {
    info!("Starting insertion for 2D kdtree");
    let mut tree = Tree::new_2d(BENCH_BUCKET_CAPACITY).unwrap();
    for (i, p) in points.into_iter().enumerate() {
        tree.add_point(&p, i, true).unwrap();
    }
    info!("Finished insertion for 2D kdtree");
}

fn insert_3d_kdtree(points: Vec<[f64; 3]>) {
    info!("Starting insertion for 3D kdtree");
    let mut tree = Tree::new_3d(BENCH_BUCKET_CAPACITY).unwrap();
    for (i, p) in points.into_iter().enumerate() {
        tree.add_point(&p, i, true).unwrap();
    }
    info!("Finished insertion for 3D kdtree");
}

fn insert_2d_kdtree_deferred(points: Vec<[f64; 2]>) {
    info!("Starting deferred insertion for 2D kdtree");
    let mut tree = Tree::new_2d(BENCH_BUCKET_CAPACITY).unwrap();
    for (i, p) in points.into_iter().enumerate() {
        tree.add_point(&p, i, false).unwrap();
    }
    tree.split_outstanding().unwrap();
    info!("Finished deferred insertion for 2D kdtree");
}

fn benchmark_insert_2d(_c: &mut Criterion) {
    let points = generate_2d_data();
    let mut cc = configure_criterion();
    bench_insert("insert_kdtree_2d", points, insert_2d_kdtree, &mut cc);
}

fn benchmark_insert_3d(_c: &mut Criterion) {
    let points = generate_3d_data();
    let mut cc = configure_criterion();
    bench_insert("insert_kdtree_3d", points, insert_3d_kdtree, &mut cc);
}

fn benchmark_insert_2d_deferred(_c: &mut Criterion) {
    let points = generate_2d_data();
    let mut cc = configure_criterion();
    bench_insert(
        "insert_kdtree_2d_deferred",
        points,
        insert_2d_kdtree_deferred,
        &mut cc,
    );
}

criterion_group!(
    benches,
    benchmark_insert_2d,
    benchmark_insert_3d,
    benchmark_insert_2d_deferred,
);
