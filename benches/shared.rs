#![allow(dead_code)]

//! Shared utilities for benchmarks in `spart`.
//!
//! Common constants and sample-data generators used by the insertion and
//! knn-search benchmarks, mirroring the teacher crate's `benches/shared.rs`.

use criterion::Criterion;

pub const BENCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
pub const BENCH_NUM_INSERT: usize = 20_000;
pub const BENCH_BUCKET_CAPACITY: usize = 32;
pub const BENCH_KNN_SIZE: usize = 10;

/// Deterministic xorshift64 generator so benchmark data is reproducible
/// without pulling in a seeded-RNG dependency.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

pub fn generate_2d_data() -> Vec<[f64; 2]> {
    let mut rng = Lcg::new(0x2545F4914F6CDD1D);
    (0..BENCH_NUM_INSERT)
        .map(|_| [rng.next_f64() * 100.0, rng.next_f64() * 100.0])
        .collect()
}

pub fn generate_3d_data() -> Vec<[f64; 3]> {
    let mut rng = Lcg::new(0x9E3779B97F4A7C15);
    (0..BENCH_NUM_INSERT)
        .map(|_| [rng.next_f64() * 100.0, rng.next_f64() * 100.0, rng.next_f64() * 100.0])
        .collect()
}

pub fn configure_criterion() -> Criterion {
    Criterion::default().measurement_time(BENCH_TIMEOUT)
}
