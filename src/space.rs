//! ## State-space Abstraction
//!
//! This module defines the contract a metric space provides to the tree (`MetricSpace`)
//! and the concrete spaces that realize it: `L1`, `L2`, `L2Squared`, `Time`, `So2`,
//! `So2Squared`, `So3`, and `So3Squared`. A metric space is the thing that gives meaning
//! to the raw `f64` coordinates the tree stores — it is the only place in the crate that
//! knows how to compare two points, how to lower-bound the distance to a bounding
//! rectangle, and which axis is worth splitting on next.

use crate::error::SpartKdError;
use rand::RngCore;
use std::f64::consts::PI;

/// The contract a metric space provides to the tree.
///
/// Implementors need not be a true metric: `L2Squared` violates the triangle
/// inequality of ordinary Euclidean distance but still satisfies the weaker
/// pruning axiom the tree actually relies on (see `distance_to_rectangle`).
pub trait MetricSpace {
    /// Number of scalar coordinates a point in this space occupies.
    fn dim(&self) -> usize;

    /// Distance between two points. Must be non-negative and zero for `x == x`.
    fn distance(&self, x: &[f64], y: &[f64]) -> f64;

    /// A lower bound on `distance(x, y)` for every `y` inside the axis-aligned
    /// rectangle `[lb, ub]`. Must be zero when `x` lies in the rectangle, and
    /// must never exceed the true distance to any point in the rectangle — this
    /// is the sole pruning axiom the searcher relies on.
    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64;

    /// Picks the split axis and its width for a leaf with bounding rectangle
    /// `[lb, ub]`. Width `0.0` signals a duplicate-saturated rectangle.
    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64);

    /// Installs a sampling rectangle used by `sample_uniform`. Spaces with no
    /// notion of bounds (the circular and quaternion spaces) reject this.
    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError>;

    /// Fills `out` with a uniform sample from the space.
    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]);

    /// Interpolates between `from` and `to` at `t in [0, 1]`. Undefined (and
    /// rejected) for spaces without a well-defined notion of a geodesic path,
    /// namely SO(3) and its squared variant.
    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError>;
}

/// Picks the axis of greatest width `ub[i] - lb[i]`, ties broken by the smallest
/// index. Shared by every Euclidean-flavored space.
pub(crate) fn widest_axis(lb: &[f64], ub: &[f64]) -> (usize, f64) {
    let mut best_axis = 0;
    let mut best_width = ub[0] - lb[0];
    for i in 1..lb.len() {
        let width = ub[i] - lb[i];
        if width > best_width {
            best_axis = i;
            best_width = width;
        }
    }
    (best_axis, best_width)
}

pub(crate) fn clamp(v: f64, lb: f64, ub: f64) -> f64 {
    v.max(lb).min(ub)
}

fn euclidean_set_bounds(
    dim: usize,
    lb: &mut Vec<f64>,
    ub: &mut Vec<f64>,
    new_lb: &[f64],
    new_ub: &[f64],
) -> Result<(), SpartKdError> {
    if new_lb.len() != dim || new_ub.len() != dim {
        return Err(SpartKdError::DimensionMismatch {
            expected: dim,
            actual: new_lb.len(),
        });
    }
    *lb = new_lb.to_vec();
    *ub = new_ub.to_vec();
    Ok(())
}

fn euclidean_sample(dim: usize, lb: &[f64], ub: &[f64], rng: &mut dyn RngCore, out: &mut [f64]) {
    use rand::Rng;
    for i in 0..dim {
        let u: f64 = rng.random_range(-1.0..=1.0);
        out[i] = lb[i] + (ub[i] - lb[i]) * (u + 1.0) / 2.0;
    }
}

/// Sum of absolute coordinate differences, a.k.a. taxicab / Manhattan distance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L1 {
    dim: usize,
    lb: Vec<f64>,
    ub: Vec<f64>,
}

impl L1 {
    pub fn new(dim: usize) -> Self {
        L1 {
            dim,
            lb: vec![0.0; dim],
            ub: vec![0.0; dim],
        }
    }
}

impl MetricSpace for L1 {
    fn dim(&self) -> usize {
        self.dim
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).map(|(a, b)| (a - b).abs()).sum()
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        x.iter()
            .zip(lb)
            .zip(ub)
            .map(|((&xi, &lbi), &ubi)| (clamp(xi, lbi, ubi) - xi).abs())
            .sum()
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        widest_axis(lb, ub)
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        euclidean_set_bounds(self.dim, &mut self.lb, &mut self.ub, lb, ub)
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        euclidean_sample(self.dim, &self.lb, &self.ub, rng, out);
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        for i in 0..self.dim {
            out[i] = from[i] + t * (to[i] - from[i]);
        }
        Ok(())
    }
}

/// Ordinary Euclidean distance. Dispatches to `L2Squared` internally and takes
/// the square root once, rather than per-axis, keeping the hot comparison loop
/// on the squared variant where possible.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L2 {
    inner: L2Squared,
}

impl L2 {
    pub fn new(dim: usize) -> Self {
        L2 {
            inner: L2Squared::new(dim),
        }
    }
}

impl MetricSpace for L2 {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        self.inner.distance(x, y).sqrt()
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        self.inner.distance_to_rectangle(x, lb, ub).sqrt()
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        self.inner.choose_split_dimension(lb, ub)
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        self.inner.set_bounds(lb, ub)
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        self.inner.sample_uniform(rng, out);
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        self.inner.interpolate(from, to, t, out)
    }
}

/// Squared Euclidean distance. Avoids a `sqrt` per comparison; the dominant
/// optimization on the search hot path since ordering by squared distance is
/// identical to ordering by distance.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct L2Squared {
    dim: usize,
    lb: Vec<f64>,
    ub: Vec<f64>,
}

impl L2Squared {
    pub fn new(dim: usize) -> Self {
        L2Squared {
            dim,
            lb: vec![0.0; dim],
            ub: vec![0.0; dim],
        }
    }
}

impl MetricSpace for L2Squared {
    fn dim(&self) -> usize {
        self.dim
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum()
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        x.iter()
            .zip(lb)
            .zip(ub)
            .map(|((&xi, &lbi), &ubi)| {
                let c = clamp(xi, lbi, ubi) - xi;
                c * c
            })
            .sum()
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        widest_axis(lb, ub)
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        euclidean_set_bounds(self.dim, &mut self.lb, &mut self.ub, lb, ub)
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        euclidean_sample(self.dim, &self.lb, &self.ub, rng, out);
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        for i in 0..self.dim {
            out[i] = from[i] + t * (to[i] - from[i]);
        }
        Ok(())
    }
}

/// A directed one-dimensional "time" axis: `y` is only reachable from `x` if
/// `y >= x`. Useful for kinodynamic planning where a state's time coordinate
/// must not move backward between samples.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    lb: f64,
    ub: f64,
    has_bounds: bool,
}

impl Time {
    pub fn new() -> Self {
        Time {
            lb: 0.0,
            ub: 0.0,
            has_bounds: false,
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricSpace for Time {
    fn dim(&self) -> usize {
        1
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        if y[0] >= x[0] {
            y[0] - x[0]
        } else {
            f64::INFINITY
        }
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        if ub[0] < x[0] {
            f64::INFINITY
        } else if x[0] >= lb[0] {
            // Inclusive: `x` already inside `[lb, ub]` along the time axis.
            0.0
        } else {
            lb[0] - x[0]
        }
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        (0, ub[0] - lb[0])
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        if lb.len() != 1 || ub.len() != 1 {
            return Err(SpartKdError::DimensionMismatch {
                expected: 1,
                actual: lb.len(),
            });
        }
        self.lb = lb[0];
        self.ub = ub[0];
        self.has_bounds = true;
        Ok(())
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        use rand::Rng;
        let (lb, ub) = if self.has_bounds {
            (self.lb, self.ub)
        } else {
            (0.0, 1.0)
        };
        out[0] = rng.random_range(lb..=ub);
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        out[0] = from[0] + t * (to[0] - from[0]);
        Ok(())
    }
}

/// Wraps an angle in radians into `[-pi, pi]`.
fn wrap_angle(a: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let mut a = (a + PI) % two_pi;
    if a < 0.0 {
        a += two_pi;
    }
    a - PI
}

/// The minimum arc length between two angles on the unit circle, in `[0, pi]`.
fn circular_distance(x: f64, y: f64) -> f64 {
    debug_assert!((-PI..=PI).contains(&x), "angle out of [-pi, pi]: {x}");
    debug_assert!((-PI..=PI).contains(&y), "angle out of [-pi, pi]: {y}");
    let d = (x - y).abs();
    d.min(2.0 * PI - d)
}

/// Distance from angle `x` to the angular interval `[lb, ub]`, accounting for
/// wraparound at `+-pi`. Zero when `x` falls inside the interval.
fn circular_distance_to_interval(x: f64, lb: f64, ub: f64) -> f64 {
    if lb <= ub {
        if x >= lb && x <= ub {
            0.0
        } else {
            circular_distance(x, lb).min(circular_distance(x, ub))
        }
    } else {
        // The interval wraps across +-pi; it covers everything outside (ub, lb).
        if x >= lb || x <= ub {
            0.0
        } else {
            circular_distance(x, lb).min(circular_distance(x, ub))
        }
    }
}

/// A circular angle in `[-pi, pi]`, such as a heading or a revolute joint angle.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct So2;

impl So2 {
    pub fn new() -> Self {
        So2
    }
}

impl MetricSpace for So2 {
    fn dim(&self) -> usize {
        1
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        circular_distance(x[0], y[0])
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        circular_distance_to_interval(x[0], lb[0], ub[0])
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        (0, ub[0] - lb[0])
    }

    fn set_bounds(&mut self, _lb: &[f64], _ub: &[f64]) -> Result<(), SpartKdError> {
        Err(SpartKdError::UnboundedSpace { space: "So2" })
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        use rand::Rng;
        out[0] = rng.random_range(-PI..=PI);
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        let mut delta = to[0] - from[0];
        if delta > PI {
            delta -= 2.0 * PI;
        } else if delta < -PI {
            delta += 2.0 * PI;
        }
        out[0] = wrap_angle(from[0] + t * delta);
        Ok(())
    }
}

/// The squared variant of `So2`. Shares sampling, interpolation, and split
/// choice with `So2`; only `distance`/`distance_to_rectangle` are squared.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct So2Squared {
    inner: So2,
}

impl So2Squared {
    pub fn new() -> Self {
        So2Squared { inner: So2::new() }
    }
}

impl MetricSpace for So2Squared {
    fn dim(&self) -> usize {
        1
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        let d = self.inner.distance(x, y);
        d * d
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        let d = self.inner.distance_to_rectangle(x, lb, ub);
        d * d
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        self.inner.choose_split_dimension(lb, ub)
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        self.inner.set_bounds(lb, ub)
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        self.inner.sample_uniform(rng, out);
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        self.inner.interpolate(from, to, t, out)
    }
}

const QUAT_NORM_TOLERANCE: f64 = 1e-6;

fn debug_assert_unit_quaternion(q: &[f64]) {
    let norm_sq: f64 = q.iter().map(|v| v * v).sum();
    debug_assert!(
        (norm_sq - 1.0).abs() < QUAT_NORM_TOLERANCE * 10.0,
        "quaternion is not unit norm: {q:?} (norm^2 = {norm_sq})"
    );
}

fn negate(q: &[f64], out: &mut [f64; 4]) {
    for i in 0..4 {
        out[i] = -q[i];
    }
}

fn l2_squared(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| (a - b) * (a - b)).sum()
}

fn l2_squared_to_rect(x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
    x.iter()
        .zip(lb)
        .zip(ub)
        .map(|((&xi, &lbi), &ubi)| {
            let c = clamp(xi, lbi, ubi) - xi;
            c * c
        })
        .sum()
}

/// A unit quaternion representing an orientation in SO(3), stored as 4
/// coordinates `(x, y, z, w)`. `q` and `-q` represent the same rotation, so
/// distance picks the closer of the two antipodal representatives: a chord
/// distance on the 4-sphere that is monotone in, but not equal to, the true
/// geodesic angle.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct So3;

impl So3 {
    pub fn new() -> Self {
        So3
    }
}

impl MetricSpace for So3 {
    fn dim(&self) -> usize {
        4
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        debug_assert_unit_quaternion(x);
        debug_assert_unit_quaternion(y);
        let mut neg_x = [0.0; 4];
        negate(x, &mut neg_x);
        l2_squared(x, y).min(l2_squared(&neg_x, y)).sqrt()
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        debug_assert_unit_quaternion(x);
        let mut neg_x = [0.0; 4];
        negate(x, &mut neg_x);
        l2_squared_to_rect(x, lb, ub)
            .min(l2_squared_to_rect(&neg_x, lb, ub))
            .sqrt()
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        widest_axis(lb, ub)
    }

    fn set_bounds(&mut self, _lb: &[f64], _ub: &[f64]) -> Result<(), SpartKdError> {
        Err(SpartKdError::UnboundedSpace { space: "So3" })
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        // Shoemake's algorithm for a uniformly random unit quaternion.
        use rand::Rng;
        let u1: f64 = rng.random_range(0.0..1.0);
        let u2: f64 = rng.random_range(0.0..(2.0 * PI));
        let u3: f64 = rng.random_range(0.0..(2.0 * PI));
        let s1 = (1.0 - u1).sqrt();
        let s2 = u1.sqrt();
        out[0] = s1 * u2.sin();
        out[1] = s1 * u2.cos();
        out[2] = s2 * u3.sin();
        out[3] = s2 * u3.cos();
    }

    fn interpolate(
        &self,
        _from: &[f64],
        _to: &[f64],
        _t: f64,
        _out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        Err(SpartKdError::UnsupportedOperation {
            space: "So3",
            operation: "interpolate",
        })
    }
}

/// The squared variant of `So3`.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct So3Squared {
    inner: So3,
}

impl So3Squared {
    pub fn new() -> Self {
        So3Squared { inner: So3::new() }
    }
}

impl MetricSpace for So3Squared {
    fn dim(&self) -> usize {
        4
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        let d = self.inner.distance(x, y);
        d * d
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        let d = self.inner.distance_to_rectangle(x, lb, ub);
        d * d
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        self.inner.choose_split_dimension(lb, ub)
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        self.inner.set_bounds(lb, ub)
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        self.inner.sample_uniform(rng, out);
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        self.inner.interpolate(from, to, t, out)
    }
}
