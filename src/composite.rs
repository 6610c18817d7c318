//! ## Composite Metric Space
//!
//! A `Composite` space is a runtime-built Cartesian product of the concrete spaces
//! in [`crate::space`], each owning a contiguous slice of the point's coordinates.
//! It is how a planner describes a heterogeneous state such as SE(3) (three
//! Euclidean coordinates followed by a unit quaternion) to the tree without the
//! tree needing to know about planning-specific state types.
//!
//! Dispatch across subspaces uses a closed tagged enum (`SubspaceKind`) matched
//! exhaustively in every hot loop, rather than `Box<dyn MetricSpace>`: the set of
//! subspace kinds is fixed, so a match lets the compiler inline each arm instead
//! of going through a vtable on every point compared.

use crate::error::SpartKdError;
use crate::space::{L1, L2, L2Squared, MetricSpace, So2, So2Squared, So3, So3Squared};
use rand::RngCore;

/// One subspace kind, tagging which concrete space owns a coordinate slice.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum SubspaceKind {
    RnL1(L1),
    Rn(L2),
    RnSquared(L2Squared),
    So2(So2),
    So2Squared(So2Squared),
    So3(So3),
    So3Squared(So3Squared),
}

impl SubspaceKind {
    fn dim(&self) -> usize {
        match self {
            SubspaceKind::RnL1(s) => s.dim(),
            SubspaceKind::Rn(s) => s.dim(),
            SubspaceKind::RnSquared(s) => s.dim(),
            SubspaceKind::So2(s) => s.dim(),
            SubspaceKind::So2Squared(s) => s.dim(),
            SubspaceKind::So3(s) => s.dim(),
            SubspaceKind::So3Squared(s) => s.dim(),
        }
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            SubspaceKind::RnL1(s) => s.distance(x, y),
            SubspaceKind::Rn(s) => s.distance(x, y),
            SubspaceKind::RnSquared(s) => s.distance(x, y),
            SubspaceKind::So2(s) => s.distance(x, y),
            SubspaceKind::So2Squared(s) => s.distance(x, y),
            SubspaceKind::So3(s) => s.distance(x, y),
            SubspaceKind::So3Squared(s) => s.distance(x, y),
        }
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        match self {
            SubspaceKind::RnL1(s) => s.distance_to_rectangle(x, lb, ub),
            SubspaceKind::Rn(s) => s.distance_to_rectangle(x, lb, ub),
            SubspaceKind::RnSquared(s) => s.distance_to_rectangle(x, lb, ub),
            SubspaceKind::So2(s) => s.distance_to_rectangle(x, lb, ub),
            SubspaceKind::So2Squared(s) => s.distance_to_rectangle(x, lb, ub),
            SubspaceKind::So3(s) => s.distance_to_rectangle(x, lb, ub),
            SubspaceKind::So3Squared(s) => s.distance_to_rectangle(x, lb, ub),
        }
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        match self {
            SubspaceKind::RnL1(s) => s.choose_split_dimension(lb, ub),
            SubspaceKind::Rn(s) => s.choose_split_dimension(lb, ub),
            SubspaceKind::RnSquared(s) => s.choose_split_dimension(lb, ub),
            SubspaceKind::So2(s) => s.choose_split_dimension(lb, ub),
            SubspaceKind::So2Squared(s) => s.choose_split_dimension(lb, ub),
            SubspaceKind::So3(s) => s.choose_split_dimension(lb, ub),
            SubspaceKind::So3Squared(s) => s.choose_split_dimension(lb, ub),
        }
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        match self {
            SubspaceKind::RnL1(s) => s.set_bounds(lb, ub),
            SubspaceKind::Rn(s) => s.set_bounds(lb, ub),
            SubspaceKind::RnSquared(s) => s.set_bounds(lb, ub),
            SubspaceKind::So2(s) => s.set_bounds(lb, ub),
            SubspaceKind::So2Squared(s) => s.set_bounds(lb, ub),
            SubspaceKind::So3(s) => s.set_bounds(lb, ub),
            SubspaceKind::So3Squared(s) => s.set_bounds(lb, ub),
        }
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        match self {
            SubspaceKind::RnL1(s) => s.sample_uniform(rng, out),
            SubspaceKind::Rn(s) => s.sample_uniform(rng, out),
            SubspaceKind::RnSquared(s) => s.sample_uniform(rng, out),
            SubspaceKind::So2(s) => s.sample_uniform(rng, out),
            SubspaceKind::So2Squared(s) => s.sample_uniform(rng, out),
            SubspaceKind::So3(s) => s.sample_uniform(rng, out),
            SubspaceKind::So3Squared(s) => s.sample_uniform(rng, out),
        }
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        match self {
            SubspaceKind::RnL1(s) => s.interpolate(from, to, t, out),
            SubspaceKind::Rn(s) => s.interpolate(from, to, t, out),
            SubspaceKind::RnSquared(s) => s.interpolate(from, to, t, out),
            SubspaceKind::So2(s) => s.interpolate(from, to, t, out),
            SubspaceKind::So2Squared(s) => s.interpolate(from, to, t, out),
            SubspaceKind::So3(s) => s.interpolate(from, to, t, out),
            SubspaceKind::So3Squared(s) => s.interpolate(from, to, t, out),
        }
    }
}

struct Slot {
    kind: SubspaceKind,
    offset: usize,
}

/// A runtime-composed product of metric spaces, each owning a contiguous slice
/// of coordinates. Built either from `Composite::new` (a list of spaces) or
/// `Composite::from_descriptor` (a text grammar, see [`Composite::from_descriptor`]).
///
/// Not `serde`-serializable itself (unlike the concrete spaces in
/// [`crate::space`]): a composite's subspace list is a closed-enum dispatch
/// table, not plain data, so persisting one is left to the caller re-parsing
/// its original descriptor string.
pub struct Composite {
    slots: Vec<Slot>,
    dim: usize,
}

/// Describes one subspace to feed into [`Composite::new`].
pub enum SubspaceSpec {
    RnL1(usize),
    Rn(usize),
    RnSquared(usize),
    So2,
    So2Squared,
    So3,
    So3Squared,
}

impl SubspaceSpec {
    fn into_kind(self) -> SubspaceKind {
        match self {
            SubspaceSpec::RnL1(d) => SubspaceKind::RnL1(L1::new(d)),
            SubspaceSpec::Rn(d) => SubspaceKind::Rn(L2::new(d)),
            SubspaceSpec::RnSquared(d) => SubspaceKind::RnSquared(L2Squared::new(d)),
            SubspaceSpec::So2 => SubspaceKind::So2(So2::new()),
            SubspaceSpec::So2Squared => SubspaceKind::So2Squared(So2Squared::new()),
            SubspaceSpec::So3 => SubspaceKind::So3(So3::new()),
            SubspaceSpec::So3Squared => SubspaceKind::So3Squared(So3Squared::new()),
        }
    }
}

impl Composite {
    /// Builds a composite space from an ordered list of subspace specs. Each
    /// spec consumes as many contiguous coordinates as its own `dim()`.
    pub fn new(specs: Vec<SubspaceSpec>) -> Self {
        let mut slots = Vec::with_capacity(specs.len());
        let mut offset = 0;
        for spec in specs {
            let kind = spec.into_kind();
            let d = kind.dim();
            slots.push(Slot { kind, offset });
            offset += d;
        }
        Composite { slots, dim: offset }
    }

    /// Parses a comma-separated descriptor string into a composite space.
    ///
    /// Grammar:
    /// ```text
    /// descriptor := token ("," token)*
    /// token      := "SO2" | "SO2Squared" | "SO3" | "SO3Squared"
    ///             | ("RnL1" | "Rn" | "RnSquared") ":" positive-int
    /// ```
    pub fn from_descriptor(descriptor: &str) -> Result<Self, SpartKdError> {
        let mut specs = Vec::new();
        for token in descriptor.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(SpartKdError::InvalidDescriptor {
                    token: token.to_string(),
                });
            }
            specs.push(parse_token(token)?);
        }
        Ok(Composite::new(specs))
    }
}

fn parse_token(token: &str) -> Result<SubspaceSpec, SpartKdError> {
    match token {
        "SO2" => return Ok(SubspaceSpec::So2),
        "SO2Squared" => return Ok(SubspaceSpec::So2Squared),
        "SO3" => return Ok(SubspaceSpec::So3),
        "SO3Squared" => return Ok(SubspaceSpec::So3Squared),
        _ => {}
    }
    let (tag, rest) = token.split_once(':').ok_or_else(|| SpartKdError::InvalidDescriptor {
        token: token.to_string(),
    })?;
    let d: usize = rest.parse().map_err(|_| SpartKdError::InvalidDescriptor {
        token: token.to_string(),
    })?;
    if d == 0 {
        return Err(SpartKdError::InvalidDescriptor {
            token: token.to_string(),
        });
    }
    match tag {
        "RnL1" => Ok(SubspaceSpec::RnL1(d)),
        "Rn" => Ok(SubspaceSpec::Rn(d)),
        "RnSquared" => Ok(SubspaceSpec::RnSquared(d)),
        _ => Err(SpartKdError::InvalidDescriptor {
            token: token.to_string(),
        }),
    }
}

impl MetricSpace for Composite {
    fn dim(&self) -> usize {
        self.dim
    }

    fn distance(&self, x: &[f64], y: &[f64]) -> f64 {
        self.slots
            .iter()
            .map(|slot| {
                let d = slot.kind.dim();
                slot.kind
                    .distance(&x[slot.offset..slot.offset + d], &y[slot.offset..slot.offset + d])
            })
            .sum()
    }

    fn distance_to_rectangle(&self, x: &[f64], lb: &[f64], ub: &[f64]) -> f64 {
        self.slots
            .iter()
            .map(|slot| {
                let d = slot.kind.dim();
                let r = slot.offset..slot.offset + d;
                slot.kind
                    .distance_to_rectangle(&x[r.clone()], &lb[r.clone()], &ub[r])
            })
            .sum()
    }

    fn choose_split_dimension(&self, lb: &[f64], ub: &[f64]) -> (usize, f64) {
        let mut best_axis = 0;
        let mut best_width = f64::NEG_INFINITY;
        for slot in &self.slots {
            let d = slot.kind.dim();
            let r = slot.offset..slot.offset + d;
            let (local_axis, width) = slot.kind.choose_split_dimension(&lb[r.clone()], &ub[r]);
            if width > best_width {
                best_width = width;
                best_axis = slot.offset + local_axis;
            }
        }
        (best_axis, best_width)
    }

    fn set_bounds(&mut self, lb: &[f64], ub: &[f64]) -> Result<(), SpartKdError> {
        if lb.len() != self.dim || ub.len() != self.dim {
            return Err(SpartKdError::DimensionMismatch {
                expected: self.dim,
                actual: lb.len(),
            });
        }
        for slot in &mut self.slots {
            let d = slot.kind.dim();
            let r = slot.offset..slot.offset + d;
            slot.kind.set_bounds(&lb[r.clone()], &ub[r])?;
        }
        Ok(())
    }

    fn sample_uniform(&self, rng: &mut dyn RngCore, out: &mut [f64]) {
        for slot in &self.slots {
            let d = slot.kind.dim();
            let r = slot.offset..slot.offset + d;
            slot.kind.sample_uniform(rng, &mut out[r]);
        }
    }

    fn interpolate(
        &self,
        from: &[f64],
        to: &[f64],
        t: f64,
        out: &mut [f64],
    ) -> Result<(), SpartKdError> {
        for slot in &self.slots {
            let d = slot.kind.dim();
            let r = slot.offset..slot.offset + d;
            slot.kind
                .interpolate(&from[r.clone()], &to[r.clone()], t, &mut out[r])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_descriptor_parses_se3() {
        let space = Composite::from_descriptor("Rn:3,SO3").unwrap();
        assert_eq!(space.dim(), 7);
    }

    #[test]
    fn from_descriptor_rejects_unknown_token() {
        let err = Composite::from_descriptor("Bogus:3").unwrap_err();
        assert_eq!(
            err,
            SpartKdError::InvalidDescriptor {
                token: "Bogus:3".to_string()
            }
        );
    }

    #[test]
    fn from_descriptor_rejects_missing_dimension() {
        assert!(Composite::from_descriptor("Rn").is_err());
    }

    #[test]
    fn composite_distance_sums_subspaces() {
        let space = Composite::new(vec![SubspaceSpec::Rn(2), SubspaceSpec::So2]);
        let x = [0.0, 0.0, 0.0];
        let y = [3.0, 4.0, 0.0];
        assert_eq!(space.distance(&x, &y), 5.0);
    }

    #[test]
    fn composite_choose_split_dimension_picks_global_widest_axis() {
        let space = Composite::new(vec![SubspaceSpec::Rn(2), SubspaceSpec::Rn(1)]);
        let lb = [0.0, 0.0, 0.0];
        let ub = [1.0, 9.0, 2.0];
        let (axis, width) = space.choose_split_dimension(&lb, &ub);
        assert_eq!(axis, 1);
        assert_eq!(width, 9.0);
    }
}
