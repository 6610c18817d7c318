//! ## Custom Errors for the Kd-tree
//!
//! This module defines the error type returned by the fallible entry points of the
//! kd-tree: dimension checks, bucket-capacity checks, and composite-space descriptor
//! parsing.

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents errors specific to invalid operations or parameters in the kd-tree.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum SpartKdError {
    /// Occurs when a point's dimension does not match the tree's or another point's.
    DimensionMismatch {
        /// The dimension the tree (or operation) expected.
        expected: usize,
        /// The dimension that was actually supplied.
        actual: usize,
    },
    /// Occurs when an invalid (zero) bucket capacity is provided at construction.
    InvalidCapacity {
        /// The capacity value that was provided.
        capacity: usize,
    },
    /// Occurs when a composite-space descriptor token is unrecognized or malformed.
    InvalidDescriptor {
        /// The offending token, verbatim.
        token: String,
    },
    /// Occurs when `set_bounds` is called on a space that has no notion of bounds
    /// (SO(2), SO(2)², SO(3), SO(3)²).
    UnboundedSpace {
        /// The name of the space that rejected the call.
        space: &'static str,
    },
    /// Occurs when an operation is not defined for a given space (e.g. `interpolate`
    /// on SO(3)).
    UnsupportedOperation {
        /// The name of the space that rejected the call.
        space: &'static str,
        /// The name of the rejected operation.
        operation: &'static str,
    },
    /// Catch-all for the remaining preconditions in the spec (non-unit quaternion,
    /// angle outside `[-pi, pi]`) when checked at a `Result`-returning boundary
    /// rather than via `debug_assert!` in a hot loop.
    PreconditionViolation(String),
}

impl fmt::Display for SpartKdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpartKdError::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {expected}, got {actual}"
                )
            }
            SpartKdError::InvalidCapacity { capacity } => {
                write!(
                    f,
                    "invalid bucket capacity: {capacity}. Capacity must be greater than zero."
                )
            }
            SpartKdError::InvalidDescriptor { token } => {
                write!(f, "invalid composite-space descriptor token: {token:?}")
            }
            SpartKdError::UnboundedSpace { space } => {
                write!(f, "{space} has no bounds")
            }
            SpartKdError::UnsupportedOperation { space, operation } => {
                write!(f, "{operation} is not supported by {space}")
            }
            SpartKdError::PreconditionViolation(msg) => {
                write!(f, "precondition violated: {msg}")
            }
        }
    }
}

impl Error for SpartKdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = SpartKdError::DimensionMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(format!("{err}"), "dimension mismatch: expected 3, got 2");
    }

    #[test]
    fn test_invalid_capacity_display() {
        let err = SpartKdError::InvalidCapacity { capacity: 0 };
        assert_eq!(
            format!("{err}"),
            "invalid bucket capacity: 0. Capacity must be greater than zero."
        );
    }

    #[test]
    fn test_invalid_descriptor_display() {
        let err = SpartKdError::InvalidDescriptor {
            token: "Rn".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "invalid composite-space descriptor token: \"Rn\""
        );
    }
}
