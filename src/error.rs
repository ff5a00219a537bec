// SPDX-License-Identifier: MPL-2.0

//! Handling query-algebra errors.
//!
//! Failure splits into two categories. Only the first — structural, fatal mistakes a caller
//! makes while *building* a constraint — is an [`AlgebraError`]. The second category, algebraic
//! emptiness (an intersection that turns out unsatisfiable, a binding that eliminates every
//! cube), is never an error: it is represented structurally as `None` or an empty collection
//! rather than a sentinel error.

use thiserror::Error;

fn dimension_prefix(dimension: &Option<String>) -> String {
    match dimension {
        Some(d) => format!("dimension {d:?} "),
        None => String::new(),
    }
}

/// Errors raised synchronously while constructing or combining constraints.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgebraError {
    /// A dimension was constrained by both a [`Range::HasElement`](crate::Range::HasElement)
    /// and a scalar range (or another incompatible shape).
    ///
    /// `dimension` is filled in by [`Cube`](crate::Cube) once the error crosses that boundary;
    /// `Range` itself doesn't know dimension names, so it leaves this `None`.
    #[error("{}mixes HasElement with a scalar range", dimension_prefix(dimension))]
    HasElementMixedWithScalar {
        /// The dimension on which the conflicting ranges were combined, if known.
        dimension: Option<String>,
    },

    /// A dimension was constrained by both a [`Range::Subquery`](crate::Range::Subquery) and a
    /// `HasElement` or scalar range.
    #[error("{}mixes Subquery with HasElement or a scalar range", dimension_prefix(dimension))]
    SubqueryMixedWithOther {
        /// The dimension on which the conflicting ranges were combined, if known.
        dimension: Option<String>,
    },

    /// `Range::from` (or the constraint grammar's two-element-array sugar) was given a
    /// sequence of the wrong length.
    #[error("range array must have 0, 1, or 2 elements, got {len}")]
    InvalidRangeArity {
        /// The actual length of the offending array.
        len: usize,
    },

    /// `Cube::remove_constraints` was asked to factor out a range that does not equal the
    /// cube's own range on that dimension.
    #[error("dimension {dimension:?} does not equal the supplied factor range")]
    FactorMismatch {
        /// The dimension whose range didn't match the factor.
        dimension: String,
    },

    /// A [`Parameter`](query_values::Parameter) was constructed with an empty or malformed
    /// name.
    #[error("invalid parameter name: {0}")]
    InvalidParameterName(#[from] query_values::InvalidParameterName),

    /// JSON decoding (behind the `serde` feature) encountered an unrecognized shape.
    #[cfg(feature = "serde")]
    #[error("unrecognized JSON shape for a range/query: {0}")]
    InvalidJson(String),
}

impl AlgebraError {
    /// Attaches a dimension name to a mixed-kind error raised by `Range` before it escapes the
    /// `Cube` that knows which dimension it happened on. A no-op for every other variant.
    pub(crate) fn with_dimension(self, dimension: &str) -> AlgebraError {
        match self {
            AlgebraError::HasElementMixedWithScalar { dimension: None } => {
                AlgebraError::HasElementMixedWithScalar {
                    dimension: Some(dimension.to_owned()),
                }
            }
            AlgebraError::SubqueryMixedWithOther { dimension: None } => {
                AlgebraError::SubqueryMixedWithOther {
                    dimension: Some(dimension.to_owned()),
                }
            }
            other => other,
        }
    }
}
