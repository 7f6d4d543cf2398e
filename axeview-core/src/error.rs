//! Errors raised by the identity model, the axis algebra and the contraction resolver.

use alloc::string::String;
use thiserror::Error;

/// Precondition violations of the axis identity model and the axis algebra.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AxisError {
    /// A variable axis was read before its length was bound in the context.
    #[error("length of axis {axis} is not bound in the length context")]
    UnresolvedLength {
        /// Label of the offending axis.
        axis: String,
    },
    /// A fixed axis was asked to take a length different from the one it was built with.
    #[error("axis {axis} has fixed length {fixed}, cannot rebind it to {requested}")]
    FixedAxis {
        /// Label of the offending axis.
        axis: String,
        /// Length the axis was constructed with.
        fixed: usize,
        /// Length that was requested.
        requested: usize,
    },
    /// `substitute` got replacement lists of different lengths.
    #[error("cannot substitute {from} axes with {to} axes")]
    SubstituteArity {
        /// Number of axes to be replaced.
        from: usize,
        /// Number of replacement axes.
        to: usize,
    },
    /// The product of the lengths of an axis list does not fit in `usize`.
    #[error("length product overflows at axis {axis}")]
    LengthOverflow {
        /// Label of the axis whose length made the product overflow.
        axis: String,
    },
}

/// Inconsistent explicit arguments to `dot_axes`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractionError {
    /// An axis is listed both as reduced and as output.
    #[error("axis {axis} is requested both as a reduction axis and as an output axis")]
    Overlap {
        /// Label of the axis listed twice.
        axis: String,
    },
    /// An operand axis is neither reduced nor output.
    #[error("axis {axis} is neither reduced nor kept in the output")]
    Unaccounted {
        /// Label of the missing axis.
        axis: String,
    },
}
