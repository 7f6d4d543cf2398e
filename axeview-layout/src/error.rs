use axeview_core::error::AxisError;
use thiserror::Error;

use crate::buffer::BufferId;

/// Errors raised while building descriptors and deriving views.
///
/// A failed operation leaves every existing descriptor, the length context and the
/// buffer's view registry as they were.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error(transparent)]
    Axis(#[from] AxisError),
    #[error("axis {axis} has length {length} but only {extent} elements are allocated")]
    AxesMismatch {
        axis: String,
        length: usize,
        extent: usize,
    },
    #[error("expected {expected} per-axis values, got {actual}")]
    RankMismatch { expected: usize, actual: usize },
    #[error("axis {axis} is not part of this descriptor")]
    AxisNotFound { axis: String },
    #[error("index rank mismatch: expected {expected}, got {actual}")]
    IndexRank { expected: usize, actual: usize },
    #[error("index {index} out of range for axis {axis} of length {length}")]
    IndexOutOfRange {
        axis: String,
        index: usize,
        length: usize,
    },
    #[error("invalid slice: {reason}")]
    InvalidSlice { reason: String },
    #[error("view needs {required} bytes but buffer {buffer} holds {capacity}")]
    BufferOverrun {
        buffer: BufferId,
        required: usize,
        capacity: usize,
    },
    #[error("buffer {buffer} has been released")]
    DetachedBuffer { buffer: BufferId },
    #[error("layout does not fit in the address space: {reason}")]
    ExtentOverflow { reason: String },
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },
}
