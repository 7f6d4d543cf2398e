use core::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// Per-axis slicing instruction for [`TensorDescriptor::slice`](crate::descriptor::TensorDescriptor::slice).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SliceSpec {
    /// Fixes the axis at one index and drops it from the view.
    Index(usize),
    /// Keeps the axis. Missing bounds default to the whole axis.
    Range {
        start: Option<usize>,
        stop: Option<usize>,
        step: usize,
    },
}

impl SliceSpec {
    /// The whole axis.
    pub const FULL: SliceSpec = SliceSpec::Range {
        start: None,
        stop: None,
        step: 1,
    };

    pub fn range(start: usize, stop: usize) -> Self {
        SliceSpec::Range {
            start: Some(start),
            stop: Some(stop),
            step: 1,
        }
    }

    /// Same range, every `step`-th element.
    pub fn step_by(self, step: usize) -> Self {
        match self {
            SliceSpec::Range { start, stop, .. } => SliceSpec::Range { start, stop, step },
            index => index,
        }
    }
}

impl From<usize> for SliceSpec {
    fn from(index: usize) -> Self {
        SliceSpec::Index(index)
    }
}
impl From<Range<usize>> for SliceSpec {
    fn from(r: Range<usize>) -> Self {
        SliceSpec::range(r.start, r.end)
    }
}
impl From<RangeFrom<usize>> for SliceSpec {
    fn from(r: RangeFrom<usize>) -> Self {
        SliceSpec::Range {
            start: Some(r.start),
            stop: None,
            step: 1,
        }
    }
}
impl From<RangeTo<usize>> for SliceSpec {
    fn from(r: RangeTo<usize>) -> Self {
        SliceSpec::Range {
            start: None,
            stop: Some(r.end),
            step: 1,
        }
    }
}
impl From<RangeFull> for SliceSpec {
    fn from(_: RangeFull) -> Self {
        SliceSpec::FULL
    }
}
