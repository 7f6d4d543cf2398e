//! Named-axis tensor views.
//!
//! Axes carry identity instead of position, so tensors are combined by matching axes
//! rather than by reshaping and transposing. This crate bundles the member crates:
//!
//! - `axes`: the identity model, axis algebra and contraction resolver
//! - `basic`: concrete identities and length environments
//! - `layout`: descriptors, buffers and zero-copy views

/// identities, axis algebra and contraction axes
pub use axeview_core as axes;

/// concrete identities and length environments
pub use axeview_basic as basic;

/// strided descriptors over buffers
pub use axeview_layout as layout;

pub use axeview_core::{axes, group};

pub mod prelude {
    pub use axeview_basic::{Id128, LengthEnv, Tag, axis, axis_var, tagged, tagged_var};
    pub use axeview_core::prelude::*;
    pub use axeview_layout::prelude::*;
}
