//! Memory layouts for named-axis tensors.
//!
//! [`TensorDescriptor`](descriptor::TensorDescriptor) maps axis lists onto strided
//! views of a [`Buffer`](buffer::Buffer). Views are derived without copying by
//! reinterpreting the axes (`reaxe`) or slicing, and every view is registered with its
//! buffer for as long as it lives.

pub mod buffer;
pub mod config;
pub mod descriptor;
pub mod dtype;
pub mod error;
pub mod geometry;
pub mod slice;

pub mod prelude {
    pub use crate::buffer::{Buffer, BufferId, Dims, Layout};
    pub use crate::config::LayoutConfig;
    pub use crate::descriptor::{AxisInfo, DescriptorOptions, TensorDescriptor};
    pub use crate::dtype::DType;
    pub use crate::error::LayoutError;
    pub use crate::geometry::output_dim;
    pub use crate::slice::SliceSpec;
}
