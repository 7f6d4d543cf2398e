//! Output extents of sliding-window operations.

use crate::error::LayoutError;

/// Extent of a convolution or pooling output along one axis.
///
/// `input` is the input extent, `filter` the window extent. With `caffe_compat` set,
/// pooling rounds up the way Caffe does, dropping the last window when it would start
/// inside the trailing padding.
pub fn output_dim(
    input: usize,
    filter: usize,
    padding: usize,
    stride: usize,
    pooling: bool,
    caffe_compat: bool,
) -> Result<usize, LayoutError> {
    if stride == 0 {
        return Err(LayoutError::InvalidGeometry {
            reason: "stride must be positive".into(),
        });
    }
    if pooling && padding >= filter {
        return Err(LayoutError::InvalidGeometry {
            reason: format!("padding {padding} incompatible with filter size {filter}"),
        });
    }
    let span = (input + 2 * padding)
        .checked_sub(filter)
        .ok_or_else(|| LayoutError::InvalidGeometry {
            reason: format!(
                "filter size {filter} exceeds padded input {}",
                input + 2 * padding
            ),
        })?;

    if pooling && caffe_compat {
        let mut size = span.div_ceil(stride) + 1;
        if padding > 0 && (size - 1) * stride >= input + padding {
            size -= 1;
        }
        Ok(size)
    } else {
        Ok(span / stride + 1)
    }
}
