//! Contraction axis resolution for binary operations such as matrix multiply.

use alloc::vec::Vec;

use crate::{
    algebra::{difference, disambiguate, intersection, union_ordered},
    axis::{Axis, BaseId},
    error::ContractionError,
};

/// Axis roles of a contraction `x . y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotAxes<Id> {
    reduction: Vec<Axis<Id>>,
    surviving_shared: Vec<Axis<Id>>,
    out: Vec<Axis<Id>>,
}

impl<Id> DotAxes<Id> {
    /// Axes summed over.
    pub fn reduction(&self) -> &[Axis<Id>] {
        &self.reduction
    }
    /// Axes present in both operands that are kept, e.g. batch axes of a batched matmul.
    pub fn surviving_shared(&self) -> &[Axis<Id>] {
        &self.surviving_shared
    }
    /// Axes of the result.
    pub fn out(&self) -> &[Axis<Id>] {
        &self.out
    }
    /// Splits into `(reduction, surviving_shared, out)`.
    pub fn into_raw(self) -> (Vec<Axis<Id>>, Vec<Axis<Id>>, Vec<Axis<Id>>) {
        (self.reduction, self.surviving_shared, self.out)
    }
}

/// Resolves which axes of `x_axes` and `y_axes` are contracted, kept shared, and output.
///
/// Without overrides every axis the operands share is contracted (the matmul
/// convention) and the output is everything else in first-seen order. With only
/// `out_axes`, the reduction is everything not in the output; with only
/// `reduction_axes`, the output is everything not reduced. When both are given they
/// must agree: no axis may be in both, and every axis of either operand must be in one
/// of them.
pub fn dot_axes<Id: BaseId>(
    x_axes: &[Axis<Id>],
    y_axes: &[Axis<Id>],
    reduction_axes: Option<&[Axis<Id>]>,
    out_axes: Option<&[Axis<Id>]>,
) -> Result<DotAxes<Id>, ContractionError> {
    let shared = intersection(x_axes, y_axes);
    let combined = union_ordered([x_axes, y_axes]);

    let (reduction, out) = match (reduction_axes, out_axes) {
        (None, None) => {
            let out = difference(&combined, &shared);
            (shared.clone(), out)
        }
        (None, Some(out)) => (difference(&combined, out), disambiguate(out)),
        (Some(reduction), None) => (disambiguate(reduction), difference(&combined, reduction)),
        (Some(reduction), Some(out)) => {
            let reduction = disambiguate(reduction);
            let out = disambiguate(out);
            check_consistent(&combined, &reduction, &out)?;
            (reduction, out)
        }
    };
    let surviving_shared = difference(&shared, &reduction);

    tracing::debug!(
        reduction = reduction.len(),
        surviving_shared = surviving_shared.len(),
        out = out.len(),
        "resolved contraction axes"
    );
    Ok(DotAxes {
        reduction,
        surviving_shared,
        out,
    })
}

fn check_consistent<Id: BaseId>(
    combined: &[Axis<Id>],
    reduction: &[Axis<Id>],
    out: &[Axis<Id>],
) -> Result<(), ContractionError> {
    if let Some(axis) = reduction.iter().find(|a| out.contains(a)) {
        return Err(ContractionError::Overlap { axis: axis.label() });
    }
    if let Some(axis) = combined
        .iter()
        .find(|a| !reduction.contains(a) && !out.contains(a))
    {
        return Err(ContractionError::Unaccounted { axis: axis.label() });
    }
    Ok(())
}
