//! Tensor descriptors: strided views over a buffer, addressed by named axes.
//!
//! A descriptor pairs an axis list with the layout a kernel needs: the allocated
//! `shape`, byte `strides` and byte `offset` into a [`Buffer`]. Axis order is storage
//! order with the first axis innermost, so without explicit strides axis 0 gets the
//! element size and each later axis the running product of the prior allocated
//! extents.
//!
//! Besides the per-position layout, every descriptor keeps an axis table mapping each
//! (disambiguated) leaf axis to its view-local length and stride. The table is what
//! [`TensorDescriptor::reaxe`] reads to reinterpret the same bytes under another axis
//! list without copying.
//!
//! The descriptor returned by [`TensorDescriptor::new`] owns its buffer. Every derived
//! descriptor (`reaxe`, `slice`, `view`, [`Buffer::describe`]) is a view: it is
//! registered in the buffer's view arena, released from it on drop, and does not keep
//! the buffer alive.

use std::ops::Range;

use axeview_core::{
    algebra::disambiguate,
    axis::{Axis, AxisId, BaseId},
    entry::{AxisEntry, canonicalize, flatten},
    error::AxisError,
    length::LengthContext,
};
use indexmap::IndexMap;
use itertools::{Itertools, izip};

use crate::{
    buffer::{Buffer, BufferId, Dims, Layout, ViewLink, required_bytes},
    config::LayoutConfig,
    dtype::DType,
    error::LayoutError,
    slice::SliceSpec,
};

/// Layout metadata of one axis inside a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisInfo {
    /// Position of the entry holding the axis.
    pub position: usize,
    /// View-local length.
    pub length: usize,
    /// Byte stride.
    pub stride: usize,
}

/// Explicit layout choices for [`TensorDescriptor::with_options`] and
/// [`Buffer::describe`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorOptions {
    shape: Option<Vec<usize>>,
    strides: Option<Vec<usize>>,
    offset: usize,
    verify: bool,
}

impl Default for DescriptorOptions {
    fn default() -> Self {
        Self {
            shape: None,
            strides: None,
            offset: 0,
            verify: true,
        }
    }
}

impl DescriptorOptions {
    pub fn new() -> Self {
        Self::default()
    }
    /// Allocated extents per position. Extents larger than the axis lengths pad the
    /// allocation.
    pub fn with_shape(mut self, shape: impl IntoIterator<Item = usize>) -> Self {
        self.shape = Some(shape.into_iter().collect());
        self
    }
    /// Byte strides per position, overriding the storage convention.
    pub fn with_strides(mut self, strides: impl IntoIterator<Item = usize>) -> Self {
        self.strides = Some(strides.into_iter().collect());
        self
    }
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
    /// With `verify` off, axis lengths are not checked against the allocated shape.
    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }
}

#[derive(Debug)]
enum Backing {
    Owner(Buffer),
    View(ViewLink),
}

/// A layout computed before it is attached to a buffer.
struct Planned<Id> {
    dtype: DType,
    axes: Vec<AxisEntry<Id>>,
    lengths: Dims,
    shape: Dims,
    strides: Dims,
    offset: usize,
    table: IndexMap<AxisId<Id>, AxisInfo>,
}

impl<Id> Planned<Id> {
    fn layout(&self, buffer: BufferId) -> Layout {
        Layout {
            dtype: self.dtype,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            buffer,
        }
    }

    fn required_bytes(&self) -> Result<usize, LayoutError> {
        let extents: Dims = self
            .lengths
            .iter()
            .zip(&self.shape)
            .map(|(&length, &extent)| length.max(extent))
            .collect();
        required_bytes(&extents, &self.strides, self.offset, self.dtype.size_bytes()).ok_or_else(
            || LayoutError::ExtentOverflow {
                reason: format!(
                    "view of shape {:?} with strides {:?} at offset {} ends past usize::MAX",
                    extents, self.strides, self.offset
                ),
            },
        )
    }

    fn attach(self, required: usize, buffer_id: BufferId, backing: Backing) -> TensorDescriptor<Id> {
        TensorDescriptor {
            required,
            dtype: self.dtype,
            axes: self.axes,
            lengths: self.lengths,
            shape: self.shape,
            strides: self.strides,
            offset: self.offset,
            table: self.table,
            buffer_id,
            backing,
        }
    }
}

/// Strided layout of a tensor over a buffer.
///
/// Descriptors are immutable; every transformation returns a new view of the same
/// buffer.
#[derive(Debug)]
pub struct TensorDescriptor<Id> {
    dtype: DType,
    axes: Vec<AxisEntry<Id>>,
    lengths: Dims,
    shape: Dims,
    strides: Dims,
    offset: usize,
    table: IndexMap<AxisId<Id>, AxisInfo>,
    required: usize,
    buffer_id: BufferId,
    backing: Backing,
}

impl<Id: BaseId> TensorDescriptor<Id> {
    /// Declares a tensor with the default layout and adopts a buffer sized for it.
    pub fn new<E, C>(
        axes: impl IntoIterator<Item = E>,
        dtype: DType,
        ctx: &C,
    ) -> Result<Self, LayoutError>
    where
        E: Into<AxisEntry<Id>>,
        C: LengthContext<Id> + ?Sized,
    {
        Self::with_options(axes, dtype, DescriptorOptions::default(), ctx)
    }

    /// Declares a tensor with explicit layout options and adopts a buffer sized for it.
    pub fn with_options<E, C>(
        axes: impl IntoIterator<Item = E>,
        dtype: DType,
        options: DescriptorOptions,
        ctx: &C,
    ) -> Result<Self, LayoutError>
    where
        E: Into<AxisEntry<Id>>,
        C: LengthContext<Id> + ?Sized,
    {
        let planned = plan(canonicalize(axes), dtype, options, ctx)?;
        let required = planned.required_bytes()?;
        let buffer = Buffer::adopt(dtype, required);
        tracing::debug!(
            buffer = %buffer.id(),
            ndim = planned.axes.len(),
            %dtype,
            "declared tensor descriptor"
        );
        Ok(planned.attach(required, buffer.id(), Backing::Owner(buffer)))
    }

    /// Declares a tensor with the dtype and validation settings of `config`.
    pub fn from_config<E, C>(
        axes: impl IntoIterator<Item = E>,
        config: &LayoutConfig,
        ctx: &C,
    ) -> Result<Self, LayoutError>
    where
        E: Into<AxisEntry<Id>>,
        C: LengthContext<Id> + ?Sized,
    {
        Self::with_options(axes, config.dtype, config.into(), ctx)
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }
    pub fn axes(&self) -> &[AxisEntry<Id>] {
        &self.axes
    }
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }
    /// View-local lengths per position.
    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }
    /// Allocated extents per position.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }
    /// The buffer, `None` once a view has outlived it.
    pub fn buffer(&self) -> Option<Buffer> {
        match &self.backing {
            Backing::Owner(buffer) => Some(buffer.clone()),
            Backing::View(link) => link.upgrade(),
        }
    }
    pub fn owns_buffer(&self) -> bool {
        matches!(self.backing, Backing::Owner(_))
    }

    /// The `(shape, strides, offset, buffer)` tuple handed to kernels.
    pub fn layout(&self) -> Layout {
        Layout {
            dtype: self.dtype,
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            buffer: self.buffer_id,
        }
    }

    /// One past the last byte this view can address.
    pub fn required_bytes(&self) -> usize {
        self.required
    }

    /// Whether the view addresses a gapless block in storage order.
    pub fn is_contiguous(&self) -> bool {
        default_strides(&self.lengths, self.dtype.size_bytes())
            .is_some_and(|strides| strides == self.strides)
    }

    /// Byte offset of the element at `index`.
    pub fn lookup(&self, index: &[usize]) -> Result<usize, LayoutError> {
        if index.len() != self.ndim() {
            return Err(LayoutError::IndexRank {
                expected: self.ndim(),
                actual: index.len(),
            });
        }
        // in-range indices stay below required_bytes, checked when the view was built
        let mut offset = self.offset;
        for (&i, entry, &length, &stride) in izip!(index, &self.axes, &self.lengths, &self.strides) {
            if i >= length {
                return Err(LayoutError::IndexOutOfRange {
                    axis: entry_label(entry),
                    index: i,
                    length,
                });
            }
            offset += i * stride;
        }
        Ok(offset)
    }

    /// Length and stride of `axis`, which may be a member of a group entry.
    pub fn axis_info(&self, axis: &Axis<Id>) -> Result<AxisInfo, LayoutError> {
        self.table
            .get(axis.id())
            .copied()
            .ok_or_else(|| LayoutError::AxisNotFound { axis: axis.label() })
    }

    /// Whether `axis` has an entry in the axis table.
    pub fn contains(&self, axis: &Axis<Id>) -> bool {
        self.table.contains_key(axis.id())
    }

    /// An identical view of the same buffer.
    pub fn view(&self) -> Result<Self, LayoutError> {
        self.derive(self.replan())
    }

    /// Reinterprets the buffer under `target` axes without copying.
    ///
    /// Each target entry takes the stride of its innermost leaf in this descriptor; an
    /// empty group gets stride 0. A leaf this descriptor does not hold gets stride 0
    /// when `broadcast` is set and fails with [`LayoutError::AxisNotFound`] otherwise.
    /// Leaves this descriptor holds keep their view-local length, other leaves
    /// resolve through `ctx`.
    pub fn reaxe<E, C>(
        &self,
        target: impl IntoIterator<Item = E>,
        broadcast: bool,
        ctx: &C,
    ) -> Result<Self, LayoutError>
    where
        E: Into<AxisEntry<Id>>,
        C: LengthContext<Id> + ?Sized,
    {
        let target = canonicalize(target);
        if target == self.axes {
            return self.view();
        }

        let leaves = disambiguate(&flatten(&target));
        let spans = leaf_spans(&target);

        let mut strides = Dims::with_capacity(target.len());
        for span in &spans {
            let stride = match leaves[span.clone()].last() {
                None => 0,
                Some(inner) => match self.table.get(inner.id()) {
                    Some(info) => info.stride,
                    None if broadcast => {
                        tracing::trace!(axis = %inner.label(), "broadcasting missing axis");
                        0
                    }
                    None => return Err(LayoutError::AxisNotFound { axis: inner.label() }),
                },
            };
            strides.push(stride);
        }

        let leaf_lengths = leaves
            .iter()
            .map(|leaf| match self.table.get(leaf.id()) {
                Some(info) => Ok(info.length),
                None => leaf.length(ctx),
            })
            .collect::<Result<Vec<_>, AxisError>>()?;
        let lengths = entry_lengths(&target, &leaf_lengths)?;
        let table = axis_table(&target, &leaves, &leaf_lengths, &lengths, &strides)?;

        self.derive(Planned {
            dtype: self.dtype,
            axes: target,
            shape: lengths.clone(),
            lengths,
            strides,
            offset: self.offset,
            table,
        })
    }

    /// [`reaxe`](Self::reaxe) with the broadcast setting of `config`.
    pub fn reaxe_with<E, C>(
        &self,
        target: impl IntoIterator<Item = E>,
        config: &LayoutConfig,
        ctx: &C,
    ) -> Result<Self, LayoutError>
    where
        E: Into<AxisEntry<Id>>,
        C: LengthContext<Id> + ?Sized,
    {
        self.reaxe(target, config.broadcast, ctx)
    }

    /// Reaxes to the axis list of `other`.
    pub fn reaxe_like<C>(
        &self,
        other: &TensorDescriptor<Id>,
        broadcast: bool,
        ctx: &C,
    ) -> Result<Self, LayoutError>
    where
        C: LengthContext<Id> + ?Sized,
    {
        self.reaxe(other.axes(), broadcast, ctx)
    }

    /// Slices every position: ranges keep the axis, fixed indices drop it.
    ///
    /// A sliced axis keeps its identity and gets the sliced extent as its view-local
    /// length. Members of a group entry stay addressable only if the group is kept
    /// whole.
    pub fn slice(&self, specs: &[SliceSpec]) -> Result<Self, LayoutError> {
        if specs.len() != self.ndim() {
            return Err(LayoutError::InvalidSlice {
                reason: format!("expected {} slice specs, got {}", self.ndim(), specs.len()),
            });
        }

        let mut offset = self.offset;
        let mut axes = Vec::with_capacity(self.ndim());
        let mut lengths = Dims::new();
        let mut strides = Dims::new();
        // new position and whether the whole entry is kept, per old position
        let mut kept: Vec<Option<(usize, bool)>> = Vec::with_capacity(self.ndim());

        for (spec, entry, &length, &stride) in izip!(specs, &self.axes, &self.lengths, &self.strides) {
            match *spec {
                SliceSpec::Index(index) => {
                    if index >= length {
                        return Err(LayoutError::InvalidSlice {
                            reason: format!(
                                "index {index} out of range for axis {} of length {length}",
                                entry_label(entry)
                            ),
                        });
                    }
                    offset = advance(offset, index, stride, entry)?;
                    kept.push(None);
                }
                SliceSpec::Range { start, stop, step } => {
                    let start = start.unwrap_or(0);
                    let stop = stop.unwrap_or(length);
                    if step == 0 {
                        return Err(LayoutError::InvalidSlice {
                            reason: format!("zero step on axis {}", entry_label(entry)),
                        });
                    }
                    if stop > length || start > stop {
                        return Err(LayoutError::InvalidSlice {
                            reason: format!(
                                "range {start}..{stop} out of bounds for axis {} of length {length}",
                                entry_label(entry)
                            ),
                        });
                    }
                    offset = advance(offset, start, stride, entry)?;
                    let whole = start == 0 && stop == length && step == 1;
                    kept.push(Some((axes.len(), whole)));
                    axes.push(entry.clone());
                    lengths.push((stop - start).div_ceil(step));
                    strides.push(stride.checked_mul(step).ok_or_else(|| {
                        LayoutError::ExtentOverflow {
                            reason: format!(
                                "stride of axis {} times step {step} exceeds usize::MAX",
                                entry_label(entry)
                            ),
                        }
                    })?);
                }
            }
        }

        let table = self
            .table
            .iter()
            .filter_map(|(id, info)| {
                let (position, whole) = kept[info.position]?;
                match self.axes[info.position] {
                    AxisEntry::Axis(_) => Some((
                        id.clone(),
                        AxisInfo {
                            position,
                            length: lengths[position],
                            stride: strides[position],
                        },
                    )),
                    AxisEntry::Group(_) if whole => Some((id.clone(), AxisInfo { position, ..*info })),
                    AxisEntry::Group(_) => None,
                }
            })
            .collect();

        self.derive(Planned {
            dtype: self.dtype,
            axes,
            shape: lengths.clone(),
            lengths,
            strides,
            offset,
            table,
        })
    }

    fn replan(&self) -> Planned<Id> {
        Planned {
            dtype: self.dtype,
            axes: self.axes.clone(),
            lengths: self.lengths.clone(),
            shape: self.shape.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
            table: self.table.clone(),
        }
    }

    fn derive(&self, planned: Planned<Id>) -> Result<Self, LayoutError> {
        let buffer = self.buffer().ok_or(LayoutError::DetachedBuffer {
            buffer: self.buffer_id,
        })?;
        let required = planned.required_bytes()?;
        let link = buffer.register(planned.layout(buffer.id()), required)?;
        Ok(planned.attach(required, buffer.id(), Backing::View(link)))
    }
}

impl Buffer {
    /// Describes part of this buffer under `axes` as a registered view.
    ///
    /// Fails with [`LayoutError::BufferOverrun`] if the layout addresses bytes past the
    /// capacity.
    pub fn describe<Id, E, C>(
        &self,
        axes: impl IntoIterator<Item = E>,
        options: DescriptorOptions,
        ctx: &C,
    ) -> Result<TensorDescriptor<Id>, LayoutError>
    where
        Id: BaseId,
        E: Into<AxisEntry<Id>>,
        C: LengthContext<Id> + ?Sized,
    {
        let planned = plan(canonicalize(axes), self.dtype(), options, ctx)?;
        let required = planned.required_bytes()?;
        let link = self.register(planned.layout(self.id()), required)?;
        Ok(planned.attach(required, self.id(), Backing::View(link)))
    }
}

fn plan<Id: BaseId, C: LengthContext<Id> + ?Sized>(
    axes: Vec<AxisEntry<Id>>,
    dtype: DType,
    options: DescriptorOptions,
    ctx: &C,
) -> Result<Planned<Id>, LayoutError> {
    let leaves = disambiguate(&flatten(&axes));
    let leaf_lengths = leaves
        .iter()
        .map(|leaf| leaf.length(ctx))
        .collect::<Result<Vec<_>, AxisError>>()?;
    let lengths = entry_lengths(&axes, &leaf_lengths)?;

    let shape: Dims = match options.shape {
        Some(shape) => {
            check_rank(axes.len(), shape.len())?;
            shape.into_iter().collect()
        }
        None => lengths.clone(),
    };
    if options.verify {
        for (entry, &length, &extent) in izip!(&axes, &lengths, &shape) {
            if length > extent {
                return Err(LayoutError::AxesMismatch {
                    axis: entry_label(entry),
                    length,
                    extent,
                });
            }
        }
    }
    let strides: Dims = match options.strides {
        Some(strides) => {
            check_rank(axes.len(), strides.len())?;
            strides.into_iter().collect()
        }
        None => default_strides(&shape, dtype.size_bytes()).ok_or_else(|| {
            LayoutError::ExtentOverflow {
                reason: format!("allocation of shape {:?} exceeds usize::MAX bytes", shape),
            }
        })?,
    };

    let table = axis_table(&axes, &leaves, &leaf_lengths, &lengths, &strides)?;
    Ok(Planned {
        dtype,
        axes,
        lengths,
        shape,
        strides,
        offset: options.offset,
        table,
    })
}

fn check_rank(expected: usize, actual: usize) -> Result<(), LayoutError> {
    if expected == actual {
        Ok(())
    } else {
        Err(LayoutError::RankMismatch { expected, actual })
    }
}

/// First axis innermost. `None` if a stride does not fit in `usize`.
fn default_strides(extents: &[usize], itemsize: usize) -> Option<Dims> {
    let mut strides = Dims::with_capacity(extents.len());
    let mut stride = Some(itemsize);
    for &extent in extents {
        let current = stride?;
        strides.push(current);
        stride = current.checked_mul(extent);
    }
    Some(strides)
}

/// Per-entry lengths: the product of each entry's leaf lengths.
fn entry_lengths<Id: BaseId>(
    axes: &[AxisEntry<Id>],
    leaf_lengths: &[usize],
) -> Result<Dims, LayoutError> {
    axes.iter()
        .zip(leaf_spans(axes))
        .map(|(entry, span)| {
            checked_product(&leaf_lengths[span]).ok_or_else(|| LayoutError::ExtentOverflow {
                reason: format!("length of {} exceeds usize::MAX", entry_label(entry)),
            })
        })
        .collect()
}

fn checked_product(values: &[usize]) -> Option<usize> {
    values.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

/// `offset + index * stride`, failing instead of wrapping.
fn advance<Id: BaseId>(
    offset: usize,
    index: usize,
    stride: usize,
    entry: &AxisEntry<Id>,
) -> Result<usize, LayoutError> {
    index
        .checked_mul(stride)
        .and_then(|delta| offset.checked_add(delta))
        .ok_or_else(|| LayoutError::ExtentOverflow {
            reason: format!("offset along axis {} exceeds usize::MAX", entry_label(entry)),
        })
}

/// Ranges of flattened leaves covered by each entry.
fn leaf_spans<Id: BaseId>(axes: &[AxisEntry<Id>]) -> Vec<Range<usize>> {
    let mut start = 0;
    axes.iter()
        .map(|entry| {
            let span = start..start + entry.arity();
            start = span.end;
            span
        })
        .collect()
}

/// Builds the axis table. Group members are listed only when the group's length is
/// still the product of its members' lengths.
fn axis_table<Id: BaseId>(
    axes: &[AxisEntry<Id>],
    leaves: &[Axis<Id>],
    leaf_lengths: &[usize],
    lengths: &[usize],
    strides: &[usize],
) -> Result<IndexMap<AxisId<Id>, AxisInfo>, LayoutError> {
    let mut table = IndexMap::with_capacity(leaves.len());
    for (position, (entry, span, &length, &stride)) in
        izip!(axes, leaf_spans(axes), lengths, strides).enumerate()
    {
        match entry {
            AxisEntry::Axis(_) => {
                table.insert(
                    leaves[span.start].id().clone(),
                    AxisInfo {
                        position,
                        length,
                        stride,
                    },
                );
            }
            AxisEntry::Group(_) => {
                let members = &leaf_lengths[span.clone()];
                if checked_product(members) != Some(length) {
                    tracing::trace!(group = %entry_label(entry), "group members not addressable");
                    continue;
                }
                let mut stride = Some(stride);
                for (leaf, &leaf_length) in leaves[span].iter().zip(members).rev() {
                    let current = stride.ok_or_else(|| LayoutError::ExtentOverflow {
                        reason: format!("stride of axis {} exceeds usize::MAX", leaf.label()),
                    })?;
                    table.insert(
                        leaf.id().clone(),
                        AxisInfo {
                            position,
                            length: leaf_length,
                            stride: current,
                        },
                    );
                    stride = current.checked_mul(leaf_length);
                }
            }
        }
    }
    Ok(table)
}

fn entry_label<Id: BaseId>(entry: &AxisEntry<Id>) -> String {
    match entry {
        AxisEntry::Axis(axis) => axis.label(),
        AxisEntry::Group(_) => format!("({})", entry.flatten().iter().map(Axis::label).join(", ")),
    }
}
