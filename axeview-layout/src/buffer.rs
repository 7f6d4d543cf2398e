//! Buffers and their view registries.
//!
//! A [`Buffer`] records storage handed in by an external allocator: an element type and
//! a capacity in bytes. This crate never allocates or frees that storage; it only
//! checks that every view addresses bytes inside it.
//!
//! The buffer owns an arena of view records keyed by slot. A view holds a non-owning
//! link (a weak reference plus its slot) and releases its slot when dropped, so the
//! registry always lists exactly the live views, and views never keep a buffer alive.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{dtype::DType, error::LayoutError};

/// Per-axis values (extents, strides); most tensors have at most four axes.
pub type Dims = SmallVec<[usize; 4]>;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BufferId(u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf#{}", self.0)
    }
}

/// The addressing tuple consumed by kernels: `offset + Σ index[i] * strides[i]` bytes
/// into `buffer`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub dtype: DType,
    pub shape: Dims,
    pub strides: Dims,
    pub offset: usize,
    pub buffer: BufferId,
}

impl Layout {
    /// One past the last byte addressed, `0` when the layout addresses nothing.
    /// `None` if that does not fit in `usize`.
    pub fn required_bytes(&self) -> Option<usize> {
        required_bytes(&self.shape, &self.strides, self.offset, self.dtype.size_bytes())
    }
}

pub(crate) fn required_bytes(
    extents: &[usize],
    strides: &[usize],
    offset: usize,
    itemsize: usize,
) -> Option<usize> {
    if extents.iter().any(|&e| e == 0) {
        return Some(0);
    }
    extents
        .iter()
        .zip(strides)
        .try_fold(offset.checked_add(itemsize)?, |end, (&extent, &stride)| {
            end.checked_add((extent - 1).checked_mul(stride)?)
        })
}

#[derive(Debug, Default)]
struct ViewArena {
    slots: Vec<Option<Layout>>,
    free: Vec<usize>,
}

impl ViewArena {
    fn insert(&mut self, layout: Layout) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(layout);
                slot
            }
            None => {
                self.slots.push(Some(layout));
                self.slots.len() - 1
            }
        }
    }
    fn release(&mut self, slot: usize) -> Option<Layout> {
        let released = self.slots.get_mut(slot)?.take();
        if released.is_some() {
            self.free.push(slot);
        }
        released
    }
    fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

#[derive(Debug)]
pub(crate) struct Storage {
    id: BufferId,
    dtype: DType,
    capacity: usize,
    views: RefCell<ViewArena>,
}

/// Owning handle of a buffer. Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct Buffer {
    storage: Rc<Storage>,
}

impl Buffer {
    /// Records externally allocated storage of `capacity` bytes.
    pub fn adopt(dtype: DType, capacity: usize) -> Self {
        let id = BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(buffer = %id, %dtype, capacity, "adopted buffer");
        Self {
            storage: Rc::new(Storage {
                id,
                dtype,
                capacity,
                views: RefCell::new(ViewArena::default()),
            }),
        }
    }

    pub fn id(&self) -> BufferId {
        self.storage.id
    }
    pub fn dtype(&self) -> DType {
        self.storage.dtype
    }
    /// Capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.storage.capacity
    }

    /// Number of live views registered on this buffer.
    pub fn live_views(&self) -> usize {
        self.storage.views.borrow().len()
    }

    /// Layouts of the live views, in slot order.
    pub fn views(&self) -> Vec<Layout> {
        self.storage
            .views
            .borrow()
            .slots
            .iter()
            .flatten()
            .cloned()
            .collect()
    }

    pub fn ptr_eq(&self, other: &Buffer) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Registers a view needing `required` bytes. Nothing is registered on failure.
    pub(crate) fn register(&self, layout: Layout, required: usize) -> Result<ViewLink, LayoutError> {
        if required > self.capacity() {
            return Err(LayoutError::BufferOverrun {
                buffer: self.id(),
                required,
                capacity: self.capacity(),
            });
        }
        let slot = self.storage.views.borrow_mut().insert(layout);
        tracing::trace!(buffer = %self.id(), slot, "registered view");
        Ok(ViewLink {
            storage: Rc::downgrade(&self.storage),
            slot,
        })
    }
}

/// Non-owning link from a view to its buffer's registry slot.
#[derive(Debug)]
pub(crate) struct ViewLink {
    storage: Weak<Storage>,
    slot: usize,
}

impl ViewLink {
    pub(crate) fn upgrade(&self) -> Option<Buffer> {
        self.storage.upgrade().map(|storage| Buffer { storage })
    }
}

impl Drop for ViewLink {
    fn drop(&mut self) {
        if let Some(storage) = self.storage.upgrade() {
            if storage.views.borrow_mut().release(self.slot).is_some() {
                tracing::trace!(buffer = %storage.id, slot = self.slot, "released view");
            }
        }
    }
}
