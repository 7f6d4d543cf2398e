//! A concrete length environment for one graph-building session.

use alloc::{collections::BTreeMap, vec::Vec};

use axeview_core::{
    axis::{Axis, BaseId},
    length::{LengthContext, LengthContextMut},
};

/// Lengths of variable axes plus the session-wide batch and phase axes.
///
/// One environment belongs to one logical session. It is not synchronized; sessions
/// running on different threads each keep their own (see [`LengthEnv::fork`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEnv<Id> {
    lengths: BTreeMap<Id, usize>,
    batch_axes: Vec<Axis<Id>>,
    phase_axes: Vec<Axis<Id>>,
}

impl<Id> Default for LengthEnv<Id> {
    fn default() -> Self {
        Self {
            lengths: BTreeMap::new(),
            batch_axes: Vec::new(),
            phase_axes: Vec::new(),
        }
    }
}

impl<Id: BaseId> LengthEnv<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `axis` to `length`, builder style.
    pub fn with_length(mut self, axis: &Axis<Id>, length: usize) -> Self {
        self.lengths.insert(axis.base().clone(), length);
        self
    }

    /// Removes the binding of `axis`, returning it.
    pub fn unbind(&mut self, axis: &Axis<Id>) -> Option<usize> {
        self.lengths.remove(axis.base())
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Axes treated as batch dimensions by the graph builder. Empty by default.
    pub fn batch_axes(&self) -> &[Axis<Id>] {
        &self.batch_axes
    }
    pub fn set_batch_axes(&mut self, axes: impl IntoIterator<Item = Axis<Id>>) {
        self.batch_axes = axes.into_iter().collect();
        tracing::debug!(count = self.batch_axes.len(), "set batch axes");
    }

    /// Axes treated as phase (e.g. train/eval) dimensions. Empty by default.
    pub fn phase_axes(&self) -> &[Axis<Id>] {
        &self.phase_axes
    }
    pub fn set_phase_axes(&mut self, axes: impl IntoIterator<Item = Axis<Id>>) {
        self.phase_axes = axes.into_iter().collect();
        tracing::debug!(count = self.phase_axes.len(), "set phase axes");
    }

    /// Independent copy for another session; later bindings do not leak between them.
    pub fn fork(&self) -> Self {
        self.clone()
    }
}

impl<Id: BaseId> LengthContext<Id> for LengthEnv<Id> {
    fn resolve(&self, id: &Id) -> Option<usize> {
        self.lengths.get(id).copied()
    }
}

impl<Id: BaseId> LengthContextMut<Id> for LengthEnv<Id> {
    fn bind(&mut self, id: Id, length: usize) -> Option<usize> {
        self.lengths.insert(id, length)
    }
}
