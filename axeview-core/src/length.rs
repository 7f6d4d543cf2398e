//! Length resolution contexts.
//!
//! A variable axis stores no length of its own. Reading or writing its length is
//! forwarded to a context keyed by the base identity of the axis. Every API that may
//! need a length takes the context explicitly; there is no ambient environment.

use alloc::collections::BTreeMap;

/// Read access to axis lengths.
pub trait LengthContext<Id> {
    /// Returns the length bound to the base identity `id`, if any.
    fn resolve(&self, id: &Id) -> Option<usize>;
}

/// Write access to axis lengths.
pub trait LengthContextMut<Id>: LengthContext<Id> {
    /// Binds `length` to `id`, returning the previous binding.
    fn bind(&mut self, id: Id, length: usize) -> Option<usize>;
}

/// The empty context: nothing is bound.
impl<Id> LengthContext<Id> for () {
    fn resolve(&self, _id: &Id) -> Option<usize> {
        None
    }
}

impl<Id: Ord> LengthContext<Id> for BTreeMap<Id, usize> {
    fn resolve(&self, id: &Id) -> Option<usize> {
        self.get(id).copied()
    }
}
impl<Id: Ord> LengthContextMut<Id> for BTreeMap<Id, usize> {
    fn bind(&mut self, id: Id, length: usize) -> Option<usize> {
        self.insert(id, length)
    }
}

impl<Id, C: LengthContext<Id> + ?Sized> LengthContext<Id> for &C {
    fn resolve(&self, id: &Id) -> Option<usize> {
        (**self).resolve(id)
    }
}
impl<Id, C: LengthContext<Id> + ?Sized> LengthContext<Id> for &mut C {
    fn resolve(&self, id: &Id) -> Option<usize> {
        (**self).resolve(id)
    }
}
impl<Id, C: LengthContextMut<Id> + ?Sized> LengthContextMut<Id> for &mut C {
    fn bind(&mut self, id: Id, length: usize) -> Option<usize> {
        (**self).bind(id, length)
    }
}
