//! Axis identity model: identity-bearing dimensions and their repeated occurrences.

use core::{
    fmt,
    hash::{Hash, Hasher},
    num::NonZeroUsize,
};

use alloc::{format, string::String};

use crate::{
    error::AxisError,
    length::{LengthContext, LengthContextMut},
};

/// Marker for types usable as the base identity of an axis.
///
/// Two axes are the same dimension iff their identities are equal, so an implementor
/// must make equality mean "created as the same axis", never "has the same length".
pub trait BaseId: Clone + Eq + Ord + Hash + fmt::Debug + fmt::Display {}

impl BaseId for u32 {}
impl BaseId for u64 {}
impl BaseId for usize {}
impl BaseId for &'static str {}

/// Identity of one occurrence of an axis inside an axis list.
///
/// Occurrence 0 is the base axis itself and is always represented as `Base`, so the
/// derived equality and hash are consistent with identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AxisId<Id> {
    /// The base axis (occurrence 0).
    Base(Id),
    /// A repetition `k > 0` of the base axis.
    Occurrence(Id, NonZeroUsize),
}

impl<Id> AxisId<Id> {
    /// Returns the base identity shared by every occurrence.
    pub fn base(&self) -> &Id {
        match self {
            AxisId::Base(id) | AxisId::Occurrence(id, _) => id,
        }
    }
    /// Returns the occurrence index, `0` for the base axis.
    pub fn index(&self) -> usize {
        match self {
            AxisId::Base(_) => 0,
            AxisId::Occurrence(_, k) => k.get(),
        }
    }
    /// Returns occurrence `k` of the same base identity.
    pub fn occurrence(self, k: usize) -> Self {
        let id = self.into_base();
        match NonZeroUsize::new(k) {
            None => AxisId::Base(id),
            Some(k) => AxisId::Occurrence(id, k),
        }
    }
    /// Drops the occurrence index.
    pub fn into_base(self) -> Id {
        match self {
            AxisId::Base(id) | AxisId::Occurrence(id, _) => id,
        }
    }
}

impl<Id: fmt::Display> fmt::Display for AxisId<Id> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AxisId::Base(id) => write!(f, "{}", id),
            AxisId::Occurrence(id, k) => write!(f, "{}[{}]", id, k),
        }
    }
}

/// Where the length of an axis lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Extent {
    /// Stored locally, set once at construction.
    Fixed(usize),
    /// Forwarded to a length context keyed by the base identity.
    Variable,
}

/// A named, identity-bearing dimension.
///
/// Equality and hashing only look at the identity. The name and the `like` reference
/// are display metadata; two axes with the same length are unrelated unless they
/// share an identity.
#[derive(Clone, Debug)]
pub struct Axis<Id> {
    id: AxisId<Id>,
    extent: Extent,
    name: Option<String>,
    like: Option<Id>,
}

impl<Id: BaseId> Axis<Id> {
    /// Creates an axis whose length is stored locally.
    pub fn fixed(id: Id, length: usize) -> Self {
        Self {
            id: AxisId::Base(id),
            extent: Extent::Fixed(length),
            name: None,
            like: None,
        }
    }
    /// Creates an axis whose length is resolved through a length context.
    pub fn variable(id: Id) -> Self {
        Self {
            id: AxisId::Base(id),
            extent: Extent::Variable,
            name: None,
            like: None,
        }
    }
    /// Attaches a display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    /// Records `other` as the axis this one is modeled after (display only).
    pub fn modeled_after(mut self, other: &Axis<Id>) -> Self {
        self.like = Some(other.base().clone());
        self
    }

    /// Identity of this occurrence.
    pub fn id(&self) -> &AxisId<Id> {
        &self.id
    }
    /// Identity shared by every occurrence of this axis.
    pub fn base(&self) -> &Id {
        self.id.base()
    }
    /// Occurrence index of this axis, `0` for the base axis.
    pub fn index(&self) -> usize {
        self.id.index()
    }
    /// Where the length of this axis lives.
    pub fn extent(&self) -> Extent {
        self.extent
    }
    /// Whether the length is resolved through a context.
    pub fn is_variable(&self) -> bool {
        matches!(self.extent, Extent::Variable)
    }
    /// Display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    /// Identity of the axis this one is modeled after, if any.
    pub fn like(&self) -> Option<&Id> {
        self.like.as_ref()
    }

    /// Returns occurrence `k` of this axis. `occurrence(0)` is the base axis.
    ///
    /// Every occurrence shares the length (or length binding) of the base axis.
    pub fn occurrence(&self, k: usize) -> Self {
        Self {
            id: self.id.clone().occurrence(k),
            extent: self.extent,
            name: self.name.clone(),
            like: self.like.clone(),
        }
    }
    /// Returns the base axis of this occurrence.
    pub fn base_axis(&self) -> Self {
        self.occurrence(0)
    }

    /// Human readable label used in error messages and logs.
    pub fn label(&self) -> String {
        let head = match (&self.name, &self.like) {
            (Some(name), _) => name.clone(),
            (None, Some(like)) => format!("like({})", like),
            (None, None) => format!("{}", self.id.base()),
        };
        match self.id.index() {
            0 => head,
            k => format!("{}[{}]", head, k),
        }
    }

    /// Resolves the length of this axis.
    ///
    /// Fixed axes answer locally; variable axes fail with `UnresolvedLength` when the
    /// context holds no binding for their base identity.
    pub fn length<C: LengthContext<Id> + ?Sized>(&self, ctx: &C) -> Result<usize, AxisError> {
        match self.extent {
            Extent::Fixed(n) => Ok(n),
            Extent::Variable => ctx
                .resolve(self.base())
                .ok_or_else(|| AxisError::UnresolvedLength { axis: self.label() }),
        }
    }

    /// Binds the length of this axis.
    ///
    /// For variable axes the binding is written to `ctx`, overwriting any previous
    /// one. Fixed axes accept only their own length and leave `ctx` untouched.
    pub fn set_length<C: LengthContextMut<Id> + ?Sized>(
        &self,
        ctx: &mut C,
        length: usize,
    ) -> Result<(), AxisError> {
        match self.extent {
            Extent::Fixed(n) if n == length => Ok(()),
            Extent::Fixed(n) => Err(AxisError::FixedAxis {
                axis: self.label(),
                fixed: n,
                requested: length,
            }),
            Extent::Variable => {
                let previous = ctx.bind(self.base().clone(), length);
                tracing::trace!(axis = %self.label(), length, ?previous, "bound axis length");
                Ok(())
            }
        }
    }
}

impl<Id: PartialEq> PartialEq for Axis<Id> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl<Id: Eq> Eq for Axis<Id> {}
impl<Id: Hash> Hash for Axis<Id> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<Id: BaseId> fmt::Display for Axis<Id> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.extent {
            Extent::Fixed(_) => write!(f, "Axis({})", self.label()),
            Extent::Variable => write!(f, "AxisVar({})", self.label()),
        }
    }
}
