//! Core crate of axeview.
//!
//! Axes here are dimensions with identity rather than positions. This crate holds the
//! identity model, the length context traits, axis entries (single axes or flattened
//! groups), the order-preserving axis algebra, and the contraction axis resolver.
//! Memory layouts built on top of it live in `axeview-layout`.

#![warn(missing_docs)]
#![no_std]
extern crate alloc;
#[cfg(test)]
extern crate std;

// identity

pub mod axis;

pub mod length;

// algebra built on identities

pub mod entry;

pub mod algebra;

pub mod contract;

// common

pub mod args;

pub mod error;

pub mod prelude {
    //! A prelude module re-exporting commonly used items.

    pub use crate::algebra::*;
    pub use crate::axis::*;
    pub use crate::contract::*;
    pub use crate::entry::*;
    pub use crate::error::*;
    pub use crate::length::*;

    pub use crate::axes;
    pub use crate::group;
}

