//! Concrete identities and length environments for axeview.

#![no_std]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod env;
pub mod id;

pub use env::LengthEnv;
pub use id::{Id128, Tag, axis, axis_var, tagged, tagged_var};
