use core::fmt;

use alloc::string::String;
use axeview_core::axis::{Axis, BaseId};
use uuid::Uuid;

/// Process-unique axis identity: every call to `new` creates a distinct dimension.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Id128 {
    id: Uuid,
}
impl fmt::Display for Id128 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
impl Default for Id128 {
    fn default() -> Self {
        Self::new()
    }
}

impl Id128 {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl BaseId for Id128 {}

/// Identity named by the caller.
///
/// Tags with the same text are the same axis, so independently built parts of a graph
/// (or a graph read back from a file) agree on a dimension by naming it.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl BaseId for Tag {}

/// Fixed axis identified by `name`; every call with the same name is the same axis.
pub fn tagged(name: &str, length: usize) -> Axis<Tag> {
    Axis::fixed(Tag::new(name), length)
}

/// Variable axis identified by `name`.
pub fn tagged_var(name: &str) -> Axis<Tag> {
    Axis::variable(Tag::new(name))
}

/// Creates a fresh fixed axis carrying `name` for display.
pub fn axis(name: &str, length: usize) -> Axis<Id128> {
    Axis::fixed(Id128::new(), length).with_name(name)
}

/// Creates a fresh variable axis carrying `name` for display.
pub fn axis_var(name: &str) -> Axis<Id128> {
    Axis::variable(Id128::new()).with_name(name)
}
