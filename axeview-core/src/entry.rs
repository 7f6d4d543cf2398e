//! Axis entries: a position of an axis list holds either one axis or an ordered group
//! of axes flattened into a single logical dimension.

use alloc::vec::Vec;

use crate::{
    axis::{Axis, BaseId},
    error::AxisError,
    length::LengthContext,
};

/// One position of an axis list.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AxisEntry<Id> {
    /// A single axis.
    Axis(Axis<Id>),
    /// Members listed from outermost to innermost; groups may nest.
    Group(Vec<AxisEntry<Id>>),
}

impl<Id> From<Axis<Id>> for AxisEntry<Id> {
    fn from(axis: Axis<Id>) -> Self {
        AxisEntry::Axis(axis)
    }
}
impl<Id: Clone> From<&Axis<Id>> for AxisEntry<Id> {
    fn from(axis: &Axis<Id>) -> Self {
        AxisEntry::Axis(axis.clone())
    }
}

impl<Id: Clone> From<&AxisEntry<Id>> for AxisEntry<Id> {
    fn from(entry: &AxisEntry<Id>) -> Self {
        entry.clone()
    }
}

impl<Id: BaseId> AxisEntry<Id> {
    /// Builds a group entry. A single-member group collapses to its member.
    pub fn group<E: Into<AxisEntry<Id>>>(members: impl IntoIterator<Item = E>) -> Self {
        let mut members: Vec<AxisEntry<Id>> = members.into_iter().map(Into::into).collect();
        if members.len() == 1 {
            if let Some(only) = members.pop() {
                return only.canonical();
            }
        }
        AxisEntry::Group(members.into_iter().map(Self::canonical).collect())
    }

    fn canonical(self) -> Self {
        match self {
            AxisEntry::Axis(_) => self,
            AxisEntry::Group(members) => Self::group(members),
        }
    }

    /// The axis of a single-axis entry.
    pub fn as_axis(&self) -> Option<&Axis<Id>> {
        match self {
            AxisEntry::Axis(axis) => Some(axis),
            AxisEntry::Group(_) => None,
        }
    }

    /// Leaf axes of this entry, depth-first, left to right.
    pub fn flatten(&self) -> Vec<Axis<Id>> {
        let mut leaves = Vec::new();
        self.flatten_into(&mut leaves);
        leaves
    }

    fn flatten_into(&self, leaves: &mut Vec<Axis<Id>>) {
        match self {
            AxisEntry::Axis(axis) => leaves.push(axis.clone()),
            AxisEntry::Group(members) => {
                for member in members {
                    member.flatten_into(leaves);
                }
            }
        }
    }

    /// Number of leaf axes.
    pub fn arity(&self) -> usize {
        match self {
            AxisEntry::Axis(_) => 1,
            AxisEntry::Group(members) => members.iter().map(Self::arity).sum(),
        }
    }

    /// The innermost (last listed) leaf, `None` for an empty group.
    pub fn innermost(&self) -> Option<&Axis<Id>> {
        match self {
            AxisEntry::Axis(axis) => Some(axis),
            AxisEntry::Group(members) => members.iter().rev().find_map(Self::innermost),
        }
    }

    /// Product of the lengths of the leaves. An empty group has length 1.
    pub fn length<C: LengthContext<Id> + ?Sized>(&self, ctx: &C) -> Result<usize, AxisError> {
        match self {
            AxisEntry::Axis(axis) => axis.length(ctx),
            AxisEntry::Group(members) => members.iter().try_fold(1usize, |acc, m| {
                acc.checked_mul(m.length(ctx)?)
                    .ok_or_else(|| overflow_at(m))
            }),
        }
    }
}

/// Collapses singleton groups at every level.
pub fn canonicalize<Id: BaseId, E: Into<AxisEntry<Id>>>(
    entries: impl IntoIterator<Item = E>,
) -> Vec<AxisEntry<Id>> {
    entries
        .into_iter()
        .map(|e| e.into().canonical())
        .collect()
}

/// Leaf axes of all entries, in order.
pub fn flatten<Id: BaseId>(entries: &[AxisEntry<Id>]) -> Vec<Axis<Id>> {
    let mut leaves = Vec::new();
    for entry in entries {
        entry.flatten_into(&mut leaves);
    }
    leaves
}

/// Per-entry lengths: the product of each entry's leaf lengths.
pub fn shape_of<Id: BaseId, C: LengthContext<Id> + ?Sized>(
    entries: &[AxisEntry<Id>],
    ctx: &C,
) -> Result<Vec<usize>, AxisError> {
    entries.iter().map(|e| e.length(ctx)).collect()
}

/// Number of elements addressed by the entries.
pub fn total_size<Id: BaseId, C: LengthContext<Id> + ?Sized>(
    entries: &[AxisEntry<Id>],
    ctx: &C,
) -> Result<usize, AxisError> {
    entries.iter().try_fold(1usize, |acc, e| {
        acc.checked_mul(e.length(ctx)?)
            .ok_or_else(|| overflow_at(e))
    })
}

fn overflow_at<Id: BaseId>(entry: &AxisEntry<Id>) -> AxisError {
    AxisError::LengthOverflow {
        axis: entry.innermost().map(Axis::label).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use alloc::{collections::BTreeMap, string::ToString, vec};

    use super::*;

    #[test]
    fn group_flatten_test() {
        let a = Axis::fixed("a", 2);
        let b = Axis::fixed("b", 3);
        let c = Axis::fixed("c", 4);
        let g = AxisEntry::group([
            AxisEntry::from(&a),
            AxisEntry::group([AxisEntry::from(&b), AxisEntry::from(&c)]),
        ]);
        assert_eq!(g.flatten(), vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(g.arity(), 3);
        assert_eq!(g.innermost(), Some(&c));
        assert_eq!(g.length(&()), Ok(24));
    }

    #[test]
    fn singleton_group_collapses() {
        let a = Axis::fixed("a", 2);
        assert_eq!(AxisEntry::group([&a]), AxisEntry::from(&a));
        let nested = AxisEntry::Group(vec![AxisEntry::Group(vec![AxisEntry::from(&a)])]);
        assert_eq!(canonicalize([nested]), vec![AxisEntry::from(&a)]);
    }

    #[test]
    fn empty_group_test() {
        let g: AxisEntry<&str> = AxisEntry::group(Vec::<AxisEntry<&str>>::new());
        assert_eq!(g.innermost(), None);
        assert_eq!(g.length(&()), Ok(1));
    }

    #[test]
    fn length_overflow_is_an_error() {
        let a = Axis::fixed("a", usize::MAX / 2 + 1);
        let b = Axis::fixed("b", 4);
        let g = AxisEntry::group([&a, &b]);
        assert_eq!(
            g.length(&()),
            Err(AxisError::LengthOverflow {
                axis: "b".to_string()
            })
        );
        let entries = vec![AxisEntry::from(&a), AxisEntry::from(&b)];
        assert_eq!(shape_of(&entries, &()), Ok(vec![usize::MAX / 2 + 1, 4]));
        assert!(matches!(
            total_size(&entries, &()),
            Err(AxisError::LengthOverflow { .. })
        ));
    }

    #[test]
    fn shape_of_test() {
        let m = Axis::fixed("m", 2);
        let n = Axis::variable("n");
        let entries = vec![AxisEntry::from(&m), AxisEntry::group([&m, &n])];
        assert!(shape_of(&entries, &()).is_err());

        let mut env = BTreeMap::new();
        n.set_length(&mut env, 3).unwrap();
        assert_eq!(shape_of(&entries, &env), Ok(vec![2, 6]));
        assert_eq!(total_size(&entries, &env), Ok(12));
        assert_eq!(flatten(&entries), vec![m.clone(), m, n]);
    }
}
