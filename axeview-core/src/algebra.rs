//! Order-preserving set algebra over axis lists.
//!
//! Every operation first disambiguates its inputs, so repeated axes are compared as
//! distinct occurrences, and returns its result in the order of the first input.
//! The order is part of the contract: layouts derived from these lists must be
//! reproducible.

use alloc::vec::Vec;

use crate::{
    axis::{Axis, BaseId},
    error::AxisError,
};

/// Replaces repeated identities with fresh occurrences.
///
/// Walks `axes` left to right. An axis whose identity is already in the result is
/// replaced by the lowest occurrence of its base that appears neither in the result
/// nor anywhere in the input. The output has no duplicate identities and the
/// operation is idempotent.
pub fn disambiguate<Id: BaseId>(axes: &[Axis<Id>]) -> Vec<Axis<Id>> {
    let mut result: Vec<Axis<Id>> = Vec::with_capacity(axes.len());
    for axis in axes {
        if !result.contains(axis) {
            result.push(axis.clone());
            continue;
        }
        let mut fresh = axis.base_axis();
        while result.contains(&fresh) || axes.contains(&fresh) {
            fresh = fresh.occurrence(fresh.index() + 1);
        }
        tracing::trace!(axis = %axis.label(), occurrence = fresh.index(), "disambiguated repeated axis");
        result.push(fresh);
    }
    result
}

/// Elements of `x` whose identity is not in `y`, in `x` order.
pub fn difference<Id: BaseId>(x: &[Axis<Id>], y: &[Axis<Id>]) -> Vec<Axis<Id>> {
    let y = disambiguate(y);
    disambiguate(x)
        .into_iter()
        .filter(|a| !y.contains(a))
        .collect()
}

/// Elements of `x` whose identity is also in `y`, in `x` order.
pub fn intersection<Id: BaseId>(x: &[Axis<Id>], y: &[Axis<Id>]) -> Vec<Axis<Id>> {
    let y = disambiguate(y);
    disambiguate(x)
        .into_iter()
        .filter(|a| y.contains(a))
        .collect()
}

/// Concatenation of all sequences, each identity kept at its first occurrence.
pub fn union_ordered<'a, Id: BaseId + 'a>(
    sequences: impl IntoIterator<Item = &'a [Axis<Id>]>,
) -> Vec<Axis<Id>> {
    let mut result: Vec<Axis<Id>> = Vec::new();
    for seq in sequences {
        for axis in disambiguate(seq) {
            if !result.contains(&axis) {
                result.push(axis);
            }
        }
    }
    result
}

/// Replaces, position for position, identities of `from` found in `axes` by the
/// corresponding identities of `to`.
pub fn substitute<Id: BaseId>(
    axes: &[Axis<Id>],
    from: &[Axis<Id>],
    to: &[Axis<Id>],
) -> Result<Vec<Axis<Id>>, AxisError> {
    if from.len() != to.len() {
        return Err(AxisError::SubstituteArity {
            from: from.len(),
            to: to.len(),
        });
    }
    let from = disambiguate(from);
    let to = disambiguate(to);
    Ok(disambiguate(axes)
        .into_iter()
        .map(|a| match from.iter().position(|f| *f == a) {
            Some(pos) => to[pos].clone(),
            None => a,
        })
        .collect())
}

/// Start index of `needle` as a contiguous, in-order block of `haystack`.
///
/// An empty needle is found at 0.
pub fn find_subsequence<Id: BaseId>(needle: &[Axis<Id>], haystack: &[Axis<Id>]) -> Option<usize> {
    let needle = disambiguate(needle);
    let haystack = disambiguate(haystack);
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn abcd() -> [Axis<&'static str>; 4] {
        [
            Axis::fixed("a", 2),
            Axis::fixed("b", 3),
            Axis::fixed("c", 4),
            Axis::fixed("d", 5),
        ]
    }

    #[test]
    fn disambiguate_test() {
        let [a, b, ..] = abcd();
        let ids = disambiguate(&[a.clone(), b.clone(), a.clone(), a.clone()]);
        assert_eq!(ids, vec![a.clone(), b, a.occurrence(1), a.occurrence(2)]);
    }

    #[test]
    fn disambiguate_skips_occurrences_present_in_input() {
        let [a, ..] = abcd();
        let input = [a.clone(), a.clone(), a.occurrence(1)];
        let ids = disambiguate(&input);
        assert_eq!(ids, vec![a.clone(), a.occurrence(2), a.occurrence(1)]);
        assert_eq!(disambiguate(&ids), ids);
    }

    #[test]
    fn set_ops_test() {
        let [a, b, c, d] = abcd();
        let x = [a.clone(), b.clone(), c.clone()];
        let y = [c.clone(), d.clone(), a.clone()];
        assert_eq!(difference(&x, &y), vec![b.clone()]);
        assert_eq!(intersection(&x, &y), vec![a.clone(), c.clone()]);
        assert_eq!(intersection(&y, &x), vec![c.clone(), a.clone()]);
        assert_eq!(
            union_ordered([&x[..], &y[..]]),
            vec![a.clone(), b.clone(), c.clone(), d.clone()]
        );
    }

    #[test]
    fn repeated_axes_stay_distinct() {
        let [a, b, ..] = abcd();
        let x = [a.clone(), a.clone(), b.clone()];
        let y = [a.clone()];
        assert_eq!(difference(&x, &y), vec![a.occurrence(1), b.clone()]);
        assert_eq!(intersection(&x, &y), vec![a.clone()]);
        assert_eq!(
            union_ordered([&y[..], &x[..]]),
            vec![a.clone(), a.occurrence(1), b]
        );
    }

    #[test]
    fn substitute_test() {
        let [a, b, c, d] = abcd();
        let axes = [a.clone(), b.clone(), c.clone()];
        assert_eq!(
            substitute(&axes, &[b.clone(), c.clone()], &[d.clone(), a.occurrence(1)]),
            Ok(vec![a.clone(), d.clone(), a.occurrence(1)])
        );
        assert_eq!(
            substitute(&axes, &[b.clone()], &[]),
            Err(AxisError::SubstituteArity { from: 1, to: 0 })
        );
    }

    #[test]
    fn find_subsequence_test() {
        let [a, b, c, d] = abcd();
        let hay = [a.clone(), b.clone(), c.clone(), d.clone()];
        assert_eq!(find_subsequence(&[b.clone(), c.clone()], &hay), Some(1));
        assert_eq!(find_subsequence(&[c.clone(), b.clone()], &hay), None);
        assert_eq!(find_subsequence(&[], &hay), Some(0));
        assert_eq!(find_subsequence(&[a.clone(), c.clone()], &hay), None);

        let repeated = [a.clone(), b.clone(), a.clone()];
        assert_eq!(find_subsequence(&[b.clone(), a.clone()], &repeated), None);
        assert_eq!(
            find_subsequence(&[b.clone(), a.occurrence(1)], &repeated),
            Some(1)
        );
    }
}
