//! Argument macros for axis lists.

/// Builds a `Vec<AxisEntry<_>>` from axes, borrowed axes or entries.
///
/// ```ignore
/// let entries = axes![&m, group![&n, &k]];
/// ```
#[macro_export]
macro_rules! axes {
    ( $( $x:expr ),* $(,)? ) => {
        <$crate::args::__private::Vec<$crate::entry::AxisEntry<_>>>::from([
            $( $crate::entry::AxisEntry::from($x) ),*
        ])
    };
}

/// Builds a group entry; a single member collapses to itself.
#[macro_export]
macro_rules! group {
    ( $( $x:expr ),* $(,)? ) => {
        $crate::entry::AxisEntry::group([
            $( $crate::entry::AxisEntry::from($x) ),*
        ])
    };
}

#[doc(hidden)]
pub mod __private {
    pub use alloc::vec::Vec;
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use crate::{axis::Axis, entry::AxisEntry};

    #[test]
    fn macro_test() {
        let m = Axis::fixed("m", 2);
        let n = Axis::fixed("n", 3);
        let entries = axes![&m, group![&n, m.clone()]];
        assert_eq!(
            entries,
            vec![
                AxisEntry::from(&m),
                AxisEntry::Group(vec![AxisEntry::from(&n), AxisEntry::from(&m)])
            ]
        );
        assert_eq!(group![&n], AxisEntry::from(&n));
    }
}
