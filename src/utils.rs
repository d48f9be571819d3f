use core::ops::Range;

/// Split the node range of a level into two halves for fork-join.
///
/// The left half gets the smaller share when the length is odd. An empty
/// range yields two empty halves.
#[inline]
pub(crate) fn split_level(level: Range<usize>) -> (Range<usize>, Range<usize>) {
    let mid = level.start + level.len() / 2;
    (level.start..mid, mid..level.end.max(mid))
}

/// Index of `index` after the element at `removed` has been deleted from the
/// same sequence.
#[inline]
pub(crate) fn shift_after_removal(index: usize, removed: usize) -> usize {
    if index > removed { index - 1 } else { index }
}
