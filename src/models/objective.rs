//! Sorted start-time comparator.
//!
//! The single objective of the engine: machines should start as late as
//! possible. Two start-time vectors are compared by sorting each one
//! ascending and comparing component-wise; the first differing position
//! decides. Because of the sort the verdict does not depend on which
//! machine carries which start time.

use std::cmp::Ordering;

use super::Time;

/// Compares two start-time vectors of equal length.
///
/// `Ordering::Greater` means `first` is better (its machines start later).
/// Both slices are copied and sorted per call.
pub fn compare_start_times(first: &[Time], second: &[Time]) -> Ordering {
    debug_assert_eq!(
        first.len(),
        second.len(),
        "start-time vectors must cover the same machines"
    );

    let mut a = first.to_vec();
    let mut b = second.to_vec();
    a.sort_unstable();
    b.sort_unstable();
    a.cmp(&b)
}

/// Returns `true` if `candidate` is strictly better than `incumbent`.
#[inline]
pub fn is_improvement(candidate: &[Time], incumbent: &[Time]) -> bool {
    compare_start_times(candidate, incumbent) == Ordering::Greater
}
