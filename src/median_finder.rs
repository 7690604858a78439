use num_traits::ToPrimitive;

use alloc::collections::BinaryHeap;
use core::cmp::Reverse;

use crate::{
    MedianError,
    helper::{midpoint, to_f64},
};

/// A running median over an unbounded stream, built from two balanced heaps.
///
/// The lower half of all values seen so far lives in a max-heap and the upper
/// half in a min-heap. After every push, every value in the lower half is less
/// than or equal to every value in the upper half and the two halves differ in
/// size by at most one, so the median is always read from the heap tops.
///
/// Insertion is `O(log n)` and the median query is `O(1)`.
///
/// # Type Parameters
///
/// * `T` - Any totally ordered value convertible to `f64`: primitive integers,
///   or `OrderedFloat<f64>` for floating point streams
///
/// # Examples
///
/// ```
/// use stream_median::{MedianError, MedianFinder};
///
/// let mut finder = MedianFinder::new();
/// assert_eq!(finder.median(), Err(MedianError::Empty));
///
/// finder.push(1);
/// finder.push(2);
/// assert_eq!(finder.median(), Ok(1.5));
///
/// finder.push(3);
/// assert_eq!(finder.median(), Ok(2.0));
/// ```
#[derive(Debug, Clone)]
pub struct MedianFinder<T> {
    /// Max heap for the lower half of values
    low: BinaryHeap<T>,
    /// Min heap for the upper half of values
    high: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> Default for MedianFinder<T> {
    fn default() -> Self {
        Self {
            low: BinaryHeap::new(),
            high: BinaryHeap::new(),
        }
    }
}

impl<T> MedianFinder<T>
where
    T: Ord + Copy + ToPrimitive,
{
    /// Creates an empty `MedianFinder`
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty `MedianFinder` pre-allocated for about `capacity` values
    ///
    /// # Arguments
    ///
    /// * `capacity` - The expected number of values in the stream
    ///
    /// # Returns
    ///
    /// A new `MedianFinder` with both halves reserved
    pub fn with_capacity(capacity: usize) -> Self {
        let half = capacity / 2 + 1;
        Self {
            low: BinaryHeap::with_capacity(half),
            high: BinaryHeap::with_capacity(half),
        }
    }

    /// Pushes a new value into the stream.
    ///
    /// The value always enters the lower half first. If that breaks the
    /// ordering between halves, the lower maximum moves up; sizes are fixed
    /// afterwards, so ordering is restored before balance.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to push
    pub fn push(&mut self, value: T) {
        self.low.push(value);

        if matches!((self.low_max(), self.high_min()), (Some(low), Some(high)) if low > high) {
            self.move_low_to_high();
        }

        if self.low.len() > self.high.len() + 1 {
            self.move_low_to_high();
        } else if self.high.len() > self.low.len() + 1 {
            self.move_high_to_low();
        }
    }

    /// Moves the maximum of the lower half into the upper half
    fn move_low_to_high(&mut self) {
        if let Some(value) = self.low.pop() {
            tracing::trace!(low = self.low.len(), high = self.high.len(), "moving lower max up");
            self.high.push(Reverse(value));
        }
    }

    /// Moves the minimum of the upper half into the lower half
    fn move_high_to_low(&mut self) {
        if let Some(Reverse(value)) = self.high.pop() {
            tracing::trace!(low = self.low.len(), high = self.high.len(), "moving upper min down");
            self.low.push(value);
        }
    }

    /// Returns the median of all values pushed so far
    ///
    /// # Returns
    ///
    /// * `Ok(median)` - The average of both heap tops for an even count, or
    ///   the top of the larger half for an odd count
    /// * `Err(MedianError::Empty)` - Nothing has been pushed yet
    /// * `Err(MedianError::Unrepresentable)` - A heap top has no `f64` form
    pub fn median(&self) -> Result<f64, MedianError> {
        match (self.low_max(), self.high_min()) {
            (None, None) => Err(MedianError::Empty),
            (Some(low), Some(high)) if self.low.len() == self.high.len() => {
                midpoint(&low, &high)
            }
            (Some(low), _) if self.low.len() > self.high.len() => to_f64(&low),
            (_, Some(high)) => to_f64(&high),
            (Some(low), None) => to_f64(&low),
        }
    }

    /// Returns the maximum of the lower half, if any
    #[inline]
    pub fn low_max(&self) -> Option<T> {
        self.low.peek().copied()
    }

    /// Returns the minimum of the upper half, if any
    #[inline]
    pub fn high_min(&self) -> Option<T> {
        self.high.peek().map(|Reverse(v)| *v)
    }

    /// Number of values held by the lower half
    #[inline]
    pub fn low_len(&self) -> usize {
        self.low.len()
    }

    /// Number of values held by the upper half
    #[inline]
    pub fn high_len(&self) -> usize {
        self.high.len()
    }

    /// Returns the number of values pushed so far
    #[inline]
    pub fn len(&self) -> usize {
        self.low.len() + self.high.len()
    }

    /// Returns `true` if nothing has been pushed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low.is_empty() && self.high.is_empty()
    }

    /// Clears all values.
    pub fn reset(&mut self) {
        tracing::debug!(len = self.len(), "resetting median finder");
        self.low.clear();
        self.high.clear();
    }
}

impl<T> Extend<T> for MedianFinder<T>
where
    T: Ord + Copy + ToPrimitive,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|value| self.push(value));
    }
}

impl<T> FromIterator<T> for MedianFinder<T>
where
    T: Ord + Copy + ToPrimitive,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut finder = Self::new();
        finder.extend(iter);
        finder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::median_from_sorted_slice;

    use alloc::vec::Vec;
    use assert_approx_eq::assert_approx_eq;
    use ordered_float::OrderedFloat;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn assert_invariants<T: Ord + Copy + ToPrimitive>(finder: &MedianFinder<T>) {
        assert!(finder.low_len().abs_diff(finder.high_len()) <= 1);
        if let (Some(low), Some(high)) = (finder.low_max(), finder.high_min()) {
            assert!(low <= high);
        }
    }

    /// Ordered value with no `f64` representation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct Opaque(i64);

    impl ToPrimitive for Opaque {
        fn to_i64(&self) -> Option<i64> {
            None
        }

        fn to_u64(&self) -> Option<u64> {
            None
        }

        fn to_f64(&self) -> Option<f64> {
            None
        }
    }

    fn medians_of(values: &[i64]) -> Vec<f64> {
        let mut finder = MedianFinder::new();
        values
            .iter()
            .map(|v| {
                finder.push(*v);
                finder.median().unwrap()
            })
            .collect()
    }

    #[test]
    fn test_median_empty() {
        let finder = MedianFinder::<i64>::new();
        assert_eq!(finder.median(), Err(MedianError::Empty));
        assert!(finder.is_empty());
    }

    #[test]
    fn test_median_unrepresentable_value() {
        let mut finder = MedianFinder::new();
        finder.push(Opaque(1));
        assert_eq!(finder.median(), Err(MedianError::Unrepresentable));

        finder.push(Opaque(2));
        assert_eq!(finder.median(), Err(MedianError::Unrepresentable));
        assert_eq!(finder.len(), 2);
    }

    #[test]
    fn test_median_ascending_sequence() {
        assert_eq!(medians_of(&[1, 2, 3]), [1.0, 1.5, 2.0]);
    }

    #[test]
    fn test_median_single_value() {
        assert_eq!(medians_of(&[5]), [5.0]);
    }

    #[test]
    fn test_median_all_same_values() {
        assert_eq!(medians_of(&[2, 2, 2, 2]).last(), Some(&2.0));
    }

    #[test]
    fn test_median_descending_negatives() {
        assert_eq!(medians_of(&[-1, -2, -3, -4, -5]).last(), Some(&-3.0));
    }

    #[test]
    fn test_median_query_is_idempotent() {
        let finder: MedianFinder<i32> = [4, 1, 7, 3].into_iter().collect();
        let first = finder.median();
        assert_eq!(finder.median(), first);
        assert_eq!(first, Ok(3.5));
        assert_eq!(finder.len(), 4);
    }

    #[test]
    fn test_median_extreme_values() {
        let mut finder = MedianFinder::new();
        finder.push(i64::MIN);
        finder.push(i64::MAX);
        assert_eq!(finder.median(), Ok(0.0));

        finder.push(i64::MAX);
        assert_eq!(finder.median(), Ok(i64::MAX as f64));
    }

    #[test]
    fn test_median_unsigned_values() {
        let finder: MedianFinder<u8> = [255, 0, 254, 1].into_iter().collect();
        assert_eq!(finder.median(), Ok(127.5));
    }

    #[test]
    fn test_median_ordered_float() {
        let mut finder = MedianFinder::with_capacity(4);
        finder.extend([0.1, 0.7, 0.3, 0.2].map(OrderedFloat));
        assert_approx_eq!(finder.median().unwrap(), 0.25);

        finder.push(OrderedFloat(-1.5));
        assert_approx_eq!(finder.median().unwrap(), 0.2);
    }

    #[test]
    fn test_median_reset() {
        let mut finder: MedianFinder<i32> = (1..=10).collect();
        assert_eq!(finder.median(), Ok(5.5));

        finder.reset();
        assert_eq!(finder.median(), Err(MedianError::Empty));
        assert_eq!(finder.len(), 0);

        finder.push(10);
        finder.push(20);
        assert_eq!(finder.median(), Ok(15.0));
    }

    #[test]
    fn test_insert_moves_lower_max_up() {
        let mut finder = MedianFinder::new();
        finder.push(1);
        finder.push(5);
        assert_eq!((finder.low_len(), finder.high_len()), (1, 1));
        assert_eq!((finder.low_max(), finder.high_min()), (Some(1), Some(5)));

        finder.push(9);
        assert_eq!((finder.low_len(), finder.high_len()), (1, 2));
        assert_eq!(finder.median(), Ok(5.0));

        finder.push(0);
        assert_eq!((finder.low_len(), finder.high_len()), (2, 2));
        assert_eq!(finder.median(), Ok(3.0));
    }

    #[test]
    fn test_random_streams_match_sorted_baseline() {
        let mut rng = StdRng::seed_from_u64(295);

        for _ in 0..50 {
            let mut finder = MedianFinder::new();
            let mut seen = Vec::new();
            let spread = rng.random_range(1..1_000i64);

            for _ in 0..200 {
                let value = rng.random_range(-spread..=spread);
                finder.push(value);
                seen.push(value);
                seen.sort_unstable();

                assert_invariants(&finder);
                assert_eq!(finder.len(), seen.len());
                assert_eq!(finder.median(), median_from_sorted_slice(&seen));
            }
        }
    }

    #[test]
    fn test_halves_hold_every_value() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<i32> = (0..300).map(|_| rng.random_range(-20..20)).collect();
        let finder: MedianFinder<i32> = values.iter().copied().collect();

        let mut held: Vec<i32> = finder
            .low
            .iter()
            .copied()
            .chain(finder.high.iter().map(|Reverse(v)| *v))
            .collect();
        held.sort_unstable();

        let mut expected = values;
        expected.sort_unstable();
        assert_eq!(held, expected);
    }
}
