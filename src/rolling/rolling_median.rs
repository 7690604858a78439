use ahash::RandomState;
use hashbrown::HashMap;
use num_traits::ToPrimitive;

use alloc::collections::BinaryHeap;
use core::{cmp::Reverse, hash::Hash};

use crate::{
    MedianError,
    helper::{midpoint, to_f64},
    utils::RingBuffer,
};

type RemovalTracker<T> = HashMap<T, usize, RandomState>;

/// A median over the most recent `window` values of a stream.
///
/// Uses the same two-heap layout as [`MedianFinder`](crate::MedianFinder).
/// Values leaving the window are not searched for inside the heaps; they are
/// recorded against the half that holds them and discarded once they surface
/// at that heap's top. Live sizes are tracked explicitly, so balancing never
/// needs to scan a heap.
///
/// After every public call the top of each heap is a live value, the live
/// lower half holds `ceil(len / 2)` values and the live upper half holds
/// `floor(len / 2)`.
///
/// # Type Parameters
///
/// * `T` - Any totally ordered, hashable value convertible to `f64`: primitive
///   integers, or `OrderedFloat<f64>` for floating point streams
///
/// # Examples
///
/// ```
/// use stream_median::RollingMedian;
///
/// let mut median = RollingMedian::new(3).unwrap();
/// for value in [5, 1, 3] {
///     median.push(value);
/// }
/// assert_eq!(median.median(), Ok(3.0));
///
/// // 5 leaves the window
/// assert_eq!(median.push(0), Some(5));
/// assert_eq!(median.median(), Ok(1.0));
/// ```
#[derive(Debug, Clone)]
pub struct RollingMedian<T> {
    /// Max heap for the lower half, may contain expired values below its top
    lower_heap: BinaryHeap<T>,
    /// Min heap for the upper half, may contain expired values below its top
    upper_heap: BinaryHeap<Reverse<T>>,
    /// Expired values still physically present in the lower heap
    lower_removed: RemovalTracker<T>,
    /// Expired values still physically present in the upper heap
    upper_removed: RemovalTracker<T>,
    /// Live values in the lower heap
    lower_len: usize,
    /// Live values in the upper heap
    upper_len: usize,
    /// Window contents in arrival order
    window: RingBuffer<T>,
}

impl<T> RollingMedian<T>
where
    T: Ord + Copy + Hash + ToPrimitive,
{
    /// Creates a new `RollingMedian` with the specified window size.
    ///
    /// # Arguments
    ///
    /// * `window` - The number of most recent values the median covers
    ///
    /// # Returns
    ///
    /// * `Ok(RollingMedian)` - An empty estimator with pre-allocated capacity
    /// * `Err(MedianError::ZeroWindow)` - `window` is zero
    pub fn new(window: usize) -> Result<Self, MedianError> {
        if window == 0 {
            return Err(MedianError::ZeroWindow);
        }

        let half = window / 2 + 1;
        Ok(Self {
            lower_heap: BinaryHeap::with_capacity(half),
            upper_heap: BinaryHeap::with_capacity(half),
            lower_removed: HashMap::with_hasher(RandomState::default()),
            upper_removed: HashMap::with_hasher(RandomState::default()),
            lower_len: 0,
            upper_len: 0,
            window: RingBuffer::new(window),
        })
    }

    /// Pushes a new value, evicting the oldest one once the window is full.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to push
    ///
    /// # Returns
    ///
    /// The value that left the window, if any
    pub fn push(&mut self, value: T) -> Option<T> {
        match self.lower_heap.peek() {
            Some(top) if value > *top => {
                self.upper_heap.push(Reverse(value));
                self.upper_len += 1;
            }
            _ => {
                self.lower_heap.push(value);
                self.lower_len += 1;
            }
        }

        let evicted = self.window.push(value);
        if let Some(old) = evicted {
            self.expire(old);
        }

        self.prune_tops();
        self.rebalance();
        self.compact();
        debug_assert_eq!(self.len(), self.window.len());
        evicted
    }

    /// Records `value` as expired against the half that holds a live copy of it
    ///
    /// The lower top is live here, and every lower value is at most that top
    /// while every upper value is at least it.
    fn expire(&mut self, value: T) {
        tracing::debug!(lower = self.lower_len, upper = self.upper_len, "expiring value");
        let in_lower = self.lower_heap.peek().is_some_and(|top| value <= *top);
        if in_lower {
            *self.lower_removed.entry(value).or_insert(0) += 1;
            self.lower_len -= 1;
        } else {
            *self.upper_removed.entry(value).or_insert(0) += 1;
            self.upper_len -= 1;
        }
    }

    /// Moves live tops across until the lower half holds `ceil(len / 2)` values
    fn rebalance(&mut self) {
        while self.lower_len > self.upper_len + 1 {
            if let Some(value) = self.lower_heap.pop() {
                tracing::trace!(
                    lower = self.lower_len,
                    upper = self.upper_len,
                    "moving lower max up"
                );
                self.upper_heap.push(Reverse(value));
                self.lower_len -= 1;
                self.upper_len += 1;
                self.prune_tops();
            } else {
                break;
            }
        }

        while self.upper_len > self.lower_len {
            if let Some(Reverse(value)) = self.upper_heap.pop() {
                tracing::trace!(
                    lower = self.lower_len,
                    upper = self.upper_len,
                    "moving upper min down"
                );
                self.lower_heap.push(value);
                self.upper_len -= 1;
                self.lower_len += 1;
                self.prune_tops();
            } else {
                break;
            }
        }
    }

    /// Pops expired values off both heap tops
    fn prune_tops(&mut self) {
        while let Some(top) = self.lower_heap.peek() {
            if !take_removal(&mut self.lower_removed, top) {
                break;
            }
            self.lower_heap.pop();
        }

        while let Some(Reverse(top)) = self.upper_heap.peek() {
            if !take_removal(&mut self.upper_removed, top) {
                break;
            }
            self.upper_heap.pop();
        }
    }

    /// Rebuilds a heap once expired values buried below its top outnumber the live ones
    fn compact(&mut self) {
        if self.lower_heap.len() > 2 * self.lower_len.max(1) {
            tracing::debug!(
                physical = self.lower_heap.len(),
                live = self.lower_len,
                "compacting lower heap"
            );
            let removed = &mut self.lower_removed;
            self.lower_heap.retain(|value| !take_removal(removed, value));
            removed.clear();
        }

        if self.upper_heap.len() > 2 * self.upper_len.max(1) {
            tracing::debug!(
                physical = self.upper_heap.len(),
                live = self.upper_len,
                "compacting upper heap"
            );
            let removed = &mut self.upper_removed;
            self.upper_heap.retain(|Reverse(value)| !take_removal(removed, value));
            removed.clear();
        }
    }

    /// Returns the median of the values currently in the window
    ///
    /// # Returns
    ///
    /// * `Ok(median)` - The median of the live window
    /// * `Err(MedianError::Empty)` - Nothing has been pushed yet
    /// * `Err(MedianError::Unrepresentable)` - A heap top has no `f64` form
    pub fn median(&self) -> Result<f64, MedianError> {
        match (self.lower_heap.peek(), self.upper_heap.peek()) {
            _ if self.is_empty() => Err(MedianError::Empty),
            (Some(low), Some(Reverse(high))) if self.lower_len == self.upper_len => {
                midpoint(low, high)
            }
            (Some(low), _) => to_f64(low),
            (None, _) => Err(MedianError::Empty),
        }
    }

    /// Returns the number of values currently in the window
    #[inline]
    pub fn len(&self) -> usize {
        self.lower_len + self.upper_len
    }

    /// Returns `true` if nothing has been pushed
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` once the window has been filled
    #[inline]
    pub fn is_full(&self) -> bool {
        self.window.is_full()
    }

    /// Iterates over the live window from oldest to newest
    pub fn values(&self) -> impl Iterator<Item = T> + '_ {
        self.window.iter().copied()
    }

    /// Returns the window size
    #[inline]
    pub fn window(&self) -> usize {
        self.window.capacity()
    }

    /// Clears all elements.
    pub fn reset(&mut self) {
        tracing::debug!(len = self.len(), "resetting rolling median");
        self.lower_heap.clear();
        self.upper_heap.clear();
        self.lower_removed.clear();
        self.upper_removed.clear();
        self.lower_len = 0;
        self.upper_len = 0;
        self.window.reset();
    }
}

/// Consumes one pending removal of `value`, returning whether there was one
#[inline]
fn take_removal<T: Hash + Eq>(removed: &mut RemovalTracker<T>, value: &T) -> bool {
    match removed.get_mut(value) {
        Some(count) => {
            *count -= 1;
            if *count == 0 {
                removed.remove(value);
            }
            true
        }
        None => false,
    }
}
