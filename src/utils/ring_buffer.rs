use alloc::vec::Vec;

/// A fixed-capacity circular buffer remembering the live contents of a window.
///
/// Grows until it holds `capacity` elements, then overwrites the oldest one on
/// every push and hands it back to the caller for eviction.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Window contents, at most `capacity` long
    data: Vec<T>,
    /// Maximum number of elements
    capacity: usize,
    /// Position of the oldest element once the buffer is full
    head: usize,
}

impl<T: Copy> RingBuffer<T> {
    /// Creates an empty buffer; `capacity` must be non-zero
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "ring buffer capacity can not be zero");
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    /// Appends a value, returning the oldest one if it had to be overwritten
    pub fn push(&mut self, value: T) -> Option<T> {
        if !self.is_full() {
            self.data.push(value);
            return None;
        }

        let evicted = core::mem::replace(&mut self.data[self.head], value);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    pub fn reset(&mut self) {
        self.data.clear();
        self.head = 0;
    }

    /// Iterates from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let (newer, older) = self.data.split_at(self.head);
        older.iter().chain(newer.iter())
    }
}
