//! Sorted priority queue.
//!
//! [`PriorityQueue`] keeps its elements fully sorted in a contiguous slot
//! buffer. Live elements occupy `slots[head..tail]`; popping the minimum
//! only advances `head`, so the front is O(1) and the slots it frees are
//! reclaimed by compaction before the buffer is ever reallocated.
//!
//! Insertion is an `upper_bound` binary search followed by a one-slot shift
//! of the tail, so equal elements leave in insertion order.

use core::fmt;

use haff_core::{Error, Result};

/// Capacity of the first allocation.
pub const DEFAULT_CAPACITY: usize = 8;

/// Growth multiplier once the buffer is full of live elements.
const GROWTH_FACTOR: usize = 2;

/// Less-than predicate used by queues built from `Ord` elements.
pub type OrdLess<T> = fn(&T, &T) -> bool;

/// Sorted sequence ordered by a less-than predicate.
pub struct PriorityQueue<T, F = OrdLess<T>> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    less: F,
}

impl<T: Ord> PriorityQueue<T> {
    /// Create an empty queue ordered by `Ord`.
    pub fn new() -> Self {
        Self::new_by(T::lt)
    }

    /// Create an empty queue ordered by `Ord` with room for `capacity`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_by(capacity, T::lt)
    }
}

impl<T: Ord> Default for PriorityQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FromIterator<T> for PriorityQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_by(iter, T::lt)
    }
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Create an empty queue ordered by `less`.
    pub fn new_by(less: F) -> Self {
        PriorityQueue {
            slots: Vec::new(),
            head: 0,
            tail: 0,
            less,
        }
    }

    /// Create an empty queue ordered by `less` with room for `capacity`.
    pub fn with_capacity_by(capacity: usize, less: F) -> Self {
        let mut queue = Self::new_by(less);
        queue.slots.resize_with(capacity, || None);
        queue
    }

    /// Build a queue from `iter`, stably sorted by `less`.
    pub fn from_iter_by<I>(iter: I, less: F) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut items: Vec<T> = iter.into_iter().collect();
        items.sort_by(|a, b| {
            if less(a, b) {
                core::cmp::Ordering::Less
            } else if less(b, a) {
                core::cmp::Ordering::Greater
            } else {
                core::cmp::Ordering::Equal
            }
        });
        let tail = items.len();
        PriorityQueue {
            slots: items.into_iter().map(Some).collect(),
            head: 0,
            tail,
            less,
        }
    }

    /// Insert `value` after every element it does not precede.
    pub fn push(&mut self, value: T) {
        self.reserve_one();
        let less = &self.less;
        let offset = self.slots[self.head..self.tail]
            .partition_point(|slot| slot.as_ref().is_some_and(|item| !less(&value, item)));
        let pos = self.head + offset;
        // slots[tail] is free after reserve_one; rotate it down to `pos`
        self.slots[pos..=self.tail].rotate_right(1);
        self.slots[pos] = Some(value);
        self.tail += 1;
    }

    /// Make `slots[tail]` available, compacting before growing.
    fn reserve_one(&mut self) {
        if self.tail < self.slots.len() {
            return;
        }
        if self.head > 0 {
            self.slots[..self.tail].rotate_left(self.head);
            self.tail -= self.head;
            self.head = 0;
            return;
        }
        let capacity = (self.slots.len() * GROWTH_FACTOR).max(DEFAULT_CAPACITY);
        self.slots.resize_with(capacity, || None);
    }
}

impl<T, F> PriorityQueue<T, F> {
    /// Remove and return the minimum element.
    pub fn pop(&mut self) -> Result<T> {
        if self.head == self.tail {
            return Err(Error::out_of_range("pop from empty priority queue"));
        }
        let value = self.slots[self.head].take();
        self.head += 1;
        if self.head == self.tail {
            self.head = 0;
            self.tail = 0;
        }
        value.ok_or_else(|| Error::out_of_range("priority queue slot is vacant"))
    }

    /// The minimum element.
    pub fn top(&self) -> Result<&T> {
        self.front()
    }

    /// The minimum element.
    pub fn front(&self) -> Result<&T> {
        self.live()
            .first()
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::out_of_range("front of empty priority queue"))
    }

    /// The maximum element.
    pub fn back(&self) -> Result<&T> {
        self.live()
            .last()
            .and_then(Option::as_ref)
            .ok_or_else(|| Error::out_of_range("back of empty priority queue"))
    }

    /// Number of queued elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.tail - self.head
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Slots allocated, live or free.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every element, keeping the allocation.
    pub fn clear(&mut self) {
        for slot in &mut self.slots[self.head..self.tail] {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
    }

    /// Iterate from minimum to maximum.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.live().iter().flatten()
    }

    fn live(&self) -> &[Option<T>] {
        &self.slots[self.head..self.tail]
    }
}

impl<T: fmt::Debug, F> fmt::Debug for PriorityQueue<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
