//! Bounded-domain integer set with O(1) insert, membership and clear.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! The two backing arrays are never re-zeroed between uses. A value `i` is a
//! member only when `sparse[i]` points inside the live prefix of `dense` and
//! that slot points back at `i`, so stale entries left over from an earlier
//! generation are rejected by the cross-check instead of by clearing memory.
//!
//! The simulator keeps one of these per working set (active states, matched
//! states) and the epsilon closure uses one to mark visited states, so every
//! input byte costs a `clear()` rather than an O(capacity) reset.

use std::fmt;

/// A set of integers drawn from `[0, capacity)`.
#[derive(Clone)]
pub struct SparseSet {
    /// Number of live members; `dense[..len]` holds them in insertion order.
    len: usize,
    dense: Box<[usize]>,
    /// `sparse[i]` is the slot of `i` in `dense`, when `i` is a member.
    sparse: Box<[usize]>,
}

impl SparseSet {
    /// Creates an empty set able to hold values in `[0, capacity)`.
    pub fn new(capacity: usize) -> Self {
        SparseSet {
            len: 0,
            dense: vec![0; capacity].into_boxed_slice(),
            sparse: vec![0; capacity].into_boxed_slice(),
        }
    }

    /// Changes the domain to `[0, capacity)`. The set is emptied.
    pub fn resize(&mut self, capacity: usize) {
        if capacity != self.capacity() {
            *self = SparseSet::new(capacity);
        } else {
            self.clear();
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `value` to the set. Returns false if it was already a member.
    ///
    /// Adding a present value is a no-op, so callers may add unconditionally.
    ///
    /// # Panics
    ///
    /// Panics if `value >= capacity`.
    #[inline]
    pub fn insert(&mut self, value: usize) -> bool {
        if self.contains(value) {
            return false;
        }
        // Every member is distinct and below capacity, so there is room.
        self.dense[self.len] = value;
        self.sparse[value] = self.len;
        self.len += 1;
        true
    }

    /// Returns true if `value` is in the set.
    ///
    /// # Panics
    ///
    /// Panics if `value >= capacity`.
    #[inline]
    pub fn contains(&self, value: usize) -> bool {
        let slot = self.sparse[value];
        slot < self.len && self.dense[slot] == value
    }

    /// Empties the set without touching the backing arrays.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Iterates over the members in insertion order, oldest first.
    #[inline]
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, usize>> {
        self.dense[..self.len].iter().copied()
    }
}

impl<'a> IntoIterator for &'a SparseSet {
    type Item = usize;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<usize> for SparseSet {
    fn extend<T: IntoIterator<Item = usize>>(&mut self, iter: T) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl fmt::Debug for SparseSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
