//! Fixed-length boolean storage shared by field-sets and option collections.
//!
//! Field-sets use it as the transfer format between a concrete struct and the
//! generic algebra; option collections use it as their "true-set", indexed by
//! member ordinal.

/// A compact bitset representing "slot is true" for indices `0..len`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldBits {
    len: usize,
    bits: Box<[u64]>,
}

impl FieldBits {
    /// Create an all-false set for `len` slots.
    #[must_use]
    pub fn empty(len: usize) -> Self {
        let words = len.div_ceil(64);
        Self {
            len,
            bits: vec![0u64; words].into_boxed_slice(),
        }
    }

    /// Create an all-true set for `len` slots.
    #[must_use]
    pub fn full(len: usize) -> Self {
        Self::empty(len).not()
    }

    /// Create a set whose slot `idx` is `f(idx)`.
    #[must_use]
    pub fn from_fn(len: usize, mut f: impl FnMut(usize) -> bool) -> Self {
        let mut s = Self::empty(len);
        for idx in 0..len {
            s.set(idx, f(idx));
        }
        s
    }

    /// Number of slots represented by this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True if `len == 0`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set or clear a slot.
    ///
    /// Indices outside `0..len` are ignored.
    pub fn set(&mut self, idx: usize, value: bool) {
        if idx >= self.len {
            return;
        }
        let word = idx / 64;
        let bit = idx % 64;
        if let Some(w) = self.bits.get_mut(word) {
            if value {
                *w |= 1u64 << bit;
            } else {
                *w &= !(1u64 << bit);
            }
        }
    }

    /// Copy of this set with one slot changed.
    #[must_use]
    pub fn with(&self, idx: usize, value: bool) -> Self {
        let mut s = self.clone();
        s.set(idx, value);
        s
    }

    /// Check whether a slot is true.
    #[must_use]
    pub fn is_set(&self, idx: usize) -> bool {
        if idx >= self.len {
            return false;
        }
        let word = idx / 64;
        let bit = idx % 64;
        self.bits
            .get(word)
            .is_some_and(|w| (w & (1u64 << bit)) != 0)
    }

    /// Number of true slots.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of the true slots, ascending.
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len).filter(|&idx| self.is_set(idx))
    }

    /// Slots true in `self` and false in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & !b)
    }

    /// Slots true in exactly one of `self` and `other`.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a ^ b)
    }

    /// Slots true in both.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a & b)
    }

    /// Slots true in either.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.zip_with(other, |a, b| a | b)
    }

    /// Every slot flipped.
    #[must_use]
    pub fn not(&self) -> Self {
        let mut s = Self {
            len: self.len,
            bits: self.bits.iter().map(|w| !w).collect(),
        };
        s.clear_tail();
        s
    }

    /// Word-wise combination. Both operands are expected to have the same
    /// length; the result takes `self`'s length and a shorter `other` reads
    /// as false in its missing words.
    fn zip_with(&self, other: &Self, op: impl Fn(u64, u64) -> u64) -> Self {
        let mut s = Self {
            len: self.len,
            bits: self
                .bits
                .iter()
                .enumerate()
                .map(|(i, &a)| op(a, other.bits.get(i).copied().unwrap_or(0)))
                .collect(),
        };
        s.clear_tail();
        s
    }

    /// Keep bits past `len` zero so equality and hashing stay structural.
    fn clear_tail(&mut self) {
        let rem = self.len % 64;
        if rem == 0 {
            return;
        }
        if let Some(last) = self.bits.last_mut() {
            *last &= (1u64 << rem) - 1;
        }
    }
}
