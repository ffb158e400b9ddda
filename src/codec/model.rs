//! Adaptive frequency model over bytes plus an end marker.
//!
//! Symbols are ordered by byte value with [`Symbol::END`] last. The
//! cumulative table counts from the *end* of the alphabet:
//!
//! ```text
//! cum[s] = freq[s] + freq[s + 1] + ... + freq[END]
//! cum[0] = total, cum[ALPHABET_SIZE] = 0
//! ```
//!
//! so symbol `s` owns the counts `cum[s + 1] .. cum[s]`.
//!
//! Encoder and decoder each own a model and must feed it the same symbols in
//! the same order. Nothing detects a divergence; the decoder just starts
//! producing different bytes.

use tracing::trace;

use super::ALPHABET_SIZE;

/// One entry of the coder alphabet: a byte value or the end marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u16);

impl Symbol {
    /// End-of-stream marker.
    pub const END: Self = Self(256);

    /// Index of this symbol in the model tables.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The byte value, or `None` for the end marker.
    #[inline]
    pub fn as_byte(self) -> Option<u8> {
        u8::try_from(self.0).ok()
    }

    /// Whether this is the end marker.
    #[inline]
    pub fn is_end(self) -> bool {
        self == Self::END
    }
}

impl From<u8> for Symbol {
    #[inline]
    fn from(byte: u8) -> Self {
        Self(u16::from(byte))
    }
}

/// Cumulative counts owned by one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolRange {
    /// Upper bound (exclusive), `cum[s]`.
    pub high: u32,
    /// Lower bound (inclusive), `cum[s + 1]`.
    pub low: u32,
    /// Total count, `cum[0]`.
    pub total: u32,
}

/// Adaptive frequency table with halving rescale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptiveModel {
    freq: [u32; ALPHABET_SIZE],
    cum: [u32; ALPHABET_SIZE + 1],
    ceiling: u32,
    observed: u64,
    rescales: u32,
}

impl AdaptiveModel {
    /// Create a model with every symbol counted once.
    pub fn new(ceiling: u32) -> Self {
        debug_assert!(ceiling >= 2 * ALPHABET_SIZE as u32);
        let mut model = Self {
            freq: [1; ALPHABET_SIZE],
            cum: [0; ALPHABET_SIZE + 1],
            ceiling,
            observed: 0,
            rescales: 0,
        };
        model.rebuild();
        model
    }

    /// Counts needed to narrow an interval for `symbol`.
    #[inline]
    pub fn range_of(&self, symbol: Symbol) -> SymbolRange {
        let s = symbol.index();
        SymbolRange {
            high: self.cum[s],
            low: self.cum[s + 1],
            total: self.cum[0],
        }
    }

    /// Find the symbol whose range contains `count`.
    ///
    /// `count` must lie in `0..total`. Each point belongs to exactly one
    /// symbol: a count equal to `cum[s + 1]` belongs to `s`, never to
    /// `s + 1`. Symbols all have non-zero frequency, so there are no empty
    /// ranges to skip over.
    #[inline]
    pub fn locate(&self, count: u32) -> Symbol {
        debug_assert!(count < self.total());
        // cum[1..] is non-increasing and ends in 0, so the search always
        // lands on a valid index.
        let index = self.cum[1..].partition_point(|&c| c > count);
        Symbol(index as u16)
    }

    /// Count one occurrence of `symbol`, halving every count if the total
    /// passes the ceiling.
    pub fn observe(&mut self, symbol: Symbol) {
        let s = symbol.index();
        self.freq[s] += 1;
        for c in &mut self.cum[..=s] {
            *c += 1;
        }
        self.observed += 1;

        if self.cum[0] > self.ceiling {
            self.rescale();
        }
    }

    fn rescale(&mut self) {
        for f in &mut self.freq {
            *f = f.div_ceil(2);
        }
        self.rebuild();
        self.rescales += 1;
        trace!(
            observed = self.observed,
            total = self.cum[0],
            rescales = self.rescales,
            "model rescaled"
        );
    }

    fn rebuild(&mut self) {
        let mut acc = 0;
        self.cum[ALPHABET_SIZE] = 0;
        for s in (0..ALPHABET_SIZE).rev() {
            acc += self.freq[s];
            self.cum[s] = acc;
        }
    }

    /// Sum of all counts.
    #[inline]
    pub fn total(&self) -> u32 {
        self.cum[0]
    }

    /// Current count of `symbol`.
    pub fn frequency(&self, symbol: Symbol) -> u32 {
        self.freq[symbol.index()]
    }

    /// The cumulative table, `ALPHABET_SIZE + 1` entries.
    pub fn cumulative(&self) -> &[u32] {
        &self.cum
    }

    /// Number of `observe` calls so far.
    pub fn observed(&self) -> u64 {
        self.observed
    }

    /// Number of halving passes so far.
    pub fn rescales(&self) -> u32 {
        self.rescales
    }

    /// Largest total allowed between updates.
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }
}
