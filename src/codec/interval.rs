//! Interval narrowing and renormalization shared by encoder and decoder.
//!
//! The interval `[low, high]` lives in a `W`-bit code space. After each
//! narrowing step the engine rescales it until none of these hold:
//!
//! | Case | Condition | Offset | Encoder | Decoder |
//! |------|-----------|--------|---------|---------|
//! | E1 | `high < HALF` | 0 | emit `0` + pending `1`s | - |
//! | E2 | `low >= HALF` | `HALF` | emit `1` + pending `0`s | subtract offset |
//! | E3 | `QUARTER <= low && high < 3/4` | `QUARTER` | `pending += 1` | subtract offset |
//!
//! Every firing doubles the interval (`low = 2*low`, `high = 2*high + 1`);
//! the decoder also shifts one fresh bit into its value register. The cases
//! are checked in table order, so E3 only fires when E1 and E2 do not.

use super::model::SymbolRange;
use crate::config::Bounds;
use crate::error::Result;

/// Bit effects of renormalization for one side of the channel.
pub(crate) trait RenormSide {
    /// E1 or E2 settled the leading bit. `pending` complements of `bit`
    /// are owed from earlier E3 steps.
    fn resolve(&mut self, bit: bool, pending: u32) -> Result<()>;

    /// The interval was shifted down by `offset` and doubled.
    fn shift(&mut self, offset: u32) -> Result<()>;
}

/// The `[low, high]` registers plus the pending-bit counter.
#[derive(Debug, Clone)]
pub(crate) struct Interval {
    low: u32,
    high: u32,
    pending: u32,
    bounds: Bounds,
}

impl Interval {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            low: 0,
            high: bounds.max,
            pending: 0,
            bounds,
        }
    }

    /// `high - low + 1`, which is `2^W` for the full interval.
    #[inline]
    pub fn range(&self) -> u64 {
        u64::from(self.high - self.low) + 1
    }

    /// Shrink the interval to the sub-range owned by one symbol.
    #[inline]
    pub fn narrow(&mut self, r: SymbolRange) {
        debug_assert!(r.low < r.high && r.high <= r.total);
        let range = self.range();
        let total = u64::from(r.total);
        let low = u64::from(self.low);
        self.high = (low + range * u64::from(r.high) / total - 1) as u32;
        self.low = (low + range * u64::from(r.low) / total) as u32;
    }

    /// Map a decoder value back into the model's count space.
    ///
    /// This is the inverse of [`narrow`](Self::narrow): the result lies in
    /// the range of the symbol whose narrowing keeps `value` inside the
    /// interval.
    #[inline]
    pub fn scaled_count(&self, value: u32, total: u32) -> u32 {
        debug_assert!(self.low <= value && value <= self.high);
        let offset = u64::from(value - self.low) + 1;
        ((offset * u64::from(total) - 1) / self.range()) as u32
    }

    /// Rescale until the interval is wider than a quarter of the code space
    /// around the midpoint. Returns the number of doublings.
    pub fn renormalize<S: RenormSide>(&mut self, side: &mut S) -> Result<u32> {
        let b = self.bounds;
        let mut shifts = 0;
        loop {
            let offset = if self.high < b.half {
                side.resolve(false, self.pending)?;
                self.pending = 0;
                0
            } else if self.low >= b.half {
                side.resolve(true, self.pending)?;
                self.pending = 0;
                b.half
            } else if self.low >= b.quarter && self.high < b.three_quarters {
                self.pending += 1;
                b.quarter
            } else {
                break;
            };

            self.low = (self.low - offset) << 1;
            self.high = ((self.high - offset) << 1) | 1;
            side.shift(offset)?;
            shifts += 1;
        }
        debug_assert!(self.is_normalized());
        Ok(shifts)
    }

    /// Settle the final interval with two more bits: `01` when `low` is
    /// below the first quarter, `10` otherwise. Either pair pins a point
    /// inside `[low, high]` whatever bits follow.
    pub fn terminate<S: RenormSide>(&mut self, side: &mut S) -> Result<()> {
        self.pending += 1;
        side.resolve(self.low >= self.bounds.quarter, self.pending)?;
        self.pending = 0;
        Ok(())
    }

    /// Whether no renormalization case applies.
    pub fn is_normalized(&self) -> bool {
        let b = self.bounds;
        self.low < self.high
            && self.high >= b.half
            && self.low < b.half
            && !(self.low >= b.quarter && self.high < b.three_quarters)
    }

    #[cfg(test)]
    pub fn low(&self) -> u32 {
        self.low
    }

    #[cfg(test)]
    pub fn high(&self) -> u32 {
        self.high
    }

    #[cfg(test)]
    pub fn pending(&self) -> u32 {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what renormalization asked of it.
    #[derive(Default)]
    struct Recorder {
        bits: Vec<bool>,
        offsets: Vec<u32>,
    }

    impl RenormSide for Recorder {
        fn resolve(&mut self, bit: bool, pending: u32) -> Result<()> {
            self.bits.push(bit);
            self.bits.extend(std::iter::repeat(!bit).take(pending as usize));
            Ok(())
        }

        fn shift(&mut self, offset: u32) -> Result<()> {
            self.offsets.push(offset);
            Ok(())
        }
    }

    fn interval(low: u32, high: u32) -> Interval {
        let mut i = Interval::new(Bounds::new(16));
        i.low = low;
        i.high = high;
        i
    }

    #[test]
    fn test_full_interval_is_normalized() {
        let i = Interval::new(Bounds::new(16));
        assert_eq!(i.range(), 1 << 16);
        assert!(i.is_normalized());
    }

    #[test]
    fn test_narrow_uniform_quarters() {
        let mut i = Interval::new(Bounds::new(16));
        // Second quarter from the top of a 4-count table.
        i.narrow(SymbolRange {
            high: 3,
            low: 2,
            total: 4,
        });
        assert_eq!(i.low(), 0x8000);
        assert_eq!(i.high(), 0xBFFF);
    }

    #[test]
    fn test_e1_emits_zero() {
        let mut i = interval(0x1000, 0x5FFF);
        let mut side = Recorder::default();
        let shifts = i.renormalize(&mut side).unwrap();
        assert_eq!(shifts, 1);
        assert_eq!(side.bits, vec![false]);
        assert_eq!(side.offsets, vec![0]);
        assert_eq!((i.low(), i.high()), (0x2000, 0xBFFF));
    }

    #[test]
    fn test_e2_emits_one_and_subtracts_half() {
        let mut i = interval(0x9000, 0xFFFF);
        let mut side = Recorder::default();
        i.renormalize(&mut side).unwrap();
        assert_eq!(side.bits, vec![true]);
        assert_eq!(side.offsets, vec![0x8000]);
        assert_eq!((i.low(), i.high()), (0x2000, 0xFFFF));
    }

    #[test]
    fn test_e3_defers_then_resolves_with_complements() {
        let mut i = interval(0x7000, 0x8FFF);
        let mut side = Recorder::default();
        i.renormalize(&mut side).unwrap();
        // [0x7000, 0x8FFF] -> [0x6000, 0x9FFF] -> [0x4000, 0xBFFF] -> full;
        // no bit is known yet.
        assert!(side.bits.is_empty());
        assert_eq!(side.offsets, vec![0x4000, 0x4000, 0x4000]);
        assert_eq!(i.pending(), 3);
        assert_eq!((i.low(), i.high()), (0x0000, 0xFFFF));

        // Resolving upward flushes the deferred guesses as zeros.
        i.narrow(SymbolRange {
            high: 4,
            low: 3,
            total: 4,
        });
        i.renormalize(&mut side).unwrap();
        assert_eq!(&side.bits[..4], &[true, false, false, false]);
        assert_eq!(i.pending(), 0);
    }

    #[test]
    fn test_priority_prefers_e1_over_e3() {
        // Inside the E3 band but entirely below the midpoint.
        let mut i = interval(0x4000, 0x7FFF);
        let mut side = Recorder::default();
        i.renormalize(&mut side).unwrap();
        assert_eq!(side.bits.first(), Some(&false));
        assert_eq!(side.offsets.first(), Some(&0));
    }

    #[test]
    fn test_terminate_low_interval() {
        let mut i = interval(0x3000, 0x9000);
        let mut side = Recorder::default();
        i.terminate(&mut side).unwrap();
        assert_eq!(side.bits, vec![false, true]);
        assert_eq!(i.pending(), 0);
    }

    #[test]
    fn test_terminate_high_interval_flushes_pending() {
        let mut i = interval(0x5000, 0xD000);
        i.pending = 2;
        let mut side = Recorder::default();
        i.terminate(&mut side).unwrap();
        assert_eq!(side.bits, vec![true, false, false, false]);
    }

    #[test]
    fn test_scaled_count_inverts_narrow() {
        let table = [(10u32, 7u32), (7, 6), (6, 1), (1, 0)];
        let total = 10;
        let base = interval(0x1234, 0xBEEF);
        for &(high, low) in &table {
            let mut narrowed = base.clone();
            let r = SymbolRange { high, low, total };
            narrowed.narrow(r);
            for value in [narrowed.low(), narrowed.high()] {
                let count = base.scaled_count(value, total);
                assert!(low <= count && count < high, "value {value:#x} -> {count}");
            }
        }
    }

    #[test]
    fn test_renormalize_postcondition_holds() {
        let mut i = Interval::new(Bounds::new(16));
        let mut side = Recorder::default();
        let steps = [(300u32, 299u32, 300u32), (5, 0, 300), (150, 149, 300), (2, 1, 2)];
        for _ in 0..50 {
            for &(high, low, total) in &steps {
                i.narrow(SymbolRange { high, low, total });
                i.renormalize(&mut side).unwrap();
                assert!(i.is_normalized());
                assert!(i.range() > u64::from(Bounds::new(16).quarter));
            }
        }
    }
}
