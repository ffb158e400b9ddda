//! Session configuration.
//!
//! A compressed stream carries no header, so the encoder and every decoder
//! reading its output must be built from the same [`CoderConfig`].

use crate::codec::ALPHABET_SIZE;
use crate::error::{CodecError, Result};

/// Default interval width in bits.
pub const DEFAULT_PRECISION_BITS: u32 = 16;

/// Default ceiling for the model's total count (`2^14 - 1`).
pub const DEFAULT_RESCALE_CEILING: u32 = 16383;

/// Smallest supported interval width.
pub const MIN_PRECISION_BITS: u32 = 12;

/// Largest supported interval width. `2 * high + 1` must fit a `u32`.
pub const MAX_PRECISION_BITS: u32 = 31;

/// Coder options shared by encoder and decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoderConfig {
    /// Width `W` of the `low`/`high`/value registers.
    pub precision_bits: u32,
    /// Largest total count the model may hold between symbols.
    pub rescale_ceiling: u32,
    /// Fail decoding once more than `W` zero bits were synthesized past the
    /// end of the source, instead of padding forever.
    pub strict_padding: bool,
}

impl Default for CoderConfig {
    fn default() -> Self {
        Self {
            precision_bits: DEFAULT_PRECISION_BITS,
            rescale_ceiling: DEFAULT_RESCALE_CEILING,
            strict_padding: false,
        }
    }
}

impl CoderConfig {
    /// Set the interval width `W`.
    pub fn with_precision_bits(mut self, bits: u32) -> Self {
        self.precision_bits = bits;
        self
    }

    /// Set the model's total-count ceiling.
    pub fn with_rescale_ceiling(mut self, ceiling: u32) -> Self {
        self.rescale_ceiling = ceiling;
        self
    }

    /// Enable or disable strict end-of-input handling.
    pub fn with_strict_padding(mut self, strict: bool) -> Self {
        self.strict_padding = strict;
        self
    }

    /// Check that the configuration can drive a session without overflow.
    ///
    /// After renormalization the interval is always wider than a quarter of
    /// the code space, so a total of at most `2^(W-2)` leaves every symbol a
    /// non-empty sub-interval and keeps `range * cum` below `2^(2W-1)`.
    pub fn validate(&self) -> Result<()> {
        let bits = self.precision_bits;
        if !(MIN_PRECISION_BITS..=MAX_PRECISION_BITS).contains(&bits) {
            return Err(CodecError::invalid_config(format!(
                "precision_bits must be in {}..={}, got {}",
                MIN_PRECISION_BITS, MAX_PRECISION_BITS, bits
            )));
        }

        let quarter = 1u32 << (bits - 2);
        if self.rescale_ceiling > quarter {
            return Err(CodecError::invalid_config(format!(
                "rescale_ceiling {} exceeds a quarter of the {}-bit code space ({})",
                self.rescale_ceiling, bits, quarter
            )));
        }

        // Halving rounds up, so the ceiling needs room for one count per
        // symbol on each side of the halving.
        let floor = 2 * ALPHABET_SIZE as u32;
        if self.rescale_ceiling < floor {
            return Err(CodecError::invalid_config(format!(
                "rescale_ceiling {} is below the minimum of {}",
                self.rescale_ceiling, floor
            )));
        }

        Ok(())
    }

    /// Interval boundaries derived from the precision.
    pub(crate) fn bounds(&self) -> Bounds {
        Bounds::new(self.precision_bits)
    }
}

/// Fixed points of the `W`-bit code space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub bits: u32,
    pub max: u32,
    pub quarter: u32,
    pub half: u32,
    pub three_quarters: u32,
}

impl Bounds {
    pub fn new(bits: u32) -> Self {
        let quarter = 1u32 << (bits - 2);
        Self {
            bits,
            max: ((1u64 << bits) - 1) as u32,
            quarter,
            half: 2 * quarter,
            three_quarters: 3 * quarter,
        }
    }
}
