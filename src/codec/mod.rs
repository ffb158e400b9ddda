//! Adaptive arithmetic coding.
//!
//! This module holds the coder proper: a bit channel, an adaptive frequency
//! model and the interval engine, driven by [`Encoder`] and [`Decoder`].
//!
//! ## Alphabet
//!
//! | Symbols | Meaning |
//! |---------|---------|
//! | `0..=255` | Byte values |
//! | `256` | [`Symbol::END`], end of stream |
//!
//! ## Architecture
//!
//! ```text
//!  Encoder                               Decoder
//!  bytes + END                           BitReader
//!       ↓                                     ↓
//! ┌──────────────┐                     ┌──────────────┐
//! │ Model        │ ← range_of          │ value reg.   │ ← W-bit window
//! └──────────────┘                     └──────────────┘
//!       ↓                                     ↓
//! ┌──────────────┐                     ┌──────────────┐
//! │ Interval     │ ← narrow, E1/E2/E3  │ Model        │ ← locate
//! └──────────────┘                     └──────────────┘
//!       ↓                                     ↓
//! ┌──────────────┐                     ┌──────────────┐
//! │ BitWriter    │ ← bits + pending    │ Interval     │ ← same narrowing
//! └──────────────┘                     └──────────────┘
//!       ↓                                     ↓
//!  compressed bytes                     bytes until END
//! ```
//!
//! Both sides call [`AdaptiveModel::observe`] after every symbol, so their
//! models stay identical step for step.
//!
//! ## Wire Format
//!
//! Codeword bits packed MSB first, final byte zero padded. There is no
//! header, magic or length: the decoder stops when it decodes `END`. The
//! stream is only readable with the [`CoderConfig`](crate::CoderConfig) it
//! was written with.
//!
//! ## Example
//!
//! ```rust
//! use arith_stream::{CoderConfig, Decoder, Encoder};
//!
//! let config = CoderConfig::default();
//! let mut encoder = Encoder::new(Vec::new(), &config)?;
//! encoder.encode_all(b"abracadabra")?;
//! let (compressed, _stats) = encoder.finish()?;
//!
//! let decoder = Decoder::new(compressed.as_slice(), &config)?;
//! let bytes = decoder.collect::<Result<Vec<u8>, _>>()?;
//! assert_eq!(bytes, b"abracadabra");
//! # Ok::<(), arith_stream::CodecError>(())
//! ```

mod bit_io;
mod decoder;
mod encoder;
mod interval;
mod model;


pub use bit_io::{BitReader, BitWriter, CHUNK_SIZE};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use model::{AdaptiveModel, Symbol, SymbolRange};

/// Number of symbols: 256 byte values plus the end marker.
pub const ALPHABET_SIZE: usize = 257;

/// Counters reported when a session finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Bytes taken from the caller's source.
    pub bytes_in: u64,
    /// Bytes handed to the caller's sink.
    pub bytes_out: u64,
    /// Symbols coded, counting the end marker.
    pub symbols: u64,
    /// Interval doublings across all renormalization passes.
    pub shifts: u64,
    /// Model halving passes.
    pub rescales: u32,
    /// Zero bits read past the end of the source (decoder only).
    pub virtual_bits: u64,
}

impl SessionStats {
    /// Output size relative to input size; 0.0 for an empty input.
    pub fn ratio(&self) -> f64 {
        if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 / self.bytes_in as f64
        }
    }
}
