//! Adaptive integer arithmetic coding for byte streams.
//!
//! Compresses bytes with an order-0 adaptive model: every symbol is coded
//! into a shrinking integer interval whose width tracks the symbol's
//! running frequency, and the interval is renormalized bit by bit so a
//! 16-bit register is enough for streams of any length.
//!
//! ## Features
//! - Core library depends only on `thiserror` and `tracing`
//! - `parallel` - Code many independent buffers on a rayon thread pool
//!
//! ## Example
//!
//! ```rust
//! let compressed = arith_stream::compress(b"AAAB")?;
//! assert!(compressed.len() < 8);
//! assert_eq!(arith_stream::decompress(&compressed)?, b"AAAB");
//! # Ok::<(), arith_stream::CodecError>(())
//! ```
//!
//! ## Streams
//!
//! [`encode`] and [`decode`] work on any [`Read`]/[`Write`] pair. A
//! compressed stream has no header or length field; the decoder stops when
//! it decodes the end marker, and anything after that is left unread in the
//! source's buffer. Encoder and decoder must agree on the
//! [`CoderConfig`].
//!
//! Sessions never share state, so unrelated streams can be coded from
//! different threads. A single stream is always coded sequentially.

pub mod codec;
pub mod config;
pub mod error;

#[cfg(feature = "parallel")]
pub mod batch;

use std::io::{Read, Write};

pub use codec::{AdaptiveModel, Decoder, Encoder, SessionStats, Symbol, SymbolRange};
pub use config::CoderConfig;
pub use error::{CodecError, Result};

/// Compress everything in `source` into `sink` with the default
/// configuration.
pub fn encode<R: Read, W: Write>(source: R, sink: W) -> Result<SessionStats> {
    encode_with(&CoderConfig::default(), source, sink)
}

/// Compress everything in `source` into `sink`.
pub fn encode_with<R: Read, W: Write>(
    config: &CoderConfig,
    source: R,
    sink: W,
) -> Result<SessionStats> {
    let mut encoder = Encoder::new(sink, config)?;
    encoder.encode_reader(source)?;
    let (_, stats) = encoder.finish()?;
    Ok(stats)
}

/// Decompress one stream from `source` into `sink` with the default
/// configuration.
pub fn decode<R: Read, W: Write>(source: R, sink: W) -> Result<SessionStats> {
    decode_with(&CoderConfig::default(), source, sink)
}

/// Decompress one stream from `source` into `sink`.
pub fn decode_with<R: Read, W: Write>(
    config: &CoderConfig,
    source: R,
    sink: W,
) -> Result<SessionStats> {
    let mut decoder = Decoder::new(source, config)?;
    decoder.decode_to(sink)?;
    let (_, stats) = decoder.finish();
    Ok(stats)
}

/// Compress a buffer in memory.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with(&CoderConfig::default(), data)
}

/// Compress a buffer in memory with an explicit configuration.
pub fn compress_with(config: &CoderConfig, data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(Vec::new(), config)?;
    encoder.encode_all(data)?;
    let (out, _) = encoder.finish()?;
    Ok(out)
}

/// Decompress a buffer in memory.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with(&CoderConfig::default(), data)
}

/// Decompress a buffer written with `config`.
pub fn decompress_with(config: &CoderConfig, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve(data.len())
        .map_err(CodecError::allocation(data.len()))?;
    decode_with(config, data, &mut out)?;
    Ok(out)
}
