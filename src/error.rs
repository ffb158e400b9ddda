//! Error types for encoding and decoding sessions.
//!
//! This module provides the [`CodecError`] type which covers every way a coder
//! session can fail.
//!
//! ## Error Categories
//!
//! | Category | Errors | Description |
//! |----------|--------|-------------|
//! | Resources | [`Allocation`] | An internal buffer could not be reserved |
//! | I/O | [`Read`], [`Write`] | The source or sink reported a failure |
//! | Setup | [`InvalidConfig`] | The session configuration was rejected |
//! | Stream | [`TruncatedStream`] | Strict decoding ran past the end of the input |
//!
//! There is deliberately no "corrupt data" category. Every bit sequence is a
//! valid code for *some* symbol sequence, so a decoder fed foreign data keeps
//! producing bytes until the end marker happens to come up. With the default
//! lenient padding this may never happen; enable
//! [`CoderConfig::strict_padding`] to bound how far a decoder reads past its
//! input.
//!
//! ## Example
//!
//! ```rust
//! use arith_stream::{decompress_with, CodecError, CoderConfig};
//!
//! let config = CoderConfig::default().with_strict_padding(true);
//! match decompress_with(&config, &[]) {
//!     Ok(bytes) => println!("decoded {} bytes", bytes.len()),
//!     Err(CodecError::TruncatedStream { virtual_bits }) => {
//!         eprintln!("input ended {} bits early", virtual_bits)
//!     }
//!     Err(e) => eprintln!("error: {}", e),
//! }
//! ```
//!
//! [`Allocation`]: CodecError::Allocation
//! [`Read`]: CodecError::Read
//! [`Write`]: CodecError::Write
//! [`InvalidConfig`]: CodecError::InvalidConfig
//! [`TruncatedStream`]: CodecError::TruncatedStream
//! [`CoderConfig::strict_padding`]: crate::CoderConfig::strict_padding

use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// Error type for coder sessions.
///
/// A session that returns an error is finished: the adaptive model depends
/// on every symbol seen so far, so there is no way to resume or retry it.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Reserving an internal table or buffer failed.
    #[error("allocation failed: could not reserve {requested} bytes")]
    Allocation {
        /// Number of bytes that were requested.
        requested: usize,
    },

    /// The underlying byte source reported a failure.
    #[error("stream read failed: {0}")]
    Read(#[source] io::Error),

    /// The underlying byte sink reported a failure.
    #[error("stream write failed: {0}")]
    Write(#[source] io::Error),

    /// The coder configuration is not usable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was violated.
        reason: String,
    },

    /// A strict decoder consumed more padding bits than any encoder emits.
    ///
    /// Only returned when strict padding is enabled.
    #[error("stream truncated: decoder needed {virtual_bits} bits past the end of input")]
    TruncatedStream {
        /// Number of zero bits synthesized past the end of the source.
        virtual_bits: u64,
    },
}

impl CodecError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn allocation(requested: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| Self::Allocation { requested }
    }

    /// Whether the error came from the source or sink collaborator.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Read(_) | Self::Write(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CodecError>;
