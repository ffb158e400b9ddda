//! Independent sessions on a thread pool.
//!
//! Each buffer gets its own encoder or decoder; nothing is shared between
//! them, so the only parallelism is across buffers. Output order matches
//! input order.

use rayon::prelude::*;
use tracing::debug;

use crate::config::CoderConfig;
use crate::error::Result;
use crate::{compress_with, decompress_with};

/// Compress every buffer in `inputs`. Fails with the first error in input
/// order.
pub fn compress_all<T>(config: &CoderConfig, inputs: &[T]) -> Result<Vec<Vec<u8>>>
where
    T: AsRef<[u8]> + Sync,
{
    config.validate()?;
    debug!(buffers = inputs.len(), "compressing batch");
    inputs
        .par_iter()
        .map(|input| compress_with(config, input.as_ref()))
        .collect()
}

/// Decompress every stream in `inputs`.
pub fn decompress_all<T>(config: &CoderConfig, inputs: &[T]) -> Result<Vec<Vec<u8>>>
where
    T: AsRef<[u8]> + Sync,
{
    config.validate()?;
    debug!(buffers = inputs.len(), "decompressing batch");
    inputs
        .par_iter()
        .map(|input| decompress_with(config, input.as_ref()))
        .collect()
}
