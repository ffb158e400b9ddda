//! Encoder session.

use std::io::{self, Read, Write};

use tracing::debug;

use super::bit_io::{BitWriter, CHUNK_SIZE};
use super::interval::{Interval, RenormSide};
use super::model::{AdaptiveModel, Symbol};
use super::SessionStats;
use crate::config::CoderConfig;
use crate::error::{CodecError, Result};

impl<W: Write> RenormSide for BitWriter<W> {
    #[inline]
    fn resolve(&mut self, bit: bool, pending: u32) -> Result<()> {
        self.write_bit(bit)?;
        self.write_repeated(!bit, pending)
    }

    #[inline]
    fn shift(&mut self, _offset: u32) -> Result<()> {
        Ok(())
    }
}

/// Adaptive arithmetic encoder writing to `W`.
///
/// Feed bytes with [`encode_byte`](Self::encode_byte),
/// [`encode_all`](Self::encode_all) or [`encode_reader`](Self::encode_reader),
/// then call [`finish`](Self::finish) to code the end marker and flush.
/// Dropping an encoder without finishing leaves the sink with an unusable
/// prefix.
pub struct Encoder<W: Write> {
    writer: BitWriter<W>,
    model: AdaptiveModel,
    interval: Interval,
    stats: SessionStats,
}

impl<W: Write> Encoder<W> {
    /// Start a session writing to `sink`.
    pub fn new(sink: W, config: &CoderConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            precision_bits = config.precision_bits,
            rescale_ceiling = config.rescale_ceiling,
            "encoder session started"
        );
        Ok(Self {
            writer: BitWriter::new(sink)?,
            model: AdaptiveModel::new(config.rescale_ceiling),
            interval: Interval::new(config.bounds()),
            stats: SessionStats::default(),
        })
    }

    /// Code one input byte.
    #[inline]
    pub fn encode_byte(&mut self, byte: u8) -> Result<()> {
        let symbol = Symbol::from(byte);
        self.encode_symbol(symbol)?;
        self.model.observe(symbol);
        self.stats.bytes_in += 1;
        Ok(())
    }

    /// Code a slice of input bytes.
    pub fn encode_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &b in bytes {
            self.encode_byte(b)?;
        }
        Ok(())
    }

    /// Code everything `source` yields until it reports end of input.
    /// Returns the number of bytes consumed.
    pub fn encode_reader<R: Read>(&mut self, mut source: R) -> Result<u64> {
        let mut buf = [0u8; CHUNK_SIZE];
        let mut consumed = 0u64;
        loop {
            let n = match source.read(&mut buf) {
                Ok(0) => return Ok(consumed),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(CodecError::Read(e)),
            };
            self.encode_all(&buf[..n])?;
            consumed += n as u64;
        }
    }

    fn encode_symbol(&mut self, symbol: Symbol) -> Result<()> {
        self.interval.narrow(self.model.range_of(symbol));
        let shifts = self.interval.renormalize(&mut self.writer)?;
        self.stats.shifts += u64::from(shifts);
        self.stats.symbols += 1;
        Ok(())
    }

    /// The model as it stands after the symbols coded so far.
    pub fn model(&self) -> &AdaptiveModel {
        &self.model
    }

    /// Code the end marker, emit the disambiguating bits, flush and return
    /// the sink.
    ///
    /// The end marker is not counted in the model, matching the decoder,
    /// which stops as soon as it sees it.
    pub fn finish(mut self) -> Result<(W, SessionStats)> {
        self.encode_symbol(Symbol::END)?;
        self.interval.terminate(&mut self.writer)?;

        let mut stats = self.stats;
        stats.bytes_out = self.writer.bits_written().div_ceil(8);
        stats.rescales = self.model.rescales();
        let sink = self.writer.finish()?;

        debug!(
            bytes_in = stats.bytes_in,
            bytes_out = stats.bytes_out,
            rescales = stats.rescales,
            "encoder session finished"
        );
        Ok((sink, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(data: &[u8]) -> (Vec<u8>, SessionStats) {
        let mut encoder = Encoder::new(Vec::new(), &CoderConfig::default()).unwrap();
        encoder.encode_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_empty_input_still_emits_bits() {
        let (out, stats) = encode(&[]);
        assert!(!out.is_empty());
        assert_eq!(stats.bytes_in, 0);
        assert_eq!(stats.symbols, 1);
        assert_eq!(stats.bytes_out, out.len() as u64);
    }

    #[test]
    fn test_output_is_deterministic() {
        let data = b"the quick brown fox jumps over the lazy dog";
        assert_eq!(encode(data).0, encode(data).0);
        assert_ne!(encode(data).0, encode(b"the quick brown fox jumps over the lazy cat").0);
    }

    #[test]
    fn test_encode_reader_matches_encode_all() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i * i % 251) as u8).collect();

        let mut encoder = Encoder::new(Vec::new(), &CoderConfig::default()).unwrap();
        let consumed = encoder.encode_reader(data.as_slice()).unwrap();
        assert_eq!(consumed, data.len() as u64);
        let (from_reader, _) = encoder.finish().unwrap();

        assert_eq!(from_reader, encode(&data).0);
    }

    #[test]
    fn test_model_tracks_coded_bytes() {
        let mut encoder = Encoder::new(Vec::new(), &CoderConfig::default()).unwrap();
        encoder.encode_all(b"aab").unwrap();
        assert_eq!(encoder.model().frequency(Symbol::from(b'a')), 3);
        assert_eq!(encoder.model().frequency(Symbol::from(b'b')), 2);
        assert_eq!(encoder.model().observed(), 3);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = CoderConfig::default().with_precision_bits(40);
        assert!(matches!(
            Encoder::new(Vec::new(), &config),
            Err(CodecError::InvalidConfig { .. })
        ));
    }

    struct FailingSource;

    impl Read for FailingSource {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn test_source_failure_aborts() {
        let mut encoder = Encoder::new(Vec::new(), &CoderConfig::default()).unwrap();
        assert!(matches!(
            encoder.encode_reader(FailingSource),
            Err(CodecError::Read(_))
        ));
    }
}
