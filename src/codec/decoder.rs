//! Decoder session.

use std::io::{Read, Write};

use tracing::debug;

use super::bit_io::{BitReader, CHUNK_SIZE};
use super::interval::{Interval, RenormSide};
use super::model::AdaptiveModel;
use super::SessionStats;
use crate::config::CoderConfig;
use crate::error::{CodecError, Result};

/// `W`-bit window onto the code stream.
///
/// Invariant: `low <= value <= high` of the decoder's interval, for any
/// input bits. This is why a decoder cannot tell a damaged stream from a
/// good one.
struct ValueRegister<R: Read> {
    value: u32,
    reader: BitReader<R>,
    /// Virtual bits allowed before the stream counts as truncated
    limit: Option<u64>,
}

impl<R: Read> ValueRegister<R> {
    fn prime(reader: BitReader<R>, bits: u32, limit: Option<u64>) -> Result<Self> {
        let mut register = Self {
            value: 0,
            reader,
            limit,
        };
        for _ in 0..bits {
            register.value = (register.value << 1) | register.next_bit()?;
        }
        Ok(register)
    }

    #[inline]
    fn next_bit(&mut self) -> Result<u32> {
        let bit = u32::from(self.reader.read_bit()?);
        if let Some(limit) = self.limit {
            let virtual_bits = self.reader.virtual_bits();
            if virtual_bits > limit {
                return Err(CodecError::TruncatedStream { virtual_bits });
            }
        }
        Ok(bit)
    }
}

impl<R: Read> RenormSide for ValueRegister<R> {
    #[inline]
    fn resolve(&mut self, _bit: bool, _pending: u32) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn shift(&mut self, offset: u32) -> Result<()> {
        self.value = ((self.value - offset) << 1) | self.next_bit()?;
        Ok(())
    }
}

/// Adaptive arithmetic decoder reading from `R`.
///
/// Yields bytes until the end marker is decoded. With lenient padding (the
/// default) a decoder fed data that no encoder produced may keep yielding
/// bytes for a long time; see [`CoderConfig::strict_padding`].
pub struct Decoder<R: Read> {
    register: ValueRegister<R>,
    model: AdaptiveModel,
    interval: Interval,
    stats: SessionStats,
    done: bool,
}

impl<R: Read> Decoder<R> {
    /// Start a session reading from `source`. Reads the first `W` bits.
    pub fn new(source: R, config: &CoderConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            precision_bits = config.precision_bits,
            rescale_ceiling = config.rescale_ceiling,
            strict_padding = config.strict_padding,
            "decoder session started"
        );
        let bounds = config.bounds();
        let limit = config.strict_padding.then_some(u64::from(bounds.bits));
        let register = ValueRegister::prime(BitReader::new(source)?, bounds.bits, limit)?;
        Ok(Self {
            register,
            model: AdaptiveModel::new(config.rescale_ceiling),
            interval: Interval::new(bounds),
            stats: SessionStats::default(),
            done: false,
        })
    }

    /// Decode the next byte, or `None` once the end marker was reached.
    ///
    /// After an error the session is over and every later call returns
    /// `None`.
    pub fn decode_byte(&mut self) -> Result<Option<u8>> {
        if self.done {
            return Ok(None);
        }
        let step = self.step();
        if !matches!(step, Ok(Some(_))) {
            self.done = true;
        }
        step
    }

    fn step(&mut self) -> Result<Option<u8>> {
        let total = self.model.total();
        let count = self.interval.scaled_count(self.register.value, total);
        let symbol = self.model.locate(count);
        self.stats.symbols += 1;

        let Some(byte) = symbol.as_byte() else {
            return Ok(None);
        };

        self.interval.narrow(self.model.range_of(symbol));
        let shifts = self.interval.renormalize(&mut self.register)?;
        self.stats.shifts += u64::from(shifts);
        self.model.observe(symbol);
        self.stats.bytes_out += 1;
        Ok(Some(byte))
    }

    /// Decode everything up to the end marker into `sink`. Returns the
    /// number of bytes written.
    pub fn decode_to<W: Write>(&mut self, mut sink: W) -> Result<u64> {
        let mut staged = Vec::new();
        staged
            .try_reserve_exact(CHUNK_SIZE)
            .map_err(CodecError::allocation(CHUNK_SIZE))?;
        let mut written = 0u64;

        while let Some(byte) = self.decode_byte()? {
            staged.push(byte);
            if staged.len() == CHUNK_SIZE {
                sink.write_all(&staged).map_err(CodecError::Write)?;
                written += staged.len() as u64;
                staged.clear();
            }
        }
        sink.write_all(&staged).map_err(CodecError::Write)?;
        written += staged.len() as u64;
        sink.flush().map_err(CodecError::Write)?;
        Ok(written)
    }

    /// Whether the end marker was decoded or the session failed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The model as it stands after the symbols decoded so far.
    pub fn model(&self) -> &AdaptiveModel {
        &self.model
    }

    /// End the session, returning the source and the session counters.
    pub fn finish(self) -> (R, SessionStats) {
        let mut stats = self.stats;
        stats.bytes_in = self.register.reader.bytes_read();
        stats.virtual_bits = self.register.reader.virtual_bits();
        stats.rescales = self.model.rescales();
        debug!(
            bytes_in = stats.bytes_in,
            bytes_out = stats.bytes_out,
            virtual_bits = stats.virtual_bits,
            "decoder session finished"
        );
        (self.register.reader.into_inner(), stats)
    }
}

impl<R: Read> Iterator for Decoder<R> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_byte().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encoder;

    fn encode(config: &CoderConfig, data: &[u8]) -> Vec<u8> {
        let mut encoder = Encoder::new(Vec::new(), config).unwrap();
        encoder.encode_all(data).unwrap();
        encoder.finish().unwrap().0
    }

    #[test]
    fn test_decode_byte_stops_at_end() {
        let config = CoderConfig::default();
        let compressed = encode(&config, b"hi");
        let mut decoder = Decoder::new(compressed.as_slice(), &config).unwrap();

        assert_eq!(decoder.decode_byte().unwrap(), Some(b'h'));
        assert_eq!(decoder.decode_byte().unwrap(), Some(b'i'));
        assert!(!decoder.is_done());
        assert_eq!(decoder.decode_byte().unwrap(), None);
        assert!(decoder.is_done());
        assert_eq!(decoder.decode_byte().unwrap(), None);
    }

    #[test]
    fn test_decode_to_sink() {
        let config = CoderConfig::default();
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 17 + i % 5) as u8).collect();
        let compressed = encode(&config, &data);

        let mut decoder = Decoder::new(compressed.as_slice(), &config).unwrap();
        let mut out = Vec::new();
        assert_eq!(decoder.decode_to(&mut out).unwrap(), data.len() as u64);
        assert_eq!(out, data);

        let (_, stats) = decoder.finish();
        assert_eq!(stats.bytes_out, data.len() as u64);
        assert_eq!(stats.symbols, data.len() as u64 + 1);
        assert!(stats.bytes_in <= compressed.len() as u64);
    }

    #[test]
    fn test_iterator_collects_bytes() {
        let config = CoderConfig::default();
        let compressed = encode(&config, b"iterator");
        let decoded: Vec<u8> = Decoder::new(compressed.as_slice(), &config)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(decoded, b"iterator");
    }

    #[test]
    fn test_empty_source_decodes_to_end() {
        // All-zero bits put the value at the bottom of the interval, which
        // belongs to the end marker.
        let mut decoder = Decoder::new(&[][..], &CoderConfig::default()).unwrap();
        assert_eq!(decoder.decode_byte().unwrap(), None);
        let (_, stats) = decoder.finish();
        assert_eq!(stats.virtual_bits, 16);
    }

    #[test]
    fn test_strict_padding_accepts_encoder_output() {
        let config = CoderConfig::default().with_strict_padding(true);
        let cases: [&[u8]; 4] = [
            b"",
            b"a",
            b"AAAB",
            b"strict padding never trips on real output",
        ];
        for data in cases {
            let compressed = encode(&config, data);
            let mut decoder = Decoder::new(compressed.as_slice(), &config).unwrap();
            let mut out = Vec::new();
            decoder.decode_to(&mut out).unwrap();
            assert_eq!(out, data);
            let (_, stats) = decoder.finish();
            assert!(stats.virtual_bits <= u64::from(config.precision_bits) - 2);
        }
    }

    #[test]
    fn test_strict_padding_rejects_truncation() {
        let config = CoderConfig::default().with_strict_padding(true);
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 7919 % 256) as u8).collect();
        let compressed = encode(&config, &data);
        let truncated = &compressed[..compressed.len() / 2];

        let mut decoder = Decoder::new(truncated, &config).unwrap();
        let err = decoder.decode_to(std::io::sink()).unwrap_err();
        assert!(matches!(err, CodecError::TruncatedStream { virtual_bits: 17 }));
        assert!(decoder.is_done());
    }

    #[test]
    fn test_mismatched_precision_does_not_round_trip() {
        let writer_config = CoderConfig::default();
        let reader_config = CoderConfig::default()
            .with_precision_bits(20)
            .with_strict_padding(true);
        let data = b"configuration must match on both ends";
        let compressed = encode(&writer_config, data);

        let decoded: Result<Vec<u8>> =
            Decoder::new(compressed.as_slice(), &reader_config)
                .unwrap()
                .collect();
        assert_ne!(decoded.ok().as_deref(), Some(&data[..]));
    }
}
