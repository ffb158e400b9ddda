//! Bit channel over byte streams.
//!
//! Bits are packed MSB first: the first bit written lands in bit 7 of the
//! first byte. The final partial byte is padded with zeros.

use std::io::{self, Read, Write};

use crate::error::{CodecError, Result};

/// Size of the staging buffers on both sides of the channel.
pub const CHUNK_SIZE: usize = 4096;

/// Bit writer that stages completed bytes before handing them to a sink.
pub struct BitWriter<W: Write> {
    sink: W,
    /// Completed bytes not yet written to the sink
    staged: Vec<u8>,
    /// Partial byte, filled from the low end
    current: u8,
    /// Bits held in `current`
    filled: u32,
    bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new bit writer over `sink`.
    pub fn new(sink: W) -> Result<Self> {
        let mut staged = Vec::new();
        staged
            .try_reserve_exact(CHUNK_SIZE)
            .map_err(CodecError::allocation(CHUNK_SIZE))?;
        Ok(Self {
            sink,
            staged,
            current: 0,
            filled: 0,
            bits_written: 0,
        })
    }

    /// Append one bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.current = (self.current << 1) | u8::from(bit);
        self.filled += 1;
        self.bits_written += 1;
        if self.filled == 8 {
            let byte = self.current;
            self.current = 0;
            self.filled = 0;
            self.push_byte(byte)?;
        }
        Ok(())
    }

    /// Append the same bit `count` times.
    #[inline]
    pub fn write_repeated(&mut self, bit: bool, count: u32) -> Result<()> {
        for _ in 0..count {
            self.write_bit(bit)?;
        }
        Ok(())
    }

    /// Total bits written so far, excluding padding.
    pub fn bits_written(&self) -> u64 {
        self.bits_written
    }

    #[inline]
    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.staged.push(byte);
        if self.staged.len() >= CHUNK_SIZE {
            self.drain()?;
        }
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        if !self.staged.is_empty() {
            self.sink
                .write_all(&self.staged)
                .map_err(CodecError::Write)?;
            self.staged.clear();
        }
        Ok(())
    }

    /// Pad the last byte with zeros, write everything out and return the sink.
    pub fn finish(mut self) -> Result<W> {
        if self.filled > 0 {
            let byte = self.current << (8 - self.filled);
            self.current = 0;
            self.filled = 0;
            self.push_byte(byte)?;
        }
        self.drain()?;
        self.sink.flush().map_err(CodecError::Write)?;
        Ok(self.sink)
    }
}

/// Bit reader that pulls from a byte source one chunk at a time.
///
/// Once the source is exhausted every further bit reads as zero.
pub struct BitReader<R: Read> {
    source: R,
    buf: Vec<u8>,
    /// Valid bytes in `buf`
    len: usize,
    /// Next unread byte in `buf`
    pos: usize,
    current: u8,
    /// Unread bits left in `current`
    bits_left: u32,
    exhausted: bool,
    bytes_read: u64,
    virtual_bits: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new bit reader over `source`. Nothing is read until the
    /// first bit is requested.
    pub fn new(source: R) -> Result<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(CHUNK_SIZE)
            .map_err(CodecError::allocation(CHUNK_SIZE))?;
        buf.resize(CHUNK_SIZE, 0);
        Ok(Self {
            source,
            buf,
            len: 0,
            pos: 0,
            current: 0,
            bits_left: 0,
            exhausted: false,
            bytes_read: 0,
            virtual_bits: 0,
        })
    }

    /// Read one bit, or a zero bit once the source has run dry.
    #[inline]
    pub fn read_bit(&mut self) -> Result<bool> {
        if self.bits_left == 0 && !self.next_byte()? {
            self.virtual_bits += 1;
            return Ok(false);
        }
        self.bits_left -= 1;
        Ok((self.current >> self.bits_left) & 1 != 0)
    }

    fn next_byte(&mut self) -> Result<bool> {
        if self.pos == self.len && !self.refill()? {
            return Ok(false);
        }
        self.current = self.buf[self.pos];
        self.pos += 1;
        self.bits_left = 8;
        self.bytes_read += 1;
        Ok(true)
    }

    fn refill(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        loop {
            match self.source.read(&mut self.buf) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(false);
                }
                Ok(n) => {
                    self.len = n;
                    self.pos = 0;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(CodecError::Read(e)),
            }
        }
    }

    /// Bytes consumed from the source so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Zero bits synthesized past the end of the source.
    pub fn virtual_bits(&self) -> u64 {
        self.virtual_bits
    }

    /// Return the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }
}
