//! Bit-level I/O for prefix-code streams.
//!
//! This module provides `BitReader` and `BitWriter` for reading and writing
//! data one bit at a time, which is what the Huffman coder needs to pack and
//! unpack variable-length codes.
//!
//! # Bit Ordering
//!
//! KittyPress packs bits MSB-first: the first bit written lands in bit 7 of
//! the first byte. A trailing partial byte is zero-padded in its low bits.
//!
//! # Example
//!
//! ```
//! use kittypress_core::bitstream::{BitReader, BitWriter};
//! use std::io::Cursor;
//!
//! // Writing bits
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0b101, 3).unwrap();
//!     writer.write_bits(0b1100, 4).unwrap();
//!     writer.flush().unwrap();
//! }
//! assert_eq!(output, vec![0b1011_1000]);
//!
//! // Reading bits
//! let mut reader = BitReader::new(Cursor::new(&output));
//! assert_eq!(reader.read_bit().unwrap(), Some(true));
//! assert_eq!(reader.read_bit().unwrap(), Some(false));
//! ```

use crate::error::Result;
use std::io::{ErrorKind, Read, Write};

/// A bit-level reader that wraps any `Read` implementation.
///
/// Bytes are pulled from the source one at a time, only when the current
/// byte is exhausted. Running out of input is reported as `Ok(None)` rather
/// than as an error, so callers can combine it with their own bit counts.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    /// Underlying reader.
    reader: R,
    /// Current byte, consumed from the MSB down.
    buffer: u8,
    /// Number of unread bits left in `buffer`.
    bits_in_buffer: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<R: Read> BitReader<R> {
    /// Create a new `BitReader` wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Get a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Get a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consume this `BitReader` and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Get the total number of bits read so far.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }

    /// Pull the next byte from the source. Returns `false` at end of input.
    fn refill(&mut self) -> Result<bool> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(false),
                Ok(_) => {
                    self.buffer = byte[0];
                    self.bits_in_buffer = 8;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Read a single bit.
    ///
    /// Returns `Ok(None)` once the source has no further bytes.
    #[inline]
    pub fn read_bit(&mut self) -> Result<Option<bool>> {
        if self.bits_in_buffer == 0 && !self.refill()? {
            return Ok(None);
        }

        let bit = self.buffer & 0x80 != 0;
        self.buffer <<= 1;
        self.bits_in_buffer -= 1;
        self.total_bits_read += 1;
        Ok(Some(bit))
    }

    /// Read up to 64 bits, first bit read ending up most significant.
    ///
    /// Returns `Ok(None)` if the source ends before `count` bits were read.
    pub fn read_bits(&mut self, count: u8) -> Result<Option<u64>> {
        debug_assert!(count <= 64, "Cannot read more than 64 bits at once");

        let mut value = 0u64;
        for _ in 0..count {
            match self.read_bit()? {
                Some(bit) => value = (value << 1) | bit as u64,
                None => return Ok(None),
            }
        }
        Ok(Some(value))
    }

    /// Discard the unread bits of the current byte.
    pub fn align_to_byte(&mut self) {
        self.total_bits_read += self.bits_in_buffer as u64;
        self.buffer = 0;
        self.bits_in_buffer = 0;
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// `BitWriter` accumulates bits in a one-byte buffer and emits each byte to
/// the underlying writer as soon as it is complete. Call `flush()` when done
/// to write the remaining partial byte.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Partial byte, filled from the MSB down.
    buffer: u8,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_written: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Flush the remaining bits, then return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    /// Get the total number of bits written so far (padding excluded).
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Write a single bit.
    #[inline]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.buffer = (self.buffer << 1) | bit as u8;
        self.bits_in_buffer += 1;
        self.total_bits_written += 1;

        if self.bits_in_buffer == 8 {
            self.writer.write_all(&[self.buffer])?;
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
        Ok(())
    }

    /// Write the low `count` bits of `value`, most significant first.
    ///
    /// # Arguments
    ///
    /// * `value` - The bits to write, right-aligned
    /// * `count` - Number of bits to write (0-128)
    pub fn write_bits(&mut self, value: u128, count: u8) -> Result<()> {
        debug_assert!(count <= 128, "Cannot write more than 128 bits at once");

        for shift in (0..count).rev() {
            self.write_bit((value >> shift) & 1 != 0)?;
        }
        Ok(())
    }

    /// Pad the partial byte with zero bits and emit it.
    ///
    /// Does nothing when the writer is already byte-aligned, so calling it
    /// twice never emits an extra byte.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits_in_buffer > 0 {
            let byte = self.buffer << (8 - self.bits_in_buffer);
            self.writer.write_all(&[byte])?;
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
        Ok(())
    }

    /// Emit any partial byte and flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_bitreader_basic() {
        // 0b10110101 = 0xB5
        let data = vec![0xB5];
        let mut reader = BitReader::new(Cursor::new(data));

        let expected = [true, false, true, true, false, true, false, true];
        for bit in expected {
            assert_eq!(reader.read_bit().unwrap(), Some(bit)); // MSB first
        }
        assert_eq!(reader.read_bit().unwrap(), None);
        assert_eq!(reader.bits_read(), 8);
    }

    #[test]
    fn test_bitreader_multi_byte() {
        let data = vec![0xF0, 0x0F];
        let mut reader = BitReader::new(Cursor::new(data));

        assert_eq!(reader.read_bits(4).unwrap(), Some(0xF));
        assert_eq!(reader.read_bits(8).unwrap(), Some(0x00)); // Crosses byte boundary
        assert_eq!(reader.read_bits(4).unwrap(), Some(0xF));
        assert_eq!(reader.read_bits(1).unwrap(), None);
    }

    #[test]
    fn test_bitreader_empty_source() {
        let mut reader = BitReader::new(Cursor::new(Vec::<u8>::new()));
        assert_eq!(reader.read_bit().unwrap(), None);
        assert_eq!(reader.bits_read(), 0);
    }

    #[test]
    fn test_bitwriter_basic() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            for bit in [true, false, true, true, false, true, false, true] {
                writer.write_bit(bit).unwrap();
            }
            writer.flush().unwrap();
        }
        assert_eq!(output, vec![0xB5]);
    }

    #[test]
    fn test_flush_pads_low_bits() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            writer.write_bits(0b101, 3).unwrap();
            writer.flush().unwrap();
            // A second flush must not emit another byte.
            writer.flush().unwrap();
            assert_eq!(writer.bits_written(), 3);
        }
        assert_eq!(output, vec![0b1010_0000]);
    }

    #[test]
    fn test_full_byte_emitted_without_flush() {
        let mut writer = BitWriter::new(Vec::new());
        writer.write_bits(0xAB, 8).unwrap();
        assert_eq!(writer.get_ref(), &vec![0xAB]);
        writer.write_bit(true).unwrap();
        assert_eq!(writer.get_ref().len(), 1);
        let output = writer.into_inner().unwrap();
        assert_eq!(output, vec![0xAB, 0x80]);
    }

    #[test]
    fn test_roundtrip() {
        let mut output = Vec::new();
        {
            let mut writer = BitWriter::new(&mut output);
            writer.write_bits(0b101, 3).unwrap();
            writer.write_bits(0b1111, 4).unwrap();
            writer.write_bits(0b10, 2).unwrap();
            writer.write_bits(0b110011, 6).unwrap();
            writer.write_bits(1u128 << 99, 100).unwrap();
            writer.flush().unwrap();
        }

        let mut reader = BitReader::new(Cursor::new(&output));
        assert_eq!(reader.read_bits(3).unwrap(), Some(0b101));
        assert_eq!(reader.read_bits(4).unwrap(), Some(0b1111));
        assert_eq!(reader.read_bits(2).unwrap(), Some(0b10));
        assert_eq!(reader.read_bits(6).unwrap(), Some(0b110011));
        assert_eq!(reader.read_bit().unwrap(), Some(true));
        assert_eq!(reader.read_bits(64).unwrap(), Some(0));
        assert_eq!(reader.read_bits(35).unwrap(), Some(0));
    }

    #[test]
    fn test_align_to_byte() {
        let data = vec![0xFF, 0xAA];
        let mut reader = BitReader::new(Cursor::new(data));

        reader.read_bits(3).unwrap();
        reader.align_to_byte();
        assert_eq!(reader.bits_read(), 8);
        assert_eq!(reader.read_bits(8).unwrap(), Some(0xAA));
    }
}
