//! Bounds-checked little-endian field reader over an in-memory buffer.
//!
//! Payload and container headers are parsed from fully materialized byte
//! buffers. Every read checks the remaining length first and reports a
//! [`KittyError::Truncated`] naming the field, so a short buffer can never
//! cause a panic or an oversized allocation.

use crate::error::{KittyError, Result};

/// A forward-only reader over a byte slice.
#[derive(Debug, Clone)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> SliceReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Current byte offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Whether all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread tail of the buffer, without consuming it.
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }

    /// Read exactly `len` bytes.
    pub fn read_slice(&mut self, len: u64, context: &str) -> Result<&'a [u8]> {
        let available = self.remaining() as u64;
        if len > available {
            return Err(KittyError::truncated(context, len - available));
        }
        // len <= remaining, which always fits in usize.
        let start = self.position;
        self.position += len as usize;
        Ok(&self.data[start..self.position])
    }

    /// Read a fixed-size array.
    pub fn read_array<const N: usize>(&mut self, context: &str) -> Result<[u8; N]> {
        let bytes = self.read_slice(N as u64, context)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read one byte.
    pub fn read_u8(&mut self, context: &str) -> Result<u8> {
        Ok(self.read_array::<1>(context)?[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self, context: &str) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array(context)?))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self, context: &str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array(context)?))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64_le(&mut self, context: &str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array(context)?))
    }

    /// Read a length-prefixed UTF-8 string whose length was already decoded.
    pub fn read_string(&mut self, len: u64, context: &str) -> Result<String> {
        let offset = self.position as u64;
        let bytes = self.read_slice(len, context)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| KittyError::corrupted(offset, format!("{context} is not valid UTF-8")))
    }
}
