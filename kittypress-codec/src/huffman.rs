//! Huffman coding over byte alphabets.
//!
//! Codes are built from symbol frequencies with the classic two-smallest
//! merge and are written MSB-first. Unlike DEFLATE, the code table is stored
//! explicitly (symbol plus code bits) rather than as canonical lengths, so a
//! decoder only needs the table to rebuild the symbol map.
//!
//! # Table layouts
//!
//! ```text
//! mapSize: u64
//! repeat mapSize times:
//!   symbol:  u8
//!   codeLen: u64
//!   code:    packed   -> ceil(codeLen / 8) bytes, MSB-first, zero padded
//!            legacy   -> codeLen bytes of ASCII '0' / '1'
//! ```
//!
//! The packed layout is written by current encoders; the legacy layout is
//! only read, for payloads from the first two generations.

use kittypress_core::BitReader;
use kittypress_core::cursor::SliceReader;
use kittypress_core::error::{KittyError, Result};
use rustc_hash::FxHashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::io::Write;

/// Longest code a table may carry.
pub const MAX_CODE_LENGTH: u8 = 128;

/// Number of symbols in the byte alphabet.
pub const ALPHABET_SIZE: usize = 256;

/// A variable-length prefix code, right-aligned in `bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code {
    bits: u128,
    len: u8,
}

impl Code {
    /// Create a code from its right-aligned bits and length.
    pub fn new(bits: u128, len: u8) -> Self {
        let mask = if len >= 128 {
            u128::MAX
        } else {
            (1u128 << len) - 1
        };
        Self {
            bits: bits & mask,
            len,
        }
    }

    /// The code bits, right-aligned.
    pub fn bits(&self) -> u128 {
        self.bits
    }

    /// Number of bits in the code.
    pub fn len(&self) -> u8 {
        self.len
    }

    /// Whether the code has no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append one bit.
    #[inline]
    fn push(self, bit: bool) -> Self {
        Self {
            bits: (self.bits << 1) | bit as u128,
            len: self.len + 1,
        }
    }

    /// Whether `self` is a prefix of `other`.
    fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && other.bits >> (other.len - self.len) == self.bits
    }

    /// Parse a string of ASCII `'0'` / `'1'` characters.
    fn from_ascii(text: &[u8], offset: u64) -> Result<Self> {
        let mut code = Code::default();
        for &c in text {
            let bit = match c {
                b'0' => false,
                b'1' => true,
                _ => {
                    return Err(KittyError::corrupted(
                        offset,
                        format!("code character {c:#04x} is not '0' or '1'"),
                    ));
                }
            };
            code = code.push(bit);
        }
        Ok(code)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            let bit = (self.bits >> i) & 1;
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

/// Tree node stored in an arena.
#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(u8),
    Internal { left: usize, right: usize },
}

/// A Huffman tree built from byte frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanTree {
    nodes: Vec<Node>,
    root: usize,
}

impl HuffmanTree {
    /// Build a tree from per-byte frequencies.
    ///
    /// Returns [`KittyError::EmptyInput`] when every frequency is zero.
    /// Equal weights are merged in creation order, leaves first by symbol
    /// value, so the result is deterministic.
    pub fn from_frequencies(freqs: &[u64; ALPHABET_SIZE]) -> Result<Self> {
        let mut nodes = Vec::with_capacity(2 * ALPHABET_SIZE);
        let mut heap = BinaryHeap::new();

        for (symbol, &freq) in freqs.iter().enumerate() {
            if freq > 0 {
                let idx = nodes.len();
                nodes.push(Node::Leaf(symbol as u8));
                heap.push(Reverse((freq, idx)));
            }
        }

        if heap.is_empty() {
            return Err(KittyError::EmptyInput);
        }

        // Node indices grow with creation order, so they double as the tie-breaker.
        while heap.len() > 1 {
            let (Some(Reverse((wl, left))), Some(Reverse((wr, right)))) = (heap.pop(), heap.pop())
            else {
                break;
            };
            let idx = nodes.len();
            nodes.push(Node::Internal { left, right });
            heap.push(Reverse((wl.saturating_add(wr), idx)));
        }

        let root = heap.pop().map(|Reverse((_, idx))| idx).unwrap_or(0);
        Ok(Self { nodes, root })
    }

    /// Build a tree from the bytes of `data`.
    pub fn from_data(data: &[u8]) -> Result<Self> {
        let mut freqs = [0u64; ALPHABET_SIZE];
        for &byte in data {
            freqs[byte as usize] += 1;
        }
        Self::from_frequencies(&freqs)
    }

    /// Derive the code table: left edges are `0`, right edges `1`.
    ///
    /// A tree with a single leaf gets the one-bit code `0`.
    pub fn code_table(&self) -> Result<CodeTable> {
        let mut table = CodeTable::new();

        if let Node::Leaf(symbol) = self.nodes[self.root] {
            table.insert(symbol, Code::new(0, 1))?;
            return Ok(table);
        }

        let mut stack = vec![(self.root, Code::default())];
        while let Some((idx, code)) = stack.pop() {
            match self.nodes[idx] {
                Node::Leaf(symbol) => table.insert(symbol, code)?,
                Node::Internal { left, right } => {
                    if code.len() >= MAX_CODE_LENGTH {
                        return Err(KittyError::invalid_header(format!(
                            "Huffman code longer than {MAX_CODE_LENGTH} bits"
                        )));
                    }
                    stack.push((right, code.push(true)));
                    stack.push((left, code.push(false)));
                }
            }
        }

        Ok(table)
    }
}

/// Mapping from byte symbols to their codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: [Option<Code>; ALPHABET_SIZE],
}

impl CodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            codes: [None; ALPHABET_SIZE],
        }
    }

    /// Assign a code to a symbol.
    ///
    /// Fails if the symbol already has a code or the code is empty or too long.
    pub fn insert(&mut self, symbol: u8, code: Code) -> Result<()> {
        if code.is_empty() || code.len() > MAX_CODE_LENGTH {
            return Err(KittyError::invalid_header(format!(
                "code length {} for symbol {symbol} outside 1..={MAX_CODE_LENGTH}",
                code.len()
            )));
        }
        let slot = &mut self.codes[symbol as usize];
        if slot.is_some() {
            return Err(KittyError::invalid_header(format!(
                "symbol {symbol} appears twice in code table"
            )));
        }
        *slot = Some(code);
        Ok(())
    }

    /// The code for a symbol.
    pub fn get(&self, symbol: u8) -> Option<Code> {
        self.codes[symbol as usize]
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    /// Whether the table has no symbols.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over `(symbol, code)` pairs in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Code)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(symbol, code)| code.map(|c| (symbol as u8, c)))
    }

    /// Length of the longest code.
    pub fn max_code_len(&self) -> u8 {
        self.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    /// Whether no code is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        let codes: Vec<Code> = self.iter().map(|(_, c)| c).collect();
        codes.iter().enumerate().all(|(i, a)| {
            codes
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !a.is_prefix_of(b))
        })
    }

    /// Size in bytes of the packed serialization.
    pub fn packed_len(&self) -> usize {
        8 + self
            .iter()
            .map(|(_, c)| 1 + 8 + (c.len() as usize).div_ceil(8))
            .sum::<usize>()
    }

    /// Write the packed serialization.
    pub fn write_packed<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(&(self.len() as u64).to_le_bytes())?;
        for (symbol, code) in self.iter() {
            out.write_all(&[symbol])?;
            out.write_all(&(code.len() as u64).to_le_bytes())?;
            let nbytes = (code.len() as usize).div_ceil(8);
            let padded = code.bits() << (nbytes * 8 - code.len() as usize);
            out.write_all(&padded.to_be_bytes()[16 - nbytes..])?;
        }
        Ok(())
    }

    /// Read the packed serialization.
    pub fn read_packed(reader: &mut SliceReader<'_>) -> Result<Self> {
        Self::read_with(reader, |reader, len| {
            let nbytes = (len as usize).div_ceil(8);
            let bytes = reader.read_slice(nbytes as u64, "packed code bits")?;
            let mut value = 0u128;
            for &b in bytes {
                value = (value << 8) | b as u128;
            }
            Ok(Code::new(value >> (nbytes * 8 - len as usize), len))
        })
    }

    /// Read the legacy ASCII serialization.
    pub fn read_legacy(reader: &mut SliceReader<'_>) -> Result<Self> {
        Self::read_with(reader, |reader, len| {
            let offset = reader.position() as u64;
            let text = reader.read_slice(len as u64, "ASCII code bits")?;
            Code::from_ascii(text, offset)
        })
    }

    /// Write the legacy ASCII serialization.
    #[cfg(test)]
    pub(crate) fn write_legacy(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.len() as u64).to_le_bytes());
        for (symbol, code) in self.iter() {
            out.push(symbol);
            out.extend_from_slice(&(code.len() as u64).to_le_bytes());
            out.extend_from_slice(code.to_string().as_bytes());
        }
    }

    fn read_with<F>(reader: &mut SliceReader<'_>, mut read_code: F) -> Result<Self>
    where
        F: FnMut(&mut SliceReader<'_>, u8) -> Result<Code>,
    {
        let count = reader.read_u64_le("code table size")?;
        if count > ALPHABET_SIZE as u64 {
            return Err(KittyError::invalid_header(format!(
                "code table declares {count} symbols"
            )));
        }

        let mut table = Self::new();
        for _ in 0..count {
            let symbol = reader.read_u8("code table symbol")?;
            let len = reader.read_u64_le("code length")?;
            if len == 0 || len > MAX_CODE_LENGTH as u64 {
                return Err(KittyError::invalid_header(format!(
                    "code length {len} for symbol {symbol} outside 1..={MAX_CODE_LENGTH}"
                )));
            }
            let code = read_code(reader, len as u8)?;
            table.insert(symbol, code)?;
        }
        Ok(table)
    }
}

impl Default for CodeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Output of [`encode`].
#[derive(Debug, Clone)]
pub struct HuffmanEncoded {
    /// Code table used for the bit stream.
    pub table: CodeTable,
    /// Number of meaningful bits in `bits`.
    pub bit_len: u64,
    /// MSB-first bit stream, zero padded to a byte boundary.
    pub bits: Vec<u8>,
}

/// Huffman-encode a byte buffer.
///
/// Returns [`KittyError::EmptyInput`] for an empty buffer.
pub fn encode(data: &[u8]) -> Result<HuffmanEncoded> {
    let table = HuffmanTree::from_data(data)?.code_table()?;

    let mut writer = kittypress_core::BitWriter::new(Vec::with_capacity(data.len() / 2));
    for &byte in data {
        // Every byte of `data` was counted, so each has a code.
        if let Some(code) = table.get(byte) {
            writer.write_bits(code.bits(), code.len())?;
        }
    }
    let bit_len = writer.bits_written();
    let bits = writer.into_inner()?;

    Ok(HuffmanEncoded {
        table,
        bit_len,
        bits,
    })
}

/// Decode exactly `bit_len` bits of `bits` with `table`.
///
/// Fails with [`KittyError::Truncated`] if `bits` ends early and with
/// [`KittyError::InvalidHuffmanCode`] once the accumulated bits grow longer
/// than any code. Bits left over after the last complete symbol are
/// reported as corruption.
pub fn decode(table: &CodeTable, bit_len: u64, bits: &[u8]) -> Result<Vec<u8>> {
    let mut symbols: FxHashMap<Code, u8> = FxHashMap::default();
    for (symbol, code) in table.iter() {
        if symbols.insert(code, symbol).is_some() {
            return Err(KittyError::invalid_header(format!(
                "code {code} assigned to more than one symbol"
            )));
        }
    }
    let max_len = table.max_code_len();

    let mut reader = BitReader::new(bits);
    let mut out = Vec::with_capacity(bits.len());
    let mut current = Code::default();

    for position in 0..bit_len {
        let Some(bit) = reader.read_bit()? else {
            return Err(KittyError::truncated(
                "Huffman bit stream",
                (bit_len - position).div_ceil(8),
            ));
        };
        current = current.push(bit);
        if let Some(&symbol) = symbols.get(&current) {
            out.push(symbol);
            current = Code::default();
        } else if current.len() >= max_len {
            return Err(KittyError::invalid_huffman(position + 1 - current.len() as u64));
        }
    }

    if !current.is_empty() {
        return Err(KittyError::corrupted(
            bit_len - current.len() as u64,
            "bit stream ends inside a code",
        ));
    }

    Ok(out)
}
