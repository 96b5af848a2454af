//! LZ77 dictionary coding.
//!
//! This module turns a byte buffer into a sequence of literals and
//! back-references and back again. The encoder can search either
//! exhaustively over the whole window or through a hash chain keyed by the
//! next three bytes; both feed the same token model, wire format and decoder.
//!
//! # Algorithm
//!
//! [`Lz77Encoder`] is streaming: input arrives in chunks through
//! [`Lz77Encoder::feed`]. It keeps the last `window_size` bytes of history,
//! the absolute position of the next chunk, and (for the hash-chain search) a
//! dictionary from 3-byte keys to the most recent absolute positions where
//! that key started. For each position it either:
//! - emits a literal byte if no match of 3+ bytes is found, or
//! - emits an `(offset, length)` back-reference.
//!
//! Lazy matching looks one position ahead: when the match starting at the
//! next byte is longer than the current one by more than a byte, a literal is
//! emitted instead and the search resumes at the next byte.
//!
//! # Wire format
//!
//! ```text
//! Literal: 0x00 byte
//! Match:   0x01 offset_lo offset_hi length
//! ```

use crate::config::{Lz77Config, SearchStrategy};
use kittypress_core::error::{KittyError, Result};
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Maximum window size (largest offset the wire format can express).
pub const WINDOW_SIZE: usize = 65535;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length (largest length the wire format can express).
pub const MAX_MATCH: usize = 255;

/// Number of bytes forming a hash-chain key.
const KEY_LEN: usize = 3;

/// Tag byte introducing a literal token.
pub const TAG_LITERAL: u8 = 0x00;

/// Tag byte introducing a match token.
pub const TAG_MATCH: u8 = 0x01;

/// A token produced by LZ77 compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously produced data.
    Match {
        /// Distance back from the current output position (1-65535).
        offset: u16,
        /// Number of bytes to copy (1-255).
        length: u8,
    },
}

impl Lz77Token {
    /// Number of output bytes this token expands to.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => *length as usize,
        }
    }

    /// Number of bytes this token occupies in the wire format.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Literal(_) => 2,
            Self::Match { .. } => 4,
        }
    }
}

/// A candidate back-reference found by the match search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    offset: usize,
    length: usize,
}

/// Streaming LZ77 encoder.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// Normalized configuration.
    config: Lz77Config,
    /// The last `window_size` bytes preceding `absolute_pos`.
    window: Vec<u8>,
    /// Absolute position of the first byte of the next chunk.
    absolute_pos: u64,
    /// Hash chain: 3-byte key -> recent absolute positions, oldest first.
    dict: FxHashMap<u32, VecDeque<u64>>,
    /// Tokens produced but not yet taken.
    pending: Vec<Lz77Token>,
}

impl Lz77Encoder {
    /// Create a new encoder; the configuration is clamped to wire-format limits.
    pub fn new(config: Lz77Config) -> Self {
        Self {
            config: config.normalized(),
            window: Vec::new(),
            absolute_pos: 0,
            dict: FxHashMap::default(),
            pending: Vec::new(),
        }
    }

    /// The configuration in effect.
    pub fn config(&self) -> &Lz77Config {
        &self.config
    }

    /// Total number of bytes fed so far.
    pub fn position(&self) -> u64 {
        self.absolute_pos
    }

    /// Number of history bytes currently retained.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Number of distinct keys in the hash-chain dictionary.
    pub fn dictionary_len(&self) -> usize {
        self.dict.len()
    }

    /// Reset the encoder state, keeping the configuration.
    pub fn reset(&mut self) {
        self.window.clear();
        self.absolute_pos = 0;
        self.dict.clear();
        self.pending.clear();
    }

    #[inline(always)]
    fn make_key(bytes: &[u8]) -> u32 {
        ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | bytes[2] as u32
    }

    /// Record that the key starting at `buf[pos]` occurs at absolute `base + pos`.
    fn insert(&mut self, buf: &[u8], base: u64, pos: usize) {
        if pos + KEY_LEN > buf.len() {
            return;
        }
        let key = Self::make_key(&buf[pos..]);
        let chain = self.dict.entry(key).or_default();
        chain.push_back(base + pos as u64);
        if chain.len() > self.config.max_positions_per_key {
            chain.pop_front();
        }
    }

    /// Count matching bytes between `buf[from..]` and `buf[cur..]`, up to `limit`.
    #[inline]
    fn match_len(buf: &[u8], from: usize, cur: usize, limit: usize) -> usize {
        let mut len = 0;
        while len < limit && buf[from + len] == buf[cur + len] {
            len += 1;
        }
        len
    }

    /// Find the longest match for `buf[cur..]` using the configured strategy.
    fn find_match(&self, buf: &[u8], base: u64, cur: usize) -> Option<Candidate> {
        let limit = self.config.max_match.min(buf.len() - cur);
        if limit < MIN_MATCH {
            return None;
        }

        let mut best = Candidate {
            offset: 0,
            length: 0,
        };

        match self.config.strategy {
            SearchStrategy::Exhaustive => {
                let start = cur.saturating_sub(self.config.window_size);
                for from in start..cur {
                    let len = Self::match_len(buf, from, cur, limit);
                    if len > best.length {
                        best = Candidate {
                            offset: cur - from,
                            length: len,
                        };
                        if len == limit {
                            break;
                        }
                    }
                }
            }
            SearchStrategy::HashChain => {
                let key = Self::make_key(&buf[cur..]);
                let chain = self.dict.get(&key)?;
                let cur_abs = base + cur as u64;

                for &pos in chain.iter().rev().take(self.config.max_probes) {
                    let offset = cur_abs - pos;
                    if offset == 0 || offset > self.config.window_size as u64 || pos < base {
                        continue;
                    }
                    let from = (pos - base) as usize;
                    let len = Self::match_len(buf, from, cur, limit);
                    if len > best.length {
                        best = Candidate {
                            offset: offset as usize,
                            length: len,
                        };
                        if len == limit {
                            break;
                        }
                    }
                }
            }
        }

        (best.length >= MIN_MATCH).then_some(best)
    }

    /// Compress one chunk, appending tokens to the pending output.
    ///
    /// Matches may reference any byte still in the window but never extend
    /// past the end of `chunk`.
    pub fn feed(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }

        let base = self.absolute_pos - self.window.len() as u64;
        let mut buf = std::mem::take(&mut self.window);
        buf.extend_from_slice(chunk);

        let index_positions = self.config.strategy == SearchStrategy::HashChain;
        let end = buf.len();
        let mut pos = end - chunk.len();

        while pos < end {
            if let Some(current) = self.find_match(&buf, base, pos) {
                if pos + 1 < end {
                    if let Some(next) = self.find_match(&buf, base, pos + 1) {
                        if next.length > current.length + 1 {
                            // Better to emit literal and use next match
                            self.pending.push(Lz77Token::Literal(buf[pos]));
                            if index_positions {
                                self.insert(&buf, base, pos);
                            }
                            pos += 1;
                            continue;
                        }
                    }
                }

                let offset = current.offset.min(WINDOW_SIZE);
                let length = current.length.min(MAX_MATCH);
                self.pending.push(Lz77Token::Match {
                    offset: offset as u16,
                    length: length as u8,
                });
                if index_positions {
                    for p in pos..pos + length {
                        self.insert(&buf, base, p);
                    }
                }
                pos += length;
                continue;
            }

            self.pending.push(Lz77Token::Literal(buf[pos]));
            if index_positions {
                self.insert(&buf, base, pos);
            }
            pos += 1;
        }

        // Keep only the last window_size bytes as history.
        let keep = buf.len().min(self.config.window_size);
        buf.drain(..buf.len() - keep);
        self.window = buf;
        self.absolute_pos += chunk.len() as u64;

        // Forget positions that fell out of the window.
        let oldest = self.absolute_pos - self.window.len() as u64;
        self.dict.retain(|_, chain| {
            while chain.front().is_some_and(|&p| p < oldest) {
                chain.pop_front();
            }
            !chain.is_empty()
        });
    }

    /// Take the tokens produced so far.
    pub fn take_tokens(&mut self) -> Vec<Lz77Token> {
        std::mem::take(&mut self.pending)
    }

    /// Take the tokens produced so far, already serialized.
    pub fn consume_output(&mut self) -> Vec<u8> {
        let out = serialize(&self.pending);
        self.pending.clear();
        out
    }
}

impl Default for Lz77Encoder {
    fn default() -> Self {
        Self::new(Lz77Config::default())
    }
}

/// Compress a whole buffer in one call.
pub fn compress(data: &[u8], config: &Lz77Config) -> Vec<Lz77Token> {
    let mut encoder = Lz77Encoder::new(*config);
    encoder.feed(data);
    encoder.take_tokens()
}

/// Serialize tokens into their byte representation.
pub fn serialize(tokens: &[Lz77Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(Lz77Token::encoded_len).sum());
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => {
                out.push(TAG_LITERAL);
                out.push(byte);
            }
            Lz77Token::Match { offset, length } => {
                out.push(TAG_MATCH);
                out.extend_from_slice(&offset.to_le_bytes());
                out.push(length);
            }
        }
    }
    out
}

/// Parse serialized tokens.
///
/// Parsing stops quietly at the first unknown tag byte or at a truncated
/// trailing token; everything before that point is returned.
pub fn deserialize(bytes: &[u8]) -> Vec<Lz77Token> {
    let mut tokens = Vec::with_capacity(bytes.len() / 2);
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            TAG_LITERAL => {
                let Some(&byte) = bytes.get(i + 1) else {
                    break;
                };
                tokens.push(Lz77Token::Literal(byte));
                i += 2;
            }
            TAG_MATCH => {
                let Some(fields) = bytes.get(i + 1..i + 4) else {
                    break;
                };
                tokens.push(Lz77Token::Match {
                    offset: u16::from_le_bytes([fields[0], fields[1]]),
                    length: fields[2],
                });
                i += 4;
            }
            _ => break,
        }
    }

    tokens
}

/// Replay tokens into the original bytes.
///
/// Matches are copied one byte at a time, so an offset smaller than the
/// length repeats the referenced run.
pub fn decompress(tokens: &[Lz77Token]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(tokens.len() * 2);

    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => out.push(byte),
            Lz77Token::Match { offset, length } => {
                let offset = offset as usize;
                if offset == 0 || offset > out.len() {
                    return Err(KittyError::invalid_distance(offset, out.len()));
                }
                let start = out.len() - offset;
                for k in 0..length as usize {
                    let byte = out[start + k];
                    out.push(byte);
                }
            }
        }
    }

    Ok(out)
}
