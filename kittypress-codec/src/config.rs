//! Codec configuration.
//!
//! [`Lz77Config`] tunes the dictionary search; [`CodecConfig`] adds the
//! pipeline-level knobs (chunk size and store-only mode). Both are plain
//! `Copy` values with builder-style setters and named presets, and are
//! derived from a [`CompressionLevel`] when driven from the CLI.

use crate::lz77::{MAX_MATCH, WINDOW_SIZE};
use kittypress_core::CompressionLevel;

/// Default number of hash-chain candidates examined per position.
pub const DEFAULT_MAX_PROBES: usize = 32;

/// Default number of positions remembered per 3-byte key.
pub const DEFAULT_MAX_POSITIONS_PER_KEY: usize = 64;

/// Default streaming chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1 << 20;

/// How the LZ77 encoder searches for matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// Scan every window position; ties go to the earliest position.
    Exhaustive,
    /// Probe recent positions sharing the next three bytes; ties go to the
    /// most recent position.
    #[default]
    HashChain,
}

/// LZ77 search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77Config {
    /// Maximum back-reference distance (1-65535).
    pub window_size: usize,
    /// Maximum match length (1-255).
    pub max_match: usize,
    /// Search strategy.
    pub strategy: SearchStrategy,
    /// Candidates examined per position (hash chain only).
    pub max_probes: usize,
    /// Positions remembered per key (hash chain only).
    pub max_positions_per_key: usize,
}

impl Lz77Config {
    /// Shallow hash-chain search.
    pub const FAST: Self = Self {
        window_size: WINDOW_SIZE,
        max_match: MAX_MATCH,
        strategy: SearchStrategy::HashChain,
        max_probes: 8,
        max_positions_per_key: 16,
    };

    /// Balanced hash-chain search.
    pub const DEFAULT: Self = Self {
        window_size: WINDOW_SIZE,
        max_match: MAX_MATCH,
        strategy: SearchStrategy::HashChain,
        max_probes: DEFAULT_MAX_PROBES,
        max_positions_per_key: DEFAULT_MAX_POSITIONS_PER_KEY,
    };

    /// Deep hash-chain search.
    pub const BEST: Self = Self {
        window_size: WINDOW_SIZE,
        max_match: MAX_MATCH,
        strategy: SearchStrategy::HashChain,
        max_probes: 128,
        max_positions_per_key: 256,
    };

    /// Full window scan. Quadratic; meant for small inputs and testing.
    pub const EXHAUSTIVE: Self = Self {
        window_size: WINDOW_SIZE,
        max_match: MAX_MATCH,
        strategy: SearchStrategy::Exhaustive,
        max_probes: DEFAULT_MAX_PROBES,
        max_positions_per_key: DEFAULT_MAX_POSITIONS_PER_KEY,
    };

    /// Set the window size.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the maximum match length.
    pub fn with_max_match(mut self, max_match: usize) -> Self {
        self.max_match = max_match;
        self
    }

    /// Set the search strategy.
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the probe budget.
    pub fn with_max_probes(mut self, max_probes: usize) -> Self {
        self.max_probes = max_probes;
        self
    }

    /// Clamp every field to what the token format can express.
    pub fn normalized(self) -> Self {
        Self {
            window_size: self.window_size.clamp(1, WINDOW_SIZE),
            max_match: self.max_match.clamp(1, MAX_MATCH),
            strategy: self.strategy,
            max_probes: self.max_probes.max(1),
            max_positions_per_key: self.max_positions_per_key.max(1),
        }
    }
}

impl Default for Lz77Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<CompressionLevel> for Lz77Config {
    fn from(level: CompressionLevel) -> Self {
        match level.level() {
            0..=3 => Self::FAST,
            4..=6 => Self::DEFAULT,
            _ => Self::BEST,
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// LZ77 search parameters.
    pub lz77: Lz77Config,
    /// Bytes fed to the LZ77 encoder per step.
    pub chunk_size: usize,
    /// Always write raw payloads.
    pub store_only: bool,
}

impl CodecConfig {
    /// Create a configuration for a compression level.
    ///
    /// Level 0 stores, 1-3 use [`Lz77Config::FAST`], 4-6
    /// [`Lz77Config::DEFAULT`] and 7-9 [`Lz77Config::BEST`].
    pub fn from_level(level: CompressionLevel) -> Self {
        Self {
            lz77: Lz77Config::from(level),
            chunk_size: DEFAULT_CHUNK_SIZE,
            store_only: level.is_store(),
        }
    }

    /// Replace the LZ77 parameters.
    pub fn with_lz77(mut self, lz77: Lz77Config) -> Self {
        self.lz77 = lz77;
        self
    }

    /// Set the LZ77 window size.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.lz77.window_size = window_size;
        self
    }

    /// Set the streaming chunk size (minimum 1 byte).
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::from_level(CompressionLevel::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert!(CodecConfig::from_level(CompressionLevel::NONE).store_only);
        assert_eq!(
            CodecConfig::from_level(CompressionLevel::new(2)).lz77,
            Lz77Config::FAST
        );
        assert_eq!(CodecConfig::default().lz77, Lz77Config::DEFAULT);
        assert!(!CodecConfig::default().store_only);
        assert_eq!(
            CodecConfig::from_level(CompressionLevel::BEST).lz77,
            Lz77Config::BEST
        );
    }

    #[test]
    fn test_normalized_clamps() {
        let config = Lz77Config::default()
            .with_window_size(1 << 20)
            .with_max_match(1000)
            .with_max_probes(0)
            .normalized();
        assert_eq!(config.window_size, WINDOW_SIZE);
        assert_eq!(config.max_match, MAX_MATCH);
        assert_eq!(config.max_probes, 1);

        assert_eq!(Lz77Config::default().with_window_size(0).normalized().window_size, 1);
    }

    #[test]
    fn test_chunk_size_minimum() {
        assert_eq!(CodecConfig::default().with_chunk_size(0).chunk_size, 1);
        assert_eq!(CodecConfig::default().chunk_size, DEFAULT_CHUNK_SIZE);
    }
}
