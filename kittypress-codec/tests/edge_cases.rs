//! Edge case tests for the single-file codec.

use kittypress_codec::{CodecConfig, Lz77Config, compress, compress_with_summary, decompress};
use kittypress_core::{CompressionLevel, KittyError};

fn roundtrip(input: &[u8], config: &CodecConfig) -> Vec<u8> {
    let payload = compress(input, ".dat", config).unwrap();
    let decoded = decompress(&payload).unwrap();
    assert_eq!(decoded.data, input);
    assert_eq!(decoded.extension, ".dat");
    payload
}

#[test]
fn test_empty_input() {
    roundtrip(b"", &CodecConfig::default());
}

#[test]
fn test_single_byte() {
    let payload = roundtrip(b"A", &CodecConfig::default());
    // Raw store: magic, flag, extLen, ext, rawSize, byte.
    assert_eq!(payload.len(), 4 + 1 + 8 + 4 + 8 + 1);
    assert_eq!(payload[4], 0);
}

#[test]
fn test_all_zeros() {
    let input = vec![0u8; 1000];
    let payload = roundtrip(&input, &CodecConfig::default());
    // All zeros should compress very well
    assert!(payload.len() < input.len() / 5);
}

#[test]
fn test_repeated_ascii_char() {
    let input = vec![b'k'; 100];
    let (payload, summary) =
        compress_with_summary(&input, ".txt", &CodecConfig::default()).unwrap();
    assert!(summary.compressed);
    assert!(payload.len() < 100);
    assert_eq!(decompress(&payload).unwrap().data, input);
}

#[test]
fn test_alternating_pattern() {
    let input: Vec<u8> = (0..1000).map(|i| if i % 2 == 0 { b'A' } else { b'B' }).collect();
    roundtrip(&input, &CodecConfig::default());
}

#[test]
fn test_large_input_spanning_chunks() {
    let mut input = Vec::with_capacity(3 * 1024 * 1024);
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    while input.len() < 3 * 1024 * 1024 {
        input.extend_from_slice(pattern);
    }

    let config = CodecConfig::default().with_chunk_size(1024 * 1024);
    let payload = roundtrip(&input, &config);
    assert!(payload.len() < input.len() / 10);
}

#[test]
fn test_incompressible_data_stored_raw() {
    let mut seed: u64 = 0x9E3779B97F4A7C15;
    let input: Vec<u8> = (0..4096)
        .map(|_| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            (seed >> 56) as u8
        })
        .collect();

    let (payload, summary) =
        compress_with_summary(&input, ".dat", &CodecConfig::default()).unwrap();
    assert!(!summary.compressed);
    assert_eq!(summary.stored_size as usize, payload.len());
    assert_eq!(decompress(&payload).unwrap().data, input);
}

#[test]
fn test_compression_levels() {
    let input = b"level sweep level sweep level sweep, and a tail of distinct text".repeat(30);
    for level in 0..=9 {
        let config = CodecConfig::from_level(CompressionLevel::new(level));
        roundtrip(&input, &config);
    }
}

#[test]
fn test_small_window() {
    let input = b"abcdefghijklmnopqrstuvwxyz".repeat(100);
    let config = CodecConfig::default().with_lz77(Lz77Config::default().with_window_size(8));
    roundtrip(&input, &config);
}

#[test]
fn test_long_distance_match() {
    // A block repeated after 60 KiB of filler is still inside the window.
    let block: Vec<u8> = (0..200u32).map(|i| (i * 7 % 251) as u8).collect();
    let mut input = block.clone();
    input.extend((0..60 * 1024u32).map(|i| (i % 13) as u8 + b'a'));
    input.extend_from_slice(&block);
    roundtrip(&input, &CodecConfig::default());
}

#[test]
fn test_binary_extension_preserved() {
    let payload =
        compress(&[1, 2, 3, 1, 2, 3, 1, 2, 3], ".tar.gz", &CodecConfig::default()).unwrap();
    assert_eq!(decompress(&payload).unwrap().extension, ".tar.gz");
}

#[test]
fn test_garbage_input() {
    assert!(matches!(
        decompress(b"not a payload"),
        Err(KittyError::InvalidMagic { .. })
    ));
    assert!(matches!(
        decompress(b"KP"),
        Err(KittyError::Truncated { .. })
    ));
}

#[test]
fn test_truncated_compressed_payload() {
    let input = b"truncate me, truncate me, truncate me please".repeat(4);
    let payload = compress(&input, ".txt", &CodecConfig::default()).unwrap();
    for cut in [5, 13, 20, payload.len() - 1] {
        let err = decompress(&payload[..cut]).unwrap_err();
        assert!(err.is_format_error(), "cut at {cut}: {err}");
    }
}
