//! Throughput benchmarks for the LZ77 + Huffman codec.
//!
//! Covers the two LZ77 search strategies, the full compress path at several
//! levels, and decompression, over uniform, random and text-like inputs.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use kittypress_codec::{CodecConfig, Lz77Config, compress, decompress, lz77};
use kittypress_core::CompressionLevel;
use std::hint::black_box;

mod test_data {
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    pub fn random(size: usize) -> Vec<u8> {
        let mut seed: u64 = 0x123456789ABCDEF0;
        (0..size)
            .map(|_| {
                seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
                (seed >> 32) as u8
            })
            .collect()
    }

    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! ";
        text.iter().copied().cycle().take(size).collect()
    }
}

type PatternGenerator = fn(usize) -> Vec<u8>;

const PATTERNS: [(&str, PatternGenerator); 3] = [
    ("uniform", test_data::uniform),
    ("random", test_data::random),
    ("text", test_data::text_like),
];

fn bench_lz77_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("lz77");
    let size = 16 * 1024;

    for (name, generate) in PATTERNS {
        let data = generate(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("hash_chain", name), &data, |b, data| {
            b.iter(|| lz77::compress(black_box(data), &Lz77Config::DEFAULT))
        });
        group.bench_with_input(BenchmarkId::new("exhaustive", name), &data, |b, data| {
            b.iter(|| lz77::compress(black_box(data), &Lz77Config::EXHAUSTIVE))
        });
    }

    group.finish();
}

fn bench_compress_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    let size = 256 * 1024;

    for (name, generate) in PATTERNS {
        let data = generate(size);
        group.throughput(Throughput::Bytes(size as u64));

        for level in [1u8, 6, 9] {
            let config = CodecConfig::from_level(CompressionLevel::new(level));
            group.bench_with_input(
                BenchmarkId::new(format!("level_{level}"), name),
                &data,
                |b, data| b.iter(|| compress(black_box(data), ".bin", &config)),
            );
        }
    }

    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    let size = 256 * 1024;

    for (name, generate) in PATTERNS {
        let data = generate(size);
        let Ok(payload) = compress(&data, ".bin", &CodecConfig::default()) else {
            continue;
        };
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &payload, |b, payload| {
            b.iter(|| decompress(black_box(payload)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lz77_strategies,
    bench_compress_levels,
    bench_decompress
);
criterion_main!(benches);
