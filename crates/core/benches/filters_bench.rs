//! Benchmarks for the stream decoders on the compressed-PDF hot path.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use sucre_core::ByteCursor;
use sucre_core::codec::{ascii85decode, flatedecode, lzwdecode, rldecode};
use sucre_core::predictor::PredictorParams;

/// Repeating pattern; compresses well.
fn generate_raw_bytes(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Simple PRNG bytes; realistic worst case for the compressors.
fn generate_random_bytes(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 42;
    for _ in 0..size {
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((seed >> 16) as u8);
    }
    data
}

fn ascii85_encode(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(data.len() * 5 / 4 + 10);
    result.extend_from_slice(b"<~");

    for chunk in data.chunks(4) {
        let mut padded = [0u8; 4];
        padded[..chunk.len()].copy_from_slice(chunk);
        let value = u32::from_be_bytes(padded);
        if chunk.len() == 4 && value == 0 {
            result.push(b'z');
            continue;
        }
        let mut encoded = [0u8; 5];
        let mut v = value;
        for i in (0..5).rev() {
            encoded[i] = (v % 85) as u8 + b'!';
            v /= 85;
        }
        result.extend_from_slice(&encoded[..chunk.len() + 1]);
    }

    result.extend_from_slice(b"~>");
    result
}

fn lzw_encode(data: &[u8]) -> Vec<u8> {
    use weezl::{BitOrder, encode::Encoder};
    Encoder::new(BitOrder::Msb, 8)
        .encode(data)
        .expect("LZW encoding should succeed for benchmark data")
}

fn runlength_encode(data: &[u8]) -> Vec<u8> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let byte = data[i];
        let mut run_len = 1;
        while i + run_len < data.len() && data[i + run_len] == byte && run_len < 128 {
            run_len += 1;
        }

        if run_len >= 2 {
            result.push((257 - run_len) as u8);
            result.push(byte);
            i += run_len;
        } else {
            let start = i;
            let mut lit_len = 1;
            while i + lit_len + 1 < data.len()
                && data[i + lit_len] != data[i + lit_len + 1]
                && lit_len < 128
            {
                lit_len += 1;
            }
            result.push((lit_len - 1) as u8);
            result.extend_from_slice(&data[start..start + lit_len]);
            i += lit_len;
        }
    }

    result.push(128);
    result
}

fn zlib_encode(data: &[u8]) -> Vec<u8> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

fn bench_ascii85(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters_ascii85");
    for size in [1024usize, 10 * 1024, 100 * 1024] {
        let encoded = ascii85_encode(&generate_raw_bytes(size));
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &encoded,
            |b, encoded| {
                b.iter(|| {
                    let mut cursor = ByteCursor::copy_of(black_box(encoded));
                    ascii85decode(&mut cursor).unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_lzw(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters_lzw");
    let params = PredictorParams::default();
    for (name, raw) in [
        ("pattern_10K", generate_raw_bytes(10 * 1024)),
        ("random_10K", generate_random_bytes(10 * 1024)),
    ] {
        let encoded = lzw_encode(&raw);
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &encoded,
            |b, encoded| {
                b.iter(|| {
                    let mut cursor = ByteCursor::copy_of(black_box(encoded));
                    lzwdecode(&mut cursor, &params).unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_runlength(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters_runlength");
    for (name, raw) in [
        ("pattern_100K", generate_raw_bytes(100 * 1024)),
        ("random_100K", generate_random_bytes(100 * 1024)),
    ] {
        let encoded = runlength_encode(&raw);
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &encoded,
            |b, encoded| {
                b.iter(|| {
                    let mut cursor = ByteCursor::copy_of(black_box(encoded));
                    rldecode(&mut cursor).unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_flate(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters_flate");
    let params = PredictorParams::default();
    for (name, raw) in [
        ("pattern_100K", generate_raw_bytes(100 * 1024)),
        ("random_100K", generate_random_bytes(100 * 1024)),
    ] {
        let encoded = zlib_encode(&raw);
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &encoded,
            |b, encoded| {
                b.iter(|| {
                    let mut cursor = ByteCursor::copy_of(black_box(encoded));
                    flatedecode(&mut cursor, &params).unwrap()
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ascii85,
    bench_lzw,
    bench_runlength,
    bench_flate
);
criterion_main!(benches);
