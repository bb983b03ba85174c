//! Performance benchmarks for gstindex
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gstindex::tree::{SuffixTree, TreeConfig};
use std::io;

/// Deterministic pseudo-random sentences over a small alphabet
fn sample_texts(count: usize, len: usize) -> Vec<String> {
    let alphabet: Vec<char> = "acgt ".chars().collect();
    let mut state: u32 = 0x2545_f491;
    (0..count)
        .map(|_| {
            (0..len)
                .map(|_| {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    alphabet[state as usize % alphabet.len()]
                })
                .collect()
        })
        .collect()
}

fn build_tree(texts: &[String]) -> SuffixTree {
    let config = TreeConfig {
        check_invariants: false,
        ..TreeConfig::default()
    };
    let mut tree = SuffixTree::new(config);
    for (i, body) in texts.iter().enumerate() {
        let terminator = char::from_u32(0xE000 + i as u32).unwrap_or('\u{E000}');
        tree.insert(i as u32, &format!("{}{}", body, terminator))
            .expect("benchmark corpus is well formed");
    }
    tree
}

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    for &count in &[10usize, 100, 500] {
        let texts = sample_texts(count, 80);
        group.bench_with_input(BenchmarkId::from_parameter(count), &texts, |b, texts| {
            b.iter(|| build_tree(black_box(texts)))
        });
    }
    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let tree = build_tree(&sample_texts(500, 80));
    let patterns = vec!["a", "acg", "gattaca", "tttt", "cat g"];

    let mut group = c.benchmark_group("locate");
    for pattern in patterns {
        group.bench_with_input(BenchmarkId::from_parameter(pattern), &pattern, |b, p| {
            b.iter(|| tree.locate(black_box(p)))
        });
    }
    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let tree = build_tree(&sample_texts(200, 80));
    c.bench_function("report_emission", |b| {
        b.iter(|| tree.write_report(io::sink()))
    });
}

criterion_group!(benches, bench_construction, bench_locate, bench_report);

criterion_main!(benches);
