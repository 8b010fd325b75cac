use cdmo_reports::embeddings::{ChunkingConfig, chunk_text};
use cdmo_reports::index::FlatL2Index;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const DIMENSION: usize = 1536;

fn sample_text() -> String {
    let mut text = String::new();
    for section in 0..2_000 {
        text.push_str(&format!(
            "Section {section}: acrylic acid capacity, pricing and supplier qualification notes.\n"
        ));
        if section % 7 == 0 {
            text.push('\n');
        }
    }
    text
}

// Deterministic pseudo-random vector, no RNG dependency needed
fn vector(seed: usize) -> Vec<f32> {
    (0..DIMENSION)
        .map(|i| ((seed * 31 + i * 17) % 1000) as f32 / 1000.0)
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let text = sample_text();
    let config = ChunkingConfig::default();
    c.bench_function("chunking", |b| {
        b.iter(|| chunk_text(black_box(&text), black_box(&config)))
    });

    let mut index = FlatL2Index::new(DIMENSION);
    for seed in 0..2_000 {
        index.add(&vector(seed)).expect("dimension matches");
    }
    let query = vector(4_242);
    c.bench_function("flat_l2_search_top3", |b| {
        b.iter(|| index.search(black_box(&query), black_box(3)))
    });

    let bytes = index.to_bytes().expect("index should encode");
    c.bench_function("flat_l2_decode", |b| {
        b.iter(|| FlatL2Index::from_bytes(black_box(&bytes)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
