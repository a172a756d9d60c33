// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Performance benchmarks for scalegen
//!
//! Run with: cargo bench
//!
//! These benchmarks measure:
//! - Ring indexing and scale derivation
//! - Chord lookup
//! - Sequence generation throughput
//! - Letter-note rendering and phrase compilation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use scalegen::generators::{GenerationConfig, SequenceGenerator, SequenceRequest, StochasticGenerator};
use scalegen::music::{semitones_to_letter_notes, Ring, Scale};

/// Benchmark octave-relative ring indexing
fn bench_ring_indexing(c: &mut Criterion) {
    let mut ring = Ring::new(1..=12u8);
    ring.set_root_idx(5);

    c.bench_function("ring_at", |b| {
        b.iter(|| {
            for i in -24..24 {
                black_box(ring.at(black_box(i)).ok());
            }
        })
    });
}

/// Benchmark scale construction (interval derivation)
fn bench_scale_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale_derivation");

    for mode in ["major_scale", "minor_scale", "harmonic_scale", "melodic_minor"] {
        group.bench_with_input(BenchmarkId::from_parameter(mode), mode, |b, mode| {
            b.iter(|| black_box(Scale::new(black_box("F#"), mode).ok()))
        });
    }

    group.finish();
}

/// Benchmark chord lookup across three octaves
fn bench_chord_lookup(c: &mut Criterion) {
    let mut scale = match Scale::new("D", "major_scale") {
        Ok(scale) => scale,
        Err(e) => panic!("benchmark scale: {}", e),
    };

    c.bench_function("chord_lookup", |b| {
        b.iter(|| {
            for num in 1..=21 {
                black_box(scale.chord(black_box(num), 0, true).ok());
            }
        })
    });
}

/// Benchmark sequence generation for increasing durations
fn bench_sequence_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_generation");

    for duration in [4.0, 32.0, 128.0] {
        let request = SequenceRequest::new(duration).generation(GenerationConfig::default());

        group.bench_with_input(BenchmarkId::new("chords", duration), &request, |b, request| {
            let scale = Scale::new("C", "major_scale").ok();
            let mut generator = StochasticGenerator::new().with_seed(1);
            if let Some(scale) = scale {
                generator.set_scale(scale);
            }
            b.iter(|| black_box(generator.chord_sequence(request).ok()))
        });

        group.bench_with_input(BenchmarkId::new("notes", duration), &request, |b, request| {
            let scale = Scale::new("C", "major_scale").ok();
            let mut generator = StochasticGenerator::new().with_seed(1);
            if let Some(scale) = scale {
                generator.set_scale(scale);
            }
            b.iter(|| black_box(generator.note_sequence(request).ok()))
        });
    }

    group.finish();
}

/// Benchmark letter-note rendering of a chord table
fn bench_letter_rendering(c: &mut Criterion) {
    let mut scale = match Scale::new("A", "minor_scale") {
        Ok(scale) => scale,
        Err(e) => panic!("benchmark scale: {}", e),
    };
    let chords = scale.chord_table(true).unwrap_or_default();

    c.bench_function("letter_rendering", |b| {
        b.iter(|| {
            for chord in &chords {
                black_box(semitones_to_letter_notes(chord, 4));
            }
        })
    });
}

/// Benchmark phrase compilation
fn bench_phrase(c: &mut Criterion) {
    let scale = match Scale::new("C", "major_scale") {
        Ok(scale) => scale,
        Err(e) => panic!("benchmark scale: {}", e),
    };
    let text = "1 3+5 _2- 4 6 7+ 1++ ".repeat(16);

    c.bench_function("phrase_compile", |b| {
        b.iter(|| black_box(scale.phrase(black_box(&text), 4).ok()))
    });
}

criterion_group!(
    benches,
    bench_ring_indexing,
    bench_scale_derivation,
    bench_chord_lookup,
    bench_sequence_generation,
    bench_letter_rendering,
    bench_phrase,
);

criterion_main!(benches);
