// MIT License
//
// Copyright (c) 2025 Jai Veilleux
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

// Compares the tree shuffle against the quadratic scan and an unweighted
// Fisher-Yates shuffle over growing deck sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use weightedshuffle_rs::naive::naive_shuffle_with;
use weightedshuffle_rs::{shuffle_with, FromRng};

const SAMPLE_SIZES: [usize; 5] = [5, 10, 100, 1000, 10000];
const MAX_WEIGHT: f64 = 5.0;

fn deck(size: usize, rng: &mut Pcg32) -> Vec<(usize, f64)> {
    (0..size).map(|k| (k, rng.random_range(0.0..MAX_WEIGHT))).collect()
}

fn bench_shuffles(c: &mut Criterion) {
    let mut group = c.benchmark_group("shuffle");
    // the quadratic scan gets slow at the largest size
    group.sample_size(20);
    let mut rng = Pcg32::seed_from_u64(0);

    for size in SAMPLE_SIZES {
        let weights = deck(size, &mut rng);

        group.bench_with_input(BenchmarkId::new("uniform", size), &weights, |b, w| {
            let mut keys: Vec<usize> = w.iter().map(|(k, _)| *k).collect();
            b.iter(|| keys.shuffle(&mut rng));
            black_box(&keys);
        });

        group.bench_with_input(BenchmarkId::new("naive", size), &weights, |b, w| {
            b.iter(|| naive_shuffle_with(black_box(w.clone()), FromRng(&mut rng)).unwrap());
        });

        group.bench_with_input(BenchmarkId::new("tree", size), &weights, |b, w| {
            b.iter(|| shuffle_with(black_box(w.clone()), FromRng(&mut rng)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shuffles);
criterion_main!(benches);
