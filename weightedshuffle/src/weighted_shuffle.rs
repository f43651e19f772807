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

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32 as RNGType;

use std::cell::RefCell;
use std::sync::Arc;

use log::trace;

use crate::error::ShuffleResult;
use crate::selection_tree::{BuiltTree, Leaf, Tree};

// All shuffles on a thread share one stream unless a source is passed in.
thread_local! {
    static GEN: RefCell<RNGType> = RefCell::new(RNGType::from_seed(rand::random()));
}

/// Reseeds the thread-local generator used by [shuffle] and
/// [crate::naive::naive_shuffle].
///
/// Only affects the calling thread.
pub fn seed_thread_rng(seed: u64) {
    GEN.with(|g| *g.borrow_mut() = RNGType::seed_from_u64(seed));
}

/// Supplier of uniform draws in $[0, 1)$.
pub trait RandomSource {
    fn draw(&mut self) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn draw(&mut self) -> f64 {
        (**self).draw()
    }
}

/// Draws from the thread-local [rand_pcg::Pcg32].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn draw(&mut self) -> f64 {
        GEN.with(|g| g.borrow_mut().random_range(0.0..1.0))
    }
}

/// Adapts any [rand::Rng] into a [RandomSource].
#[derive(Debug, Clone)]
pub struct FromRng<R>(pub R);

impl<R: Rng> RandomSource for FromRng<R> {
    fn draw(&mut self) -> f64 {
        self.0.random_range(0.0..1.0)
    }
}

/// Replays a fixed list of draws, starting over once it runs out.
///
/// An empty script always draws `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    values: Vec<f64>,
    next: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        ScriptedSource {
            values: values.into(),
            next: 0,
        }
    }

    /// Draws `value` every time.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedSource {
    fn draw(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}

/// Lazy weighted shuffle: each call to `next` removes one key from the tree.
///
/// Let $S$ be the total weight of the keys not yet returned. Each step draws
/// $r \in [0, 1)$ and picks the leaf at $r \cdot S$, so a surviving key $k$
/// comes next with probability $\dfrac{w_k}{S}$, the same as repeated
/// roulette-wheel selection with removal, at $\mathcal{O}(\log n)$ per step.
///
/// $S$ is read once from the freshly built tree and then decremented by the
/// weight of every removed leaf. Once only zero-weight keys are left they come
/// out in input order. A draw is consumed on every step either way.
///
/// # Examples
/// ```
/// use weightedshuffle_rs::{ScriptedSource, Tree};
///
/// let built = Tree::build(vec![("a", 1.0), ("b", 98.0), ("c", 1.0)]).unwrap();
/// assert_eq!(built.total_weight(), 100.0);
///
/// let mut order = built.into_shuffle(ScriptedSource::new(vec![0.5, 0.75, 0.0]));
/// assert_eq!(order.len(), 3);
/// assert_eq!(order.next(), Some("b"));
/// assert_eq!(order.collect::<Vec<_>>(), vec!["c", "a"]);
/// ```
#[derive(Debug)]
pub struct Shuffle<K, S> {
    tree: Tree<K>,
    total: f64,
    source: S,
}

impl<K> BuiltTree<K> {
    /// Starts shuffling the tree, drawing from `source`.
    pub fn into_shuffle<S: RandomSource>(self, source: S) -> Shuffle<K, S> {
        Shuffle {
            total: self.total_weight(),
            tree: self.into_tree(),
            source,
        }
    }
}

impl<K, S> Shuffle<K, S> {
    /// Keys not yet returned.
    pub fn remaining(&self) -> &Tree<K> {
        &self.tree
    }

    /// Running total of the weights not yet returned.
    pub fn remaining_weight(&self) -> f64 {
        self.total
    }
}

impl<K: Clone, S: RandomSource> Iterator for Shuffle<K, S> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        if self.tree.is_empty() {
            return None;
        }

        let r = self.source.draw();
        let picked = if self.tree.positive_size() > 0 {
            self.tree.pick(r * self.total)
        } else {
            self.tree.pick_leftmost()
        };
        let (leaf, rest) = picked.ok().expect("non-empty tree always yields a leaf");

        self.tree = rest;
        self.total -= leaf.weight();
        trace!(
            "picked leaf of weight {} at r = {}, {} left with weight {}",
            leaf.weight(),
            r,
            self.tree.size(),
            self.total
        );

        // The old tree is gone, so the leaf is usually ours alone.
        Some(Arc::try_unwrap(leaf).map_or_else(|shared| shared.key().clone(), Leaf::into_key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.tree.size();
        (n, Some(n))
    }
}

impl<K: Clone, S: RandomSource> ExactSizeIterator for Shuffle<K, S> {}

/// Weighted shuffle of `weights` using the thread-local generator.
///
/// Returns the keys as a permutation where, at every position, each
/// remaining key is chosen with probability proportional to its weight.
///
/// **Complexity:** $\mathcal{O}(n \log n)$.
///
/// For reproducible output, call [seed_thread_rng] first or use
/// [shuffle_with] / [shuffle_rng].
///
/// ------
///
/// Returns [crate::ShuffleError::InvalidWeight] if a weight is negative, NaN
/// or infinite, and [crate::ShuffleError::TotalOverflow] if the weights sum
/// to infinity. Nothing is drawn in either case.
pub fn shuffle<K, I>(weights: I) -> ShuffleResult<Vec<K>, K>
where
    K: Clone,
    I: IntoIterator<Item = (K, f64)>,
{
    shuffle_with(weights, ThreadRngSource)
}

/// Weighted shuffle of `weights` using a **caller-supplied** [RandomSource].
///
/// One draw is consumed per key, in output order.
pub fn shuffle_with<K, I, S>(weights: I, source: S) -> ShuffleResult<Vec<K>, K>
where
    K: Clone,
    I: IntoIterator<Item = (K, f64)>,
    S: RandomSource,
{
    Ok(Tree::build(weights)?.into_shuffle(source).collect())
}

/// Weighted shuffle of `weights` using a **caller-supplied RNG**.
pub fn shuffle_rng<K, I, R>(weights: I, generator: &mut R) -> ShuffleResult<Vec<K>, K>
where
    K: Clone,
    I: IntoIterator<Item = (K, f64)>,
    R: Rng + ?Sized,
{
    shuffle_with(weights, FromRng(generator))
}
