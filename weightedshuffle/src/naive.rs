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

//! Quadratic reference sampler.
//!
//! Scans the remaining entries on every draw and removes the one the draw
//! lands on. It consumes exactly one draw per removal, in the same order as
//! [crate::shuffle_with], so both produce the same permutation for the same
//! weights and the same draws. Use it to cross-check the tree, not in
//! production.

use crate::error::{check_weight, ShuffleError, ShuffleResult};
use crate::weighted_shuffle::{RandomSource, ThreadRngSource};

/// $\mathcal{O}(n^2)$ weighted shuffle using the thread-local generator.
pub fn naive_shuffle<K, I>(weights: I) -> ShuffleResult<Vec<K>, K>
where
    I: IntoIterator<Item = (K, f64)>,
{
    naive_shuffle_with(weights, ThreadRngSource)
}

/// $\mathcal{O}(n^2)$ weighted shuffle drawing from `source`.
pub fn naive_shuffle_with<K, I, S>(weights: I, mut source: S) -> ShuffleResult<Vec<K>, K>
where
    I: IntoIterator<Item = (K, f64)>,
    S: RandomSource,
{
    let mut remaining = weights
        .into_iter()
        .map(|(key, weight)| check_weight(key, weight))
        .collect::<ShuffleResult<Vec<_>, K>>()?;

    let mut total: f64 = remaining.iter().map(|(_, w)| w).sum();
    if !total.is_finite() {
        return Err(ShuffleError::TotalOverflow);
    }
    let mut positive = remaining.iter().filter(|(_, w)| *w > 0.0).count();
    let mut out = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut point = source.draw() * total;

        // Zero weights are skipped until nothing else is left, then taken
        // in order.
        let idx = if positive > 0 {
            remaining
                .iter()
                .position(|(_, w)| {
                    if *w > 0.0 {
                        point -= w;
                    }
                    *w > 0.0 && point < 0.0
                })
                .or_else(|| remaining.iter().rposition(|(_, w)| *w > 0.0))
                .unwrap_or(0)
        } else {
            0
        };

        let (key, weight) = remaining.remove(idx);
        if weight > 0.0 {
            positive -= 1;
        }
        total -= weight;
        out.push(key);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weighted_shuffle::ScriptedSource;

    #[test]
    fn empty_and_single() {
        assert_eq!(naive_shuffle(Vec::<(&str, f64)>::new()).unwrap(), Vec::<&str>::new());
        assert_eq!(naive_shuffle(vec![("a", 1.0)]).unwrap(), vec!["a"]);
    }

    #[test]
    fn midpoint_draw_takes_the_heavy_key() {
        let weights = vec![("a", 1.0), ("b", 98.0), ("c", 1.0)];
        let out = naive_shuffle_with(weights, ScriptedSource::new(vec![0.5, 0.75, 0.0])).unwrap();
        assert_eq!(out, vec!["b", "c", "a"]);
    }

    #[test]
    fn exhausted_weight_takes_entries_in_order() {
        let weights = vec![("a", 0.0), ("b", 0.0), ("c", 0.0)];
        let out = naive_shuffle_with(weights, ScriptedSource::constant(0.9)).unwrap();
        assert_eq!(out, vec!["a", "b", "c"]);
    }

    #[test]
    fn draws_past_the_total_skip_trailing_zeros() {
        let weights = vec![("a", 1.0), ("b", 2.0), ("z", 0.0)];
        let out = naive_shuffle_with(weights, ScriptedSource::constant(1.0)).unwrap();
        assert_eq!(out, vec!["b", "a", "z"]);
    }

    #[test]
    fn rejects_overflowing_total() {
        let err = naive_shuffle(vec![("a", f64::MAX), ("b", f64::MAX)]).unwrap_err();
        assert_eq!(err, ShuffleError::TotalOverflow);
    }

    #[test]
    fn rejects_negative_weight() {
        let err = naive_shuffle(vec![("a", 1.0), ("b", -3.0)]).unwrap_err();
        assert_eq!(err, ShuffleError::InvalidWeight { key: "b", weight: -3.0 });
    }
}
