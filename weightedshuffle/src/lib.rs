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

//! Weighted shuffle (sampling without replacement) in $\mathcal{O}(n \log n)$.
//!
//! Given keys with nonnegative weights $w_i$, produces a permutation where each
//! position is filled by a remaining key $k$ with probability
//! $\dfrac{w_k}{\sum_{j \text{ remaining}} w_j}$.
//!
//! Repeating a linear roulette-wheel scan and removing the winner costs
//! $\mathcal{O}(n^2)$. Here the items sit in the leaves of a persistent binary
//! tree whose nodes store the weight of their left subtree: each draw walks one
//! root-to-leaf path, removes the leaf and rebuilds only that path, so every
//! step is $\mathcal{O}(\log n)$.
//!
//! ```
//! use weightedshuffle_rs::shuffle;
//!
//! let order = shuffle(vec![("a", 1.0), ("b", 98.0), ("c", 1.0)]).unwrap();
//! assert_eq!(order.len(), 3);
//! ```

// Only compiles the module if py_bind feature is enabled
#[cfg(feature = "py_bind")]
mod py_bind;
#[cfg(feature = "py_bind")]
use pyo3::{pymodule, types::PyModule, Bound, PyResult};

mod error;
pub mod naive;
pub mod selection_tree;
mod weighted_shuffle;

pub use error::{ShuffleError, ShuffleResult};
pub use selection_tree::{build, pick, BuiltTree, Leaf, Tree};
pub use weighted_shuffle::{
    seed_thread_rng, shuffle, shuffle_rng, shuffle_with, FromRng, RandomSource, ScriptedSource,
    Shuffle, ThreadRngSource,
};

#[cfg(feature = "py_bind")]
#[pymodule]
fn weightedshuffle_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    py_bind::register_py(m)?;

    Ok(())
}
