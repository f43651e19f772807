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

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyDict};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::fmt;

use crate::error::ShuffleError;
use crate::weighted_shuffle::{seed_thread_rng, shuffle, shuffle_rng};

impl<K: fmt::Debug> From<ShuffleError<K>> for PyErr {
    fn from(err: ShuffleError<K>) -> Self {
        PyErr::new::<PyValueError, _>(err.to_string())
    }
}

// Python keys need not be hashable or comparable on the Rust side, so the
// tree is built over their positions and the objects are mapped back after.
fn collect_weights(weights: &Bound<'_, PyAny>) -> PyResult<(Vec<PyObject>, Vec<(usize, f64)>)> {
    let mut keys = Vec::new();
    let mut indexed = Vec::new();

    // dicts keep insertion order, iterate items rather than keys
    if let Ok(dict) = weights.downcast::<PyDict>() {
        for (k, w) in dict.iter() {
            indexed.push((keys.len(), w.extract::<f64>()?));
            keys.push(k.unbind());
        }
    } else {
        for item in weights.try_iter()? {
            let (k, w): (Bound<'_, PyAny>, f64) = item?.extract()?;
            indexed.push((keys.len(), w));
            keys.push(k.unbind());
        }
    }

    Ok((keys, indexed))
}

/// Weighted shuffle without replacement. `weights` is a dict or an iterable
/// of `(key, weight)` pairs.
#[pyfunction]
#[pyo3(name = "shuffle", signature = (weights, seed=None))]
fn py_shuffle(py: Python<'_>, weights: &Bound<'_, PyAny>, seed: Option<u64>) -> PyResult<Vec<PyObject>> {
    let (keys, indexed) = collect_weights(weights)?;

    let order = py
        .allow_threads(|| match seed {
            Some(seed) => shuffle_rng(indexed, &mut Pcg32::seed_from_u64(seed)),
            None => shuffle(indexed),
        })
        .map_err(|err| match err {
            ShuffleError::InvalidWeight { key, weight } => {
                let repr = keys[key]
                    .bind(py)
                    .repr()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|_| format!("#{key}"));
                PyErr::new::<PyValueError, _>(format!(
                    "Weight {} for key {} is not a finite nonnegative number",
                    weight, repr
                ))
            }
            other => other.into(),
        })?;

    Ok(order.into_iter().map(|i| keys[i].clone_ref(py)).collect())
}

/// Reseeds the generator used when `shuffle` is called without a seed.
#[pyfunction]
#[pyo3(name = "seed")]
fn py_seed(seed: u64) {
    seed_thread_rng(seed)
}

pub(crate) fn register_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_shuffle, m)?)?;
    m.add_function(wrap_pyfunction!(py_seed, m)?)?;
    Ok(())
}
