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

use std::fmt;

pub type ShuffleResult<T, K> = Result<T, ShuffleError<K>>;

/// Errors that can occur while building a tree or drawing from it.
#[derive(Debug, Clone, PartialEq)]
pub enum ShuffleError<K> {
    /// A pick was attempted on a tree with no leaves left.
    EmptyTree,
    /// Weight is negative, NaN or infinite.
    InvalidWeight { key: K, weight: f64 },
    /// Every weight is finite but their sum overflows.
    TotalOverflow,
}

impl<K: fmt::Debug> fmt::Display for ShuffleError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShuffleError::EmptyTree => write!(f, "Cannot pick from an empty tree."),
            ShuffleError::InvalidWeight { key, weight } => {
                write!(f, "Weight {} for key {:?} is not a finite nonnegative number", weight, key)
            }
            ShuffleError::TotalOverflow => write!(f, "Sum of the weights is not finite."),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for ShuffleError<K> {}

/// Rejects weights the selection tree cannot route on.
///
/// Zero is allowed; such keys are only emitted once every
/// nonzero weight has been drawn.
pub(crate) fn check_weight<K>(key: K, weight: f64) -> ShuffleResult<(K, f64), K> {
    if weight.is_finite() && weight >= 0.0 {
        Ok((key, weight))
    } else {
        Err(ShuffleError::InvalidWeight { key, weight })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_and_positive() {
        assert_eq!(check_weight("a", 0.0), Ok(("a", 0.0)));
        assert_eq!(check_weight("b", 3.5), Ok(("b", 3.5)));
    }

    #[test]
    fn rejects_negative_nan_and_infinite() {
        for w in [-1.0, -f64::MIN_POSITIVE, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            match check_weight("k", w) {
                Err(ShuffleError::InvalidWeight { key, .. }) => assert_eq!(key, "k"),
                other => panic!("weight {w} was accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn display_names_the_key() {
        let err = ShuffleError::InvalidWeight { key: "apple", weight: -2.0 };
        assert_eq!(
            err.to_string(),
            "Weight -2 for key \"apple\" is not a finite nonnegative number"
        );
        assert_eq!(
            ShuffleError::<u32>::EmptyTree.to_string(),
            "Cannot pick from an empty tree."
        );
        assert_eq!(
            ShuffleError::<u32>::TotalOverflow.to_string(),
            "Sum of the weights is not finite."
        );
    }
}
