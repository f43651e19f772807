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

//! Persistent binary tree for weighted pick-and-remove.
//!
//! Leaves hold the `(key, weight)` items in input order. Every internal node
//! stores the total weight of its **left** subtree, which is the only aggregate
//! needed to route a value in $[0, S)$ down to a leaf, where $S$ is the sum of
//! the remaining weights. Removing a leaf only touches the nodes on its path, so
//! a pick costs $\mathcal{O}(\log n)$ and shares every other subtree with the
//! previous version of the tree.

use std::sync::Arc;

use log::debug;

use crate::error::{check_weight, ShuffleError, ShuffleResult};

/// One `(key, weight)` item.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<K> {
    key: K,
    weight: f64,
}

impl<K> Leaf<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn into_key(self) -> K {
        self.key
    }
}

#[derive(Debug, PartialEq)]
pub struct Node<K> {
    left: Tree<K>,
    right: Tree<K>,
    size: usize,
    // Leaves with a nonzero weight, in the whole subtree and under `left`.
    // Exact counts, so routing never enters a side that only has zero
    // weights left, whatever rounding did to `weight`.
    positive: usize,
    left_positive: usize,
    // Sum of the leaf weights under `left`, kept exact through every pick.
    weight: f64,
    // Sum of the whole subtree. Never updated by a pick, so it goes stale
    // after the first removal.
    cumulative_weight: f64,
}

impl<K> Node<K> {
    pub fn left(&self) -> &Tree<K> {
        &self.left
    }

    pub fn right(&self) -> &Tree<K> {
        &self.right
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Total weight of the left subtree, i.e. the routing threshold.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    // True when the leaf under `value` is on the left. A side holding only
    // zero weights is never entered while the other one has weight left.
    fn routes_left(&self, value: f64) -> bool {
        let left = self.left_positive > 0;
        let right = self.positive > self.left_positive;
        if left == right {
            value < self.weight
        } else {
            left
        }
    }

    fn replace_left(&self, leaf: Arc<Leaf<K>>, subtree: Tree<K>) -> (Arc<Leaf<K>>, Tree<K>) {
        // Left side is gone, the sibling takes this node's place.
        if subtree.is_empty() {
            return (leaf, self.right.clone());
        }
        let removed = usize::from(leaf.weight > 0.0);
        let left_positive = self.left_positive - removed;
        // Repeated subtraction leaves rounding residue behind, so reset the
        // threshold whenever the exact value is known.
        let weight = match &subtree {
            Tree::Leaf(only) => only.weight,
            _ if left_positive == 0 => 0.0,
            _ => self.weight - leaf.weight,
        };
        let node = Node {
            left: subtree,
            right: self.right.clone(),
            size: self.size - 1,
            positive: self.positive - removed,
            left_positive,
            weight,
            cumulative_weight: self.cumulative_weight,
        };
        (leaf, Tree::Node(Arc::new(node)))
    }

    fn replace_right(&self, leaf: Arc<Leaf<K>>, subtree: Tree<K>) -> (Arc<Leaf<K>>, Tree<K>) {
        if subtree.is_empty() {
            return (leaf, self.left.clone());
        }
        let node = Node {
            left: self.left.clone(),
            right: subtree,
            size: self.size - 1,
            positive: self.positive - usize::from(leaf.weight > 0.0),
            left_positive: self.left_positive,
            weight: self.weight,
            cumulative_weight: self.cumulative_weight,
        };
        (leaf, Tree::Node(Arc::new(node)))
    }
}

/// A weighted selection tree.
///
/// Cloning is cheap: children are reference counted and never mutated, so a
/// clone (or any older version returned by [Tree::pick]) stays valid while
/// newer versions are derived from it.
#[derive(Debug, PartialEq)]
pub enum Tree<K> {
    Empty,
    Leaf(Arc<Leaf<K>>),
    Node(Arc<Node<K>>),
}

impl<K> Clone for Tree<K> {
    fn clone(&self) -> Self {
        match self {
            Tree::Empty => Tree::Empty,
            Tree::Leaf(leaf) => Tree::Leaf(Arc::clone(leaf)),
            Tree::Node(node) => Tree::Node(Arc::clone(node)),
        }
    }
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Tree::Empty
    }
}

impl<K> Tree<K> {
    /// Builds a tree from an ordered sequence of `(key, weight)` pairs.
    ///
    /// Leaves keep the input order. Adjacent entries of each level are paired
    /// into nodes (an odd entry out is carried up unchanged) until a single
    /// root remains, giving a height of $\lceil \log_2 n \rceil$ in
    /// $\mathcal{O}(n \log n)$ time.
    ///
    /// The shape, and therefore the exact output of a scripted shuffle,
    /// depends on the iteration order of `weights`. Pass a `Vec` or a
    /// `BTreeMap` when that matters.
    ///
    /// Returns [ShuffleError::InvalidWeight] for the first weight that is
    /// negative, NaN or infinite, and [ShuffleError::TotalOverflow] if the
    /// weights are finite but their sum is not.
    pub fn build<I>(weights: I) -> ShuffleResult<BuiltTree<K>, K>
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut level = weights
            .into_iter()
            .map(|(key, weight)| {
                check_weight(key, weight)
                    .map(|(key, weight)| Tree::Leaf(Arc::new(Leaf { key, weight })))
            })
            .collect::<ShuffleResult<Vec<_>, K>>()?;

        let mut height = 0;
        while level.len() > 1 {
            let mut paired = Vec::with_capacity(level.len().div_ceil(2));
            let mut trees = level.into_iter();
            while let Some(left) = trees.next() {
                paired.push(match trees.next() {
                    Some(right) => Tree::join(left, right),
                    None => left,
                });
            }
            level = paired;
            height += 1;
        }

        let built = BuiltTree {
            tree: level.pop().unwrap_or_default(),
        };
        if !built.total_weight().is_finite() {
            return Err(ShuffleError::TotalOverflow);
        }
        debug!(
            "built selection tree: {} leaves, height {}, total weight {}",
            built.size(),
            height,
            built.total_weight()
        );
        Ok(built)
    }

    fn join(left: Tree<K>, right: Tree<K>) -> Tree<K> {
        let weight = left.cumulative_weight();
        let cumulative_weight = weight + right.cumulative_weight();
        Tree::Node(Arc::new(Node {
            size: left.size() + right.size(),
            positive: left.positive_size() + right.positive_size(),
            left_positive: left.positive_size(),
            left,
            right,
            weight,
            cumulative_weight,
        }))
    }

    // Only meaningful before the first pick; see [BuiltTree].
    fn cumulative_weight(&self) -> f64 {
        match self {
            Tree::Empty => 0.0,
            Tree::Leaf(leaf) => leaf.weight,
            Tree::Node(node) => node.cumulative_weight,
        }
    }

    /// Removes the leaf that `value` falls on and returns it together with
    /// the smaller tree. `self` is left untouched.
    ///
    /// At each node a value strictly below the left weight goes left,
    /// anything else goes right offset by the left weight. A value in
    /// $[0, S)$ is therefore a proper weighted draw. While any leaf of
    /// nonzero weight remains, zero-weight leaves are never returned: values
    /// at or below zero end on the leftmost nonzero leaf, and values at or
    /// above $S$ (or NaN) on the rightmost one.
    ///
    /// When every remaining weight is zero the strict comparison still
    /// applies, so `pick(0.0)` returns the **rightmost** leaf. Use
    /// [Tree::pick_leftmost] to take those leaves in input order.
    ///
    /// **Complexity:** $\mathcal{O}(\text{depth})$, one new node per level.
    ///
    /// Returns [ShuffleError::EmptyTree] if there is nothing to pick.
    pub fn pick(&self, value: f64) -> ShuffleResult<(Arc<Leaf<K>>, Tree<K>), K> {
        match self {
            Tree::Empty => Err(ShuffleError::EmptyTree),
            Tree::Leaf(leaf) => Ok((Arc::clone(leaf), Tree::Empty)),
            Tree::Node(node) => {
                if node.routes_left(value) {
                    let (leaf, subtree) = node.left.pick(value)?;
                    Ok(node.replace_left(leaf, subtree))
                } else {
                    let (leaf, subtree) = node.right.pick(value - node.weight)?;
                    Ok(node.replace_right(leaf, subtree))
                }
            }
        }
    }

    /// Removes the leftmost leaf regardless of weights.
    ///
    /// Returns [ShuffleError::EmptyTree] if there is nothing to pick.
    pub fn pick_leftmost(&self) -> ShuffleResult<(Arc<Leaf<K>>, Tree<K>), K> {
        match self {
            Tree::Empty => Err(ShuffleError::EmptyTree),
            Tree::Leaf(leaf) => Ok((Arc::clone(leaf), Tree::Empty)),
            Tree::Node(node) => {
                let (leaf, subtree) = node.left.pick_leftmost()?;
                Ok(node.replace_left(leaf, subtree))
            }
        }
    }

    /// Number of leaves.
    pub fn size(&self) -> usize {
        match self {
            Tree::Empty => 0,
            Tree::Leaf(_) => 1,
            Tree::Node(node) => node.size,
        }
    }

    /// Number of leaves with a nonzero weight.
    pub fn positive_size(&self) -> usize {
        match self {
            Tree::Empty => 0,
            Tree::Leaf(leaf) => usize::from(leaf.weight > 0.0),
            Tree::Node(node) => node.positive,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Tree::Empty)
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        match self {
            Tree::Empty | Tree::Leaf(_) => 0,
            Tree::Node(node) => 1 + node.left.height().max(node.right.height()),
        }
    }

    pub fn leftmost(&self) -> Option<&Leaf<K>> {
        let mut cur = self;
        loop {
            match cur {
                Tree::Empty => return None,
                Tree::Leaf(leaf) => return Some(&**leaf),
                Tree::Node(node) => cur = &node.left,
            }
        }
    }

    pub fn rightmost(&self) -> Option<&Leaf<K>> {
        let mut cur = self;
        loop {
            match cur {
                Tree::Empty => return None,
                Tree::Leaf(leaf) => return Some(&**leaf),
                Tree::Node(node) => cur = &node.right,
            }
        }
    }

    /// Iterates over the remaining `(key, weight)` pairs in input order.
    pub fn iter(&self) -> Leaves<'_, K> {
        Leaves { stack: vec![self] }
    }
}

/// A tree straight out of [Tree::build].
///
/// This is the only place the whole-tree weight can be read: the cumulative
/// sums are not maintained by [Tree::pick], so once the tree has been handed
/// out with [BuiltTree::into_tree] the total is no longer available.
#[derive(Debug)]
pub struct BuiltTree<K> {
    tree: Tree<K>,
}

impl<K> BuiltTree<K> {
    /// Sum of all weights.
    pub fn total_weight(&self) -> f64 {
        self.tree.cumulative_weight()
    }

    pub fn size(&self) -> usize {
        self.tree.size()
    }

    pub fn tree(&self) -> &Tree<K> {
        &self.tree
    }

    pub fn into_tree(self) -> Tree<K> {
        self.tree
    }
}

/// In-order iterator over the leaves of a [Tree].
pub struct Leaves<'a, K> {
    stack: Vec<&'a Tree<K>>,
}

impl<'a, K> Iterator for Leaves<'a, K> {
    type Item = (&'a K, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(tree) = self.stack.pop() {
            match tree {
                Tree::Empty => continue,
                Tree::Leaf(leaf) => return Some((&leaf.key, leaf.weight)),
                Tree::Node(node) => {
                    self.stack.push(&node.right);
                    self.stack.push(&node.left);
                }
            }
        }
        None
    }
}

impl<'a, K> IntoIterator for &'a Tree<K> {
    type Item = (&'a K, f64);
    type IntoIter = Leaves<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Same as [Tree::build].
pub fn build<K, I>(weights: I) -> ShuffleResult<BuiltTree<K>, K>
where
    I: IntoIterator<Item = (K, f64)>,
{
    Tree::build(weights)
}

/// Same as [Tree::pick].
pub fn pick<K>(tree: &Tree<K>, value: f64) -> ShuffleResult<(Arc<Leaf<K>>, Tree<K>), K> {
    tree.pick(value)
}
