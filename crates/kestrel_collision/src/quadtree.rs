//! # Quadtree Broad-phase
//!
//! Rebuilt from scratch every tick. Nodes live in a flat arena and refer to
//! their children by index.
//!
//! ## Insertion
//!
//! A node keeps its boxes if it holds at most `split_threshold` of them or
//! sits at `max_depth`. Otherwise it splits into four equal quadrants and
//! hands each box to every quadrant it overlaps, so a box straddling a
//! boundary lands in several leaves.
//!
//! ## Resolution
//!
//! Leaves are visited depth-first. Inside a leaf every pair is tested with
//! [`Aabb::overlaps`]. A pair found in more than one leaf is reported once.
//!
//! ## Bounds
//!
//! The root covers the play field grown to enclose every box, so boxes that
//! left the field still collide with each other.

use std::collections::HashSet;

use kestrel_shared::{QuadTreeConfig, QUADTREE_MAX_DEPTH_LIMIT};

use crate::aabb::Aabb;

/// Subdivision limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadTreePolicy {
    /// A node splits once it holds more boxes than this.
    pub split_threshold: usize,
    /// Nodes at this depth never split. Capped at
    /// [`QUADTREE_MAX_DEPTH_LIMIT`] when the tree is built.
    pub max_depth: u32,
}

impl QuadTreePolicy {
    /// Same policy with both limits pulled into their accepted range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            split_threshold: self.split_threshold.max(1),
            max_depth: self.max_depth.min(QUADTREE_MAX_DEPTH_LIMIT),
        }
    }
}

impl Default for QuadTreePolicy {
    fn default() -> Self {
        Self::from(QuadTreeConfig::default())
    }
}

impl From<QuadTreeConfig> for QuadTreePolicy {
    fn from(config: QuadTreeConfig) -> Self {
        Self {
            split_threshold: config.split_threshold,
            max_depth: config.max_depth,
        }
        .clamped()
    }
}

#[derive(Debug)]
struct QuadNode {
    bounds: Aabb,
    depth: u32,
    first_child: Option<usize>,
    entries: Vec<u32>,
}

impl QuadNode {
    const fn leaf(bounds: Aabb, depth: u32) -> Self {
        Self {
            bounds,
            depth,
            first_child: None,
            entries: Vec::new(),
        }
    }
}

/// Read-only view of a node, for debug drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeView {
    /// Region covered.
    pub bounds: Aabb,
    /// Distance from the root.
    pub depth: u32,
    /// True if the node has no children.
    pub is_leaf: bool,
    /// Boxes stored here (zero for inner nodes).
    pub entries: usize,
}

/// Shape of a built tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QuadTreeStats {
    /// Boxes inserted (degenerate ones excluded).
    pub entries: usize,
    /// Nodes allocated.
    pub nodes: usize,
    /// Nodes without children.
    pub leaves: usize,
    /// Box references across all leaves, duplicates included.
    pub stored: usize,
    /// Deepest node.
    pub max_depth: u32,
}

/// Quadtree over boxes keyed by `K`.
#[derive(Debug)]
pub struct QuadTree<K> {
    policy: QuadTreePolicy,
    nodes: Vec<QuadNode>,
    entries: Vec<(K, Aabb)>,
}

impl<K: Copy> QuadTree<K> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new(policy: QuadTreePolicy) -> Self {
        Self {
            policy: policy.clamped(),
            nodes: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Builds a tree over `items` inside `field`.
    #[must_use]
    pub fn build(
        field: Aabb,
        policy: QuadTreePolicy,
        items: impl IntoIterator<Item = (K, Aabb)>,
    ) -> Self {
        let mut tree = Self::new(policy);
        tree.rebuild(field, items);
        tree
    }

    /// Discards the previous contents and builds again, reusing allocations.
    pub fn rebuild(&mut self, field: Aabb, items: impl IntoIterator<Item = (K, Aabb)>) {
        self.nodes.clear();
        self.entries.clear();
        self.entries
            .extend(items.into_iter().filter(|(_, aabb)| !aabb.is_degenerate()));

        let root_bounds = self
            .entries
            .iter()
            .fold(field, |acc, (_, aabb)| acc.union(aabb));
        self.nodes.push(QuadNode::leaf(root_bounds, 0));

        // Entry count is bounded by the entity id space.
        let all: Vec<u32> = (0..self.entries.len())
            .map(|i| u32::try_from(i).unwrap_or(u32::MAX))
            .collect();
        self.insert(all);

        tracing::trace!(
            entries = self.entries.len(),
            nodes = self.nodes.len(),
            "quadtree rebuilt"
        );
    }

    fn insert(&mut self, items: Vec<u32>) {
        let mut pending = vec![(0usize, items)];

        while let Some((node, items)) = pending.pop() {
            let depth = self.nodes[node].depth;
            if items.len() <= self.policy.split_threshold || depth >= self.policy.max_depth {
                self.nodes[node].entries = items;
                continue;
            }

            let quadrants = self.nodes[node].bounds.quadrants();
            let first = self.nodes.len();
            self.nodes
                .extend(quadrants.iter().map(|&q| QuadNode::leaf(q, depth + 1)));
            self.nodes[node].first_child = Some(first);

            let mut buckets: [Vec<u32>; 4] = Default::default();
            for &item in &items {
                let aabb = &self.entries[item as usize].1;
                for (bucket, quadrant) in buckets.iter_mut().zip(&quadrants) {
                    if quadrant.overlaps(aabb) {
                        bucket.push(item);
                    }
                }
            }

            // Reverse push keeps quadrant order on pop.
            for (offset, bucket) in buckets.into_iter().enumerate().rev() {
                if !bucket.is_empty() {
                    pending.push((first + offset, bucket));
                }
            }
        }
    }

    /// Every overlapping pair, each reported once, in depth-first leaf order.
    #[must_use]
    pub fn overlapping_pairs(&self) -> Vec<(K, K)> {
        let mut pairs = Vec::new();
        self.resolve(|a, b| pairs.push((a, b)));
        pairs
    }

    /// Calls `on_pair(a, b)` once for every overlapping pair.
    ///
    /// Within a pair, `a` was inserted before `b`.
    pub fn resolve(&self, mut on_pair: impl FnMut(K, K)) {
        let mut seen: HashSet<(u32, u32)> = HashSet::new();
        let mut tests = 0usize;
        let mut stack = vec![0usize];

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if let Some(first) = node.first_child {
                // Reverse push keeps quadrant order on pop.
                stack.extend((first..first + 4).rev());
                continue;
            }
            for (i, &a) in node.entries.iter().enumerate() {
                for &b in &node.entries[i + 1..] {
                    tests += 1;
                    let (ka, aa) = &self.entries[a as usize];
                    let (kb, ab) = &self.entries[b as usize];
                    if aa.overlaps(ab) && seen.insert((a.min(b), a.max(b))) {
                        if a < b {
                            on_pair(*ka, *kb);
                        } else {
                            on_pair(*kb, *ka);
                        }
                    }
                }
            }
        }

        tracing::trace!(tests, pairs = seen.len(), "quadtree resolved");
    }

    /// Visits every node depth-first, parents before children.
    pub fn for_each_node(&self, mut visit: impl FnMut(NodeView)) {
        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            visit(NodeView {
                bounds: node.bounds,
                depth: node.depth,
                is_leaf: node.first_child.is_none(),
                entries: node.entries.len(),
            });
            if let Some(first) = node.first_child {
                stack.extend((first..first + 4).rev());
            }
        }
    }

    /// Region covered by the root.
    #[must_use]
    pub fn root_bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|root| root.bounds)
    }

    /// Subdivision limits in use.
    #[must_use]
    pub const fn policy(&self) -> QuadTreePolicy {
        self.policy
    }

    /// Shape of the current tree.
    #[must_use]
    pub fn stats(&self) -> QuadTreeStats {
        let mut stats = QuadTreeStats {
            entries: self.entries.len(),
            nodes: self.nodes.len(),
            ..QuadTreeStats::default()
        };
        for node in &self.nodes {
            stats.max_depth = stats.max_depth.max(node.depth);
            if node.first_child.is_none() {
                stats.leaves += 1;
                stats.stored += node.entries.len();
            }
        }
        stats
    }
}

/// All overlapping pairs by exhaustive testing, skipping degenerate boxes.
///
/// Reference for the quadtree; quadratic.
#[must_use]
pub fn brute_force_pairs<K: Copy>(items: &[(K, Aabb)]) -> Vec<(K, K)> {
    let mut pairs = Vec::new();
    for (i, (ka, a)) in items.iter().enumerate() {
        if a.is_degenerate() {
            continue;
        }
        for (kb, b) in &items[i + 1..] {
            if !b.is_degenerate() && a.overlaps(b) {
                pairs.push((*ka, *kb));
            }
        }
    }
    pairs
}
