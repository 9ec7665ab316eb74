//! # Kestrel Collision
//!
//! Two-stage collision detection for axis-aligned boxes.
//!
//! 1. **Broad-phase**: [`QuadTree`] partitions the field each tick so only
//!    boxes sharing a leaf are compared.
//! 2. **Narrow-phase**: [`Aabb::overlaps`], the separating-axis test.
//!
//! Entries are keyed by any `Copy` handle; the game uses entity ids.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod aabb;
pub mod quadtree;

pub use aabb::Aabb;
pub use quadtree::{brute_force_pairs, NodeView, QuadTree, QuadTreePolicy, QuadTreeStats};
