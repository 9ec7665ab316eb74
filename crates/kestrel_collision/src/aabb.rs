//! Axis-aligned bounding boxes.
//!
//! The overlap test is the closed-interval separating-axis test: boxes that
//! only touch along an edge or corner overlap. Comparisons are exact.

use bytemuck::{Pod, Zeroable};
use kestrel_shared::{FieldConfig, Vec2};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box for collision detection.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner (left, top).
    pub min: Vec2,
    /// Maximum corner (right, bottom).
    pub max: Vec2,
}

impl Aabb {
    /// Creates a box from its corners.
    #[inline]
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a box from its min corner and size.
    #[inline]
    #[must_use]
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Box covering a configured play field.
    #[must_use]
    pub fn from_field(field: &FieldConfig) -> Self {
        Self::from_xywh(field.x, field.y, field.width, field.height)
    }

    /// Width
    #[inline]
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height
    #[inline]
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center point
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// True for boxes with no area or non-finite corners.
    ///
    /// Degenerate boxes never take part in collision.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let finite = self.min.x.is_finite()
            && self.min.y.is_finite()
            && self.max.x.is_finite()
            && self.max.y.is_finite();
        !finite || self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Checks if this box overlaps another, edges included.
    #[inline]
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y)
    }

    /// Checks if a point lies inside or on the edge.
    #[inline]
    #[must_use]
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Moves the min corner to `(x, y)` keeping width and height.
    pub fn set_position(&mut self, x: f32, y: f32) {
        let (width, height) = (self.width(), self.height());
        self.min = Vec2::new(x, y);
        self.max = Vec2::new(x + width, y + height);
    }

    /// Smallest box enclosing both.
    #[must_use]
    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// The four equal quadrants, in order: top-left, top-right,
    /// bottom-left, bottom-right.
    ///
    /// Adjacent quadrants share their boundary, so together they cover the
    /// box exactly.
    #[must_use]
    pub fn quadrants(&self) -> [Aabb; 4] {
        let mid = self.center();
        [
            Self::new(self.min, mid),
            Self::new(Vec2::new(mid.x, self.min.y), Vec2::new(self.max.x, mid.y)),
            Self::new(Vec2::new(self.min.x, mid.y), Vec2::new(mid.x, self.max.y)),
            Self::new(mid, self.max),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_examples() {
        let a = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::from_xywh(5.0, 5.0, 10.0, 10.0);
        let c = Aabb::from_xywh(20.0, 20.0, 10.0, 10.0);

        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let boxes = [
            Aabb::from_xywh(0.0, 0.0, 10.0, 10.0),
            Aabb::from_xywh(10.0, 0.0, 5.0, 5.0),
            Aabb::from_xywh(-3.0, 4.0, 2.0, 2.0),
            Aabb::from_xywh(2.0, 2.0, 1.0, 1.0),
        ];
        for a in &boxes {
            for b in &boxes {
                assert_eq!(a.overlaps(b), b.overlaps(a));
            }
        }
    }

    #[test]
    fn test_touching_edges_overlap() {
        let a = Aabb::from_xywh(0.0, 0.0, 10.0, 10.0);
        let right = Aabb::from_xywh(10.0, 0.0, 10.0, 10.0);
        let corner = Aabb::from_xywh(10.0, 10.0, 1.0, 1.0);
        let gap = Aabb::from_xywh(10.5, 0.0, 1.0, 1.0);

        assert!(a.overlaps(&right));
        assert!(a.overlaps(&corner));
        assert!(!a.overlaps(&gap));
    }

    #[test]
    fn test_set_position_preserves_size() {
        let mut aabb = Aabb::from_xywh(1.0, 2.0, 30.0, 40.0);
        aabb.set_position(100.0, -50.0);

        assert_eq!(aabb.min, Vec2::new(100.0, -50.0));
        assert_eq!(aabb.width(), 30.0);
        assert_eq!(aabb.height(), 40.0);
    }

    #[test]
    fn test_degenerate() {
        assert!(Aabb::from_xywh(0.0, 0.0, 0.0, 5.0).is_degenerate());
        assert!(Aabb::from_xywh(0.0, 0.0, 5.0, -1.0).is_degenerate());
        assert!(Aabb::from_xywh(f32::NAN, 0.0, 5.0, 5.0).is_degenerate());
        assert!(!Aabb::from_xywh(0.0, 0.0, 1.0, 1.0).is_degenerate());
    }

    #[test]
    fn test_quadrants_cover_parent() {
        let parent = Aabb::from_xywh(0.0, 0.0, 800.0, 600.0);
        let quads = parent.quadrants();

        assert_eq!(quads[0], Aabb::from_xywh(0.0, 0.0, 400.0, 300.0));
        assert_eq!(quads[3], Aabb::from_xywh(400.0, 300.0, 400.0, 300.0));
        let rebuilt = quads.iter().fold(quads[0], |acc, q| acc.union(q));
        assert_eq!(rebuilt, parent);
        assert!(quads.iter().all(|q| q.contains_point(parent.center())));
    }

    #[test]
    fn test_from_field() {
        let field = FieldConfig::default();
        let aabb = Aabb::from_field(&field);
        assert_eq!(aabb.width(), field.width);
        assert_eq!(aabb.height(), field.height);
    }
}
