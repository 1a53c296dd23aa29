//! Collision detection for axis-aligned boxes
//!
//! Every arcade entity is a box anchored at its top-left corner. Overlap
//! tests are strict: boxes that only share an edge do not collide.

use glam::Vec2;

use crate::clamp_axis;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Top-left corner
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn square(min: Vec2, side: f32) -> Self {
        Self::new(min, Vec2::splat(side))
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap on both axes
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x < b_max.x && a_max.x > other.min.x && self.min.y < b_max.y && a_max.y > other.min.y
    }

    /// Point strictly inside the box
    pub fn contains_point(&self, point: Vec2) -> bool {
        let max = self.max();
        point.x > self.min.x && point.x < max.x && point.y > self.min.y && point.y < max.y
    }
}

/// Clamp a top-left position so a body of `size` stays inside `field`
pub fn clamp_to_field(pos: Vec2, size: Vec2, field: Vec2) -> Vec2 {
    Vec2::new(
        clamp_axis(pos.x, field.x - size.x),
        clamp_axis(pos.y, field.y - size.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_inside_enemy_overlaps() {
        let bullet = Aabb::square(Vec2::new(100.0, 100.0), 4.0);
        let enemy = Aabb::square(Vec2::new(98.0, 98.0), 30.0);
        assert!(bullet.overlaps(&enemy));
        assert!(enemy.overlaps(&bullet));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::square(Vec2::ZERO, 10.0);
        let b = Aabb::square(Vec2::new(10.0, 0.0), 10.0);
        assert!(!a.overlaps(&b));

        let c = Aabb::square(Vec2::new(9.5, 9.5), 10.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn test_contains_point() {
        let bubble = Aabb::square(Vec2::new(50.0, 50.0), 40.0);
        assert!(bubble.contains_point(Vec2::new(70.0, 70.0)));
        assert!(!bubble.contains_point(Vec2::new(50.0, 70.0)));
        assert!(!bubble.contains_point(Vec2::new(91.0, 70.0)));
    }

    #[test]
    fn test_clamp_to_field() {
        let field = Vec2::new(800.0, 600.0);
        let size = Vec2::splat(40.0);
        assert_eq!(clamp_to_field(Vec2::new(-5.0, 10.0), size, field), Vec2::new(0.0, 10.0));
        assert_eq!(
            clamp_to_field(Vec2::new(790.0, 700.0), size, field),
            Vec2::new(760.0, 560.0)
        );
    }
}
