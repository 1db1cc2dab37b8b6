//! Axis-aligned bounding-box collision
//!
//! Both entities are squares, so a half-open interval test on each axis is
//! all the collision detection the game needs.

use glam::Vec2;

/// Axis-aligned rectangle, `min` inclusive, `max` exclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Square with top-left corner `pos` and edge `size`
    pub fn from_square(pos: Vec2, size: f32) -> Self {
        Self {
            min: pos,
            max: pos + Vec2::splat(size),
        }
    }

    /// Half-open overlap on both axes; rectangles that only touch edges don't overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// Direction pointing from `from` to `to`, or `None` when they coincide
#[inline]
pub fn separation_dir(from: Vec2, to: Vec2) -> Option<Vec2> {
    (to - from).try_normalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_contained_square() {
        let player = Aabb::from_square(Vec2::new(10.0, 10.0), 32.0);
        let target = Aabb::from_square(Vec2::new(20.0, 20.0), 16.0);
        assert_eq!(player.max, Vec2::new(42.0, 42.0));
        assert_eq!(target.max, Vec2::new(36.0, 36.0));
        assert!(player.overlaps(&target));
        assert!(target.overlaps(&player));
    }

    #[test]
    fn test_far_apart_do_not_overlap() {
        let player = Aabb::from_square(Vec2::new(10.0, 10.0), 32.0);
        let target = Aabb::from_square(Vec2::new(100.0, 100.0), 16.0);
        assert!(!player.overlaps(&target));
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::from_square(Vec2::new(0.0, 0.0), 10.0);
        let right = Aabb::from_square(Vec2::new(10.0, 0.0), 10.0);
        let below = Aabb::from_square(Vec2::new(0.0, 10.0), 10.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));

        let nudged = Aabb::from_square(Vec2::new(9.5, 9.5), 10.0);
        assert!(a.overlaps(&nudged));
    }

    #[test]
    fn test_overlap_needs_both_axes() {
        let a = Aabb::from_square(Vec2::new(0.0, 0.0), 10.0);
        let same_row = Aabb::from_square(Vec2::new(5.0, 50.0), 10.0);
        assert!(!a.overlaps(&same_row));
    }

    #[test]
    fn test_separation_dir() {
        let dir = separation_dir(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)).unwrap();
        assert!((dir - Vec2::new(0.6, 0.8)).length() < 1e-6);
        assert!(separation_dir(Vec2::ONE, Vec2::ONE).is_none());
    }
}
