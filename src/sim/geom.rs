//! Axis-aligned rectangles in pixel space
//!
//! Everything in the level is a box: tiles, half-height spikes and springs,
//! and the player. Overlap is strict, so boxes that merely share an edge do
//! not collide (a player standing on a block touches it but does not overlap).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with a top-left origin (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Strict overlap test; touching edges do not count
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Same rectangle moved by `offset`
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            pos: self.pos + offset,
            size: self.size,
        }
    }

    /// Flat `[x, y, w, h]` layout used by render instances
    pub fn to_array(&self) -> [f32; 4] {
        [self.pos.x, self.pos.y, self.size.x, self.size.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        let r = Rect::new(16.0, 32.0, 16.0, 8.0);
        assert_eq!(r.left(), 16.0);
        assert_eq!(r.right(), 32.0);
        assert_eq!(r.top(), 32.0);
        assert_eq!(r.bottom(), 40.0);
        assert_eq!(r.center(), Vec2::new(24.0, 36.0));
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let touching = Rect::new(16.0, 0.0, 16.0, 16.0);
        let below = Rect::new(0.0, 16.0, 16.0, 16.0);
        let inside = Rect::new(15.0, 15.0, 16.0, 16.0);

        assert!(!a.overlaps(&touching));
        assert!(!a.overlaps(&below));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_translated_keeps_size() {
        let r = Rect::new(0.0, 0.0, 8.0, 16.0).translated(Vec2::new(8.0, 0.0));
        assert_eq!(r, Rect::new(8.0, 0.0, 8.0, 16.0));
    }
}
