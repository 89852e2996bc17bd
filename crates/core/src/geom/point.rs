//! Point and rectangle primitives used throughout the perimeter engine
//!
//! Geometry is carried in `f64` internal coordinates (false-origin, false-scaled
//! from UTM) rather than the `f32` used by the scalar physical quantities in
//! [`crate::units`]. Accumulated perimeter growth over hundreds of time steps
//! compounds `f32` rounding into visible jaggedness; `f64` keeps the drift below
//! the engine's own fudge tolerance (see [`crate::geom::polyset`]).

use nalgebra::{Vector2, Vector3};

/// A point in the scenario's internal (false-origin, false-scale) XY plane.
pub type XyPoint = Vector2<f64>;

/// A point with an elevation component, used by the 3-D Richards growth model.
pub type XyzPoint = Vector3<f64>;

/// An axis-aligned bounding box in internal coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: XyPoint,
    pub max: XyPoint,
}

impl Rect {
    #[inline]
    pub fn new(min: XyPoint, max: XyPoint) -> Self {
        Rect { min, max }
    }

    /// A degenerate rectangle at a single point, suitable as a fold seed.
    #[inline]
    pub fn from_point(p: XyPoint) -> Self {
        Rect { min: p, max: p }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> XyPoint {
        (self.min + self.max) * 0.5
    }

    /// Expand in place so this box covers `p` as well.
    pub fn expand_to_include(&mut self, p: XyPoint) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Union of two boxes.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        let mut r = *self;
        r.expand_to_include(other.min);
        r.expand_to_include(other.max);
        r
    }

    #[inline]
    pub fn contains(&self, p: XyPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// Grow (or shrink, with a negative margin) uniformly on all sides.
    #[must_use]
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect {
            min: XyPoint::new(self.min.x - margin, self.min.y - margin),
            max: XyPoint::new(self.max.x + margin, self.max.y + margin),
        }
    }
}

/// Euclidean distance between two internal-coordinate points.
#[inline]
pub fn distance(a: XyPoint, b: XyPoint) -> f64 {
    (a - b).norm()
}

/// Squared distance, avoiding the `sqrt` when only relative comparisons matter.
#[inline]
pub fn distance_sq(a: XyPoint, b: XyPoint) -> f64 {
    (a - b).norm_squared()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_expand_to_include_grows_bounds() {
        let mut r = Rect::from_point(XyPoint::new(0.0, 0.0));
        r.expand_to_include(XyPoint::new(5.0, -3.0));
        assert_eq!(r.min, XyPoint::new(0.0, -3.0));
        assert_eq!(r.max, XyPoint::new(5.0, 0.0));
    }

    #[test]
    fn rect_intersects_detects_overlap() {
        let a = Rect::new(XyPoint::new(0.0, 0.0), XyPoint::new(10.0, 10.0));
        let b = Rect::new(XyPoint::new(5.0, 5.0), XyPoint::new(15.0, 15.0));
        let c = Rect::new(XyPoint::new(20.0, 20.0), XyPoint::new(30.0, 30.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn distance_matches_pythagoras() {
        let a = XyPoint::new(0.0, 0.0);
        let b = XyPoint::new(3.0, 4.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-9);
    }
}
