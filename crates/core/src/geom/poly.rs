//! `Poly`: a simple closed or open vertex chain, and the `PolygonNode` callback
//! seam that lets [`crate::geom::polyset::PolySet`] set operations stay generic
//! over what a vertex "is" (a fire-front point, an asset boundary point, ...).

use crate::geom::point::{Rect, XyPoint};

/// Status stamped on a vertex created during a clip or unwind pass.
///
/// Named after the phase that introduced the vertex, mirroring the three ways
/// a new point can enter a front: crossing another fire's polygon, crossing a
/// vector break, or simple mid-edge densification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewVertexStatus {
    Fire,
    Vector,
    Normal,
}

/// A single ring of vertices: a closed polygon, or an open polyline.
///
/// Vertices are stored in perimeter order. Closure is implicit: a `Poly`
/// marked `closed` treats its last point as adjacent to its first.
#[derive(Debug, Clone)]
pub struct Poly {
    pub points: Vec<XyPoint>,
    pub closed: bool,
}

impl Poly {
    #[inline]
    pub fn new(points: Vec<XyPoint>, closed: bool) -> Self {
        Poly { points, closed }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the vertex following `i`, wrapping for closed rings.
    pub fn next_index(&self, i: usize) -> Option<usize> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        if i + 1 < n {
            Some(i + 1)
        } else if self.closed {
            Some(0)
        } else {
            None
        }
    }

    /// Index of the vertex preceding `i`, wrapping for closed rings.
    pub fn prev_index(&self, i: usize) -> Option<usize> {
        let n = self.points.len();
        if n == 0 {
            return None;
        }
        if i > 0 {
            Some(i - 1)
        } else if self.closed {
            Some(n - 1)
        } else {
            None
        }
    }

    /// Signed area via the shoelace formula; positive for counter-clockwise rings.
    pub fn signed_area(&self) -> f64 {
        if !self.closed || self.points.len() < 3 {
            return 0.0;
        }
        let n = self.points.len();
        let mut acc = 0.0;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        acc * 0.5
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn bounds(&self) -> Option<Rect> {
        let mut iter = self.points.iter();
        let first = *iter.next()?;
        let mut r = Rect::from_point(first);
        for &p in iter {
            r.expand_to_include(p);
        }
        Some(r)
    }

    /// Perimeter length, closing the last segment when the ring is closed.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for i in 0..n {
            if let Some(j) = self.next_index(i) {
                total += crate::geom::point::distance(self.points[i], self.points[j]);
            }
        }
        total
    }
}

/// The set-operation callback seam.
///
/// [`crate::geom::polyset::PolySet::clip`] and
/// [`crate::geom::polyset::PolySet::unwind`] are generic sweep algorithms that
/// know nothing about fire fronts, assets, or vector breaks. A `PolygonNode`
/// implementation supplies the domain meaning: what a freshly created vertex
/// carries, which of two near-coincident vertices survives, whether a
/// resulting polygon is worth keeping, and whether a candidate polygon
/// participates in the operation at all (used to gate static, time-scheduled
/// vector breaks).
pub trait PolygonNode {
    /// Vertex payload type threaded through the set operation (e.g. `FirePoint`).
    type Vertex: Clone;

    /// Construct a vertex created at `position` by the sweep, with the given status.
    fn new_vertex(&mut self, position: XyPoint, status: NewVertexStatus) -> Self::Vertex;

    /// When two vertices land within the fudge tolerance of one another,
    /// choose which one's payload should represent the merged point.
    fn choose_to_keep(&self, a: &Self::Vertex, b: &Self::Vertex) -> usize;

    /// Whether `polygon_index` of this node's polygon set should be considered
    /// by the sweep at all (time-gated static breaks answer `false` until
    /// their `used_time` has passed).
    fn participates(&self, polygon_index: usize) -> bool {
        let _ = polygon_index;
        true
    }

    /// Whether a polygon produced by the operation should be retained in the
    /// result (e.g. fires below `min_fire_area` are dropped unless a vertex
    /// recorded a successful breach, visible here via `vertices`).
    fn keep_polygon(&self, poly: &Poly, vertices: &[Self::Vertex]) -> bool {
        let _ = vertices;
        !poly.is_empty()
    }

    /// Optional post-pass hook invoked once per retained polygon, for callers
    /// that want to record per-polygon metrics without a second traversal.
    fn inspect_polygons(&mut self, _polygons: &[Poly]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_area_is_positive_ccw() {
        let poly = Poly::new(
            vec![
                XyPoint::new(0.0, 0.0),
                XyPoint::new(10.0, 0.0),
                XyPoint::new(10.0, 10.0),
                XyPoint::new(0.0, 10.0),
            ],
            true,
        );
        assert!((poly.signed_area() - 100.0).abs() < 1e-9);
        assert!((poly.area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn open_polyline_has_no_area() {
        let poly = Poly::new(
            vec![XyPoint::new(0.0, 0.0), XyPoint::new(10.0, 0.0)],
            false,
        );
        assert_eq!(poly.area(), 0.0);
    }

    #[test]
    fn next_index_wraps_for_closed_ring() {
        let poly = Poly::new(
            vec![
                XyPoint::new(0.0, 0.0),
                XyPoint::new(1.0, 0.0),
                XyPoint::new(1.0, 1.0),
            ],
            true,
        );
        assert_eq!(poly.next_index(2), Some(0));
        assert_eq!(poly.prev_index(0), Some(2));
    }

    #[test]
    fn next_index_terminates_for_open_polyline() {
        let poly = Poly::new(vec![XyPoint::new(0.0, 0.0), XyPoint::new(1.0, 0.0)], false);
        assert_eq!(poly.next_index(1), None);
    }

    #[test]
    fn perimeter_sums_closed_edges() {
        let poly = Poly::new(
            vec![
                XyPoint::new(0.0, 0.0),
                XyPoint::new(3.0, 0.0),
                XyPoint::new(3.0, 4.0),
            ],
            true,
        );
        assert!((poly.perimeter() - (3.0 + 5.0 + 4.0)).abs() < 1e-9);
    }
}
