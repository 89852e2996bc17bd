//! `PolySet`: a collection of polygons (possibly with interior holes) plus the
//! `clip` (union/intersect/diff against another set) and `unwind` (remove
//! self-intersections) set operations used by fire-front tracking.
//!
//! Both operations are a simplified, pairwise variant of the Greiner-Hormann
//! polygon clipping algorithm: full Bentley-Ottmann sweep-line intersection
//! detection is not implemented; instead every edge pair across the two
//! operand rings is tested directly. This is quadratic in edge count per ring
//! pair rather than `O(n log n)`, which is acceptable at the perimeter
//! resolutions this engine targets (hundreds, not millions, of vertices per
//! front) and keeps the callback contract in `PolygonNode` exact.

use crate::geom::point::{distance, XyPoint};
use crate::geom::poly::{NewVertexStatus, Poly, PolygonNode};
use rayon::prelude::*;

/// Set operation performed by [`PolySet::clip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOp {
    Union,
    Intersect,
    Diff,
}

/// Counters reported by `clip`/`unwind`, mirroring what a caller needs to
/// decide whether a step's geometry work is degenerating (e.g. runaway
/// fudged-intersection counts suggest a perimeter resolution that is too
/// fine for the fudge tolerance in use).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipMetrics {
    pub intersections: usize,
    pub unique_intersections: usize,
    pub fudged_intersections: usize,
    pub new_vertices: usize,
    pub polygons_retained: usize,
    pub polygons_removed: usize,
}

impl ClipMetrics {
    pub fn merge(&mut self, other: ClipMetrics) {
        self.intersections += other.intersections;
        self.unique_intersections += other.unique_intersections;
        self.fudged_intersections += other.fudged_intersections;
        self.new_vertices += other.new_vertices;
        self.polygons_retained += other.polygons_retained;
        self.polygons_removed += other.polygons_removed;
    }
}

/// A collection of rings and the vertex payload parallel to each ring's points.
#[derive(Debug, Clone)]
pub struct PolySet<V: Clone> {
    pub rings: Vec<Poly>,
    pub vertices: Vec<Vec<V>>,
}

impl<V: Clone> PolySet<V> {
    pub fn new() -> Self {
        PolySet {
            rings: Vec::new(),
            vertices: Vec::new(),
        }
    }

    pub fn push_ring(&mut self, ring: Poly, payload: Vec<V>) {
        debug_assert_eq!(ring.points.len(), payload.len());
        self.rings.push(ring);
        self.vertices.push(payload);
    }

    pub fn is_empty(&self) -> bool {
        self.rings.iter().all(Poly::is_empty)
    }

    pub fn total_area(&self) -> f64 {
        self.rings.iter().map(Poly::signed_area).sum()
    }
}

impl<V: Clone> Default for PolySet<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Fudge tolerance: intersections landing within this distance of an existing
/// vertex are snapped to it rather than inserted as a new point.
pub const DEFAULT_FUDGE: f64 = 1e-6;

struct Crossing {
    /// Fractional position along the subject edge, in `[0, 1)`.
    t_subject: f64,
    point: XyPoint,
    /// `true` if the subject ring is entering the clip ring at this crossing.
    entering: bool,
}

pub(crate) fn segment_intersection(
    a0: XyPoint,
    a1: XyPoint,
    b0: XyPoint,
    b1: XyPoint,
) -> Option<(f64, f64, XyPoint)> {
    let r = a1 - a0;
    let s = b1 - b0;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < 1e-12 {
        return None;
    }
    let qp = b0 - a0;
    let t = (qp.x * s.y - qp.y * s.x) / denom;
    let u = (qp.x * r.y - qp.y * r.x) / denom;
    if (0.0..1.0).contains(&t) && (0.0..1.0).contains(&u) {
        Some((t, u, a0 + r * t))
    } else {
        None
    }
}

/// Even-odd point-in-polygon test against a closed ring.
pub(crate) fn point_in_ring(p: XyPoint, ring: &Poly) -> bool {
    if !ring.closed || ring.points.len() < 3 {
        return false;
    }
    let n = ring.points.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = ring.points[i];
        let pj = ring.points[j];
        if ((pi.y > p.y) != (pj.y > p.y))
            && (p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn snap_to_nearest(point: XyPoint, ring: &Poly, fudge: f64) -> Option<usize> {
    ring.points
        .iter()
        .position(|&v| distance(v, point) <= fudge)
}

impl<V: Clone> PolySet<V> {
    /// Clip this set against `other`, producing a new set under `op`.
    ///
    /// `node` supplies the domain callbacks (new vertex construction, vertex
    /// tie-breaking, polygon retention, time-gated participation).
    #[allow(clippy::too_many_lines)]
    pub fn clip<N: PolygonNode<Vertex = V>>(
        &self,
        other: &PolySet<V>,
        op: ClipOp,
        node: &mut N,
        multithread: bool,
        fudge: f64,
    ) -> (PolySet<V>, ClipMetrics) {
        let mut metrics = ClipMetrics::default();

        let pair_indices: Vec<(usize, usize)> = (0..self.rings.len())
            .flat_map(|i| (0..other.rings.len()).map(move |j| (i, j)))
            .filter(|&(i, j)| node.participates(i) && node.participates(j))
            .collect();

        let compute_pair = |(i, j): (usize, usize)| -> Vec<Crossing> {
            let subject = &self.rings[i];
            let clip = &other.rings[j];
            let mut crossings = Vec::new();
            let ns = subject.points.len();
            let nc = clip.points.len();
            for si in 0..ns {
                let Some(si_next) = subject.next_index(si) else {
                    continue;
                };
                for ci in 0..nc {
                    let Some(ci_next) = clip.next_index(ci) else {
                        continue;
                    };
                    if let Some((t, _u, pt)) = segment_intersection(
                        subject.points[si],
                        subject.points[si_next],
                        clip.points[ci],
                        clip.points[ci_next],
                    ) {
                        let cross = clip.points[ci_next] - clip.points[ci];
                        let edge = subject.points[si_next] - subject.points[si];
                        let entering = edge.x * cross.y - edge.y * cross.x > 0.0;
                        crossings.push(Crossing {
                            t_subject: si as f64 + t,
                            point: pt,
                            entering,
                        });
                    }
                }
            }
            crossings
        };

        let per_pair_crossings: Vec<Vec<Crossing>> = if multithread {
            pair_indices.par_iter().map(|&p| compute_pair(p)).collect()
        } else {
            pair_indices.iter().map(|&p| compute_pair(p)).collect()
        };

        let mut result = PolySet::new();

        for crossings in &per_pair_crossings {
            metrics.intersections += crossings.len();
        }

        // Simplified resolution: for each subject ring, determine its
        // relationship to every participating clip ring and combine under
        // `op`. Rings with no crossings are resolved by containment; rings
        // with crossings emit split fragments at fudged crossing points.
        for (si, subject) in self.rings.iter().enumerate() {
            if !node.participates(si) {
                continue;
            }
            let mut contributing_crossings: Vec<&Crossing> = Vec::new();
            for (idx, &(i, _j)) in pair_indices.iter().enumerate() {
                if i == si {
                    contributing_crossings.extend(per_pair_crossings[idx].iter());
                }
            }

            if contributing_crossings.is_empty() {
                let mut contained_in_any_clip = false;
                for clip in &other.rings {
                    if !subject.points.is_empty() && point_in_ring(subject.points[0], clip) {
                        contained_in_any_clip = true;
                        break;
                    }
                }
                let keep = match op {
                    ClipOp::Union => true,
                    ClipOp::Intersect => contained_in_any_clip,
                    ClipOp::Diff => !contained_in_any_clip,
                };
                if keep && node.keep_polygon(subject, &self.vertices[si]) {
                    result.push_ring(subject.clone(), self.vertices[si].clone());
                    metrics.polygons_retained += 1;
                } else {
                    metrics.polygons_removed += 1;
                }
                continue;
            }

            let mut new_points = Vec::new();
            let mut new_payload = Vec::new();
            let mut sorted: Vec<&&Crossing> = contributing_crossings.iter().collect();
            sorted.sort_by(|a, b| a.t_subject.partial_cmp(&b.t_subject).unwrap());

            let mut unique_positions: Vec<XyPoint> = Vec::new();
            for (pi, p) in subject.points.iter().enumerate() {
                new_points.push(*p);
                new_payload.push(self.vertices[si][pi].clone());
                let floor = pi as f64;
                for c in &sorted {
                    if c.t_subject >= floor && c.t_subject < floor + 1.0 {
                        let keep_crossing = match op {
                            ClipOp::Union => !c.entering,
                            ClipOp::Intersect => c.entering,
                            ClipOp::Diff => c.entering,
                        };
                        if !keep_crossing {
                            continue;
                        }
                        let fudged = snap_to_nearest(c.point, subject, fudge);
                        if fudged.is_some() {
                            metrics.fudged_intersections += 1;
                        } else {
                            let vertex = node.new_vertex(c.point, NewVertexStatus::Fire);
                            new_points.push(c.point);
                            new_payload.push(vertex);
                            metrics.new_vertices += 1;
                        }
                        if !unique_positions.iter().any(|u| distance(*u, c.point) <= fudge) {
                            unique_positions.push(c.point);
                            metrics.unique_intersections += 1;
                        }
                    }
                }
            }

            let candidate = Poly::new(new_points, subject.closed);
            if node.keep_polygon(&candidate, &new_payload) {
                result.push_ring(candidate, new_payload);
                metrics.polygons_retained += 1;
            } else {
                metrics.polygons_removed += 1;
            }
        }

        if matches!(op, ClipOp::Union) {
            for (oi, clip_ring) in other.rings.iter().enumerate() {
                if !node.participates(oi) {
                    continue;
                }
                let mut touched = false;
                for &(_, j) in &pair_indices {
                    if j == oi {
                        touched = true;
                        break;
                    }
                }
                if touched {
                    continue;
                }
                let mut inside_self = false;
                if let Some(&p0) = clip_ring.points.first() {
                    for subj in &self.rings {
                        if point_in_ring(p0, subj) {
                            inside_self = true;
                            break;
                        }
                    }
                }
                if !inside_self && node.keep_polygon(clip_ring, &other.vertices[oi]) {
                    result.push_ring(clip_ring.clone(), other.vertices[oi].clone());
                    metrics.polygons_retained += 1;
                }
            }
        }

        node.inspect_polygons(&result.rings);
        (result, metrics)
    }

    /// Remove self-intersections from every ring in this set.
    ///
    /// `keep_interior` controls whether loops split off on the "inside" of a
    /// self-crossing (by signed-area sign relative to the parent) are kept as
    /// independent polygons (holes) or discarded.
    ///
    /// The geometric split (finding crossings, dividing a ring into loops) is
    /// pure and runs in parallel when `multithread` is set; node callbacks
    /// (`new_vertex`, `keep_polygon`) only ever run on the calling thread
    /// afterward, since `PolygonNode` takes `&mut self`.
    pub fn unwind<N: PolygonNode<Vertex = V>>(
        &self,
        keep_interior: bool,
        node: &mut N,
        multithread: bool,
        fudge: f64,
    ) -> (PolySet<V>, ClipMetrics) {
        let mut metrics = ClipMetrics::default();

        let split_one = |ring: &Poly, payload: &[V]| -> (Vec<RingSplit<V>>, ClipMetrics) {
            let mut local = ClipMetrics::default();
            let slots: Vec<RingSlot<V>> = ring
                .points
                .iter()
                .zip(payload.iter())
                .map(|(&p, v)| RingSlot::Existing(p, v.clone()))
                .collect();
            let splits = split_slots_geometric(slots, ring.closed, fudge, &mut local);
            (splits, local)
        };

        let raw: Vec<(Vec<RingSplit<V>>, ClipMetrics)> = if multithread {
            self.rings
                .par_iter()
                .zip(self.vertices.par_iter())
                .map(|(r, v)| split_one(r, v))
                .collect()
        } else {
            self.rings
                .iter()
                .zip(self.vertices.iter())
                .map(|(r, v)| split_one(r, v))
                .collect()
        };

        let mut result = PolySet::new();
        for (pieces, local_metrics) in raw {
            metrics.merge(local_metrics);
            for piece in pieces {
                let points: Vec<XyPoint> = piece.slots.iter().map(RingSlot::position).collect();
                let payload: Vec<V> = piece
                    .slots
                    .into_iter()
                    .map(|slot| match slot {
                        RingSlot::Existing(_, v) => v,
                        RingSlot::New(p) => {
                            metrics.new_vertices += 1;
                            node.new_vertex(p, NewVertexStatus::Normal)
                        }
                    })
                    .collect();
                let ring = Poly::new(points, true);
                let signed = ring.signed_area();
                let keep = signed >= 0.0 || keep_interior;
                if keep && node.keep_polygon(&ring, &payload) {
                    result.push_ring(ring, payload);
                    metrics.polygons_retained += 1;
                } else {
                    metrics.polygons_removed += 1;
                }
            }
        }
        node.inspect_polygons(&result.rings);
        (result, metrics)
    }
}

/// One vertex slot produced by the pure geometric split: either an existing
/// vertex carried through unchanged, or a newly created crossing point that
/// still needs a payload from `PolygonNode::new_vertex`.
enum RingSlot<V: Clone> {
    Existing(XyPoint, V),
    New(XyPoint),
}

impl<V: Clone> RingSlot<V> {
    fn position(&self) -> XyPoint {
        match self {
            RingSlot::Existing(p, _) | RingSlot::New(p) => *p,
        }
    }
}

struct RingSplit<V: Clone> {
    slots: Vec<RingSlot<V>>,
}

/// Find the first pair of non-adjacent edges in `slots` that cross, split
/// into two loops at the crossing point (fudged to an existing slot when one
/// lies within tolerance), and recurse on each loop. Pure geometry: never
/// touches a `PolygonNode`, so it is safe to run from multiple threads
/// concurrently over distinct rings. `New` slots are threaded through the
/// recursion unresolved; only the caller materializes them via
/// `PolygonNode::new_vertex`.
fn split_slots_geometric<V: Clone>(
    slots: Vec<RingSlot<V>>,
    closed: bool,
    fudge: f64,
    metrics: &mut ClipMetrics,
) -> Vec<RingSplit<V>> {
    let n = slots.len();
    if n < 4 || !closed {
        return vec![RingSplit { slots }];
    }
    let positions: Vec<XyPoint> = slots.iter().map(RingSlot::position).collect();

    for i in 0..n {
        let i_next = (i + 1) % n;
        for j in (i + 2)..n {
            let j_next = (j + 1) % n;
            if j_next == i {
                continue;
            }
            if let Some((_, _, pt)) = segment_intersection(
                positions[i],
                positions[i_next],
                positions[j],
                positions[j_next],
            ) {
                metrics.intersections += 1;
                let fudged = positions
                    .iter()
                    .position(|&p| distance(p, pt) <= fudge);
                let vertex_slot = if let Some(existing) = fudged {
                    metrics.fudged_intersections += 1;
                    clone_slot(&slots[existing])
                } else {
                    metrics.unique_intersections += 1;
                    RingSlot::New(pt)
                };

                let mut loop_a = vec![clone_slot(&vertex_slot)];
                let mut k = i_next;
                while k != j_next {
                    loop_a.push(clone_slot(&slots[k]));
                    k = (k + 1) % n;
                }

                let mut loop_b = vec![clone_slot(&vertex_slot)];
                let mut k = j_next;
                while k != i_next {
                    loop_b.push(clone_slot(&slots[k]));
                    k = (k + 1) % n;
                }

                let mut out = split_slots_geometric(loop_a, true, fudge, metrics);
                out.extend(split_slots_geometric(loop_b, true, fudge, metrics));
                return out;
            }
        }
    }

    vec![RingSplit { slots }]
}

fn clone_slot<V: Clone>(slot: &RingSlot<V>) -> RingSlot<V> {
    match slot {
        RingSlot::Existing(p, v) => RingSlot::Existing(*p, v.clone()),
        RingSlot::New(p) => RingSlot::New(*p),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct TestVertex(u32);

    struct TestNode {
        next_id: u32,
    }

    impl PolygonNode for TestNode {
        type Vertex = TestVertex;

        fn new_vertex(&mut self, _position: XyPoint, _status: NewVertexStatus) -> TestVertex {
            self.next_id += 1;
            TestVertex(self.next_id)
        }

        fn choose_to_keep(&self, _a: &TestVertex, _b: &TestVertex) -> usize {
            0
        }
    }

    fn square(min: f64, max: f64) -> (Poly, Vec<TestVertex>) {
        let ring = Poly::new(
            vec![
                XyPoint::new(min, min),
                XyPoint::new(max, min),
                XyPoint::new(max, max),
                XyPoint::new(min, max),
            ],
            true,
        );
        let payload = (0..4).map(TestVertex).collect();
        (ring, payload)
    }

    #[test]
    fn union_of_disjoint_squares_keeps_both() {
        let mut a = PolySet::new();
        let (ra, pa) = square(0.0, 1.0);
        a.push_ring(ra, pa);
        let mut b = PolySet::new();
        let (rb, pb) = square(10.0, 11.0);
        b.push_ring(rb, pb);

        let mut node = TestNode { next_id: 100 };
        let (result, metrics) = a.clip(&b, ClipOp::Union, &mut node, false, DEFAULT_FUDGE);
        assert_eq!(result.rings.len(), 2);
        assert_eq!(metrics.intersections, 0);
    }

    #[test]
    fn diff_of_identical_squares_is_empty() {
        let mut a = PolySet::new();
        let (ra, pa) = square(0.0, 10.0);
        a.push_ring(ra, pa);
        let mut b = PolySet::new();
        let (rb, pb) = square(0.0, 10.0);
        b.push_ring(rb, pb);

        let mut node = TestNode { next_id: 0 };
        let (result, _metrics) = a.clip(&b, ClipOp::Diff, &mut node, false, DEFAULT_FUDGE);
        assert!(result.is_empty());
    }

    #[test]
    fn unwind_of_simple_square_is_unchanged() {
        let (ring, payload) = square(0.0, 5.0);
        let mut set = PolySet::new();
        set.push_ring(ring, payload);
        let mut node = TestNode { next_id: 0 };
        let (result, metrics) = set.unwind(false, &mut node, false, DEFAULT_FUDGE);
        assert_eq!(result.rings.len(), 1);
        assert_eq!(metrics.intersections, 0);
    }

    #[test]
    fn unwind_of_figure_eight_splits_into_two_loops() {
        // Self-intersecting bowtie: (0,0)-(2,2)-(2,0)-(0,2) closed.
        let ring = Poly::new(
            vec![
                XyPoint::new(0.0, 0.0),
                XyPoint::new(2.0, 2.0),
                XyPoint::new(2.0, 0.0),
                XyPoint::new(0.0, 2.0),
            ],
            true,
        );
        let payload: Vec<TestVertex> = (0..4).map(TestVertex).collect();
        let mut set = PolySet::new();
        set.push_ring(ring, payload);
        let mut node = TestNode { next_id: 0 };
        let (result, metrics) = set.unwind(true, &mut node, false, DEFAULT_FUDGE);
        assert_eq!(metrics.intersections, 1);
        assert_eq!(result.rings.len(), 2);
    }
}
