//! `FireFront`: one closed perimeter ring and the per-step algorithms that
//! operate on it before and after growth (§4.3) — densification, sparsification,
//! grid/vector tracking, and the final position advance.

use crate::fire_point::{FirePoint, PointStatus};
use crate::geom::point::{distance, XyPoint};
use crate::geom::polyset::segment_intersection;
use crate::geom::poly::{NewVertexStatus, Poly, PolygonNode};
use crate::grid_cache::GridCache;
use crate::units::{Fraction, Meters, Seconds};

/// One perimeter: a ring of [`FirePoint`]s, in traversal order.
#[derive(Debug, Clone)]
pub struct FireFront {
    pub points: Vec<FirePoint>,
    pub closed: bool,
}

impl FireFront {
    pub fn new(points: Vec<FirePoint>, closed: bool) -> Self {
        FireFront { points, closed }
    }

    pub fn polygon(&self) -> Poly {
        Poly::new(self.points.iter().map(|p| p.position).collect(), self.closed)
    }

    fn next_idx(&self, i: usize) -> usize {
        let n = self.points.len();
        if i + 1 < n {
            i + 1
        } else {
            0
        }
    }

    fn prev_idx(&self, i: usize) -> usize {
        let n = self.points.len();
        if i == 0 {
            n - 1
        } else {
            i - 1
        }
    }

    /// §4.3.1: densify edges whose length or local curvature calls for it.
    pub fn add_points(&mut self, perimeter_resolution: Meters, suppress_tight_concave: bool) {
        let n = self.points.len();
        if n < 3 || !self.closed {
            return;
        }
        let resolution = f64::from(perimeter_resolution.value());
        if resolution <= 0.0 {
            return;
        }

        let mut result = Vec::with_capacity(n * 2);
        for i in 0..n {
            let prev = &self.points[self.prev_idx(i)];
            let curr = &self.points[i];
            let succ = &self.points[self.next_idx(i)];
            result.push(curr.clone());

            let edge = succ.position - curr.position;
            let edge_length = edge.norm();
            if edge_length < 1e-9 {
                continue;
            }
            let factor = edge_length / resolution;

            let v1 = curr.position - prev.position;
            let v2 = edge;
            let mut angle = angle_between(v1, v2);
            if suppress_tight_concave {
                let deg = angle.to_degrees();
                if deg > 225.0 {
                    angle = (225.0 + (deg - 225.0) / 1.625).to_radians();
                }
            }

            if factor > 2.0 {
                let inserts = (factor.floor() as usize).saturating_sub(1);
                for k in 1..=inserts {
                    let t = k as f64 / (inserts + 1) as f64;
                    result.push(FirePoint::new(curr.position + edge * t));
                }
            } else {
                let mut remaining = edge;
                let mut remaining_factor = factor;
                let mut inserted = 0;
                while remaining_factor > 0.001 && (angle / 2.0).sin() < remaining_factor && inserted < 3 {
                    let mid = result.last().unwrap().position + remaining * 0.5;
                    result.push(FirePoint::new(mid));
                    remaining *= 0.5;
                    remaining_factor /= 2.0;
                    inserted += 1;
                }
            }
        }
        self.points = result;
    }

    /// §4.3.2: drop over-dense NORMAL vertices one at a time until no
    /// candidate remains eligible or only the triangle floor is left.
    pub fn simplify(
        &mut self,
        perimeter_resolution: Meters,
        perimeter_spacing: Meters,
        max_edge: Meters,
        prior_min_ros_ratio: Fraction,
    ) {
        if self.points.len() < 3 || !self.closed {
            return;
        }
        if prior_min_ros_ratio.value() < 0.9 {
            return;
        }
        let pr = f64::from(perimeter_resolution.value().min(max_edge.value()));
        let spacing = f64::from(perimeter_spacing.value());

        loop {
            if self.points.len() <= 3 {
                break;
            }
            let n = self.points.len();
            let mut best: Option<(usize, f64, f64)> = None;

            for i in 0..n {
                if self.points[i].status != PointStatus::Normal {
                    continue;
                }
                let prev_i = self.prev_idx(i);
                let next_i = self.next_idx(i);
                if self.points[prev_i].status != PointStatus::Normal
                    && self.points[next_i].status != PointStatus::Normal
                {
                    continue;
                }

                let prev_pos = self.points[prev_i].position;
                let curr_pos = self.points[i].position;
                let next_pos = self.points[next_i].position;

                let edge_prev = distance(curr_pos, prev_pos);
                let edge_next = distance(next_pos, curr_pos);
                let shortest_edge = edge_prev.min(edge_next);
                let eligible_by_spacing = shortest_edge < spacing;

                let angle = angle_between(curr_pos - prev_pos, next_pos - curr_pos);
                let merged_length = distance(next_pos, prev_pos);
                let factor = merged_length / pr;
                let gentle = (angle / 2.0).sin() >= factor || factor <= 0.001;

                if !(eligible_by_spacing || gentle) {
                    continue;
                }

                let sin_angle = (angle / 2.0).sin();
                let replace = match best {
                    None => true,
                    Some((_, best_edge, best_sin)) => {
                        shortest_edge < best_edge || (shortest_edge == best_edge && sin_angle > best_sin)
                    }
                };
                if replace {
                    best = Some((i, shortest_edge, sin_angle));
                }
            }

            match best {
                Some((i, _, _)) => {
                    self.points.remove(i);
                }
                None => break,
            }
        }
    }

    /// §4.3.3: walk each vertex's displacement through the fuel grid, pulling
    /// it back to the first non-fuel crossing if breaching fails.
    pub fn track_grid(
        &mut self,
        prev_positions: &[XyPoint],
        grid_cell_size: f64,
        mut is_non_fuel: impl FnMut(XyPoint) -> bool,
        breaching_enabled: bool,
    ) {
        debug_assert_eq!(prev_positions.len(), self.points.len());
        for (i, point) in self.points.iter_mut().enumerate() {
            if point.status != PointStatus::Normal {
                continue;
            }
            let prev = prev_positions[i];
            let curr = point.position;
            let path = curr - prev;
            let length = path.norm();
            if length < 1e-9 {
                continue;
            }
            let prev_cell = (
                (prev.x / grid_cell_size).floor() as i64,
                (prev.y / grid_cell_size).floor() as i64,
            );
            let curr_cell = (
                (curr.x / grid_cell_size).floor() as i64,
                (curr.y / grid_cell_size).floor() as i64,
            );
            if prev_cell == curr_cell {
                continue;
            }

            let dir = path / length;
            let allowance = 1.5 * f64::from(point.flame_length);
            let mut non_fuel_distance = 0.0_f64;
            let mut stop_at: Option<f64> = None;
            let mut breached_any = false;

            crate::geom::raytrace::ray_trace(
                prev,
                path,
                grid_cell_size,
                XyPoint::new(0.0, 0.0),
                |visit| {
                    let mid = prev + dir * ((visit.entry + visit.exit) * 0.5).min(length);
                    if is_non_fuel(mid) {
                        breached_any = true;
                        if !breaching_enabled {
                            stop_at = Some(visit.entry);
                            return false;
                        }
                        non_fuel_distance += visit.exit - visit.entry;
                        if non_fuel_distance > allowance {
                            stop_at = Some(visit.entry);
                            return false;
                        }
                    }
                    true
                },
            );

            if let Some(dist) = stop_at {
                point.position = prev + dir * dist;
                point.mark_inert(PointStatus::NoFuel);
            } else if breached_any {
                point.successful_breach = true;
            }
        }
    }

    /// §4.3.4 pass A: pull a vertex back to the nearest crossing of a larger
    /// other-fire polygon and stamp it `FIRE`.
    pub fn track_vector_other_fires(&mut self, prev_positions: &[XyPoint], other_fires: &[&Poly]) {
        debug_assert_eq!(prev_positions.len(), self.points.len());
        for (i, point) in self.points.iter_mut().enumerate() {
            if point.status != PointStatus::Normal {
                continue;
            }
            let prev = prev_positions[i];
            let curr = point.position;
            if let Some((t, pt)) = nearest_ring_set_crossing(prev, curr, other_fires) {
                let _ = t;
                point.position = pt;
                point.mark_inert(PointStatus::Fire);
            }
        }
    }

    /// §4.3.4 pass B: vector-break crossings, with breach-distance and
    /// spacing-snap behaviour matching the grid tracker.
    pub fn track_vector_breaks(
        &mut self,
        prev_positions: &[XyPoint],
        breaks: &[&Poly],
        breaching_enabled: bool,
        perimeter_spacing: Meters,
    ) {
        debug_assert_eq!(prev_positions.len(), self.points.len());
        let spacing = f64::from(perimeter_spacing.value());
        for (i, point) in self.points.iter_mut().enumerate() {
            if point.status != PointStatus::Normal {
                continue;
            }
            let prev = prev_positions[i];
            let curr = point.position;
            let segment_len = distance(curr, prev);
            if segment_len < 1e-9 {
                continue;
            }

            if let Some((t, pt)) = nearest_ring_set_crossing(prev, curr, breaks) {
                if breaching_enabled {
                    let remaining = (1.0 - t) * segment_len;
                    let allowance = 1.5 * f64::from(point.flame_length);
                    if remaining > allowance {
                        point.position = pt;
                        point.mark_inert(PointStatus::Vector);
                    } else {
                        point.successful_breach = true;
                    }
                } else if spacing > 0.0 {
                    let remaining = (1.0 - t) * segment_len;
                    if remaining <= spacing {
                        point.position = pt;
                    }
                } else {
                    point.position = pt;
                    point.mark_inert(PointStatus::Vector);
                }
            } else if spacing > 0.0 {
                if let Some(snap) = nearest_point_within(curr, breaks, spacing) {
                    point.position = snap;
                }
            }
        }
    }

    /// §4.3.5: move every still-`NORMAL` vertex by its ellipse velocity
    /// (metres/minute) scaled to the step duration and converted into
    /// internal coordinates.
    pub fn advance(&mut self, step: Seconds, grid: &GridCache) {
        let scale_minutes = f64::from(step.value()) / 60.0;
        for point in &mut self.points {
            if point.status != PointStatus::Normal {
                continue;
            }
            let displacement_m = point.ellipse_ros * scale_minutes;
            let displacement_internal = XyPoint::new(
                grid.internal_length(displacement_m.x),
                grid.internal_length(displacement_m.y),
            );
            point.position += displacement_internal;
        }
    }
}

/// Angle between two vectors, in `[0, 2π)`, measured as the interior turn at
/// their shared vertex (not signed).
fn angle_between(a: XyPoint, b: XyPoint) -> f64 {
    let na = a.norm();
    let nb = b.norm();
    if na < 1e-12 || nb < 1e-12 {
        return 0.0;
    }
    let cos = (a.dot(&b) / (na * nb)).clamp(-1.0, 1.0);
    cos.acos()
}

/// Earliest crossing of `prev -> curr` against any ring in `rings`, as the
/// fractional position along the segment and the crossing point itself.
fn nearest_ring_set_crossing(prev: XyPoint, curr: XyPoint, rings: &[&Poly]) -> Option<(f64, XyPoint)> {
    let mut best: Option<(f64, XyPoint)> = None;
    for ring in rings {
        let n = ring.points.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let Some(j) = ring.next_index(i) else {
                continue;
            };
            if let Some((t, _u, pt)) = segment_intersection(prev, curr, ring.points[i], ring.points[j]) {
                if best.map_or(true, |(bt, _)| t < bt) {
                    best = Some((t, pt));
                }
            }
        }
    }
    best
}

/// Nearest point on any ring edge or vertex within `spacing` of `from`, if any.
fn nearest_point_within(from: XyPoint, rings: &[&Poly], spacing: f64) -> Option<XyPoint> {
    let mut best: Option<(f64, XyPoint)> = None;
    for ring in rings {
        for &p in &ring.points {
            let d = distance(from, p);
            if d <= spacing && best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, p));
            }
        }
    }
    best.map(|(_, p)| p)
}

/// `PolygonNode` realization for clipping/unwinding a single `FireFront`'s
/// polygon against other polygon sets. New vertices are stamped `FIRE` or
/// `VECTOR` per the phase the caller is running; `min_fire_area` and
/// successful-breach auditing gate whether a resulting polygon survives.
pub struct FireFrontNode {
    pub min_fire_area: f64,
}

impl FireFrontNode {
    pub fn new(min_fire_area: f64) -> Self {
        FireFrontNode { min_fire_area }
    }
}

impl PolygonNode for FireFrontNode {
    type Vertex = FirePoint;

    fn new_vertex(&mut self, position: XyPoint, status: NewVertexStatus) -> FirePoint {
        let mut point = FirePoint::new(position);
        point.status = match status {
            NewVertexStatus::Fire => PointStatus::Fire,
            NewVertexStatus::Vector => PointStatus::Vector,
            NewVertexStatus::Normal => PointStatus::Normal,
        };
        point
    }

    fn choose_to_keep(&self, a: &FirePoint, b: &FirePoint) -> usize {
        if a.successful_breach && !b.successful_breach {
            0
        } else {
            1
        }
    }

    fn keep_polygon(&self, poly: &Poly, vertices: &[FirePoint]) -> bool {
        if poly.is_empty() {
            return false;
        }
        poly.area() >= self.min_fire_area || vertices.iter().any(|v| v.successful_breach)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_front(side: f64) -> FireFront {
        let points = vec![
            FirePoint::new(XyPoint::new(0.0, 0.0)),
            FirePoint::new(XyPoint::new(side, 0.0)),
            FirePoint::new(XyPoint::new(side, side)),
            FirePoint::new(XyPoint::new(0.0, side)),
        ];
        FireFront::new(points, true)
    }

    #[test]
    fn add_points_densifies_long_edges() {
        let mut front = square_front(100.0);
        front.add_points(Meters(10.0), false);
        assert!(front.points.len() > 4);
    }

    #[test]
    fn add_points_leaves_short_edges_alone() {
        let mut front = square_front(1.0);
        front.add_points(Meters(10.0), false);
        assert_eq!(front.points.len(), 4);
    }

    #[test]
    fn simplify_is_a_noop_during_acceleration() {
        let mut front = square_front(0.01);
        front.add_points(Meters(10.0), false);
        let before = front.points.len();
        front.simplify(Meters(10.0), Meters(0.0), Meters(10.0), Fraction::new(0.5));
        assert_eq!(front.points.len(), before);
    }

    #[test]
    fn advance_moves_only_normal_points() {
        let mut front = square_front(10.0);
        front.points[0].ellipse_ros = XyPoint::new(60.0, 0.0);
        front.points[1].status = PointStatus::NoFuel;
        front.points[1].ellipse_ros = XyPoint::new(60.0, 0.0);
        let grid = GridCache::new(XyPoint::new(0.0, 0.0), 1.0);
        front.advance(Seconds(60.0), &grid);
        assert!((front.points[0].position.x - 1.0).abs() < 1e-9);
        assert_eq!(front.points[1].position, XyPoint::new(10.0, 0.0));
    }

    #[test]
    fn angle_between_is_zero_for_parallel_vectors() {
        let a = XyPoint::new(1.0, 0.0);
        let b = XyPoint::new(2.0, 0.0);
        assert!(angle_between(a, b).abs() < 1e-9);
    }
}
