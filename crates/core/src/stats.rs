//! Delaunay/Voronoi building blocks for `Scenario::get_stats` (§4.6).
//!
//! Nothing in the corpus carries a Delaunay implementation, so this is a
//! self-contained Bowyer-Watson triangulator plus the Voronoi dual built from
//! its circumcenters. `Scenario` (not this module) composes these primitives
//! per the technique requested by a query: `CLOSEST_VERTEX` and `DISCRETIZE`
//! need no triangulation at all; `IDW`, `AREA_WEIGHTING` and
//! `VORONOI_OVERLAP` all triangulate the neighbourhood first and differ only
//! in how they turn it into a scalar.

use crate::fire_point::{FbpScalars, FirePoint, VectorScalars};
use crate::geom::point::{distance, distance_sq, Rect, XyPoint};
use crate::geom::poly::{NewVertexStatus, Poly, PolygonNode};
use crate::geom::polyset::{ClipOp, PolySet, DEFAULT_FUDGE};
use rustc_hash::FxHashMap;

/// Interpolation technique requested by a stats query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatTechnique {
    /// Evaluate FBP at the query point directly, without a burn.
    Calculate,
    ClosestVertex,
    Discretize,
    Idw,
    AreaWeighting,
    VoronoiOverlap,
}

/// A named per-vertex quantity `get_stats` can report, mirroring the scalar
/// fields computed onto every `FirePoint` each step (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStat {
    Raz,
    Rsi,
    Roseq,
    Ros,
    Fros,
    Bros,
    RosRatio,
    Cfb,
    Fi,
    VectorRos,
    VectorCfb,
    Cfc,
    Sfc,
    Tfc,
    VectorFi,
    /// Fraction of a sampled area currently burning; only meaningful for
    /// `StatTechnique::Discretize`.
    BurnedFraction,
}

impl PointStat {
    /// Parses the case-insensitive name used by a serialized query. Returns
    /// `None` so the caller can raise `CoreError::StatUnknown` with the
    /// original string.
    pub fn parse(name: &str) -> Option<PointStat> {
        Some(match name.to_ascii_lowercase().as_str() {
            "raz" => PointStat::Raz,
            "rsi" => PointStat::Rsi,
            "roseq" => PointStat::Roseq,
            "ros" => PointStat::Ros,
            "fros" => PointStat::Fros,
            "bros" => PointStat::Bros,
            "ros_ratio" | "rosratio" => PointStat::RosRatio,
            "cfb" => PointStat::Cfb,
            "fi" => PointStat::Fi,
            "vector_ros" | "vros" => PointStat::VectorRos,
            "vector_cfb" | "vcfb" => PointStat::VectorCfb,
            "cfc" => PointStat::Cfc,
            "sfc" => PointStat::Sfc,
            "tfc" => PointStat::Tfc,
            "vector_fi" | "vfi" => PointStat::VectorFi,
            "burned_fraction" | "burnfraction" => PointStat::BurnedFraction,
            _ => return None,
        })
    }

    /// Reads this statistic off an already-computed vertex. `BurnedFraction`
    /// has no per-vertex reading (it only applies to `DISCRETIZE`'s sampled
    /// grid) and always reports `0.0` here.
    pub fn read(self, point: &FirePoint) -> f64 {
        let fbp: &FbpScalars = &point.fbp;
        let vector: &VectorScalars = &point.vector;
        match self {
            PointStat::Raz => f64::from(fbp.raz.value()),
            PointStat::Rsi => f64::from(fbp.rsi),
            PointStat::Roseq => f64::from(fbp.roseq),
            PointStat::Ros => f64::from(fbp.ros),
            PointStat::Fros => f64::from(fbp.fros),
            PointStat::Bros => f64::from(fbp.bros),
            PointStat::RosRatio => f64::from(fbp.ros_ratio.value()),
            PointStat::Cfb => f64::from(fbp.cfb.value()),
            PointStat::Fi => f64::from(fbp.fi),
            PointStat::VectorRos => f64::from(vector.ros.value()),
            PointStat::VectorCfb => f64::from(vector.cfb.value()),
            PointStat::Cfc => f64::from(vector.cfc),
            PointStat::Sfc => f64::from(vector.sfc),
            PointStat::Tfc => f64::from(vector.tfc),
            PointStat::VectorFi => f64::from(vector.fi),
            PointStat::BurnedFraction => 0.0,
        }
    }
}

/// One triangle of a Delaunay triangulation, as indices into the point slice
/// passed to [`triangulate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub vertices: [usize; 3],
}

fn circumcircle(a: XyPoint, b: XyPoint, c: XyPoint) -> Option<(XyPoint, f64)> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = XyPoint::new(ux, uy);
    Some((center, distance_sq(center, a)))
}

/// Bowyer-Watson triangulation of `points`. Returns indices into `points`
/// directly; the super-triangle used to seed the sweep never appears in the
/// result. Fewer than 3 points yields an empty triangulation.
pub fn triangulate(points: &[XyPoint]) -> Vec<Triangle> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut bounds = Rect::from_point(points[0]);
    for &p in &points[1..] {
        bounds.expand_to_include(p);
    }
    let span = bounds.width().max(bounds.height()).max(1.0) * 20.0;
    let center = bounds.center();
    let mut pts = points.to_vec();
    let (ia, ib, ic) = (n, n + 1, n + 2);
    pts.push(XyPoint::new(center.x - span, center.y - span));
    pts.push(XyPoint::new(center.x + span, center.y - span));
    pts.push(XyPoint::new(center.x, center.y + span));

    let mut triangles = vec![Triangle { vertices: [ia, ib, ic] }];

    for pi in 0..n {
        let p = pts[pi];
        let bad: Vec<usize> = triangles
            .iter()
            .enumerate()
            .filter_map(|(ti, t)| {
                let (a, b, c) = (pts[t.vertices[0]], pts[t.vertices[1]], pts[t.vertices[2]]);
                let (center, r2) = circumcircle(a, b, c)?;
                (distance_sq(center, p) <= r2 + 1e-9).then_some(ti)
            })
            .collect();

        let mut edge_count: FxHashMap<(usize, usize), u32> = FxHashMap::default();
        for &ti in &bad {
            let v = triangles[ti].vertices;
            for &(u, w) in &[(v[0], v[1]), (v[1], v[2]), (v[2], v[0])] {
                let key = if u < w { (u, w) } else { (w, u) };
                *edge_count.entry(key).or_insert(0) += 1;
            }
        }

        let mut bad_sorted = bad;
        bad_sorted.sort_unstable_by(|a, b| b.cmp(a));
        for ti in bad_sorted {
            triangles.remove(ti);
        }

        for (&(u, w), &count) in &edge_count {
            if count == 1 {
                triangles.push(Triangle { vertices: [u, w, pi] });
            }
        }
    }

    triangles.retain(|t| !t.vertices.iter().any(|&v| v == ia || v == ib || v == ic));
    triangles
}

/// The Voronoi cell around `points[idx]`: the polygon of circumcenters of
/// every triangle incident to it, wound around the point by angle. `None`
/// for a point with fewer than 3 incident triangles (degenerate input) or no
/// incident triangles at all.
pub fn voronoi_cell(idx: usize, points: &[XyPoint], triangles: &[Triangle]) -> Option<Poly> {
    let center = points[idx];
    let mut corners: Vec<XyPoint> = triangles
        .iter()
        .filter(|t| t.vertices.contains(&idx))
        .filter_map(|t| {
            let (a, b, c) = (
                points[t.vertices[0]],
                points[t.vertices[1]],
                points[t.vertices[2]],
            );
            circumcircle(a, b, c).map(|(c, _)| c)
        })
        .collect();
    corners.sort_by(|a, b| {
        let angle_a = (a.y - center.y).atan2(a.x - center.x);
        let angle_b = (b.y - center.y).atan2(b.x - center.x);
        angle_a.total_cmp(&angle_b)
    });
    corners.dedup_by(|a, b| distance(*a, *b) < 1e-9);
    if corners.len() < 3 {
        return None;
    }
    Some(Poly::new(corners, true))
}

/// §4.6: expand `radius` by 1.25x per retry (starting from `start_radius`,
/// the caller's `2 * max(perimeterResolution, spatialThreshold)`) until at
/// least 20 candidates fall within it or 20 retries are spent. Returns the
/// matching indices into `candidates` and the radius that produced them.
pub fn gather_neighbors(target: XyPoint, candidates: &[XyPoint], start_radius: f64) -> (Vec<usize>, f64) {
    let mut radius = start_radius.max(1e-6);
    let within = |r: f64| -> Vec<usize> {
        candidates
            .iter()
            .enumerate()
            .filter(|&(_, &p)| distance(p, target) <= r)
            .map(|(i, _)| i)
            .collect()
    };
    for _ in 0..20 {
        let found = within(radius);
        if found.len() >= 20 {
            return (found, radius);
        }
        radius *= 1.25;
    }
    (within(radius), radius)
}

/// Inverse-distance-weighted average. An exact coincidence with `target`
/// short-circuits to that neighbour's value.
pub fn idw(target: XyPoint, neighbors: &[(XyPoint, f64)], power: f64) -> Option<f64> {
    let mut weight_sum = 0.0;
    let mut value_sum = 0.0;
    for &(p, v) in neighbors {
        let d = distance(p, target);
        if d < 1e-9 {
            return Some(v);
        }
        let w = 1.0 / d.powf(power);
        weight_sum += w;
        value_sum += w * v;
    }
    (weight_sum > 0.0).then_some(value_sum / weight_sum)
}

struct AreaNode;

impl PolygonNode for AreaNode {
    type Vertex = XyPoint;

    fn new_vertex(&mut self, position: XyPoint, _status: NewVertexStatus) -> XyPoint {
        position
    }

    fn choose_to_keep(&self, _a: &XyPoint, _b: &XyPoint) -> usize {
        0
    }
}

fn intersect_area(a: &Poly, b: &Poly) -> f64 {
    let mut set_a = PolySet::new();
    set_a.push_ring(a.clone(), a.points.clone());
    let mut set_b = PolySet::new();
    set_b.push_ring(b.clone(), b.points.clone());
    let mut node = AreaNode;
    let (result, _metrics) = set_a.clip(&set_b, ClipOp::Intersect, &mut node, false, DEFAULT_FUDGE);
    result.total_area().abs()
}

fn rect_poly(r: Rect) -> Poly {
    Poly::new(
        vec![
            XyPoint::new(r.min.x, r.min.y),
            XyPoint::new(r.max.x, r.min.y),
            XyPoint::new(r.max.x, r.max.y),
            XyPoint::new(r.min.x, r.max.y),
        ],
        true,
    )
}

/// Weight each neighbour's value by how much of `cell` its Voronoi cell
/// covers.
pub fn area_weighting(cell: Rect, neighbors: &[(XyPoint, f64)]) -> Option<f64> {
    let points: Vec<XyPoint> = neighbors.iter().map(|&(p, _)| p).collect();
    let triangles = triangulate(&points);
    let cell_poly = rect_poly(cell);

    let mut weight_sum = 0.0;
    let mut value_sum = 0.0;
    for (i, &(_, value)) in neighbors.iter().enumerate() {
        let Some(vcell) = voronoi_cell(i, &points, &triangles) else {
            continue;
        };
        let area = intersect_area(&cell_poly, &vcell);
        if area > 0.0 {
            weight_sum += area;
            value_sum += area * value;
        }
    }
    (weight_sum > 0.0).then_some(value_sum / weight_sum)
}

/// Builds the Voronoi diagram of `neighbors` alone (their "pre-deletion"
/// cells), then the diagram of `neighbors` plus `target`, and weights each
/// neighbour's value by the overlap between its pre-deletion cell and
/// `target`'s own cell in the combined diagram.
pub fn voronoi_overlap(target: XyPoint, neighbors: &[(XyPoint, f64)]) -> Option<f64> {
    if neighbors.len() < 3 {
        return idw(target, neighbors, 2.0);
    }
    let neighbor_points: Vec<XyPoint> = neighbors.iter().map(|&(p, _)| p).collect();
    let pre_triangles = triangulate(&neighbor_points);
    let pre_cells: Vec<Option<Poly>> = (0..neighbor_points.len())
        .map(|i| voronoi_cell(i, &neighbor_points, &pre_triangles))
        .collect();

    let mut combined = neighbor_points.clone();
    combined.push(target);
    let target_idx = combined.len() - 1;
    let post_triangles = triangulate(&combined);
    let target_cell = voronoi_cell(target_idx, &combined, &post_triangles)?;

    let mut weight_sum = 0.0;
    let mut value_sum = 0.0;
    for (i, pre_cell) in pre_cells.iter().enumerate() {
        let Some(pre_cell) = pre_cell else { continue };
        let area = intersect_area(&target_cell, pre_cell);
        if area > 0.0 {
            weight_sum += area;
            value_sum += area * neighbors[i].1;
        }
    }
    (weight_sum > 0.0).then_some(value_sum / weight_sum)
}

/// Average of `value_at` sampled on a `discretization x discretization` grid
/// over `cell`, cell-centre sampled.
pub fn discretize_average(cell: Rect, discretization: usize, value_at: impl Fn(XyPoint) -> f64) -> f64 {
    let n = discretization.max(1);
    let mut sum = 0.0;
    for i in 0..n {
        for j in 0..n {
            sum += value_at(sample_point(cell, n, i, j));
        }
    }
    sum / (n * n) as f64
}

/// Fraction of the same sampling grid for which `contains` reports burning.
pub fn discretize_burned_fraction(cell: Rect, discretization: usize, contains: impl Fn(XyPoint) -> bool) -> f64 {
    let n = discretization.max(1);
    let mut burned = 0usize;
    for i in 0..n {
        for j in 0..n {
            if contains(sample_point(cell, n, i, j)) {
                burned += 1;
            }
        }
    }
    burned as f64 / (n * n) as f64
}

fn sample_point(cell: Rect, n: usize, i: usize, j: usize) -> XyPoint {
    let fx = (i as f64 + 0.5) / n as f64;
    let fy = (j as f64 + 0.5) / n as f64;
    XyPoint::new(cell.min.x + fx * cell.width(), cell.min.y + fy * cell.height())
}

/// Nearest neighbour's value, per `CLOSEST_VERTEX`.
pub fn closest_vertex_value(target: XyPoint, vertices: &[(XyPoint, f64)]) -> Option<f64> {
    vertices
        .iter()
        .min_by(|a, b| distance(a.0, target).total_cmp(&distance(b.0, target)))
        .map(|&(_, v)| v)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_points(n: i32) -> Vec<XyPoint> {
        let mut pts = Vec::new();
        for x in 0..n {
            for y in 0..n {
                pts.push(XyPoint::new(f64::from(x), f64::from(y)));
            }
        }
        pts
    }

    #[test]
    fn triangulate_produces_expected_triangle_count_for_a_grid() {
        let pts = grid_points(4);
        let triangles = triangulate(&pts);
        assert!(!triangles.is_empty());
        for t in &triangles {
            assert!(t.vertices.iter().all(|&v| v < pts.len()));
        }
    }

    #[test]
    fn triangulate_with_fewer_than_three_points_is_empty() {
        assert!(triangulate(&[XyPoint::new(0.0, 0.0), XyPoint::new(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn voronoi_cell_of_interior_grid_point_is_a_small_square() {
        let pts = grid_points(5);
        let triangles = triangulate(&pts);
        // point (2,2) is index 2*5+2 = 12, interior of the grid
        let cell = voronoi_cell(12, &pts, &triangles).expect("interior cell exists");
        assert!(cell.area() > 0.0);
        assert!(cell.area() < 2.0);
    }

    #[test]
    fn gather_neighbors_expands_radius_until_enough_points_found() {
        let pts = grid_points(10);
        let (found, radius) = gather_neighbors(XyPoint::new(5.0, 5.0), &pts, 0.5);
        assert!(found.len() >= 20.min(pts.len()));
        assert!(radius >= 0.5);
    }

    #[test]
    fn idw_exact_hit_short_circuits_to_that_value() {
        let neighbors = vec![(XyPoint::new(0.0, 0.0), 10.0), (XyPoint::new(5.0, 5.0), 20.0)];
        assert_eq!(idw(XyPoint::new(0.0, 0.0), &neighbors, 2.0), Some(10.0));
    }

    #[test]
    fn idw_weights_closer_neighbor_more() {
        let neighbors = vec![(XyPoint::new(1.0, 0.0), 100.0), (XyPoint::new(10.0, 0.0), 0.0)];
        let v = idw(XyPoint::new(0.0, 0.0), &neighbors, 2.0).unwrap();
        assert!(v > 50.0);
    }

    #[test]
    fn area_weighting_matches_idw_ordering_for_asymmetric_neighbors() {
        let neighbors = vec![
            (XyPoint::new(-1.0, 0.0), 0.0),
            (XyPoint::new(1.0, 0.0), 100.0),
            (XyPoint::new(0.0, 1.0), 50.0),
            (XyPoint::new(0.0, -1.0), 50.0),
        ];
        let cell = Rect::new(XyPoint::new(-0.1, -0.1), XyPoint::new(0.1, 0.1));
        let v = area_weighting(cell, &neighbors).unwrap();
        assert!(v > 20.0 && v < 80.0);
    }

    #[test]
    fn voronoi_overlap_falls_back_to_idw_with_too_few_neighbors() {
        let neighbors = vec![(XyPoint::new(1.0, 0.0), 10.0)];
        let v = voronoi_overlap(XyPoint::new(0.0, 0.0), &neighbors).unwrap();
        assert_eq!(v, 10.0);
    }

    #[test]
    fn discretize_burned_fraction_counts_samples_inside_a_circle() {
        let cell = Rect::new(XyPoint::new(-1.0, -1.0), XyPoint::new(1.0, 1.0));
        let frac = discretize_burned_fraction(cell, 20, |p| p.norm() <= 1.0);
        assert!(frac > 0.6 && frac < 0.9);
    }

    #[test]
    fn closest_vertex_value_picks_nearest() {
        let vertices = vec![(XyPoint::new(0.0, 0.0), 1.0), (XyPoint::new(10.0, 0.0), 2.0)];
        assert_eq!(closest_vertex_value(XyPoint::new(9.0, 0.0), &vertices), Some(2.0));
    }

    #[test]
    fn point_stat_parse_is_case_insensitive_and_rejects_unknown_names() {
        assert_eq!(PointStat::parse("FI"), Some(PointStat::Fi));
        assert_eq!(PointStat::parse("not_a_stat"), None);
    }
}
