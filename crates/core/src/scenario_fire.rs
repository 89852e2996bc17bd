//! `ScenarioFire`: the polygon set belonging to one fire, and the untangle
//! (`unwind`) / cross-fire clip (`unoverlap`) passes that run on it once
//! every front in it has advanced (§4.4).

use crate::fire_front::{FireFront, FireFrontNode};
use crate::fire_point::FirePoint;
use crate::geom::poly::Poly;
use crate::geom::polyset::{ClipMetrics, ClipOp, PolySet};

/// One fire's polygon set: usually a single ring, but `unwind` may split a
/// knotted perimeter into several (an outer loop plus holes).
#[derive(Debug, Clone)]
pub struct ScenarioFire {
    pub fronts: Vec<FireFront>,
    pub min_fire_area: f64,
}

impl ScenarioFire {
    pub fn new(fronts: Vec<FireFront>, min_fire_area: f64) -> Self {
        ScenarioFire { fronts, min_fire_area }
    }

    /// True once every front has shrunk below a usable polygon.
    pub fn is_empty(&self) -> bool {
        self.fronts.iter().all(|f| f.points.len() < 3)
    }

    pub fn total_area(&self) -> f64 {
        self.fronts.iter().map(|f| f.polygon().area()).sum()
    }

    fn to_polyset(&self) -> PolySet<FirePoint> {
        let mut set = PolySet::new();
        for front in &self.fronts {
            set.push_ring(front.polygon(), front.points.clone());
        }
        set
    }

    fn adopt(&mut self, set: PolySet<FirePoint>) {
        self.fronts = set
            .rings
            .into_iter()
            .zip(set.vertices)
            .map(|(ring, points)| FireFront::new(points, ring.closed))
            .collect();
    }

    /// §4.4 `unwind`: remove self-intersections. A resulting polygon below
    /// `min_fire_area` is dropped unless one of its vertices recorded a
    /// successful breach (`FireFrontNode::keep_polygon`).
    pub fn unwind(&mut self, keep_interior: bool, multithread: bool, fudge: f64) -> ClipMetrics {
        let set = self.to_polyset();
        let mut node = FireFrontNode::new(self.min_fire_area);
        let (result, metrics) = set.unwind(keep_interior, &mut node, multithread, fudge);
        self.adopt(result);
        metrics
    }

    /// §4.4 `unoverlap`: clip this fire's polygon against every larger fire,
    /// then against every currently active vector break (dynamic and
    /// time-gated static, already filtered by the caller to
    /// `used_time <= current_time` — see DESIGN.md for why this filtering
    /// happens here rather than through `PolygonNode::participates`).
    pub fn unoverlap(
        &mut self,
        larger_fires: &[&ScenarioFire],
        active_breaks: &[&Poly],
        multithread: bool,
        fudge: f64,
    ) -> ClipMetrics {
        let mut metrics = ClipMetrics::default();
        let mut current = self.to_polyset();
        let mut node = FireFrontNode::new(self.min_fire_area);

        for larger in larger_fires {
            let other = larger.to_polyset();
            let (result, step_metrics) = current.clip(&other, ClipOp::Diff, &mut node, multithread, fudge);
            current = result;
            metrics.merge(step_metrics);
        }

        let mut break_set = PolySet::new();
        for &brk in active_breaks {
            if brk.points.is_empty() {
                continue;
            }
            let payload = vec![FirePoint::new(brk.points[0]); brk.points.len()];
            break_set.push_ring(brk.clone(), payload);
        }
        if !break_set.rings.is_empty() {
            let (result, step_metrics) = current.clip(&break_set, ClipOp::Diff, &mut node, multithread, fudge);
            current = result;
            metrics.merge(step_metrics);
        }

        self.adopt(current);
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point::XyPoint;

    fn square_fire(min: f64, max: f64) -> ScenarioFire {
        let points = vec![
            FirePoint::new(XyPoint::new(min, min)),
            FirePoint::new(XyPoint::new(max, min)),
            FirePoint::new(XyPoint::new(max, max)),
            FirePoint::new(XyPoint::new(min, max)),
        ];
        ScenarioFire::new(vec![FireFront::new(points, true)], 0.0)
    }

    #[test]
    fn unwind_of_clean_polygon_is_unchanged() {
        let mut fire = square_fire(0.0, 10.0);
        fire.unwind(false, false, 1e-6);
        assert_eq!(fire.fronts.len(), 1);
        assert_eq!(fire.fronts[0].points.len(), 4);
    }

    #[test]
    fn unoverlap_against_larger_fire_shrinks_to_empty() {
        let mut small = square_fire(0.0, 10.0);
        let large = square_fire(-5.0, 15.0);
        let others: Vec<&ScenarioFire> = vec![&large];
        small.unoverlap(&others, &[], false, 1e-6);
        assert!(small.is_empty());
    }

    #[test]
    fn unoverlap_with_no_competing_fires_is_unchanged() {
        let mut fire = square_fire(0.0, 10.0);
        fire.unoverlap(&[], &[], false, 1e-6);
        assert!(!fire.is_empty());
        assert!((fire.total_area() - 100.0).abs() < 1e-6);
    }
}
