//! Asset arrival tracking (§4.8) and critical-path export (§4.7).
//!
//! An asset geometry "arrives" the step a fire first touches it; arrival
//! time and the closest fire vertex are recorded once and never revisited
//! (`StaticBreak`-style geometry, owned for the whole run by `ScenarioCache`,
//! is reused here rather than re-deriving a containment test).

use crate::fire_front::FireFront;
use crate::fire_point::{FbpScalars, GlobalPointRef, PointId, StepIndex, VectorScalars};
use crate::geom::point::{distance, XyPoint};
use crate::geom::point_in_ring;
use crate::geom::poly::Poly;
use crate::geom::polyset::segment_intersection;
use crate::providers::AssetType;
use crate::scenario_cache::AssetGeometry;
use crate::time::WTime;
use crate::time_step::ScenarioTimeStep;

/// How many arrived assets end the simulation: every geometry, or a fixed
/// count. Mirrors the original's asset operation counter (`-1` = all, `N` =
/// N geometries).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalScope {
    All,
    Count(u32),
}

/// One asset geometry's arrival state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AssetArrival {
    pub arrived: bool,
    pub arrival_time: Option<WTime>,
    pub closest_fire_point: Option<GlobalPointRef>,
}

/// Per-scenario bookkeeping: one [`AssetArrival`] per geometry enumerated by
/// `ScenarioCache::build_assets`, in the same order.
#[derive(Debug, Clone)]
pub struct AssetTracker {
    pub scope: ArrivalScope,
    arrivals: Vec<AssetArrival>,
}

impl AssetTracker {
    pub fn new(scope: ArrivalScope, asset_count: usize) -> Self {
        AssetTracker {
            scope,
            arrivals: vec![AssetArrival::default(); asset_count],
        }
    }

    pub fn arrival(&self, index: usize) -> Option<&AssetArrival> {
        self.arrivals.get(index)
    }

    pub fn arrived_count(&self) -> usize {
        self.arrivals.iter().filter(|a| a.arrived).count()
    }

    /// §4.8: for every not-yet-arrived asset, test every current front;
    /// record time and closest vertex on first contact.
    pub fn check_step(&mut self, assets: &[AssetGeometry], step: &ScenarioTimeStep, step_index: StepIndex) {
        for (asset_idx, asset) in assets.iter().enumerate() {
            let Some(state) = self.arrivals.get_mut(asset_idx) else {
                continue;
            };
            if state.arrived {
                continue;
            }
            for (front_id, _fire_idx, front) in step.fronts() {
                if !front_touches_asset(front, asset) {
                    continue;
                }
                let Some((point_id, _)) = nearest_vertex(front, asset.bounds.center()) else {
                    continue;
                };
                state.arrived = true;
                state.arrival_time = Some(step.time);
                state.closest_fire_point = Some(GlobalPointRef {
                    step: step_index,
                    front: front_id,
                    point: point_id,
                });
                break;
            }
        }
    }

    /// Whether the configured scope's stop condition is currently satisfied.
    pub fn stop_condition_met(&self) -> bool {
        match self.scope {
            ArrivalScope::All => !self.arrivals.is_empty() && self.arrivals.iter().all(|a| a.arrived),
            ArrivalScope::Count(n) => self.arrived_count() as u32 >= n,
        }
    }
}

fn edges(poly: &Poly) -> impl Iterator<Item = (XyPoint, XyPoint)> + '_ {
    let n = poly.points.len();
    let last = if poly.closed { n } else { n.saturating_sub(1) };
    (0..last).map(move |i| (poly.points[i], poly.points[(i + 1) % n]))
}

/// Nearest front vertex to `target`, with its distance.
fn nearest_vertex(front: &FireFront, target: XyPoint) -> Option<(PointId, f64)> {
    front
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (PointId(i as u32), distance(p.position, target)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// §4.8's arrival test: multipoint assets arrive when any point falls inside
/// the fire; polygon/polyline assets arrive when an edge of either geometry
/// crosses the other, or one geometry's representative vertex lies inside
/// the other's ring (covers an asset polygon that already encloses the
/// ignition before any edge crossing occurs).
fn front_touches_asset(front: &FireFront, asset: &AssetGeometry) -> bool {
    let polygon = front.polygon();
    match asset.kind {
        AssetType::Multipoint => asset.poly.points.iter().any(|&pt| point_in_ring(pt, &polygon)),
        AssetType::Polygon | AssetType::Polyline => {
            if edges(&polygon).any(|(a0, a1)| edges(&asset.poly).any(|(b0, b1)| segment_intersection(a0, a1, b0, b1).is_some())) {
                return true;
            }
            if asset.poly.closed && polygon.points.first().is_some_and(|&p| point_in_ring(p, &asset.poly)) {
                return true;
            }
            if polygon.closed && asset.poly.points.first().is_some_and(|&p| point_in_ring(p, &polygon)) {
                return true;
            }
            false
        }
    }
}

/// One vertex of an exported critical path: position, the step time it
/// belonged to, and the FBP/vector statistics computed for it that step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalPathPoint {
    pub position: XyPoint,
    pub time: WTime,
    pub fbp: FbpScalars,
    pub vector: VectorScalars,
}

/// §4.7: walk `prev_point` links from an asset-arrival vertex back to the
/// ignition that produced it, collapsing consecutive coincident positions
/// (a step where the vertex made zero progress). `steps` must be indexable
/// by `GlobalPointRef::step` (i.e. a scenario's full, unpurged step history).
pub fn critical_path(steps: &[ScenarioTimeStep], start: GlobalPointRef) -> Vec<CriticalPathPoint> {
    let mut path = Vec::new();
    let mut cursor = Some(start);
    while let Some(r) = cursor {
        let Some(step) = steps.get(r.step.0 as usize) else {
            break;
        };
        let Some(point) = step.point(r.front, r.point) else {
            break;
        };
        let candidate = CriticalPathPoint {
            position: point.position,
            time: step.time,
            fbp: point.fbp,
            vector: point.vector,
        };
        let is_duplicate = path
            .last()
            .is_some_and(|p: &CriticalPathPoint| p.position == candidate.position);
        if !is_duplicate {
            path.push(candidate);
        }
        cursor = point.prev_point;
    }
    path.reverse();
    path
}
