//! `ScenarioTimeStep` (§4.5): one instant's worth of fire state, the event
//! time that produced it, and the bookkeeping that lets later steps refer
//! back into it (`GlobalFrontRef`/`GlobalPointRef`).
//!
//! Per §3.1, removal in this engine happens at whole-step granularity
//! (`Scenario::step_back`/purge drop an entire `ScenarioTimeStep`, never a
//! single front or point out from under a live step) so the front/point
//! index built here is a flat, immutable-for-the-step's-lifetime table
//! rather than a free-list arena — there is nothing to free until the whole
//! step goes away with it.

use crate::active_fire::{bbox_within, vertices_within, ActiveFire};
use crate::fire_front::FireFront;
use crate::fire_point::{FirePoint, FrontId, PointId};
use crate::geom::point::XyPoint;
use crate::scenario_fire::ScenarioFire;
use crate::time::{WTime, WTimeSpan};

/// One simulated instant: every fire's polygon state plus the adaptive-step
/// bookkeeping (`ActiveFire`) that produced it.
#[derive(Debug, Clone)]
pub struct ScenarioTimeStep {
    pub time: WTime,
    /// `true` when this step's time was chosen by an event rather than
    /// landing exactly on the requested display boundary.
    pub evented: bool,
    /// `true` when this step should survive `PURGE_NONDISPLAYABLE`.
    pub displayable: bool,
    /// `true` when `time` coincides with some fire's ignition.
    pub ignitioned: bool,
    pub fires: Vec<ScenarioFire>,
    /// One `ActiveFire` per entry in `fires`, same indexing.
    pub active_fires: Vec<ActiveFire>,
    front_index: Vec<(usize, usize)>,
}

impl ScenarioTimeStep {
    pub fn new(
        time: WTime,
        fires: Vec<ScenarioFire>,
        active_fires: Vec<ActiveFire>,
        evented: bool,
        displayable: bool,
        ignitioned: bool,
    ) -> Self {
        let mut step = ScenarioTimeStep {
            time,
            evented,
            displayable,
            ignitioned,
            fires,
            active_fires,
            front_index: Vec::new(),
        };
        step.reindex();
        step
    }

    /// Rebuild the `FrontId -> (fire, front)` table; call after mutating
    /// `fires` (e.g. dropping an emptied fire).
    pub fn reindex(&mut self) {
        self.front_index.clear();
        for (fire_idx, fire) in self.fires.iter().enumerate() {
            for front_idx in 0..fire.fronts.len() {
                self.front_index.push((fire_idx, front_idx));
            }
        }
    }

    pub fn front(&self, id: FrontId) -> Option<&FireFront> {
        let &(fire_idx, front_idx) = self.front_index.get(id.0 as usize)?;
        Some(&self.fires[fire_idx].fronts[front_idx])
    }

    pub fn point(&self, front: FrontId, point: PointId) -> Option<&FirePoint> {
        self.front(front)?.points.get(point.0 as usize)
    }

    /// Every front this step holds, with its stable id and owning fire index.
    pub fn fronts(&self) -> impl Iterator<Item = (FrontId, usize, &FireFront)> {
        self.front_index
            .iter()
            .enumerate()
            .map(move |(id, &(fire_idx, front_idx))| {
                (FrontId(id as u32), fire_idx, &self.fires[fire_idx].fronts[front_idx])
            })
    }

    pub fn total_area(&self) -> f64 {
        self.fires.iter().map(ScenarioFire::total_area).sum()
    }

    /// Whether a fire is currently burning at this step's centroid point —
    /// callers (stop-condition checks, `Scenario::step`) decide which fire's
    /// centroid matters; this just unions "does anything remain".
    pub fn is_empty(&self) -> bool {
        self.fires.iter().all(ScenarioFire::is_empty)
    }
}

/// §4.5 steps 2-6: every external collaborator's candidate event time, one
/// slot per source. All are already filtered to `(prev_time, tentative]` by
/// the caller except `active_fire_deltas`, which are offsets from
/// `prev_time` (the natural unit `ActiveFire::calculate_end_time` returns).
#[derive(Debug, Clone, Default)]
pub struct EventTimeInputs {
    pub ignition_times: Vec<WTime>,
    pub response_time: WTimeSpan,
    pub landscape_event: Option<WTime>,
    pub vector_source_events: Vec<WTime>,
    pub asset_source_events: Vec<WTime>,
    pub gust_transitions: Vec<WTime>,
    pub active_fire_deltas: Vec<WTimeSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventTimeResult {
    pub time: WTime,
    pub evented: bool,
    pub displayable: bool,
    pub ignitioned: bool,
}

/// §4.5 construction algorithm: fold every candidate source down to the
/// earliest admissible time no later than `event_end`.
pub fn compute_event_time(
    prev_time: WTime,
    event_end: WTime,
    display_interval: WTimeSpan,
    inputs: &EventTimeInputs,
) -> EventTimeResult {
    let mut time = event_end + WTimeSpan::from_secs(1);

    let mut consider = |candidate: WTime, time: &mut WTime| {
        if candidate > prev_time && candidate <= *time {
            *time = candidate;
        }
    };

    for &ignition in &inputs.ignition_times {
        consider(ignition, &mut time);
        consider(ignition + inputs.response_time, &mut time);
    }
    if let Some(landscape) = inputs.landscape_event {
        consider(landscape, &mut time);
    }
    for &event in inputs.vector_source_events.iter().chain(&inputs.asset_source_events).chain(&inputs.gust_transitions) {
        consider(event, &mut time);
    }
    for &delta in &inputs.active_fire_deltas {
        consider(prev_time + delta, &mut time);
    }

    if time > event_end {
        time = event_end;
    }

    let evented = time != event_end;
    let displayable = time == event_end || display_interval == WTimeSpan::ZERO;
    let ignitioned = inputs.ignition_times.iter().any(|&t| t == time);

    EventTimeResult { time, evented, displayable, ignitioned }
}

/// Union-find over `ActiveFire` candidates for §4.5's merge-by-proximity
/// pass: any un-advanced fire within `radius` of an already-advanced one is
/// folded onto the advanced one's cluster.
pub struct ProximityCluster<'a> {
    pub bounds: &'a crate::geom::point::Rect,
    pub vertices: &'a [XyPoint],
    pub advanced: bool,
}

/// Returns, per input candidate, the index of the cluster root it merged
/// into (itself if it stayed independent). Only merges an un-advanced
/// candidate onto an advanced one, never two un-advanced candidates
/// together or two advanced ones — advanced fires already share one clock.
pub fn merge_by_proximity(candidates: &[ProximityCluster<'_>], radius: f64) -> Vec<usize> {
    let mut parent: Vec<usize> = (0..candidates.len()).collect();

    fn find(parent: &mut [usize], i: usize) -> usize {
        if parent[i] != i {
            parent[i] = find(parent, parent[i]);
        }
        parent[i]
    }

    for (i, a) in candidates.iter().enumerate() {
        if a.advanced {
            continue;
        }
        for (j, b) in candidates.iter().enumerate() {
            if i == j || !b.advanced {
                continue;
            }
            if bbox_within(a.bounds, b.bounds, radius) && vertices_within(a.vertices, b.vertices, radius) {
                let root_a = find(&mut parent, i);
                let root_b = find(&mut parent, j);
                parent[root_a] = root_b;
                break;
            }
        }
    }

    (0..candidates.len()).map(|i| find(&mut parent, i)).collect()
}
