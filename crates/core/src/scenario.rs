//! `Scenario`: the orchestration seam that ties ignition, the per-step growth
//! pipeline (§4.2-4.5), stop-condition evaluation (§4.8), asset arrival
//! tracking, and stats queries (§4.6) together over everything `ScenarioCache`
//! and the rest of the module tree expose.
//!
//! Every per-vertex science call (fuel, weather, elevation, ROS/FC) goes
//! through `ScenarioCache`; `Scenario` itself only ever assembles inputs and
//! interprets outputs, mirroring how `ActiveFire`/`StopCondition` take their
//! inputs as plain contexts rather than reaching into scenario state.

use crate::active_fire::{ActiveFire, EndTimeContext};
use crate::assets::{critical_path, ArrivalScope, AssetTracker, CriticalPathPoint};
use crate::error::{CoreError, CoreResult};
use crate::fire_front::FireFront;
use crate::fire_point::{FbpScalars, FirePoint, PointStatus, StepIndex, VectorScalars};
use crate::geom::point::{Rect, XyPoint, XyzPoint};
use crate::geom::point_in_ring;
use crate::geom::poly::Poly;
use crate::geom::polyset::DEFAULT_FUDGE;
use crate::grid_cache::GridCache;
use crate::growth::{acceleration_dt, grow2d, grow3d, target_wind_direction, EllipseRates};
use crate::gusting::{apply_gusting, rolling_gust_average, GustBias, GustContext, GustEventContext, GustHistoryEntry, GustingMode, GustingModel};
use crate::options::{GrowthMode, ScenarioOptions};
use crate::providers::{EventSearchFlags, IgnitionSource, IgnitionType, InterpFlags, PercentileTable, Target};
use crate::scenario_cache::ScenarioCache;
use crate::scenario_fire::ScenarioFire;
use crate::stats::{self, PointStat, StatTechnique};
use crate::stop_condition::{FiThreshold, PrecipThreshold, StepHistoryEntry, StepStatInputs, StopCondition, StopReason};
use crate::time::{TimeManager, WTime, WTimeSpan};
use crate::time_step::{compute_event_time, EventTimeInputs, ScenarioTimeStep};
use crate::units::{Degrees, Fraction, KilometersPerHour, Meters, MetersPerMinute, Percent, Seconds};

/// Result of one [`Scenario::step`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub time: WTime,
    pub evented: bool,
    pub displayable: bool,
    pub stopped: Option<StopReason>,
}

/// Owns a scenario's entire run: its options, the collaborator bundle, every
/// ignition source, and the growing history of [`ScenarioTimeStep`]s.
pub struct Scenario {
    pub options: ScenarioOptions,
    cache: ScenarioCache,
    ignition_sources: Vec<Box<dyn IgnitionSource + Send + Sync>>,
    target: Option<Box<dyn Target + Send + Sync>>,
    percentile_table: Option<Box<dyn PercentileTable + Send + Sync>>,
    gusting: GustingModel,
    stop_condition: StopCondition,
    time_manager: TimeManager,
    start_time: WTime,
    end_time: WTime,
    steps: Vec<ScenarioTimeStep>,
    stop_history: Vec<StepHistoryEntry>,
    ignition_times: Vec<WTime>,
    primary_ignition_kind: IgnitionType,
    asset_tracker: Option<AssetTracker>,
    stopped: Option<StopReason>,
    prev_gusting: Fraction,
    gust_history: Vec<GustHistoryEntry>,
}

impl Scenario {
    pub fn new(
        options: ScenarioOptions,
        cache: ScenarioCache,
        time_manager: TimeManager,
        start_time: WTime,
        end_time: WTime,
    ) -> CoreResult<Self> {
        let report = options.validate();
        if report.has_severe() {
            tracing::error!(?report, "scenario options failed validation");
            return Err(CoreError::OptionInvalid(report));
        }
        if let Err(err) = crate::time::validate_time_range(start_time, end_time) {
            tracing::error!(%err, "scenario construction rejected");
            return Err(err);
        }
        let stop_condition = Self::stop_condition_from_options(&options);
        Ok(Scenario {
            options,
            cache,
            ignition_sources: Vec::new(),
            target: None,
            percentile_table: None,
            gusting: GustingModel::new(GustingMode::None, 0, Fraction::ZERO, GustBias::Leading),
            stop_condition,
            time_manager,
            start_time,
            end_time,
            steps: Vec::new(),
            stop_history: Vec::new(),
            ignition_times: Vec::new(),
            primary_ignition_kind: IgnitionType::Point,
            asset_tracker: None,
            stopped: None,
            prev_gusting: Fraction::ZERO,
            gust_history: Vec::new(),
        })
    }

    fn stop_condition_from_options(options: &ScenarioOptions) -> StopCondition {
        StopCondition {
            response_time: WTimeSpan::ZERO,
            fi90: options
                .stop_fi90
                .map(|t| FiThreshold::fi90(f64::from(t.threshold), WTimeSpan::from_secs(t.duration_secs))),
            fi95: options
                .stop_fi95
                .map(|t| FiThreshold::fi95(f64::from(t.threshold), WTimeSpan::from_secs(t.duration_secs))),
            fi100: options
                .stop_fi100
                .map(|t| FiThreshold::fi100(f64::from(t.threshold), WTimeSpan::from_secs(t.duration_secs))),
            rh: options.stop_rh.map(|t| WTimeSpan::from_secs(t.duration_secs)),
            precip: options.stop_precip.map(|t| PrecipThreshold {
                threshold_mm: f64::from(t.threshold.value()) * 1000.0,
                window: WTimeSpan::from_secs(t.duration_secs),
            }),
            area: options.stop_area.map(|t| t.threshold),
            burn_distance: options.stop_burn_distance.map(|t| t.threshold),
        }
    }

    pub fn add_ignition_source(&mut self, source: Box<dyn IgnitionSource + Send + Sync>) {
        self.ignition_sources.push(source);
    }

    pub fn set_target(&mut self, target: Box<dyn Target + Send + Sync>) {
        self.target = Some(target);
    }

    pub fn set_percentile_table(&mut self, table: Box<dyn PercentileTable + Send + Sync>) {
        self.percentile_table = Some(table);
    }

    pub fn set_gusting(&mut self, gusting: GustingModel) {
        self.gusting = gusting;
    }

    /// Overrides the stop condition derived from `options` at construction
    /// (e.g. to set a non-zero `response_time`, which has no dedicated option
    /// field).
    pub fn set_stop_condition(&mut self, condition: StopCondition) {
        self.stop_condition = condition;
    }

    pub fn enable_asset_tracking(&mut self, scope: ArrivalScope) {
        self.cache.build_assets(self.start_time);
        self.asset_tracker = Some(AssetTracker::new(scope, self.cache.asset_count()));
    }

    pub fn current_step(&self) -> Option<&ScenarioTimeStep> {
        self.steps.last()
    }

    pub fn steps(&self) -> &[ScenarioTimeStep] {
        &self.steps
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.is_some()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    pub fn assets_arrived(&self) -> bool {
        self.asset_tracker.as_ref().is_some_and(AssetTracker::stop_condition_met)
    }

    // ---- ignition ----------------------------------------------------------

    /// §4.1: seed the first `ScenarioTimeStep` from every valid ignition
    /// source, in internal coordinates.
    pub fn ignite(&mut self) -> CoreResult<()> {
        if self.ignition_sources.is_empty() {
            return Err(CoreError::NoIgnitionsConfigured);
        }
        self.cache.build_static_vector_breaks(self.start_time);

        let mut fires = Vec::new();
        let mut kind_seen = None;
        for source in &self.ignition_sources {
            if !source.valid(self.start_time, self.end_time - self.start_time) {
                continue;
            }
            for idx in 0..source.ignition_count() {
                let (kind, poly) = source.get_ignition(idx);
                kind_seen.get_or_insert(kind);
                let front = self.build_ignition_front(kind, &poly);
                if front.points.len() < 3 {
                    continue;
                }
                fires.push(ScenarioFire::new(vec![front], self.min_fire_area()));
                self.ignition_times.push(self.start_time);
            }
        }
        if fires.is_empty() {
            return Err(CoreError::NoFires);
        }
        self.primary_ignition_kind = kind_seen.unwrap_or(IgnitionType::Point);

        let active_fires = fires.iter().map(|f| self.active_fire_for(f)).collect();
        let step = ScenarioTimeStep::new(self.start_time, fires, active_fires, false, true, true);
        self.steps.clear();
        self.steps.push(step);
        self.stop_history.clear();
        self.stopped = None;
        self.prev_gusting = Fraction::ZERO;
        self.gust_history.clear();
        Ok(())
    }

    fn min_fire_area(&self) -> f64 {
        let res = f64::from(self.options.perimeter_resolution.value());
        res * res
    }

    fn build_ignition_front(&self, kind: IgnitionType, poly: &Poly) -> FireFront {
        match kind {
            IgnitionType::Point => {
                let center_utm = poly.points.first().copied().unwrap_or(XyPoint::new(0.0, 0.0));
                let center = self.cache.grid().to_internal(center_utm);
                let radius = self.cache.grid().internal_length(f64::from(self.options.ignition_size.value()));
                let n = self.options.initial_vertex_count.max(6);
                let points = (0..n)
                    .map(|i| {
                        let theta = 2.0 * std::f64::consts::PI * f64::from(i) / f64::from(n);
                        FirePoint::new(center + XyPoint::new(radius * theta.cos(), radius * theta.sin()))
                    })
                    .collect();
                FireFront::new(points, true)
            }
            IgnitionType::Line => {
                let points = poly
                    .points
                    .iter()
                    .map(|&p| FirePoint::new(self.cache.grid().to_internal(p)))
                    .collect();
                FireFront::new(points, false)
            }
            IgnitionType::PolygonIn | IgnitionType::PolygonOut => {
                let points = poly
                    .points
                    .iter()
                    .map(|&p| FirePoint::new(self.cache.grid().to_internal(p)))
                    .collect();
                FireFront::new(points, true)
            }
        }
    }

    fn active_fire_for(&self, fire: &ScenarioFire) -> ActiveFire {
        let mut bounds: Option<Rect> = None;
        let mut sum = XyPoint::new(0.0, 0.0);
        let mut count = 0usize;
        for front in &fire.fronts {
            for p in &front.points {
                sum += p.position;
                count += 1;
                bounds = Some(match bounds {
                    Some(mut r) => {
                        r.expand_to_include(p.position);
                        r
                    }
                    None => Rect::from_point(p.position),
                });
            }
        }
        let centroid = if count > 0 { sum / count as f64 } else { XyPoint::new(0.0, 0.0) };
        ActiveFire::new(centroid, bounds.unwrap_or_else(|| Rect::from_point(centroid)))
    }

    fn active_fire_with_ros(&self, fire: &ScenarioFire) -> ActiveFire {
        let mut active = self.active_fire_for(fire);
        let mut max_ros = MetersPerMinute(0.0);
        let mut heading = Degrees(0.0);
        let mut min_ratio = Fraction::ONE;
        for front in &fire.fronts {
            for p in &front.points {
                if p.fbp.ros > max_ros.value() {
                    max_ros = MetersPerMinute(p.fbp.ros);
                    heading = p.fbp.raz;
                }
                min_ratio = Fraction::clamped(min_ratio.value().min(p.fbp.ros_ratio.value()));
            }
        }
        active.max_ros = max_ros;
        active.max_ros_heading = heading;
        active.min_ros_ratio = min_ratio;
        active.advanced = true;
        active
    }

    fn earliest_ignition_time(&self) -> WTime {
        self.ignition_times.iter().copied().min().unwrap_or(self.start_time)
    }

    fn interp_flags(&self) -> InterpFlags {
        let mut flags = InterpFlags::EMPTY;
        if self.options.interp_temporal {
            flags |= InterpFlags::TEMPORAL;
        }
        if self.options.interp_spatial {
            flags |= InterpFlags::SPATIAL;
        }
        if self.options.interp_precip {
            flags |= InterpFlags::PRECIP;
        }
        if self.options.interp_wind {
            flags |= InterpFlags::WIND;
        }
        if self.options.interp_wind_vector {
            flags |= InterpFlags::WIND_VECTOR;
        }
        if self.options.interp_temp_rh {
            flags |= InterpFlags::TEMP_RH;
        }
        if self.options.interp_history {
            flags |= InterpFlags::HISTORY;
        }
        flags
    }

    fn base_wind_direction(&self, grid_wind_direction: Degrees) -> Degrees {
        self.options.owd.unwrap_or(grid_wind_direction)
    }

    fn in_burning_period(&self, centroid: XyPoint, time: WTime) -> bool {
        if let Some((start, end)) = self.cache.can_burn_time(0, time, centroid) {
            let local = time.to_local(&self.time_manager);
            let midnight = WTime::from_unix_secs(local.unix_secs() - local.unix_secs().rem_euclid(86_400));
            let offset = WTimeSpan::from_secs(local.unix_secs() - midnight.unix_secs());
            if offset < start || offset > end {
                return false;
            }
        }
        self.cache.can_burn_at(0, time, centroid)
    }

    fn spatial_threshold(&self, active: &ActiveFire) -> Meters {
        if self.options.dynamic_spatial_threshold {
            let area = active.bounds.width().max(1e-6) * active.bounds.height().max(1e-6);
            Meters::new((area.sqrt() * 0.01 * self.cache.grid().resolution()) as f32)
        } else {
            self.options.distance_resolution
        }
    }

    fn gust_event_context(&self) -> GustEventContext {
        let numerator: f64 = self
            .gust_history
            .iter()
            .map(|e| e.duration.as_seconds_f64() * f64::from(e.gusting.value()))
            .sum();
        let denominator: f64 = self.gust_history.iter().map(|e| e.duration.as_seconds_f64()).sum();
        GustEventContext {
            numerator: WTimeSpan::from_secs(numerator as i64),
            denominator: WTimeSpan::from_secs(denominator as i64),
            rolling_average: rolling_gust_average(&self.gust_history),
            prev_gusting: self.prev_gusting,
        }
    }

    // ---- the per-step pipeline (§4.2-4.5) -----------------------------------

    pub fn step(&mut self) -> CoreResult<StepOutcome> {
        if self.stopped.is_some() {
            return Err(CoreError::BadState("scenario already stopped"));
        }
        let Some(prev) = self.steps.last() else {
            return Err(CoreError::NoFires);
        };
        if prev.is_empty() {
            return Err(CoreError::NoFires);
        }
        let prev_time = prev.time;
        if prev_time >= self.end_time {
            return Err(CoreError::BadState("scenario already reached its end time"));
        }

        self.cache.pre_calculation_event(0, prev_time, "step");
        for source in &mut self.ignition_sources {
            source.pre_calculation_event(prev_time);
        }

        let display_interval = WTimeSpan::from_secs(self.options.display_interval_secs.max(0.0) as i64);
        let event_end = if display_interval == WTimeSpan::ZERO {
            self.end_time
        } else {
            (prev_time + display_interval).min(self.end_time)
        };

        let ignition_time = self.earliest_ignition_time();
        let active_fire_deltas: Vec<WTimeSpan> = prev
            .active_fires
            .iter()
            .map(|active| {
                let ctx = EndTimeContext {
                    minimum_ros: self.options.minimum_spreading_ros,
                    in_burning_period: self.in_burning_period(active.centroid, prev_time),
                    temporal_threshold_acceleration_secs: if self.options.max_acceleration_timestep_secs < 0.0 {
                        None
                    } else {
                        Some(self.options.max_acceleration_timestep_secs)
                    },
                    spatial_threshold: self.spatial_threshold(active),
                    cardinal_ros_enabled: self.options.cardinal_ros,
                };
                active.calculate_end_time(&ctx)
            })
            .collect();

        let gust_transitions: Vec<WTime> = self
            .gusting
            .next_event_time(prev_time, &self.time_manager, &self.gust_event_context())
            .into_iter()
            .filter(|&t| t <= event_end)
            .collect();

        let landscape_event = prev
            .fires
            .iter()
            .flat_map(|f| f.fronts.iter())
            .flat_map(|fr| fr.points.iter())
            .filter_map(|p| {
                self.cache
                    .next_landscape_event(0, p.position, EventSearchFlags::SEARCH_FORWARD, prev_time)
            })
            .filter(|&t| t <= event_end)
            .min();

        let inputs = EventTimeInputs {
            ignition_times: self.ignition_times.clone(),
            response_time: self.stop_condition.response_time,
            landscape_event,
            vector_source_events: self
                .cache
                .next_vector_source_event(prev_time)
                .into_iter()
                .filter(|&t| t <= event_end)
                .collect(),
            asset_source_events: self
                .cache
                .next_asset_source_event(prev_time)
                .into_iter()
                .filter(|&t| t <= event_end)
                .collect(),
            gust_transitions,
            active_fire_deltas,
        };
        let result = compute_event_time(prev_time, event_end, display_interval, &inputs);
        let step_secs = (result.time - prev_time).as_seconds_f64();

        let gust_ctx = GustContext {
            time: result.time,
            time_manager: self.time_manager,
            prev_gusting: self.prev_gusting,
            rolling_average: rolling_gust_average(&self.gust_history),
        };
        let gusting_fraction = self.gusting.percent_gusting(&gust_ctx);

        // §4.2/4.3.1-2: grow every front, densifying first and sparsifying last.
        let mut fires = prev.fires.clone();
        let mut min_ratio_overall = Fraction::ONE;
        for fire in &mut fires {
            for front in &mut fire.fronts {
                let ratio = self.grow_front(front, result.time, ignition_time, step_secs, gusting_fraction);
                min_ratio_overall = Fraction::clamped(min_ratio_overall.value().min(ratio.value()));
            }
        }

        // §4.3.3/4.3.4: grid and vector-break tracking against pre-advance positions.
        for fire_idx in 0..fires.len() {
            for front_idx in 0..fires[fire_idx].fronts.len() {
                let prev_positions: Vec<XyPoint> = prev.fires[fire_idx].fronts[front_idx]
                    .points
                    .iter()
                    .map(|p| p.position)
                    .collect();
                if fires[fire_idx].fronts[front_idx].points.len() != prev_positions.len() {
                    continue;
                }
                let resolution = self.cache.grid().resolution();
                fires[fire_idx].fronts[front_idx].track_grid(
                    &prev_positions,
                    resolution,
                    |pt| self.cache.is_non_fuel(0, pt, result.time).0,
                    self.options.breaching_enabled,
                );

                let other_polys: Vec<Poly> = fires
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != fire_idx)
                    .flat_map(|(_, f)| f.fronts.iter().map(|fr| fr.polygon()))
                    .collect();
                let other_refs: Vec<&Poly> = other_polys.iter().collect();
                fires[fire_idx].fronts[front_idx].track_vector_other_fires(&prev_positions, &other_refs);

                let bbox = fires[fire_idx].fronts[front_idx]
                    .polygon()
                    .bounds()
                    .unwrap_or_else(|| Rect::from_point(XyPoint::new(0.0, 0.0)));
                let breaks: Vec<&Poly> = self.cache.static_breaks_near(&bbox).map(|b| &b.poly).collect();
                fires[fire_idx].fronts[front_idx].track_vector_breaks(
                    &prev_positions,
                    &breaks,
                    self.options.breaching_enabled,
                    self.options.perimeter_spacing,
                );
            }
        }

        for fire in &mut fires {
            for front in &mut fire.fronts {
                front.simplify(
                    self.options.perimeter_resolution,
                    self.options.perimeter_spacing,
                    self.options.perimeter_resolution,
                    min_ratio_overall,
                );
            }
        }

        // §4.4: untangle each fire, then clip smaller fires and active breaks away.
        let multithread = fires.len() > 4;
        for fire in &mut fires {
            fire.unwind(false, multithread, DEFAULT_FUDGE);
        }

        let active_break_polys: Vec<Poly> = (0..self.cache.static_vector_break_count())
            .filter_map(|i| self.cache.static_vector_break(i))
            .map(|b| b.poly.clone())
            .collect();
        let active_break_refs: Vec<&Poly> = active_break_polys.iter().collect();

        let areas: Vec<f64> = fires.iter().map(ScenarioFire::total_area).collect();
        let mut order: Vec<usize> = (0..fires.len()).collect();
        order.sort_by(|&a, &b| areas[b].total_cmp(&areas[a]));
        let snapshot = fires.clone();
        for &i in &order {
            let larger: Vec<&ScenarioFire> = order.iter().take_while(|&&j| j != i).map(|&j| &snapshot[j]).collect();
            fires[i].unoverlap(&larger, &active_break_refs, multithread, DEFAULT_FUDGE);
        }

        fires.retain(|f| !f.is_empty());
        let active_fires: Vec<ActiveFire> = fires.iter().map(|f| self.active_fire_with_ros(f)).collect();

        self.gust_history.insert(
            0,
            GustHistoryEntry {
                duration: WTimeSpan::from_secs(step_secs as i64),
                gusting: gusting_fraction,
            },
        );
        self.gust_history.truncate(12);
        self.prev_gusting = gusting_fraction;

        let new_step = ScenarioTimeStep::new(result.time, fires, active_fires, result.evented, result.displayable, result.ignitioned);
        self.steps.push(new_step);
        let step_index = StepIndex((self.steps.len() - 1) as u32);

        if let Some(tracker) = &mut self.asset_tracker {
            let assets = self.cache.assets().to_vec();
            tracker.check_step(&assets, self.steps.last().unwrap(), step_index);
        }

        let centroid = self
            .steps
            .last()
            .unwrap()
            .active_fires
            .first()
            .map(|a| a.centroid)
            .unwrap_or(XyPoint::new(0.0, 0.0));
        let can_burn_here = self.in_burning_period(centroid, result.time);
        let stat_inputs = self.stop_stat_inputs();
        let state = self.stop_condition.evaluate_step(&stat_inputs);
        let reason = self
            .stop_condition
            .check_stop(&state, &self.stop_history, &self.ignition_times, result.time, can_burn_here);
        self.stop_history.insert(
            0,
            StepHistoryEntry {
                time: result.time,
                state,
                can_burn: can_burn_here,
            },
        );
        self.stopped = reason;

        for source in &mut self.ignition_sources {
            source.post_calculation_event(result.time);
        }
        self.cache.post_calculation_event(0, result.time, "step");

        Ok(StepOutcome {
            time: result.time,
            evented: result.evented,
            displayable: result.displayable,
            stopped: self.stopped,
        })
    }

    /// §4.2-4.3: densify, sample fuel/weather/terrain, compute FBP rates,
    /// grow the ellipse/Richards velocity at each still-normal vertex, and
    /// advance the front by the step duration. Returns the front's minimum
    /// ROS ratio, used to gate `simplify`.
    fn grow_front(
        &self,
        front: &mut FireFront,
        time: WTime,
        ignition_time: WTime,
        step_secs: f64,
        gusting: Fraction,
    ) -> Fraction {
        front.add_points(self.options.perimeter_resolution, self.options.suppress_tight_concave_addpoint);

        let n = front.points.len();
        let mut min_ratio = Fraction::ONE;
        let positions: Vec<XyPoint> = front.points.iter().map(|p| p.position).collect();

        for i in 0..n {
            if front.points[i].status != PointStatus::Normal {
                continue;
            }
            let prev_idx = if i == 0 { n - 1 } else { i - 1 };
            let next_idx = if i + 1 < n { i + 1 } else { 0 };
            let curr = positions[i];
            let prev = positions[prev_idx];
            let succ = positions[next_idx];

            let (fuel, fuel_validity) = self.cache.get_fuel(0, curr, time);
            let Some(fuel) = fuel.filter(|_| fuel_validity.is_valid()) else {
                front.points[i].mark_inert(PointStatus::NoFuel);
                continue;
            };
            if self.cache.is_non_fuel(0, curr, time).0 {
                front.points[i].mark_inert(PointStatus::NoFuel);
                continue;
            }

            let (elevation, aspect, azimuth, _, _) = self.cache.get_elevation(0, curr, true);
            let (iwx, ifwi, dfwi, weather_valid) = self.cache.get_weather(0, curr, time, self.interp_flags());
            if !weather_valid.is_valid() {
                front.points[i].mark_inert(PointStatus::NoWind);
                continue;
            }

            let wind_speed = KilometersPerHour::new(apply_gusting(iwx.wind_speed.value(), iwx.wind_gust.value(), gusting));
            let wind_direction = match &self.target {
                Some(target) => match target.get_target(0, 0) {
                    Some(t) => target_wind_direction(curr, t, self.options.dwd),
                    None => Degrees(self.base_wind_direction(iwx.wind_direction).value() + self.options.dwd.value()),
                },
                None => Degrees(self.base_wind_direction(iwx.wind_direction).value() + self.options.dwd.value()),
            };

            let fmc = self.options.specified_fmc.unwrap_or_else(|| {
                self.cache
                    .fmc(fuel, curr.y, curr.x, elevation, time.day_of_year(&self.time_manager))
            });

            let accel_dt = if self.options.acceleration_enabled && self.primary_ignition_kind == IgnitionType::Point {
                let elapsed = (time - ignition_time).as_seconds_f64();
                let clamped = acceleration_dt(Seconds(elapsed as f32), Seconds(0.0));
                WTimeSpan::from_secs(clamped.0 as i64)
            } else {
                WTimeSpan::from_secs(3600)
            };

            let ros = self.cache.calculate_ros(
                fuel,
                aspect,
                azimuth,
                wind_speed,
                wind_direction,
                dfwi.bui,
                fmc,
                ifwi.ffmc,
                1.0,
                accel_dt,
                Fraction::ONE,
            );

            if ros.ros < self.options.minimum_spreading_ros.value() {
                front.points[i].mark_inert(PointStatus::NoRos);
                continue;
            }

            let fc = self.cache.calculate_fc(fuel, ifwi.ffmc, dfwi.bui, fmc, ros.rsi, ros.ros);
            let ratio = if ros.roseq.abs() > 1e-6 {
                Fraction::clamped(ros.rsi / ros.roseq)
            } else {
                Fraction::ONE
            };
            min_ratio = Fraction::clamped(min_ratio.value().min(ratio.value()));

            let rates = EllipseRates {
                ros: MetersPerMinute(ros.ros),
                fros: MetersPerMinute(ros.fros),
                bros: MetersPerMinute(ros.bros),
                raz: ros.raz,
            };

            let velocity = match self.options.growth_mode {
                GrowthMode::Elliptical => grow2d(curr, prev, succ, rates),
                GrowthMode::Richards3D => {
                    let (elev_prev, ..) = self.cache.get_elevation(0, prev, false);
                    let (elev_succ, ..) = self.cache.get_elevation(0, succ, false);
                    let curr3 = XyzPoint::new(curr.x, curr.y, f64::from(elevation.value()));
                    let prev3 = XyzPoint::new(prev.x, prev.y, f64::from(elev_prev.value()));
                    let succ3 = XyzPoint::new(succ.x, succ.y, f64::from(elev_succ.value()));
                    let rise = f64::from(elev_succ.value() - elev_prev.value());
                    let run = (succ - prev).norm().max(1e-6);
                    grow3d(curr3, prev3, succ3, aspect, (rise / run).abs(), rates)
                }
            };

            let Some(velocity) = velocity else {
                front.points[i].mark_inert(PointStatus::NoRos);
                continue;
            };

            front.points[i].ellipse_ros = velocity;
            front.points[i].flame_length = flame_length_from_fi(fc.fi);

            let vector_ros = front.points[i].vector_ros_magnitude();
            let vector_fc = self.cache.calculate_fc(fuel, ifwi.ffmc, dfwi.bui, fmc, ros.rsi, vector_ros as f32);

            front.points[i].fbp = FbpScalars {
                raz: ros.raz,
                rsi: ros.rsi,
                roseq: ros.roseq,
                ros: ros.ros,
                fros: ros.fros,
                bros: ros.bros,
                ros_ratio: ratio,
                cfb: fc.cfb,
                fi: fc.fi,
            };
            front.points[i].vector = VectorScalars {
                ros: MetersPerMinute(vector_ros as f32),
                cfb: vector_fc.cfb,
                cfc: vector_fc.cfc,
                sfc: vector_fc.sfc,
                tfc: vector_fc.tfc,
                fi: vector_fc.fi,
            };
        }

        front.advance(Seconds(step_secs as f32), self.cache.grid());
        min_ratio
    }

    fn stop_stat_inputs(&self) -> StepStatInputs {
        let step = self.steps.last().expect("step always called with at least one prior step");
        let all_fi: Vec<f32> = step
            .fires
            .iter()
            .flat_map(|f| f.fronts.iter())
            .flat_map(|fr| fr.points.iter())
            .map(|p| p.fbp.fi)
            .collect();
        let percent_below = |threshold: f32| -> Option<f64> {
            if all_fi.is_empty() {
                return None;
            }
            let below = all_fi.iter().filter(|&&fi| fi <= threshold).count();
            Some(below as f64 / all_fi.len() as f64 * 100.0)
        };

        let area_m2 = Some(step.total_area() * self.cache.grid().resolution().powi(2));
        let burn_distance_m = step
            .active_fires
            .iter()
            .map(|a| a.bounds.width().max(a.bounds.height()) * self.cache.grid().resolution())
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))));

        let precip_mm = step.active_fires.first().map(|a| {
            let (iwx, _, _, _) = self.cache.get_weather(0, a.centroid, step.time, InterpFlags::EMPTY);
            f64::from(iwx.precip.value()) * 1000.0
        });

        let rh_holds = match self.options.stop_rh {
            Some(stop_rh) => step.active_fires.first().map_or(true, |a| {
                let (iwx, _, _, _) = self.cache.get_weather(0, a.centroid, step.time, InterpFlags::EMPTY);
                iwx.rh.value() >= stop_rh.threshold.value()
            }),
            None => true,
        };

        StepStatInputs {
            fi90_stat: self.stop_condition.fi90.and_then(|t| percent_below(t.fi_threshold as f32)),
            fi95_stat: self.stop_condition.fi95.and_then(|t| percent_below(t.fi_threshold as f32)),
            fi100_stat: self.stop_condition.fi100.and_then(|t| percent_below(t.fi_threshold as f32)),
            precip_mm,
            area_m2,
            burn_distance_m,
            rh_holds,
        }
    }

    pub fn step_back(&mut self) -> CoreResult<()> {
        if self.steps.len() <= 1 {
            return Err(CoreError::BadState("cannot step back past ignition"));
        }
        self.steps.pop();
        if !self.stop_history.is_empty() {
            self.stop_history.remove(0);
        }
        self.stopped = None;
        self.cache.clear_caches();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.stop_history.clear();
        self.ignition_times.clear();
        self.stopped = None;
        self.prev_gusting = Fraction::ZERO;
        self.gust_history.clear();
        self.cache.clear_caches();
    }

    // ---- §4.7 critical path / §4.8 asset queries ----------------------------

    pub fn critical_path_for_asset(&self, asset_index: usize) -> CoreResult<Vec<CriticalPathPoint>> {
        let tracker = self
            .asset_tracker
            .as_ref()
            .ok_or(CoreError::BadState("asset tracking not enabled"))?;
        let arrival = tracker
            .arrival(asset_index)
            .ok_or(CoreError::AssetUnknown(asset_index as u32))?;
        let start = arrival.closest_fire_point.ok_or(CoreError::AssetNotArrived(asset_index as u32))?;
        Ok(critical_path(&self.steps, start))
    }

    // ---- §4.6 stats queries --------------------------------------------------

    /// Evaluate `stat` at `target` (internal coordinates) using `technique`.
    pub fn query_stat(&self, target: XyPoint, stat: PointStat, technique: StatTechnique) -> CoreResult<f64> {
        let step = self.steps.last().ok_or(CoreError::NoFires)?;
        let start_radius =
            2.0 * f64::from(self.options.perimeter_resolution.value()).max(f64::from(self.options.distance_resolution.value()));

        if technique == StatTechnique::Calculate {
            let synthetic = self.evaluate_at_point(target, step.time)?;
            return Ok(stat.read(&synthetic));
        }

        let candidates: Vec<(XyPoint, &FirePoint)> = step
            .fires
            .iter()
            .flat_map(|f| f.fronts.iter())
            .flat_map(|fr| fr.points.iter().map(|p| (p.position, p)))
            .collect();
        let positions: Vec<XyPoint> = candidates.iter().map(|&(p, _)| p).collect();

        match technique {
            StatTechnique::ClosestVertex => {
                let values: Vec<(XyPoint, f64)> = candidates.iter().map(|&(p, fp)| (p, stat.read(fp))).collect();
                stats::closest_vertex_value(target, &values).ok_or(CoreError::PointNotInFire)
            }
            StatTechnique::Discretize => {
                let cell = Rect::from_point(target).inflate(start_radius);
                if stat == PointStat::BurnedFraction {
                    Ok(stats::discretize_burned_fraction(cell, 10, |p| point_in_any_fire(step, p)))
                } else {
                    let values: Vec<(XyPoint, f64)> = candidates.iter().map(|&(p, fp)| (p, stat.read(fp))).collect();
                    Ok(stats::discretize_average(cell, 10, |p| {
                        stats::idw(p, &values, 2.0).unwrap_or(0.0)
                    }))
                }
            }
            StatTechnique::Idw | StatTechnique::AreaWeighting | StatTechnique::VoronoiOverlap => {
                let (neighbor_idx, _radius) = stats::gather_neighbors(target, &positions, start_radius);
                let neighbors: Vec<(XyPoint, f64)> = neighbor_idx
                    .iter()
                    .map(|&i| (candidates[i].0, stat.read(candidates[i].1)))
                    .collect();
                let result = match technique {
                    StatTechnique::Idw => stats::idw(target, &neighbors, 2.0),
                    StatTechnique::AreaWeighting => {
                        let cell = Rect::from_point(target).inflate(start_radius);
                        stats::area_weighting(cell, &neighbors)
                    }
                    StatTechnique::VoronoiOverlap => stats::voronoi_overlap(target, &neighbors),
                    _ => unreachable!(),
                };
                result.ok_or(CoreError::PointNotInFire)
            }
            StatTechnique::Calculate => unreachable!("handled above"),
        }
    }

    /// §4.6 `CALCULATE`: evaluate FBP directly at `pt` without reference to
    /// any burning vertex.
    fn evaluate_at_point(&self, pt: XyPoint, time: WTime) -> CoreResult<FirePoint> {
        let (fuel, fuel_validity) = self.cache.get_fuel(0, pt, time);
        let fuel = fuel.filter(|_| fuel_validity.is_valid()).ok_or(CoreError::PointNotInFire)?;
        let (elevation, aspect, azimuth, _, _) = self.cache.get_elevation(0, pt, true);
        let (iwx, ifwi, dfwi, weather_valid) = self.cache.get_weather(0, pt, time, self.interp_flags());
        if !weather_valid.is_valid() {
            return Err(CoreError::PointNotInFire);
        }
        let wind_direction = self.base_wind_direction(iwx.wind_direction);
        let fmc = self
            .options
            .specified_fmc
            .unwrap_or_else(|| self.cache.fmc(fuel, pt.y, pt.x, elevation, time.day_of_year(&self.time_manager)));
        let ros = self.cache.calculate_ros(
            fuel,
            aspect,
            azimuth,
            iwx.wind_speed,
            wind_direction,
            dfwi.bui,
            fmc,
            ifwi.ffmc,
            1.0,
            WTimeSpan::from_secs(3600),
            Fraction::ONE,
        );
        let fc = self.cache.calculate_fc(fuel, ifwi.ffmc, dfwi.bui, fmc, ros.rsi, ros.ros);
        let mut point = FirePoint::new(pt);
        point.fbp = FbpScalars {
            raz: ros.raz,
            rsi: ros.rsi,
            roseq: ros.roseq,
            ros: ros.ros,
            fros: ros.fros,
            bros: ros.bros,
            ros_ratio: Fraction::ONE,
            cfb: fc.cfb,
            fi: fc.fi,
        };
        point.vector = VectorScalars {
            ros: MetersPerMinute(ros.ros),
            cfb: fc.cfb,
            cfc: fc.cfc,
            sfc: fc.sfc,
            tfc: fc.tfc,
            fi: fc.fi,
        };
        Ok(point)
    }

    // ---- §4.6 straight-lookup queries ---------------------------------------

    /// Latest displayable step's time, or `None` before `ignite()`.
    pub fn current_time(&self) -> Option<WTime> {
        self.steps.iter().rev().find(|s| s.displayable).map(|s| s.time)
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    /// Number of fires alive at the latest step.
    pub fn num_fires(&self) -> usize {
        self.current_step().map_or(0, |s| s.fires.len())
    }

    /// The ignition time recorded for the `index`-th fire seeded by `ignite()`.
    pub fn ignition_at_fire_index(&self, index: usize) -> CoreResult<WTime> {
        self.ignition_times.get(index).copied().ok_or(CoreError::FireUnknown(index as u32))
    }

    fn front_at(&self, fire_index: usize, front_index: usize) -> CoreResult<&FireFront> {
        let step = self.current_step().ok_or(CoreError::NoFires)?;
        let fire = step.fires.get(fire_index).ok_or(CoreError::FireUnknown(fire_index as u32))?;
        fire.fronts.get(front_index).ok_or(CoreError::FireUnknown(front_index as u32))
    }

    /// Vertex count of one front of the latest step.
    pub fn vector_size(&self, fire_index: usize, front_index: usize) -> CoreResult<usize> {
        Ok(self.front_at(fire_index, front_index)?.points.len())
    }

    /// Vertex positions of one front of the latest step, in internal coordinates.
    pub fn vector_array(&self, fire_index: usize, front_index: usize) -> CoreResult<Vec<XyPoint>> {
        Ok(self.front_at(fire_index, front_index)?.points.iter().map(|p| p.position).collect())
    }

    /// Every vertex's `stat` value across every fire/front of the latest step.
    pub fn stats_array(&self, stat: PointStat) -> Vec<f64> {
        let Some(step) = self.current_step() else {
            return Vec::new();
        };
        step.fires
            .iter()
            .flat_map(|f| f.fronts.iter())
            .flat_map(|fr| fr.points.iter())
            .map(|p| stat.read(p))
            .collect()
    }

    /// Mean of `stat` across every vertex of the latest step.
    pub fn stats(&self, stat: PointStat) -> Option<f64> {
        let values = self.stats_array(stat);
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// Percentage of vertices whose `stat` is at or below `threshold`, at the
    /// latest step.
    pub fn stats_percentage(&self, stat: PointStat, threshold: f64) -> Option<f64> {
        let values = self.stats_array(stat);
        if values.is_empty() {
            return None;
        }
        let below = values.iter().filter(|&&v| v <= threshold).count();
        Some(below as f64 / values.len() as f64 * 100.0)
    }

    /// The nearest displayable step at or before `time`, if any has run yet.
    fn step_at_or_before(&self, time: WTime) -> Option<&ScenarioTimeStep> {
        self.steps.iter().rev().filter(|s| s.displayable).find(|s| s.time <= time)
    }

    /// Point-in-polygon test against the nearest displayable step at or
    /// before `time`.
    pub fn point_burned(&self, pt: XyPoint, time: WTime) -> bool {
        self.step_at_or_before(time).is_some_and(|step| point_in_any_fire(step, pt))
    }

    /// Bounding-box union of every fire at the nearest displayable step at or
    /// before `time`.
    pub fn burning_box(&self, time: WTime) -> Option<Rect> {
        let step = self.step_at_or_before(time)?;
        step.active_fires
            .iter()
            .map(|a| a.bounds)
            .fold(None, |acc: Option<Rect>, b| Some(acc.map_or(b, |a| a.union(&b))))
    }

    // ---- §4.6.1 export rule table --------------------------------------------

    /// Walk `rules` once per vertex of `step_index`, copying only enabled
    /// fields in table order into a flat, schema-agnostic record. The CORE
    /// never writes a file; the serialization layer consumes these records.
    pub fn export_time_step(&self, step_index: usize, rules: &[ExportRule]) -> CoreResult<Vec<ExportedFeature>> {
        let step = self.steps.get(step_index).ok_or(CoreError::BadState("step index out of range"))?;
        let enabled: Vec<ExportField> = rules.iter().filter(|r| r.enabled).map(|r| r.field).collect();

        let mut features = Vec::new();
        for (fire_index, fire) in step.fires.iter().enumerate() {
            for (front_index, front) in fire.fronts.iter().enumerate() {
                let records = front
                    .points
                    .iter()
                    .map(|p| enabled.iter().map(|&field| export_value(field, p)).collect())
                    .collect();
                features.push(ExportedFeature {
                    fire_index,
                    front_index,
                    closed: front.closed,
                    records,
                });
            }
        }
        Ok(features)
    }
}

/// A per-vertex scalar of `FirePoint` (§3), or the vertex's own geometry,
/// that the export rule table can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportField {
    Geometry,
    Status,
    FlameLength,
    SuccessfulBreach,
    Stat(PointStat),
}

/// One row of the export rule table: whether `field` is copied into each
/// exported record, and in what order relative to the other rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRule {
    pub field: ExportField,
    pub enabled: bool,
}

/// One exported value, tagged by the kind of data it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Point(XyPoint),
    Scalar(f64),
    Status(PointStatus),
    Bool(bool),
}

fn export_value(field: ExportField, point: &FirePoint) -> ExportValue {
    match field {
        ExportField::Geometry => ExportValue::Point(point.position),
        ExportField::Status => ExportValue::Status(point.status),
        ExportField::FlameLength => ExportValue::Scalar(f64::from(point.flame_length)),
        ExportField::SuccessfulBreach => ExportValue::Bool(point.successful_breach),
        ExportField::Stat(stat) => ExportValue::Scalar(stat.read(point)),
    }
}

/// One front's per-vertex export records, in rule-table field order.
#[derive(Debug, Clone)]
pub struct ExportedFeature {
    pub fire_index: usize,
    pub front_index: usize,
    pub closed: bool,
    pub records: Vec<Vec<ExportValue>>,
}

fn point_in_any_fire(step: &ScenarioTimeStep, p: XyPoint) -> bool {
    step.fires.iter().any(|f| f.fronts.iter().any(|fr| point_in_ring(p, &fr.polygon())))
}

/// Byram's fireline intensity -> flame length (metric form), used only to
/// populate `FirePoint::flame_length` for the breach-allowance calculations
/// in `fire_front.rs`.
fn flame_length_from_fi(fi: f32) -> f32 {
    if fi <= 0.0 {
        0.0
    } else {
        0.0775 * fi.powf(0.46)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{AttributeId, AttributeValue, DfwiData, FcValues, FuelHandle, IfwiData, IwxData, RosValues, Validity};
    use crate::units::Celsius;

    struct FlatLandscape;
    impl crate::providers::LandscapeProvider for FlatLandscape {
        fn get_fuel(&self, _layer: u32, _pt: XyPoint, _time: WTime) -> (Option<FuelHandle>, Validity) {
            (Some(FuelHandle(1)), Validity::Valid)
        }
        fn get_attribute(
            &self,
            _layer: u32,
            _pt: XyPoint,
            _time: WTime,
            _span: WTimeSpan,
            _attr: AttributeId,
            _flags: u32,
        ) -> (Option<AttributeValue>, Validity) {
            (None, Validity::Invalid)
        }
        fn get_elevation(&self, _layer: u32, _pt: XyPoint, _want_azimuth: bool) -> (Meters, Degrees, Degrees, Validity, Validity) {
            (Meters::new(0.0), Degrees::new(0.0), Degrees::new(0.0), Validity::Valid, Validity::Valid)
        }
        fn get_weather(&self, _layer: u32, _pt: XyPoint, _time: WTime, _interp: InterpFlags) -> (IwxData, IfwiData, DfwiData, Validity) {
            (
                IwxData {
                    temp: Celsius::new(25.0),
                    rh: Percent::new(30.0),
                    wind_speed: KilometersPerHour::new(10.0),
                    wind_gust: KilometersPerHour::new(10.0),
                    wind_direction: Degrees::new(0.0),
                    precip: Meters::new(0.0),
                },
                IfwiData { ffmc: 90.0, isi: 10.0, fwi: 20.0 },
                DfwiData { dmc: 30.0, dc: 200.0, bui: 50.0 },
                Validity::Valid,
            )
        }
        fn pre_calculation_event(&mut self, _layer: u32, _time: WTime, _phase: &str) {}
        fn post_calculation_event(&mut self, _layer: u32, _time: WTime, _phase: &str) {}
        fn get_event_time(&self, _layer: u32, _pt: XyPoint, _flags: EventSearchFlags, _from: WTime) -> Option<WTime> {
            None
        }
    }

    struct ConstantFuel;
    impl crate::providers::FuelModel for ConstantFuel {
        fn calculate_ros_values(
            &self,
            _fuel: FuelHandle,
            _aspect: Degrees,
            _azimuth: Degrees,
            _wsv: KilometersPerHour,
            _wdir: Degrees,
            _bui: f32,
            _fmc: Percent,
            _ffmc: f32,
            _ff: f32,
            _accel_dt: WTimeSpan,
            _day_portion: Fraction,
        ) -> RosValues {
            RosValues { rsi: 50.0, roseq: 50.0, ros: 50.0, fros: 30.0, bros: 10.0, raz: Degrees::new(0.0) }
        }
        fn calculate_fc_values(&self, _fuel: FuelHandle, _ffmc: f32, _bui: f32, _fmc: Percent, _rsi: f32, _ros: f32) -> FcValues {
            FcValues { cfb: Fraction::ZERO, cfc: 0.0, rso: 0.0, csi: 0.0, sfc: 1.0, tfc: 1.0, fi: 500.0 }
        }
        fn fmc(&self, _fuel: FuelHandle, _lat: f64, _lon: f64, _elev: Meters, _doy: u16) -> Percent {
            Percent::new(100.0)
        }
        fn is_non_fuel(&self, _fuel: FuelHandle) -> bool {
            false
        }
        fn is_grass(&self, _fuel: FuelHandle) -> bool {
            false
        }
        fn is_mixed(&self, _fuel: FuelHandle) -> bool {
            false
        }
        fn is_mixed_dead_fir(&self, _fuel: FuelHandle) -> bool {
            false
        }
        fn is_c6(&self, _fuel: FuelHandle) -> bool {
            false
        }
    }

    struct PointIgnition;
    impl IgnitionSource for PointIgnition {
        fn ignition_count(&self) -> usize {
            1
        }
        fn ignition_size(&self, _index: usize) -> usize {
            1
        }
        fn get_ignition(&self, _index: usize) -> (IgnitionType, Poly) {
            (IgnitionType::Point, Poly::new(vec![XyPoint::new(0.0, 0.0)], false))
        }
        fn valid(&self, _start: WTime, _duration: WTimeSpan) -> bool {
            true
        }
        fn pre_calculation_event(&mut self, _time: WTime) {}
        fn post_calculation_event(&mut self, _time: WTime) {}
    }

    fn make_scenario() -> Scenario {
        let cache = ScenarioCache::new(GridCache::new(XyPoint::new(0.0, 0.0), 1.0), Box::new(FlatLandscape), Box::new(ConstantFuel));
        let options = ScenarioOptions::default();
        let mut scenario = Scenario::new(options, cache, TimeManager::default(), WTime::from_unix_secs(0), WTime::from_unix_secs(86_400)).unwrap();
        scenario.add_ignition_source(Box::new(PointIgnition));
        scenario
    }

    #[test]
    fn ignite_seeds_a_single_growing_fire() {
        let mut scenario = make_scenario();
        scenario.ignite().unwrap();
        assert_eq!(scenario.steps.len(), 1);
        assert!(scenario.current_step().unwrap().total_area() > 0.0);
    }

    #[test]
    fn step_advances_time_and_grows_area() {
        let mut scenario = make_scenario();
        scenario.ignite().unwrap();
        let initial_area = scenario.current_step().unwrap().total_area();
        let outcome = scenario.step().unwrap();
        assert!(outcome.time > WTime::from_unix_secs(0));
        assert!(scenario.current_step().unwrap().total_area() >= initial_area);
    }

    #[test]
    fn step_back_restores_the_previous_step() {
        let mut scenario = make_scenario();
        scenario.ignite().unwrap();
        scenario.step().unwrap();
        assert_eq!(scenario.steps.len(), 2);
        scenario.step_back().unwrap();
        assert_eq!(scenario.steps.len(), 1);
    }

    #[test]
    fn step_before_ignite_reports_no_fires() {
        let mut scenario = make_scenario();
        assert_eq!(scenario.step(), Err(CoreError::NoFires));
    }

    #[test]
    fn area_stop_condition_eventually_halts_the_scenario() {
        let mut scenario = make_scenario();
        scenario.options.stop_area = Some(crate::options::StopThreshold::new(1.0, 0));
        scenario.set_stop_condition(Scenario::stop_condition_from_options(&scenario.options));
        scenario.ignite().unwrap();
        for _ in 0..50 {
            if scenario.is_stopped() {
                break;
            }
            scenario.step().unwrap();
        }
        assert!(scenario.is_stopped());
        assert_eq!(scenario.stop_reason(), Some(StopReason::Area));
    }

    #[test]
    fn query_stat_calculate_reads_fbp_at_an_unburned_point() {
        let mut scenario = make_scenario();
        scenario.ignite().unwrap();
        let fi = scenario
            .query_stat(XyPoint::new(500.0, 500.0), PointStat::Fi, StatTechnique::Calculate)
            .unwrap();
        assert!((fi - 500.0).abs() < 1e-6);
    }

    #[test]
    fn straight_lookups_reflect_the_latest_step() {
        let mut scenario = make_scenario();
        scenario.ignite().unwrap();
        assert_eq!(scenario.num_steps(), 1);
        assert_eq!(scenario.num_fires(), 1);
        assert_eq!(scenario.ignition_at_fire_index(0).unwrap(), WTime::from_unix_secs(0));
        assert!(scenario.ignition_at_fire_index(1).is_err());

        let size = scenario.vector_size(0, 0).unwrap();
        assert!(size >= 3);
        let positions = scenario.vector_array(0, 0).unwrap();
        assert_eq!(positions.len(), size);

        scenario.step().unwrap();
        let fi_values = scenario.stats_array(PointStat::Fi);
        assert!(!fi_values.is_empty());
        assert!(scenario.stats(PointStat::Fi).unwrap() > 0.0);
        assert_eq!(scenario.stats_percentage(PointStat::Fi, f64::MAX), Some(100.0));
    }

    #[test]
    fn point_burned_and_burning_box_track_the_nearest_earlier_step() {
        let mut scenario = make_scenario();
        scenario.ignite().unwrap();
        let ignition_time = scenario.current_time().unwrap();
        assert!(scenario.point_burned(XyPoint::new(0.0, 0.0), ignition_time));
        assert!(!scenario.point_burned(XyPoint::new(1.0e6, 1.0e6), ignition_time));
        assert!(scenario.burning_box(ignition_time).unwrap().contains(XyPoint::new(0.0, 0.0)));

        scenario.step().unwrap();
        let later = scenario.current_time().unwrap();
        // A query for a time between the two steps still resolves to the
        // nearest displayable step at or before it, not the later one.
        assert_eq!(scenario.point_burned(XyPoint::new(0.0, 0.0), ignition_time), scenario.point_burned(XyPoint::new(0.0, 0.0), later - WTimeSpan::from_secs(1)));
    }

    #[test]
    fn export_time_step_copies_only_enabled_fields_in_table_order() {
        let mut scenario = make_scenario();
        scenario.ignite().unwrap();
        let rules = [
            ExportRule { field: ExportField::Geometry, enabled: true },
            ExportRule { field: ExportField::Stat(PointStat::Fi), enabled: false },
            ExportRule { field: ExportField::Status, enabled: true },
        ];
        let features = scenario.export_time_step(0, &rules).unwrap();
        assert_eq!(features.len(), 1);
        let feature = &features[0];
        assert_eq!(feature.fire_index, 0);
        assert_eq!(feature.front_index, 0);
        assert!(feature.closed);
        for record in &feature.records {
            assert_eq!(record.len(), 2);
            assert!(matches!(record[0], ExportValue::Point(_)));
            assert!(matches!(record[1], ExportValue::Status(_)));
        }
        assert!(scenario.export_time_step(99, &rules).is_err());
    }
}
