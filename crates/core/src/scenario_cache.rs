//! `ScenarioCache` (§4.6 step 2): the landscape/fuel/vector-break/asset
//! collaborators, the coordinate converter, and the one-time static-break and
//! asset builds, bundled behind one owner so growth code only ever reaches
//! one seam for "ask the outside world something".
//!
//! Grounded in `firestatecache.h`'s `ScenarioGridCache`/`ScenarioCache`: that
//! pair bundles exactly these jobs (fuel/non-fuel queries, asset
//! enumeration, static-break construction, UTM<->internal conversion,
//! burning-condition gating) behind one object so the rest of the engine
//! never touches a provider directly. `m_pool` (`CWorkerThreadPool`) is
//! realised here with a `rayon::ThreadPool` rather than a hand-rolled one,
//! matching the crate's existing use of `rayon` for other data-parallel
//! passes (see [`crate::geom::polyset`]).

use crate::geom::point::{Rect, XyPoint};
use crate::geom::point_in_ring;
use crate::geom::poly::Poly;
use crate::grid_cache::GridCache;
use crate::providers::{
    AssetSource, AssetType, AttributeId, AttributeValue, FcValues, FuelHandle, FuelModel, IfwiData,
    InterpFlags, IwxData, DfwiData, LandscapeProvider, RosValues, Validity, VectorSource,
};
use crate::time::{WTime, WTimeSpan};
use crate::units::{Degrees, Fraction, KilometersPerHour, Meters, Percent};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// One static (time-invariant) vector break, pre-clipped to its own bounding
/// box so later containment tests can bbox-reject before touching the ring.
#[derive(Debug, Clone)]
pub struct StaticBreak {
    pub set: usize,
    pub bounds: Rect,
    pub poly: Poly,
}

/// One asset's geometry, enumerated once at scenario start; assets are
/// static targets for the life of the run (§4.7/§4.8 never re-fetch one).
#[derive(Debug, Clone)]
pub struct AssetGeometry {
    pub set: usize,
    pub index: usize,
    pub kind: AssetType,
    pub bounds: Rect,
    pub poly: Poly,
}

/// Grid-layer overrides folded into a vertex's FBP call, pulled from the
/// PDF/PC/%cure/CBH attribute layers when the landscape carries them.
/// Reprojecting a differently-gridded override layer (`CCoordinateConverter`
/// in the original) is a spatial-reference concern and out of scope here,
/// same as `CoreError::ProjectionUnknown`; overrides are only honoured when
/// sampled from the same grid the fuel type came from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FuelOverrides {
    pub pc: Option<Percent>,
    pub pdf: Option<Percent>,
    pub curing_degree: Option<Percent>,
    pub cbh: Option<f32>,
}

/// Key for the fuel-handle memo table: grid cell plus layer, since different
/// layers may disagree at the same point.
type FuelCacheKey = (i64, i64, u32);

/// Bundles a `LandscapeProvider`, its `FuelModel`, every `VectorSource` and
/// `AssetSource`, the coordinate converter (`GridCache`), and an optional
/// worker pool behind one handle.
pub struct ScenarioCache {
    grid: GridCache,
    landscape: Box<dyn LandscapeProvider + Send + Sync>,
    fuel_model: Box<dyn FuelModel + Send + Sync>,
    vector_sources: Vec<Box<dyn VectorSource + Send + Sync>>,
    asset_sources: Vec<Box<dyn AssetSource + Send + Sync>>,
    static_breaks: Vec<StaticBreak>,
    assets: Vec<AssetGeometry>,
    fuel_cache: RwLock<FxHashMap<FuelCacheKey, (Option<FuelHandle>, Validity)>>,
    fuel_cache_enabled: bool,
    pool: Option<rayon::ThreadPool>,
}

impl ScenarioCache {
    pub fn new(
        grid: GridCache,
        landscape: Box<dyn LandscapeProvider + Send + Sync>,
        fuel_model: Box<dyn FuelModel + Send + Sync>,
    ) -> Self {
        ScenarioCache {
            grid,
            landscape,
            fuel_model,
            vector_sources: Vec::new(),
            asset_sources: Vec::new(),
            static_breaks: Vec::new(),
            assets: Vec::new(),
            fuel_cache: RwLock::new(FxHashMap::default()),
            fuel_cache_enabled: true,
            pool: None,
        }
    }

    pub fn add_vector_source(&mut self, source: Box<dyn VectorSource + Send + Sync>) {
        self.vector_sources.push(source);
    }

    pub fn add_asset_source(&mut self, source: Box<dyn AssetSource + Send + Sync>) {
        self.asset_sources.push(source);
    }

    pub fn grid(&self) -> &GridCache {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut GridCache {
        &mut self.grid
    }

    /// Builds (or rebuilds) the worker pool. `multithread == false` leaves
    /// the pool unset, and every `ScenarioCache` method runs sequentially on
    /// the caller's thread.
    pub fn init_thread_pool(&mut self, multithread: bool, num_threads: usize) {
        self.pool = if multithread {
            rayon::ThreadPoolBuilder::new()
                .num_threads(num_threads)
                .build()
                .ok()
        } else {
            None
        };
    }

    /// Runs `f` on the configured pool if one exists, otherwise inline.
    pub fn with_pool<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    // ---- static vector breaks -------------------------------------------------

    pub fn static_vector_break_count(&self) -> usize {
        self.static_breaks.len()
    }

    pub fn static_vector_break(&self, index: usize) -> Option<&StaticBreak> {
        self.static_breaks.get(index)
    }

    /// §4.6 step 2: one-time build, in internal coordinates, bounding-boxed.
    /// No-op if already built (`static_breaks` non-empty) or no source has
    /// any static geometry at `time`.
    pub fn build_static_vector_breaks(&mut self, time: WTime) {
        if !self.static_breaks.is_empty() {
            return;
        }
        for (set_idx, source) in self.vector_sources.iter().enumerate() {
            for idx in 0..source.fire_break_size(set_idx) {
                let Some(utm_poly) = source.get_fire_break(set_idx, idx, time) else {
                    continue;
                };
                let points: Vec<XyPoint> = utm_poly
                    .points
                    .iter()
                    .map(|&p| self.grid.to_internal(p))
                    .collect();
                let Some(bounds) = Poly::new(points.clone(), utm_poly.closed).bounds() else {
                    continue;
                };
                self.static_breaks.push(StaticBreak {
                    set: set_idx,
                    bounds,
                    poly: Poly::new(points, utm_poly.closed),
                });
            }
        }
    }

    /// §4.6 step 2: one-time asset enumeration, same internal-coordinate
    /// convention as the static breaks.
    pub fn build_assets(&mut self, time: WTime) {
        if !self.assets.is_empty() {
            return;
        }
        for (set_idx, source) in self.asset_sources.iter().enumerate() {
            for idx in 0..source.asset_size(set_idx) {
                let Some((kind, utm_poly)) = source.get_asset(set_idx, idx, time) else {
                    continue;
                };
                let points: Vec<XyPoint> = utm_poly
                    .points
                    .iter()
                    .map(|&p| self.grid.to_internal(p))
                    .collect();
                let Some(bounds) = Poly::new(points.clone(), utm_poly.closed).bounds() else {
                    continue;
                };
                self.assets.push(AssetGeometry {
                    set: set_idx,
                    index: idx,
                    kind,
                    bounds,
                    poly: Poly::new(points, utm_poly.closed),
                });
            }
        }
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn assets(&self) -> &[AssetGeometry] {
        &self.assets
    }

    /// Every static break whose bounding box overlaps `bbox`, bbox-rejected
    /// first per the original's per-fire clip pass.
    pub fn static_breaks_near(&self, bbox: &Rect) -> impl Iterator<Item = &StaticBreak> {
        self.static_breaks
            .iter()
            .filter(move |b| b.bounds.intersects(bbox))
    }

    // ---- fuel / non-fuel -------------------------------------------------

    pub fn enable_fuel_cache(&mut self, enabled: bool) {
        self.fuel_cache_enabled = enabled;
        if !enabled {
            self.fuel_cache.write().clear();
        }
    }

    /// Clears every cache that must not survive a rewind: the grid's
    /// closest-point memo and the fuel-handle memo.
    pub fn clear_caches(&mut self) {
        self.grid.clear();
        self.fuel_cache.write().clear();
    }

    pub fn get_fuel(&self, layer: u32, pt: XyPoint, time: WTime) -> (Option<FuelHandle>, Validity) {
        if !self.fuel_cache_enabled {
            return self.landscape.get_fuel(layer, pt, time);
        }
        let cell = self.grid.cell_index(self.grid.to_utm(pt));
        let key = (cell.0, cell.1, layer);
        if let Some(&cached) = self.fuel_cache.read().get(&key) {
            return cached;
        }
        let result = self.landscape.get_fuel(layer, pt, time);
        self.fuel_cache.write().insert(key, result);
        result
    }

    pub fn is_non_fuel(&self, layer: u32, pt: XyPoint, time: WTime) -> (bool, Validity) {
        let (handle, validity) = self.get_fuel(layer, pt, time);
        match handle {
            Some(h) => (self.fuel_model.is_non_fuel(h), validity),
            None => (true, validity),
        }
    }

    pub fn get_corrected_fuel(&self, layer: u32, pt: XyPoint, time: WTime) -> FuelOverrides {
        let attr = |id: AttributeId| {
            self.landscape
                .get_attribute(layer, pt, time, crate::time::WTimeSpan::ZERO, id, 0)
        };
        let as_percent = |v: Option<AttributeValue>| match v {
            Some(AttributeValue::F64(x)) => Some(Percent::new(x as f32)),
            Some(AttributeValue::F32(x)) => Some(Percent::new(x)),
            _ => None,
        };
        let (pc, pc_valid) = attr(AttributeId::Pc);
        let (pdf, pdf_valid) = attr(AttributeId::Pdf);
        let (curing, curing_valid) = attr(AttributeId::CuringDegree);
        let (cbh, cbh_valid) = attr(AttributeId::Cbh);
        FuelOverrides {
            pc: pc_valid.is_valid().then(|| as_percent(pc)).flatten(),
            pdf: pdf_valid.is_valid().then(|| as_percent(pdf)).flatten(),
            curing_degree: curing_valid.is_valid().then(|| as_percent(curing)).flatten(),
            cbh: cbh_valid
                .is_valid()
                .then(|| match cbh {
                    Some(AttributeValue::F64(x)) => Some(x as f32),
                    Some(AttributeValue::F32(x)) => Some(x),
                    _ => None,
                })
                .flatten(),
        }
    }

    // ---- weather / terrain / FBP science (delegated) ---------------------

    pub fn get_weather(&self, layer: u32, pt: XyPoint, time: WTime, interp: InterpFlags) -> (IwxData, IfwiData, DfwiData, Validity) {
        self.landscape.get_weather(layer, pt, time, interp)
    }

    pub fn get_elevation(&self, layer: u32, pt: XyPoint, want_azimuth: bool) -> (Meters, Degrees, Degrees, Validity, Validity) {
        self.landscape.get_elevation(layer, pt, want_azimuth)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn calculate_ros(
        &self,
        fuel: FuelHandle,
        aspect: Degrees,
        azimuth: Degrees,
        wsv: KilometersPerHour,
        wdir: Degrees,
        bui: f32,
        fmc: Percent,
        ffmc: f32,
        ff: f32,
        accel_dt: WTimeSpan,
        day_portion: Fraction,
    ) -> RosValues {
        self.fuel_model
            .calculate_ros_values(fuel, aspect, azimuth, wsv, wdir, bui, fmc, ffmc, ff, accel_dt, day_portion)
    }

    pub fn calculate_fc(&self, fuel: FuelHandle, ffmc: f32, bui: f32, fmc: Percent, rsi: f32, ros: f32) -> FcValues {
        self.fuel_model.calculate_fc_values(fuel, ffmc, bui, fmc, rsi, ros)
    }

    pub fn fmc(&self, fuel: FuelHandle, lat: f64, lon: f64, elev: Meters, doy: u16) -> Percent {
        self.fuel_model.fmc(fuel, lat, lon, elev, doy)
    }

    // ---- burning conditions -----------------------------------------------

    /// Compares already-sampled weather/index values against the
    /// landscape's configured burning-condition thresholds at `pt`. A
    /// threshold that is absent or invalid imposes no constraint.
    #[allow(clippy::too_many_arguments)]
    pub fn can_burn(
        &self,
        layer: u32,
        time: WTime,
        pt: XyPoint,
        rh: Percent,
        wind_speed: KilometersPerHour,
        fwi: f32,
        isi: f32,
    ) -> bool {
        let span = crate::time::WTimeSpan::ZERO;
        let threshold = |id: AttributeId| -> Option<f64> {
            match self
                .landscape
                .get_attribute(layer, pt, time, span, id, 0)
            {
                (Some(AttributeValue::F64(v)), validity) if validity.is_valid() => Some(v),
                (Some(AttributeValue::F32(v)), validity) if validity.is_valid() => Some(v as f64),
                _ => None,
            }
        };
        if let Some(min_rh) = threshold(AttributeId::BurningConditionMinRh) {
            if (rh.value() as f64) < min_rh {
                return false;
            }
        }
        if let Some(max_ws) = threshold(AttributeId::BurningConditionMaxWs) {
            if (wind_speed.value() as f64) > max_ws {
                return false;
            }
        }
        if let Some(min_fwi) = threshold(AttributeId::BurningConditionMinFwi) {
            if (fwi as f64) < min_fwi {
                return false;
            }
        }
        if let Some(min_isi) = threshold(AttributeId::BurningConditionMinIsi) {
            if (isi as f64) < min_isi {
                return false;
            }
        }
        true
    }

    /// Samples weather at `pt`/`time` itself, then delegates to [`Self::can_burn`].
    /// A missing/invalid weather reading never blocks growth — only a
    /// configured threshold can.
    pub fn can_burn_at(&self, layer: u32, time: WTime, pt: XyPoint) -> bool {
        let (iwx, ifwi, _, validity) =
            self.landscape
                .get_weather(layer, pt, time, InterpFlags::EMPTY);
        if !validity.is_valid() {
            return true;
        }
        self.can_burn(layer, time, pt, iwx.rh, iwx.wind_speed, ifwi.fwi, ifwi.isi)
    }

    /// Today's configured burning-period window at `pt`, as an offset span
    /// from local midnight, if the landscape carries computed period
    /// attributes.
    pub fn can_burn_time(
        &self,
        layer: u32,
        time: WTime,
        pt: XyPoint,
    ) -> Option<(crate::time::WTimeSpan, crate::time::WTimeSpan)> {
        let span = crate::time::WTimeSpan::ZERO;
        let secs_attr = |id: AttributeId| match self
            .landscape
            .get_attribute(layer, pt, time, span, id, 0)
        {
            (Some(AttributeValue::F64(v)), validity) if validity.is_valid() => Some(v),
            (Some(AttributeValue::U32(v)), validity) if validity.is_valid() => Some(v as f64),
            _ => None,
        };
        let start = secs_attr(AttributeId::BurningConditionPeriodStartComputed)?;
        let end = secs_attr(AttributeId::BurningConditionPeriodEndComputed)?;
        Some((
            crate::time::WTimeSpan::from_secs(start as i64),
            crate::time::WTimeSpan::from_secs(end as i64),
        ))
    }

    // ---- scenario lifecycle -----------------------------------------------

    pub fn pre_calculation_event(&mut self, layer: u32, time: WTime, phase: &str) {
        self.landscape.pre_calculation_event(layer, time, phase);
    }

    pub fn post_calculation_event(&mut self, layer: u32, time: WTime, phase: &str) {
        self.landscape.post_calculation_event(layer, time, phase);
    }

    // ---- event-time lookups (§4.5 construction algorithm) -----------------

    /// Earliest change to layer `layer` at `pt` strictly after `from`, across
    /// every search flag the caller asks for.
    pub fn next_landscape_event(
        &self,
        layer: u32,
        pt: XyPoint,
        flags: crate::providers::EventSearchFlags,
        from: WTime,
    ) -> Option<WTime> {
        self.landscape.get_event_time(layer, pt, flags, from)
    }

    /// Earliest change to any vector-break geometry strictly after `from`,
    /// across every set and index every source carries.
    pub fn next_vector_source_event(&self, from: WTime) -> Option<WTime> {
        self.vector_sources
            .iter()
            .enumerate()
            .flat_map(|(set_idx, source)| {
                (0..source.fire_break_size(set_idx)).filter_map(move |idx| source.get_event_time(set_idx, idx, from))
            })
            .min()
    }

    /// Earliest change to any asset geometry strictly after `from`.
    pub fn next_asset_source_event(&self, from: WTime) -> Option<WTime> {
        self.asset_sources
            .iter()
            .enumerate()
            .flat_map(|(set_idx, source)| {
                (0..source.asset_size(set_idx)).filter_map(move |idx| source.get_event_time(set_idx, idx, from))
            })
            .min()
    }

    /// The union of every static break's bounds, unioned with `seed` — used
    /// to extend a scenario's ignition extents the way `IgnitionExtents`
    /// folds static-break geometry in.
    pub fn ignition_extents(&self, seed: Rect) -> Rect {
        self.static_breaks
            .iter()
            .fold(seed, |acc, b| acc.union(&b.bounds))
    }
}

/// Whether `pt` (internal coordinates) lies inside any static break's
/// polygon whose bounding box contains it. Exposed as a free function since
/// fronts, not `ScenarioCache` itself, decide when to ask.
pub fn point_in_static_break(breaks: &[StaticBreak], pt: XyPoint) -> bool {
    breaks
        .iter()
        .filter(|b| b.bounds.contains(pt))
        .any(|b| point_in_ring(pt, &b.poly))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::EventSearchFlags;
    use crate::units::Celsius;

    struct MockLandscape {
        min_rh: Option<f64>,
    }

    impl LandscapeProvider for MockLandscape {
        fn get_fuel(&self, _layer: u32, pt: XyPoint, _time: WTime) -> (Option<FuelHandle>, Validity) {
            if pt.x < 0.0 {
                (None, Validity::OutOfBounds)
            } else {
                (Some(FuelHandle(1)), Validity::Valid)
            }
        }

        fn get_attribute(
            &self,
            _layer: u32,
            _pt: XyPoint,
            _time: WTime,
            _span: WTimeSpan,
            attr: AttributeId,
            _flags: u32,
        ) -> (Option<AttributeValue>, Validity) {
            match (attr, self.min_rh) {
                (AttributeId::BurningConditionMinRh, Some(v)) => {
                    (Some(AttributeValue::F64(v)), Validity::Valid)
                }
                _ => (None, Validity::Invalid),
            }
        }

        fn get_elevation(
            &self,
            _layer: u32,
            _pt: XyPoint,
            _want_azimuth: bool,
        ) -> (Meters, Degrees, Degrees, Validity, Validity) {
            (Meters::new(0.0), Degrees::new(0.0), Degrees::new(0.0), Validity::Valid, Validity::Valid)
        }

        fn get_weather(
            &self,
            _layer: u32,
            _pt: XyPoint,
            _time: WTime,
            _interp: InterpFlags,
        ) -> (IwxData, IfwiData, DfwiData, Validity) {
            (
                IwxData {
                    temp: Celsius::new(20.0),
                    rh: Percent::new(40.0),
                    wind_speed: KilometersPerHour::new(10.0),
                    wind_gust: KilometersPerHour::new(15.0),
                    wind_direction: Degrees::new(0.0),
                    precip: Meters::new(0.0),
                },
                IfwiData { ffmc: 85.0, isi: 5.0, fwi: 10.0 },
                DfwiData { dmc: 20.0, dc: 100.0, bui: 30.0 },
                Validity::Valid,
            )
        }

        fn pre_calculation_event(&mut self, _layer: u32, _time: WTime, _phase: &str) {}
        fn post_calculation_event(&mut self, _layer: u32, _time: WTime, _phase: &str) {}

        fn get_event_time(
            &self,
            _layer: u32,
            _pt: XyPoint,
            _flags: EventSearchFlags,
            _from: WTime,
        ) -> Option<WTime> {
            None
        }
    }

    struct MockFuel;
    impl FuelModel for MockFuel {
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
            _accel_dt: crate::time::WTimeSpan,
            _day_portion: Fraction,
        ) -> crate::providers::RosValues {
            crate::providers::RosValues::default()
        }

        fn calculate_fc_values(
            &self,
            _fuel: FuelHandle,
            _ffmc: f32,
            _bui: f32,
            _fmc: Percent,
            _rsi: f32,
            _ros: f32,
        ) -> crate::providers::FcValues {
            crate::providers::FcValues::default()
        }

        fn fmc(&self, _fuel: FuelHandle, _lat: f64, _lon: f64, _elev: Meters, _doy: u16) -> Percent {
            Percent::new(100.0)
        }

        fn is_non_fuel(&self, fuel: FuelHandle) -> bool {
            fuel.0 == 0
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

    fn make_cache(min_rh: Option<f64>) -> ScenarioCache {
        ScenarioCache::new(
            GridCache::new(XyPoint::new(0.0, 0.0), 1.0),
            Box::new(MockLandscape { min_rh }),
            Box::new(MockFuel),
        )
    }

    #[test]
    fn get_fuel_is_memoized_per_cell_and_layer() {
        let cache = make_cache(None);
        let a = cache.get_fuel(0, XyPoint::new(1.0, 1.0), WTime::from_unix_secs(0));
        let b = cache.get_fuel(0, XyPoint::new(1.4, 1.4), WTime::from_unix_secs(0));
        assert_eq!(a, b);
        assert_eq!(cache.fuel_cache.read().len(), 1);
    }

    #[test]
    fn is_non_fuel_reflects_fuel_model() {
        let cache = make_cache(None);
        let (non_fuel, validity) = cache.is_non_fuel(0, XyPoint::new(1.0, 1.0), WTime::from_unix_secs(0));
        assert!(!non_fuel);
        assert!(validity.is_valid());
        let (non_fuel, _) = cache.is_non_fuel(0, XyPoint::new(-1.0, 1.0), WTime::from_unix_secs(0));
        assert!(non_fuel);
    }

    #[test]
    fn can_burn_respects_configured_min_rh() {
        let cache = make_cache(Some(50.0));
        let ok = cache.can_burn(
            0,
            WTime::from_unix_secs(0),
            XyPoint::new(0.0, 0.0),
            Percent::new(60.0),
            KilometersPerHour::new(10.0),
            10.0,
            5.0,
        );
        assert!(ok);
        let blocked = cache.can_burn(
            0,
            WTime::from_unix_secs(0),
            XyPoint::new(0.0, 0.0),
            Percent::new(30.0),
            KilometersPerHour::new(10.0),
            10.0,
            5.0,
        );
        assert!(!blocked);
    }

    #[test]
    fn can_burn_with_no_threshold_configured_always_passes() {
        let cache = make_cache(None);
        let ok = cache.can_burn(
            0,
            WTime::from_unix_secs(0),
            XyPoint::new(0.0, 0.0),
            Percent::new(1.0),
            KilometersPerHour::new(999.0),
            0.0,
            0.0,
        );
        assert!(ok);
    }

    #[test]
    fn point_in_static_break_rejects_points_outside_every_bbox() {
        let square = vec![
            XyPoint::new(0.0, 0.0),
            XyPoint::new(10.0, 0.0),
            XyPoint::new(10.0, 10.0),
            XyPoint::new(0.0, 10.0),
        ];
        let b = StaticBreak {
            set: 0,
            bounds: Rect::new(XyPoint::new(0.0, 0.0), XyPoint::new(10.0, 10.0)),
            poly: Poly::new(square, true),
        };
        assert!(point_in_static_break(&[b.clone()], XyPoint::new(5.0, 5.0)));
        assert!(!point_in_static_break(&[b], XyPoint::new(50.0, 50.0)));
    }
}
