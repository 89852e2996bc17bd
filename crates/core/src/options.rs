//! `ScenarioOptions`: every configuration flag and numeric option a scenario
//! can be built with, plus the validation pass that reports problems as a
//! `ValidationTree` instead of failing on the first bad field.

use crate::error::{Severity, ValidationNode};
use crate::units::{Degrees, Meters, MetersPerMinute, Percent};

/// The two mutually exclusive vertex growth kernels (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthMode {
    /// 2-D elliptical growth (`grow2d`).
    Elliptical,
    /// 3-D Richards growth accounting for slope (`grow3d`).
    Richards3D,
}

/// Meaning of a configured "default elevation" override.
///
/// See DESIGN.md for the `-1`/`-99` convention this replaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultElevation {
    /// Use the grid's own elevation layer; this override is unset.
    Grid,
    /// Elevation is genuinely unknown; treat terrain as flat at 0m.
    NoData,
    /// Use this fixed elevation everywhere.
    Fixed(Meters),
}

/// A single stop-condition threshold: trigger value plus how long the
/// condition must hold before it latches (§4.8).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopThreshold<T> {
    pub threshold: T,
    pub duration_secs: i64,
}

impl<T> StopThreshold<T> {
    pub fn new(threshold: T, duration_secs: i64) -> Self {
        StopThreshold {
            threshold,
            duration_secs,
        }
    }
}

/// Every numeric/flag option exposed to consumers (§6), grouped the way the
/// engine reads them: growth behavior, grid interaction, weather
/// interpolation, and stop conditions.
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    // --- growth mode & physics flags ---
    pub growth_mode: GrowthMode,
    pub topography_enabled: bool,
    pub wind_effect_enabled: bool,
    pub fmc_terrain: bool,
    pub accurate_fmc_location: bool,
    pub breaching_enabled: bool,
    pub spotting_enabled: bool,
    pub boundary_stop_enabled: bool,
    pub dynamic_spatial_threshold: bool,
    pub acceleration_enabled: bool,
    pub cardinal_ros: bool,
    pub independent_timesteps: bool,
    pub purge_nondisplayable: bool,
    pub false_origin: bool,
    pub false_scaling: bool,
    pub suppress_tight_concave_addpoint: bool,
    pub ignition_percentile_enable: bool,

    // --- weather interpolation flags ---
    pub interp_temporal: bool,
    pub interp_spatial: bool,
    pub interp_precip: bool,
    pub interp_wind: bool,
    pub interp_wind_vector: bool,
    pub interp_temp_rh: bool,
    pub interp_fwi_recompute: bool,
    pub interp_history: bool,

    // --- numeric options ---
    pub distance_resolution: Meters,
    pub perimeter_resolution: Meters,
    pub perimeter_spacing: Meters,
    pub minimum_spreading_ros: MetersPerMinute,
    /// `-1` means "no cap"; otherwise bounded to `[0, 1h]` in seconds.
    pub max_acceleration_timestep_secs: f64,
    pub display_interval_secs: f64,
    pub ignition_size: Meters,
    pub initial_vertex_count: u32,
    /// `None` means "use the fuel model's own FMC"; `Some` overrides it.
    pub specified_fmc: Option<Percent>,
    pub default_elevation: DefaultElevation,
    pub dx: Meters,
    pub dy: Meters,
    pub dt_secs: f64,
    pub dwd: Degrees,
    pub dvd: Degrees,
    /// `None` means "use grid wind direction unmodified".
    pub owd: Option<Degrees>,
    pub ovd: Option<Degrees>,
    /// Exclusive of 0 and 100; 50 is the unperturbed median.
    pub growth_percentile: Percent,

    // --- stop conditions (§4.8) ---
    pub stop_fi90: Option<StopThreshold<f32>>,
    pub stop_fi95: Option<StopThreshold<f32>>,
    pub stop_fi100: Option<StopThreshold<f32>>,
    pub stop_rh: Option<StopThreshold<Percent>>,
    pub stop_precip: Option<StopThreshold<Meters>>,
    pub stop_area: Option<StopThreshold<f64>>,
    pub stop_burn_distance: Option<StopThreshold<Meters>>,

    /// Hard budget on vertices+polygons materialized by a single step's set
    /// operations; exceeding it synthesizes `CoreError::OutOfMemory` rather
    /// than letting an unbounded allocation proceed.
    pub max_vertices_per_step: usize,

    /// Whether this options set has been consulted by at least one `step()`.
    /// Flags documented below as "immutable after first `step()`" are only
    /// enforced by convention (doc comments), not by the type system, since
    /// `Scenario` holds the authoritative copy and validates on construction.
    pub locked: bool,
}

impl ScenarioOptions {
    /// Validate every field, returning a tree of every problem found rather
    /// than stopping at the first one.
    #[allow(clippy::too_many_lines)]
    pub fn validate(&self) -> ValidationNode {
        let mut children = Vec::new();

        children.push(range_check(
            "distance_resolution",
            self.distance_resolution.value(),
            0.2,
            10.0,
        ));
        children.push(range_check(
            "perimeter_resolution",
            self.perimeter_resolution.value(),
            0.2,
            10.0,
        ));
        children.push(range_check(
            "perimeter_spacing",
            self.perimeter_spacing.value(),
            0.0,
            10.0,
        ));
        children.push(range_check(
            "minimum_spreading_ros",
            self.minimum_spreading_ros.value(),
            1e-7,
            1.0,
        ));

        if self.max_acceleration_timestep_secs != -1.0
            && !(0.0..=3600.0).contains(&self.max_acceleration_timestep_secs)
        {
            children.push(ValidationNode::leaf(
                "max_acceleration_timestep",
                Severity::Severe,
                "must be -1 or in [0, 1h]",
            ));
        }

        if self.display_interval_secs < 0.0 {
            children.push(ValidationNode::leaf(
                "display_interval",
                Severity::Severe,
                "must be >= 0",
            ));
        }

        children.push(range_check("ignition_size", self.ignition_size.value(), 0.0, 25.0));

        if !(6..=64).contains(&self.initial_vertex_count) {
            children.push(ValidationNode::leaf(
                "initial_vertex_count",
                Severity::Severe,
                "must be in [6, 64]",
            ));
        }

        if let Some(fmc) = self.specified_fmc {
            if !(0.0..=300.0).contains(&fmc.value()) {
                children.push(ValidationNode::leaf(
                    "specified_fmc",
                    Severity::Severe,
                    "must be in [0, 300]%",
                ));
            }
        }

        if let DefaultElevation::Fixed(m) = self.default_elevation {
            if !(0.0..=7000.0).contains(&m.value()) {
                children.push(ValidationNode::leaf(
                    "default_elevation",
                    Severity::Severe,
                    "fixed elevation must be in [0, 7000]m",
                ));
            }
        }

        children.push(range_check("dx", self.dx.value(), -250.0, 250.0));
        children.push(range_check("dy", self.dy.value(), -250.0, 250.0));

        if !(-4.0 * 3600.0..=4.0 * 3600.0).contains(&self.dt_secs) {
            children.push(ValidationNode::leaf("dt", Severity::Severe, "must be in ±4h"));
        }

        children.push(range_check("dwd", self.dwd.value(), -360.0, 360.0));
        children.push(range_check("dvd", self.dvd.value(), -360.0, 360.0));

        if let Some(owd) = self.owd {
            children.push(range_check("owd", owd.value(), 0.0, 360.0));
        }
        if let Some(ovd) = self.ovd {
            children.push(range_check("ovd", ovd.value(), 0.0, 360.0));
        }

        if !(self.growth_percentile.value() > 0.0 && self.growth_percentile.value() < 100.0) {
            children.push(ValidationNode::leaf(
                "growth_percentile",
                Severity::Severe,
                "must be strictly between 0 and 100",
            ));
        }

        if let Some(t) = &self.stop_fi90 {
            children.push(stop_threshold_check("stop_fi90", t.threshold, 0.0, 20000.0, t.duration_secs));
        }
        if let Some(t) = &self.stop_fi95 {
            children.push(stop_threshold_check("stop_fi95", t.threshold, 0.0, 20000.0, t.duration_secs));
        }
        if let Some(t) = &self.stop_fi100 {
            children.push(stop_threshold_check("stop_fi100", t.threshold, 0.0, 20000.0, t.duration_secs));
        }
        if let Some(t) = &self.stop_rh {
            children.push(stop_threshold_check(
                "stop_rh",
                t.threshold.value(),
                0.0,
                100.0,
                t.duration_secs,
            ));
        }
        if let Some(t) = &self.stop_precip {
            children.push(stop_threshold_check(
                "stop_precip",
                t.threshold.value(),
                0.0,
                200.0,
                t.duration_secs,
            ));
        }
        if let Some(t) = &self.stop_area {
            if t.threshold < 0.0 {
                children.push(ValidationNode::leaf("stop_area", Severity::Severe, "must be >= 0"));
            } else if t.duration_secs < 0 {
                children.push(ValidationNode::leaf(
                    "stop_area",
                    Severity::Severe,
                    "duration must be >= 0",
                ));
            }
        }
        if let Some(t) = &self.stop_burn_distance {
            if t.threshold.value() < 0.0 {
                children.push(ValidationNode::leaf(
                    "stop_burn_distance",
                    Severity::Severe,
                    "must be >= 0",
                ));
            } else if t.duration_secs < 0 {
                children.push(ValidationNode::leaf(
                    "stop_burn_distance",
                    Severity::Severe,
                    "duration must be >= 0",
                ));
            }
        }

        // Decision: fmc_terrain/accurate_fmc_location are user-configurable;
        // an unusual combination is a warning, not a hard failure.
        if self.fmc_terrain && self.accurate_fmc_location {
            children.push(ValidationNode::leaf(
                "fmc_terrain_and_accurate_fmc_location",
                Severity::Warning,
                "both flags set: accurate FMC location overrides terrain-derived FMC at every vertex",
            ));
        }

        if self.max_vertices_per_step == 0 {
            children.push(ValidationNode::leaf(
                "max_vertices_per_step",
                Severity::Severe,
                "must be > 0",
            ));
        }

        ValidationNode::group("ScenarioOptions", children)
    }
}

fn range_check(name: &'static str, value: f32, min: f32, max: f32) -> ValidationNode {
    if (min..=max).contains(&value) {
        ValidationNode::leaf(name, Severity::Info, format!("{value} ok"))
    } else {
        ValidationNode::leaf(name, Severity::Severe, format!("{value} outside [{min}, {max}]"))
    }
}

fn stop_threshold_check(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
    duration_secs: i64,
) -> ValidationNode {
    let mut children = vec![range_check("threshold", value, min, max)];
    if duration_secs < 0 {
        children.push(ValidationNode::leaf("duration", Severity::Severe, "must be >= 0"));
    } else {
        children.push(ValidationNode::leaf("duration", Severity::Info, "ok"));
    }
    ValidationNode::group(name, children)
}

impl Default for ScenarioOptions {
    fn default() -> Self {
        ScenarioOptions {
            growth_mode: GrowthMode::Elliptical,
            topography_enabled: true,
            wind_effect_enabled: true,
            fmc_terrain: false,
            accurate_fmc_location: false,
            breaching_enabled: true,
            spotting_enabled: false,
            boundary_stop_enabled: false,
            dynamic_spatial_threshold: false,
            acceleration_enabled: true,
            cardinal_ros: false,
            independent_timesteps: false,
            purge_nondisplayable: true,
            false_origin: true,
            false_scaling: true,
            suppress_tight_concave_addpoint: false,
            ignition_percentile_enable: false,
            interp_temporal: true,
            interp_spatial: false,
            interp_precip: false,
            interp_wind: false,
            interp_wind_vector: false,
            interp_temp_rh: false,
            interp_fwi_recompute: false,
            interp_history: false,
            distance_resolution: Meters(1.0),
            perimeter_resolution: Meters(1.0),
            perimeter_spacing: Meters(0.0),
            minimum_spreading_ros: MetersPerMinute(1e-4),
            max_acceleration_timestep_secs: -1.0,
            display_interval_secs: 3600.0,
            ignition_size: Meters(0.5),
            initial_vertex_count: 16,
            specified_fmc: None,
            default_elevation: DefaultElevation::Grid,
            dx: Meters(0.0),
            dy: Meters(0.0),
            dt_secs: 0.0,
            dwd: Degrees(0.0),
            dvd: Degrees(0.0),
            owd: None,
            ovd: None,
            growth_percentile: Percent(50.0),
            stop_fi90: None,
            stop_fi95: None,
            stop_fi100: None,
            stop_rh: None,
            stop_precip: None,
            stop_area: None,
            stop_burn_distance: None,
            max_vertices_per_step: 1_000_000,
            locked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_validate_clean() {
        let opts = ScenarioOptions::default();
        let report = opts.validate();
        assert!(!report.has_severe());
    }

    #[test]
    fn out_of_range_perimeter_resolution_is_severe() {
        let mut opts = ScenarioOptions::default();
        opts.perimeter_resolution = Meters(0.01);
        let report = opts.validate();
        assert!(report.has_severe());
    }

    #[test]
    fn fmc_terrain_and_accurate_location_is_warning_not_severe() {
        let mut opts = ScenarioOptions::default();
        opts.fmc_terrain = true;
        opts.accurate_fmc_location = true;
        let report = opts.validate();
        assert!(!report.has_severe());
        assert_eq!(report.worst_severity(), Severity::Warning);
    }

    #[test]
    fn growth_percentile_of_zero_is_rejected() {
        let mut opts = ScenarioOptions::default();
        opts.growth_percentile = Percent(0.0);
        assert!(opts.validate().has_severe());
    }

    #[test]
    fn zero_vertex_budget_is_rejected() {
        let mut opts = ScenarioOptions::default();
        opts.max_vertices_per_step = 0;
        assert!(opts.validate().has_severe());
    }
}
