//! External collaborator interfaces consumed by the growth engine.
//!
//! Everything in this module is a trait: the fuel-behaviour science, the
//! weather/terrain grid, ignition/break/asset geometry sources, and the
//! percentile table are all out-of-scope collaborators per the engine's
//! design. The engine only ever calls through these seams; it never provides
//! a production implementation of any of them (test-only mocks live beside
//! the integration tests).

use crate::geom::point::XyPoint;
use crate::geom::poly::Poly;
use crate::time::{WTime, WTimeSpan};
use crate::units::{Celsius, Degrees, Fraction, KilometersPerHour, Meters, Percent};
use std::ops::{BitOr, BitOrAssign};

/// Opaque handle to a fuel type, returned by `LandscapeProvider::get_fuel`
/// and passed back into `FuelModel` calls. The engine never inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FuelHandle(pub u32);

/// Whether a queried grid value is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
    OutOfBounds,
}

impl Validity {
    #[inline]
    pub fn is_valid(self) -> bool {
        matches!(self, Validity::Valid)
    }
}

/// Identifies one scalar carried by a grid layer, queried through
/// `LandscapeProvider::get_attribute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeId {
    XMid,
    YMid,
    XStart,
    YStart,
    Pc,
    Pdf,
    CuringDegree,
    FuelLoad,
    TreeHeight,
    Cbh,
    Cfl,
    Greenup,
    GrassPhenology,
    DemPresent,
    DefaultElevation,
    DefaultFmc,
    DefaultFmcActive,
    PlotResolution,
    XllCorner,
    YllCorner,
    XurCorner,
    YurCorner,
    SpatialReference,
    BurningConditionMinRh,
    BurningConditionMaxWs,
    BurningConditionMinFwi,
    BurningConditionMinIsi,
    BurningConditionPeriodStartComputed,
    BurningConditionPeriodEndComputed,
}

/// A grid attribute value, typed per `AttributeId`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttributeValue {
    F64(f64),
    F32(f32),
    Bool(bool),
    U32(u32),
}

/// Minimal bitflag set: the engine only needs construction, union and
/// membership tests, so a hand-rolled newtype avoids pulling in a flags crate
/// for seven constants.
macro_rules! flag_set {
    ($name:ident { $($variant:ident = $bit:expr),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name(u32);

        impl $name {
            $(pub const $variant: $name = $name($bit);)+

            pub const EMPTY: $name = $name(0);

            #[inline]
            pub fn contains(self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }
    };
}

flag_set!(InterpFlags {
    TEMPORAL = 0b0000_0001,
    SPATIAL = 0b0000_0010,
    PRECIP = 0b0000_0100,
    WIND = 0b0000_1000,
    WIND_VECTOR = 0b0001_0000,
    TEMP_RH = 0b0010_0000,
    HISTORY = 0b0100_0000,
});

flag_set!(EventSearchFlags {
    SEARCH_FORWARD = 0b0001,
    SEARCH_SUNRISE = 0b0010,
    SEARCH_SUNSET = 0b0100,
    SEARCH_SOLARNOON = 0b1000,
});

/// Instantaneous weather reading at a point and time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IwxData {
    pub temp: Celsius,
    pub rh: Percent,
    pub wind_speed: KilometersPerHour,
    pub wind_gust: KilometersPerHour,
    pub wind_direction: Degrees,
    pub precip: Meters,
}

/// Instantaneous fire weather index data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfwiData {
    pub ffmc: f32,
    pub isi: f32,
    pub fwi: f32,
}

/// Daily fire weather index data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DfwiData {
    pub dmc: f32,
    pub dc: f32,
    pub bui: f32,
}

/// The grid/weather/terrain collaborator. One `layer` index selects among
/// simultaneously loaded grids (e.g. a base landscape plus override layers).
pub trait LandscapeProvider {
    fn get_fuel(&self, layer: u32, pt: XyPoint, time: WTime) -> (Option<FuelHandle>, Validity);

    fn get_attribute(
        &self,
        layer: u32,
        pt: XyPoint,
        time: WTime,
        span: WTimeSpan,
        attr: AttributeId,
        flags: u32,
    ) -> (Option<AttributeValue>, Validity);

    /// Returns `(elevation, aspect, azimuth, elevation_validity, terrain_validity)`.
    fn get_elevation(
        &self,
        layer: u32,
        pt: XyPoint,
        want_azimuth: bool,
    ) -> (Meters, Degrees, Degrees, Validity, Validity);

    fn get_weather(
        &self,
        layer: u32,
        pt: XyPoint,
        time: WTime,
        interp: InterpFlags,
    ) -> (IwxData, IfwiData, DfwiData, Validity);

    fn pre_calculation_event(&mut self, layer: u32, time: WTime, phase: &str);
    fn post_calculation_event(&mut self, layer: u32, time: WTime, phase: &str);

    /// Earliest scheduled grid/weather change strictly after `from`, if any.
    fn get_event_time(
        &self,
        layer: u32,
        pt: XyPoint,
        flags: EventSearchFlags,
        from: WTime,
    ) -> Option<WTime>;
}

/// Rate-of-spread and fuel-consumption science, opaque per vertex.
pub trait FuelModel {
    #[allow(clippy::too_many_arguments)]
    fn calculate_ros_values(
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
    ) -> RosValues;

    fn calculate_fc_values(
        &self,
        fuel: FuelHandle,
        ffmc: f32,
        bui: f32,
        fmc: Percent,
        rsi: f32,
        ros: f32,
    ) -> FcValues;

    fn fmc(&self, fuel: FuelHandle, lat: f64, lon: f64, elev: Meters, doy: u16) -> Percent;

    fn is_non_fuel(&self, fuel: FuelHandle) -> bool;
    fn is_grass(&self, fuel: FuelHandle) -> bool;
    fn is_mixed(&self, fuel: FuelHandle) -> bool;
    fn is_mixed_dead_fir(&self, fuel: FuelHandle) -> bool;
    fn is_c6(&self, fuel: FuelHandle) -> bool;
}

/// Outputs of `FuelModel::calculate_ros_values`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RosValues {
    pub rsi: f32,
    pub roseq: f32,
    pub ros: f32,
    pub fros: f32,
    pub bros: f32,
    pub raz: Degrees,
}

/// Outputs of `FuelModel::calculate_fc_values`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FcValues {
    pub cfb: Fraction,
    pub cfc: f32,
    pub rso: f32,
    pub csi: f32,
    pub sfc: f32,
    pub tfc: f32,
    pub fi: f32,
}

/// How an ignition source's geometry should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnitionType {
    Point,
    Line,
    PolygonIn,
    PolygonOut,
}

/// Read-only source of ignition geometry.
pub trait IgnitionSource {
    fn ignition_count(&self) -> usize;
    fn ignition_size(&self, index: usize) -> usize;
    fn get_ignition(&self, index: usize) -> (IgnitionType, Poly);
    fn valid(&self, start: WTime, duration: WTimeSpan) -> bool;
    fn pre_calculation_event(&mut self, time: WTime);
    fn post_calculation_event(&mut self, time: WTime);
}

/// Read-only source of vector-break geometry (dynamic or static, grouped
/// into named sets).
pub trait VectorSource {
    fn fire_break_count(&self) -> usize;
    fn fire_break_set_count(&self) -> usize;
    fn fire_break_size(&self, set: usize) -> usize;
    fn get_fire_break(&self, set: usize, index: usize, time: WTime) -> Option<Poly>;
    fn get_event_time(&self, set: usize, index: usize, from: WTime) -> Option<WTime>;
}

/// How an asset's geometry should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Polygon,
    Polyline,
    Multipoint,
}

/// Read-only source of asset geometry, symmetrical to `VectorSource`.
pub trait AssetSource {
    fn asset_count(&self) -> usize;
    fn asset_set_count(&self) -> usize;
    fn asset_size(&self, set: usize) -> usize;
    fn get_asset(&self, set: usize, index: usize, time: WTime) -> Option<(AssetType, Poly)>;
    fn get_event_time(&self, set: usize, index: usize, from: WTime) -> Option<WTime>;
}

/// Optional wind/vector redirection target (e.g. a point a fire is steered toward).
pub trait Target {
    fn get_target(&self, index: usize, sub_index: usize) -> Option<XyPoint>;
}

/// Statistical percentile table consulted by growth when
/// `ignition_percentile_enable` requests a non-50th-percentile spread rate.
pub trait PercentileTable {
    fn inverse_cdf(&self, percentile: Percent) -> f32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interp_flags_compose() {
        let f = InterpFlags::TEMPORAL | InterpFlags::WIND;
        assert!(f.contains(InterpFlags::TEMPORAL));
        assert!(f.contains(InterpFlags::WIND));
        assert!(!f.contains(InterpFlags::PRECIP));
    }

    #[test]
    fn validity_is_valid_only_for_valid_variant() {
        assert!(Validity::Valid.is_valid());
        assert!(!Validity::Invalid.is_valid());
        assert!(!Validity::OutOfBounds.is_valid());
    }
}
