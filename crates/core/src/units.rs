//! Semantic unit types for type-safe physical quantity handling
//!
//! This module provides newtype wrappers for physical quantities to prevent
//! accidental mixing of incompatible units (e.g. minutes with seconds, or
//! degrees with radians).
//!
//! # Design Philosophy
//! - Each type wraps f32 for performance (sufficient for fire simulation precision)
//! - Implements common traits (Add, Sub, Mul, Div, Ord, Display, etc.)
//! - Provides explicit conversion methods between related types
//! - Serde support for serialization
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//!
//! # Usage
//! ```
//! use firegrowth_core::units::{KilometersPerHour, MetersPerSecond};
//!
//! let wind = KilometersPerHour(30.0);
//! let mps: MetersPerSecond = wind.to_mps();
//! assert!((mps.0 - 8.333).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

#[inline]
fn f32_total_cmp(a: f32, b: f32) -> Ordering {
    a.total_cmp(&b)
}

macro_rules! scalar_unit {
    ($name:ident, $fmt:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        #[repr(transparent)]
        pub struct $name(pub f32);

        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                f32_total_cmp(self.0, other.0)
            }
        }

        impl $name {
            #[inline]
            pub fn new(value: f32) -> Self {
                $name(value)
            }

            #[inline]
            pub fn value(self) -> f32 {
                self.0
            }
        }

        impl From<f32> for $name {
            fn from(v: f32) -> Self {
                $name(v)
            }
        }

        impl From<$name> for f32 {
            fn from(v: $name) -> f32 {
                v.0
            }
        }

        impl Add for $name {
            type Output = $name;
            fn add(self, rhs: $name) -> $name {
                $name(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = $name;
            fn sub(self, rhs: $name) -> $name {
                $name(self.0 - rhs.0)
            }
        }

        impl Mul<f32> for $name {
            type Output = $name;
            fn mul(self, rhs: f32) -> $name {
                $name(self.0 * rhs)
            }
        }

        impl Div<f32> for $name {
            type Output = $name;
            fn div(self, rhs: f32) -> $name {
                $name(self.0 / rhs)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, $fmt, self.0)
            }
        }
    };
}

// ============================================================================
// DISTANCE / TIME
// ============================================================================

scalar_unit!(Meters, "{:.2} m");
scalar_unit!(Kilometers, "{:.2} km");
scalar_unit!(Seconds, "{:.2} s");
scalar_unit!(Hours, "{:.2} h");

impl Meters {
    #[inline]
    pub fn to_kilometers(self) -> Kilometers {
        Kilometers(self.0 / 1000.0)
    }
}

impl Kilometers {
    #[inline]
    pub fn to_meters(self) -> Meters {
        Meters(self.0 * 1000.0)
    }
}

impl From<Kilometers> for Meters {
    fn from(k: Kilometers) -> Meters {
        k.to_meters()
    }
}

impl Seconds {
    #[inline]
    pub fn to_hours(self) -> Hours {
        Hours(self.0 / 3600.0)
    }

    #[inline]
    pub fn to_minutes(self) -> Minutes {
        Minutes(self.0 / 60.0)
    }
}

impl Hours {
    #[inline]
    pub fn to_seconds(self) -> Seconds {
        Seconds(self.0 * 3600.0)
    }
}

impl From<Hours> for Seconds {
    fn from(h: Hours) -> Seconds {
        h.to_seconds()
    }
}

scalar_unit!(Minutes, "{:.2} min");

impl Minutes {
    #[inline]
    pub fn to_seconds(self) -> Seconds {
        Seconds(self.0 * 60.0)
    }
}

impl From<Minutes> for Seconds {
    fn from(m: Minutes) -> Seconds {
        m.to_seconds()
    }
}

// Cross-type operation: distance / time = velocity
impl Div<Seconds> for Meters {
    type Output = MetersPerSecond;
    fn div(self, rhs: Seconds) -> MetersPerSecond {
        MetersPerSecond(self.0 / rhs.0)
    }
}

// Cross-type operation: km/h x hours = kilometers
impl Mul<Hours> for KilometersPerHour {
    type Output = Kilometers;
    fn mul(self, rhs: Hours) -> Kilometers {
        Kilometers(self.0 * rhs.0)
    }
}

// ============================================================================
// VELOCITY / RATE OF SPREAD
// ============================================================================

scalar_unit!(MetersPerSecond, "{:.2} m/s");
scalar_unit!(KilometersPerHour, "{:.1} km/h");
/// Rate of spread, the FBP model's native unit (m/min).
scalar_unit!(MetersPerMinute, "{:.3} m/min");

impl MetersPerSecond {
    #[inline]
    pub fn to_kmh(self) -> KilometersPerHour {
        KilometersPerHour(self.0 * 3.6)
    }
}

impl KilometersPerHour {
    #[inline]
    pub fn to_mps(self) -> MetersPerSecond {
        MetersPerSecond(self.0 / 3.6)
    }
}

impl From<KilometersPerHour> for MetersPerSecond {
    fn from(k: KilometersPerHour) -> MetersPerSecond {
        k.to_mps()
    }
}

impl MetersPerMinute {
    /// Convert to a per-second rate, used when scaling by a step duration.
    #[inline]
    pub fn per_second(self) -> f32 {
        self.0 / 60.0
    }
}

// Cross-type operation: velocity x time = distance
impl Mul<Seconds> for MetersPerSecond {
    type Output = Meters;
    fn mul(self, rhs: Seconds) -> Meters {
        Meters(self.0 * rhs.0)
    }
}

// ============================================================================
// FIRE INTENSITY (Byram's fireline intensity)
// ============================================================================

scalar_unit!(KwPerMeter, "{:.1} kW/m");

impl KwPerMeter {
    /// Low intensity fire threshold (< 350 kW/m, generally controllable by hand crews).
    pub const LOW_INTENSITY_THRESHOLD: KwPerMeter = KwPerMeter(350.0);
    /// Moderate intensity threshold (350-2000 kW/m).
    pub const MODERATE_INTENSITY_THRESHOLD: KwPerMeter = KwPerMeter(2000.0);
    /// High intensity threshold (2000-4000 kW/m).
    pub const HIGH_INTENSITY_THRESHOLD: KwPerMeter = KwPerMeter(4000.0);
    /// Extreme intensity (> 10000 kW/m), crown fire conditions.
    pub const EXTREME_INTENSITY_THRESHOLD: KwPerMeter = KwPerMeter(10000.0);
}

// ============================================================================
// FRACTION / RATIO / ANGLE
// ============================================================================

scalar_unit!(Fraction, "{:.4}");
scalar_unit!(Percent, "{:.1}%");
scalar_unit!(Degrees, "{:.1}°");
scalar_unit!(Radians, "{:.4} rad");
/// Temperature in degrees Celsius, used only for `IWXData::temp`.
scalar_unit!(Celsius, "{:.1}°C");

impl Fraction {
    pub const ZERO: Fraction = Fraction(0.0);
    pub const ONE: Fraction = Fraction(1.0);

    /// Clamping constructor; prefer over the tuple struct literal at system boundaries.
    #[inline]
    pub fn clamped(value: f32) -> Self {
        Fraction(value.clamp(0.0, 1.0))
    }

    #[inline]
    pub fn to_percent(self) -> Percent {
        Percent(self.0 * 100.0)
    }
}

impl Percent {
    #[inline]
    pub fn to_fraction(self) -> Fraction {
        Fraction(self.0 / 100.0)
    }
}

impl From<Percent> for Fraction {
    fn from(p: Percent) -> Fraction {
        p.to_fraction()
    }
}

impl From<Fraction> for Percent {
    fn from(f: Fraction) -> Percent {
        f.to_percent()
    }
}

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}

impl Radians {
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }

    #[inline]
    pub fn sin(self) -> f32 {
        self.0.sin()
    }

    #[inline]
    pub fn cos(self) -> f32 {
        self.0.cos()
    }
}

impl From<Degrees> for Radians {
    fn from(d: Degrees) -> Radians {
        d.to_radians()
    }
}

impl From<Radians> for Degrees {
    fn from(r: Radians) -> Degrees {
        r.to_degrees()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mps_to_kmh() {
        let mps = MetersPerSecond(10.0);
        assert!((mps.to_kmh().0 - 36.0).abs() < 0.01);
    }

    #[test]
    fn kmh_to_mps_round_trip() {
        let kmh = KilometersPerHour(30.0);
        let back = kmh.to_mps().to_kmh();
        assert!((back.0 - 30.0).abs() < 0.01);
    }

    #[test]
    fn fraction_clamps() {
        assert_eq!(Fraction::clamped(1.5).0, 1.0);
        assert_eq!(Fraction::clamped(-0.5).0, 0.0);
    }

    #[test]
    fn fraction_percent_round_trip() {
        let f = Fraction(0.75);
        assert!((f.to_percent().0 - 75.0).abs() < 0.01);
    }

    #[test]
    fn degrees_radians_round_trip() {
        let d = Degrees(180.0);
        assert!((d.to_radians().0 - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn velocity_times_time_is_distance() {
        let v = MetersPerSecond(10.0);
        let t = Seconds(5.0);
        let d: Meters = v * t;
        assert!((d.0 - 50.0).abs() < 0.01);
    }

    #[test]
    fn meters_per_minute_per_second() {
        assert!((MetersPerMinute(60.0).per_second() - 1.0).abs() < 1e-6);
    }
}
