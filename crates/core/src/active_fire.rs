//! `ActiveFire`: the adaptive step-size bookkeeping kept alongside one
//! `ScenarioFire` (§4.5) — its current rate of spread, acceleration state,
//! and the proximity test `ScenarioTimeStep` uses to cluster fires that grow
//! in lockstep.

use crate::geom::point::{distance, Rect, XyPoint};
use crate::time::WTimeSpan;
use crate::units::{Degrees, Fraction, Meters, MetersPerMinute};

/// Per-fire adaptive-step state, refreshed after every growth pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveFire {
    pub max_ros: MetersPerMinute,
    pub min_ros_ratio: Fraction,
    pub centroid: XyPoint,
    pub bounds: Rect,
    /// Heading azimuth of the vertex carrying `max_ros`, used for cardinal ROS.
    pub max_ros_heading: Degrees,
    /// Whether this fire was advanced to the step's chosen `time` directly,
    /// as opposed to being merged onto another cluster afterward.
    pub advanced: bool,
}

impl ActiveFire {
    pub fn new(centroid: XyPoint, bounds: Rect) -> Self {
        ActiveFire {
            max_ros: MetersPerMinute(0.0),
            min_ros_ratio: Fraction::ONE,
            centroid,
            bounds,
            max_ros_heading: Degrees(0.0),
            advanced: false,
        }
    }
}

/// Inputs to `calculate_end_time` that come from the scenario rather than
/// from the fire itself (thresholds can be dynamic, computed by the caller).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndTimeContext {
    pub minimum_ros: MetersPerMinute,
    pub in_burning_period: bool,
    /// `None` represents the "-1 -> 1h" sentinel.
    pub temporal_threshold_acceleration_secs: Option<f64>,
    /// Spatial threshold in use this step; may already reflect a
    /// dynamic-by-area computation performed by the caller.
    pub spatial_threshold: Meters,
    pub cardinal_ros_enabled: bool,
}

/// `ros * max(|sin heading|, |cos heading|)`, the cardinal-direction rate
/// used in place of the scalar ROS when `CARDINAL_ROS` is set.
pub fn cardinal_ros(ros: MetersPerMinute, heading: Degrees) -> MetersPerMinute {
    let radians = f64::from(heading.to_radians().0);
    let factor = radians.sin().abs().max(radians.cos().abs());
    MetersPerMinute(ros.0 * factor as f32)
}

impl ActiveFire {
    /// §4.5 `calculate_end_time`: adaptive step size for this fire alone;
    /// the time step as a whole takes the minimum over every active fire.
    pub fn calculate_end_time(&self, ctx: &EndTimeContext) -> WTimeSpan {
        let temporal_threshold_secs = ctx.temporal_threshold_acceleration_secs.unwrap_or(3600.0).max(0.0);

        let effective_ros = if ctx.cardinal_ros_enabled {
            cardinal_ros(self.max_ros, self.max_ros_heading)
        } else {
            self.max_ros
        };

        if effective_ros.value() < ctx.minimum_ros.value() || !ctx.in_burning_period {
            return WTimeSpan::from_secs(temporal_threshold_secs as i64);
        }

        let spatial_secs = if effective_ros.value() > 1e-9 {
            f64::from(ctx.spatial_threshold.value()) / f64::from(effective_ros.value()) * 60.0
        } else {
            f64::INFINITY
        };

        let accelerating = self.min_ros_ratio.value() < 0.9;
        let bound = if accelerating { temporal_threshold_secs } else { 3600.0 };
        WTimeSpan::from_secs(bound.min(spatial_secs) as i64)
    }
}

/// Bounding-box pre-filter for merge-by-proximity: `true` when the two
/// fires' boxes, inflated by `radius`, could possibly be within `radius` of
/// one another. A cheap reject before the exact vertex-distance test.
pub fn bbox_within(a: &Rect, b: &Rect, radius: f64) -> bool {
    a.inflate(radius).intersects(b)
}

/// Exact proximity test: the minimum distance between any vertex of `a` and
/// any vertex of `b` is within `radius`. Quadratic in vertex count; callers
/// only reach this after `bbox_within` passes.
pub fn vertices_within(a: &[XyPoint], b: &[XyPoint], radius: f64) -> bool {
    for &pa in a {
        for &pb in b {
            if distance(pa, pb) <= radius {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinal_ros_at_45_degrees_uses_either_axis_equally() {
        let ros = MetersPerMinute(10.0);
        let r = cardinal_ros(ros, Degrees(45.0));
        assert!((r.0 - 10.0 * std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn calculate_end_time_uses_temporal_threshold_below_minimum_ros() {
        let fire = ActiveFire {
            max_ros: MetersPerMinute(0.0001),
            ..ActiveFire::new(XyPoint::new(0.0, 0.0), Rect::from_point(XyPoint::new(0.0, 0.0)))
        };
        let ctx = EndTimeContext {
            minimum_ros: MetersPerMinute(0.001),
            in_burning_period: true,
            temporal_threshold_acceleration_secs: Some(120.0),
            spatial_threshold: Meters(100.0),
            cardinal_ros_enabled: false,
        };
        assert_eq!(fire.calculate_end_time(&ctx).secs(), 120);
    }

    #[test]
    fn calculate_end_time_caps_at_one_hour_outside_acceleration() {
        let fire = ActiveFire {
            max_ros: MetersPerMinute(0.0001),
            min_ros_ratio: Fraction::ONE,
            ..ActiveFire::new(XyPoint::new(0.0, 0.0), Rect::from_point(XyPoint::new(0.0, 0.0)))
        };
        let ctx = EndTimeContext {
            minimum_ros: MetersPerMinute(0.00001),
            in_burning_period: true,
            temporal_threshold_acceleration_secs: Some(120.0),
            spatial_threshold: Meters(100.0),
            cardinal_ros_enabled: false,
        };
        assert_eq!(fire.calculate_end_time(&ctx).secs(), 3600);
    }

    #[test]
    fn bbox_within_rejects_far_apart_boxes() {
        let a = Rect::from_point(XyPoint::new(0.0, 0.0));
        let b = Rect::from_point(XyPoint::new(1000.0, 1000.0));
        assert!(!bbox_within(&a, &b, 10.0));
    }
}
