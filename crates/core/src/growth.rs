//! Vertex growth kernels (§4.2): 2-D elliptical and 3-D Richards growth, plus
//! the acceleration and wind-targeting corrections applied before either
//! kernel runs.

use crate::geom::point::{XyPoint, XyzPoint};
use crate::units::{Degrees, MetersPerMinute, Seconds};

/// The three FBP-derived rates that parametrize the spread ellipse: heading,
/// flank, and back rate of spread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseRates {
    pub ros: MetersPerMinute,
    pub fros: MetersPerMinute,
    pub bros: MetersPerMinute,
    pub raz: Degrees,
}

/// Ellipse semi-axes and focus offset derived from `EllipseRates`.
struct EllipseShape {
    a: f64,
    b: f64,
    c: f64,
}

impl EllipseRates {
    fn shape(&self) -> EllipseShape {
        let ros = f64::from(self.ros.0);
        let bros = f64::from(self.bros.0);
        EllipseShape {
            a: (ros + bros) / 2.0,
            b: f64::from(self.fros.0),
            c: (ros - bros) / 2.0,
        }
    }
}

/// Evaluate the ellipse at the parametric angle whose tangent points in
/// `local_tangent` (already expressed in the ellipse's own frame, x-axis
/// along the spread azimuth). Returns `None` if the tangent direction is
/// degenerate (zero-length), which leaves the ellipse parameter indeterminate.
fn tangent_point(shape: &EllipseShape, local_tangent: XyPoint) -> Option<XyPoint> {
    let dx = local_tangent.x;
    let dy = local_tangent.y;
    let num = -shape.b * dx;
    let den = shape.a * dy;
    if num.abs() < 1e-12 && den.abs() < 1e-12 {
        return None;
    }
    let phi = num.atan2(den);
    Some(XyPoint::new(shape.c + shape.a * phi.cos(), shape.b * phi.sin()))
}

/// The azimuth-aligned local frame's basis vectors, expressed in world
/// coordinates: `heading` along the compass spread direction (RAZ is a
/// compass bearing, so `(sin, cos)` rather than a bare `(cos, sin)` unit
/// vector), `perp` its right-hand perpendicular. Matches `grow3d`'s
/// `theta`/`n_cross_theta` pair on flat terrain.
fn compass_frame(raz: f64) -> (XyPoint, XyPoint) {
    let (s, c) = raz.sin_cos();
    (XyPoint::new(s, c), XyPoint::new(-c, s))
}

/// Project a world-frame vector into the azimuth-aligned local frame.
fn to_local(v: XyPoint, heading: XyPoint, perp: XyPoint) -> XyPoint {
    XyPoint::new(v.dot(&heading), v.dot(&perp))
}

/// Map a local-frame vector back into world coordinates.
fn to_world(v: XyPoint, heading: XyPoint, perp: XyPoint) -> XyPoint {
    heading * v.x + perp * v.y
}

/// 2-D elliptical growth: `prev`/`succ` are the neighbouring vertex
/// positions in internal coordinates. Returns the 2-D spread velocity
/// (internal units per minute) or `None` if the point is immobile (the
/// perimeter tangent is degenerate, i.e. `prev == succ == curr`).
pub fn grow2d(curr: XyPoint, prev: XyPoint, succ: XyPoint, rates: EllipseRates) -> Option<XyPoint> {
    let tangent = succ - prev;
    if tangent.norm() < 1e-12 {
        return None;
    }
    let azimuth = f64::from(rates.raz.to_radians().0);
    let (heading, perp) = compass_frame(azimuth);
    let local_tangent = to_local(tangent, heading, perp);
    let shape = rates.shape();
    let local_velocity = tangent_point(&shape, local_tangent)?;
    let _ = curr;
    Some(to_world(local_velocity, heading, perp))
}

/// 3-D Richards growth: accounts for slope via the upslope unit vector.
/// `aspect` is the compass direction terrain faces downhill; `slope` is
/// rise/run (dimensionless). `curr`/`prev`/`succ` carry elevation.
pub fn grow3d(
    curr: XyzPoint,
    prev: XyzPoint,
    succ: XyzPoint,
    aspect: Degrees,
    slope: f64,
    rates: EllipseRates,
) -> Option<XyPoint> {
    let az = f64::from(aspect.to_radians().0);
    let raz = f64::from(rates.raz.to_radians().0);

    let f = XyzPoint::new(az.cos(), az.sin(), slope);
    let f_perp = XyzPoint::new(-az.sin(), az.cos(), 0.0);
    let mut normal = f.cross(&f_perp);
    if normal.z < 0.0 {
        normal = -normal;
    }
    if normal.norm() < 1e-12 {
        return None;
    }
    let normal = normal.normalize();

    let theta_z = (az.cos() * raz.sin() + az.sin() * raz.cos()) * slope;
    let mut theta = XyzPoint::new(raz.sin(), raz.cos(), theta_z);
    if theta.norm() < 1e-12 {
        return None;
    }
    theta = theta.normalize();

    let seg_prev = curr - prev;
    let seg_succ = succ - curr;
    // Length-weighted sum, not a difference: the perimeter tangent points
    // the same way the 2-D tangent (`succ - prev`) does when both segments
    // are equal length.
    let mut r = seg_succ * seg_succ.norm() + seg_prev * seg_prev.norm();
    if r.norm() < 1e-12 {
        return None;
    }
    r = r.normalize() * (seg_prev.norm() + seg_succ.norm());
    if r.norm() < 1e-12 {
        return None;
    }

    let n = r.cross(&normal);
    if n.norm() < 1e-12 {
        return None;
    }
    let n = n.normalize();

    let cos_alpha = n.dot(&theta);
    let sin_alpha = normal.cross(&theta).dot(&n);
    let alpha = sin_alpha.atan2(cos_alpha);

    let shape = rates.shape();
    let x_alpha = shape.c + shape.a * alpha.cos();
    let y_alpha = shape.b * alpha.sin();

    let n_cross_theta = normal.cross(&theta);
    let spread = theta * x_alpha + n_cross_theta * y_alpha;
    Some(XyPoint::new(spread.x, spread.y))
}

/// Acceleration correction (§4.2): only point ignitions use the FBP
/// acceleration term. `elapsed` is time since ignition, clamped up from zero
/// the same way the source clamps a zero delta to one second.
pub fn acceleration_dt(now: Seconds, ignition_time: Seconds) -> Seconds {
    let dt = now.0 - ignition_time.0;
    if dt <= 0.0 {
        Seconds(1.0)
    } else {
        Seconds(dt)
    }
}

/// Wind targeting (§4.2): when a target point is present, the effective
/// wind direction at a vertex is the compass bearing from the vertex to the
/// target, with an additive user offset (`dwd`) applied afterward,
/// unconditionally (matches the reference order; large deltas may point the
/// heading away from the target rather than being clamped back toward it).
pub fn target_wind_direction(vertex: XyPoint, target: XyPoint, dwd: Degrees) -> Degrees {
    let delta = target - vertex;
    let bearing = delta.x.atan2(delta.y).to_degrees();
    let bearing = Degrees(bearing as f32);
    Degrees(bearing.0 + dwd.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rates(ros: f32, fros: f32, bros: f32, raz: f32) -> EllipseRates {
        EllipseRates {
            ros: MetersPerMinute(ros),
            fros: MetersPerMinute(fros),
            bros: MetersPerMinute(bros),
            raz: Degrees(raz),
        }
    }

    #[test]
    fn grow2d_circular_ellipse_matches_ros_in_heading_direction() {
        // Circular case (ros == fros == bros): the velocity magnitude should
        // equal the rate regardless of tangent direction.
        let r = rates(10.0, 10.0, 10.0, 0.0);
        let curr = XyPoint::new(0.0, 0.0);
        let prev = XyPoint::new(-1.0, 0.0);
        let succ = XyPoint::new(1.0, 0.0);
        let v = grow2d(curr, prev, succ, r).unwrap();
        assert_relative_eq!(v.norm(), 10.0, epsilon = 1e-6);
    }

    #[test]
    fn grow2d_degenerate_tangent_is_immobile() {
        let r = rates(10.0, 5.0, 1.0, 0.0);
        let p = XyPoint::new(0.0, 0.0);
        assert!(grow2d(p, p, p, r).is_none());
    }

    #[test]
    fn grow2d_head_of_ellipse_points_due_east_for_compass_east_raz() {
        // RAZ=90 deg is compass east. A tangent perpendicular to the
        // heading (the ellipse's nose) must spread at exactly `ros` due
        // east: a+c == ros at that point, by construction of the ellipse.
        let r = rates(10.0, 4.0, 2.0, 90.0);
        let curr = XyPoint::new(0.0, 0.0);
        let prev = XyPoint::new(0.0, -1.0);
        let succ = XyPoint::new(0.0, 1.0);
        let v = grow2d(curr, prev, succ, r).unwrap();
        assert_relative_eq!(v.x, 10.0, epsilon = 1e-6);
        assert_relative_eq!(v.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn grow3d_on_flat_terrain_reduces_to_a_sensible_magnitude() {
        let r = rates(10.0, 6.0, 2.0, 0.0);
        let curr = XyzPoint::new(0.0, 0.0, 0.0);
        let prev = XyzPoint::new(-1.0, 0.0, 0.0);
        let succ = XyzPoint::new(1.0, 0.0, 0.0);
        let v = grow3d(curr, prev, succ, Degrees(0.0), 0.0, r);
        assert!(v.is_some());
        let v = v.unwrap();
        assert!(v.norm() > 0.0);
    }

    #[test]
    fn grow3d_tangent_is_a_weighted_sum_not_a_difference() {
        // Equal-length, perpendicular prev/succ segments on flat terrain:
        // the perimeter tangent must be `seg_succ + seg_prev` (matching the
        // 2-D convention `succ - prev`), not `seg_succ - seg_prev`. The two
        // conventions diverge sharply for fros != bros; this pins the
        // resulting spread vector to the value the weighted-sum tangent
        // produces.
        let r = rates(10.0, 4.0, 2.0, 0.0);
        let curr = XyzPoint::new(0.0, 0.0, 0.0);
        let prev = curr - XyzPoint::new(1.0, 0.0, 0.0);
        let succ = curr + XyzPoint::new(0.0, 1.0, 0.0);
        let v = grow3d(curr, prev, succ, Degrees(0.0), 0.0, r).unwrap();
        assert_relative_eq!(v.x, 2.0 * std::f64::consts::SQRT_2, epsilon = 1e-4);
        assert_relative_eq!(v.y, -0.242_640_69, epsilon = 1e-4);
    }

    #[test]
    fn acceleration_dt_clamps_nonpositive_to_one_second() {
        assert_eq!(acceleration_dt(Seconds(100.0), Seconds(100.0)).0, 1.0);
        assert_eq!(acceleration_dt(Seconds(90.0), Seconds(100.0)).0, 1.0);
        assert_eq!(acceleration_dt(Seconds(150.0), Seconds(100.0)).0, 50.0);
    }

    #[test]
    fn target_wind_direction_points_toward_target_before_offset() {
        let vertex = XyPoint::new(0.0, 0.0);
        let target = XyPoint::new(0.0, 10.0);
        let bearing = target_wind_direction(vertex, target, Degrees(0.0));
        assert_relative_eq!(bearing.0, 0.0, epsilon = 1e-3);
    }
}
