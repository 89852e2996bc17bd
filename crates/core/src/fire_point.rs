//! `FirePoint`: a single perimeter vertex and the per-vertex FBP/vector
//! scalars computed for it each step.

use crate::geom::point::XyPoint;
use crate::units::{Degrees, Fraction, MetersPerMinute};

/// Arena index for a `FirePoint` within one `ScenarioTimeStep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointId(pub u32);

/// Arena index for a `FireFront` within one `ScenarioTimeStep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrontId(pub u32);

/// Index of a `ScenarioTimeStep` within `Scenario::steps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepIndex(pub u32);

/// A cross-step back-reference, validated on dereference since the
/// referenced step may have been purged. `point` indexes within `front`'s
/// own vertex list (see `FireFront`'s `Vec<FirePoint>`), not a flat
/// per-step arena — a front's vertices move together often enough that
/// scoping the index to it avoids an extra indirection on every lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalPointRef {
    pub step: StepIndex,
    pub front: FrontId,
    pub point: PointId,
}

/// A cross-step back-reference to a whole front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalFrontRef {
    pub step: StepIndex,
    pub front: FrontId,
}

/// The state machine a vertex moves through during one step's tracking
/// phase (§4.3). Once non-`Normal`, a vertex does not move for the
/// remainder of that step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    Normal,
    NoRos,
    /// Historical name for "stopped by missing/invalid grid data", kept
    /// because every collaborator and export path already speaks it.
    NoFuel,
    /// Hit another, larger fire's polygon.
    Fire,
    /// Hit a vector break.
    Vector,
    NoWind,
}

impl PointStatus {
    #[inline]
    pub fn is_inert(self) -> bool {
        !matches!(self, PointStatus::Normal)
    }
}

/// The FBP outputs computed for a vertex at the ellipse spread rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FbpScalars {
    pub raz: Degrees,
    pub rsi: f32,
    pub roseq: f32,
    pub ros: f32,
    pub fros: f32,
    pub bros: f32,
    pub ros_ratio: Fraction,
    pub cfb: Fraction,
    pub fi: f32,
}

/// The same quantities recomputed at the vector (actual displacement)
/// magnitude rather than the ellipse rate.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VectorScalars {
    pub ros: MetersPerMinute,
    pub cfb: Fraction,
    pub cfc: f32,
    pub sfc: f32,
    pub tfc: f32,
    pub fi: f32,
}

/// One perimeter vertex.
#[derive(Debug, Clone)]
pub struct FirePoint {
    pub position: XyPoint,
    pub status: PointStatus,
    /// 2-D spread velocity from the ellipse evaluation, in metres per minute
    /// (not yet scaled by the step duration; `FireFront::advance` does that).
    pub ellipse_ros: XyPoint,
    pub fbp: FbpScalars,
    pub vector: VectorScalars,
    pub flame_length: f32,
    pub successful_breach: bool,
    /// Back-link to the corresponding vertex in the previous step; `None`
    /// for a vertex introduced this step (by add-points or a set operation).
    pub prev_point: Option<GlobalPointRef>,
}

impl FirePoint {
    pub fn new(position: XyPoint) -> Self {
        FirePoint {
            position,
            status: PointStatus::Normal,
            ellipse_ros: XyPoint::new(0.0, 0.0),
            fbp: FbpScalars::default(),
            vector: VectorScalars::default(),
            flame_length: 0.0,
            successful_breach: false,
            prev_point: None,
        }
    }

    #[inline]
    pub fn vector_ros_magnitude(&self) -> f64 {
        self.ellipse_ros.norm()
    }

    /// Mark inert per §4.2: vertex below `minimumROS` keeps position, zeroes
    /// its ellipse velocity, and reports a unit ROS ratio for auditing.
    pub fn mark_inert(&mut self, status: PointStatus) {
        debug_assert!(status != PointStatus::Normal);
        self.status = status;
        self.ellipse_ros = XyPoint::new(0.0, 0.0);
        self.fbp.ros_ratio = Fraction::ONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_point_starts_normal_and_mobile() {
        let p = FirePoint::new(XyPoint::new(1.0, 2.0));
        assert_eq!(p.status, PointStatus::Normal);
        assert!(!p.status.is_inert());
    }

    #[test]
    fn mark_inert_zeroes_velocity_and_sets_ratio() {
        let mut p = FirePoint::new(XyPoint::new(0.0, 0.0));
        p.ellipse_ros = XyPoint::new(3.0, 4.0);
        p.mark_inert(PointStatus::NoRos);
        assert_eq!(p.ellipse_ros, XyPoint::new(0.0, 0.0));
        assert_eq!(p.fbp.ros_ratio, Fraction::ONE);
        assert!(p.status.is_inert());
    }
}
