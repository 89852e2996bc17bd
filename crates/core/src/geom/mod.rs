//! Vector geometry substrate: points, polygons, set operations and grid ray tracing.

pub mod point;
pub mod poly;
pub mod polyset;
pub mod raytrace;

pub use point::{distance, distance_sq, Rect, XyPoint, XyzPoint};
pub use poly::{NewVertexStatus, Poly, PolygonNode};
pub use polyset::{point_in_ring, segment_intersection, ClipMetrics, ClipOp, PolySet, DEFAULT_FUDGE};
pub use raytrace::{ray_trace, CellVisit};
