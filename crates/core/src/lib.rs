//! Fire growth core library.
//!
//! A time-stepped, vector-based fire-perimeter propagation engine: elliptical
//! and 3-D Richards vertex growth, polygon topology repair via set
//! operations, ray-traced grid/vector-break tracking, interpolated stats
//! queries over a burned front, and event-driven step scheduling.
//!
//! [`Scenario`] is the orchestration seam most callers start from; everything
//! else in this crate is a collaborator it assembles inputs for and
//! interprets outputs from.

pub mod active_fire;
pub mod assets;
pub mod error;
pub mod fire_front;
pub mod fire_point;
pub mod geom;
pub mod grid_cache;
pub mod growth;
pub mod gusting;
pub mod options;
pub mod providers;
pub mod scenario;
pub mod scenario_cache;
pub mod scenario_fire;
pub mod stats;
pub mod stop_condition;
pub mod time;
pub mod time_step;
pub mod units;

pub use error::{CoreError, CoreResult, Severity, ValidationNode};
pub use options::{DefaultElevation, GrowthMode, ScenarioOptions, StopThreshold};
pub use providers::{
    AssetSource, AssetType, AttributeId, AttributeValue, EventSearchFlags, FuelModel, IgnitionSource, IgnitionType,
    InterpFlags, LandscapeProvider, PercentileTable, Target, Validity, VectorSource,
};
pub use scenario::{ExportField, ExportRule, ExportValue, ExportedFeature, Scenario, StepOutcome};
pub use scenario_cache::ScenarioCache;
pub use stats::{PointStat, StatTechnique};
pub use stop_condition::{StopCondition, StopReason};
pub use time::{TimeManager, WTime, WTimeSpan};
