//! Error taxonomy shared by every fallible public entry point.
//!
//! `CoreError` is hand-rolled rather than derived: the originating reference
//! architecture's persistence layer hand-writes its error enum with manual
//! `Display`/`Error` impls, and this module follows the same convention
//! rather than introducing a derive-macro dependency.

use std::fmt;

/// The shared error taxonomy. Every kind here names a *situation*, not an
/// exception class: callers match on these to decide how to recover, log, or
/// surface a message to a user.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// An operation was requested out of its required sequence (e.g. `step`
    /// before a scenario has any ignitions configured).
    BadState(&'static str),
    /// A time range is invalid: start at or after end, zero-length, longer
    /// than a year, or not aligned to whole seconds.
    BadTimes { start: f64, end: f64 },
    /// `step` was requested but the scenario has no active fires.
    NoFires,
    /// The scenario has no ignition sources configured at all.
    NoIgnitionsConfigured,
    /// A required grid (fuel, elevation, ...) was never attached.
    GridUninitialized,
    /// Serialized scenario data failed to parse.
    ///
    /// The CORE never constructs this variant itself; it is retained so that
    /// a host's persistence layer can report through the same taxonomy
    /// consumers already match on.
    ProtobufInvalid,
    /// Serialized scenario data parsed but carries an unsupported format version.
    ProtobufVersionInvalid { found: u32, supported: u32 },
    /// A configuration field was outside its valid range.
    ValueInvalid {
        field: &'static str,
        message: String,
    },
    /// An asset id was referenced that the scenario does not know about.
    AssetUnknown(u32),
    /// An asset was queried for arrival time but has not arrived.
    AssetNotArrived(u32),
    /// A fire id was referenced that does not exist in the current step.
    FireUnknown(u32),
    /// A query point does not lie inside any tracked fire.
    PointNotInFire,
    /// A step's geometry work would exceed the configured vertex/polygon
    /// budget. Synthesized before the allocation that would exceed it is
    /// made, since catching a real allocation failure is not possible in
    /// safe, stable Rust.
    OutOfMemory { requested: usize, budget: usize },
    /// A named statistic was requested that this engine does not compute.
    StatUnknown(&'static str),
    /// An option combination failed `ScenarioOptions::validate()` at the
    /// `Severe` level.
    OptionInvalid(ValidationNode),
    /// A spatial reference system lookup failed.
    ///
    /// Projection handling is an out-of-scope collaborator; retained for the
    /// same reason as `ProtobufInvalid`.
    ProjectionUnknown,
    /// Multi-child validation failure from `ScenarioOptions::validate()`.
    Validation(ValidationNode),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::BadState(msg) => write!(f, "invalid operation order: {msg}"),
            CoreError::BadTimes { start, end } => {
                write!(f, "invalid time range: start={start} end={end}")
            }
            CoreError::NoFires => write!(f, "scenario has no active fires"),
            CoreError::NoIgnitionsConfigured => {
                write!(f, "scenario has no ignition sources configured")
            }
            CoreError::GridUninitialized => write!(f, "required grid was never attached"),
            CoreError::ProtobufInvalid => write!(f, "serialized scenario data is invalid"),
            CoreError::ProtobufVersionInvalid { found, supported } => write!(
                f,
                "serialized scenario format version {found} is unsupported (expected {supported})"
            ),
            CoreError::ValueInvalid { field, message } => {
                write!(f, "invalid value for `{field}`: {message}")
            }
            CoreError::AssetUnknown(id) => write!(f, "unknown asset id {id}"),
            CoreError::AssetNotArrived(id) => write!(f, "asset {id} has not arrived"),
            CoreError::FireUnknown(id) => write!(f, "unknown fire id {id}"),
            CoreError::PointNotInFire => write!(f, "point does not lie inside any fire"),
            CoreError::OutOfMemory { requested, budget } => write!(
                f,
                "step would allocate {requested} vertices/polygons, exceeding budget {budget}"
            ),
            CoreError::StatUnknown(name) => write!(f, "unknown statistic `{name}`"),
            CoreError::OptionInvalid(node) => write!(f, "invalid scenario option: {node}"),
            CoreError::ProjectionUnknown => write!(f, "unknown spatial reference system"),
            CoreError::Validation(node) => write!(f, "validation failed: {node}"),
        }
    }
}

impl std::error::Error for CoreError {}

/// Severity of a single `ValidationNode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Severe => "severe",
        };
        write!(f, "{s}")
    }
}

/// One node of a recursive validation report.
///
/// `ScenarioOptions::validate()` returns a tree rather than failing on the
/// first bad field, so a caller can surface every problem (and every
/// non-fatal warning) in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationNode {
    pub name: &'static str,
    pub severity: Severity,
    pub message: Option<String>,
    pub children: Vec<ValidationNode>,
}

impl ValidationNode {
    pub fn leaf(name: &'static str, severity: Severity, message: impl Into<String>) -> Self {
        ValidationNode {
            name,
            severity,
            message: Some(message.into()),
            children: Vec::new(),
        }
    }

    pub fn group(name: &'static str, children: Vec<ValidationNode>) -> Self {
        let severity = children
            .iter()
            .map(|c| c.severity)
            .max()
            .unwrap_or(Severity::Info);
        ValidationNode {
            name,
            severity,
            message: None,
            children,
        }
    }

    /// The highest severity anywhere in the subtree rooted here.
    pub fn worst_severity(&self) -> Severity {
        self.children
            .iter()
            .map(ValidationNode::worst_severity)
            .max()
            .unwrap_or(self.severity)
            .max(self.severity)
    }

    /// Whether any node in the subtree is `Severity::Severe`.
    pub fn has_severe(&self) -> bool {
        self.worst_severity() == Severity::Severe
    }

    /// Flatten into `(path, severity, message)` triples, depth-first.
    pub fn flatten(&self) -> Vec<(String, Severity, Option<String>)> {
        let mut out = Vec::new();
        self.flatten_into(String::new(), &mut out);
        out
    }

    fn flatten_into(&self, prefix: String, out: &mut Vec<(String, Severity, Option<String>)>) {
        let path = if prefix.is_empty() {
            self.name.to_string()
        } else {
            format!("{prefix}.{}", self.name)
        };
        if self.message.is_some() || self.children.is_empty() {
            out.push((path.clone(), self.severity, self.message.clone()));
        }
        for child in &self.children {
            child.flatten_into(path.clone(), out);
        }
    }
}

impl fmt::Display for ValidationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (path, severity, message) in self.flatten() {
            match message {
                Some(m) => writeln!(f, "[{severity}] {path}: {m}")?,
                None => writeln!(f, "[{severity}] {path}")?,
            }
        }
        Ok(())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
