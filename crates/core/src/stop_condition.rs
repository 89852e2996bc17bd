//! `StopCondition`/`StopConditionState` (§4.8): optional thresholds that end
//! a simulation early, each with its own "how long has this held" latch so a
//! single noisy step doesn't trigger a premature stop.
//!
//! `FI90`/`FI95`/`FI100` and `area`/`burnDistance`/`precip` stats come from
//! wherever `Scenario`/`stats.rs` computes them; this module only owns the
//! threshold comparison and the duration-latch bookkeeping, mirroring how
//! `ActiveFire::calculate_end_time` takes its inputs as a plain context
//! rather than reaching into scenario state itself.

use crate::time::{WTime, WTimeSpan};
use crate::units::{Fraction, Meters};

/// A percentile-of-FI stop: burning is considered to have died down once the
/// percentage of perimeter below `fi_threshold` exceeds `cap` for `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiThreshold {
    pub fi_threshold: f64,
    pub cap: Fraction,
    pub duration: WTimeSpan,
}

impl FiThreshold {
    pub fn fi90(fi_threshold: f64, duration: WTimeSpan) -> Self {
        FiThreshold { fi_threshold, cap: Fraction::new(0.90), duration }
    }

    pub fn fi95(fi_threshold: f64, duration: WTimeSpan) -> Self {
        FiThreshold { fi_threshold, cap: Fraction::new(0.95), duration }
    }

    pub fn fi100(fi_threshold: f64, duration: WTimeSpan) -> Self {
        FiThreshold { fi_threshold, cap: Fraction::new(0.999), duration }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrecipThreshold {
    pub threshold_mm: f64,
    pub window: WTimeSpan,
}

/// A scenario's configured stop thresholds. Each field is `None` when that
/// condition is disabled; `response_time` gates all of them together.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StopCondition {
    /// No stop condition is even evaluated until this long after a fire's
    /// ignition (the earliest ignition across all active fires, in practice).
    pub response_time: WTimeSpan,
    pub fi90: Option<FiThreshold>,
    pub fi95: Option<FiThreshold>,
    pub fi100: Option<FiThreshold>,
    /// RH has a duration latch but no threshold of its own here; `rh_holds`
    /// in [`StepStatInputs`] already reflects whatever RH/FWI comparison the
    /// caller performs.
    pub rh: Option<WTimeSpan>,
    pub precip: Option<PrecipThreshold>,
    pub area: Option<f64>,
    pub burn_distance: Option<Meters>,
}

impl StopCondition {
    pub fn anything_enabled(&self) -> bool {
        self.fi90.is_some()
            || self.fi95.is_some()
            || self.fi100.is_some()
            || self.rh.is_some()
            || self.precip.is_some()
            || self.area.is_some()
            || self.burn_distance.is_some()
    }
}

/// Per-step stat values fed into [`StopCondition::evaluate_step`]; `None`
/// when the corresponding stat wasn't computed this step (condition is then
/// treated as still holding, i.e. no stop pressure from it).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepStatInputs {
    pub fi90_stat: Option<f64>,
    pub fi95_stat: Option<f64>,
    pub fi100_stat: Option<f64>,
    pub precip_mm: Option<f64>,
    pub area_m2: Option<f64>,
    pub burn_distance_m: Option<f64>,
    pub rh_holds: bool,
}

/// Whether each condition currently holds (burning may continue). Mirrors
/// the original's `StopConditionState`, including its asymmetric default:
/// every stat defaults to "holding" except RH, which starts closed until a
/// caller marks it open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopConditionState {
    pub fi90_holds: bool,
    pub fi95_holds: bool,
    pub fi100_holds: bool,
    pub rh_holds: bool,
    pub precip_holds: bool,
    pub area_holds: bool,
    pub burn_distance_holds: bool,
}

impl Default for StopConditionState {
    fn default() -> Self {
        StopConditionState {
            fi90_holds: true,
            fi95_holds: true,
            fi100_holds: true,
            rh_holds: false,
            precip_holds: true,
            area_holds: true,
            burn_distance_holds: true,
        }
    }
}

impl StopCondition {
    /// Recompute which conditions hold this step, from whatever stats the
    /// caller managed to produce.
    pub fn evaluate_step(&self, inputs: &StepStatInputs) -> StopConditionState {
        let fi_holds = |cfg: Option<FiThreshold>, stat: Option<f64>| match (cfg, stat) {
            (Some(fi), Some(value)) => value <= f64::from(fi.cap.value()) * 100.0,
            _ => true,
        };
        StopConditionState {
            fi90_holds: fi_holds(self.fi90, inputs.fi90_stat),
            fi95_holds: fi_holds(self.fi95, inputs.fi95_stat),
            fi100_holds: fi_holds(self.fi100, inputs.fi100_stat),
            rh_holds: inputs.rh_holds,
            precip_holds: match (self.precip, inputs.precip_mm) {
                (Some(p), Some(mm)) => mm <= p.threshold_mm,
                _ => true,
            },
            area_holds: match (self.area, inputs.area_m2) {
                (Some(thr), Some(a)) => a < thr,
                _ => true,
            },
            burn_distance_holds: match (self.burn_distance, inputs.burn_distance_m) {
                (Some(thr), Some(d)) => d < f64::from(thr.value()),
                _ => true,
            },
        }
    }
}

/// One past step's recorded state, for walking the duration latch backward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepHistoryEntry {
    pub time: WTime,
    pub state: StopConditionState,
    pub can_burn: bool,
}

/// Whether a condition has held continuously (ignoring non-burning steps,
/// which don't count against the streak) for at least `duration` ending at
/// `current_time`. `history` must be ordered most-recent-first and exclude
/// the current step.
fn duration_expired(
    duration: WTimeSpan,
    current_time: WTime,
    history: &[StepHistoryEntry],
    holds: impl Fn(&StopConditionState) -> bool,
) -> bool {
    let cutoff = current_time - duration;
    for entry in history {
        if entry.time < cutoff {
            return true;
        }
        if holds(&entry.state) || !entry.can_burn {
            return false;
        }
    }
    false
}

/// Why a scenario stopped early, matching one enabled [`StopCondition`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Precip,
    Rh,
    Fi90,
    Fi95,
    Fi100,
    Area,
    BurnDistance,
}

impl StopCondition {
    /// §`CheckStops`: does this step's state, plus enough history to clear
    /// every duration latch, trigger a stop? `ignition_times` is every active
    /// fire's ignition instant, used to compute when `response_time` expires.
    pub fn check_stop(
        &self,
        state: &StopConditionState,
        history: &[StepHistoryEntry],
        ignition_times: &[WTime],
        current_time: WTime,
        centroid_can_burn: bool,
    ) -> Option<StopReason> {
        if !self.anything_enabled() {
            return None;
        }
        if self.response_time > WTimeSpan::ZERO {
            let earliest = ignition_times.iter().map(|&t| t + self.response_time).min();
            if let Some(earliest) = earliest {
                if current_time < earliest {
                    return None;
                }
            }
        }
        if !centroid_can_burn {
            return None;
        }

        if self.precip.is_some() && !state.precip_holds {
            return Some(StopReason::Precip);
        }
        if let Some(duration) = self.rh {
            if !state.rh_holds && duration_expired(duration, current_time, history, |s| s.rh_holds) {
                return Some(StopReason::Rh);
            }
        }
        if let Some(fi) = self.fi90 {
            if !state.fi90_holds && duration_expired(fi.duration, current_time, history, |s| s.fi90_holds) {
                return Some(StopReason::Fi90);
            }
        }
        if let Some(fi) = self.fi95 {
            if !state.fi95_holds && duration_expired(fi.duration, current_time, history, |s| s.fi95_holds) {
                return Some(StopReason::Fi95);
            }
        }
        if let Some(fi) = self.fi100 {
            if !state.fi100_holds && duration_expired(fi.duration, current_time, history, |s| s.fi100_holds) {
                return Some(StopReason::Fi100);
            }
        }
        if self.area.is_some() && !state.area_holds {
            return Some(StopReason::Area);
        }
        if self.burn_distance.is_some() && !state.burn_distance_holds {
            return Some(StopReason::BurnDistance);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anything_enabled_is_false_for_default() {
        assert!(!StopCondition::default().anything_enabled());
    }

    #[test]
    fn area_condition_stops_once_threshold_reached() {
        let cond = StopCondition {
            area: Some(1_000.0),
            ..StopCondition::default()
        };
        let inputs = StepStatInputs {
            area_m2: Some(1_500.0),
            ..Default::default()
        };
        let state = cond.evaluate_step(&inputs);
        assert!(!state.area_holds);
        let reason = cond.check_stop(&state, &[], &[], WTime::from_unix_secs(0), true);
        assert_eq!(reason, Some(StopReason::Area));
    }

    #[test]
    fn precip_above_threshold_stops_immediately_no_latch() {
        let cond = StopCondition {
            precip: Some(PrecipThreshold {
                threshold_mm: 5.0,
                window: WTimeSpan::from_secs(3600),
            }),
            ..StopCondition::default()
        };
        let inputs = StepStatInputs {
            precip_mm: Some(10.0),
            ..Default::default()
        };
        let state = cond.evaluate_step(&inputs);
        let reason = cond.check_stop(&state, &[], &[], WTime::from_unix_secs(0), true);
        assert_eq!(reason, Some(StopReason::Precip));
    }

    #[test]
    fn fi90_waits_for_duration_before_stopping() {
        let cond = StopCondition {
            fi90: Some(FiThreshold::fi90(50.0, WTimeSpan::from_secs(3600))),
            ..StopCondition::default()
        };
        let now = WTime::from_unix_secs(10_000);
        let inputs = StepStatInputs {
            fi90_stat: Some(99.0),
            ..Default::default()
        };
        let state = cond.evaluate_step(&inputs);
        assert!(!state.fi90_holds);

        // Only a short, all-sub-threshold history: duration hasn't expired.
        let recent_history = [StepHistoryEntry {
            time: WTime::from_unix_secs(9_900),
            state,
            can_burn: true,
        }];
        assert_eq!(cond.check_stop(&state, &recent_history, &[], now, true), None);

        // History stretches past the one-hour cutoff without a break: stop.
        let long_history = [
            StepHistoryEntry {
                time: WTime::from_unix_secs(9_900),
                state,
                can_burn: true,
            },
            StepHistoryEntry {
                time: WTime::from_unix_secs(6_000),
                state,
                can_burn: true,
            },
        ];
        assert_eq!(cond.check_stop(&state, &long_history, &[], now, true), Some(StopReason::Fi90));
    }

    #[test]
    fn non_burning_step_in_history_resets_the_latch() {
        let cond = StopCondition {
            fi90: Some(FiThreshold::fi90(50.0, WTimeSpan::from_secs(3600))),
            ..StopCondition::default()
        };
        let now = WTime::from_unix_secs(10_000);
        let inputs = StepStatInputs {
            fi90_stat: Some(99.0),
            ..Default::default()
        };
        let state = cond.evaluate_step(&inputs);
        let history = [
            StepHistoryEntry {
                time: WTime::from_unix_secs(9_900),
                state,
                can_burn: false,
            },
            StepHistoryEntry {
                time: WTime::from_unix_secs(6_000),
                state,
                can_burn: true,
            },
        ];
        assert_eq!(cond.check_stop(&state, &history, &[], now, true), None);
    }

    #[test]
    fn response_time_delays_all_conditions() {
        let cond = StopCondition {
            response_time: WTimeSpan::from_secs(3600),
            area: Some(1.0),
            ..StopCondition::default()
        };
        let inputs = StepStatInputs {
            area_m2: Some(2.0),
            ..Default::default()
        };
        let state = cond.evaluate_step(&inputs);
        let ignitions = [WTime::from_unix_secs(0)];
        assert_eq!(cond.check_stop(&state, &[], &ignitions, WTime::from_unix_secs(1800), true), None);
        assert_eq!(
            cond.check_stop(&state, &[], &ignitions, WTime::from_unix_secs(3600), true),
            Some(StopReason::Area)
        );
    }

    #[test]
    fn non_burning_centroid_suppresses_every_condition() {
        let cond = StopCondition {
            area: Some(1.0),
            ..StopCondition::default()
        };
        let inputs = StepStatInputs {
            area_m2: Some(2.0),
            ..Default::default()
        };
        let state = cond.evaluate_step(&inputs);
        assert_eq!(cond.check_stop(&state, &[], &[], WTime::from_unix_secs(0), false), None);
    }
}
