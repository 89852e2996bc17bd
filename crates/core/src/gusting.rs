//! `GustingModel` (§4.?): blends sustained wind speed with gust speed per
//! fire per timestep, per the four modes ported from `GustingOptions.cpp`.
//!
//! The model itself is pure arithmetic over a time point and a short history
//! window; it does not own a fire's history. Callers (`ScenarioTimeStep`)
//! walk a fire's predecessor chain to build the [`GustHistoryEntry`] slice
//! and [`GustContext`] this module needs, the same way `ActiveFire` takes its
//! proximity inputs as plain values rather than reaching into scenario state.

use crate::time::{TimeManager, WTime, WTimeSpan};
use crate::units::Fraction;

/// Which of the four gusting behaviours a scenario configures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GustingMode {
    /// Never gust; `percent_gusting` is always applied to pick up speed.
    None,
    /// Gust at a fixed fraction of every timestep.
    Constant,
    /// Alternate gust/calm within each clock hour, `gusts_per_hour` cycles
    /// of `percent_gusting` length each, shifted by `bias`.
    Periodic,
    /// Alternate gust/calm so the trailing-hour average gusting fraction
    /// tracks `percent_gusting`.
    RollingAverage,
}

/// Which edge of a periodic cycle (or, for [`GustingMode::RollingAverage`],
/// the first-timestep default) the gust window sits against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GustBias {
    /// Gust at the start of each cycle.
    Leading,
    /// Gust centred within each cycle.
    Centered,
    /// Gust at the end of each cycle.
    Trailing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GustingModel {
    pub mode: GustingMode,
    /// Cycles per hour for `Periodic`; ignored otherwise. Validated to 0..=60
    /// at the scenario-option boundary, not here.
    pub gusts_per_hour: u32,
    pub percent_gusting: Fraction,
    pub bias: GustBias,
}

impl GustingModel {
    pub fn new(mode: GustingMode, gusts_per_hour: u32, percent_gusting: Fraction, bias: GustBias) -> Self {
        GustingModel {
            mode,
            gusts_per_hour,
            percent_gusting,
            bias,
        }
    }
}

/// One predecessor step's contribution to a `RollingAverage` fire's recent
/// gusting history: how long it lasted and what fraction it gusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GustHistoryEntry {
    pub duration: WTimeSpan,
    pub gusting: Fraction,
}

/// §`calculateGustPercent`: the duration-weighted average gusting fraction
/// over a caller-assembled window (walked back to the top of the hour, or
/// one hour, whichever comes first). `None` is the "-1" sentinel: no history
/// to average over, either because this is the first timestep or the window
/// carried zero duration.
pub fn rolling_gust_average(entries: &[GustHistoryEntry]) -> Option<Fraction> {
    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;
    for entry in entries {
        let secs = entry.duration.as_seconds_f64();
        numerator += secs * f64::from(entry.gusting.value());
        denominator += secs;
    }
    if denominator <= 0.0 {
        return None;
    }
    Some(Fraction::clamped((numerator / denominator) as f32))
}

/// Inputs to [`GustingModel::percent_gusting`] that vary per fire per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GustContext {
    pub time: WTime,
    pub time_manager: TimeManager,
    /// The gusting fraction this fire carried last step (`Constant`/`None`
    /// ignore it; `Periodic` ignores it; `RollingAverage` alternates on it).
    pub prev_gusting: Fraction,
    /// `rolling_gust_average` over this fire's history, or `None` on the
    /// first timestep. Only consulted in `RollingAverage` mode.
    pub rolling_average: Option<Fraction>,
}

impl GustingModel {
    /// §`PercentGusting`: the gusting fraction to assign for `ctx.time`.
    pub fn percent_gusting(&self, ctx: &GustContext) -> Fraction {
        match self.mode {
            GustingMode::None => Fraction::ZERO,
            GustingMode::Constant => self.percent_gusting,
            GustingMode::Periodic => self.periodic_fraction(ctx.time, &ctx.time_manager),
            GustingMode::RollingAverage => self.rolling_fraction(ctx.prev_gusting, ctx.rolling_average),
        }
    }

    fn cycle_geometry(&self) -> Option<(i64, i64)> {
        if self.gusts_per_hour < 1 {
            return None;
        }
        let duration = 3600 / i64::from(self.gusts_per_hour);
        let gust_duration = (duration as f64 * f64::from(self.percent_gusting.value())) as i64;
        Some((duration, gust_duration))
    }

    /// How far `time` sits past its local clock hour, as whole seconds.
    fn part_of_hour(time: WTime, tm: &TimeManager) -> i64 {
        let local = time.to_local(tm);
        let hour_start = local.unix_secs() - local.unix_secs().rem_euclid(3600);
        local.unix_secs() - hour_start
    }

    fn periodic_fraction(&self, time: WTime, tm: &TimeManager) -> Fraction {
        let Some((duration, gust_duration)) = self.cycle_geometry() else {
            return Fraction::ZERO;
        };
        let part = Self::part_of_hour(time, tm).rem_euclid(duration);
        let gusting = match self.bias {
            GustBias::Leading => part < gust_duration,
            GustBias::Trailing => part >= duration - gust_duration,
            GustBias::Centered => {
                part >= (duration - gust_duration) / 2 && part < (duration + gust_duration) / 2
            }
        };
        if gusting {
            Fraction::ONE
        } else {
            Fraction::ZERO
        }
    }

    fn rolling_fraction(&self, prev_gusting: Fraction, rolling_average: Option<Fraction>) -> Fraction {
        let should_gust = match rolling_average {
            None => self.bias == GustBias::Leading,
            Some(average) => {
                let mut gust = prev_gusting.value() == 0.0;
                if gust {
                    if average.value() > self.percent_gusting.value() {
                        gust = false;
                    }
                } else if average.value() < self.percent_gusting.value() {
                    gust = true;
                }
                gust
            }
        };
        if should_gust {
            Fraction::ONE
        } else {
            Fraction::ZERO
        }
    }
}

/// §`ApplyGusting`: blend sustained and gust wind speed by a fire's assigned
/// gusting fraction.
pub fn apply_gusting(wind_speed: f32, wind_gusting: f32, gusting: Fraction) -> f32 {
    wind_speed * (1.0 - gusting.value()) + wind_gusting * gusting.value()
}

/// Per-fire inputs to [`GustingModel::next_event_time`], mirroring
/// [`GustContext`] plus the running numerator/denominator `RollingAverage`
/// needs to bound how long the current state can continue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GustEventContext {
    pub numerator: WTimeSpan,
    pub denominator: WTimeSpan,
    pub rolling_average: Option<Fraction>,
    pub prev_gusting: Fraction,
}

impl GustingModel {
    /// §`GetEventTime`: the next instant after `from_time` at which this
    /// fire's gusting state should flip, if the mode schedules transitions at
    /// all. `None` and `Constant` never transition mid-step.
    pub fn next_event_time(&self, from_time: WTime, tm: &TimeManager, ctx: &GustEventContext) -> Option<WTime> {
        match self.mode {
            GustingMode::None | GustingMode::Constant => None,
            GustingMode::Periodic => self.periodic_next_event(from_time, tm),
            GustingMode::RollingAverage => self.rolling_next_event(from_time, tm, ctx),
        }
    }

    fn periodic_next_event(&self, from_time: WTime, tm: &TimeManager) -> Option<WTime> {
        let (duration, gust_duration) = self.cycle_geometry()?;
        let part = Self::part_of_hour(from_time, tm);
        let start = part.div_euclid(duration);
        let offset = match self.bias {
            GustBias::Leading => {
                if part.rem_euclid(duration) < gust_duration {
                    duration * start + gust_duration
                } else {
                    duration * (start + 1)
                }
            }
            GustBias::Trailing => {
                if part.rem_euclid(duration) < duration - gust_duration {
                    duration * (start + 1) - gust_duration
                } else {
                    duration * (start + 1)
                }
            }
            GustBias::Centered => {
                let rem = part.rem_euclid(duration);
                if rem < (duration - gust_duration) / 2 {
                    duration * start + (duration - gust_duration) / 2
                } else if rem < (duration + gust_duration) / 2 {
                    duration * start + (duration + gust_duration) / 2
                } else {
                    duration * (start + 1) + (duration - gust_duration) / 2
                }
            }
        };
        // `offset` is seconds past the start of `from_time`'s local hour;
        // `part` is how far `from_time` itself sits past that same local
        // hour start, so `from_time.unix_secs() - part` recovers it as an
        // absolute instant without re-deriving the local offset.
        let hour_start_secs = from_time.unix_secs() - part;
        Some(WTime::from_unix_secs(hour_start_secs + offset))
    }

    fn rolling_next_event(&self, from_time: WTime, tm: &TimeManager, ctx: &GustEventContext) -> Option<WTime> {
        let part = Self::part_of_hour(from_time, tm);
        let remaining_in_hour = WTimeSpan::from_secs(3600 - part);
        let next_hour = from_time + remaining_in_hour;

        let max_gust_remaining_secs = (remaining_in_hour.as_seconds_f64() + ctx.denominator.as_seconds_f64())
            * f64::from(self.percent_gusting.value())
            - ctx.numerator.as_seconds_f64();

        let should_gust = match ctx.rolling_average {
            None => self.bias == GustBias::Leading,
            Some(average) => {
                let mut gust = ctx.prev_gusting.value() == 0.0;
                if gust {
                    if average.value() > self.percent_gusting.value() {
                        gust = false;
                    }
                } else if average.value() < self.percent_gusting.value() {
                    gust = true;
                }
                gust
            }
        };

        if should_gust {
            Some(from_time + WTimeSpan::from_secs(max_gust_remaining_secs.max(0.0) as i64))
        } else {
            Some(next_hour - WTimeSpan::from_secs(max_gust_remaining_secs.max(0.0) as i64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour_aligned(hour: i64) -> WTime {
        WTime::from_unix_secs(hour * 3600)
    }

    #[test]
    fn none_mode_never_gusts() {
        let model = GustingModel::new(GustingMode::None, 0, Fraction::ONE, GustBias::Leading);
        let ctx = GustContext {
            time: hour_aligned(10),
            time_manager: TimeManager::default(),
            prev_gusting: Fraction::ZERO,
            rolling_average: None,
        };
        assert_eq!(model.percent_gusting(&ctx).value(), 0.0);
    }

    #[test]
    fn constant_mode_always_returns_configured_fraction() {
        let model = GustingModel::new(GustingMode::Constant, 0, Fraction::new(0.25), GustBias::Leading);
        let ctx = GustContext {
            time: hour_aligned(10),
            time_manager: TimeManager::default(),
            prev_gusting: Fraction::ZERO,
            rolling_average: None,
        };
        assert_eq!(model.percent_gusting(&ctx).value(), 0.25);
    }

    #[test]
    fn periodic_leading_bias_gusts_at_start_of_each_cycle() {
        let model = GustingModel::new(GustingMode::Periodic, 2, Fraction::new(0.5), GustBias::Leading);
        let tm = TimeManager::default();
        let ctx_start = GustContext {
            time: hour_aligned(10),
            time_manager: tm,
            prev_gusting: Fraction::ZERO,
            rolling_average: None,
        };
        let ctx_late = GustContext {
            time: hour_aligned(10) + WTimeSpan::from_secs(1700),
            time_manager: tm,
            prev_gusting: Fraction::ZERO,
            rolling_average: None,
        };
        assert_eq!(model.percent_gusting(&ctx_start).value(), 1.0);
        assert_eq!(model.percent_gusting(&ctx_late).value(), 0.0);
    }

    #[test]
    fn periodic_with_no_gusts_per_hour_never_gusts() {
        let model = GustingModel::new(GustingMode::Periodic, 0, Fraction::new(0.5), GustBias::Leading);
        let ctx = GustContext {
            time: hour_aligned(10),
            time_manager: TimeManager::default(),
            prev_gusting: Fraction::ZERO,
            rolling_average: None,
        };
        assert_eq!(model.percent_gusting(&ctx).value(), 0.0);
    }

    #[test]
    fn rolling_average_alternates_when_below_target() {
        let model = GustingModel::new(GustingMode::RollingAverage, 0, Fraction::new(0.3), GustBias::Centered);
        let gusting = model.rolling_fraction(Fraction::ZERO, Some(Fraction::new(0.1)));
        assert_eq!(gusting.value(), 1.0);
        let calm = model.rolling_fraction(Fraction::ONE, Some(Fraction::new(0.5)));
        assert_eq!(calm.value(), 0.0);
    }

    #[test]
    fn rolling_average_first_timestep_uses_bias_sentinel() {
        let leading = GustingModel::new(GustingMode::RollingAverage, 0, Fraction::new(0.3), GustBias::Leading);
        let trailing = GustingModel::new(GustingMode::RollingAverage, 0, Fraction::new(0.3), GustBias::Trailing);
        assert_eq!(leading.rolling_fraction(Fraction::ZERO, None).value(), 1.0);
        assert_eq!(trailing.rolling_fraction(Fraction::ZERO, None).value(), 0.0);
    }

    #[test]
    fn rolling_gust_average_weights_by_duration() {
        let entries = [
            GustHistoryEntry {
                duration: WTimeSpan::from_secs(60),
                gusting: Fraction::ONE,
            },
            GustHistoryEntry {
                duration: WTimeSpan::from_secs(60),
                gusting: Fraction::ZERO,
            },
        ];
        assert_eq!(rolling_gust_average(&entries).unwrap().value(), 0.5);
    }

    #[test]
    fn rolling_gust_average_is_none_with_no_history() {
        assert!(rolling_gust_average(&[]).is_none());
    }

    #[test]
    fn apply_gusting_blends_linearly() {
        let blended = apply_gusting(10.0, 30.0, Fraction::new(0.25));
        assert!((blended - 15.0).abs() < 1e-6);
    }
}
