//! Wall-clock absolute time and time spans, with a timezone/DST manager.
//!
//! Internally every `WTime` is a whole-second Unix timestamp: sub-second
//! precision on a user-supplied time is purged on construction rather than
//! rejected, matching how the rest of the engine treats out-of-range input
//! (clamp/normalize at the boundary, keep the interior arithmetic simple).

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A fixed UTC offset in seconds, plus an optional daylight-saving rule.
///
/// This is deliberately smaller than `chrono-tz`'s IANA database: scenarios
/// are configured with a single regional offset and DST rule by the host,
/// not looked up by zone name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeManager {
    pub utc_offset_secs: i32,
    pub dst: Option<DstRule>,
}

/// A daylight-saving adjustment active between two day-of-year boundaries
/// (inclusive), applied as a flat offset while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DstRule {
    pub start_day_of_year: u16,
    pub end_day_of_year: u16,
    pub amount_secs: i32,
}

impl TimeManager {
    pub fn fixed(utc_offset_secs: i32) -> Self {
        TimeManager {
            utc_offset_secs,
            dst: None,
        }
    }

    pub fn with_dst(utc_offset_secs: i32, dst: DstRule) -> Self {
        TimeManager {
            utc_offset_secs,
            dst: Some(dst),
        }
    }

    /// Offset in effect, in seconds, for a time whose UTC day-of-year is `doy`.
    fn offset_for_day(&self, doy: u16) -> i32 {
        match self.dst {
            Some(rule) if Self::day_in_range(doy, rule.start_day_of_year, rule.end_day_of_year) => {
                self.utc_offset_secs + rule.amount_secs
            }
            _ => self.utc_offset_secs,
        }
    }

    fn day_in_range(doy: u16, start: u16, end: u16) -> bool {
        if start <= end {
            doy >= start && doy <= end
        } else {
            // Range wraps across the new year (southern-hemisphere DST).
            doy >= start || doy <= end
        }
    }

    /// Local (offset-applied) day-of-year for `t`.
    pub fn local_day_of_year(&self, t: WTime) -> u16 {
        t.to_utc_datetime().ordinal() as u16
    }
}

impl Default for TimeManager {
    fn default() -> Self {
        TimeManager::fixed(0)
    }
}

/// An absolute instant, whole seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WTime(i64);

impl WTime {
    /// Construct from a raw Unix-epoch second count, purging any notion of
    /// sub-second precision by definition (there is none to purge from an
    /// integer, but this is the single entry point every other constructor
    /// funnels through).
    #[inline]
    pub fn from_unix_secs(secs: i64) -> Self {
        WTime(secs)
    }

    #[inline]
    pub fn unix_secs(self) -> i64 {
        self.0
    }

    /// Construct from a possibly sub-second timestamp, purging the fraction.
    pub fn purge_to_second(secs: f64) -> Self {
        WTime(secs.floor() as i64)
    }

    pub fn from_ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Option<Self> {
        Utc.with_ymd_and_hms(year, month, day, hour, min, sec)
            .single()
            .map(|dt| WTime(dt.timestamp()))
    }

    fn to_utc_datetime(self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0, 0).single().expect("WTime always in range")
    }

    /// Day-of-year (1-366) under the given time manager's local offset.
    pub fn day_of_year(self, tm: &TimeManager) -> u16 {
        let doy_utc = self.to_utc_datetime().ordinal() as u16;
        let offset = tm.offset_for_day(doy_utc);
        let shifted = WTime(self.0 + i64::from(offset));
        shifted.to_utc_datetime().ordinal() as u16
    }

    /// This time shifted into local civil time (offset + DST applied),
    /// returned as a `WTime` whose unix-seconds value represents the local
    /// wall-clock reading (not itself a valid UTC instant — for display only).
    pub fn to_local(self, tm: &TimeManager) -> WTime {
        let doy = self.to_utc_datetime().ordinal() as u16;
        let offset = tm.offset_for_day(doy);
        WTime(self.0 + i64::from(offset))
    }

    pub fn is_valid_scenario_time(self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for WTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_utc_datetime().format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

/// A signed duration between two `WTime`s, whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WTimeSpan(i64);

impl WTimeSpan {
    #[inline]
    pub fn from_secs(secs: i64) -> Self {
        WTimeSpan(secs)
    }

    #[inline]
    pub fn from_minutes(minutes: f64) -> Self {
        WTimeSpan((minutes * 60.0) as i64)
    }

    #[inline]
    pub fn secs(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_seconds_f64(self) -> f64 {
        self.0 as f64
    }

    pub const ZERO: WTimeSpan = WTimeSpan(0);

    /// A duration is within the engine's supported range: non-negative, at
    /// least one second, and no more than a year.
    pub fn is_valid_step(self) -> bool {
        self.0 >= 1 && self.0 <= 366 * 86_400
    }
}

impl Add<WTimeSpan> for WTime {
    type Output = WTime;
    fn add(self, rhs: WTimeSpan) -> WTime {
        WTime(self.0 + rhs.0)
    }
}

impl Sub<WTimeSpan> for WTime {
    type Output = WTime;
    fn sub(self, rhs: WTimeSpan) -> WTime {
        WTime(self.0 - rhs.0)
    }
}

impl Sub<WTime> for WTime {
    type Output = WTimeSpan;
    fn sub(self, rhs: WTime) -> WTimeSpan {
        WTimeSpan(self.0 - rhs.0)
    }
}

impl Add<WTimeSpan> for WTimeSpan {
    type Output = WTimeSpan;
    fn add(self, rhs: WTimeSpan) -> WTimeSpan {
        WTimeSpan(self.0 + rhs.0)
    }
}

/// Validate a `(start, end)` scenario time range against §7's `BadTimes` rule:
/// start must precede end, the span must be at least one second, and no more
/// than a year.
pub fn validate_time_range(start: WTime, end: WTime) -> Result<(), crate::error::CoreError> {
    if start >= end {
        return Err(crate::error::CoreError::BadTimes {
            start: start.0 as f64,
            end: end.0 as f64,
        });
    }
    let span = end - start;
    if !span.is_valid_step() {
        return Err(crate::error::CoreError::BadTimes {
            start: start.0 as f64,
            end: end.0 as f64,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_to_second_floors_fractional_seconds() {
        assert_eq!(WTime::purge_to_second(100.9).unix_secs(), 100);
    }

    #[test]
    fn time_span_arithmetic_round_trips() {
        let a = WTime::from_unix_secs(1000);
        let span = WTimeSpan::from_secs(60);
        let b = a + span;
        assert_eq!(b - a, span);
    }

    #[test]
    fn dst_rule_shifts_offset_within_range() {
        let tm = TimeManager::with_dst(
            0,
            DstRule {
                start_day_of_year: 60,
                end_day_of_year: 280,
                amount_secs: 3600,
            },
        );
        assert_eq!(tm.offset_for_day(1), 0);
        assert_eq!(tm.offset_for_day(100), 3600);
        assert_eq!(tm.offset_for_day(300), 0);
    }

    #[test]
    fn dst_rule_wraps_across_year_boundary() {
        let tm = TimeManager::with_dst(
            0,
            DstRule {
                start_day_of_year: 300,
                end_day_of_year: 60,
                amount_secs: 3600,
            },
        );
        assert_eq!(tm.offset_for_day(350), 3600);
        assert_eq!(tm.offset_for_day(10), 3600);
        assert_eq!(tm.offset_for_day(150), 0);
    }

    #[test]
    fn bad_times_rejects_non_monotonic_range() {
        let start = WTime::from_unix_secs(1000);
        let end = WTime::from_unix_secs(1000);
        assert!(validate_time_range(start, end).is_err());
    }

    #[test]
    fn bad_times_rejects_spans_over_a_year() {
        let start = WTime::from_unix_secs(0);
        let end = WTime::from_unix_secs(400 * 86_400);
        assert!(validate_time_range(start, end).is_err());
    }

    #[test]
    fn from_ymd_hms_round_trips_through_display() {
        let t = WTime::from_ymd_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(t.to_string(), "2024-06-01T12:00:00Z");
    }
}
