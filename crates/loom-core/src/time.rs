//! Calendar date and minute-of-day time model.
//!
//! # Design
//!
//! The engine never does calendar arithmetic — occurrences carry an opaque
//! date used for grouping, equality, and ordering, and a time window in
//! minutes since midnight.  Representing both directly keeps every schedule
//! computation exact integer arithmetic and avoids pulling in a datetime
//! library for what is effectively a composite key plus a pair of minute
//! counters.
//!
//! Transport-card windows are clamped to the owning day: nothing the engine
//! derives may start before 00:00 or end after 23:59.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

// ── Date ─────────────────────────────────────────────────────────────────────

/// A calendar date, `YYYY-MM-DD` in display and storage form.
///
/// Ordering is field order (year, month, day), which matches the
/// lexicographic order of the rendered string — the store relies on this so
/// TEXT comparisons in SQL agree with `Ord` here.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Date {
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

impl Date {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for Date {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let mut parts = s.splitn(3, '-');
        let (y, m, d) = match (parts.next(), parts.next(), parts.next()) {
            (Some(y), Some(m), Some(d)) => (y, m, d),
            _ => return Err(CoreError::Parse(format!("invalid date {s:?}"))),
        };
        let parse = |field: &str| -> CoreResult<u32> {
            field
                .parse()
                .map_err(|_| CoreError::Parse(format!("invalid date {s:?}")))
        };
        let (year, month, day) = (parse(y)? as i32, parse(m)?, parse(d)?);
        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(CoreError::Parse(format!("invalid date {s:?}")));
        }
        Ok(Date::new(year, month as u8, day as u8))
    }
}

// ── ClockTime ────────────────────────────────────────────────────────────────

/// Minutes since midnight, always within `[0, 1439]`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);
    /// 23:59 — the latest representable minute of a day.
    pub const END_OF_DAY: ClockTime = ClockTime(24 * 60 - 1);

    /// Construct from minutes since midnight, clamped to the day.
    pub fn from_minutes(minutes: u32) -> Self {
        ClockTime(minutes.min(Self::END_OF_DAY.0 as u32) as u16)
    }

    pub fn from_hm(hour: u8, minute: u8) -> Self {
        Self::from_minutes(hour as u32 * 60 + minute as u32)
    }

    #[inline]
    pub fn minutes(self) -> u32 {
        self.0 as u32
    }

    /// `self` moved `minutes` earlier, clamped at 00:00.
    pub fn earlier_by(self, minutes: u32) -> ClockTime {
        ClockTime((self.0 as u32).saturating_sub(minutes) as u16)
    }

    /// `self` moved `minutes` later, clamped at 23:59.
    pub fn later_by(self, minutes: u32) -> ClockTime {
        Self::from_minutes(self.0 as u32 + minutes)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

// ── TimeWindow ───────────────────────────────────────────────────────────────

/// A half-open-in-spirit `[start, end]` window within one day.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TimeWindow {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeWindow {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Window length in minutes; 0 if `end` precedes `start`.
    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Window length in fractional hours (used by the financial calculator).
    pub fn duration_hours(&self) -> f64 {
        self.duration_minutes() as f64 / 60.0
    }

    /// `true` if the two windows share at least one minute.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.start, self.end)
    }
}
