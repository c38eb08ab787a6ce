//! Schedule configuration vocabulary: recurrence units, weekday OR-groups
//! and the string formats accepted by the fluent API.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Recurrence granularity of a job: "every 10 *minutes*".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl Unit {
    /// The timedelta covered by `interval` of this unit.
    pub fn period(self, interval: u32) -> Duration {
        let n = i64::from(interval);
        match self {
            Unit::Seconds => Duration::seconds(n),
            Unit::Minutes => Duration::minutes(n),
            Unit::Hours => Duration::hours(n),
            Unit::Days => Duration::days(n),
            Unit::Weeks => Duration::weeks(n),
        }
    }

    /// Plural lowercase name, e.g. `"minutes"`.
    pub fn name(self) -> &'static str {
        match self {
            Unit::Seconds => "seconds",
            Unit::Minutes => "minutes",
            Unit::Hours => "hours",
            Unit::Days => "days",
            Unit::Weeks => "weeks",
        }
    }

    /// Singular form used when the interval is exactly 1.
    pub(crate) fn singular(self) -> &'static str {
        match self {
            Unit::Seconds => "second",
            Unit::Minutes => "minute",
            Unit::Hours => "hour",
            Unit::Days => "day",
            Unit::Weeks => "week",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "second" | "seconds" => Ok(Unit::Seconds),
            "minute" | "minutes" => Ok(Unit::Minutes),
            "hour" | "hours" => Ok(Unit::Hours),
            "day" | "days" => Ok(Unit::Days),
            "week" | "weeks" => Ok(Unit::Weeks),
            other => Err(ScheduleError::UnknownUnit(other.to_string())),
        }
    }
}

/// Weekday names in the scheduler's numbering (0=Sunday .. 6=Saturday,
/// `Weekday::num_days_from_sunday`).
const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
];

/// Title-case English name, e.g. `"Monday"`.
pub(crate) fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Resolve a case-insensitive weekday name or unambiguous leading prefix
/// ("Monday", "mon", "m"). Ambiguous prefixes like "t" or "s" are rejected.
pub(crate) fn parse_weekday(token: &str) -> Result<Weekday> {
    let needle = token.trim().to_ascii_lowercase();
    if needle.is_empty() {
        return Err(ScheduleError::UnknownWeekday(token.to_string()));
    }
    let matches: Vec<Weekday> = WEEKDAY_NAMES
        .iter()
        .filter(|(name, _)| name.starts_with(&needle))
        .map(|&(_, day)| day)
        .collect();
    match matches.as_slice() {
        [day] => Ok(*day),
        [] => Err(ScheduleError::UnknownWeekday(token.to_string())),
        _ => Err(ScheduleError::AmbiguousWeekday(token.to_string())),
    }
}

/// One OR-group of weekdays: any single member satisfies the group's slot
/// in a cycle, so `"sun|mon"` fires once per cycle on Sunday *or* Monday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekdayGroup(Vec<Weekday>);

impl WeekdayGroup {
    /// Parse a `|`-separated group spec, e.g. `"sun|mon"`. Duplicate days
    /// collapse; every token must resolve to exactly one weekday.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut days = Vec::new();
        for token in spec.split('|') {
            let day = parse_weekday(token)?;
            if !days.contains(&day) {
                days.push(day);
            }
        }
        Ok(Self(days))
    }

    /// The member weekdays, in configuration order.
    pub fn days(&self) -> &[Weekday] {
        &self.0
    }

    pub(crate) fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    /// Uniformly pick one representative weekday for this cycle.
    pub(crate) fn pick(&self, rng: &mut dyn RngCore) -> Option<Weekday> {
        self.0.choose(rng).copied()
    }
}

impl fmt::Display for WeekdayGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|&day| weekday_name(day)).collect();
        f.write_str(&names.join(" or "))
    }
}

/// Parse a 24-hour `HH:MM` clock time; zero-padding is optional.
pub(crate) fn parse_clock_time(s: &str) -> Result<NaiveTime> {
    let invalid = || ScheduleError::InvalidTime(s.to_string());
    let (hour, minute) = s.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hour.trim().parse().map_err(|_| invalid())?;
    let minute: u32 = minute.trim().parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parse a `HH:MM-HH:MM` window. The end must not precede the start; a
/// zero-length window is allowed and degenerates to a fixed time.
pub(crate) fn parse_window(s: &str) -> Result<(NaiveTime, NaiveTime)> {
    let (start, end) = s
        .split_once('-')
        .ok_or_else(|| ScheduleError::InvalidWindow(s.to_string()))?;
    let start = parse_clock_time(start.trim())?;
    let end = parse_clock_time(end.trim())?;
    if end < start {
        return Err(ScheduleError::WindowEndsBeforeStart(s.to_string()));
    }
    Ok((start, end))
}

/// Parse a `YYYY-MM-DD` start date into midnight of that day.
pub(crate) fn parse_start_date(s: &str) -> Result<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))?;
    Ok(date.and_time(NaiveTime::MIN))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
