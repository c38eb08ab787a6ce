use thiserror::Error;

/// Errors raised while configuring or running scheduled jobs.
///
/// Every configuration variant is returned synchronously from the fluent
/// call that detects it, never deferred to the next-run computation.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Time-of-day string did not parse as 24-hour `HH:MM`.
    #[error("Invalid time '{0}': expected HH:MM (24-hour clock)")]
    InvalidTime(String),

    /// Window string did not parse as `HH:MM-HH:MM`.
    #[error("Invalid time window '{0}': expected HH:MM-HH:MM")]
    InvalidWindow(String),

    /// `between()` given a window whose end precedes its start.
    #[error("Time window '{0}' ends before it starts")]
    WindowEndsBeforeStart(String),

    /// Start-date string did not parse as `YYYY-MM-DD`.
    #[error("Invalid start date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Recurrence unit name did not match any supported unit.
    #[error("Unknown unit '{0}': expected seconds, minutes, hours, days or weeks")]
    UnknownUnit(String),

    /// Weekday token matched no weekday name.
    #[error("Unknown weekday '{0}'")]
    UnknownWeekday(String),

    /// Weekday prefix matched more than one weekday name.
    #[error("Ambiguous weekday '{0}': prefix matches more than one day")]
    AmbiguousWeekday(String),

    /// `every(0)`: the interval multiplier must be positive.
    #[error("Interval must be at least 1")]
    ZeroInterval,

    /// Singular unit selector used with a multi-unit interval.
    #[error("{selector}() requires an interval of 1, got {interval}")]
    SingularInterval {
        selector: &'static str,
        interval: u32,
    },

    /// `at()` called on a job not scheduled in days.
    #[error("at() is only valid for jobs scheduled in days")]
    AtRequiresDays,

    /// `on()` combined with a unit other than days or weeks.
    #[error("Weekday scheduling requires a days or weeks unit")]
    WeekdaysRequireDays,

    /// Work bound before any unit selector was called.
    #[error("No unit selected: call seconds()/minutes()/hours()/days()/weeks() before binding work")]
    MissingUnit,

    /// A work unit returned an error. The failed attempt does not count as
    /// a run: `last_run`/`next_run` keep their previous values and the job
    /// stays due on the next sweep.
    #[error("Job failed: {0}")]
    Job(#[source] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
