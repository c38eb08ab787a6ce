//! Job entity and its fluent builder.
//!
//! A [`Job`] only exists once its configuration has been validated, a work
//! unit is bound and the first due instant is computed; the builder keeps
//! anything half-configured out of the registry.

use std::fmt;

use chrono::{Duration, NaiveDateTime, NaiveTime};
use rand::RngCore;
use tracing::info;

use crate::error::{Result, ScheduleError};
use crate::schedule;
use crate::scheduler::Scheduler;
use crate::types::{self, Unit, WeekdayGroup};

/// Bound unit of work: a zero-argument closure capturing whatever arguments
/// the caller baked in at configuration time. The scheduler never inspects
/// its outcome beyond propagating failure out of the sweep.
pub(crate) type WorkFn = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

/// A periodic job registered with a [`Scheduler`].
///
/// Created through [`Scheduler::every`] / [`Scheduler::on`] and the returned
/// [`JobBuilder`]; mutated on every successful run (`last_run` recorded,
/// `next_run` recomputed); removed only by [`Scheduler::clear`].
pub struct Job {
    /// Multiplier on `unit`: the 10 in "every 10 minutes".
    pub(crate) interval: u32,
    pub(crate) unit: Unit,
    /// Time-of-day override; rewritten on every recomputation when a
    /// window is configured.
    pub(crate) at_time: Option<NaiveTime>,
    pub(crate) window: Option<(NaiveTime, NaiveTime)>,
    /// Weekday OR-groups; empty means unconstrained.
    pub(crate) run_days: Vec<WeekdayGroup>,
    /// Earliest instant before which the job must not run.
    pub(crate) start_run: Option<NaiveDateTime>,
    pub(crate) last_run: Option<NaiveDateTime>,
    pub(crate) next_run: NaiveDateTime,
    pub(crate) period: Duration,
    pub(crate) work: WorkFn,
}

impl Job {
    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Effective time-of-day, whether configured via `at()` or drawn from
    /// the `between()` window on the latest recomputation.
    pub fn at_time(&self) -> Option<NaiveTime> {
        self.at_time
    }

    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        self.window
    }

    pub fn run_days(&self) -> &[WeekdayGroup] {
        &self.run_days
    }

    pub fn start_run(&self) -> Option<NaiveDateTime> {
        self.start_run
    }

    /// Instant of the previous successful execution, if any.
    pub fn last_run(&self) -> Option<NaiveDateTime> {
        self.last_run
    }

    /// Instant the job is next due.
    pub fn next_run(&self) -> NaiveDateTime {
        self.next_run
    }

    /// The timedelta equal to `interval × unit`.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// True once `next_run` is at or before `now`.
    pub(crate) fn is_due(&self, now: NaiveDateTime) -> bool {
        now >= self.next_run
    }

    /// Execute the bound work, then record the run and recompute the next
    /// due instant.
    ///
    /// A failing work unit leaves `last_run`/`next_run` untouched: the
    /// failed attempt does not count as a run, so the job stays due and is
    /// retried on the next sweep.
    pub(crate) fn run(&mut self, rng: &mut dyn RngCore) -> Result<()> {
        info!(job = %self, "running job");
        (self.work)().map_err(ScheduleError::Job)?;
        let now = schedule::now();
        self.last_run = Some(now);
        self.schedule_next_run(now, rng);
        Ok(())
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.run_days.is_empty() {
            let unit = if self.interval == 1 {
                self.unit.singular()
            } else {
                self.unit.name()
            };
            write!(f, "Every {} {}", self.interval, unit)?;
        } else {
            let groups: Vec<String> = self.run_days.iter().map(|g| g.to_string()).collect();
            write!(f, "Every {}", groups.join(" and "))?;
        }
        if let Some((start, end)) = self.window {
            write!(f, " between {start} and {end}")?;
        } else if let Some(at) = self.at_time {
            write!(f, " at {at}")?;
        }
        if let Some(start) = self.start_run {
            write!(f, " starting {}", start.format("%Y-%m-%d"))?;
        }
        let last = match self.last_run {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "[never]".to_string(),
        };
        write!(
            f,
            " (last run: {last}, next run: {})",
            self.next_run.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

#[cfg(test)]
impl Job {
    /// Bare job for engine tests; scheduling state is filled in by the test.
    pub(crate) fn stub(interval: u32, unit: Unit) -> Self {
        use chrono::NaiveDate;

        Self {
            interval,
            unit,
            at_time: None,
            window: None,
            run_days: Vec::new(),
            start_run: None,
            last_run: None,
            next_run: NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_time(NaiveTime::MIN),
            period: Duration::zero(),
            work: Box::new(|| Ok(())),
        }
    }
}

/// Fluent configuration for a new [`Job`].
///
/// Obtained from [`Scheduler::every`]; each call refines the recurrence and
/// fails fast on invalid input. Nothing is registered until
/// [`run`](Self::run) / [`try_run`](Self::try_run) binds the work unit, so a
/// dropped builder leaves the registry untouched.
#[must_use = "a job is only registered once run()/try_run() binds its work"]
pub struct JobBuilder<'a> {
    scheduler: &'a mut Scheduler,
    interval: u32,
    unit: Option<Unit>,
    at_time: Option<NaiveTime>,
    window: Option<(NaiveTime, NaiveTime)>,
    run_days: Vec<WeekdayGroup>,
    start_run: Option<NaiveDateTime>,
}

impl<'a> JobBuilder<'a> {
    pub(crate) fn new(scheduler: &'a mut Scheduler, interval: u32) -> Self {
        Self {
            scheduler,
            interval,
            unit: None,
            at_time: None,
            window: None,
            run_days: Vec::new(),
            start_run: None,
        }
    }

    fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    fn singular(self, selector: &'static str, unit: Unit) -> Result<Self> {
        if self.interval != 1 {
            return Err(ScheduleError::SingularInterval {
                selector,
                interval: self.interval,
            });
        }
        Ok(self.with_unit(unit))
    }

    pub fn seconds(self) -> Self {
        self.with_unit(Unit::Seconds)
    }

    pub fn minutes(self) -> Self {
        self.with_unit(Unit::Minutes)
    }

    pub fn hours(self) -> Self {
        self.with_unit(Unit::Hours)
    }

    pub fn days(self) -> Self {
        self.with_unit(Unit::Days)
    }

    pub fn weeks(self) -> Self {
        self.with_unit(Unit::Weeks)
    }

    /// `every(1).second()`; errors unless the interval is exactly 1.
    pub fn second(self) -> Result<Self> {
        self.singular("second", Unit::Seconds)
    }

    pub fn minute(self) -> Result<Self> {
        self.singular("minute", Unit::Minutes)
    }

    pub fn hour(self) -> Result<Self> {
        self.singular("hour", Unit::Hours)
    }

    pub fn day(self) -> Result<Self> {
        self.singular("day", Unit::Days)
    }

    pub fn week(self) -> Result<Self> {
        self.singular("week", Unit::Weeks)
    }

    /// Run at a fixed time of day, 24-hour `"HH:MM"`. Only valid for jobs
    /// scheduled in days (including weekday-constrained jobs).
    pub fn at(mut self, time: &str) -> Result<Self> {
        if self.unit != Some(Unit::Days) {
            return Err(ScheduleError::AtRequiresDays);
        }
        self.at_time = Some(types::parse_clock_time(time)?);
        Ok(self)
    }

    /// Run at a random time inside `"HH:MM-HH:MM"`, re-drawn on every
    /// recomputation. Overrides `at()` each cycle.
    pub fn between(mut self, window: &str) -> Result<Self> {
        self.window = Some(types::parse_window(window)?);
        Ok(self)
    }

    /// Constrain runs to weekdays. Each element is one OR-group: any day in
    /// the group satisfies that group's slot per cycle, and all groups must
    /// eventually fire, each on its own matched day. So `&["sun|mon",
    /// "wed|thu"]` runs every Sunday *or* Monday, and every Wednesday *or*
    /// Thursday.
    ///
    /// Day tokens are case-insensitive weekday names or unambiguous leading
    /// prefixes ("mon", "Tuesday", "sat"). Replaces any previously
    /// configured weekday constraint.
    pub fn on(mut self, days: &[&str]) -> Result<Self> {
        let mut groups = Vec::with_capacity(days.len());
        for spec in days {
            groups.push(WeekdayGroup::parse(spec)?);
        }
        self.run_days = groups;
        Ok(self)
    }

    /// Hold the first run until the given `"YYYY-MM-DD"` date.
    pub fn starting(mut self, date: &str) -> Result<Self> {
        self.start_run = Some(types::parse_start_date(date)?);
        Ok(self)
    }

    /// Bind an infallible work unit and register the job.
    pub fn run<F>(self, mut work: F) -> Result<()>
    where
        F: FnMut() + Send + 'static,
    {
        self.try_run(move || {
            work();
            Ok(())
        })
    }

    /// Bind a fallible work unit and register the job.
    ///
    /// Errors returned by the work unit propagate out of the sweep that
    /// runs it; the failed attempt does not count as a run.
    pub fn try_run<F>(self, work: F) -> Result<()>
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let unit = self.unit.ok_or(ScheduleError::MissingUnit)?;
        if self.interval == 0 {
            return Err(ScheduleError::ZeroInterval);
        }
        if !self.run_days.is_empty() && !matches!(unit, Unit::Days | Unit::Weeks) {
            return Err(ScheduleError::WeekdaysRequireDays);
        }

        let now = schedule::now();
        let mut job = Job {
            interval: self.interval,
            unit,
            at_time: self.at_time,
            window: self.window,
            run_days: self.run_days,
            start_run: self.start_run,
            last_run: None,
            next_run: now,
            period: unit.period(self.interval),
            work: Box::new(work),
        };
        job.schedule_next_run(now, self.scheduler.rng_mut());
        info!(job = %job, "scheduled job");
        self.scheduler.register(job);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rand::rngs::mock::StepRng;

    use super::*;

    fn scheduler() -> Scheduler {
        Scheduler::with_rng(Box::new(StepRng::new(0, 0)))
    }

    #[test]
    fn singular_selector_requires_interval_one() {
        let mut s = scheduler();
        let err = s.every(2).second().err();
        assert!(matches!(
            err,
            Some(ScheduleError::SingularInterval {
                selector: "second",
                interval: 2,
            })
        ));
        assert!(s.every(1).minute().is_ok());
    }

    #[test]
    fn at_requires_days_unit() {
        let mut s = scheduler();
        assert!(matches!(
            s.every(10).minutes().at("10:30"),
            Err(ScheduleError::AtRequiresDays)
        ));
        // Calling at() before any unit selector is the same error.
        assert!(matches!(
            s.every(1).at("10:30"),
            Err(ScheduleError::AtRequiresDays)
        ));
        assert!(s.every(1).days().at("10:30").is_ok());
    }

    #[test]
    fn weekdays_require_days_or_weeks() {
        let mut s = scheduler();
        let err = s
            .every(10)
            .minutes()
            .on(&["mon"])
            .unwrap()
            .run(|| {})
            .unwrap_err();
        assert!(matches!(err, ScheduleError::WeekdaysRequireDays));

        assert!(s.every(1).days().on(&["mon"]).unwrap().run(|| {}).is_ok());
        assert!(s.every(2).weeks().on(&["fri"]).unwrap().run(|| {}).is_ok());
    }

    #[test]
    fn missing_unit_and_zero_interval_rejected_at_bind() {
        let mut s = scheduler();
        assert!(matches!(
            s.every(1).run(|| {}),
            Err(ScheduleError::MissingUnit)
        ));
        assert!(matches!(
            s.every(0).seconds().run(|| {}),
            Err(ScheduleError::ZeroInterval)
        ));
        assert!(s.jobs().is_empty());
    }

    #[test]
    fn invalid_strings_fail_at_the_offending_call() {
        let mut s = scheduler();
        assert!(matches!(
            s.every(1).days().at("25:00"),
            Err(ScheduleError::InvalidTime(_))
        ));
        assert!(matches!(
            s.every(1).days().between("10:10-10:00"),
            Err(ScheduleError::WindowEndsBeforeStart(_))
        ));
        assert!(matches!(
            s.every(1).days().starting("01-2026-05"),
            Err(ScheduleError::InvalidDate(_))
        ));
        assert!(matches!(
            s.every(1).days().on(&["blah"]),
            Err(ScheduleError::UnknownWeekday(_))
        ));
        assert!(matches!(
            s.every(1).days().on(&["t"]),
            Err(ScheduleError::AmbiguousWeekday(_))
        ));
    }

    #[test]
    fn on_replaces_previous_constraint() {
        let mut s = scheduler();
        s.every(1)
            .days()
            .on(&["mon"])
            .unwrap()
            .on(&["fri"])
            .unwrap()
            .run(|| {})
            .unwrap();
        let job = &s.jobs()[0];
        assert_eq!(job.run_days().len(), 1);
        assert_eq!(job.run_days()[0].days(), &[chrono::Weekday::Fri]);
    }

    #[test]
    fn display_interval_form() {
        let mut s = scheduler();
        s.every(10).minutes().run(|| {}).unwrap();
        s.every(1).day().unwrap().at("10:30").unwrap().run(|| {}).unwrap();
        let rendered = s.jobs()[0].to_string();
        assert!(rendered.starts_with("Every 10 minutes"), "{rendered}");
        assert!(rendered.contains("(last run: [never], next run: "), "{rendered}");
        let rendered = s.jobs()[1].to_string();
        assert!(rendered.starts_with("Every 1 day at 10:30:00"), "{rendered}");
    }

    #[test]
    fn display_weekday_and_window_forms() {
        let mut s = scheduler();
        s.on(&["mon|wed", "fri"]).unwrap().run(|| {}).unwrap();
        s.every(1)
            .days()
            .between("10:00-10:10")
            .unwrap()
            .starting("2026-01-05")
            .unwrap()
            .run(|| {})
            .unwrap();
        let rendered = s.jobs()[0].to_string();
        assert!(
            rendered.starts_with("Every Monday or Wednesday and Friday"),
            "{rendered}"
        );
        let rendered = s.jobs()[1].to_string();
        assert!(
            rendered.starts_with("Every 1 day between 10:00:00 and 10:10:00 starting 2026-01-05"),
            "{rendered}"
        );
    }
}
