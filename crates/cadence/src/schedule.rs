//! The recurrence engine: computes a job's next due instant from its
//! configuration and run history.
//!
//! The computation takes the current instant as a parameter and draws
//! randomness from an injected source, so it is fully deterministic under
//! test. Only [`now`] touches the wall clock.

use chrono::{Datelike, Duration, Local, NaiveDateTime, Weekday};
use rand::{Rng, RngCore};

use crate::job::Job;
use crate::types::{Unit, WeekdayGroup};

/// Current wall-clock time in the scheduler's time base (naive local).
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Smallest non-negative number of days forward from weekday `from` to
/// weekday `to` (0 when they are equal).
fn days_until(from: Weekday, to: Weekday) -> i64 {
    i64::from((to.num_days_from_sunday() + 7 - from.num_days_from_sunday()) % 7)
}

impl Job {
    /// Compute and store the instant this job is next due.
    ///
    /// Called once when work is bound and again after every successful run.
    /// Configuration was validated by the builder, so the computation
    /// itself cannot fail.
    pub(crate) fn schedule_next_run(&mut self, now: NaiveDateTime, rng: &mut dyn RngCore) {
        let anchor = self.start_run.unwrap_or(now);
        self.period = self.unit.period(self.interval);
        let mut next = anchor + self.period;

        if !self.run_days.is_empty() {
            next = self.next_constrained_day(anchor, rng);
        }

        if let Some((start, end)) = self.window {
            // Re-drawn on every recomputation, so the effective time-of-day
            // varies from run to run inside the window.
            let span = (end - start).num_seconds();
            let offset = rng.gen_range(0..=span);
            self.at_time = Some(start + Duration::seconds(offset));
        }

        if let Some(at) = self.at_time {
            next = next.date().and_time(at);
            // A job configured this morning for 10:30 should still fire
            // today at 10:30 instead of waiting until tomorrow.
            if self.last_run.is_none() && self.run_days.is_empty() && at > now.time() {
                next = next - Duration::days(1);
            }
        }

        self.next_run = next;
    }

    /// Weekday-constrained mode: the closest day reaching one random pick
    /// from each pending OR-group, never landing on a date that already ran.
    fn next_constrained_day(&self, anchor: NaiveDateTime, rng: &mut dyn RngCore) -> NaiveDateTime {
        let mut anchor = anchor;
        let mut groups: Vec<&WeekdayGroup> = self.run_days.iter().collect();

        if let Some(last) = self.last_run {
            anchor = last;
            // The group that matched the previous run already fired this
            // cycle. At most one group is dropped even if several match.
            let ran = last.weekday();
            if let Some(pos) = groups.iter().position(|g| g.contains(ran)) {
                groups.remove(pos);
            }
        }

        let picked: Vec<Weekday> = groups.iter().filter_map(|g| g.pick(rng)).collect();
        let mut delta = picked
            .iter()
            .map(|&day| days_until(anchor.weekday(), day))
            .min()
            .unwrap_or(0);

        let ran_today = self
            .last_run
            .is_some_and(|last| last.date() == anchor.date());
        if delta == 0 && ran_today {
            // The job already fired on this date; push a full cycle ahead
            // so it cannot run twice on the same day.
            delta = match self.unit {
                Unit::Weeks => 7 * i64::from(self.interval),
                _ => 7,
            };
        }

        anchor + Duration::days(delta)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
