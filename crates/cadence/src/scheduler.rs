//! The job registry: owns every scheduled job and drives sweeps over them.

use std::thread;
use std::time::Duration as StdDuration;

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::info;

use crate::error::Result;
use crate::job::{Job, JobBuilder};
use crate::schedule;

/// Owns an ordered collection of [`Job`]s plus the random source used for
/// weekday and window draws.
///
/// Everything runs synchronously on the caller's thread: the caller owns
/// the polling cadence (typically [`run_pending`](Self::run_pending) inside
/// a sleep loop), and a long-running work unit stalls the whole sweep. The
/// scheduler provides no internal locking; callers on multiple threads must
/// wrap the whole value in external mutual exclusion.
pub struct Scheduler {
    jobs: Vec<Job>,
    rng: Box<dyn RngCore + Send>,
}

impl Scheduler {
    /// Registry with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(Box::new(StdRng::from_entropy()))
    }

    /// Registry with a caller-supplied random source. Tests inject a seeded
    /// or stepping generator to make weekday and window draws exact.
    pub fn with_rng(rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            jobs: Vec::new(),
            rng,
        }
    }

    /// Start configuring a job that recurs every `interval` units:
    /// `scheduler.every(10).minutes().run(...)`.
    pub fn every(&mut self, interval: u32) -> JobBuilder<'_> {
        JobBuilder::new(self, interval)
    }

    /// Start configuring a job that runs on specific weekdays; shorthand
    /// for `every(1).days().on(days)`. See [`JobBuilder::on`].
    pub fn on(&mut self, days: &[&str]) -> Result<JobBuilder<'_>> {
        self.every(1).days().on(days)
    }

    /// Run every job that is due, earliest `next_run` first (ties keep
    /// registration order). Each execution is immediately followed by that
    /// job's recomputation; jobs that are not due are untouched.
    ///
    /// Missed occurrences are never backfilled: however much wall-clock
    /// time passed since the last sweep, a due job runs exactly once per
    /// call. A failing work unit aborts the sweep with its error and does
    /// not count as a run, so that job stays due.
    pub fn run_pending(&mut self) -> Result<()> {
        let now = schedule::now();
        let mut due: Vec<usize> = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, job)| job.is_due(now))
            .map(|(idx, _)| idx)
            .collect();
        due.sort_by_key(|&idx| self.jobs[idx].next_run);

        let Scheduler { jobs, rng } = self;
        for idx in due {
            jobs[idx].run(rng.as_mut())?;
        }
        Ok(())
    }

    /// Run every registered job unconditionally, in registration order,
    /// pausing `delay` between consecutive executions to smooth load.
    /// Due-state is ignored entirely.
    pub fn run_all(&mut self, delay: StdDuration) -> Result<()> {
        info!(
            jobs = self.jobs.len(),
            delay_ms = delay.as_millis() as u64,
            "running all jobs"
        );
        let Scheduler { jobs, rng } = self;
        for (idx, job) in jobs.iter_mut().enumerate() {
            if idx > 0 && !delay.is_zero() {
                thread::sleep(delay);
            }
            job.run(rng.as_mut())?;
        }
        Ok(())
    }

    /// Drop every scheduled job. Work already dispatched is unaffected.
    pub fn clear(&mut self) {
        self.jobs.clear();
    }

    /// The registered jobs, in registration order.
    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Instant the soonest job is due, or `None` with nothing registered.
    pub fn next_run(&self) -> Option<NaiveDateTime> {
        self.jobs.iter().map(|job| job.next_run).min()
    }

    /// Whole seconds until the soonest job is due (negative once overdue),
    /// or `None` with nothing registered.
    pub fn idle_seconds(&self) -> Option<i64> {
        self.next_run().map(|next| (next - schedule::now()).num_seconds())
    }

    pub(crate) fn register(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub(crate) fn rng_mut(&mut self) -> &mut dyn RngCore {
        self.rng.as_mut()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
