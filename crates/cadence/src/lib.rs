//! `cadence` — in-process periodic job scheduling for humans.
//!
//! # Overview
//!
//! Callers register closures with a human-friendly recurrence and
//! periodically ask the scheduler to run whatever is due. There is no
//! background thread, no persistence and no catch-up of missed
//! occurrences: the polling loop belongs to the caller, and each due job
//! runs at most once per sweep.
//!
//! # Recurrence forms
//!
//! | Configuration                                | Behaviour                                              |
//! |----------------------------------------------|--------------------------------------------------------|
//! | `every(10).minutes()`                        | Fixed interval (seconds/minutes/hours/days/weeks)      |
//! | `every(1).day()?.at("10:30")?`               | Daily at a fixed time                                  |
//! | `every(1).days().between("08:00-09:00")?`    | Daily at a random time inside the window, re-drawn each cycle |
//! | `on(&["mon", "fri"])?`                       | Weekday-constrained: every Monday, and every Friday    |
//! | `…starting("2026-09-01")?`                   | Hold the first run until a start date                  |
//!
//! Weekday arguments may OR several days together with a pipe, so
//! `on(&["sun|mon"])` fires once per cycle on Sunday *or* Monday, with the
//! representative day drawn at random each cycle.
//!
//! # Example
//!
//! ```no_run
//! use std::{thread, time::Duration};
//!
//! use cadence::Scheduler;
//!
//! fn main() -> cadence::Result<()> {
//!     let mut scheduler = Scheduler::new();
//!
//!     scheduler.every(10).minutes().run(|| println!("every ten minutes"))?;
//!     scheduler.every(1).day()?.at("10:30")?.run(|| println!("daily report"))?;
//!     scheduler.on(&["mon|wed"])?.at("06:00")?.run(|| println!("twice a week"))?;
//!
//!     loop {
//!         scheduler.run_pending()?;
//!         thread::sleep(Duration::from_secs(1));
//!     }
//! }
//! ```

pub mod error;
pub mod job;
mod schedule;
pub mod scheduler;
pub mod types;

pub use error::{Result, ScheduleError};
pub use job::{Job, JobBuilder};
pub use scheduler::Scheduler;
pub use types::{Unit, WeekdayGroup};
