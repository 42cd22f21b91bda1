//! `forgekit-queue` — job dispatch over an external task service.
//!
//! The heavy lifting (durable retries, cron evaluation, worker execution)
//! belongs to the provider. This crate is the thin seam the app talks
//! through: a [`facade::Queue`] for one-off jobs, a
//! [`schedules::ScheduleManager`] for recurring ones, and the capability
//! traits that production clients and test doubles both implement.

pub mod client;
pub mod cron;
pub mod error;
pub mod facade;
pub mod runs;
pub mod schedules;
pub mod task;
pub mod types;

pub use client::{DEFAULT_BASE_URL, RemoteTask, TriggerClient};
pub use error::QueueError;
pub use facade::{Queue, TaskQueue};
pub use runs::{RunInfo, RunLookup};
pub use schedules::{
    CreateSchedule, Schedule, ScheduleManager, ScheduleOptions, ScheduleService,
    UpdateScheduleOptions,
};
pub use task::{BatchRuns, BatchTriggerItem, RunRef, TriggerOptions, TriggerableTask};
pub use types::{BatchItem, CommonOptions, Delay, JobHandle, JobStatus, QueueOptions, RunResult};
