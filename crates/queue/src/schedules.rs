//! Declarative cron schedules on the task service.
//!
//! Same error policy as the job façade: create/read/update failures are
//! logged and re-thrown, lifecycle toggles degrade to `false`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueueError;

/// Timezone applied when the caller does not pick one.
const DEFAULT_TIMEZONE: &str = "UTC";

/// A schedule as the provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub task: String,
    pub cron: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
}

/// What a caller supplies to create a schedule.
///
/// `deduplication_key` is mandatory: re-creating with the same key updates
/// the existing schedule instead of piling up duplicates on every deploy.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOptions {
    pub cron: String,
    pub timezone: Option<String>,
    pub external_id: Option<String>,
    pub deduplication_key: String,
}

/// Partial update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// Fully-resolved creation request as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchedule {
    pub task: String,
    pub cron: String,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub deduplication_key: String,
}

/// Provider surface for schedule management.
///
/// Object safe on purpose: the manager holds `Arc<dyn ScheduleService>`
/// so tests substitute recording fakes.
#[async_trait]
pub trait ScheduleService: Send + Sync {
    async fn create(&self, request: &CreateSchedule) -> Result<Schedule, QueueError>;
    async fn retrieve(&self, schedule_id: &str) -> Result<Schedule, QueueError>;
    async fn list(&self) -> Result<Vec<Schedule>, QueueError>;
    async fn update(
        &self,
        schedule_id: &str,
        update: &UpdateScheduleOptions,
    ) -> Result<Schedule, QueueError>;
    async fn activate(&self, schedule_id: &str) -> Result<(), QueueError>;
    async fn deactivate(&self, schedule_id: &str) -> Result<(), QueueError>;
    async fn delete(&self, schedule_id: &str) -> Result<(), QueueError>;
    async fn timezones(&self) -> Result<Vec<String>, QueueError>;
}

/// Façade over [`ScheduleService`] that resolves defaults and applies the
/// logging policy.
#[derive(Clone)]
pub struct ScheduleManager {
    service: Arc<dyn ScheduleService>,
}

impl ScheduleManager {
    pub fn new(service: Arc<dyn ScheduleService>) -> Self {
        Self { service }
    }

    /// Create (or, via the deduplication key, update) a schedule for `task_id`.
    /// Timezone defaults to UTC.
    pub async fn create(
        &self,
        task_id: &str,
        options: ScheduleOptions,
    ) -> Result<Schedule, QueueError> {
        let request = CreateSchedule {
            task: task_id.to_string(),
            cron: options.cron,
            timezone: options
                .timezone
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
            external_id: options.external_id,
            deduplication_key: options.deduplication_key,
        };
        match self.service.create(&request).await {
            Ok(schedule) => {
                tracing::info!(
                    schedule_id = %schedule.id,
                    task_id,
                    cron = %schedule.cron,
                    timezone = %schedule.timezone,
                    "schedule created"
                );
                Ok(schedule)
            }
            Err(err) => {
                tracing::error!(task_id, error = %err, "failed to create schedule");
                Err(err)
            }
        }
    }

    pub async fn get(&self, schedule_id: &str) -> Result<Schedule, QueueError> {
        match self.service.retrieve(schedule_id).await {
            Ok(schedule) => Ok(schedule),
            Err(err) => {
                tracing::error!(schedule_id, error = %err, "failed to get schedule");
                Err(err)
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<Schedule>, QueueError> {
        match self.service.list().await {
            Ok(schedules) => Ok(schedules),
            Err(err) => {
                tracing::error!(error = %err, "failed to list schedules");
                Err(err)
            }
        }
    }

    pub async fn update(
        &self,
        schedule_id: &str,
        update: UpdateScheduleOptions,
    ) -> Result<Schedule, QueueError> {
        match self.service.update(schedule_id, &update).await {
            Ok(schedule) => {
                tracing::info!(schedule_id, "schedule updated");
                Ok(schedule)
            }
            Err(err) => {
                tracing::error!(schedule_id, error = %err, "failed to update schedule");
                Err(err)
            }
        }
    }

    /// Resume a paused schedule; `false` when the provider refused.
    pub async fn activate(&self, schedule_id: &str) -> bool {
        match self.service.activate(schedule_id).await {
            Ok(()) => {
                tracing::info!(schedule_id, "schedule activated");
                true
            }
            Err(err) => {
                tracing::error!(schedule_id, error = %err, "failed to activate schedule");
                false
            }
        }
    }

    /// Pause without deleting; `false` when the provider refused.
    pub async fn deactivate(&self, schedule_id: &str) -> bool {
        match self.service.deactivate(schedule_id).await {
            Ok(()) => {
                tracing::info!(schedule_id, "schedule deactivated");
                true
            }
            Err(err) => {
                tracing::error!(schedule_id, error = %err, "failed to deactivate schedule");
                false
            }
        }
    }

    pub async fn delete(&self, schedule_id: &str) -> bool {
        match self.service.delete(schedule_id).await {
            Ok(()) => {
                tracing::info!(schedule_id, "schedule deleted");
                true
            }
            Err(err) => {
                tracing::error!(schedule_id, error = %err, "failed to delete schedule");
                false
            }
        }
    }

    /// Timezone names the provider accepts, for building pickers.
    pub async fn timezones(&self) -> Result<Vec<String>, QueueError> {
        match self.service.timezones().await {
            Ok(zones) => Ok(zones),
            Err(err) => {
                tracing::error!(error = %err, "failed to list timezones");
                Err(err)
            }
        }
    }
}
