//! Caller-facing queue types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse job state exposed to API callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Accepted, waiting to run
    Queued,
    /// Currently running
    Executing,
    /// Finished successfully
    Completed,
    /// Finished unsuccessfully (includes cancelled and system failures)
    Failed,
}

impl JobStatus {
    /// Normalize a provider status string.
    ///
    /// Unknown values collapse to `Queued` rather than erroring, so new
    /// provider states never break callers.
    pub fn from_provider(status: &str) -> Self {
        match status {
            "PENDING" | "QUEUED" => Self::Queued,
            "EXECUTING" => Self::Executing,
            "COMPLETED" => Self::Completed,
            "FAILED" | "CANCELED" | "SYSTEM_FAILURE" => Self::Failed,
            _ => Self::Queued,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Caller-facing handle for an enqueued job.
///
/// Ephemeral: never cached server-side; re-derive it with
/// [`Queue::get_status`](crate::facade::Queue::get_status) instead of keeping
/// it around.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHandle {
    pub id: String,
    pub task_id: String,
    pub status: JobStatus,
}

/// When a job becomes eligible to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delay {
    /// Absolute point in time.
    Until(DateTime<Utc>),
    /// Duration expression, e.g. `"1h"` or `"30m"`; parsed by the provider.
    For(String),
}

/// Options accepted by [`Queue::enqueue`](crate::facade::Queue::enqueue) and
/// per batch item.
///
/// All fields are optional; the idempotency key travels to the provider
/// unchanged, which is what makes retry-safe enqueueing possible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// How long the job may sit queued before the provider drops it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Options for the operations that manage the delay themselves
/// ([`enqueue_and_wait`](crate::facade::Queue::enqueue_and_wait) and
/// [`schedule`](crate::facade::Queue::schedule)); there is no delay slot to
/// fight over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// One payload plus per-item options for a batch enqueue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem<P> {
    pub payload: P,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<QueueOptions>,
}

impl<P> BatchItem<P> {
    pub fn new(payload: P) -> Self {
        Self {
            payload,
            options: None,
        }
    }

    pub fn with_options(payload: P, options: QueueOptions) -> Self {
        Self {
            payload,
            options: Some(options),
        }
    }
}

/// Result of a run awaited to completion, as the provider reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub id: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}
