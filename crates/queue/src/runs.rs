//! The run boundary: lookup and control of existing runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QueueError;
use crate::task::RunRef;
use crate::types::{JobStatus, RunResult};

/// Run record as the provider reports it. The status stays a raw string
/// here; normalization happens in the façade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    pub id: String,
    /// Task that produced the run; older provider versions omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_identifier: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl RunInfo {
    /// Fold a terminal run into the caller-facing result.
    pub fn into_result(self) -> RunResult {
        let ok = JobStatus::from_provider(&self.status) == JobStatus::Completed;
        RunResult {
            id: self.id,
            ok,
            output: self.output,
            error: self.error,
        }
    }
}

/// Lookup and control operations on existing runs.
#[async_trait]
pub trait RunLookup: Send + Sync {
    async fn retrieve(&self, run_id: &str) -> Result<RunInfo, QueueError>;

    async fn cancel(&self, run_id: &str) -> Result<(), QueueError>;

    /// Re-run a finished run; returns a reference to the new run.
    async fn replay(&self, run_id: &str) -> Result<RunRef, QueueError>;
}
