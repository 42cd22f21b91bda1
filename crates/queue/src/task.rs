//! The task boundary: what a triggerable remote task looks like.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::QueueError;
use crate::types::{CommonOptions, Delay, QueueOptions, RunResult};

/// Options in the provider's wire format.
///
/// Built from the caller-facing option types by the façade; absent fields
/// are omitted from the serialized form, never sent as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Delay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl TriggerOptions {
    /// All four option fields, forwarded as supplied.
    pub fn from_queue(options: &QueueOptions) -> Self {
        Self {
            delay: options.delay.clone(),
            idempotency_key: options.idempotency_key.clone(),
            ttl: options.ttl.clone(),
            tags: options.tags.clone(),
        }
    }

    /// Delayless options with everything forwarded.
    pub fn from_common(options: &CommonOptions) -> Self {
        Self {
            delay: None,
            idempotency_key: options.idempotency_key.clone(),
            ttl: options.ttl.clone(),
            tags: options.tags.clone(),
        }
    }

    /// The wait path forwards only the idempotency key and tags.
    pub fn for_wait(options: &CommonOptions) -> Self {
        Self {
            delay: None,
            idempotency_key: options.idempotency_key.clone(),
            ttl: None,
            tags: options.tags.clone(),
        }
    }
}

/// Reference to a run created by a trigger call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRef {
    pub id: String,
}

/// Provider response to a batch trigger.
///
/// `runs` is the only field callers may rely on; some provider versions omit
/// `batch_id`, and a missing `runs` list deserializes as empty rather than
/// failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRuns {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub runs: Vec<RunRef>,
}

/// One payload plus wire options inside a batch trigger call.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchTriggerItem<P> {
    pub payload: P,
    pub options: TriggerOptions,
}

/// A remote task definition that can be triggered.
///
/// Object safe on purpose: wiring holds `Arc<dyn TriggerableTask<Payload =
/// P>>` so tests substitute recording fakes for the HTTP-backed
/// implementation.
#[async_trait]
pub trait TriggerableTask: Send + Sync {
    type Payload: Serialize + Send + Sync;

    /// Stable task identifier, e.g. `"send-email"`.
    fn id(&self) -> &str;

    /// Fire-and-forget trigger; returns a reference to the created run.
    async fn trigger(
        &self,
        payload: &Self::Payload,
        options: &TriggerOptions,
    ) -> Result<RunRef, QueueError>;

    /// Trigger and block until the run reaches a terminal state.
    async fn trigger_and_wait(
        &self,
        payload: &Self::Payload,
        options: &TriggerOptions,
    ) -> Result<RunResult, QueueError>;

    /// Trigger many runs in one call, preserving item order.
    async fn batch_trigger(
        &self,
        items: Vec<BatchTriggerItem<Self::Payload>>,
    ) -> Result<BatchRuns, QueueError>;
}
