//! The job-queue façade.
//!
//! Stateless glue over the task and run boundaries. Enqueue-side operations
//! log and re-throw provider failures (callers decide what a failed enqueue
//! means); status-side operations degrade to `None`/`false` so a flaky
//! provider can never break a read path.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::QueueError;
use crate::runs::RunLookup;
use crate::task::{BatchTriggerItem, TriggerOptions, TriggerableTask};
use crate::types::{BatchItem, CommonOptions, Delay, JobHandle, JobStatus, QueueOptions, RunResult};

/// Replay handles cannot know the original task id; they carry this sentinel.
const REPLAYED_TASK_ID: &str = "replayed";

/// Fallback task id when the provider omits `task_identifier` on a run.
const UNKNOWN_TASK_ID: &str = "unknown";

/// Thin façade over the external task service.
#[derive(Clone)]
pub struct Queue {
    runs: Arc<dyn RunLookup>,
}

impl Queue {
    pub fn new(runs: Arc<dyn RunLookup>) -> Self {
        Self { runs }
    }

    /// Enqueue one job. Returns a handle with status `QUEUED`; provider
    /// failures are logged and re-thrown unchanged (no local retry).
    pub async fn enqueue<T>(
        &self,
        task: &T,
        payload: &T::Payload,
        options: &QueueOptions,
    ) -> Result<JobHandle, QueueError>
    where
        T: TriggerableTask + ?Sized,
    {
        let wire = TriggerOptions::from_queue(options);
        match task.trigger(payload, &wire).await {
            Ok(run) => {
                tracing::info!(job_id = %run.id, task_id = %task.id(), "job enqueued");
                Ok(JobHandle {
                    id: run.id,
                    task_id: task.id().to_string(),
                    status: JobStatus::Queued,
                })
            }
            Err(err) => {
                tracing::error!(task_id = %task.id(), error = %err, "failed to enqueue job");
                Err(err)
            }
        }
    }

    /// Enqueue and block until the run is terminal, returning its result.
    ///
    /// Only the idempotency key and tags are forwarded. There is no local
    /// timeout; deadlines belong to the caller.
    pub async fn enqueue_and_wait<T>(
        &self,
        task: &T,
        payload: &T::Payload,
        options: &CommonOptions,
    ) -> Result<RunResult, QueueError>
    where
        T: TriggerableTask + ?Sized,
    {
        tracing::info!(task_id = %task.id(), "job enqueued, waiting for completion");
        let wire = TriggerOptions::for_wait(options);
        match task.trigger_and_wait(payload, &wire).await {
            Ok(result) => {
                tracing::info!(job_id = %result.id, task_id = %task.id(), "job completed");
                Ok(result)
            }
            Err(err) => {
                tracing::error!(task_id = %task.id(), error = %err, "job failed");
                Err(err)
            }
        }
    }

    /// Enqueue many jobs in one provider call.
    ///
    /// Handles come back in item order, one per run the provider reports.
    /// An empty input short-circuits to an empty `Vec` without a wire call.
    pub async fn enqueue_batch<T>(
        &self,
        task: &T,
        items: Vec<BatchItem<T::Payload>>,
    ) -> Result<Vec<JobHandle>, QueueError>
    where
        T: TriggerableTask + ?Sized,
    {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let count = items.len();
        let batch: Vec<BatchTriggerItem<T::Payload>> = items
            .into_iter()
            .map(|item| {
                let options = TriggerOptions::from_queue(&item.options.unwrap_or_default());
                BatchTriggerItem {
                    payload: item.payload,
                    options,
                }
            })
            .collect();
        match task.batch_trigger(batch).await {
            Ok(result) => {
                tracing::info!(task_id = %task.id(), count, "batch jobs enqueued");
                Ok(result
                    .runs
                    .into_iter()
                    .map(|run| JobHandle {
                        id: run.id,
                        task_id: task.id().to_string(),
                        status: JobStatus::Queued,
                    })
                    .collect())
            }
            Err(err) => {
                tracing::error!(task_id = %task.id(), error = %err, "failed to enqueue batch");
                Err(err)
            }
        }
    }

    /// Enqueue with the delay pinned to `run_at`.
    ///
    /// Sugar for [`enqueue`](Self::enqueue); the option type has no delay
    /// slot, so callers cannot supply a competing one.
    pub async fn schedule<T>(
        &self,
        task: &T,
        payload: &T::Payload,
        run_at: DateTime<Utc>,
        options: &CommonOptions,
    ) -> Result<JobHandle, QueueError>
    where
        T: TriggerableTask + ?Sized,
    {
        let queue_options = QueueOptions {
            delay: Some(Delay::Until(run_at)),
            idempotency_key: options.idempotency_key.clone(),
            ttl: options.ttl.clone(),
            tags: options.tags.clone(),
        };
        self.enqueue(task, payload, &queue_options).await
    }

    /// Current status of a run, `None` when the lookup fails or the run is
    /// gone. Never an error: status checks must not take a request down.
    pub async fn get_status(&self, run_id: &str) -> Option<JobHandle> {
        match self.runs.retrieve(run_id).await {
            Ok(run) => Some(JobHandle {
                id: run.id,
                task_id: run
                    .task_identifier
                    .unwrap_or_else(|| UNKNOWN_TASK_ID.to_string()),
                status: JobStatus::from_provider(&run.status),
            }),
            Err(err) => {
                tracing::error!(run_id, error = %err, "failed to get job status");
                None
            }
        }
    }

    /// Best-effort cancel; `true` only when the provider confirmed it.
    pub async fn cancel(&self, run_id: &str) -> bool {
        match self.runs.cancel(run_id).await {
            Ok(()) => {
                tracing::info!(run_id, "job cancelled");
                true
            }
            Err(err) => {
                tracing::error!(run_id, error = %err, "failed to cancel job");
                false
            }
        }
    }

    /// Re-run a finished run. The new handle carries the `"replayed"`
    /// sentinel task id; `None` when the provider refused.
    pub async fn replay(&self, run_id: &str) -> Option<JobHandle> {
        match self.runs.replay(run_id).await {
            Ok(new_run) => {
                tracing::info!(run_id, new_run_id = %new_run.id, "job replayed");
                Some(JobHandle {
                    id: new_run.id,
                    task_id: REPLAYED_TASK_ID.to_string(),
                    status: JobStatus::Queued,
                })
            }
            Err(err) => {
                tracing::error!(run_id, error = %err, "failed to replay job");
                None
            }
        }
    }
}

/// Per-task view over the queue: the enqueue-side operations with the task
/// argument already applied. Adds no behavior of its own.
pub struct TaskQueue<P> {
    task: Arc<dyn TriggerableTask<Payload = P>>,
    queue: Queue,
}

impl<P> Clone for TaskQueue<P> {
    fn clone(&self) -> Self {
        Self {
            task: self.task.clone(),
            queue: self.queue.clone(),
        }
    }
}

impl<P: Serialize + Send + Sync> TaskQueue<P> {
    pub fn new(task: Arc<dyn TriggerableTask<Payload = P>>, queue: Queue) -> Self {
        Self { task, queue }
    }

    pub fn task_id(&self) -> &str {
        self.task.id()
    }

    pub async fn enqueue(
        &self,
        payload: &P,
        options: &QueueOptions,
    ) -> Result<JobHandle, QueueError> {
        self.queue.enqueue(self.task.as_ref(), payload, options).await
    }

    pub async fn enqueue_and_wait(
        &self,
        payload: &P,
        options: &CommonOptions,
    ) -> Result<RunResult, QueueError> {
        self.queue
            .enqueue_and_wait(self.task.as_ref(), payload, options)
            .await
    }

    pub async fn enqueue_batch(
        &self,
        items: Vec<BatchItem<P>>,
    ) -> Result<Vec<JobHandle>, QueueError> {
        self.queue.enqueue_batch(self.task.as_ref(), items).await
    }

    pub async fn schedule(
        &self,
        payload: &P,
        run_at: DateTime<Utc>,
        options: &CommonOptions,
    ) -> Result<JobHandle, QueueError> {
        self.queue
            .schedule(self.task.as_ref(), payload, run_at, options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runs::RunInfo;
    use crate::task::{BatchRuns, RunRef};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTask {
        fail: bool,
        triggers: Mutex<Vec<(String, TriggerOptions)>>,
        waits: Mutex<Vec<TriggerOptions>>,
        batches: Mutex<Vec<Vec<(String, TriggerOptions)>>>,
    }

    #[async_trait]
    impl TriggerableTask for RecordingTask {
        type Payload = String;

        fn id(&self) -> &str {
            "test-task"
        }

        async fn trigger(
            &self,
            payload: &String,
            options: &TriggerOptions,
        ) -> Result<RunRef, QueueError> {
            if self.fail {
                return Err(QueueError::api(500, "provider down"));
            }
            self.triggers
                .lock()
                .unwrap()
                .push((payload.clone(), options.clone()));
            Ok(RunRef {
                id: "run_1".to_string(),
            })
        }

        async fn trigger_and_wait(
            &self,
            _payload: &String,
            options: &TriggerOptions,
        ) -> Result<RunResult, QueueError> {
            if self.fail {
                return Err(QueueError::api(500, "provider down"));
            }
            self.waits.lock().unwrap().push(options.clone());
            Ok(RunResult {
                id: "run_1".to_string(),
                ok: true,
                output: Some(serde_json::json!({ "done": true })),
                error: None,
            })
        }

        async fn batch_trigger(
            &self,
            items: Vec<BatchTriggerItem<String>>,
        ) -> Result<BatchRuns, QueueError> {
            if self.fail {
                return Err(QueueError::api(500, "provider down"));
            }
            let runs = (0..items.len())
                .map(|i| RunRef {
                    id: format!("run_{i}"),
                })
                .collect();
            self.batches.lock().unwrap().push(
                items
                    .into_iter()
                    .map(|item| (item.payload, item.options))
                    .collect(),
            );
            Ok(BatchRuns {
                batch_id: Some("batch_1".to_string()),
                runs,
            })
        }
    }

    struct FakeRuns {
        status: Option<&'static str>,
        fail_control: bool,
    }

    impl Default for FakeRuns {
        fn default() -> Self {
            Self {
                status: Some("QUEUED"),
                fail_control: false,
            }
        }
    }

    #[async_trait]
    impl RunLookup for FakeRuns {
        async fn retrieve(&self, run_id: &str) -> Result<RunInfo, QueueError> {
            match self.status {
                Some(status) => Ok(RunInfo {
                    id: run_id.to_string(),
                    task_identifier: Some("test-task".to_string()),
                    status: status.to_string(),
                    output: None,
                    error: None,
                }),
                None => Err(QueueError::api(404, "run not found")),
            }
        }

        async fn cancel(&self, _run_id: &str) -> Result<(), QueueError> {
            if self.fail_control {
                return Err(QueueError::api(500, "provider down"));
            }
            Ok(())
        }

        async fn replay(&self, _run_id: &str) -> Result<RunRef, QueueError> {
            if self.fail_control {
                return Err(QueueError::api(500, "provider down"));
            }
            Ok(RunRef {
                id: "run_2".to_string(),
            })
        }
    }

    fn queue() -> Queue {
        Queue::new(Arc::new(FakeRuns::default()))
    }

    #[tokio::test]
    async fn enqueue_returns_queued_handle_and_forwards_options() {
        let task = RecordingTask::default();
        let options = QueueOptions {
            delay: Some(Delay::For("1h".to_string())),
            idempotency_key: Some("key-1".to_string()),
            ttl: Some("24h".to_string()),
            tags: Some(vec!["welcome".to_string()]),
        };

        let handle = queue()
            .enqueue(&task, &"hello".to_string(), &options)
            .await
            .unwrap();

        assert_eq!(handle.id, "run_1");
        assert_eq!(handle.task_id, "test-task");
        assert_eq!(handle.status, JobStatus::Queued);

        let triggers = task.triggers.lock().unwrap();
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].0, "hello");
        assert_eq!(triggers[0].1, TriggerOptions::from_queue(&options));
    }

    #[tokio::test]
    async fn enqueue_failure_propagates() {
        let task = RecordingTask {
            fail: true,
            ..Default::default()
        };
        let result = queue()
            .enqueue(&task, &"hello".to_string(), &QueueOptions::default())
            .await;
        assert!(matches!(result, Err(QueueError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn wait_forwards_only_idempotency_key_and_tags() {
        let task = RecordingTask::default();
        let options = CommonOptions {
            idempotency_key: Some("key-1".to_string()),
            ttl: Some("24h".to_string()),
            tags: Some(vec!["welcome".to_string()]),
        };

        let result = queue()
            .enqueue_and_wait(&task, &"hello".to_string(), &options)
            .await
            .unwrap();
        assert!(result.ok);

        let waits = task.waits.lock().unwrap();
        assert_eq!(waits[0].ttl, None);
        assert_eq!(waits[0].delay, None);
        assert_eq!(waits[0].idempotency_key.as_deref(), Some("key-1"));
        assert_eq!(waits[0].tags, Some(vec!["welcome".to_string()]));
    }

    #[tokio::test]
    async fn batch_maps_runs_in_item_order() {
        let task = RecordingTask::default();
        let items = vec![
            BatchItem::new("a".to_string()),
            BatchItem::with_options(
                "b".to_string(),
                QueueOptions {
                    idempotency_key: Some("key-b".to_string()),
                    ..Default::default()
                },
            ),
            BatchItem::new("c".to_string()),
        ];

        let handles = queue().enqueue_batch(&task, items).await.unwrap();

        assert_eq!(handles.len(), 3);
        assert_eq!(handles[0].id, "run_0");
        assert_eq!(handles[2].id, "run_2");
        assert!(handles.iter().all(|h| h.status == JobStatus::Queued));
        assert!(handles.iter().all(|h| h.task_id == "test-task"));

        let batches = task.batches.lock().unwrap();
        let sent: Vec<&str> = batches[0].iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(sent, vec!["a", "b", "c"]);
        assert_eq!(batches[0][1].1.idempotency_key.as_deref(), Some("key-b"));
    }

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let task = RecordingTask::default();
        let handles = queue().enqueue_batch(&task, Vec::new()).await.unwrap();
        assert!(handles.is_empty());
        assert!(task.batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn schedule_pins_delay_to_run_at() {
        let task = RecordingTask::default();
        let run_at: DateTime<Utc> = "2026-03-01T09:00:00Z".parse().unwrap();
        let options = CommonOptions {
            ttl: Some("24h".to_string()),
            ..Default::default()
        };

        let handle = queue()
            .schedule(&task, &"hello".to_string(), run_at, &options)
            .await
            .unwrap();
        assert_eq!(handle.status, JobStatus::Queued);

        let triggers = task.triggers.lock().unwrap();
        assert_eq!(triggers[0].1.delay, Some(Delay::Until(run_at)));
        assert_eq!(triggers[0].1.ttl.as_deref(), Some("24h"));
    }

    #[tokio::test]
    async fn get_status_normalizes_provider_status() {
        for (provider, expected) in [
            ("PENDING", JobStatus::Queued),
            ("EXECUTING", JobStatus::Executing),
            ("COMPLETED", JobStatus::Completed),
            ("SYSTEM_FAILURE", JobStatus::Failed),
            ("SOMETHING_NEW", JobStatus::Queued),
        ] {
            let queue = Queue::new(Arc::new(FakeRuns {
                status: Some(provider),
                fail_control: false,
            }));
            let handle = queue.get_status("run_1").await.unwrap();
            assert_eq!(handle.status, expected, "provider status {provider}");
            assert_eq!(handle.task_id, "test-task");
        }
    }

    #[tokio::test]
    async fn get_status_is_none_on_lookup_failure() {
        let queue = Queue::new(Arc::new(FakeRuns {
            status: None,
            fail_control: false,
        }));
        assert!(queue.get_status("run_1").await.is_none());
    }

    #[tokio::test]
    async fn cancel_degrades_to_false() {
        assert!(queue().cancel("run_1").await);

        let failing = Queue::new(Arc::new(FakeRuns {
            status: Some("QUEUED"),
            fail_control: true,
        }));
        assert!(!failing.cancel("run_1").await);
    }

    #[tokio::test]
    async fn replay_carries_the_sentinel_task_id() {
        let handle = queue().replay("run_1").await.unwrap();
        assert_eq!(handle.id, "run_2");
        assert_eq!(handle.task_id, "replayed");
        assert_eq!(handle.status, JobStatus::Queued);

        let failing = Queue::new(Arc::new(FakeRuns {
            status: Some("QUEUED"),
            fail_control: true,
        }));
        assert!(failing.replay("run_1").await.is_none());
    }

    #[tokio::test]
    async fn task_queue_binds_the_task() {
        let task: Arc<dyn TriggerableTask<Payload = String>> =
            Arc::new(RecordingTask::default());
        let bound = TaskQueue::new(task, queue());

        assert_eq!(bound.task_id(), "test-task");
        let handle = bound
            .enqueue(&"hello".to_string(), &QueueOptions::default())
            .await
            .unwrap();
        assert_eq!(handle.task_id, "test-task");
    }

    fn run_on_runtime<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: a batch of N items always yields N handles, in item
        /// order, every one of them QUEUED.
        #[test]
        fn batch_of_n_items_yields_n_ordered_handles(
            payloads in prop::collection::vec("[a-z]{1,8}", 0..12)
        ) {
            let handles = run_on_runtime(async {
                let task = RecordingTask::default();
                let items = payloads.iter().map(|p| BatchItem::new(p.clone())).collect();
                queue().enqueue_batch(&task, items).await.unwrap()
            });

            prop_assert_eq!(handles.len(), payloads.len());
            for (i, handle) in handles.iter().enumerate() {
                prop_assert_eq!(&handle.id, &format!("run_{i}"));
                prop_assert_eq!(handle.status, JobStatus::Queued);
            }
        }
    }
}
