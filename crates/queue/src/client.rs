//! HTTP client for the external task service.
//!
//! Everything provider-specific lives here: endpoint paths, auth, the
//! polling loop. The rest of the crate only sees the [`TriggerableTask`],
//! [`RunLookup`] and [`ScheduleService`] traits.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::QueueError;
use crate::runs::{RunInfo, RunLookup};
use crate::schedules::{CreateSchedule, Schedule, ScheduleService, UpdateScheduleOptions};
use crate::task::{BatchRuns, BatchTriggerItem, RunRef, TriggerOptions, TriggerableTask};
use crate::types::{JobStatus, RunResult};

pub const DEFAULT_BASE_URL: &str = "https://api.trigger.dev";

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Authenticated client for the task service management API.
#[derive(Clone)]
pub struct TriggerClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    poll_interval: Duration,
}

impl TriggerClient {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: secret_key.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Point at a different API host (self-hosted deployments).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// How often the wait path re-checks a run. Tests shrink this.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send, authenticate, and decode one request. Non-2xx responses become
    /// [`QueueError::Api`] with the response body as the message.
    async fn send<R: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<R, QueueError> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QueueError::api(status.as_u16(), message));
        }
        Ok(response.json().await?)
    }

    /// Like [`send`](Self::send) for endpoints whose body we discard.
    async fn send_ok(&self, request: reqwest::RequestBuilder) -> Result<(), QueueError> {
        let response = request.bearer_auth(&self.secret_key).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QueueError::api(status.as_u16(), message));
        }
        Ok(())
    }

    pub(crate) async fn retrieve_run(&self, run_id: &str) -> Result<RunInfo, QueueError> {
        self.send(self.http.get(self.url(&format!("/api/v3/runs/{run_id}"))))
            .await
    }
}

#[async_trait]
impl RunLookup for TriggerClient {
    async fn retrieve(&self, run_id: &str) -> Result<RunInfo, QueueError> {
        self.retrieve_run(run_id).await
    }

    async fn cancel(&self, run_id: &str) -> Result<(), QueueError> {
        self.send_ok(
            self.http
                .post(self.url(&format!("/api/v2/runs/{run_id}/cancel"))),
        )
        .await
    }

    async fn replay(&self, run_id: &str) -> Result<RunRef, QueueError> {
        self.send(
            self.http
                .post(self.url(&format!("/api/v1/runs/{run_id}/replay"))),
        )
        .await
    }
}

#[derive(Deserialize)]
struct ScheduleList {
    #[serde(default)]
    data: Vec<Schedule>,
}

#[derive(Deserialize)]
struct TimezoneList {
    #[serde(default)]
    timezones: Vec<String>,
}

#[async_trait]
impl ScheduleService for TriggerClient {
    async fn create(&self, request: &CreateSchedule) -> Result<Schedule, QueueError> {
        self.send(self.http.post(self.url("/api/v1/schedules")).json(request))
            .await
    }

    async fn retrieve(&self, schedule_id: &str) -> Result<Schedule, QueueError> {
        self.send(
            self.http
                .get(self.url(&format!("/api/v1/schedules/{schedule_id}"))),
        )
        .await
    }

    async fn list(&self) -> Result<Vec<Schedule>, QueueError> {
        let page: ScheduleList = self.send(self.http.get(self.url("/api/v1/schedules"))).await?;
        Ok(page.data)
    }

    async fn update(
        &self,
        schedule_id: &str,
        update: &UpdateScheduleOptions,
    ) -> Result<Schedule, QueueError> {
        self.send(
            self.http
                .put(self.url(&format!("/api/v1/schedules/{schedule_id}")))
                .json(update),
        )
        .await
    }

    async fn activate(&self, schedule_id: &str) -> Result<(), QueueError> {
        self.send_ok(
            self.http
                .post(self.url(&format!("/api/v1/schedules/{schedule_id}/activate"))),
        )
        .await
    }

    async fn deactivate(&self, schedule_id: &str) -> Result<(), QueueError> {
        self.send_ok(
            self.http
                .post(self.url(&format!("/api/v1/schedules/{schedule_id}/deactivate"))),
        )
        .await
    }

    async fn delete(&self, schedule_id: &str) -> Result<(), QueueError> {
        self.send_ok(
            self.http
                .delete(self.url(&format!("/api/v1/schedules/{schedule_id}"))),
        )
        .await
    }

    async fn timezones(&self) -> Result<Vec<String>, QueueError> {
        let page: TimezoneList = self.send(self.http.get(self.url("/api/v1/timezones"))).await?;
        Ok(page.timezones)
    }
}

/// A task registered on the remote service, addressed by its string id.
///
/// `P` only pins the payload type at compile time; the wire format is
/// whatever `P` serializes to.
pub struct RemoteTask<P> {
    id: String,
    client: TriggerClient,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Clone for RemoteTask<P> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            client: self.client.clone(),
            _payload: PhantomData,
        }
    }
}

impl<P> RemoteTask<P> {
    pub fn new(client: TriggerClient, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client,
            _payload: PhantomData,
        }
    }
}

#[derive(Serialize)]
struct TriggerBody<'a, P: Serialize> {
    payload: &'a P,
    options: &'a TriggerOptions,
}

#[derive(Serialize)]
struct BatchBody<'a, P: Serialize> {
    items: Vec<TriggerBody<'a, P>>,
}

#[async_trait]
impl<P: Serialize + Send + Sync> TriggerableTask for RemoteTask<P> {
    type Payload = P;

    fn id(&self) -> &str {
        &self.id
    }

    async fn trigger(
        &self,
        payload: &P,
        options: &TriggerOptions,
    ) -> Result<RunRef, QueueError> {
        let body = TriggerBody { payload, options };
        self.client
            .send(
                self.client
                    .http
                    .post(self.client.url(&format!("/api/v1/tasks/{}/trigger", self.id)))
                    .json(&body),
            )
            .await
    }

    /// Trigger, then poll until the run reaches a terminal status.
    ///
    /// No local timeout: deadlines belong to the caller, who can wrap this
    /// future in one.
    async fn trigger_and_wait(
        &self,
        payload: &P,
        options: &TriggerOptions,
    ) -> Result<RunResult, QueueError> {
        let run = self.trigger(payload, options).await?;
        loop {
            let info = self.client.retrieve_run(&run.id).await?;
            if JobStatus::from_provider(&info.status).is_terminal() {
                return Ok(info.into_result());
            }
            tokio::time::sleep(self.client.poll_interval).await;
        }
    }

    async fn batch_trigger(
        &self,
        items: Vec<BatchTriggerItem<P>>,
    ) -> Result<BatchRuns, QueueError> {
        let body = BatchBody {
            items: items
                .iter()
                .map(|item| TriggerBody {
                    payload: &item.payload,
                    options: &item.options,
                })
                .collect(),
        };
        self.client
            .send(
                self.client
                    .http
                    .post(self.client.url(&format!("/api/v1/tasks/{}/batch", self.id)))
                    .json(&body),
            )
            .await
    }
}
