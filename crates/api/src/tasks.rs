//! Task ids, payloads, and run bodies for the background-job service.
//!
//! The API process only enqueues; the run bodies here are what a worker
//! deployment executes, and what tests drive directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgekit_email::{Mailer, SendEmailParams};
use forgekit_queue::{cron, ScheduleOptions};

pub const SEND_EMAIL_TASK_ID: &str = "send-email";
pub const HEARTBEAT_TASK_ID: &str = "heartbeat";
pub const DAILY_CLEANUP_TASK_ID: &str = "daily-cleanup";

/// Payload for the `send-email` task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailPayload {
    pub to: String,
    pub subject: String,
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// What a completed `send-email` run reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailOutcome {
    pub success: bool,
    pub sent_at: DateTime<Utc>,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

/// Run body of the `send-email` task: deliver via the mailer, erroring when
/// the mailer reports failure so the provider's retry policy kicks in.
pub async fn run_send_email(
    mailer: &dyn Mailer,
    payload: &SendEmailPayload,
) -> anyhow::Result<SendEmailOutcome> {
    tracing::info!(to = %payload.to, subject = %payload.subject, "sending email");

    let params = SendEmailParams::new(
        payload.to.clone(),
        payload.subject.clone(),
        payload.html.clone(),
    );
    let result = mailer.send(&params).await;

    if !result.success {
        let message = result
            .error
            .unwrap_or_else(|| "Failed to send email".to_string());
        tracing::error!(to = %payload.to, error = %message, "failed to send email");
        anyhow::bail!(message);
    }

    tracing::info!(to = %payload.to, email_id = ?result.id, "email sent successfully");
    Ok(SendEmailOutcome {
        success: true,
        sent_at: Utc::now(),
        to: payload.to.clone(),
        email_id: result.id,
    })
}

/// Recurring schedules this service expects to exist, keyed by task id.
/// Registering them through the schedule manager is idempotent thanks to
/// the deduplication keys.
pub fn default_schedules() -> Vec<(&'static str, ScheduleOptions)> {
    vec![
        (
            HEARTBEAT_TASK_ID,
            ScheduleOptions {
                cron: cron::EVERY_5_MINUTES.to_string(),
                timezone: None,
                external_id: None,
                deduplication_key: "heartbeat-every-5m".to_string(),
            },
        ),
        (
            DAILY_CLEANUP_TASK_ID,
            ScheduleOptions {
                cron: cron::DAILY_MIDNIGHT.to_string(),
                timezone: Some("UTC".to_string()),
                external_id: None,
                deduplication_key: "daily-cleanup-midnight".to_string(),
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use forgekit_email::SendEmailResult;
    use std::sync::Mutex;

    struct FakeMailer {
        result: SendEmailResult,
        sent: Mutex<Vec<SendEmailParams>>,
    }

    impl FakeMailer {
        fn new(result: SendEmailResult) -> Self {
            Self {
                result,
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Mailer for FakeMailer {
        async fn send(&self, params: &SendEmailParams) -> SendEmailResult {
            self.sent.lock().unwrap().push(params.clone());
            self.result.clone()
        }
    }

    fn payload() -> SendEmailPayload {
        SendEmailPayload {
            to: "ada@example.com".to_string(),
            subject: "Welcome To Forgekit".to_string(),
            html: "<p>Hi</p>".to_string(),
            user_id: None,
        }
    }

    #[tokio::test]
    async fn successful_send_reports_the_outcome() {
        let mailer = FakeMailer::new(SendEmailResult::sent(Some("email_1".to_string())));

        let outcome = run_send_email(&mailer, &payload()).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.to, "ada@example.com");
        assert_eq!(outcome.email_id.as_deref(), Some("email_1"));

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "Welcome To Forgekit");
    }

    #[tokio::test]
    async fn failed_send_becomes_an_error() {
        let mailer = FakeMailer::new(SendEmailResult::failed("rate limited"));

        let err = run_send_email(&mailer, &payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "rate limited");
    }

    #[tokio::test]
    async fn failed_send_without_a_reason_gets_a_generic_one() {
        let mailer = FakeMailer::new(SendEmailResult {
            success: false,
            id: None,
            error: None,
        });

        let err = run_send_email(&mailer, &payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to send email");
    }

    #[test]
    fn default_schedules_cover_the_cron_tasks() {
        let schedules = default_schedules();
        assert_eq!(schedules.len(), 2);

        let (task, heartbeat) = &schedules[0];
        assert_eq!(*task, HEARTBEAT_TASK_ID);
        assert_eq!(heartbeat.cron, "*/5 * * * *");
        assert!(heartbeat.timezone.is_none());

        let (task, cleanup) = &schedules[1];
        assert_eq!(*task, DAILY_CLEANUP_TASK_ID);
        assert_eq!(cleanup.cron, "0 0 * * *");
        assert_eq!(cleanup.timezone.as_deref(), Some("UTC"));
        assert_ne!(heartbeat.deduplication_key, cleanup.deduplication_key);
    }

    #[test]
    fn payload_serializes_camel_case() {
        let payload = SendEmailPayload {
            to: "ada@example.com".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            user_id: Some("u1".to_string()),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["userId"], "u1");
        assert!(json.get("user_id").is_none());
    }
}
