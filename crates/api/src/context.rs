//! Shared per-process state, built once in `main` and handed to every
//! request via `Extension<Arc<AppContext>>`.

use std::sync::Arc;

use forgekit_db::{DbError, UserStore};
use forgekit_email::{Mailer, ResendMailer};
use forgekit_queue::{
    Queue, RemoteTask, ScheduleManager, TaskQueue, TriggerClient, TriggerableTask,
};

use crate::config::AppConfig;
use crate::middleware::RequestGate;
use crate::tasks::{self, SendEmailPayload};

/// Job-service clients, present only when `TRIGGER_SECRET_KEY` is set.
#[derive(Clone)]
pub struct QueueServices {
    /// Generic façade for ad-hoc dispatch and run control.
    pub jobs: Queue,
    /// The `send-email` task, pre-bound.
    pub email: TaskQueue<SendEmailPayload>,
    pub schedules: ScheduleManager,
}

pub struct AppContext {
    pub config: AppConfig,
    pub users: UserStore,
    pub queues: Option<QueueServices>,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub gate: Option<Arc<dyn RequestGate>>,
}

impl AppContext {
    /// Wire production services from config. The database pool connects
    /// lazily, so this succeeds even when Postgres is not up yet.
    pub fn new(config: AppConfig) -> Result<Self, DbError> {
        let pool = forgekit_db::connect_lazy(&config.database_url)?;
        let queues = build_queues(&config);
        let mailer = build_mailer(&config);
        Ok(Self {
            config,
            users: UserStore::postgres(pool),
            queues,
            mailer,
            gate: None,
        })
    }

    pub fn with_gate(mut self, gate: Arc<dyn RequestGate>) -> Self {
        self.gate = Some(gate);
        self
    }
}

fn build_queues(config: &AppConfig) -> Option<QueueServices> {
    let secret_key = config.trigger_secret_key.as_ref()?;
    let client = TriggerClient::new(secret_key.clone());

    let jobs = Queue::new(Arc::new(client.clone()));
    let send_email: Arc<dyn TriggerableTask<Payload = SendEmailPayload>> =
        Arc::new(RemoteTask::new(client.clone(), tasks::SEND_EMAIL_TASK_ID));
    let email = TaskQueue::new(send_email, jobs.clone());
    let schedules = ScheduleManager::new(Arc::new(client));

    Some(QueueServices {
        jobs,
        email,
        schedules,
    })
}

fn build_mailer(config: &AppConfig) -> Option<Arc<dyn Mailer>> {
    let api_key = config.resend_api_key.as_ref()?;
    // A missing sender is the provider's problem at send time, same as a
    // bad key; construction only needs the credential.
    let default_from = config.resend_mail.clone().unwrap_or_default();
    Some(Arc::new(ResendMailer::new(api_key.clone(), default_from)))
}
