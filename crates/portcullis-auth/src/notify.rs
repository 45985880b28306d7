//! Post-commit signup notifications.
//!
//! Signup hands the committed user to a [`SignupNotifier`] and moves on.
//! The production notifier is a [`NotificationDispatcher`]: a bounded
//! channel drained by a background worker that forwards each
//! [`SignupEvent`] to a [`NotificationSink`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use portcullis_core::config::NotifyConfig;
use portcullis_core::error::{AppError, ErrorKind};
use portcullis_core::result::AppResult;
use portcullis_entity::user::User;

/// Receives newly committed users. Must return immediately.
pub trait SignupNotifier: Send + Sync + std::fmt::Debug + 'static {
    /// Queue a notification for `user`. Delivery is best effort.
    fn notify_new_user(&self, user: &User);
}

/// The payload delivered for each signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupEvent {
    /// New user id.
    pub user_id: Uuid,
    /// New user email.
    pub email: String,
    /// Signup attribution, if any.
    pub signup_attribution: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for SignupEvent {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            signup_attribution: user.signup_attribution.clone(),
            created_at: user.created_at,
        }
    }
}

/// Final destination of signup events.
#[async_trait]
pub trait NotificationSink: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver one event.
    async fn deliver(&self, event: &SignupEvent) -> AppResult<()>;
}

/// Sink that only records the signup in the log.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, event: &SignupEvent) -> AppResult<()> {
        info!(
            user_id = %event.user_id,
            email = %event.email,
            attribution = event.signup_attribution.as_deref().unwrap_or("-"),
            "New user signed up"
        );
        Ok(())
    }
}

/// Sink that POSTs each event as JSON to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// Creates a webhook sink with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("portcullis/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build webhook client", e)
            })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, event: &SignupEvent) -> AppResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(event)
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Internal, "Webhook request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::internal(format!(
                "Webhook responded with status {status}"
            )));
        }

        debug!(user_id = %event.user_id, "Signup webhook delivered");
        Ok(())
    }
}

/// Queues signup events for a background delivery worker.
///
/// Queueing never blocks: when the channel is full or the worker has
/// stopped, the event is dropped and a warning logged.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<SignupEvent>,
}

impl NotificationDispatcher {
    /// Spawn the delivery worker and return the dispatcher feeding it.
    ///
    /// The worker exits once every dispatcher clone has been dropped.
    pub fn spawn(sink: Arc<dyn NotificationSink>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::channel::<SignupEvent>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                if let Err(e) = sink.deliver(&event).await {
                    warn!(user_id = %event.user_id, error = %e, "Signup notification failed");
                }
            }
            debug!("Signup notification worker stopped");
        });

        (Self { sender }, worker)
    }

    /// Spawn a dispatcher with the sink selected by configuration.
    pub fn from_config(config: &NotifyConfig) -> AppResult<(Self, JoinHandle<()>)> {
        let sink: Arc<dyn NotificationSink> = match &config.webhook_url {
            Some(url) => {
                info!(url = %url, "Signup notifications go to webhook");
                Arc::new(WebhookSink::new(
                    url.clone(),
                    Duration::from_secs(config.webhook_timeout_seconds),
                )?)
            }
            None => {
                info!("Signup notifications go to the log");
                Arc::new(LogSink)
            }
        };
        Ok(Self::spawn(sink, config.queue_capacity))
    }
}

impl SignupNotifier for NotificationDispatcher {
    fn notify_new_user(&self, user: &User) {
        match self.sender.try_send(SignupEvent::from(user)) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(user_id = %event.user_id, "Notification queue full, dropping signup event");
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                warn!(user_id = %event.user_id, "Notification worker stopped, dropping signup event");
            }
        }
    }
}
