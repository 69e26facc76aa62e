use std::time::Duration;

use async_trait::async_trait;
use healthsync_types::models::DeliveryTarget;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("push request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("push gateway rejected message: HTTP {status}")]
    Rejected { status: u16 },
}

/// Push transport. Implementations must be safe to call from many delivery
/// tasks at once.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, target: &DeliveryTarget, title: &str, body: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct PushNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct PushMessage<'a> {
    to: &'a str,
    notification: PushNotification<'a>,
}

/// Posts each message as JSON to a push gateway (FCM-style `to` + `notification`).
pub struct HttpPushNotifier {
    client: reqwest::Client,
    url: String,
    auth_token: Option<String>,
}

impl HttpPushNotifier {
    pub fn new(url: impl Into<String>, auth_token: Option<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            auth_token,
        })
    }
}

#[async_trait]
impl Notifier for HttpPushNotifier {
    async fn send(&self, target: &DeliveryTarget, title: &str, body: &str) -> Result<(), NotifyError> {
        let message = PushMessage {
            to: &target.token,
            notification: PushNotification { title, body },
        };

        let mut request = self.client.post(&self.url).json(&message);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
            });
        }

        debug!("Push accepted by gateway ({})", status);
        Ok(())
    }
}

/// Logs instead of pushing. Used when no push gateway is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, target: &DeliveryTarget, title: &str, body: &str) -> Result<(), NotifyError> {
        info!("[push:{}] {}: {}", target.token, title, body);
        Ok(())
    }
}
