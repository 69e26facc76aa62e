use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use healthsync_types::models::ReminderItem;
use healthsync_types::store::ReminderStore;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::notifier::Notifier;

pub const REMINDER_TITLE: &str = "Medication Reminder";

/// Why a single delivery stopped. Every kind leaves the reminder for a later tick
/// except `PersistenceFailed`, where the push already went out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("no delivery target: {0}")]
    TargetNotFound(String),

    #[error("delivery failed: {0}")]
    DeliveryFailed(String),

    #[error("could not mark reminder notified: {0}")]
    PersistenceFailed(String),
}

pub type DeliveryOutcome = Result<(), DeliveryError>;

/// Everything a delivery task needs. Shared read-only across tasks.
pub struct DeliveryContext {
    pub store: Arc<dyn ReminderStore>,
    pub notifier: Arc<dyn Notifier>,
    pub call_timeout: Duration,
}

pub fn reminder_body(item: &ReminderItem) -> String {
    format!("{} - Dosage: {}", item.medication_name, item.dosage)
}

async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| format!("timed out after {:?}", limit))
}

impl DeliveryContext {
    /// Deliver one reminder: target lookup, push, mark notified. Steps run in
    /// that order; the first failure ends the task.
    pub async fn deliver(&self, item: &ReminderItem) -> DeliveryOutcome {
        let target = match bounded(self.call_timeout, self.store.get_delivery_target(item.owner_id)).await {
            Ok(Ok(Some(target))) => target,
            Ok(Ok(None)) => {
                return Err(DeliveryError::TargetNotFound(format!(
                    "user {} has no device token",
                    item.owner_id
                )));
            }
            Ok(Err(e)) => return Err(DeliveryError::TargetNotFound(e.to_string())),
            Err(e) => return Err(DeliveryError::TargetNotFound(e)),
        };

        let body = reminder_body(item);
        match bounded(self.call_timeout, self.notifier.send(&target, REMINDER_TITLE, &body)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(DeliveryError::DeliveryFailed(e.to_string())),
            Err(e) => return Err(DeliveryError::DeliveryFailed(e)),
        }

        match bounded(self.call_timeout, self.store.mark_notified(item.id)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(DeliveryError::PersistenceFailed(e.to_string())),
            Err(e) => Err(DeliveryError::PersistenceFailed(e)),
        }
    }

    /// [`deliver`](Self::deliver) plus logging. Nothing propagates past here.
    pub async fn run(&self, item: ReminderItem) -> DeliveryOutcome {
        let outcome = self.deliver(&item).await;
        match &outcome {
            Ok(()) => info!(
                "Notification sent for medication {} ({})",
                item.medication_name, item.id
            ),
            Err(e @ DeliveryError::PersistenceFailed(_)) => error!(
                "Reminder {} was pushed but not marked; it will be sent again: {}",
                item.id, e
            ),
            Err(e) => warn!("Reminder {} not delivered this tick: {}", item.id, e),
        }
        outcome
    }
}
