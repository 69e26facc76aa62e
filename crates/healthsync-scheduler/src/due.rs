use std::sync::Arc;

use chrono::{DateTime, Utc};
use healthsync_types::models::ReminderItem;
use healthsync_types::store::{ReminderStore, StoreError};
use healthsync_types::time::{format_time_of_day, truncate_to_minute};
use tracing::debug;

/// Turns "now" into the due-reminder predicate.
///
/// An item is due when its time of day is at or before the current minute and
/// it has not been notified yet. A delayed or skipped tick therefore still
/// picks up everything it missed; the notified flag is what prevents repeats.
#[derive(Clone)]
pub struct ReminderQuery {
    store: Arc<dyn ReminderStore>,
}

impl ReminderQuery {
    pub fn new(store: Arc<dyn ReminderStore>) -> Self {
        Self { store }
    }

    /// No ordering guarantee on the result.
    pub async fn find_due_at(&self, now: DateTime<Utc>) -> Result<Vec<ReminderItem>, StoreError> {
        let up_to = truncate_to_minute(now);
        debug!("Checking medications due up to {}", format_time_of_day(up_to));
        self.store.find_due_reminders(up_to).await
    }
}
