use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::delivery::{DeliveryContext, DeliveryOutcome};
use crate::due::ReminderQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Bound on every data store and notifier call.
    pub call_timeout: Duration,
    /// Cap on deliveries running at once. `None` spawns every due item
    /// immediately with no back-pressure.
    pub max_in_flight: Option<usize>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            max_in_flight: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TickPhase {
    Idle = 0,
    Fetching = 1,
    Dispatching = 2,
}

impl TickPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Fetching,
            2 => Self::Dispatching,
            _ => Self::Idle,
        }
    }
}

/// Result of one tick.
#[derive(Debug)]
pub enum TickOutcome {
    /// The due-item fetch failed or timed out; nothing was dispatched.
    Abandoned,
    /// One handle per spawned delivery. Dropping them detaches the tasks.
    Dispatched(Vec<JoinHandle<DeliveryOutcome>>),
}

impl TickOutcome {
    pub fn dispatched(&self) -> usize {
        match self {
            Self::Abandoned => 0,
            Self::Dispatched(handles) => handles.len(),
        }
    }

    /// Wait for every delivery launched by this tick.
    pub async fn join(self) -> Vec<DeliveryOutcome> {
        let Self::Dispatched(handles) = self else {
            return Vec::new();
        };

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!("Delivery task aborted: {}", e),
            }
        }
        outcomes
    }
}

/// Fetches due reminders and fans out one delivery task per item.
pub struct Dispatcher {
    query: ReminderQuery,
    delivery: Arc<DeliveryContext>,
    limiter: Option<Arc<Semaphore>>,
    call_timeout: Duration,
    phase: AtomicU8,
}

impl Dispatcher {
    pub fn new(query: ReminderQuery, delivery: DeliveryContext, config: DispatcherConfig) -> Self {
        let limiter = config
            .max_in_flight
            .map(|n| Arc::new(Semaphore::new(n.max(1))));

        Self {
            query,
            delivery: Arc::new(delivery),
            limiter,
            call_timeout: config.call_timeout,
            phase: AtomicU8::new(TickPhase::Idle as u8),
        }
    }

    pub fn phase(&self) -> TickPhase {
        TickPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: TickPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Run one tick. Returns as soon as the deliveries are spawned, never
    /// waiting for them.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickOutcome {
        self.set_phase(TickPhase::Fetching);
        let fetched = tokio::time::timeout(self.call_timeout, self.query.find_due_at(now)).await;

        let items = match fetched {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                warn!("Error retrieving medications, skipping tick: {}", e);
                self.set_phase(TickPhase::Idle);
                return TickOutcome::Abandoned;
            }
            Err(_) => {
                warn!(
                    "Retrieving medications timed out after {:?}, skipping tick",
                    self.call_timeout
                );
                self.set_phase(TickPhase::Idle);
                return TickOutcome::Abandoned;
            }
        };

        self.set_phase(TickPhase::Dispatching);
        if items.is_empty() {
            debug!("No medications due");
        } else {
            info!("Dispatching {} due medication reminders", items.len());
        }

        let handles = items
            .into_iter()
            .map(|item| {
                let delivery = self.delivery.clone();
                let limiter = self.limiter.clone();
                tokio::spawn(async move {
                    // Held until the delivery finishes.
                    let _permit = match limiter {
                        Some(sem) => sem.acquire_owned().await.ok(),
                        None => None,
                    };
                    delivery.run(item).await
                })
            })
            .collect();

        self.set_phase(TickPhase::Idle);
        TickOutcome::Dispatched(handles)
    }
}
