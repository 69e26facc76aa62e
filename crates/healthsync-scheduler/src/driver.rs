use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dispatcher::Dispatcher;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Owns the recurring timer. Run exactly one per process: two drivers against
/// the same database would double-dispatch.
pub struct SchedulerDriver {
    dispatcher: Arc<Dispatcher>,
    clock: Arc<dyn Clock>,
}

impl SchedulerDriver {
    pub fn new(dispatcher: Arc<Dispatcher>, clock: Arc<dyn Clock>) -> Self {
        Self { dispatcher, clock }
    }

    /// Spawn the tick loop. It exits once `cancel` fires; deliveries already
    /// spawned keep running to completion.
    pub fn start(self, interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(interval, cancel).await })
    }

    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        info!("Starting medication scheduler (every {:?})", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    debug!("Scheduler tick: checking medications");
                    let outcome = self.dispatcher.tick(self.clock.now()).await;
                    debug!("Scheduler tick spawned {} deliveries", outcome.dispatched());
                }
            }
        }

        info!("Medication scheduler stopped");
    }
}
