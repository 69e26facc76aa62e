//! Medication reminder scheduling.
//!
//! A single [`SchedulerDriver`] ticks on a fixed interval. Each tick the
//! [`Dispatcher`] asks the [`ReminderQuery`] for due items and spawns one
//! independent delivery task per item: resolve the owner's device token, push
//! the notification, flip the notified flag. Failures stay inside their task and
//! are retried on a later tick simply because the flag was never set.
//!
//! Delivery is at-least-once. A push that succeeds followed by a failed flag
//! update is sent again on the next tick.

pub mod delivery;
pub mod dispatcher;
pub mod driver;
pub mod due;
pub mod notifier;

pub use delivery::{DeliveryContext, DeliveryError, DeliveryOutcome};
pub use dispatcher::{Dispatcher, DispatcherConfig, TickOutcome, TickPhase};
pub use driver::{Clock, SchedulerDriver, SystemClock};
pub use due::ReminderQuery;
pub use notifier::{HttpPushNotifier, LogNotifier, Notifier, NotifyError};
