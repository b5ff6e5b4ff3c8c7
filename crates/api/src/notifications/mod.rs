//! Detached delivery of address-change notices.
//!
//! [`NotificationDispatcher`] spawns each delivery on a [`TaskTracker`] so the
//! refresh response never waits on the notifier, while shutdown can still
//! wait (bounded) for deliveries already in flight.

use std::sync::Arc;
use std::time::Duration;

use tokenward_core::notify::{AddressChangeNotice, Notifier};
use tokio_util::task::TaskTracker;

/// Fire-and-forget dispatcher owned by the application state.
///
/// Cheap to clone: clones share the same notifier and task tracker.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    destination: Arc<str>,
    tracker: TaskTracker,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, destination: impl Into<String>) -> Self {
        Self {
            notifier,
            destination: Arc::from(destination.into()),
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn delivery of `notice` and return immediately.
    ///
    /// Delivery errors are logged and otherwise dropped.
    pub fn dispatch(&self, notice: AddressChangeNotice) {
        let notifier = Arc::clone(&self.notifier);
        let destination = Arc::clone(&self.destination);

        self.tracker.spawn(async move {
            match notifier.notify(&destination, &notice).await {
                Ok(()) => tracing::debug!(
                    session_id = %notice.session_id,
                    "Address change notification delivered"
                ),
                Err(e) => tracing::warn!(
                    error = %e,
                    session_id = %notice.session_id,
                    "Address change notification failed"
                ),
            }
        });
    }

    /// Number of deliveries still running.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Close the tracker and wait up to `timeout` for in-flight deliveries.
    /// Returns `false` if the timeout elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let pending = self.tracker.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for in-flight notifications");
        }

        match tokio::time::timeout(timeout, self.tracker.wait()).await {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(
                    pending = self.tracker.len(),
                    timeout_secs = timeout.as_secs(),
                    "Notification drain timed out"
                );
                false
            }
        }
    }
}
