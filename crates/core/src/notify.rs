//! Out-of-band notification sink.
//!
//! The token protocol fires an [`AddressChangeNotice`] when a refresh comes
//! from an address other than the one the session was issued to. Delivery is
//! best-effort: its outcome never affects the refresh result.

use async_trait::async_trait;

use crate::types::Timestamp;

/// A refresh was accepted from an address that differs from the session's
/// bound address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressChangeNotice {
    /// Subject (user id) of the refreshed credential.
    pub subject: String,
    /// The session that was rotated.
    pub session_id: String,
    /// Address recorded when the session was issued.
    pub bound_address: String,
    /// Address the refresh request came from.
    pub request_address: String,
    pub occurred_at: Timestamp,
}

impl AddressChangeNotice {
    /// Plain-text message body shared by every delivery channel.
    pub fn message(&self) -> String {
        format!(
            "Hey user {}, someone accessed your account from a new IP address.\n\
             Previous address: {}\nNew address: {}\nTime: {}",
            self.subject, self.bound_address, self.request_address, self.occurred_at
        )
    }
}

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid destination: {0}")]
    Destination(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// A channel that can deliver a one-shot notice to a destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, destination: &str, notice: &AddressChangeNotice)
        -> Result<(), NotifyError>;
}
