//! Delivery channels for security notifications.
//!
//! Each channel implements [`tokenward_core::notify::Notifier`]. The API
//! server picks [`delivery::email::EmailNotifier`] when SMTP is configured
//! and falls back to [`delivery::log::LogNotifier`] otherwise.

pub mod delivery;

pub use delivery::email::{EmailConfig, EmailNotifier};
pub use delivery::log::LogNotifier;
