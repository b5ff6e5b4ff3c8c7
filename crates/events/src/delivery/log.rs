//! Notifier that only writes a structured log line.

use async_trait::async_trait;
use tokenward_core::notify::{AddressChangeNotice, Notifier, NotifyError};

/// Used when no SMTP relay is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        destination: &str,
        notice: &AddressChangeNotice,
    ) -> Result<(), NotifyError> {
        tracing::warn!(
            destination,
            subject = %notice.subject,
            session_id = %notice.session_id,
            bound_address = %notice.bound_address,
            request_address = %notice.request_address,
            "Refresh from new address (email delivery not configured)"
        );
        Ok(())
    }
}
