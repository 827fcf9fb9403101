//! Development contact relay. Writes submissions to the tracing output.

use async_trait::async_trait;
use brokerdesk_application::{ContactMessage, ContactRelay};
use brokerdesk_core::AppResult;
use tracing::info;

/// Contact relay that only logs.
#[derive(Clone, Default)]
pub struct ConsoleContactRelay;

impl ConsoleContactRelay {
    /// Creates a console relay.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContactRelay for ConsoleContactRelay {
    async fn relay(&self, message: &ContactMessage) -> AppResult<()> {
        info!(
            name = %message.name,
            email = %message.email,
            company = message.company.as_deref().unwrap_or("-"),
            phone = message.phone.as_deref().unwrap_or("-"),
            "--- CONTACT (console) ---\n{}\n--- END CONTACT ---",
            message.message
        );

        Ok(())
    }
}
