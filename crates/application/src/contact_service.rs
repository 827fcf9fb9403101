use std::sync::Arc;

use brokerdesk_core::{AppError, AppResult};
use brokerdesk_domain::EmailAddress;

use crate::{ContactMessage, ContactRelay};

const MESSAGE_MAX_LENGTH: usize = 5_000;

/// Public marketing contact form.
#[derive(Clone)]
pub struct ContactService {
    relay: Arc<dyn ContactRelay>,
}

impl ContactService {
    /// Creates the service.
    #[must_use]
    pub fn new(relay: Arc<dyn ContactRelay>) -> Self {
        Self { relay }
    }

    /// Validates a submission and hands it to the relay.
    pub async fn submit(&self, message: ContactMessage) -> AppResult<()> {
        let message = normalize(message)?;
        self.relay.relay(&message).await?;
        tracing::info!(email = %message.email, "contact message relayed");
        Ok(())
    }
}

fn normalize(message: ContactMessage) -> AppResult<ContactMessage> {
    let name = message.name.trim().to_owned();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_owned()));
    }

    let email = EmailAddress::new(message.email)?;

    let body = message.message.trim().to_owned();
    if body.is_empty() {
        return Err(AppError::Validation("message is required".to_owned()));
    }
    if body.chars().count() > MESSAGE_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "message must not exceed {MESSAGE_MAX_LENGTH} characters"
        )));
    }

    let optional = |value: Option<String>| {
        value
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    };

    Ok(ContactMessage {
        name,
        email: email.into(),
        company: optional(message.company),
        phone: optional(message.phone),
        message: body,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use brokerdesk_core::AppResult;
    use tokio::sync::Mutex;

    use super::ContactService;
    use crate::{ContactMessage, ContactRelay};

    #[derive(Default)]
    struct FakeRelay {
        sent: Mutex<Vec<ContactMessage>>,
    }

    #[async_trait]
    impl ContactRelay for FakeRelay {
        async fn relay(&self, message: &ContactMessage) -> AppResult<()> {
            self.sent.lock().await.push(message.clone());
            Ok(())
        }
    }

    fn message(name: &str, email: &str, body: &str) -> ContactMessage {
        ContactMessage {
            name: name.to_owned(),
            email: email.to_owned(),
            company: Some("  ".to_owned()),
            phone: None,
            message: body.to_owned(),
        }
    }

    #[tokio::test]
    async fn valid_message_is_normalized_and_relayed() {
        let relay = Arc::new(FakeRelay::default());
        let service = ContactService::new(relay.clone());

        let result = service
            .submit(message(" Lucía ", "Lucia@Ejemplo.es", "Quiero una demo"))
            .await;
        assert!(result.is_ok());

        let sent = relay.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].name, "Lucía");
        assert_eq!(sent[0].email, "lucia@ejemplo.es");
        assert_eq!(sent[0].company, None);
    }

    #[tokio::test]
    async fn incomplete_messages_never_reach_the_relay() {
        let relay = Arc::new(FakeRelay::default());
        let service = ContactService::new(relay.clone());

        assert!(service.submit(message("", "a@b.es", "Hola")).await.is_err());
        assert!(service.submit(message("Ana", "no-email", "Hola")).await.is_err());
        assert!(service.submit(message("Ana", "a@b.es", "  ")).await.is_err());
        assert!(relay.sent.lock().await.is_empty());
    }
}
