use async_trait::async_trait;
use brokerdesk_application::{ContactMessage, ContactRelay};
use brokerdesk_core::{AppError, AppResult};
use serde::Serialize;

/// Relays contact submissions to a transactional mail endpoint.
#[derive(Clone)]
pub struct HttpContactRelay {
    client: reqwest::Client,
    endpoint: String,
    token: String,
    recipient: String,
}

impl HttpContactRelay {
    /// Creates a relay posting to `endpoint` with a bearer `token`.
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        token: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            recipient: recipient.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayPayload<'a> {
    to: &'a str,
    reply_to: &'a str,
    subject: String,
    text: String,
}

impl<'a> RelayPayload<'a> {
    fn build(recipient: &'a str, message: &'a ContactMessage) -> Self {
        let mut text = format!("Nombre: {}\nEmail: {}\n", message.name, message.email);
        if let Some(company) = message.company.as_deref() {
            text.push_str(&format!("Empresa: {company}\n"));
        }
        if let Some(phone) = message.phone.as_deref() {
            text.push_str(&format!("Teléfono: {phone}\n"));
        }
        text.push('\n');
        text.push_str(&message.message);

        Self {
            to: recipient,
            reply_to: message.email.as_str(),
            subject: format!("Nuevo contacto de {}", message.name),
            text,
        }
    }
}

#[async_trait]
impl ContactRelay for HttpContactRelay {
    async fn relay(&self, message: &ContactMessage) -> AppResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&RelayPayload::build(&self.recipient, message))
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("contact relay request failed: {error}")))?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "contact relay returned status {}",
                response.status()
            )));
        }

        tracing::info!(reply_to = %message.email, "contact message relayed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use brokerdesk_application::ContactMessage;

    use super::RelayPayload;

    #[test]
    fn payload_lists_optional_fields_only_when_present() {
        let message = ContactMessage {
            name: "Lucía Gómez".to_owned(),
            email: "lucia@example.com".to_owned(),
            company: Some("Seguros Norte".to_owned()),
            phone: None,
            message: "Quiero una demo.".to_owned(),
        };
        let payload = RelayPayload::build("ventas@correduria.es", &message);

        assert_eq!(payload.to, "ventas@correduria.es");
        assert_eq!(payload.reply_to, "lucia@example.com");
        assert_eq!(payload.subject, "Nuevo contacto de Lucía Gómez");
        assert!(payload.text.contains("Empresa: Seguros Norte"));
        assert!(!payload.text.contains("Teléfono"));
        assert!(payload.text.ends_with("Quiero una demo."));
    }
}
