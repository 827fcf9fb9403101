use std::sync::Arc;

use brokerdesk_application::{ContactRelay, ContactService};
use brokerdesk_infrastructure::{ConsoleContactRelay, HttpContactRelay};

use crate::api_config::{ApiConfig, ContactRelayConfig};

pub fn build_contact_service(config: &ApiConfig) -> ContactService {
    let relay: Arc<dyn ContactRelay> = match &config.contact_relay {
        ContactRelayConfig::Console => Arc::new(ConsoleContactRelay::new()),
        ContactRelayConfig::Http(relay) => Arc::new(HttpContactRelay::new(
            reqwest::Client::new(),
            relay.url.clone(),
            relay.token.clone(),
            relay.recipient.clone(),
        )),
    };

    ContactService::new(relay)
}
