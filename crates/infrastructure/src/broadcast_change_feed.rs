use brokerdesk_application::{ChangeEvent, ChangePublisher};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 256;

/// In-process live feed of write events.
///
/// Subscribers that fall behind by more than the channel capacity lose the
/// oldest events and are expected to refetch.
#[derive(Debug, Clone)]
pub struct BroadcastChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastChangeFeed {
    /// Creates a feed keeping up to `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribes to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangePublisher for BroadcastChangeFeed {
    fn publish(&self, event: ChangeEvent) {
        // No receivers is not an error: nobody is listening yet.
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::debug!(receivers, "change event published");
    }
}
