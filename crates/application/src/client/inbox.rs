use std::sync::Arc;

use brokerdesk_core::{AppResult, TenantId};
use brokerdesk_domain::{Notification, Resource};

use crate::{ChangeEvent, ChangeKind, DataSource};

use super::{QueryCache, QuerySnapshot};

/// Cached notification list of the signed-in user, fed by the live channel.
pub struct NotificationInbox {
    source: Arc<dyn DataSource<Notification>>,
    tenant_id: TenantId,
    cache: QueryCache<Vec<Notification>>,
}

impl NotificationInbox {
    /// Creates an inbox over a data source that lists the user's notifications.
    #[must_use]
    pub fn new(source: Arc<dyn DataSource<Notification>>, tenant_id: TenantId) -> Self {
        Self {
            source,
            tenant_id,
            cache: QueryCache::new(Notification::KIND.collection()),
        }
    }

    /// Returns the read state, fetching when stale.
    pub async fn query(&self) -> QuerySnapshot<Vec<Notification>> {
        if self.cache.is_stale().await {
            let _ = self.refetch().await;
        }
        self.cache.snapshot().await
    }

    /// Fetches the list again.
    pub async fn refetch(&self) -> AppResult<Vec<Notification>> {
        let source = Arc::clone(&self.source);
        let tenant_id = self.tenant_id;
        self.cache
            .fetch(|| async move {
                let mut notifications = source.list(tenant_id).await?;
                sort_newest_first(&mut notifications);
                Ok(notifications)
            })
            .await
    }

    /// Splices a pushed notification into the cached list.
    ///
    /// A notification already cached is replaced, not duplicated.
    pub async fn apply(&self, notification: Notification) {
        let spliced = self
            .cache
            .update(|notifications| {
                notifications.retain(|cached| cached.id != notification.id);
                notifications.push(notification.clone());
                sort_newest_first(notifications);
            })
            .await;
        if spliced.is_none() {
            self.cache.set(vec![notification]).await;
        }
    }

    /// Applies a live change event for notifications.
    pub async fn apply_change(&self, event: &ChangeEvent) {
        if event.tenant_id != self.tenant_id {
            return;
        }

        match event.change {
            ChangeKind::Inserted | ChangeKind::Updated => {
                if let Some(notification) = event.decode::<Notification>() {
                    self.apply(notification).await;
                }
            }
            ChangeKind::Deleted if event.resource == Notification::KIND => {
                self.cache
                    .update(|notifications| notifications.retain(|cached| cached.id != event.id))
                    .await;
            }
            ChangeKind::Deleted => {}
        }
    }

    /// Counts unread cached notifications.
    pub async fn unread_count(&self) -> usize {
        self.cache
            .snapshot()
            .await
            .data
            .map(|notifications| notifications.iter().filter(|cached| !cached.read).count())
            .unwrap_or_default()
    }
}

fn sort_newest_first(notifications: &mut [Notification]) {
    notifications.sort_by(|left, right| right.created_at.cmp(&left.created_at));
}
