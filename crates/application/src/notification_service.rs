use std::sync::Arc;

use brokerdesk_core::{AppError, AppResult, RecordId, TenantId, UserIdentity};
use brokerdesk_domain::{Notification, NotificationDraft, NotificationPatch, Resource};

use crate::{ChangeEvent, ChangeKind, ChangePublisher, DataSource};

/// Per-user notifications and their live channel.
#[derive(Clone)]
pub struct NotificationService {
    source: Arc<dyn DataSource<Notification>>,
    changes: Arc<dyn ChangePublisher>,
}

impl NotificationService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        source: Arc<dyn DataSource<Notification>>,
        changes: Arc<dyn ChangePublisher>,
    ) -> Self {
        Self { source, changes }
    }

    /// Lists the actor's notifications, newest first.
    pub async fn list_for_actor(&self, actor: &UserIdentity) -> AppResult<Vec<Notification>> {
        let user_id = actor.record_id()?;
        let mut notifications: Vec<Notification> = self
            .source
            .list(actor.tenant_id())
            .await?
            .into_iter()
            .filter(|notification| notification.user_id == user_id)
            .collect();
        notifications.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(notifications)
    }

    /// Counts the actor's unread notifications.
    pub async fn unread_count(&self, actor: &UserIdentity) -> AppResult<usize> {
        Ok(self
            .list_for_actor(actor)
            .await?
            .iter()
            .filter(|notification| !notification.read)
            .count())
    }

    /// Marks one of the actor's notifications as read.
    pub async fn mark_read(&self, actor: &UserIdentity, id: RecordId) -> AppResult<Notification> {
        let user_id = actor.record_id()?;
        let owned = self
            .source
            .find(actor.tenant_id(), id)
            .await?
            .filter(|notification| notification.user_id == user_id);
        if owned.is_none() {
            return Err(AppError::NotFound(format!(
                "notification '{id}' does not exist"
            )));
        }

        self.write_read(actor.tenant_id(), id).await
    }

    /// Marks every unread notification of the actor as read.
    pub async fn mark_all_read(&self, actor: &UserIdentity) -> AppResult<usize> {
        let unread: Vec<RecordId> = self
            .list_for_actor(actor)
            .await?
            .into_iter()
            .filter(|notification| !notification.read)
            .map(|notification| notification.id)
            .collect();

        for id in &unread {
            self.write_read(actor.tenant_id(), *id).await?;
        }
        Ok(unread.len())
    }

    /// Stores a notification and pushes it on the live channel.
    pub async fn notify(
        &self,
        tenant_id: TenantId,
        draft: NotificationDraft,
    ) -> AppResult<Notification> {
        Notification::validate_draft(&draft)?;
        let notification = self.source.create(tenant_id, draft).await?;
        tracing::debug!(id = %notification.id, user_id = %notification.user_id, "notification sent");
        self.changes.publish(ChangeEvent::for_record(
            tenant_id,
            ChangeKind::Inserted,
            &notification,
        ));
        Ok(notification)
    }

    async fn write_read(&self, tenant_id: TenantId, id: RecordId) -> AppResult<Notification> {
        let notification = self
            .source
            .update(tenant_id, id, NotificationPatch { read: Some(true) })
            .await?;
        self.changes.publish(ChangeEvent::for_record(
            tenant_id,
            ChangeKind::Updated,
            &notification,
        ));
        Ok(notification)
    }
}

#[cfg(test)]
mod tests;
