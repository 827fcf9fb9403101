use std::sync::Arc;

use brokerdesk_core::{AppError, RecordId};
use brokerdesk_domain::{Notification, NotificationDraft, Role};

use crate::test_support::{InMemorySource, RecordingChanges, StubDirectory};
use crate::{ChangeKind, NotificationService};

fn draft(user_id: RecordId, title: &str) -> NotificationDraft {
    NotificationDraft {
        user_id,
        title: title.to_owned(),
        description: String::new(),
        url: None,
    }
}

#[tokio::test]
async fn notify_stores_and_pushes_on_the_live_channel() {
    let directory = StubDirectory::with_role(Role::User);
    let changes = Arc::new(RecordingChanges::default());
    let service = NotificationService::new(Arc::new(InMemorySource::default()), changes.clone());
    let actor = directory.identity();
    let user_id: RecordId = actor.subject().parse().unwrap_or_default();

    let sent = service.notify(actor.tenant_id(), draft(user_id, "Bienvenida")).await;
    assert!(sent.is_ok());

    let events = changes.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].change, ChangeKind::Inserted);
    let pushed: Option<Notification> = events[0].decode();
    assert_eq!(pushed.map(|notification| notification.title), Some("Bienvenida".to_owned()));
}

#[tokio::test]
async fn users_only_see_and_mark_their_own_notifications() {
    let directory = StubDirectory::with_role(Role::User);
    let service = NotificationService::new(
        Arc::new(InMemorySource::default()),
        Arc::new(RecordingChanges::default()),
    );
    let actor = directory.identity();
    let user_id: RecordId = actor.subject().parse().unwrap_or_default();
    let tenant_id = actor.tenant_id();

    let mine = service
        .notify(tenant_id, draft(user_id, "Mía"))
        .await
        .unwrap_or_else(|_| unreachable!());
    let theirs = service
        .notify(tenant_id, draft(RecordId::new(), "Ajena"))
        .await
        .unwrap_or_else(|_| unreachable!());
    assert!(service.notify(tenant_id, draft(user_id, "Otra")).await.is_ok());

    let listed = service.list_for_actor(&actor).await.unwrap_or_default();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|notification| notification.user_id == user_id));

    let foreign = service.mark_read(&actor, theirs.id).await;
    assert!(matches!(foreign, Err(AppError::NotFound(_))));

    assert!(service.mark_read(&actor, mine.id).await.is_ok());
    assert_eq!(service.unread_count(&actor).await.unwrap_or_default(), 1);
    assert_eq!(service.mark_all_read(&actor).await.unwrap_or_default(), 1);
    assert_eq!(service.unread_count(&actor).await.unwrap_or_default(), 0);
}
