use std::sync::Arc;

use brokerdesk_core::RecordId;
use brokerdesk_domain::{News, NewsDraft, Notification, Role};

use crate::test_support::{InMemorySource, RecordingChanges, StubDirectory};
use crate::{NewsLink, NewsService, NotificationService, PermissionService, ResourceService};

struct Fixture {
    directory: StubDirectory,
    notifications: Arc<InMemorySource<Notification>>,
    service: NewsService,
}

fn fixture() -> Fixture {
    let directory = StubDirectory::with_role(Role::Admin);
    let changes = Arc::new(RecordingChanges::default());
    let notifications = Arc::new(InMemorySource::default());
    let news: Arc<InMemorySource<News>> = Arc::new(InMemorySource::default());
    let service = NewsService::new(
        ResourceService::new(
            news,
            PermissionService::new(Arc::new(directory.clone())),
            changes.clone(),
        ),
        NotificationService::new(notifications.clone(), changes),
        Arc::new(directory.clone()),
    );
    Fixture {
        directory,
        notifications,
        service,
    }
}

fn draft(title: &str, company_id: Option<RecordId>) -> NewsDraft {
    NewsDraft {
        title: title.to_owned(),
        content: "<p>Contenido</p>".to_owned(),
        company_ids: company_id.into_iter().collect(),
        ..NewsDraft::default()
    }
}

#[tokio::test]
async fn first_publication_notifies_other_users_once() {
    let fixture = fixture();
    let reader = fixture
        .directory
        .add_user("Lectora", "lectora@correduria.es", Role::User)
        .await;
    let actor = fixture.directory.identity();

    let created = fixture.service.create(&actor, draft("Campaña verano", None)).await;
    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert!(fixture.notifications.snapshot().await.is_empty());

    let published = fixture.service.publish(&actor, created.id).await;
    assert!(published.is_ok());
    assert!(published.map(|news| news.published_at.is_some()).unwrap_or_default());
    assert!(fixture.service.publish(&actor, created.id).await.is_ok());

    let sent = fixture.notifications.snapshot().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id, reader.id);
    assert_eq!(sent[0].url, Some(format!("/news/{}", created.id)));
}

#[tokio::test]
async fn published_for_filters_by_link_and_state() {
    let fixture = fixture();
    let actor = fixture.directory.identity();
    let company_id = RecordId::new();

    let linked = fixture
        .service
        .create(&actor, draft("Nueva póliza", Some(company_id)))
        .await
        .unwrap_or_else(|_| unreachable!());
    let unlinked = fixture
        .service
        .create(&actor, draft("Otra", None))
        .await
        .unwrap_or_else(|_| unreachable!());
    let draft_only = fixture
        .service
        .create(&actor, draft("Borrador", Some(company_id)))
        .await
        .unwrap_or_else(|_| unreachable!());

    for id in [linked.id, unlinked.id] {
        assert!(fixture.service.publish(&actor, id).await.is_ok());
    }

    let filtered = fixture
        .service
        .published_for(&actor, NewsLink::Company(company_id))
        .await
        .unwrap_or_default();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].id, linked.id);
    assert!(filtered.iter().all(|news| news.id != draft_only.id));

    let withdrawn = fixture.service.unpublish(&actor, linked.id).await;
    assert!(withdrawn.is_ok());
    assert_eq!(withdrawn.map(|news| news.published_at).unwrap_or_default(), None);
}
