use std::sync::Arc;

use brokerdesk_core::{AppError, RecordId, UserIdentity};
use brokerdesk_domain::{ProductCategory, ProductCategoryDraft, ProductCategoryPatch, Role};

use crate::test_support::{InMemorySource, StubDirectory};
use crate::{CategoryService, DiscardChanges, PermissionService, ResourceService};

struct Fixture {
    service: CategoryService,
    source: Arc<InMemorySource<ProductCategory>>,
    actor: UserIdentity,
}

fn fixture() -> Fixture {
    let directory = StubDirectory::with_role(Role::Admin);
    let source = Arc::new(InMemorySource::default());
    let service = CategoryService::new(ResourceService::new(
        source.clone(),
        PermissionService::new(Arc::new(directory.clone())),
        Arc::new(DiscardChanges),
    ));
    Fixture {
        service,
        source,
        actor: directory.identity(),
    }
}

impl Fixture {
    async fn create(&self, name: &str, parent_id: Option<RecordId>) -> ProductCategory {
        let created = self
            .service
            .create(
                &self.actor,
                ProductCategoryDraft {
                    name: name.to_owned(),
                    description: None,
                    parent_id,
                    level: 42,
                },
            )
            .await;
        assert!(created.is_ok());
        created.unwrap_or_else(|_| unreachable!())
    }

    async fn level_of(&self, id: RecordId) -> Option<i32> {
        self.source
            .snapshot()
            .await
            .into_iter()
            .find(|category| category.id == id)
            .map(|category| category.level)
    }
}

#[tokio::test]
async fn levels_follow_the_parent_chain() {
    let fixture = fixture();
    let root = fixture.create("Seguros", None).await;
    let child = fixture.create("Hogar", Some(root.id)).await;
    let grandchild = fixture.create("Alquiler", Some(child.id)).await;

    assert_eq!(root.level, 1);
    assert_eq!(child.level, 2);
    assert_eq!(grandchild.level, 3);
}

#[tokio::test]
async fn moving_a_category_relevels_its_subtree() {
    let fixture = fixture();
    let first = fixture.create("Particulares", None).await;
    let second = fixture.create("Empresas", None).await;
    let child = fixture.create("Hogar", Some(first.id)).await;
    let grandchild = fixture.create("Alquiler", Some(child.id)).await;

    let moved = fixture
        .service
        .update(
            &fixture.actor,
            first.id,
            ProductCategoryPatch {
                parent_id: Some(Some(second.id)),
                ..ProductCategoryPatch::default()
            },
        )
        .await;
    assert!(moved.is_ok());

    assert_eq!(fixture.level_of(first.id).await, Some(2));
    assert_eq!(fixture.level_of(child.id).await, Some(3));
    assert_eq!(fixture.level_of(grandchild.id).await, Some(4));
}

#[tokio::test]
async fn a_category_cannot_move_below_itself_or_a_descendant() {
    let fixture = fixture();
    let root = fixture.create("Seguros", None).await;
    let child = fixture.create("Vida", Some(root.id)).await;

    for parent in [root.id, child.id] {
        let result = fixture
            .service
            .update(
                &fixture.actor,
                root.id,
                ProductCategoryPatch {
                    parent_id: Some(Some(parent)),
                    ..ProductCategoryPatch::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
    assert_eq!(fixture.level_of(root.id).await, Some(1));
}

#[tokio::test]
async fn selectable_parents_exclude_self_and_descendants() {
    let fixture = fixture();
    let root = fixture.create("Seguros", None).await;
    let child = fixture.create("Vida", Some(root.id)).await;
    let other = fixture.create("Salud", None).await;

    let parents = fixture
        .service
        .selectable_parents(&fixture.actor, Some(root.id))
        .await;
    assert!(parents.is_ok());
    let ids: Vec<RecordId> = parents
        .unwrap_or_default()
        .into_iter()
        .map(|category| category.id)
        .collect();

    assert_eq!(ids, vec![other.id]);
    assert!(!ids.contains(&child.id));
}

#[tokio::test]
async fn deleting_a_category_lifts_its_children() {
    let fixture = fixture();
    let root = fixture.create("Seguros", None).await;
    let middle = fixture.create("Vida", Some(root.id)).await;
    let leaf = fixture.create("Riesgo", Some(middle.id)).await;

    assert!(fixture.service.delete(&fixture.actor, middle.id).await.is_ok());

    let remaining = fixture.source.snapshot().await;
    let leaf = remaining.iter().find(|category| category.id == leaf.id);
    assert_eq!(leaf.map(|category| category.parent_id), Some(Some(root.id)));
    assert_eq!(leaf.map(|category| category.level), Some(2));
}

#[tokio::test]
async fn unknown_parent_is_not_found() {
    let fixture = fixture();
    let result = fixture
        .service
        .create(
            &fixture.actor,
            ProductCategoryDraft {
                name: "Huérfana".to_owned(),
                description: None,
                parent_id: Some(RecordId::new()),
                level: 1,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(fixture.source.snapshot().await.is_empty());
}
