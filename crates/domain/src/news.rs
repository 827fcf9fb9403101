use brokerdesk_core::patch::{apply, apply_nullable, double_option};
use brokerdesk_core::{AppResult, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{require_patch_text, require_text, trim_optional};
use crate::{Resource, ResourceKind};

/// News article, optionally linked to companies, categories and products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    /// Record id.
    pub id: RecordId,
    /// Headline.
    pub title: String,
    /// Rich-text body.
    pub content: String,
    /// Optional featured image.
    pub image_url: Option<String>,
    /// Visible to readers.
    pub published: bool,
    /// Set while published.
    pub published_at: Option<DateTime<Utc>>,
    /// Linked insurers.
    #[serde(default)]
    pub company_ids: Vec<RecordId>,
    /// Linked product categories.
    #[serde(default)]
    pub category_ids: Vec<RecordId>,
    /// Linked products.
    #[serde(default)]
    pub product_ids: Vec<RecordId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl News {
    /// Sets the published flag, stamping or clearing the publish time.
    pub fn set_published(&mut self, published: bool, now: DateTime<Utc>) {
        match (self.published, published) {
            (false, true) => self.published_at = Some(now),
            (_, false) => self.published_at = None,
            (true, true) => {}
        }
        self.published = published;
    }

    /// Returns whether the article is linked to the record in any join.
    #[must_use]
    pub fn mentions(&self, id: RecordId) -> bool {
        self.company_ids.contains(&id)
            || self.category_ids.contains(&id)
            || self.product_ids.contains(&id)
    }
}

/// Fields supplied when creating a news article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub company_ids: Vec<RecordId>,
    pub category_ids: Vec<RecordId>,
    pub product_ids: Vec<RecordId>,
}

/// Fields changed by a news update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct NewsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_ids: Option<Vec<RecordId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<RecordId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_ids: Option<Vec<RecordId>>,
}

fn dedup(ids: Vec<RecordId>) -> Vec<RecordId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    unique
}

impl Resource for News {
    type Draft = NewsDraft;
    type Patch = NewsPatch;

    const KIND: ResourceKind = ResourceKind::News;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_draft(id: RecordId, draft: Self::Draft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_owned(),
            content: draft.content,
            image_url: trim_optional(draft.image_url),
            published: draft.published,
            published_at: draft.published.then_some(now),
            company_ids: dedup(draft.company_ids),
            category_ids: dedup(draft.category_ids),
            product_ids: dedup(draft.product_ids),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
        apply(&mut self.title, &patch.title);
        apply(&mut self.content, &patch.content);
        apply_nullable(&mut self.image_url, &patch.image_url);
        if let Some(published) = patch.published {
            self.set_published(published, now);
        }
        if let Some(ids) = &patch.company_ids {
            self.company_ids = dedup(ids.clone());
        }
        if let Some(ids) = &patch.category_ids {
            self.category_ids = dedup(ids.clone());
        }
        if let Some(ids) = &patch.product_ids {
            self.product_ids = dedup(ids.clone());
        }
        self.updated_at = now;
    }

    fn validate_draft(draft: &Self::Draft) -> AppResult<()> {
        require_text("title", &draft.title)
    }

    fn validate_patch(patch: &Self::Patch) -> AppResult<()> {
        require_patch_text("title", &patch.title)
    }
}

#[cfg(test)]
mod tests {
    use brokerdesk_core::RecordId;
    use chrono::{Duration, Utc};

    use super::{News, NewsDraft, NewsPatch};
    use crate::Resource;

    #[test]
    fn publishing_stamps_time_once_and_unpublishing_clears_it() {
        let created = Utc::now();
        let mut news = News::from_draft(
            RecordId::new(),
            NewsDraft {
                title: "Nueva tarifa hogar".to_owned(),
                ..NewsDraft::default()
            },
            created,
        );
        assert_eq!(news.published_at, None);

        let first = created + Duration::minutes(5);
        news.set_published(true, first);
        news.set_published(true, first + Duration::minutes(5));
        assert_eq!(news.published_at, Some(first));

        news.apply_patch(
            &NewsPatch {
                published: Some(false),
                ..NewsPatch::default()
            },
            first + Duration::minutes(10),
        );
        assert!(!news.published);
        assert_eq!(news.published_at, None);
    }

    #[test]
    fn join_ids_are_deduplicated_in_order() {
        let company = RecordId::new();
        let other = RecordId::new();
        let news = News::from_draft(
            RecordId::new(),
            NewsDraft {
                title: "Convenio".to_owned(),
                company_ids: vec![company, other, company],
                ..NewsDraft::default()
            },
            Utc::now(),
        );

        assert_eq!(news.company_ids, vec![company, other]);
        assert!(news.mentions(other));
    }
}
