use std::sync::Arc;

use brokerdesk_core::{AppResult, RecordId, UserIdentity};
use brokerdesk_domain::{News, NewsDraft, NewsPatch, NotificationDraft};

use crate::{NotificationService, ResourceService, UserDirectory};

/// Link a news filter matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsLink {
    /// Linked insurer.
    Company(RecordId),
    /// Linked product category.
    Category(RecordId),
    /// Linked product.
    Product(RecordId),
}

/// News articles, their publication and reader notifications.
#[derive(Clone)]
pub struct NewsService {
    news: ResourceService<News>,
    notifications: NotificationService,
    directory: Arc<dyn UserDirectory>,
}

impl NewsService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        news: ResourceService<News>,
        notifications: NotificationService,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        Self {
            news,
            notifications,
            directory,
        }
    }

    /// Returns the underlying CRUD service.
    #[must_use]
    pub fn resources(&self) -> &ResourceService<News> {
        &self.news
    }

    /// Lists every article, drafts included, newest first.
    pub async fn list(&self, actor: &UserIdentity) -> AppResult<Vec<News>> {
        let mut news = self.news.list(actor).await?;
        news.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(news)
    }

    /// Creates an article and notifies readers when it starts published.
    pub async fn create(&self, actor: &UserIdentity, draft: NewsDraft) -> AppResult<News> {
        let news = self.news.create(actor, draft).await?;
        if news.published {
            self.announce(actor, &news).await?;
        }
        Ok(news)
    }

    /// Publishes an article. Readers are notified on the first publication.
    pub async fn publish(&self, actor: &UserIdentity, id: RecordId) -> AppResult<News> {
        let current = self.news.find(actor, id).await?;
        let news = self
            .news
            .update(
                actor,
                id,
                NewsPatch {
                    published: Some(true),
                    ..NewsPatch::default()
                },
            )
            .await?;

        if !current.published {
            self.announce(actor, &news).await?;
        }
        Ok(news)
    }

    /// Withdraws an article from readers.
    pub async fn unpublish(&self, actor: &UserIdentity, id: RecordId) -> AppResult<News> {
        self.news
            .update(
                actor,
                id,
                NewsPatch {
                    published: Some(false),
                    ..NewsPatch::default()
                },
            )
            .await
    }

    /// Lists published articles, newest publication first.
    pub async fn published(&self, actor: &UserIdentity) -> AppResult<Vec<News>> {
        let mut news: Vec<News> = self
            .news
            .list(actor)
            .await?
            .into_iter()
            .filter(|news| news.published)
            .collect();
        news.sort_by(|left, right| right.published_at.cmp(&left.published_at));
        Ok(news)
    }

    /// Lists published articles linked to a company, category or product.
    pub async fn published_for(&self, actor: &UserIdentity, link: NewsLink) -> AppResult<Vec<News>> {
        Ok(self
            .published(actor)
            .await?
            .into_iter()
            .filter(|news| match link {
                NewsLink::Company(id) => news.company_ids.contains(&id),
                NewsLink::Category(id) => news.category_ids.contains(&id),
                NewsLink::Product(id) => news.product_ids.contains(&id),
            })
            .collect())
    }

    async fn announce(&self, actor: &UserIdentity, news: &News) -> AppResult<()> {
        let readers = self.directory.list_profiles(actor.tenant_id()).await?;
        for reader in readers
            .into_iter()
            .filter(|reader| reader.id.to_string() != actor.subject())
        {
            self.notifications
                .notify(
                    actor.tenant_id(),
                    NotificationDraft {
                        user_id: reader.id,
                        title: "Nueva noticia publicada".to_owned(),
                        description: news.title.clone(),
                        url: Some(format!("/news/{}", news.id)),
                    },
                )
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
