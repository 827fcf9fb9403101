use std::sync::Arc;

use brokerdesk_core::{AppError, AppResult, RecordId, UserIdentity};
use brokerdesk_domain::{
    News, NewsPatch, Product, ProductDocument, ProductPatch, UserProfile, UserProfilePatch,
};

use crate::{Bucket, ObjectStorage, ResourceService, UserService};

/// Largest accepted upload, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// File received from a form upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Original file name.
    pub file_name: String,
    /// MIME type reported by the client.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Stores uploads in buckets and links them to their owning record.
#[derive(Clone)]
pub struct UploadService {
    storage: Arc<dyn ObjectStorage>,
    users: UserService,
    news: ResourceService<News>,
    products: ResourceService<Product>,
}

impl UploadService {
    /// Creates the service.
    #[must_use]
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        users: UserService,
        news: ResourceService<News>,
        products: ResourceService<Product>,
    ) -> Self {
        Self {
            storage,
            users,
            news,
            products,
        }
    }

    /// Replaces the actor's avatar.
    pub async fn upload_avatar(
        &self,
        actor: &UserIdentity,
        upload: Upload,
    ) -> AppResult<UserProfile> {
        require_image(&upload)?;
        let profile = self.users.current(actor).await?;
        let key = object_key(profile.id, &upload.file_name);
        let stored = self.storage.put(Bucket::Avatars, &key, upload.bytes).await?;

        self.users
            .update_current(
                actor,
                UserProfilePatch {
                    avatar_url: Some(stored.public_url),
                    ..UserProfilePatch::default()
                },
            )
            .await
    }

    /// Sets the featured image of a news article.
    pub async fn upload_news_image(
        &self,
        actor: &UserIdentity,
        news_id: RecordId,
        upload: Upload,
    ) -> AppResult<News> {
        require_image(&upload)?;
        self.news
            .require(actor, brokerdesk_domain::Capability::Edit)
            .await?;
        self.news.find(actor, news_id).await?;

        let key = object_key(news_id, &upload.file_name);
        let stored = self.storage.put(Bucket::News, &key, upload.bytes).await?;
        self.news
            .update(
                actor,
                news_id,
                NewsPatch {
                    image_url: Some(Some(stored.public_url)),
                    ..NewsPatch::default()
                },
            )
            .await
    }

    /// Attaches a document to a product.
    pub async fn upload_product_document(
        &self,
        actor: &UserIdentity,
        product_id: RecordId,
        upload: Upload,
    ) -> AppResult<Product> {
        require_size(&upload)?;
        self.products
            .require(actor, brokerdesk_domain::Capability::Edit)
            .await?;
        let product = self.products.find(actor, product_id).await?;

        let size = i64::try_from(upload.bytes.len())
            .map_err(|_| AppError::Validation("file is too large".to_owned()))?;
        let key = object_key(product_id, &upload.file_name);
        let stored = self
            .storage
            .put(Bucket::ProductDocuments, &key, upload.bytes)
            .await?;

        let mut documents = product.documents;
        documents.push(ProductDocument {
            name: upload.file_name,
            url: stored.public_url,
            content_type: upload.content_type,
            size,
        });
        self.products
            .update(
                actor,
                product_id,
                ProductPatch {
                    documents: Some(documents),
                    ..ProductPatch::default()
                },
            )
            .await
    }

    /// Detaches a document from a product and removes the stored file.
    pub async fn remove_product_document(
        &self,
        actor: &UserIdentity,
        product_id: RecordId,
        url: &str,
    ) -> AppResult<Product> {
        let product = self.products.find(actor, product_id).await?;
        let (removed, kept): (Vec<ProductDocument>, Vec<ProductDocument>) = product
            .documents
            .into_iter()
            .partition(|document| document.url == url);
        if removed.is_empty() {
            return Err(AppError::NotFound(format!(
                "product '{product_id}' has no document '{url}'"
            )));
        }

        let updated = self
            .products
            .update(
                actor,
                product_id,
                ProductPatch {
                    documents: Some(kept),
                    ..ProductPatch::default()
                },
            )
            .await?;

        if let Some(key) = url.split("/product-documents/").nth(1) {
            self.storage.remove(Bucket::ProductDocuments, key).await?;
        }
        Ok(updated)
    }
}

fn require_size(upload: &Upload) -> AppResult<()> {
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("file is empty".to_owned()));
    }
    if upload.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(format!(
            "file must not exceed {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    Ok(())
}

fn require_image(upload: &Upload) -> AppResult<()> {
    require_size(upload)?;
    if !upload.content_type.starts_with("image/") {
        return Err(AppError::Validation(format!(
            "'{}' is not an image",
            upload.file_name
        )));
    }
    Ok(())
}

/// Builds a collision-free object key under the owner's folder.
fn object_key(owner: RecordId, file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .map(|character| {
            if character.is_ascii_alphanumeric() || matches!(character, '.' | '-' | '_') {
                character.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let sanitized = sanitized.trim_matches('-');
    let name = if sanitized.is_empty() { "file" } else { sanitized };

    format!("{owner}/{}-{name}", RecordId::new())
}

#[cfg(test)]
mod tests {
    use brokerdesk_core::RecordId;

    use super::object_key;

    #[test]
    fn object_keys_are_scoped_and_sanitized() {
        let owner = RecordId::new();
        let key = object_key(owner, "Póliza Hogar 2024.PDF");

        assert!(key.starts_with(&format!("{owner}/")));
        assert!(key.ends_with("-p-liza-hogar-2024.pdf"));
        assert_ne!(key, object_key(owner, "Póliza Hogar 2024.PDF"));
    }
}
