use std::marker::PhantomData;

use async_trait::async_trait;
use brokerdesk_application::DataSource;
use brokerdesk_core::{AppError, AppResult, RecordId, TenantId};
use brokerdesk_domain::Resource;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

/// Data source calling the REST API of a running server.
///
/// The server scopes every call to the tenant of the session cookie held by
/// the client, so the tenant argument is not sent.
pub struct HttpDataSource<T> {
    client: reqwest::Client,
    endpoint: Url,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for HttpDataSource<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            marker: PhantomData,
        }
    }
}

impl<T: Resource> HttpDataSource<T> {
    /// Creates a source for the kind's collection route under `api_base`
    /// (for example `http://localhost:3001/api/` or `.../api/demo/`).
    pub fn new(client: reqwest::Client, api_base: &Url) -> AppResult<Self> {
        Self::with_path(client, api_base, &T::KIND.collection().replace('_', "-"))
    }

    /// Creates a source for an explicit collection route.
    pub fn with_path(client: reqwest::Client, api_base: &Url, path: &str) -> AppResult<Self> {
        let endpoint = join(api_base, &format!("{}/", path.trim_matches('/')))?;
        Ok(Self {
            client,
            endpoint,
            marker: PhantomData,
        })
    }

    fn item_url(&self, id: RecordId) -> AppResult<Url> {
        join(&self.endpoint, &id.to_string())
    }
}

fn join(base: &Url, path: &str) -> AppResult<Url> {
    base.join(path).map_err(|error| {
        AppError::Validation(format!("invalid API route '{path}' under '{base}': {error}"))
    })
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a non-success response back onto the error it was rendered from.
pub(crate) async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let message = response
        .json::<ErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.to_string());

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

async fn send(request: reqwest::RequestBuilder) -> AppResult<Response> {
    let response = request
        .send()
        .await
        .map_err(|error| AppError::Internal(format!("API request failed: {error}")))?;

    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

async fn decode<V: DeserializeOwned>(response: Response) -> AppResult<V> {
    response
        .json::<V>()
        .await
        .map_err(|error| AppError::Internal(format!("API response is not valid JSON: {error}")))
}

/// Signs the client in; the session cookie is kept by the client's cookie
/// store.
pub async fn sign_in(
    client: &reqwest::Client,
    api_base: &Url,
    email: &str,
    password: &str,
) -> AppResult<()> {
    send(
        client
            .post(join(api_base, "auth/login")?)
            .json(&serde_json::json!({ "email": email, "password": password })),
    )
    .await
    .map(|_| ())
}

/// Starts a demo session against the `/api/demo/` tree.
pub async fn start_demo_session(client: &reqwest::Client, demo_base: &Url) -> AppResult<()> {
    send(client.post(join(demo_base, "session")?)).await.map(|_| ())
}

#[async_trait]
impl<T: Resource> DataSource<T> for HttpDataSource<T> {
    async fn list(&self, _tenant_id: TenantId) -> AppResult<Vec<T>> {
        decode(send(self.client.get(self.endpoint.clone())).await?).await
    }

    async fn find(&self, _tenant_id: TenantId, id: RecordId) -> AppResult<Option<T>> {
        match send(self.client.get(self.item_url(id)?)).await {
            Ok(response) => decode(response).await.map(Some),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create(&self, _tenant_id: TenantId, draft: T::Draft) -> AppResult<T> {
        decode(send(self.client.post(self.endpoint.clone()).json(&draft)).await?).await
    }

    async fn update(&self, _tenant_id: TenantId, id: RecordId, patch: T::Patch) -> AppResult<T> {
        decode(send(self.client.put(self.item_url(id)?).json(&patch)).await?).await
    }

    async fn delete(&self, _tenant_id: TenantId, id: RecordId) -> AppResult<()> {
        send(self.client.delete(self.item_url(id)?)).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use brokerdesk_domain::{Product, ProductCategory};
    use url::Url;

    use super::HttpDataSource;

    fn base() -> Url {
        Url::parse("http://localhost:3001/api/demo/").unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn routes_follow_the_kind_collection() {
        let products = HttpDataSource::<Product>::new(reqwest::Client::new(), &base());
        assert_eq!(
            products.ok().map(|source| source.endpoint.to_string()),
            Some("http://localhost:3001/api/demo/products/".to_owned())
        );

        let categories = HttpDataSource::<ProductCategory>::new(reqwest::Client::new(), &base());
        assert_eq!(
            categories.ok().map(|source| source.endpoint.to_string()),
            Some("http://localhost:3001/api/demo/product-categories/".to_owned())
        );
    }

    #[test]
    fn nested_routes_can_be_given_explicitly() {
        let source = HttpDataSource::<Product>::with_path(
            reqwest::Client::new(),
            &base(),
            "/companies/abc/specifications/",
        );
        assert_eq!(
            source.ok().map(|source| source.endpoint.path().to_owned()),
            Some("/api/demo/companies/abc/specifications/".to_owned())
        );
    }
}
