use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use rolegate_application::{ServiceDirectory, UserDirectory};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{DirectoryService, DirectoryUser, ServiceId, UserId};

#[derive(Debug, Serialize)]
struct IdsRequest<'a, T> {
    ids: &'a [T],
}

/// JSON client for a sibling directory service.
///
/// Requests carry an optional bearer token and fail after the configured
/// timeout. Nothing is retried.
#[derive(Clone)]
pub struct HttpDirectoryClient {
    http_client: reqwest::Client,
    base_url: Url,
    api_token: Option<String>,
}

impl HttpDirectoryClient {
    /// Creates a client rooted at `base_url`.
    pub fn new(base_url: Url, api_token: Option<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| {
                AppError::Internal(format!("failed to build directory http client: {error}"))
            })?;

        Ok(Self {
            http_client,
            base_url,
            api_token,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path_with_slash = format!("{}/", base.path());
            base.set_path(path_with_slash.as_str());
        }

        base.join(path).map_err(|error| {
            AppError::Internal(format!("invalid directory endpoint '{path}': {error}"))
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<Option<T>> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "directory request");
        let response = self
            .authorize(self.http_client.get(url.clone()))
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("GET {url} failed: {error}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        decode(response, &url).await.map(Some)
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "directory request");
        let response = self
            .authorize(self.http_client.post(url.clone()).json(body))
            .send()
            .await
            .map_err(|error| AppError::Upstream(format!("POST {url} failed: {error}")))?;

        decode(response, &url).await
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response, url: &Url) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        return Err(AppError::Upstream(format!(
            "{url} responded with status {status}: {body}"
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|error| AppError::Upstream(format!("{url} returned malformed JSON: {error}")))
}

/// Service directory served by the portal over HTTP.
#[derive(Clone)]
pub struct HttpServiceDirectory {
    client: HttpDirectoryClient,
}

impl HttpServiceDirectory {
    /// Creates a service directory adapter.
    #[must_use]
    pub fn new(client: HttpDirectoryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ServiceDirectory for HttpServiceDirectory {
    async fn find_by_id(&self, id: ServiceId) -> AppResult<Option<DirectoryService>> {
        self.client.get_json(&format!("services/{id}")).await
    }

    async fn find_by_ids(&self, ids: &[ServiceId]) -> AppResult<Vec<DirectoryService>> {
        self.client
            .post_json("services/batch", &IdsRequest { ids })
            .await
    }

    async fn list_services(&self) -> AppResult<Vec<DirectoryService>> {
        Ok(self.client.get_json("services").await?.unwrap_or_default())
    }
}

/// User directory served by the identity service over HTTP.
#[derive(Clone)]
pub struct HttpUserDirectory {
    client: HttpDirectoryClient,
}

impl HttpUserDirectory {
    /// Creates a user directory adapter.
    #[must_use]
    pub fn new(client: HttpDirectoryClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn find_by_ids(&self, ids: &[UserId]) -> AppResult<Vec<DirectoryUser>> {
        self.client.post_json("users/batch", &IdsRequest { ids }).await
    }
}
