//! `reqwest`-based implementation of [`Backend`].

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;

use super::{classify_failure, Backend, BackendFailure};
use crate::{
    config::Settings,
    error::{CocoaError, Result},
    models::{Entity, Resource, ScopeKey},
    params::EntityPayload,
};

/// JSON-over-HTTP client for the dashboard backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Builds a client using the base URL and request timeout from
    /// `settings`.
    ///
    /// # Errors
    ///
    /// Returns `CocoaError::HttpClient` if the TLS backend cannot be
    /// initialized.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| CocoaError::http_client("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL every collection path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, resource: Resource) -> String {
        format!("{}/{}", self.base_url, resource.collection())
    }

    fn record_url(&self, resource: Resource, id: u64) -> String {
        format!("{}/{id}", self.collection_url(resource))
    }

    async fn read<T: DeserializeOwned>(
        context: &str,
        sent: std::result::Result<reqwest::Response, reqwest::Error>,
    ) -> std::result::Result<T, BackendFailure> {
        let response = sent.map_err(|e| transport(context, &e))?;
        let status = response.status();
        debug!("{context}: HTTP {status}");

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| transport(context, &e));
        }

        let body = response.text().await.map_err(|e| transport(context, &e))?;
        let failure = classify_failure(status.as_u16(), &body);
        if let BackendFailure::Transport { message } = &failure {
            warn!("{context}: {message}");
        }
        Err(failure)
    }
}

fn transport(context: &str, error: &reqwest::Error) -> BackendFailure {
    let message = if error.is_timeout() {
        format!("{context}: request timed out")
    } else if error.is_decode() {
        format!("{context}: malformed response body: {error}")
    } else {
        format!("{context}: {error}")
    };
    warn!("{message}");
    BackendFailure::Transport { message }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_scoped(
        &self,
        resource: Resource,
        scope: &ScopeKey,
    ) -> std::result::Result<Vec<Entity>, BackendFailure> {
        let sent = self
            .client
            .get(self.collection_url(resource))
            .query(&[("scope", scope.to_string())])
            .send()
            .await;
        Self::read(&format!("GET {}", resource.collection()), sent).await
    }

    async fn create(
        &self,
        resource: Resource,
        payload: &EntityPayload,
    ) -> std::result::Result<Entity, BackendFailure> {
        let sent = self
            .client
            .post(self.collection_url(resource))
            .json(payload)
            .send()
            .await;
        Self::read(&format!("POST {}", resource.collection()), sent).await
    }

    async fn update(
        &self,
        resource: Resource,
        id: u64,
        payload: &EntityPayload,
    ) -> std::result::Result<Entity, BackendFailure> {
        let sent = self
            .client
            .put(self.record_url(resource, id))
            .json(payload)
            .send()
            .await;
        Self::read(&format!("PUT {}/{id}", resource.collection()), sent).await
    }
}
