//! HTTP implementation of the [`Gateway`] over the marketplace REST API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use url::Url;

use super::envelope::{self, Envelope};
use super::{Ack, CollectionQuery, Created, Gateway, GatewayError, ResourceKind};
use crate::config::ApiConfig;
use crate::entities::Credential;

/// Marketplace API client.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Create a gateway rooted at `base_url`
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("Invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot have paths joined onto it: {}", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, config.timeout())
    }

    fn url(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::Malformed(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn entity_collection(kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::Products | ResourceKind::Exports => "products",
            ResourceKind::Imports => "imports",
        }
    }

    fn request(&self, method: Method, url: Url, credential: Option<&Credential>) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match credential {
            Some(credential) => builder.bearer_auth(credential.expose()),
            None => builder,
        }
    }

    /// Send a request and parse the body of a 2xx response
    async fn send(&self, request: RequestBuilder) -> Result<Envelope, GatewayError> {
        let response = request.send().await.map_err(|e| {
            error!("❌ Request failed before a response: {}", e);
            GatewayError::Connectivity(e.to_string())
        })?;

        let status = response.status();
        let url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Connectivity(e.to_string()))?;

        debug!("{} {} ({} bytes)", status.as_u16(), url, body.len());

        if !status.is_success() {
            let message = envelope::error_message(&body)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            error!("❌ {} rejected with {}: {}", url, status.as_u16(), message);
            return Err(GatewayError::Rejected {
                status: Some(status.as_u16()),
                message,
            });
        }

        Envelope::parse(&body)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_collection(
        &self,
        kind: ResourceKind,
        query: &CollectionQuery,
        credential: Option<&Credential>,
    ) -> Result<Vec<Value>, GatewayError> {
        let mut url = match (kind, query.search.as_deref()) {
            (ResourceKind::Products, Some(term)) => {
                let mut url = self.url(&["search"])?;
                url.query_pairs_mut().append_pair("search", term);
                url
            }
            (ResourceKind::Products, None) => self.url(&["products"])?,
            (ResourceKind::Exports, _) => self.url(&["my-exports"])?,
            (ResourceKind::Imports, _) => self.url(&["my-imports"])?,
        };

        if let Some(owner) = query.owner.as_deref() {
            url.query_pairs_mut().append_pair("email", owner);
        }
        if let Some(limit) = query.limit {
            url.query_pairs_mut().append_pair("limit", &limit.to_string());
        }

        let envelope = self.send(self.request(Method::GET, url, credential)).await?;
        envelope.into_collection()
    }

    async fn fetch_one(
        &self,
        kind: ResourceKind,
        id: &str,
        credential: Option<&Credential>,
    ) -> Result<Value, GatewayError> {
        let url = self.url(&[Self::entity_collection(kind), id])?;
        let envelope = self.send(self.request(Method::GET, url, credential)).await?;
        envelope.into_entity()
    }

    async fn create_entity(
        &self,
        kind: ResourceKind,
        payload: &Value,
        credential: &Credential,
    ) -> Result<Created, GatewayError> {
        let url = self.url(&[Self::entity_collection(kind)])?;
        let request = self.request(Method::POST, url, Some(credential)).json(payload);
        self.send(request).await?.into_created()
    }

    async fn update_entity(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
        credential: &Credential,
    ) -> Result<Ack, GatewayError> {
        let method = match kind {
            ResourceKind::Imports => Method::PATCH,
            ResourceKind::Products | ResourceKind::Exports => Method::PUT,
        };
        let url = self.url(&[Self::entity_collection(kind), id])?;
        let request = self.request(method, url, Some(credential)).json(payload);
        self.send(request).await?.into_ack()
    }

    async fn delete_entity(&self, kind: ResourceKind, id: &str, credential: &Credential) -> Result<Ack, GatewayError> {
        let url = self.url(&[Self::entity_collection(kind), id])?;
        self.send(self.request(Method::DELETE, url, Some(credential)))
            .await?
            .into_ack()
    }
}
