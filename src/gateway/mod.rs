//! Remote data gateway.
//!
//! This module defines the interface every marketplace API client must
//! implement, along with the resource kinds, query arguments and error
//! taxonomy shared by all of them. Responses are normalized once at this
//! boundary (see [`envelope`]) so callers only ever see one shape.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::constants::ERROR_CONNECTIVITY;
use crate::entities::Credential;

pub mod envelope;
pub mod http;

pub use http::HttpGateway;

/// Collections exposed by the marketplace API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Every listed product, searchable
    Products,
    /// Products listed by the signed-in user
    Exports,
    /// Import records of the signed-in user
    Imports,
}

impl ResourceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Products => "products",
            ResourceKind::Exports => "exports",
            ResourceKind::Imports => "imports",
        }
    }

    /// Whether listing this collection is scoped to the signed-in user
    pub fn is_owner_scoped(&self) -> bool {
        !matches!(self, ResourceKind::Products)
    }
}

/// Common error types for gateway operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The request never reached the server or no response came back
    #[error("Connection failed: {0}")]
    Connectivity(String),

    /// Non-2xx status, or a `success: false` envelope
    #[error("Request rejected: {message}")]
    Rejected { status: Option<u16>, message: String },

    /// The body was not JSON or had an unexpected shape
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => *status,
            _ => None,
        }
    }

    /// Text suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::Connectivity(_) => ERROR_CONNECTIVITY.to_string(),
            GatewayError::Rejected { message, .. } => message.clone(),
            GatewayError::Malformed(_) => "The server sent an unexpected response".to_string(),
        }
    }
}

/// Arguments for listing a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionQuery {
    /// Free-text search term; only honored for products
    pub search: Option<String>,
    /// Owner email for owner-scoped collections
    pub owner: Option<String>,
    /// Maximum number of entities (newest first), used by the home feed
    pub limit: Option<usize>,
}

impl CollectionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn owned_by(mut self, email: impl Into<String>) -> Self {
        self.owner = Some(email.into());
        self
    }
}

/// Convert a normalized entity into a typed model
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Malformed(e.to_string()))
}

/// Convert a normalized collection; one undecodable entity fails the whole batch
pub fn decode_all<T: DeserializeOwned>(values: Vec<Value>) -> Result<Vec<T>, GatewayError> {
    values.into_iter().map(decode).collect()
}

/// Id assigned by the server to a newly created entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Created {
    pub id: String,
}

/// Server acknowledgement of an update or delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack;

/// Gateway trait that all marketplace API clients must implement.
///
/// Every call is a single request/response with no automatic retry, and no
/// implementation mutates shared state.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// List a collection; the credential is attached when given
    async fn fetch_collection(
        &self,
        kind: ResourceKind,
        query: &CollectionQuery,
        credential: Option<&Credential>,
    ) -> Result<Vec<Value>, GatewayError>;

    async fn fetch_one(
        &self,
        kind: ResourceKind,
        id: &str,
        credential: Option<&Credential>,
    ) -> Result<Value, GatewayError>;

    async fn create_entity(
        &self,
        kind: ResourceKind,
        payload: &Value,
        credential: &Credential,
    ) -> Result<Created, GatewayError>;

    async fn update_entity(
        &self,
        kind: ResourceKind,
        id: &str,
        payload: &Value,
        credential: &Credential,
    ) -> Result<Ack, GatewayError>;

    /// Delete an entity. For [`ResourceKind::Imports`] this removes a single unit.
    async fn delete_entity(&self, kind: ResourceKind, id: &str, credential: &Credential) -> Result<Ack, GatewayError>;
}
