//! List synchronization for the voltport client.
//!
//! This module provides [`ListSync`], which owns the in-memory collection
//! behind one view (all products, the home feed, my exports, my imports) and
//! keeps it consistent with the marketplace API.
//!
//! Every mutation is confirm-then-apply: the gateway call completes first
//! and the local collection only changes once the server has accepted it.
//! On failure the last-known-good collection is kept and the error is
//! reported to the [`Notifier`].

pub mod imports;
pub mod products;

use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::watch;

use crate::constants::{
    ERROR_CREATE_FAILED, ERROR_DELETE_FAILED, ERROR_IMPORT_FAILED, ERROR_LOAD_FAILED, ERROR_NOT_OWNER,
    ERROR_NOT_SIGNED_IN, ERROR_REMOVE_UNIT_FAILED, ERROR_UPDATE_FAILED, SUCCESS_EXPORT_CREATED,
    SUCCESS_EXPORT_DELETED, SUCCESS_EXPORT_UPDATED, SUCCESS_IMPORT_UNIT_REMOVED, SUCCESS_PRODUCT_IMPORTED,
};
use crate::entities::{Credential, Identity, Resource};
use crate::gateway::{self, CollectionQuery, Gateway, GatewayError, ResourceKind};
use crate::notifications::Notifier;
use crate::session::{AuthError, SessionHandle};

/// Represents the current status of a synchronization operation.
///
/// This enum is used to communicate the state of loads to the view,
/// allowing for loading indicators and a retry affordance.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    /// Nothing has been loaded yet
    Idle,
    /// A load is currently in progress
    InProgress,
    /// The last load completed successfully
    Success,
    /// The last load failed; the previous collection is still shown
    Error {
        /// Human-readable error message describing what went wrong
        message: String,
    },
}

/// Error categories surfaced to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connectivity,
    ServerRejected,
    MalformedResponse,
    AuthorizationDenied,
    ClientValidation,
}

/// Errors raised by list operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// No identity, or the identity may not touch this entity
    #[error("{0}")]
    Unauthorized(String),

    /// A local constraint failed; nothing was sent
    #[error("{0}")]
    Validation(String),

    /// The entity is not in the local collection
    #[error("Not found: {0}")]
    NotFound(String),
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Gateway(GatewayError::Connectivity(_)) => ErrorKind::Connectivity,
            SyncError::Gateway(GatewayError::Rejected { .. }) => ErrorKind::ServerRejected,
            SyncError::Gateway(GatewayError::Malformed(_)) => ErrorKind::MalformedResponse,
            SyncError::Unauthorized(_) => ErrorKind::AuthorizationDenied,
            SyncError::Validation(_) | SyncError::NotFound(_) => ErrorKind::ClientValidation,
        }
    }

    /// Text suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Gateway(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

impl From<AuthError> for SyncError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Network(message) => SyncError::Gateway(GatewayError::Connectivity(message)),
            AuthError::NotSignedIn => SyncError::Unauthorized(ERROR_NOT_SIGNED_IN.to_string()),
            other => SyncError::Unauthorized(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Create,
    Update,
    Delete,
}

/// Synchronized collection of `T` behind one view.
///
/// Clones share the same collection. Operations are independent: two calls
/// touching the same id are not sequenced, and whichever response arrives
/// last is the one the collection reflects.
#[derive(Clone)]
pub struct ListSync<T: Resource> {
    kind: ResourceKind,
    query: CollectionQuery,
    gateway: Arc<dyn Gateway>,
    session: SessionHandle,
    notifier: Notifier,
    items: Arc<watch::Sender<Vec<T>>>,
    status: Arc<watch::Sender<SyncStatus>>,
}

impl<T: Resource> ListSync<T> {
    /// Creates a list over `kind`, loaded with `query`.
    ///
    /// For owner-scoped kinds the owner is filled in from the session on
    /// every load.
    pub fn new(
        kind: ResourceKind,
        query: CollectionQuery,
        gateway: Arc<dyn Gateway>,
        session: SessionHandle,
        notifier: Notifier,
    ) -> Self {
        let (items, _) = watch::channel(Vec::new());
        let (status, _) = watch::channel(SyncStatus::Idle);

        Self {
            kind,
            query,
            gateway,
            session,
            notifier,
            items: Arc::new(items),
            status: Arc::new(status),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Snapshot of the collection
    pub fn items(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.items.borrow().iter().find(|item| item.id() == id).cloned()
    }

    /// Receiver notified on every change to the collection
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.items.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Fetches the full collection and replaces the local one.
    ///
    /// On failure the previous collection is left untouched.
    ///
    /// # Returns
    /// The number of entities now in the collection
    pub async fn load(&self) -> Result<usize, SyncError> {
        info!("🔄 Loading {}...", self.kind.name());
        self.status.send_replace(SyncStatus::InProgress);

        match self.fetch_all().await {
            Ok(items) => {
                let count = items.len();
                info!("✅ Fetched {} {}", count, self.kind.name());
                self.items.send_replace(items);
                self.status.send_replace(SyncStatus::Success);
                Ok(count)
            }
            Err(e) => {
                error!("❌ Failed to load {}: {e}", self.kind.name());
                self.status.send_replace(SyncStatus::Error {
                    message: e.user_message(),
                });
                self.report(ERROR_LOAD_FAILED, &e);
                Err(e)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<T>, SyncError> {
        let mut query = self.query.clone();
        let credential = if self.kind.is_owner_scoped() {
            let (identity, credential) = self.authorize().await?;
            query.owner = Some(identity.email);
            Some(credential)
        } else {
            None
        };

        let values = self
            .gateway
            .fetch_collection(self.kind, &query, credential.as_ref())
            .await?;
        Ok(gateway::decode_all(values)?)
    }

    /// Fetches one entity (detail views) and upserts it into the collection.
    pub async fn load_one(&self, id: &str) -> Result<T, SyncError> {
        let result = async {
            let credential = self.session.credential().await?;
            let value = self.gateway.fetch_one(self.kind, id, Some(&credential)).await?;
            Ok::<T, SyncError>(gateway::decode(value)?)
        }
        .await;

        match result {
            Ok(entity) => {
                self.items.send_modify(|items| match items.iter().position(|item| item.id() == entity.id()) {
                    Some(position) => items[position] = entity.clone(),
                    None => items.push(entity.clone()),
                });
                Ok(entity)
            }
            Err(e) => {
                self.report(ERROR_LOAD_FAILED, &e);
                Err(e)
            }
        }
    }

    /// Creates an entity and appends it once the server has assigned its id.
    pub async fn create(&self, draft: &T::Draft) -> Result<T, SyncError> {
        let result = self.try_create(draft).await;
        self.finish(Operation::Create, result)
    }

    async fn try_create(&self, draft: &T::Draft) -> Result<T, SyncError> {
        T::validate_draft(draft).map_err(|e| SyncError::Validation(e.to_string()))?;
        let (identity, credential) = self.authorize().await?;

        let prepared = T::prepare_draft(draft, &identity);
        let payload = serde_json::to_value(&prepared).map_err(|e| SyncError::Validation(e.to_string()))?;
        let created = self.gateway.create_entity(self.kind, &payload, &credential).await?;

        let entity = T::from_draft(&prepared, created.id, &identity);
        let mut stored = entity.clone();
        self.items.send_modify(|items| match items.iter().position(|item| item.id() == entity.id()) {
            Some(position) => {
                items[position].merge_created(entity);
                stored = items[position].clone();
            }
            None => items.push(entity),
        });

        info!("✅ Created {} {}", self.kind.name(), stored.id());
        Ok(stored)
    }

    /// Updates an entity and merges the payload into the local copy once confirmed.
    pub async fn update(&self, id: &str, draft: &T::Draft) -> Result<T, SyncError> {
        let result = self.try_update(id, draft).await;
        self.finish(Operation::Update, result)
    }

    async fn try_update(&self, id: &str, draft: &T::Draft) -> Result<T, SyncError> {
        T::validate_draft(draft).map_err(|e| SyncError::Validation(e.to_string()))?;
        let current = self.get(id).ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        let (identity, credential) = self.authorize().await?;
        Self::ensure_owner(&current, &identity)?;

        let payload = serde_json::to_value(draft).map_err(|e| SyncError::Validation(e.to_string()))?;
        self.gateway.update_entity(self.kind, id, &payload, &credential).await?;

        let mut merged = current;
        self.items.send_modify(|items| {
            if let Some(existing) = items.iter_mut().find(|item| item.id() == id) {
                existing.apply_draft(draft);
                merged = existing.clone();
            } else {
                // Removed while the update was in flight; do not resurrect it
                warn!("⚠️  {} {} vanished before its update was confirmed", self.kind.name(), id);
                merged.apply_draft(draft);
            }
        });

        info!("✅ Updated {} {}", self.kind.name(), id);
        Ok(merged)
    }

    /// Deletes an entity and drops it from the collection once confirmed.
    ///
    /// # Returns
    /// The entity as it remains in the collection, or `None` when it left it
    /// (see [`Resource::confirm_delete`]).
    pub async fn delete(&self, id: &str) -> Result<Option<T>, SyncError> {
        let result = self.try_delete(id).await;
        self.finish(Operation::Delete, result)
    }

    async fn try_delete(&self, id: &str) -> Result<Option<T>, SyncError> {
        let current = self.get(id).ok_or_else(|| SyncError::NotFound(id.to_string()))?;
        let (identity, credential) = self.authorize().await?;
        Self::ensure_owner(&current, &identity)?;

        self.gateway.delete_entity(self.kind, id, &credential).await?;

        let mut remaining = None;
        self.items.send_modify(|items| {
            if let Some(position) = items.iter().position(|item| item.id() == id) {
                let leaves = items.get_mut(position).is_some_and(|item| item.confirm_delete());
                if leaves {
                    items.remove(position);
                } else {
                    remaining = items.get(position).cloned();
                }
            }
        });

        info!("✅ Deleted {} {}", self.kind.name(), id);
        Ok(remaining)
    }

    /// Current identity and a fresh credential, or `Unauthorized`
    async fn authorize(&self) -> Result<(Identity, Credential), SyncError> {
        let identity = self
            .session
            .identity()
            .filter(Identity::has_valid_email)
            .ok_or_else(|| SyncError::Unauthorized(ERROR_NOT_SIGNED_IN.to_string()))?;
        let credential = self.session.credential().await?;
        Ok((identity, credential))
    }

    fn ensure_owner(entity: &T, identity: &Identity) -> Result<(), SyncError> {
        match entity.owner() {
            Some(owner) if !owner.eq_ignore_ascii_case(identity.email.trim()) => {
                Err(SyncError::Unauthorized(ERROR_NOT_OWNER.to_string()))
            }
            _ => Ok(()),
        }
    }

    fn finish<R>(&self, operation: Operation, result: Result<R, SyncError>) -> Result<R, SyncError> {
        let (success, failure) = self.messages(operation);
        match &result {
            Ok(_) => self.notifier.success(success),
            Err(e) => {
                error!("❌ {:?} on {} failed: {e}", operation, self.kind.name());
                self.report(failure, e);
            }
        }
        result
    }

    fn report(&self, context: &str, e: &SyncError) {
        self.notifier.error(format!("{}: {}", context, e.user_message()));
    }

    fn messages(&self, operation: Operation) -> (&'static str, &'static str) {
        match (self.kind, operation) {
            (ResourceKind::Imports, Operation::Create) => (SUCCESS_PRODUCT_IMPORTED, ERROR_IMPORT_FAILED),
            (ResourceKind::Imports, Operation::Delete) => (SUCCESS_IMPORT_UNIT_REMOVED, ERROR_REMOVE_UNIT_FAILED),
            (_, Operation::Create) => (SUCCESS_EXPORT_CREATED, ERROR_CREATE_FAILED),
            (_, Operation::Update) => (SUCCESS_EXPORT_UPDATED, ERROR_UPDATE_FAILED),
            (_, Operation::Delete) => (SUCCESS_EXPORT_DELETED, ERROR_DELETE_FAILED),
        }
    }
}
