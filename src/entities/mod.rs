//! Marketplace data model.
//!
//! Every persistent object lives behind the remote API; these types are the
//! client's in-memory mirror of it.

pub mod identity;
pub mod import;
pub mod product;

pub use identity::{Credential, Identity};
pub use import::{ImportDraft, ImportRecord};
pub use product::{Product, ProductDraft};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// An entity kept in a synchronized list.
///
/// Ties an entity to the payload used to create or edit it, so a list can
/// build the confirmed entity locally from the payload and the id returned
/// by the server.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Create/update payload sent to the API
    type Draft: Serialize + Clone + Send + Sync;

    fn id(&self) -> &str;

    /// Email of the identity that owns this entity, when known
    fn owner(&self) -> Option<&str>;

    /// Local checks that must pass before the payload is sent
    fn validate_draft(draft: &Self::Draft) -> Result<(), &'static str>;

    /// Stamp ownership onto the payload before it is sent
    fn prepare_draft(draft: &Self::Draft, owner: &Identity) -> Self::Draft;

    /// Entity the server created from `draft`
    fn from_draft(draft: &Self::Draft, id: String, owner: &Identity) -> Self;

    /// Merge a confirmed update into the local copy
    fn apply_draft(&mut self, draft: &Self::Draft);

    /// Called instead of appending when the server answers a create with an
    /// id that is already in the list
    fn merge_created(&mut self, created: Self) {
        *self = created;
    }

    /// Apply a confirmed delete to the local copy. Returns `true` when the
    /// entity leaves the list.
    fn confirm_delete(&mut self) -> bool {
        true
    }
}
