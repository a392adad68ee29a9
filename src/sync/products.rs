use log::{info, warn};
use std::sync::Arc;

use crate::constants::{
    ERROR_IMPORT_FAILED, ERROR_INVALID_QUANTITY, ERROR_QUANTITY_EXCEEDS_STOCK, SUCCESS_PRODUCT_IMPORTED,
};
use crate::entities::{ImportDraft, ImportRecord, Product, Resource};
use crate::gateway::{CollectionQuery, Gateway, ResourceKind};
use crate::notifications::Notifier;
use crate::session::SessionHandle;
use crate::sync::{ListSync, SyncError};

impl ListSync<Product> {
    /// Every listed product ("All Products" page)
    pub fn all_products(gateway: Arc<dyn Gateway>, session: SessionHandle, notifier: Notifier) -> Self {
        Self::new(ResourceKind::Products, CollectionQuery::all(), gateway, session, notifier)
    }

    /// The newest `limit` products (home feed)
    pub fn latest_products(
        limit: usize,
        gateway: Arc<dyn Gateway>,
        session: SessionHandle,
        notifier: Notifier,
    ) -> Self {
        Self::new(ResourceKind::Products, CollectionQuery::latest(limit), gateway, session, notifier)
    }

    /// Products listed by the signed-in user
    pub fn my_exports(gateway: Arc<dyn Gateway>, session: SessionHandle, notifier: Notifier) -> Self {
        Self::new(ResourceKind::Exports, CollectionQuery::all(), gateway, session, notifier)
    }

    /// Imports `quantity` units of a product in this collection.
    ///
    /// The quantity is checked against the locally known stock before any
    /// request is made. The product's `available_quantity` is only decreased
    /// once the server has created the import.
    ///
    /// # Arguments
    /// * `product_id` - Product to import, must already be loaded
    /// * `quantity` - Number of units, between 1 and the available stock
    ///
    /// # Returns
    /// The import record as created by the server
    ///
    /// # Errors
    /// `Validation` for an out-of-range quantity, `NotFound` for an unknown
    /// product, `Unauthorized` without a session, or the gateway failure
    pub async fn import_units(&self, product_id: &str, quantity: u32) -> Result<ImportRecord, SyncError> {
        let result = self.try_import(product_id, quantity).await;
        match &result {
            Ok(record) => {
                info!("📦 Imported {} x {}", record.quantity, record.name);
                self.notifier.success(SUCCESS_PRODUCT_IMPORTED);
            }
            Err(e) => {
                warn!("⚠️  Import of {product_id} failed: {e}");
                self.report(ERROR_IMPORT_FAILED, e);
            }
        }
        result
    }

    async fn try_import(&self, product_id: &str, quantity: u32) -> Result<ImportRecord, SyncError> {
        let product = self
            .get(product_id)
            .ok_or_else(|| SyncError::NotFound(product_id.to_string()))?;

        if quantity == 0 {
            return Err(SyncError::Validation(ERROR_INVALID_QUANTITY.to_string()));
        }
        if quantity > product.available_quantity {
            return Err(SyncError::Validation(ERROR_QUANTITY_EXCEEDS_STOCK.to_string()));
        }

        let (identity, credential) = self.authorize().await?;
        let draft = ImportRecord::prepare_draft(&ImportDraft::for_product(&product, quantity), &identity);
        let payload = serde_json::to_value(&draft).map_err(|e| SyncError::Validation(e.to_string()))?;

        let created = self
            .gateway
            .create_entity(ResourceKind::Imports, &payload, &credential)
            .await?;

        // Stock is decremented against the value at arrival, not the one checked above
        self.items.send_modify(|items| {
            if let Some(item) = items.iter_mut().find(|item| item.id == product_id) {
                item.available_quantity = item.available_quantity.saturating_sub(quantity);
            }
        });

        Ok(ImportRecord::from_draft(&draft, created.id, &identity))
    }
}
