use log::warn;
use std::sync::Arc;

use crate::constants::ERROR_REMOVE_UNIT_FAILED;
use crate::entities::ImportRecord;
use crate::gateway::{CollectionQuery, Gateway, ResourceKind};
use crate::notifications::Notifier;
use crate::session::SessionHandle;
use crate::sync::{ListSync, SyncError};

impl ListSync<ImportRecord> {
    /// Import records of the signed-in user ("My Imports" page)
    pub fn my_imports(gateway: Arc<dyn Gateway>, session: SessionHandle, notifier: Notifier) -> Self {
        Self::new(ResourceKind::Imports, CollectionQuery::all(), gateway, session, notifier)
    }

    /// Removes a single imported unit of a product.
    ///
    /// The product's import record loses one unit once the server confirms;
    /// the record leaves the collection when its last unit is removed.
    ///
    /// # Returns
    /// The record with its remaining units, or `None` once it is gone
    pub async fn remove_imported_unit(&self, product_id: &str) -> Result<Option<ImportRecord>, SyncError> {
        let record_id = self
            .items
            .borrow()
            .iter()
            .find(|record| record.product_id == product_id)
            .map(|record| record.id.clone());

        match record_id {
            Some(record_id) => self.delete(&record_id).await,
            None => {
                let e = SyncError::NotFound(product_id.to_string());
                warn!("⚠️  No import record for product {product_id}");
                self.report(ERROR_REMOVE_UNIT_FAILED, &e);
                Err(e)
            }
        }
    }

    /// Units imported across all records
    pub fn total_units(&self) -> u64 {
        self.items.borrow().iter().map(|record| u64::from(record.quantity)).sum()
    }

    /// Value of everything imported
    pub fn total_value(&self) -> f64 {
        self.items.borrow().iter().map(ImportRecord::total_price).sum()
    }
}
