use serde::{Deserialize, Serialize};

use super::{Identity, Product, Resource};
use crate::constants::ERROR_INVALID_QUANTITY;
use crate::utils::lenient;

/// Units of a product imported by the signed-in user.
///
/// Display fields are denormalized from the product at import time so the
/// "My Imports" view does not need to fetch every product.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportRecord {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(alias = "productID", deserialize_with = "lenient::id")]
    pub product_id: String,
    #[serde(alias = "productImage")]
    pub image: String,
    #[serde(alias = "productName")]
    pub name: String,
    #[serde(deserialize_with = "lenient::non_negative")]
    pub price: f64,
    #[serde(alias = "origin")]
    pub origin_country: String,
    #[serde(deserialize_with = "lenient::rating")]
    pub rating: f64,
    #[serde(alias = "importedQuantity", alias = "importQuantity", deserialize_with = "lenient::quantity")]
    pub quantity: u32,
    #[serde(alias = "email", alias = "userEmail", deserialize_with = "lenient::optional_text")]
    pub importer_email: Option<String>,
}

/// Request body for importing units of a product
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDraft {
    pub product_id: String,
    pub quantity: u32,
    pub image: String,
    pub name: String,
    pub price: f64,
    pub origin_country: String,
    pub rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importer_email: Option<String>,
}

impl ImportDraft {
    pub fn for_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            quantity,
            image: product.image.clone(),
            name: product.name.clone(),
            price: product.price,
            origin_country: product.origin_country.clone(),
            rating: product.rating,
            importer_email: None,
        }
    }
}

impl ImportRecord {
    /// Value of the imported units
    pub fn total_price(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

impl Resource for ImportRecord {
    type Draft = ImportDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        self.importer_email.as_deref()
    }

    fn validate_draft(draft: &ImportDraft) -> Result<(), &'static str> {
        if draft.quantity == 0 {
            return Err(ERROR_INVALID_QUANTITY);
        }
        Ok(())
    }

    fn prepare_draft(draft: &ImportDraft, owner: &Identity) -> ImportDraft {
        ImportDraft {
            importer_email: Some(owner.email.clone()),
            ..draft.clone()
        }
    }

    fn from_draft(draft: &ImportDraft, id: String, owner: &Identity) -> Self {
        ImportRecord {
            id,
            product_id: draft.product_id.clone(),
            image: draft.image.clone(),
            name: draft.name.clone(),
            price: draft.price,
            origin_country: draft.origin_country.clone(),
            rating: lenient::clamp_rating(draft.rating),
            quantity: draft.quantity,
            importer_email: Some(owner.email.clone()),
        }
    }

    fn apply_draft(&mut self, draft: &ImportDraft) {
        self.quantity = draft.quantity;
    }

    // The API folds repeated imports of one product into the existing record
    fn merge_created(&mut self, created: Self) {
        self.quantity = self.quantity.saturating_add(created.quantity);
    }

    // Deleting an import removes a single unit; the record goes away with the last one
    fn confirm_delete(&mut self) -> bool {
        self.quantity = self.quantity.saturating_sub(1);
        self.quantity == 0
    }
}
