use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identity, Resource};
use crate::constants::{
    ERROR_EMPTY_IMAGE, ERROR_EMPTY_NAME, ERROR_NEGATIVE_PRICE, ERROR_RATING_RANGE, ERROR_YEAR_RANGE, RATING_MAX,
};
use crate::utils::{datetime, lenient};

/// First year a production car was sold; earlier model years are rejected
const FIRST_MODEL_YEAR: u32 = 1886;

/// A vehicle listed on the marketplace.
///
/// Export listings are products whose `exporter_email` is the signed-in
/// user's email.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    #[serde(alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(alias = "productName")]
    pub name: String,
    #[serde(alias = "productImage", alias = "imageUrl")]
    pub image: String,
    #[serde(deserialize_with = "lenient::non_negative")]
    pub price: f64,
    #[serde(alias = "origin")]
    pub origin_country: String,
    #[serde(deserialize_with = "lenient::rating")]
    pub rating: f64,
    #[serde(deserialize_with = "lenient::quantity")]
    pub available_quantity: u32,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub mileage: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub transmission: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub fuel_type: Option<String>,
    #[serde(deserialize_with = "lenient::optional_count")]
    pub year: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub performance: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub color: Option<String>,
    #[serde(deserialize_with = "lenient::optional_count")]
    pub seats: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_count")]
    pub doors: Option<u32>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub engine: Option<String>,
    #[serde(deserialize_with = "lenient::optional_text")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient::optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "email", alias = "userEmail", deserialize_with = "lenient::optional_text")]
    pub exporter_email: Option<String>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.available_quantity > 0
    }

    pub fn is_owned_by(&self, identity: &Identity) -> bool {
        self.exporter_email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(identity.email.trim()))
    }

    /// "today", "3 days ago", "Jan 15", ... or `None` when the listing date is unknown
    pub fn listed_label(&self) -> Option<String> {
        self.created_at.as_ref().map(datetime::format_listed_now)
    }
}

/// Form payload for publishing or editing an export listing
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    pub image: String,
    pub price: f64,
    pub origin_country: String,
    pub rating: f64,
    pub available_quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mileage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doors: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Filled in from the session when the listing is published
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exporter_email: Option<String>,
}

impl ProductDraft {
    /// Client-side checks run before any request is issued
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err(ERROR_EMPTY_NAME);
        }
        if self.image.trim().is_empty() {
            return Err(ERROR_EMPTY_IMAGE);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ERROR_NEGATIVE_PRICE);
        }
        if !(0.0..=RATING_MAX).contains(&self.rating) {
            return Err(ERROR_RATING_RANGE);
        }
        if let Some(year) = self.year {
            let latest = u32::try_from(datetime::current_year() + 1).unwrap_or(u32::MAX);
            if !(FIRST_MODEL_YEAR..=latest).contains(&year) {
                return Err(ERROR_YEAR_RANGE);
            }
        }
        Ok(())
    }
}

impl Resource for Product {
    type Draft = ProductDraft;

    fn id(&self) -> &str {
        &self.id
    }

    fn owner(&self) -> Option<&str> {
        self.exporter_email.as_deref()
    }

    fn validate_draft(draft: &ProductDraft) -> Result<(), &'static str> {
        draft.validate()
    }

    fn prepare_draft(draft: &ProductDraft, owner: &Identity) -> ProductDraft {
        ProductDraft {
            exporter_email: Some(owner.email.clone()),
            ..draft.clone()
        }
    }

    fn from_draft(draft: &ProductDraft, id: String, owner: &Identity) -> Self {
        let mut product = Product {
            id,
            created_at: Some(Utc::now()),
            exporter_email: Some(owner.email.clone()),
            ..Default::default()
        };
        product.apply_draft(draft);
        product
    }

    fn apply_draft(&mut self, draft: &ProductDraft) {
        self.name = draft.name.clone();
        self.image = draft.image.clone();
        self.price = draft.price.max(0.0);
        self.origin_country = draft.origin_country.clone();
        self.rating = lenient::clamp_rating(draft.rating);
        self.available_quantity = draft.available_quantity;
        self.mileage = draft.mileage.clone();
        self.transmission = draft.transmission.clone();
        self.fuel_type = draft.fuel_type.clone();
        self.year = draft.year;
        self.performance = draft.performance.clone();
        self.color = draft.color.clone();
        self.seats = draft.seats;
        self.doors = draft.doors;
        self.engine = draft.engine.clone();
        self.description = draft.description.clone();
    }
}
