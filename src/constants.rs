//! Constants used throughout the application
//!
//! This module centralizes magic strings, user-facing notification text,
//! route paths and default values to keep them consistent.

// Success Messages
pub const SUCCESS_EXPORT_CREATED: &str = "✅ Export listing published";
pub const SUCCESS_EXPORT_UPDATED: &str = "✅ Export listing updated";
pub const SUCCESS_EXPORT_DELETED: &str = "✅ Export listing deleted";
pub const SUCCESS_PRODUCT_IMPORTED: &str = "✅ Product imported";
pub const SUCCESS_IMPORT_UNIT_REMOVED: &str = "✅ Removed one imported unit";
pub const SUCCESS_SIGNED_IN: &str = "✅ Signed in";
pub const SUCCESS_ACCOUNT_CREATED: &str = "✅ Account created";
pub const SUCCESS_SIGNED_OUT: &str = "✅ Signed out";
pub const SUCCESS_PROFILE_UPDATED: &str = "✅ Profile updated";

// Error Messages
pub const ERROR_LOAD_FAILED: &str = "❌ Failed to load data";
pub const ERROR_SEARCH_FAILED: &str = "❌ Search failed";
pub const ERROR_CREATE_FAILED: &str = "❌ Failed to create listing";
pub const ERROR_UPDATE_FAILED: &str = "❌ Failed to update listing";
pub const ERROR_DELETE_FAILED: &str = "❌ Failed to delete listing";
pub const ERROR_IMPORT_FAILED: &str = "❌ Failed to import product";
pub const ERROR_REMOVE_UNIT_FAILED: &str = "❌ Failed to remove imported unit";
pub const ERROR_NOT_SIGNED_IN: &str = "❌ You must be signed in to do that";
pub const ERROR_NOT_OWNER: &str = "❌ Only the exporter can change this listing";
pub const ERROR_CONNECTIVITY: &str = "Unable to reach the server, check your connection";

// Validation Error Messages
pub const ERROR_INVALID_QUANTITY: &str = "Quantity must be at least 1";
pub const ERROR_QUANTITY_EXCEEDS_STOCK: &str = "Quantity exceeds available stock";
pub const ERROR_EMPTY_NAME: &str = "Product name cannot be empty";
pub const ERROR_EMPTY_IMAGE: &str = "Product image URL cannot be empty";
pub const ERROR_NEGATIVE_PRICE: &str = "Price cannot be negative";
pub const ERROR_RATING_RANGE: &str = "Rating must be between 0 and 5";
pub const ERROR_YEAR_RANGE: &str = "Model year is out of range";
pub const ERROR_WEAK_PASSWORD: &str =
    "Password must be at least 6 characters and contain an uppercase and a lowercase letter";

// UI Messages
pub const CONFIG_GENERATED: &str = "✅ Generated default configuration file";

// Route paths
pub const PATH_HOME: &str = "/";
pub const PATH_ALL_PRODUCTS: &str = "/all-products";
pub const PATH_PRODUCT_DETAILS: &str = "/product-details";
pub const PATH_ADD_EXPORT: &str = "/add-export";
pub const PATH_MY_EXPORTS: &str = "/my-exports";
pub const PATH_MY_IMPORTS: &str = "/my-imports";
pub const PATH_PROFILE: &str = "/profile";
pub const PATH_LOGIN: &str = "/login";
pub const PATH_REGISTER: &str = "/register";

// Defaults
/// Quiet period before a search term is sent to the API
pub const SEARCH_DEBOUNCE_DEFAULT_MS: u64 = 600;
/// Upper bound accepted for the search debounce delay
pub const SEARCH_DEBOUNCE_MAX_MS: u64 = 10_000;
/// Number of products shown in the home page "latest" feed
pub const LATEST_PRODUCTS_DEFAULT_LIMIT: usize = 6;
/// Default HTTP timeout for API calls
pub const API_TIMEOUT_DEFAULT_SECS: u64 = 15;
/// Highest rating a product can carry
pub const RATING_MAX: f64 = 5.0;
/// Minimum registration password length
pub const PASSWORD_MIN_LENGTH: usize = 6;
/// Notifications kept before the oldest are dropped
pub const MAX_TOASTS: usize = 100;
