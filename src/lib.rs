//! Voltport - client core for an electric-vehicle import/export marketplace
//!
//! This library holds everything below the view layer: the typed gateway
//! to the marketplace API, the session mirrored from the identity provider,
//! the synchronized product and import lists, debounced search and the
//! route authorization gate. Views subscribe to `tokio::sync::watch`
//! channels and render whatever the latest snapshot says.
//!
//! # Modules
//!
//! The library is organized into several key modules:
//!
//! * [`config`] - Application configuration management
//! * [`gateway`] - Marketplace API client and response normalization
//! * [`session`] - Session state and the identity provider
//! * [`sync`] - Synchronized product, export and import lists
//! * [`search`] - Debounced product search
//! * [`routes`] - Route table and authorization gate
//! * [`utils`] - Utility functions and helpers

/// Configuration module for managing application settings
pub mod config;

/// Application constants and default values
pub mod constants;

/// Cancellable delayed actions
pub mod debounce;

/// Marketplace data model
pub mod entities;

/// Remote data gateway for the marketplace API
pub mod gateway;

/// Logging setup for debugging and error tracking
pub mod logger;

/// User-facing toast notifications
pub mod notifications;

/// Route table and authorization gate
pub mod routes;

/// Debounced product search
pub mod search;

/// Session store over the external identity provider
pub mod session;

/// Synchronized lists backed by the marketplace API
pub mod sync;

/// Utility functions for date/time handling and lenient decoding
pub mod utils;

pub use entities::{Identity, ImportRecord, Product};
