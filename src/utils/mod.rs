//! Utility modules for the Voltport client.
//!
//! - [`datetime`] - Timestamp parsing and human-readable listing dates
//! - [`lenient`] - Forgiving serde deserializers for API payload fields

pub mod datetime;
pub mod lenient;
