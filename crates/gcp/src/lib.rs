//! Google Cloud integration for secretgate
//!
//! This crate provides the Google Cloud Secret Manager store for the
//! secretgate workspace via the [`secrets`] module.

pub mod secrets;

// Re-export main types for convenience
pub use secrets::{GcpSecretManager, retrieve_secret};
