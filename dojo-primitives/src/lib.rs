//! Core shared types for the dojo integration registry.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod feature;
mod integration;

/// Error type and result alias shared across the registry crates.
pub use error::{Error, Result};
/// Closed vocabulary of features an integration may declare.
pub use feature::Feature;
/// Static descriptor for an integration advertised in the menu.
pub use integration::{MenuIntegration, validate_integration_id};
