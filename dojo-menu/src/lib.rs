//! Integration catalogue: the single source of truth for what exists and
//! which features each integration advertises.
//!
//! The catalogue is read by the UI layer for rendering and by request routing
//! for validation through [`is_integration_valid`], [`is_feature_available`],
//! and [`get_integration`]. Nothing here constructs agents; see the registry
//! crate for that.

#![warn(missing_docs, clippy::pedantic)]

mod catalogue;
mod lookup;

pub use catalogue::MENU_INTEGRATIONS;
pub use lookup::{Menu, get_integration, is_feature_available, is_integration_valid};
