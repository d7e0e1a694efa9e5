//! Agent factory table and the integration registry built on top of it.
//!
//! The advertised [`dojo_menu::Menu`] and the [`FactoryTable`] are authored
//! independently. [`IntegrationRegistry`] refuses to start when an advertised
//! integration has no factory, and rejects builds that do not deliver every
//! advertised feature.

#![warn(missing_docs, clippy::pedantic)]

pub mod consistency;
mod error;
mod factory;
pub mod integrations;
mod registry;

pub use consistency::{ConsistencyError, ConsistencyReport, Undeclared, Violation};
pub use error::{RegistryError, RegistryResult};
pub use factory::{AgentFactory, FactoryTable, FeatureAgents, map_agents};
pub use integrations::default_factory_table;
pub use registry::IntegrationRegistry;
