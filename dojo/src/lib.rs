//! Integration registry for AG-UI agent backends.
//!
//! Bundles the workspace crates behind feature flags. The feature vocabulary
//! and the advertised menu are always available; agent clients, the factory
//! registry, endpoint configuration, and logging setup can be switched off.

#![warn(missing_docs, clippy::pedantic)]

/// Feature vocabulary and menu descriptors.
pub use dojo_primitives as primitives;

/// Advertised catalogue and lookup helpers.
pub use dojo_menu as menu;

/// Backend endpoint configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use dojo_config as config;

/// Agent clients (enabled by `agents` feature).
#[cfg(feature = "agents")]
pub use dojo_agents as agents;

/// Factory table, consistency checks, and registry (enabled by `registry` feature).
#[cfg(feature = "registry")]
pub use dojo_registry as registry;

/// Logging setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use dojo_telemetry as telemetry;

pub use dojo_menu::{MENU_INTEGRATIONS, get_integration, is_feature_available, is_integration_valid};
pub use dojo_primitives::{Feature, MenuIntegration};
