//! Error types produced by the registry.

use dojo_agents::AgentError;
use thiserror::Error;

use crate::consistency::ConsistencyError;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced while resolving an agent for an integration.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The identifier is neither advertised nor backed by a factory.
    #[error("unknown integration `{id}`")]
    UnknownIntegration {
        /// Requested identifier.
        id: String,
    },

    /// The integration does not offer the requested feature.
    #[error("integration `{integration}` does not offer feature `{feature}`")]
    FeatureUnavailable {
        /// Integration identifier.
        integration: String,
        /// Requested feature tag.
        feature: String,
    },

    /// The factory did not produce every feature the menu advertises.
    #[error("integration `{integration}` is misconfigured: missing {}", .missing.join(", "))]
    Misconfigured {
        /// Integration identifier.
        integration: String,
        /// Advertised features that were not produced.
        missing: Vec<String>,
    },

    /// The factory itself failed.
    #[error("failed to build agents for `{integration}`")]
    Build {
        /// Integration identifier.
        integration: String,
        /// Underlying client error.
        #[source]
        source: AgentError,
    },

    /// A factory was registered twice under the same identifier.
    #[error("factory for `{id}` is already registered")]
    DuplicateIntegration {
        /// Repeated identifier.
        id: String,
    },

    /// A factory identifier failed validation.
    #[error(transparent)]
    InvalidIdentifier(#[from] dojo_primitives::Error),

    /// The menu and factory table disagree.
    #[error(transparent)]
    Inconsistent(#[from] ConsistencyError),
}
