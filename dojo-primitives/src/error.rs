//! Shared error definitions for registry primitives.

use thiserror::Error;

/// Result alias used throughout the registry primitives.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while handling features and menu descriptors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The supplied tag is not part of the feature vocabulary.
    #[error("unknown feature `{feature}`")]
    UnknownFeature {
        /// The unrecognised tag.
        feature: String,
    },

    /// Integration identifier failed validation.
    #[error("invalid integration id `{id}`: {reason}")]
    InvalidIntegrationId {
        /// The offending identifier string.
        id: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Integration descriptor failed validation.
    #[error("invalid integration `{id}`: {reason}")]
    InvalidIntegration {
        /// Identifier of the offending descriptor.
        id: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Two menu descriptors share the same identifier.
    #[error("integration `{id}` is declared more than once")]
    DuplicateIntegration {
        /// The repeated identifier.
        id: String,
    },
}
