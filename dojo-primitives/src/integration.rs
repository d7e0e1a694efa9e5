//! Static descriptor advertised for each integration in the menu.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::feature::Feature;

const MAX_ID_LEN: usize = 64;

/// Describes one integration and the features it advertises.
///
/// Descriptors are process-lifetime constants: they are declared in a static
/// slice and only ever read.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct MenuIntegration {
    id: &'static str,
    name: &'static str,
    features: &'static [Feature],
}

impl MenuIntegration {
    /// Declares a descriptor. Use [`MenuIntegration::validate`] to check it.
    #[must_use]
    pub const fn new(id: &'static str, name: &'static str, features: &'static [Feature]) -> Self {
        Self { id, name, features }
    }

    /// Returns the unique integration identifier.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.id
    }

    /// Returns the human-readable display name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the advertised features in declaration order.
    #[must_use]
    pub const fn features(&self) -> &'static [Feature] {
        self.features
    }

    /// Returns `true` when `feature` is one of the advertised tags.
    ///
    /// Tags outside the vocabulary are simply not supported.
    #[must_use]
    pub fn supports(&self, feature: &str) -> bool {
        self.features.iter().any(|declared| declared.as_str() == feature)
    }

    /// Checks the descriptor's own invariants.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIntegrationId`] for a malformed id and
    /// [`Error::InvalidIntegration`] when the name is blank or a feature is
    /// declared twice.
    pub fn validate(&self) -> Result<()> {
        validate_integration_id(self.id)?;

        if self.name.trim().is_empty() {
            return Err(Error::InvalidIntegration {
                id: self.id.into(),
                reason: "display name cannot be empty".into(),
            });
        }

        for (index, feature) in self.features.iter().enumerate() {
            if self.features[..index].contains(feature) {
                return Err(Error::InvalidIntegration {
                    id: self.id.into(),
                    reason: format!("feature `{feature}` is declared more than once"),
                });
            }
        }

        Ok(())
    }
}

/// Validates the format of an integration identifier.
///
/// # Errors
///
/// Returns [`Error::InvalidIntegrationId`] if the identifier is empty, too
/// long, or contains characters other than lowercase alphanumerics, dash,
/// underscore, or dot.
pub fn validate_integration_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::InvalidIntegrationId {
            id: String::new(),
            reason: "identifier cannot be empty".into(),
        });
    }

    if id.len() > MAX_ID_LEN {
        return Err(Error::InvalidIntegrationId {
            id: id.into(),
            reason: format!("identifier length must be <= {MAX_ID_LEN}"),
        });
    }

    if !id
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-' | '_' | '.'))
    {
        return Err(Error::InvalidIntegrationId {
            id: id.into(),
            reason: "identifier must contain lowercase alphanumeric, dash, underscore, or dot"
                .into(),
        });
    }

    Ok(())
}
