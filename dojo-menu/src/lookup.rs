//! Read-only queries over a menu of integration descriptors.

use std::collections::BTreeSet;

use dojo_primitives::{Error, MenuIntegration};

use crate::catalogue::MENU_INTEGRATIONS;

/// Ordered view over a slice of integration descriptors.
///
/// All queries are linear scans; the catalogue holds tens of entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Menu<'a> {
    integrations: &'a [MenuIntegration],
}

impl Menu<'static> {
    /// Returns the advertised catalogue.
    #[must_use]
    pub fn catalogue() -> Self {
        Self::new(MENU_INTEGRATIONS)
    }
}

impl Default for Menu<'static> {
    fn default() -> Self {
        Self::catalogue()
    }
}

impl<'a> Menu<'a> {
    /// Wraps an arbitrary descriptor slice.
    #[must_use]
    pub const fn new(integrations: &'a [MenuIntegration]) -> Self {
        Self { integrations }
    }

    /// Iterates descriptors in display order.
    pub fn iter(&self) -> impl Iterator<Item = &'a MenuIntegration> + use<'a> {
        self.integrations.iter()
    }

    /// Returns the descriptors in display order.
    #[must_use]
    pub const fn integrations(&self) -> &'a [MenuIntegration] {
        self.integrations
    }

    /// Returns the number of advertised integrations.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.integrations.len()
    }

    /// Returns `true` when nothing is advertised.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.integrations.is_empty()
    }

    /// Returns whether `id` names an advertised integration.
    #[must_use]
    pub fn is_integration_valid(&self, id: &str) -> bool {
        self.integrations.iter().any(|integration| integration.id() == id)
    }

    /// Returns whether `id` is advertised and declares `feature`.
    ///
    /// Unknown integrations and unknown feature tags both yield `false`.
    #[must_use]
    pub fn is_feature_available(&self, id: &str, feature: &str) -> bool {
        self.get_integration(id)
            .is_some_and(|integration| integration.supports(feature))
    }

    /// Returns the descriptor for `id`, if advertised.
    #[must_use]
    pub fn get_integration(&self, id: &str) -> Option<&'a MenuIntegration> {
        self.integrations.iter().find(|integration| integration.id() == id)
    }

    /// Checks every descriptor and the uniqueness of identifiers.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in menu order.
    pub fn validate(&self) -> Result<(), Vec<Error>> {
        let mut seen = BTreeSet::new();
        let mut problems = Vec::new();

        for integration in self.integrations {
            if let Err(err) = integration.validate() {
                problems.push(err);
            }
            if !seen.insert(integration.id()) {
                problems.push(Error::DuplicateIntegration {
                    id: integration.id().into(),
                });
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

impl<'a> IntoIterator for &Menu<'a> {
    type Item = &'a MenuIntegration;
    type IntoIter = std::slice::Iter<'a, MenuIntegration>;

    fn into_iter(self) -> Self::IntoIter {
        self.integrations.iter()
    }
}

impl<'a> IntoIterator for Menu<'a> {
    type Item = &'a MenuIntegration;
    type IntoIter = std::slice::Iter<'a, MenuIntegration>;

    fn into_iter(self) -> Self::IntoIter {
        self.integrations.iter()
    }
}

/// Returns whether `id` names an integration in the advertised catalogue.
#[must_use]
pub fn is_integration_valid(id: &str) -> bool {
    Menu::catalogue().is_integration_valid(id)
}

/// Returns whether the catalogued integration `id` declares `feature`.
#[must_use]
pub fn is_feature_available(id: &str, feature: &str) -> bool {
    Menu::catalogue().is_feature_available(id, feature)
}

/// Returns the catalogue descriptor for `id`, if any.
#[must_use]
pub fn get_integration(id: &str) -> Option<&'static MenuIntegration> {
    Menu::catalogue().get_integration(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    use dojo_primitives::Feature;

    #[test]
    fn catalogue_is_valid() {
        Menu::catalogue().validate().expect("catalogue invariants");
    }

    #[test]
    fn every_descriptor_is_discoverable() {
        for integration in Menu::catalogue() {
            assert!(is_integration_valid(integration.id()));
            assert_eq!(get_integration(integration.id()), Some(integration));
        }
    }

    #[test]
    fn declared_features_are_available_and_others_are_not() {
        for integration in Menu::catalogue() {
            for feature in Feature::ALL {
                let declared = integration.features().contains(&feature);
                assert_eq!(
                    is_feature_available(integration.id(), feature.as_str()),
                    declared,
                    "{} / {feature}",
                    integration.id()
                );
            }
        }
    }

    #[test]
    fn unknown_ids_are_not_errors() {
        assert!(!is_integration_valid("nonexistent-id"));
        assert!(!is_feature_available("nonexistent-id", "agentic_chat"));
        assert!(get_integration("nonexistent-id").is_none());
    }

    #[test]
    fn unknown_feature_tag_is_unavailable() {
        assert!(!is_feature_available("langgraph", "time_travel"));
        assert!(!is_feature_available("langgraph", ""));
    }

    #[test]
    fn middleware_starter_scenario() {
        assert!(is_integration_valid("middleware-starter"));
        assert!(is_feature_available("middleware-starter", "agentic_chat"));
        assert!(!is_feature_available("middleware-starter", "human_in_the_loop"));
    }

    #[test]
    fn unlisted_integrations_are_not_discoverable() {
        assert!(!is_integration_valid("langchain"));
        assert!(!is_integration_valid("vercel-ai-sdk"));
    }

    #[test]
    fn lookups_are_idempotent() {
        let first = (
            is_integration_valid("agno"),
            is_feature_available("agno", "shared_state"),
            get_integration("agno").copied(),
        );
        let second = (
            is_integration_valid("agno"),
            is_feature_available("agno", "shared_state"),
            get_integration("agno").copied(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn display_order_is_preserved() {
        let ids: Vec<_> = Menu::catalogue().iter().map(MenuIntegration::id).collect();
        assert_eq!(ids.first(), Some(&"agent-spec-langgraph"));
        assert_eq!(ids.last(), Some(&"aws-strands"));
        assert_eq!(ids.len(), 21);
    }

    #[test]
    fn validate_reports_duplicates_and_bad_descriptors() {
        static BROKEN: &[MenuIntegration] = &[
            MenuIntegration::new("twice", "Twice", &[Feature::AgenticChat]),
            MenuIntegration::new("twice", "Twice Again", &[Feature::SharedState]),
            MenuIntegration::new("Bad Id", "Bad", &[]),
        ];

        let problems = Menu::new(BROKEN).validate().expect_err("broken menu");
        assert_eq!(problems.len(), 2);
        assert!(problems.contains(&Error::DuplicateIntegration { id: "twice".into() }));
        assert!(
            problems
                .iter()
                .any(|err| matches!(err, Error::InvalidIntegrationId { id, .. } if id == "Bad Id"))
        );
    }
}
