//! Checks that the advertised menu and the factory table agree.
//!
//! Coverage (every advertised id has a factory) is checked synchronously.
//! Feature delivery can only be checked by invoking the factories, which
//! [`verify_all`] does once per advertised integration.

use dojo_menu::Menu;
use dojo_primitives::{Feature, MenuIntegration};
use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::factory::{FactoryTable, FeatureAgents};

/// One disagreement between the menu and the factory table.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A menu descriptor breaks a descriptor invariant.
    #[error("invalid menu: {reason}")]
    InvalidMenu {
        /// Description of the broken invariant.
        reason: String,
    },

    /// An advertised integration has no factory.
    #[error("integration `{integration}` is advertised but has no factory")]
    MissingFactory {
        /// Integration identifier.
        integration: String,
    },

    /// A factory does not produce every advertised feature.
    #[error("integration `{integration}` does not provide {}", feature_list(.missing))]
    MissingFeatures {
        /// Integration identifier.
        integration: String,
        /// Advertised features absent from the built map.
        missing: Vec<Feature>,
    },

    /// A factory failed while being verified.
    #[error("integration `{integration}` failed to build: {reason}")]
    BuildFailed {
        /// Integration identifier.
        integration: String,
        /// Rendered builder error.
        reason: String,
    },
}

impl Violation {
    /// Returns the integration the violation concerns, if any.
    #[must_use]
    pub fn integration(&self) -> Option<&str> {
        match self {
            Self::InvalidMenu { .. } => None,
            Self::MissingFactory { integration }
            | Self::MissingFeatures { integration, .. }
            | Self::BuildFailed { integration, .. } => Some(integration),
        }
    }

    /// Returns the advertised features a factory failed to produce.
    ///
    /// Empty for every violation other than [`Violation::MissingFeatures`].
    #[must_use]
    pub fn missing_features(&self) -> &[Feature] {
        match self {
            Self::MissingFeatures { missing, .. } => missing,
            _ => &[],
        }
    }

    fn log(&self) {
        error!(
            integration = self.integration().unwrap_or("<menu>"),
            violation = %self,
            "menu and factory table disagree"
        );
    }
}

fn feature_list(features: &[Feature]) -> String {
    features
        .iter()
        .map(|feature| feature.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Features a factory produced on top of what the menu advertises.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Undeclared {
    /// Integration identifier.
    pub integration: String,
    /// Extra feature keys, in sorted order.
    pub features: Vec<String>,
}

/// Outcome of a full verification pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    checked: Vec<String>,
    violations: Vec<Violation>,
    undeclared: Vec<Undeclared>,
}

impl ConsistencyReport {
    /// Identifiers whose factories were invoked.
    #[must_use]
    pub fn checked(&self) -> &[String] {
        &self.checked
    }

    /// Every violation found.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Integrations that produced more than they advertise. Not violations.
    #[must_use]
    pub fn undeclared(&self) -> &[Undeclared] {
        &self.undeclared
    }

    /// Returns whether no violation was found.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }

    /// Converts the report into a result.
    ///
    /// # Errors
    ///
    /// Returns a [`ConsistencyError`] carrying every violation.
    pub fn into_result(self) -> Result<(), ConsistencyError> {
        ConsistencyError::check(self.violations)
    }
}

/// The menu and factory table disagree.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{}", summary(.violations))]
pub struct ConsistencyError {
    violations: Vec<Violation>,
}

impl ConsistencyError {
    fn check(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    /// Returns the violations.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the error, returning the violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

fn summary(violations: &[Violation]) -> String {
    let details = violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} consistency violation(s): {details}", violations.len())
}

/// Checks the menu descriptors themselves.
#[must_use]
pub fn check_menu(menu: Menu<'_>) -> Vec<Violation> {
    let violations: Vec<_> = menu
        .validate()
        .err()
        .unwrap_or_default()
        .into_iter()
        .map(|err| Violation::InvalidMenu {
            reason: err.to_string(),
        })
        .collect();
    violations.iter().for_each(Violation::log);
    violations
}

/// Checks that every advertised integration has a factory.
///
/// Factories for identifiers the menu does not list are ignored.
#[must_use]
pub fn check_coverage(menu: Menu<'_>, table: &FactoryTable) -> Vec<Violation> {
    let violations: Vec<_> = menu
        .iter()
        .filter(|integration| !table.contains(integration.id()))
        .map(|integration| Violation::MissingFactory {
            integration: integration.id().to_owned(),
        })
        .collect();
    violations.iter().for_each(Violation::log);
    violations
}

/// Checks that `agents` provides every feature `descriptor` advertises.
///
/// Returns the undeclared extra keys on success, sorted.
///
/// # Errors
///
/// Returns [`Violation::MissingFeatures`] listing the advertised features
/// absent from `agents`, in menu order.
pub fn verify_features(
    descriptor: &MenuIntegration,
    agents: &FeatureAgents,
) -> Result<Vec<String>, Violation> {
    let missing: Vec<Feature> = descriptor
        .features()
        .iter()
        .copied()
        .filter(|feature| !agents.contains(feature.as_str()))
        .collect();

    if !missing.is_empty() {
        let violation = Violation::MissingFeatures {
            integration: descriptor.id().to_owned(),
            missing,
        };
        violation.log();
        return Err(violation);
    }

    let undeclared: Vec<String> = agents
        .features()
        .filter(|feature| !descriptor.supports(feature))
        .map(str::to_owned)
        .collect();
    if !undeclared.is_empty() {
        debug!(
            integration = descriptor.id(),
            features = ?undeclared,
            "factory provides undeclared features"
        );
    }

    Ok(undeclared)
}

/// Validates the menu, checks coverage, and builds every advertised
/// integration once to verify feature delivery.
///
/// Factories run concurrently; results are reported in menu order.
pub async fn verify_all(menu: Menu<'_>, table: &FactoryTable) -> ConsistencyReport {
    let mut report = ConsistencyReport {
        violations: check_menu(menu),
        ..ConsistencyReport::default()
    };
    report.violations.extend(check_coverage(menu, table));

    let builds = menu.iter().filter_map(|descriptor| {
        let factory = table.get(descriptor.id())?;
        Some(async move { (descriptor, factory.build().await) })
    });

    for (descriptor, outcome) in join_all(builds).await {
        report.checked.push(descriptor.id().to_owned());
        match outcome {
            Ok(agents) => match verify_features(descriptor, &agents) {
                Ok(extra) if extra.is_empty() => {}
                Ok(extra) => report.undeclared.push(Undeclared {
                    integration: descriptor.id().to_owned(),
                    features: extra,
                }),
                Err(violation) => report.violations.push(violation),
            },
            Err(err) => {
                let violation = Violation::BuildFailed {
                    integration: descriptor.id().to_owned(),
                    reason: err.to_string(),
                };
                violation.log();
                report.violations.push(violation);
            }
        }
    }

    report
}

pub(crate) fn ensure_startup(menu: Menu<'_>, table: &FactoryTable) -> Result<(), ConsistencyError> {
    let mut violations = check_menu(menu);
    violations.extend(check_coverage(menu, table));
    ConsistencyError::check(violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use dojo_agents::{AgentClient, AgentError, LocalAgent};
    use dojo_primitives::Feature::{AgenticChat, HumanInTheLoop};

    static DRIFTED: &[MenuIntegration] = &[
        MenuIntegration::new("acme", "Acme", &[AgenticChat, HumanInTheLoop]),
        MenuIntegration::new("ghost", "Ghost", &[AgenticChat]),
    ];

    fn local() -> Arc<dyn AgentClient> {
        Arc::new(LocalAgent::middleware_starter())
    }

    #[test]
    fn coverage_reports_missing_factories_only() {
        let mut table = FactoryTable::new();
        table
            .register("acme", || async { Ok::<_, AgentError>(FeatureAgents::new()) })
            .unwrap();
        table
            .register("unlisted", || async { Ok::<_, AgentError>(FeatureAgents::new()) })
            .unwrap();

        let violations = check_coverage(Menu::new(DRIFTED), &table);
        assert_eq!(
            violations,
            [Violation::MissingFactory {
                integration: "ghost".to_owned()
            }]
        );
    }

    #[test]
    fn missing_features_are_listed_in_menu_order() {
        let agents = FeatureAgents::new().with("agentic_chat", local());
        let violation = verify_features(&DRIFTED[0], &agents).expect_err("hitl missing");

        assert_eq!(
            violation,
            Violation::MissingFeatures {
                integration: "acme".to_owned(),
                missing: vec![HumanInTheLoop],
            }
        );
        assert!(violation.to_string().contains("human_in_the_loop"));
        assert_eq!(violation.missing_features(), [HumanInTheLoop]);

        let other = Violation::MissingFactory {
            integration: "acme".to_owned(),
        };
        assert!(other.missing_features().is_empty());
    }

    #[test]
    fn extras_are_reported_not_rejected() {
        let agents = FeatureAgents::new()
            .with("agentic_chat", local())
            .with("human_in_the_loop", local())
            .with("subgraphs", local());

        let extra = verify_features(&DRIFTED[0], &agents).unwrap();
        assert_eq!(extra, ["subgraphs"]);
    }

    #[tokio::test]
    async fn verify_all_collects_every_problem() {
        let mut table = FactoryTable::new();
        table
            .register("acme", || async {
                Ok::<_, AgentError>(FeatureAgents::new().with("agentic_chat", local()))
            })
            .unwrap();

        let report = verify_all(Menu::new(DRIFTED), &table).await;
        assert!(!report.is_consistent());
        assert_eq!(report.checked(), ["acme"]);
        assert_eq!(report.violations().len(), 2);

        let err = report.into_result().expect_err("inconsistent");
        assert!(err.to_string().starts_with("2 consistency violation(s)"));
    }

    #[tokio::test]
    async fn failing_builders_are_recorded() {
        let menu: &'static [MenuIntegration] = &DRIFTED[1..];
        let mut table = FactoryTable::new();
        table
            .register("ghost", || async {
                Err::<FeatureAgents, _>(AgentError::Discovery {
                    reason: "listing unavailable".to_owned(),
                })
            })
            .unwrap();

        let report = verify_all(Menu::new(menu), &table).await;
        assert!(matches!(
            report.violations(),
            [Violation::BuildFailed { integration, .. }] if integration == "ghost"
        ));
    }

    #[test]
    fn report_serializes_with_kind_tags() {
        let report = ConsistencyReport {
            checked: vec!["ghost".to_owned()],
            violations: vec![Violation::MissingFactory {
                integration: "ghost".to_owned(),
            }],
            undeclared: Vec::new(),
        };

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["violations"][0]["kind"], "missing_factory");
        assert_eq!(value["violations"][0]["integration"], "ghost");
    }
}
