//! Registry combining the advertised menu with the factory table.

use std::fmt;
use std::sync::Arc;

use dojo_agents::AgentClient;
use dojo_config::Endpoints;
use dojo_menu::Menu;
use tracing::{debug, info};

use crate::consistency::{self, ConsistencyError, ConsistencyReport};
use crate::error::{RegistryError, RegistryResult};
use crate::factory::{FactoryTable, FeatureAgents};
use crate::integrations::default_factory_table;

/// Validated pairing of a [`Menu`] and a [`FactoryTable`].
///
/// Construction fails unless every advertised integration has a factory.
/// Whether a factory delivers every advertised feature is checked each time
/// it is built.
#[derive(Clone)]
pub struct IntegrationRegistry {
    menu: Menu<'static>,
    factories: FactoryTable,
}

impl fmt::Debug for IntegrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationRegistry")
            .field("integrations", &self.menu.len())
            .field("factories", &self.factories)
            .finish()
    }
}

impl IntegrationRegistry {
    /// Pairs `menu` with `factories` after validating both.
    ///
    /// # Errors
    ///
    /// Returns a [`ConsistencyError`] listing every invalid descriptor and
    /// every advertised integration without a factory.
    pub fn new(menu: Menu<'static>, factories: FactoryTable) -> Result<Self, ConsistencyError> {
        consistency::ensure_startup(menu, &factories)?;
        info!(
            integrations = menu.len(),
            factories = factories.len(),
            "integration registry ready"
        );
        Ok(Self { menu, factories })
    }

    /// Registry over the shipped catalogue and integration factories.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Inconsistent`] if the catalogue and the
    /// shipped factories disagree.
    pub fn with_defaults(endpoints: &Endpoints) -> RegistryResult<Self> {
        let factories = default_factory_table(endpoints)?;
        Ok(Self::new(Menu::catalogue(), factories)?)
    }

    /// Returns the advertised menu.
    #[must_use]
    pub const fn menu(&self) -> Menu<'static> {
        self.menu
    }

    /// Returns the factory table.
    #[must_use]
    pub const fn factories(&self) -> &FactoryTable {
        &self.factories
    }

    /// Invokes the factory of `id`.
    ///
    /// Advertised integrations must deliver every feature the menu lists;
    /// unlisted ones are returned as built.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownIntegration`] if no factory exists,
    /// [`RegistryError::Build`] if the factory fails, and
    /// [`RegistryError::Misconfigured`] if advertised features are missing.
    pub async fn build(&self, id: &str) -> RegistryResult<FeatureAgents> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| RegistryError::UnknownIntegration { id: id.to_owned() })?;

        let agents = factory.build().await.map_err(|source| RegistryError::Build {
            integration: id.to_owned(),
            source,
        })?;

        match self.menu.get_integration(id) {
            Some(descriptor) => {
                consistency::verify_features(descriptor, &agents).map_err(|violation| {
                    RegistryError::Misconfigured {
                        integration: id.to_owned(),
                        missing: violation
                            .missing_features()
                            .iter()
                            .map(ToString::to_string)
                            .collect(),
                    }
                })?;
                Ok(agents)
            }
            None => {
                debug!(integration = id, "built unlisted integration");
                Ok(agents)
            }
        }
    }

    /// Resolves the agent serving `feature` of integration `id`.
    ///
    /// For advertised integrations the menu is consulted first, so an
    /// unadvertised feature is rejected without invoking the factory.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownIntegration`],
    /// [`RegistryError::FeatureUnavailable`], or any error of
    /// [`IntegrationRegistry::build`].
    pub async fn agent_for(&self, id: &str, feature: &str) -> RegistryResult<Arc<dyn AgentClient>> {
        let listed = match self.menu.get_integration(id) {
            Some(descriptor) if !descriptor.supports(feature) => {
                return Err(unavailable(id, feature));
            }
            Some(_) => true,
            None if self.factories.contains(id) => false,
            None => {
                return Err(RegistryError::UnknownIntegration { id: id.to_owned() });
            }
        };

        let mut agents = self.build(id).await?;
        match agents.remove(feature) {
            Some(agent) => Ok(agent),
            None if listed => Err(RegistryError::Misconfigured {
                integration: id.to_owned(),
                missing: vec![feature.to_owned()],
            }),
            None => Err(unavailable(id, feature)),
        }
    }

    /// Builds every advertised integration once and reports any drift.
    pub async fn verify_all(&self) -> ConsistencyReport {
        consistency::verify_all(self.menu, &self.factories).await
    }
}

fn unavailable(id: &str, feature: &str) -> RegistryError {
    RegistryError::FeatureUnavailable {
        integration: id.to_owned(),
        feature: feature.to_owned(),
    }
}
