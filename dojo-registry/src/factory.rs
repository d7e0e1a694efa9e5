//! Feature-keyed agent maps and the factories that produce them.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use dojo_agents::{AgentClient, AgentResult};
use dojo_primitives::{Feature, validate_integration_id};

use crate::error::{RegistryError, RegistryResult};

/// Agents produced by one factory invocation, keyed by feature tag.
///
/// Keys are plain strings so remotely discovered agent names fit as well as
/// [`Feature`] tags. One client may back several keys.
#[derive(Clone, Default)]
pub struct FeatureAgents {
    agents: BTreeMap<String, Arc<dyn AgentClient>>,
}

impl FeatureAgents {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `agent` to `feature`, returning the agent previously bound.
    pub fn insert(
        &mut self,
        feature: impl Into<String>,
        agent: Arc<dyn AgentClient>,
    ) -> Option<Arc<dyn AgentClient>> {
        self.agents.insert(feature.into(), agent)
    }

    /// Builder-style variant of [`FeatureAgents::insert`].
    #[must_use]
    pub fn with(mut self, feature: impl Into<String>, agent: Arc<dyn AgentClient>) -> Self {
        self.insert(feature, agent);
        self
    }

    /// Returns the agent bound to `feature`.
    #[must_use]
    pub fn get(&self, feature: &str) -> Option<&Arc<dyn AgentClient>> {
        self.agents.get(feature)
    }

    /// Returns whether `feature` is bound.
    #[must_use]
    pub fn contains(&self, feature: &str) -> bool {
        self.agents.contains_key(feature)
    }

    /// Iterates over the bound feature tags in sorted order.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(String::as_str)
    }

    /// Iterates over `(feature, agent)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn AgentClient>)> {
        self.agents
            .iter()
            .map(|(feature, agent)| (feature.as_str(), agent))
    }

    /// Returns the number of bound features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Returns whether no feature is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Removes and returns the agent bound to `feature`.
    pub fn remove(&mut self, feature: &str) -> Option<Arc<dyn AgentClient>> {
        self.agents.remove(feature)
    }
}

impl fmt::Debug for FeatureAgents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.agents
                    .iter()
                    .map(|(feature, agent)| (feature, agent.metadata().framework())),
            )
            .finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Arc<dyn AgentClient>)> for FeatureAgents {
    fn from_iter<I: IntoIterator<Item = (K, Arc<dyn AgentClient>)>>(iter: I) -> Self {
        Self {
            agents: iter
                .into_iter()
                .map(|(feature, agent)| (feature.into(), agent))
                .collect(),
        }
    }
}

impl<K: Into<String>> Extend<(K, Arc<dyn AgentClient>)> for FeatureAgents {
    fn extend<I: IntoIterator<Item = (K, Arc<dyn AgentClient>)>>(&mut self, iter: I) {
        self.agents.extend(
            iter.into_iter()
                .map(|(feature, agent)| (feature.into(), agent)),
        );
    }
}

/// Builds a feature map by applying `build` to the path of every entry.
///
/// Keys are the feature tags, carried over unchanged. Client constructors do
/// not touch the network, so this never fails; a bad path or base URL only
/// shows up when the affected agent is first run.
pub fn map_agents<F, A>(build: F, mapping: &[(Feature, &str)]) -> FeatureAgents
where
    F: Fn(&str) -> A,
    A: AgentClient + 'static,
{
    mapping
        .iter()
        .map(|(feature, path)| {
            let agent: Arc<dyn AgentClient> = Arc::new(build(path));
            (feature.as_str(), agent)
        })
        .collect()
}

/// Produces the agents of one integration on demand.
#[async_trait]
pub trait AgentFactory: Send + Sync {
    /// Constructs the feature map. May perform I/O such as remote discovery.
    async fn build(&self) -> AgentResult<FeatureAgents>;
}

#[async_trait]
impl<F, Fut> AgentFactory for F
where
    F: Send + Sync + Fn() -> Fut,
    Fut: Future<Output = AgentResult<FeatureAgents>> + Send,
{
    async fn build(&self) -> AgentResult<FeatureAgents> {
        (self)().await
    }
}

/// Table of agent factories keyed by integration identifier.
///
/// May hold identifiers the menu does not advertise.
#[derive(Clone, Default)]
pub struct FactoryTable {
    factories: BTreeMap<String, Arc<dyn AgentFactory>>,
}

impl FactoryTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidIdentifier`] for a malformed id and
    /// [`RegistryError::DuplicateIntegration`] if `id` is already taken.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> RegistryResult<()>
    where
        F: AgentFactory + 'static,
    {
        let id = id.into();
        validate_integration_id(&id)?;

        match self.factories.entry(id) {
            Entry::Occupied(entry) => Err(RegistryError::DuplicateIntegration {
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(factory));
                Ok(())
            }
        }
    }

    /// Returns the factory registered under `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<dyn AgentFactory>> {
        self.factories.get(id).cloned()
    }

    /// Returns whether a factory is registered under `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Iterates over registered identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Returns the number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for FactoryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}
