use std::sync::Arc;

use dojo_agents::{AgentClient, AgentError, LocalAgent, RunAgentInput};
use dojo_config::Endpoints;
use dojo_menu::{Menu, is_feature_available, is_integration_valid};
use dojo_primitives::Feature::{AgenticChat, HumanInTheLoop};
use dojo_primitives::MenuIntegration;
use dojo_registry::{
    FactoryTable, FeatureAgents, IntegrationRegistry, RegistryError, Violation,
    default_factory_table,
};
use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Every backend points at one mock server that answers Mastra discovery.
///
/// The server must outlive the registry built from the endpoints.
async fn stubbed_endpoints() -> (MockServer, Endpoints) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "agentic_chat": {},
            "backend_tool_rendering": {},
            "human_in_the_loop": {},
            "tool_based_generative_ui": {},
        })))
        .mount(&server)
        .await;

    let endpoints = Endpoints::uniform(server.uri());
    (server, endpoints)
}

#[tokio::test]
async fn default_registry_is_consistent() {
    let (_server, endpoints) = stubbed_endpoints().await;
    let registry = IntegrationRegistry::with_defaults(&endpoints).expect("default registry");

    let report = registry.verify_all().await;
    assert!(report.is_consistent(), "{:?}", report.violations());
    assert_eq!(report.checked().len(), Menu::catalogue().len());

    let extras: Vec<_> = report
        .undeclared()
        .iter()
        .map(|entry| (entry.integration.as_str(), entry.features.clone()))
        .collect();
    assert!(extras.contains(&("langgraph", vec!["agentic_chat_reasoning".to_owned()])));
    assert!(extras.contains(&("adk-middleware", vec!["agentic_generative_ui".to_owned()])));
}

#[tokio::test]
async fn every_advertised_pair_resolves() {
    let (_server, endpoints) = stubbed_endpoints().await;
    let registry = IntegrationRegistry::with_defaults(&endpoints).expect("default registry");

    for integration in registry.menu() {
        for feature in integration.features() {
            assert!(is_feature_available(integration.id(), feature.as_str()));
            let agent = registry.agent_for(integration.id(), feature.as_str()).await;
            assert!(agent.is_ok(), "{} / {feature}", integration.id());
        }
    }
}

#[tokio::test]
async fn middleware_starter_answers_locally() {
    let registry = IntegrationRegistry::with_defaults(&Endpoints::default()).expect("registry");
    assert!(is_integration_valid("middleware-starter"));
    assert!(!is_feature_available("middleware-starter", "human_in_the_loop"));

    let agent = registry
        .agent_for("middleware-starter", "agentic_chat")
        .await
        .expect("agent");
    let events: Vec<_> = agent
        .run(RunAgentInput::new("thread", "run").expect("input"))
        .await
        .expect("stream")
        .map(|event| event.expect("event"))
        .collect()
        .await;

    assert!(events.iter().any(|event| event.as_value()["delta"] == "Hello world!"));
}

#[tokio::test]
async fn langchain_is_buildable_but_not_advertised() {
    let registry = IntegrationRegistry::with_defaults(&Endpoints::default()).expect("registry");
    assert!(!is_integration_valid("langchain"));
    assert!(registry.menu().get_integration("langchain").is_none());

    let agents = registry.build("langchain").await.expect("unlisted build");
    assert_eq!(agents.len(), 2);
    assert!(registry
        .agent_for("langchain", "tool_based_generative_ui")
        .await
        .is_ok());
}

#[tokio::test]
async fn unreachable_mastra_is_a_build_error() {
    let endpoints = Endpoints {
        mastra_url: "http://127.0.0.1:1".to_owned(),
        ..Endpoints::default()
    };
    let registry = IntegrationRegistry::with_defaults(&endpoints).expect("registry");

    let err = registry.agent_for("mastra", "agentic_chat").await.err().expect("no server");
    assert!(matches!(
        err,
        RegistryError::Build {
            source: AgentError::Transport { .. },
            ..
        }
    ));

    let report = registry.verify_all().await;
    assert!(matches!(
        report.violations(),
        [Violation::BuildFailed { integration, .. }] if integration == "mastra"
    ));
}

static DRIFTED: &[MenuIntegration] = &[MenuIntegration::new(
    "acme",
    "Acme",
    &[AgenticChat, HumanInTheLoop],
)];

#[tokio::test]
async fn drifted_builder_is_misconfigured() {
    let mut table = FactoryTable::new();
    table
        .register("acme", || async {
            let agent: Arc<dyn AgentClient> = Arc::new(LocalAgent::middleware_starter());
            Ok::<_, AgentError>(FeatureAgents::new().with("agentic_chat", agent))
        })
        .expect("register");
    let registry = IntegrationRegistry::new(Menu::new(DRIFTED), table).expect("coverage holds");

    let err = registry.build("acme").await.err().expect("drift");
    assert!(matches!(err, RegistryError::Misconfigured { integration, .. } if integration == "acme"));
    assert!(!registry.verify_all().await.is_consistent());
}

#[test]
fn missing_factory_fails_fast() {
    let table = default_factory_table(&Endpoints::default()).expect("defaults");
    let mut trimmed = FactoryTable::new();
    for id in table.ids().filter(|id| *id != "agno") {
        let factory = table.get(id).expect("factory");
        trimmed
            .register(id, move || {
                let factory = Arc::clone(&factory);
                async move { factory.build().await }
            })
            .expect("register");
    }

    let err = IntegrationRegistry::new(Menu::catalogue(), trimmed).expect_err("agno missing");
    assert_eq!(
        err.violations(),
        [Violation::MissingFactory {
            integration: "agno".to_owned()
        }]
    );
}
