//! Mastra server client with remote agent discovery.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::{fmt, time::Duration};

use async_trait::async_trait;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Request};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::http_client::{DEFAULT_TIMEOUT, Endpoint, HyperClient, build_https_client, open_stream, send};
use crate::sse;
use crate::traits::{
    AgentClient, AgentError, AgentMetadata, AgentResult, AgentStream, Message, RunAgentInput,
};

/// Connection to a Mastra server, shared by every agent discovered on it.
///
/// Holds no per-run state and may be used concurrently.
pub struct MastraClient {
    client: HyperClient,
    base_url: String,
    timeout: Duration,
}

impl fmt::Debug for MastraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MastraClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl MastraClient {
    /// Creates a client for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: build_https_client(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the timeout of discovery requests and of each wait for a
    /// streamed chunk.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the server base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the agent identifiers registered on the server.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Configuration`] for a malformed base URL,
    /// [`AgentError::Transport`] or [`AgentError::Response`] when the server
    /// cannot be reached, and [`AgentError::Discovery`] when the listing is not
    /// a JSON object keyed by agent id.
    pub async fn list_agents(&self) -> AgentResult<Vec<String>> {
        let uri = Endpoint::parse(format!("{}/api/agents", self.base_url)).uri()?;
        let request = Request::get(uri)
            .header(ACCEPT, "application/json")
            .body(Body::empty())
            .map_err(|err| {
                AgentError::configuration(format!("failed to build Mastra request: {err}"))
            })?;

        let bytes = send(&self.client, request, self.timeout, "Mastra").await?;
        let listing: BTreeMap<String, Value> =
            serde_json::from_slice(&bytes).map_err(|err| AgentError::Discovery {
                reason: format!("unexpected agent listing from {}: {err}", self.base_url),
            })?;

        Ok(listing.into_keys().collect())
    }

    /// Discovers every remote agent and binds a client to each.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`MastraClient::list_agents`].
    pub async fn get_remote_agents(self: &Arc<Self>) -> AgentResult<Vec<(String, MastraAgent)>> {
        let ids = self.list_agents().await?;
        debug!(base_url = %self.base_url, agents = ids.len(), "discovered Mastra agents");

        Ok(ids
            .into_iter()
            .map(|id| {
                let agent = MastraAgent::new(Arc::clone(self), id.clone());
                (id, agent)
            })
            .collect())
    }
}

/// One agent hosted on a Mastra server.
pub struct MastraAgent {
    client: Arc<MastraClient>,
    agent_id: String,
    endpoint: Endpoint,
    metadata: AgentMetadata,
}

impl fmt::Debug for MastraAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MastraAgent")
            .field("agent_id", &self.agent_id)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl MastraAgent {
    /// Binds `agent_id` on the server behind `client`.
    ///
    /// The id is percent-encoded into the stream URL path.
    #[must_use]
    pub fn new(client: Arc<MastraClient>, agent_id: impl Into<String>) -> Self {
        let agent_id = agent_id.into();
        let endpoint = Endpoint::parse(format!(
            "{}/api/agents/{}/stream",
            client.base_url(),
            urlencoding::encode(&agent_id)
        ));
        let metadata = AgentMetadata::remote("mastra", endpoint.as_str());

        Self {
            client,
            agent_id,
            endpoint,
            metadata,
        }
    }

    /// Returns the remote agent identifier.
    #[must_use]
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }
}

#[async_trait]
impl AgentClient for MastraAgent {
    fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream> {
        let uri = self.endpoint.uri()?;
        let payload = StreamRequest {
            messages: input.messages(),
            thread_id: input.thread_id(),
            resource_id: &self.agent_id,
            run_id: input.run_id(),
        };
        let body = serde_json::to_vec(&payload).map_err(|err| {
            AgentError::invalid_input(format!("failed to encode Mastra request: {err}"))
        })?;

        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(Body::from(body))
            .map_err(|err| {
                AgentError::configuration(format!("failed to build Mastra request: {err}"))
            })?;

        let timeout = self.client.timeout;
        let body = open_stream(&self.client.client, request, timeout, "Mastra").await?;
        let frames = sse::frames(body, timeout, "Mastra");
        Ok(sse::bracket_raw(&input, "mastra", frames))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamRequest<'a> {
    messages: &'a [Message],
    thread_id: &'a str,
    resource_id: &'a str,
    run_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::test_support::sse_response;
    use crate::traits::{AgentEvent, Role};

    async fn mastra_backend(listing: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/agents"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(listing))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn discovers_agents_by_listing_keys() {
        let server = mastra_backend(json!({
            "agentic_chat": { "name": "Agentic Chat" },
            "human_in_the_loop": { "name": "HITL" },
        }))
        .await;
        let client = Arc::new(MastraClient::new(format!("{}/", server.uri())));

        let agents = client.get_remote_agents().await.unwrap();
        let ids: Vec<_> = agents.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, ["agentic_chat", "human_in_the_loop"]);
        assert_eq!(agents[0].1.agent_id(), "agentic_chat");
        assert_eq!(
            agents[0].1.metadata().endpoint(),
            Some(format!("{}/api/agents/agentic_chat/stream", server.uri()).as_str())
        );
    }

    #[tokio::test]
    async fn malformed_listing_is_a_discovery_error() {
        let server = mastra_backend(json!([1, 2])).await;
        let client = MastraClient::new(server.uri());

        let err = client.list_agents().await.expect_err("array listing");
        assert!(matches!(err, AgentError::Discovery { .. }));
    }

    #[tokio::test]
    async fn bad_base_url_fails_discovery() {
        let client = MastraClient::new("mastra.local:4111");
        let err = client.list_agents().await.expect_err("missing scheme");
        assert!(matches!(err, AgentError::Configuration { .. }));
    }

    #[test]
    fn agent_ids_are_escaped_in_the_path() {
        let client = Arc::new(MastraClient::new("http://localhost:4111"));
        let agent = MastraAgent::new(client, "weather/agent v2?");

        assert_eq!(agent.agent_id(), "weather/agent v2?");
        assert_eq!(
            agent.metadata().endpoint(),
            Some("http://localhost:4111/api/agents/weather%2Fagent%20v2%3F/stream")
        );
        assert!(agent.endpoint.uri().is_ok());
    }

    #[tokio::test]
    async fn run_streams_from_the_agent_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/agents/agentic_chat/stream"))
            .respond_with(sse_response(&[json!({ "text": "hi" })]))
            .expect(1)
            .mount(&server)
            .await;

        let agent = MastraAgent::new(Arc::new(MastraClient::new(server.uri())), "agentic_chat");
        let input = RunAgentInput::new("t", "r")
            .unwrap()
            .with_messages(vec![Message::new("1", Role::User, "hello")]);
        let events: Vec<AgentEvent> = agent
            .run(input)
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;

        let types: Vec<_> = events.iter().map(AgentEvent::event_type).collect();
        assert_eq!(types, ["RUN_STARTED", "RAW", "RUN_FINISHED"]);

        let requests = server.received_requests().await.expect("recording enabled");
        let sent: Value = requests[0].body_json().unwrap();
        assert_eq!(sent["resourceId"], "agentic_chat");
        assert_eq!(sent["threadId"], "t");
    }
}
