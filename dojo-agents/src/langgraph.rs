//! LangGraph platform agent addressed by deployment URL and graph id.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Request};
use serde::Serialize;

use crate::http_client::{DEFAULT_TIMEOUT, Endpoint, HyperClient, build_https_client, open_stream};
use crate::sse;
use crate::traits::{
    AgentClient, AgentError, AgentMetadata, AgentResult, AgentStream, Message, RunAgentInput,
};

/// Agent that runs one graph of a LangGraph deployment.
///
/// Upstream stream frames are forwarded as `RAW` events between the run
/// lifecycle events.
pub struct LangGraphAgent {
    client: HyperClient,
    endpoint: Endpoint,
    graph_id: String,
    metadata: AgentMetadata,
    timeout: Duration,
}

impl fmt::Debug for LangGraphAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LangGraphAgent")
            .field("endpoint", &self.endpoint.as_str())
            .field("graph_id", &self.graph_id)
            .finish_non_exhaustive()
    }
}

impl LangGraphAgent {
    /// Creates an agent for `graph_id` on the deployment at `deployment_url`.
    #[must_use]
    pub fn new(deployment_url: impl AsRef<str>, graph_id: impl Into<String>) -> Self {
        let endpoint = Endpoint::parse(format!(
            "{}/runs/stream",
            deployment_url.as_ref().trim_end_matches('/')
        ));
        let metadata = AgentMetadata::remote("langgraph", endpoint.as_str());

        Self {
            client: build_https_client(),
            endpoint,
            graph_id: graph_id.into(),
            metadata,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides how long a run may wait for the response headers and for
    /// each streamed chunk.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the graph this agent runs.
    #[must_use]
    pub fn graph_id(&self) -> &str {
        &self.graph_id
    }

    fn build_payload<'a>(&'a self, input: &'a RunAgentInput) -> RunStreamRequest<'a> {
        RunStreamRequest {
            assistant_id: &self.graph_id,
            thread_id: input.thread_id(),
            input: GraphInput {
                messages: input.messages(),
                state: input.state(),
            },
            stream_mode: "events",
        }
    }
}

#[async_trait]
impl AgentClient for LangGraphAgent {
    fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream> {
        let uri = self.endpoint.uri()?;
        let body = serde_json::to_vec(&self.build_payload(&input)).map_err(|err| {
            AgentError::invalid_input(format!("failed to encode LangGraph request: {err}"))
        })?;

        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(Body::from(body))
            .map_err(|err| {
                AgentError::configuration(format!("failed to build LangGraph request: {err}"))
            })?;

        let body = open_stream(&self.client, request, self.timeout, "LangGraph").await?;
        let frames = sse::frames(body, self.timeout, "LangGraph");
        Ok(sse::bracket_raw(&input, "langgraph", frames))
    }
}

#[derive(Debug, Serialize)]
struct RunStreamRequest<'a> {
    assistant_id: &'a str,
    thread_id: &'a str,
    input: GraphInput<'a>,
    stream_mode: &'static str,
}

#[derive(Debug, Serialize)]
struct GraphInput<'a> {
    messages: &'a [Message],
    state: &'a serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::StreamExt;
    use serde_json::json;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer};

    use crate::test_support::sse_response;
    use crate::traits::{AgentEvent, Role};

    #[test]
    fn endpoint_is_derived_from_deployment() {
        let agent = LangGraphAgent::new("http://localhost:2024/", "agentic_chat");
        assert_eq!(
            agent.metadata().endpoint(),
            Some("http://localhost:2024/runs/stream")
        );
        assert_eq!(agent.graph_id(), "agentic_chat");
    }

    #[test]
    fn payload_targets_the_graph() {
        let agent = LangGraphAgent::new("http://localhost:2024", "subgraphs");
        let input = RunAgentInput::new("t", "r")
            .unwrap()
            .with_messages(vec![Message::new("1", Role::User, "go")]);

        let payload = serde_json::to_value(agent.build_payload(&input)).unwrap();
        assert_eq!(payload["assistant_id"], "subgraphs");
        assert_eq!(payload["thread_id"], "t");
        assert_eq!(payload["input"]["messages"][0]["content"], "go");
    }

    #[tokio::test]
    async fn upstream_frames_become_raw_events() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/runs/stream"))
            .respond_with(sse_response(&[json!({ "event": "on_chat_model_stream" })]))
            .expect(1)
            .mount(&server)
            .await;
        let agent = LangGraphAgent::new(server.uri(), "agentic_chat");

        let events: Vec<AgentEvent> = agent
            .run(RunAgentInput::new("t", "r").unwrap())
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;

        let types: Vec<_> = events.iter().map(AgentEvent::event_type).collect();
        assert_eq!(types, ["RUN_STARTED", "RAW", "RUN_FINISHED"]);

        let requests = server.received_requests().await.expect("recording enabled");
        let sent: serde_json::Value = requests[0].body_json().unwrap();
        assert_eq!(sent["assistant_id"], "agentic_chat");
        assert_eq!(sent["stream_mode"], "events");
    }
}
