//! Agent-to-agent (A2A) clients: a direct agent over a shared JSON-RPC client
//! and a middleware agent that orchestrates several remote A2A agents.

use std::sync::Arc;
use std::{fmt, time::Duration};

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Request};
use serde_json::{Map, Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::http_agent::HttpAgent;
use crate::http_client::{DEFAULT_TIMEOUT, Endpoint, HyperClient, build_https_client, open_stream};
use crate::sse;
use crate::traits::{
    AgentClient, AgentError, AgentMetadata, AgentResult, AgentStream, Message, Role,
    RunAgentInput,
};

/// JSON-RPC client for a single A2A server.
///
/// Several agents may be derived from one client; it carries no per-run
/// state.
pub struct A2AClient {
    client: HyperClient,
    endpoint: Endpoint,
    timeout: Duration,
}

impl fmt::Debug for A2AClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("A2AClient")
            .field("url", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl A2AClient {
    /// Creates a client for the A2A server at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: build_https_client(),
            endpoint: Endpoint::parse(url),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Returns the server URL.
    #[must_use]
    pub fn url(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Sends `text` as a user message and streams back the JSON-RPC results.
    ///
    /// A JSON-RPC error frame is yielded as [`AgentError::Response`] and ends
    /// the stream.
    ///
    /// # Errors
    ///
    /// Returns transport and configuration errors from the HTTP layer when
    /// the stream cannot be opened.
    pub async fn send_message_stream(
        &self,
        text: &str,
        context_id: &str,
    ) -> AgentResult<BoxStream<'static, AgentResult<Value>>> {
        let uri = self.endpoint.uri()?;
        let body = serde_json::to_vec(&message_stream_request(text, context_id)).map_err(|err| {
            AgentError::invalid_input(format!("failed to encode A2A request: {err}"))
        })?;

        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream")
            .body(Body::from(body))
            .map_err(|err| {
                AgentError::configuration(format!("failed to build A2A request: {err}"))
            })?;

        let body = open_stream(&self.client, request, self.timeout, "A2A").await?;
        Ok(sse::frames(body, self.timeout, "A2A")
            .map(|frame| frame.and_then(unwrap_rpc_result))
            .boxed())
    }
}

fn message_stream_request(text: &str, context_id: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": Uuid::new_v4().to_string(),
        "method": "message/stream",
        "params": {
            "message": {
                "kind": "message",
                "messageId": Uuid::new_v4().to_string(),
                "role": "user",
                "parts": [{ "kind": "text", "text": text }],
                "contextId": context_id,
            }
        }
    })
}

fn unwrap_rpc_result(mut frame: Value) -> AgentResult<Value> {
    if let Some(error) = frame.get("error") {
        return Err(AgentError::response(format!("A2A error: {error}")));
    }
    frame
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| AgentError::response("A2A frame carries neither result nor error"))
}

/// Agent that talks to one A2A server directly.
pub struct A2AAgent {
    client: Arc<A2AClient>,
    description: String,
    debug: bool,
    metadata: AgentMetadata,
}

impl fmt::Debug for A2AAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("A2AAgent")
            .field("url", &self.client.url())
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl A2AAgent {
    /// Derives an agent from a shared client.
    #[must_use]
    pub fn new(client: Arc<A2AClient>, description: impl Into<String>) -> Self {
        let metadata = AgentMetadata::remote("a2a", client.url());
        Self {
            client,
            description: description.into(),
            debug: false,
            metadata,
        }
    }

    /// Logs every received result at debug level.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Returns the agent description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns whether result logging is enabled.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }
}

#[async_trait]
impl AgentClient for A2AAgent {
    fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream> {
        let text = input
            .last_user_message()
            .and_then(Message::content)
            .map(str::to_owned)
            .ok_or_else(|| AgentError::invalid_input("A2A runs require a user text message"))?;

        let results = self
            .client
            .send_message_stream(&text, input.thread_id())
            .await?;

        let results = if self.debug {
            let url = self.client.url().to_owned();
            results
                .inspect(move |result| {
                    if let Ok(result) = result {
                        debug!(url = %url, %result, "a2a result");
                    }
                })
                .boxed()
        } else {
            results
        };

        Ok(sse::bracket_raw(&input, "a2a", results))
    }
}

/// Agent that lets an orchestration agent coordinate several A2A agents.
///
/// Each run is delegated to the orchestration agent with the instructions
/// prepended as a system message and the remote agent URLs forwarded under
/// `a2aAgentUrls`.
pub struct A2AMiddlewareAgent {
    description: String,
    agent_urls: Vec<String>,
    orchestration: HttpAgent,
    instructions: String,
    metadata: AgentMetadata,
}

impl fmt::Debug for A2AMiddlewareAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("A2AMiddlewareAgent")
            .field("description", &self.description)
            .field("agent_urls", &self.agent_urls)
            .field("orchestration", &self.orchestration)
            .finish_non_exhaustive()
    }
}

impl A2AMiddlewareAgent {
    /// Identifier of the system message carrying the instructions.
    pub const INSTRUCTIONS_MESSAGE_ID: &'static str = "a2a-middleware-instructions";

    /// Creates a middleware agent.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        agent_urls: Vec<String>,
        orchestration: HttpAgent,
        instructions: impl Into<String>,
    ) -> Self {
        let metadata = AgentMetadata::remote("a2a-middleware", orchestration.url());
        Self {
            description: description.into(),
            agent_urls,
            orchestration,
            instructions: instructions.into(),
            metadata,
        }
    }

    /// Returns the remote agent URLs.
    #[must_use]
    pub fn agent_urls(&self) -> &[String] {
        &self.agent_urls
    }

    /// Returns the middleware description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    fn prepare_input(&self, mut input: RunAgentInput) -> RunAgentInput {
        let instructions = self.instructions.trim();
        if !instructions.is_empty() {
            input.messages_mut().insert(
                0,
                Message::new(Self::INSTRUCTIONS_MESSAGE_ID, Role::System, instructions),
            );
        }

        let urls = Value::from(self.agent_urls.clone());
        let props = input.forwarded_props_mut();
        match props {
            Value::Object(map) => {
                map.insert("a2aAgentUrls".to_owned(), urls);
            }
            other => {
                let mut map = Map::new();
                map.insert("a2aAgentUrls".to_owned(), urls);
                *other = Value::Object(map);
            }
        }

        input
    }
}

#[async_trait]
impl AgentClient for A2AMiddlewareAgent {
    fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream> {
        self.orchestration.run(self.prepare_input(input)).await
    }
}
