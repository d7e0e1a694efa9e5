//! Agent reached over HTTP that streams events back as server-sent events.
//!
//! Most integrations expose one such endpoint per feature; the framework label
//! only affects metadata and log output.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use futures::StreamExt;
use hyper::header::{ACCEPT, CONTENT_TYPE};
use hyper::{Body, Request};
use tracing::debug;

use crate::http_client::{DEFAULT_TIMEOUT, Endpoint, HyperClient, build_https_client, open_stream};
use crate::sse;
use crate::traits::{
    AgentClient, AgentError, AgentMetadata, AgentResult, AgentStream, RunAgentInput,
};

/// Configuration for an [`HttpAgent`].
#[derive(Clone, Debug)]
pub struct HttpAgentConfig {
    url: String,
    framework: &'static str,
    timeout: Duration,
    headers: Vec<(String, String)>,
    debug: bool,
}

impl HttpAgentConfig {
    /// Creates a configuration targeting `url` with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            framework: "http",
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            debug: false,
        }
    }

    /// Labels the backend framework served at the URL.
    #[must_use]
    pub fn with_framework(mut self, framework: &'static str) -> Self {
        self.framework = framework;
        self
    }

    /// Sets how long a run may wait for the response headers and for each
    /// streamed chunk.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Adds a header sent with every run.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Logs every received event at debug level.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Agent client that posts the run input to a single URL.
pub struct HttpAgent {
    client: HyperClient,
    endpoint: Endpoint,
    metadata: AgentMetadata,
    timeout: Duration,
    headers: Vec<(String, String)>,
    debug: bool,
}

impl fmt::Debug for HttpAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAgent")
            .field("framework", &self.metadata.framework())
            .field("url", &self.endpoint.as_str())
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl HttpAgent {
    /// Constructs an agent from the supplied configuration.
    ///
    /// Never contacts the backend. A malformed URL is reported by the first
    /// call to [`AgentClient::run`].
    #[must_use]
    pub fn new(config: HttpAgentConfig) -> Self {
        let endpoint = Endpoint::parse(config.url);
        let metadata = AgentMetadata::remote(config.framework, endpoint.as_str());

        Self {
            client: build_https_client(),
            endpoint,
            metadata,
            timeout: config.timeout,
            headers: config.headers,
            debug: config.debug,
        }
    }

    /// Shorthand for an agent with default settings.
    #[must_use]
    pub fn for_url(url: impl Into<String>) -> Self {
        Self::new(HttpAgentConfig::new(url))
    }

    /// Returns the configured URL exactly as supplied.
    #[must_use]
    pub fn url(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Returns whether event logging is enabled.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    fn build_request(&self, input: &RunAgentInput) -> AgentResult<Request<Body>> {
        let uri = self.endpoint.uri()?;
        let body = serde_json::to_vec(input).map_err(|err| {
            AgentError::invalid_input(format!("failed to encode run input: {err}"))
        })?;

        let mut builder = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "text/event-stream");
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder.body(Body::from(body)).map_err(|err| {
            AgentError::configuration(format!("failed to build request: {err}"))
        })
    }
}

#[async_trait]
impl AgentClient for HttpAgent {
    fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream> {
        let request = self.build_request(&input)?;
        let framework = self.metadata.framework();
        let body = open_stream(&self.client, request, self.timeout, framework).await?;
        let events = sse::events(sse::frames(body, self.timeout, framework));

        if !self.debug {
            return Ok(events);
        }

        let url = self.url().to_owned();
        Ok(Box::pin(events.inspect(move |event| {
            if let Ok(event) = event {
                debug!(framework, url = %url, event_type = event.event_type(), "agent event");
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::{Value, json};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::test_support::sse_response;
    use crate::traits::{AgentEvent, Message, Role};

    fn input() -> RunAgentInput {
        RunAgentInput::new("thread-1", "run-1")
            .unwrap()
            .with_messages(vec![Message::new("m-1", Role::User, "hello")])
    }

    #[test]
    fn construction_never_fails_for_bad_urls() {
        let agent = HttpAgent::for_url("not a url");
        assert_eq!(agent.url(), "not a url");
        assert!(matches!(
            agent.build_request(&input()),
            Err(AgentError::Configuration { .. })
        ));
    }

    #[test]
    fn request_carries_headers() {
        let agent = HttpAgent::new(
            HttpAgentConfig::new("http://localhost:9000/agentic_chat")
                .with_framework("pydantic-ai")
                .with_header("x-api-key", "secret"),
        );
        let request = agent.build_request(&input()).unwrap();

        assert_eq!(request.uri(), "http://localhost:9000/agentic_chat");
        assert_eq!(request.headers()[ACCEPT], "text/event-stream");
        assert_eq!(request.headers()["x-api-key"], "secret");
        assert_eq!(agent.metadata().framework(), "pydantic-ai");
        assert_eq!(
            agent.metadata().endpoint(),
            Some("http://localhost:9000/agentic_chat")
        );
    }

    #[tokio::test]
    async fn bad_url_fails_on_first_run() {
        let agent = HttpAgent::for_url("ftp://example.com/agent");
        let err = agent.run(input()).await.err().expect("configuration error");
        assert!(matches!(err, AgentError::Configuration { .. }));
    }

    #[tokio::test]
    async fn run_posts_input_and_decodes_events() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/agentic_chat"))
            .and(header("accept", "text/event-stream"))
            .and(header("content-type", "application/json"))
            .respond_with(sse_response(&[
                json!({ "type": "RUN_STARTED", "threadId": "thread-1", "runId": "run-1" }),
                json!({ "type": "TEXT_MESSAGE_CONTENT", "messageId": "a", "delta": "hi" }),
                json!({ "type": "RUN_FINISHED", "threadId": "thread-1", "runId": "run-1" }),
            ]))
            .expect(1)
            .mount(&server)
            .await;

        let agent = HttpAgent::new(
            HttpAgentConfig::new(format!("{}/agentic_chat", server.uri())).with_debug(true),
        );
        let events: Vec<AgentEvent> = agent
            .run(input())
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;

        let types: Vec<_> = events.iter().map(AgentEvent::event_type).collect();
        assert_eq!(types, ["RUN_STARTED", "TEXT_MESSAGE_CONTENT", "RUN_FINISHED"]);

        let requests = server.received_requests().await.expect("recording enabled");
        let body: Value = requests[0].body_json().unwrap();
        assert_eq!(body["threadId"], "thread-1");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[tokio::test]
    async fn tool_call_history_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/human_in_the_loop"))
            .respond_with(sse_response(&[json!({ "type": "RUN_FINISHED" })]))
            .mount(&server)
            .await;

        let call = json!({
            "id": "call-1",
            "type": "function",
            "function": { "name": "generate_task_steps", "arguments": "{}" }
        });
        let input = RunAgentInput::new("t", "r").unwrap().with_messages(vec![
            Message::new("1", Role::User, "plan a trip"),
            Message::assistant_tool_calls("2", vec![call]),
            Message::tool_result("3", "call-1", "approved"),
        ]);

        let agent = HttpAgent::for_url(format!("{}/human_in_the_loop", server.uri()));
        let _events: Vec<_> = agent.run(input).await.unwrap().collect().await;

        let requests = server.received_requests().await.expect("recording enabled");
        let body: Value = requests[0].body_json().unwrap();
        assert_eq!(body["messages"][1]["toolCalls"][0]["id"], "call-1");
        assert_eq!(body["messages"][2]["toolCallId"], "call-1");
        assert_eq!(body["messages"][2]["content"], "approved");
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let agent = HttpAgent::new(
            HttpAgentConfig::new(format!("{}/agentic_chat", server.uri()))
                .with_timeout(Duration::from_millis(100)),
        );
        let err = agent.run(input()).await.err().expect("timeout");
        assert!(matches!(err, AgentError::Transport { reason } if reason.contains("timed out")));
    }

    #[tokio::test]
    async fn error_status_is_a_response_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        let agent = HttpAgent::for_url(format!("{}/agentic_chat", server.uri()));

        let err = agent.run(input()).await.err().expect("server error");
        assert!(matches!(err, AgentError::Response { reason } if reason.contains("boom")));
    }
}
