//! Chat-model agent backed by the `OpenAI` chat completions API.

use std::{env, fmt, time::Duration};

use async_trait::async_trait;
use futures::stream;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Request, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::http_client::{DEFAULT_TIMEOUT, Endpoint, HyperClient, build_https_client, send};
use crate::traits::{
    AgentClient, AgentError, AgentEvent, AgentMetadata, AgentResult, AgentStream, Message,
    RunAgentInput,
};

/// Environment variable used when loading configuration automatically.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the [`ChatModelAgent`].
#[derive(Clone, Debug)]
pub struct ChatModelConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    temperature: Option<f32>,
}

impl ChatModelConfig {
    /// Creates a configuration using the supplied model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: "https://api.openai.com/".to_owned(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
        }
    }

    /// Loads the API key from the `OPENAI_API_KEY` environment variable.
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut cfg = Self::new(model);
        cfg.api_key = env::var(OPENAI_API_KEY_ENV).ok();
        cfg
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AgentResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Supplies an explicit API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Agent that answers each run with one chat completion.
///
/// Text replies become a text message; tool calls requested by the model are
/// emitted as tool call events for the frontend tools declared in the input.
pub struct ChatModelAgent {
    client: HyperClient,
    endpoint: Endpoint,
    metadata: AgentMetadata,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    temperature: Option<f32>,
}

impl fmt::Debug for ChatModelAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatModelAgent")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl ChatModelAgent {
    /// Constructs an agent with the provided configuration.
    ///
    /// A missing API key is reported by the first call to
    /// [`AgentClient::run`].
    #[must_use]
    pub fn new(config: ChatModelConfig) -> Self {
        let endpoint = Endpoint::parse(format!("{}v1/chat/completions", config.base_url));
        let metadata = AgentMetadata::remote("langchain", endpoint.as_str());

        Self {
            client: build_https_client(),
            endpoint,
            metadata,
            model: config.model,
            api_key: config.api_key,
            timeout: config.timeout,
            temperature: config.temperature,
        }
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(&'a self, input: &'a RunAgentInput) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: input.messages().iter().map(map_message).collect(),
            tools: input.tools().iter().filter_map(map_tool).collect(),
            temperature: self.temperature,
            stream: false,
        }
    }
}

#[async_trait]
impl AgentClient for ChatModelAgent {
    fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AgentError::configuration("chat model agent requires an API key"))?;
        let uri = self.endpoint.uri()?;

        let body = serde_json::to_vec(&self.build_request(&input)).map_err(|err| {
            AgentError::invalid_input(format!("failed to encode OpenAI request: {err}"))
        })?;

        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .body(Body::from(body))
            .map_err(|err| {
                AgentError::configuration(format!("failed to build OpenAI request: {err}"))
            })?;

        let bytes = send(&self.client, request, self.timeout, "OpenAI").await?;
        let response: ChatCompletionResponse = serde_json::from_slice(&bytes).map_err(|err| {
            AgentError::response(format!("failed to decode OpenAI response: {err}"))
        })?;

        let choice = response
            .choices
            .into_iter()
            .find_map(|choice| choice.message)
            .unwrap_or_default();

        let events = completion_events(&input, choice);
        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}

fn completion_events(input: &RunAgentInput, message: ChoiceMessage) -> Vec<AgentEvent> {
    let message_id = Uuid::new_v4().to_string();
    let mut events = vec![AgentEvent::run_started(input.thread_id(), input.run_id())];

    if let Some(content) = message.content.filter(|content| !content.is_empty()) {
        events.push(AgentEvent::text_message_start(&message_id));
        events.push(AgentEvent::text_message_content(&message_id, &content));
        events.push(AgentEvent::text_message_end(&message_id));
    }

    for call in message.tool_calls {
        events.push(AgentEvent::tool_call_start(
            &call.id,
            &call.function.name,
            &message_id,
        ));
        if !call.function.arguments.is_empty() {
            events.push(AgentEvent::tool_call_args(&call.id, &call.function.arguments));
        }
        events.push(AgentEvent::tool_call_end(&call.id));
    }

    events.push(AgentEvent::run_finished(input.thread_id(), input.run_id()));
    events
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: String,
    content: Option<&'a str>,
    #[serde(skip_serializing_if = "<[Value]>::is_empty")]
    tool_calls: &'a [Value],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    id: String,
    function: ToolFunction,
}

#[derive(Debug, Deserialize)]
struct ToolFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

fn map_message(message: &Message) -> OpenAiMessage<'_> {
    OpenAiMessage {
        role: message.role().to_string(),
        content: message.content(),
        tool_calls: message.tool_calls(),
        tool_call_id: message.tool_call_id(),
    }
}

/// Wraps a frontend tool declaration (`name`, `description`, `parameters`) in
/// the function-tool envelope. Declarations without a name are dropped.
fn map_tool(tool: &Value) -> Option<Value> {
    let name = tool.get("name")?.as_str()?;
    let mut function = serde_json::Map::new();
    function.insert("name".to_owned(), Value::from(name));
    if let Some(description) = tool.get("description") {
        function.insert("description".to_owned(), description.clone());
    }
    if let Some(parameters) = tool.get("parameters") {
        function.insert("parameters".to_owned(), parameters.clone());
    }

    Some(serde_json::json!({ "type": "function", "function": function }))
}

fn sanitize_base_url(input: &str) -> AgentResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AgentError::configuration(
            "OpenAI base URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>()
        .map_err(|err| AgentError::configuration(format!("invalid OpenAI base URL: {err}")))?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    use futures::StreamExt;
    use serde_json::json;

    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::traits::Role;

    fn input() -> RunAgentInput {
        RunAgentInput::new("t", "r")
            .unwrap()
            .with_messages(vec![Message::new("1", Role::User, "change the background")])
            .with_tools(vec![
                json!({ "name": "change_background", "description": "Paint", "parameters": { "type": "object" } }),
                json!({ "description": "nameless" }),
            ])
    }

    #[test]
    fn base_url_requires_scheme() {
        let err = ChatModelConfig::new("gpt-4o")
            .with_base_url("api.openai.com")
            .expect_err("missing scheme should error");
        assert!(matches!(err, AgentError::Configuration { .. }));
    }

    #[test]
    fn sanitize_appends_trailing_slash() {
        let cfg = ChatModelConfig::new("gpt-4o")
            .with_base_url("https://example.com/openai")
            .expect("valid URL");
        assert_eq!(cfg.base_url, "https://example.com/openai/");
    }

    #[test]
    fn request_maps_messages_and_tools() {
        let agent = ChatModelAgent::new(ChatModelConfig::new("gpt-4o").with_temperature(0.2));
        let input = input();
        let request = serde_json::to_value(agent.build_request(&input)).unwrap();

        assert_eq!(request["model"], "gpt-4o");
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["tools"].as_array().map(Vec::len), Some(1));
        assert_eq!(request["tools"][0]["type"], "function");
        assert_eq!(request["tools"][0]["function"]["name"], "change_background");
    }

    #[tokio::test]
    async fn missing_key_fails_on_run() {
        let agent = ChatModelAgent::new(ChatModelConfig::new("gpt-4o"));
        let err = agent.run(input()).await.err().expect("no key");
        assert!(matches!(err, AgentError::Configuration { .. }));
    }

    #[tokio::test]
    async fn completion_becomes_text_and_tool_events() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": "Sure.",
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": { "name": "change_background", "arguments": "{\"color\":\"blue\"}" }
                    }]
                }
            }]
        });
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;

        let config = ChatModelConfig::new("gpt-4o")
            .with_api_key("sk-test")
            .with_base_url(server.uri())
            .unwrap();
        let agent = ChatModelAgent::new(config);

        let events: Vec<AgentEvent> = agent
            .run(input())
            .await
            .unwrap()
            .map(Result::unwrap)
            .collect()
            .await;
        let types: Vec<_> = events.iter().map(AgentEvent::event_type).collect();
        assert_eq!(
            types,
            [
                "RUN_STARTED",
                "TEXT_MESSAGE_START",
                "TEXT_MESSAGE_CONTENT",
                "TEXT_MESSAGE_END",
                "TOOL_CALL_START",
                "TOOL_CALL_ARGS",
                "TOOL_CALL_END",
                "RUN_FINISHED"
            ]
        );

        let requests = server.received_requests().await.expect("recording enabled");
        let sent: Value = requests[0].body_json().unwrap();
        assert_eq!(sent["model"], "gpt-4o");
        assert_eq!(sent["stream"], false);
    }

    #[test]
    fn tool_history_keeps_the_function_call_shape() {
        let call = json!({
            "id": "call_1",
            "type": "function",
            "function": { "name": "change_background", "arguments": "{}" }
        });
        let agent = ChatModelAgent::new(ChatModelConfig::new("gpt-4o"));
        let input = RunAgentInput::new("t", "r").unwrap().with_messages(vec![
            Message::assistant_tool_calls("a", vec![call]),
            Message::tool_result("b", "call_1", "done"),
        ]);

        let request = serde_json::to_value(agent.build_request(&input)).unwrap();
        assert_eq!(request["messages"][0]["content"], Value::Null);
        assert_eq!(request["messages"][0]["tool_calls"][0]["id"], "call_1");
        assert_eq!(request["messages"][1]["role"], "tool");
        assert_eq!(request["messages"][1]["tool_call_id"], "call_1");
        assert!(request["messages"][1].get("tool_calls").is_none());
    }
}
