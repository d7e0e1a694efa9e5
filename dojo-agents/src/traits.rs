//! Shared agent client trait and run data structures.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Result alias used by agent clients.
pub type AgentResult<T> = Result<T, AgentError>;

/// Event stream returned by [`AgentClient::run`].
pub type AgentStream = Pin<Box<dyn Stream<Item = AgentResult<AgentEvent>> + Send>>;

/// Error type shared by agent client implementations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Client is misconfigured: bad URL, missing credentials.
    #[error("agent not configured: {reason}")]
    Configuration {
        /// Additional context for the failure.
        reason: String,
    },

    /// The run input cannot be served by this client.
    #[error("invalid run input: {reason}")]
    InvalidInput {
        /// Reason describing why the input was rejected.
        reason: String,
    },

    /// Transport-level failures (network, protocol, timeouts).
    #[error("agent transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The backend returned an error status or a malformed body.
    #[error("agent response error: {reason}")]
    Response {
        /// Additional context about the response failure.
        reason: String,
    },

    /// Remote agent discovery returned an unusable listing.
    #[error("agent discovery failed: {reason}")]
    Discovery {
        /// Additional context about the discovery failure.
        reason: String,
    },
}

impl AgentError {
    /// Convenience constructor for configuration issues.
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for rejected inputs.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for response failures.
    #[must_use]
    pub fn response(reason: impl Into<String>) -> Self {
        Self::Response {
            reason: reason.into(),
        }
    }
}

/// Minimal metadata describing an agent client instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AgentMetadata {
    framework: &'static str,
    endpoint: Option<String>,
}

impl AgentMetadata {
    /// Creates metadata for an in-process agent of the supplied framework.
    #[must_use]
    pub const fn local(framework: &'static str) -> Self {
        Self {
            framework,
            endpoint: None,
        }
    }

    /// Creates metadata for an agent reached at `endpoint`.
    #[must_use]
    pub fn remote(framework: &'static str, endpoint: impl Into<String>) -> Self {
        Self {
            framework,
            endpoint: Some(endpoint.into()),
        }
    }

    /// Returns the framework label (e.g. "pydantic-ai").
    #[must_use]
    pub const fn framework(&self) -> &'static str {
        self.framework
    }

    /// Returns the configured endpoint, if the agent is remote.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

/// Author of a conversation message.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Developer instructions.
    Developer,
    /// System messages steer the agent behaviour.
    System,
    /// Agent responses.
    Assistant,
    /// User-authored content.
    User,
    /// Tool results.
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Developer => "developer",
            Self::System => "system",
            Self::Assistant => "assistant",
            Self::User => "user",
            Self::Tool => "tool",
        })
    }
}

/// One message of the conversation forwarded to an agent.
///
/// Assistant messages that only request tool calls carry no content, and
/// tool results reference the call they answer. Fields this crate does not
/// model are kept and forwarded unchanged.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: String,
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Message {
    /// Creates a new text message.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
            extra: Map::new(),
        }
    }

    /// Creates an assistant message that requests `tool_calls`.
    #[must_use]
    pub fn assistant_tool_calls(id: impl Into<String>, tool_calls: Vec<Value>) -> Self {
        Self {
            tool_calls,
            content: None,
            ..Self::new(id, Role::Assistant, "")
        }
    }

    /// Creates the result of the tool call `tool_call_id`.
    #[must_use]
    pub fn tool_result(
        id: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(id, Role::Tool, content)
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the message role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the text content, if the message has any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the tool calls requested by an assistant message.
    #[must_use]
    pub fn tool_calls(&self) -> &[Value] {
        &self.tool_calls
    }

    /// Returns the call a tool message answers.
    #[must_use]
    pub fn tool_call_id(&self) -> Option<&str> {
        self.tool_call_id.as_deref()
    }
}

/// Input for a single agent run.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunAgentInput {
    thread_id: String,
    run_id: String,
    #[serde(default)]
    state: Value,
    #[serde(default)]
    messages: Vec<Message>,
    #[serde(default)]
    tools: Vec<Value>,
    #[serde(default)]
    context: Vec<Value>,
    #[serde(default)]
    forwarded_props: Value,
}

impl RunAgentInput {
    /// Creates an input for the supplied thread and run.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidInput`] if either identifier is blank.
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> AgentResult<Self> {
        let thread_id = thread_id.into();
        let run_id = run_id.into();
        if thread_id.trim().is_empty() {
            return Err(AgentError::invalid_input("thread id cannot be empty"));
        }
        if run_id.trim().is_empty() {
            return Err(AgentError::invalid_input("run id cannot be empty"));
        }

        Ok(Self {
            thread_id,
            run_id,
            state: Value::Object(Map::new()),
            messages: Vec::new(),
            tools: Vec::new(),
            context: Vec::new(),
            forwarded_props: Value::Object(Map::new()),
        })
    }

    /// Replaces the conversation messages.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Sets the shared state snapshot.
    #[must_use]
    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }

    /// Declares frontend tools the agent may call.
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    /// Sets additional context entries.
    #[must_use]
    pub fn with_context(mut self, context: Vec<Value>) -> Self {
        self.context = context;
        self
    }

    /// Sets properties forwarded verbatim to the backend.
    #[must_use]
    pub fn with_forwarded_props(mut self, props: Value) -> Self {
        self.forwarded_props = props;
        self
    }

    /// Returns the thread identifier.
    #[must_use]
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Returns the run identifier.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Returns the shared state snapshot.
    #[must_use]
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Returns the conversation messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the declared frontend tools.
    #[must_use]
    pub fn tools(&self) -> &[Value] {
        &self.tools
    }

    /// Returns the additional context entries.
    #[must_use]
    pub fn context(&self) -> &[Value] {
        &self.context
    }

    /// Returns the forwarded properties.
    #[must_use]
    pub fn forwarded_props(&self) -> &Value {
        &self.forwarded_props
    }

    /// Returns the most recent user message, if any.
    #[must_use]
    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role() == Role::User)
    }

    pub(crate) fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    pub(crate) fn forwarded_props_mut(&mut self) -> &mut Value {
        &mut self.forwarded_props
    }
}

/// Event emitted by an agent run.
///
/// The payload is kept opaque: it is any JSON object carrying a string `type`.
/// Constructors cover the events produced by the clients in this crate.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AgentEvent(Value);

impl AgentEvent {
    /// Wraps a decoded event payload.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Response`] when the payload is not an object with
    /// a string `type` field.
    pub fn from_value(value: Value) -> AgentResult<Self> {
        match value.get("type") {
            Some(Value::String(_)) => Ok(Self(value)),
            _ => Err(AgentError::response("event payload is missing a string `type`")),
        }
    }

    /// Returns the event type (e.g. `RUN_STARTED`).
    #[must_use]
    pub fn event_type(&self) -> &str {
        self.0.get("type").and_then(Value::as_str).unwrap_or_default()
    }

    /// Returns the raw payload.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the event, returning the raw payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Signals the start of a run.
    #[must_use]
    pub fn run_started(thread_id: &str, run_id: &str) -> Self {
        Self(json!({ "type": "RUN_STARTED", "threadId": thread_id, "runId": run_id }))
    }

    /// Signals the successful end of a run.
    #[must_use]
    pub fn run_finished(thread_id: &str, run_id: &str) -> Self {
        Self(json!({ "type": "RUN_FINISHED", "threadId": thread_id, "runId": run_id }))
    }

    /// Signals a failed run.
    #[must_use]
    pub fn run_error(message: &str) -> Self {
        Self(json!({ "type": "RUN_ERROR", "message": message }))
    }

    /// Opens an assistant text message.
    #[must_use]
    pub fn text_message_start(message_id: &str) -> Self {
        Self(json!({ "type": "TEXT_MESSAGE_START", "messageId": message_id, "role": "assistant" }))
    }

    /// Appends content to an open text message.
    #[must_use]
    pub fn text_message_content(message_id: &str, delta: &str) -> Self {
        Self(json!({ "type": "TEXT_MESSAGE_CONTENT", "messageId": message_id, "delta": delta }))
    }

    /// Closes a text message.
    #[must_use]
    pub fn text_message_end(message_id: &str) -> Self {
        Self(json!({ "type": "TEXT_MESSAGE_END", "messageId": message_id }))
    }

    /// Opens a tool call.
    #[must_use]
    pub fn tool_call_start(tool_call_id: &str, name: &str, parent_message_id: &str) -> Self {
        Self(json!({
            "type": "TOOL_CALL_START",
            "toolCallId": tool_call_id,
            "toolCallName": name,
            "parentMessageId": parent_message_id,
        }))
    }

    /// Streams tool call arguments.
    #[must_use]
    pub fn tool_call_args(tool_call_id: &str, delta: &str) -> Self {
        Self(json!({ "type": "TOOL_CALL_ARGS", "toolCallId": tool_call_id, "delta": delta }))
    }

    /// Closes a tool call.
    #[must_use]
    pub fn tool_call_end(tool_call_id: &str) -> Self {
        Self(json!({ "type": "TOOL_CALL_END", "toolCallId": tool_call_id }))
    }

    /// Passes through an upstream payload that has no native event shape.
    #[must_use]
    pub fn raw(event: Value, source: &str) -> Self {
        Self(json!({ "type": "RAW", "event": event, "source": source }))
    }
}

impl TryFrom<Value> for AgentEvent {
    type Error = AgentError;

    fn try_from(value: Value) -> AgentResult<Self> {
        Self::from_value(value)
    }
}

/// Capability implemented by every agent client: run as the agent for one
/// feature slot.
///
/// Construction of a client never contacts its backend; the first network
/// round trip happens in [`AgentClient::run`]. Implementations must be safe to
/// share across concurrent runs.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Returns basic metadata describing the client instance.
    fn metadata(&self) -> &AgentMetadata;

    /// Executes a run, returning the emitted events.
    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream>;
}
