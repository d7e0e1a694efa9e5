//! In-process scripted agent used by integrations that run without a backend.

use async_trait::async_trait;
use futures::stream;
use uuid::Uuid;

use crate::traits::{
    AgentClient, AgentEvent, AgentMetadata, AgentResult, AgentStream, Message, RunAgentInput,
};

/// What a [`LocalAgent`] answers with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// Always the same text.
    Fixed(String),
    /// The content of the last user message.
    Echo,
}

/// Agent that answers from memory with a single assistant message.
#[derive(Clone, Debug)]
pub struct LocalAgent {
    reply: Reply,
    metadata: AgentMetadata,
}

impl LocalAgent {
    /// Creates a local agent labelled with `framework`.
    #[must_use]
    pub const fn new(framework: &'static str, reply: Reply) -> Self {
        Self {
            reply,
            metadata: AgentMetadata::local(framework),
        }
    }

    /// The starter middleware agent that greets every run.
    #[must_use]
    pub fn middleware_starter() -> Self {
        Self::new("middleware-starter", Reply::Fixed("Hello world!".to_owned()))
    }

    /// Returns the configured reply.
    #[must_use]
    pub const fn reply(&self) -> &Reply {
        &self.reply
    }

    fn respond(&self, input: &RunAgentInput) -> String {
        match &self.reply {
            Reply::Fixed(text) => text.clone(),
            Reply::Echo => input
                .last_user_message()
                .and_then(Message::content)
                .map(str::to_owned)
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl AgentClient for LocalAgent {
    fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    async fn run(&self, input: RunAgentInput) -> AgentResult<AgentStream> {
        let message_id = Uuid::new_v4().to_string();
        let text = self.respond(&input);

        let mut events = vec![
            AgentEvent::run_started(input.thread_id(), input.run_id()),
            AgentEvent::text_message_start(&message_id),
        ];
        if !text.is_empty() {
            events.push(AgentEvent::text_message_content(&message_id, &text));
        }
        events.push(AgentEvent::text_message_end(&message_id));
        events.push(AgentEvent::run_finished(input.thread_id(), input.run_id()));

        Ok(Box::pin(stream::iter(events.into_iter().map(Ok))))
    }
}
