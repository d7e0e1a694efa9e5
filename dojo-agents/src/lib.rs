//! Agent clients that back the dojo feature slots.
//!
//! Every client implements [`traits::AgentClient`]. Constructors never touch the
//! network: configuration problems such as a malformed URL or a missing API
//! key surface on the first run.

#![warn(missing_docs, clippy::pedantic)]

pub mod a2a;
pub mod http_agent;
pub mod langgraph;
pub mod local;
pub mod mastra;
pub mod openai;
pub mod traits;

mod http_client;
mod sse;
#[cfg(test)]
mod test_support;

pub use a2a::{A2AAgent, A2AClient, A2AMiddlewareAgent};
pub use http_agent::{HttpAgent, HttpAgentConfig};
pub use http_client::DEFAULT_TIMEOUT;
pub use langgraph::LangGraphAgent;
pub use local::{LocalAgent, Reply};
pub use mastra::{MastraAgent, MastraClient};
pub use openai::{ChatModelAgent, ChatModelConfig};
pub use traits::{
    AgentClient, AgentError, AgentEvent, AgentMetadata, AgentResult, AgentStream, Message, Role,
    RunAgentInput,
};
