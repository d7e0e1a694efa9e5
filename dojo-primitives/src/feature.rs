//! Feature vocabulary shared by the menu and the agent factories.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A named capability or demo scenario an integration may support.
///
/// The set is closed: adding a feature means adding a variant here. The
/// snake_case tag returned by [`Feature::as_str`] is the stable wire form used
/// by the menu, the factory mappings, and request routing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Plain conversational chat.
    AgenticChat,
    /// Chat that surfaces the model's reasoning.
    AgenticChatReasoning,
    /// Agent-driven generative UI with streamed state.
    AgenticGenerativeUi,
    /// Tools executed on the backend and rendered in the frontend.
    BackendToolRendering,
    /// Steps that require human approval before proceeding.
    HumanInTheLoop,
    /// Optimistic state updates predicted ahead of tool completion.
    PredictiveStateUpdates,
    /// State shared between agent and frontend.
    SharedState,
    /// Generative UI driven by frontend tool calls.
    ToolBasedGenerativeUi,
    /// Nested graph execution.
    Subgraphs,
    /// Multi-agent chat bridged through A2A middleware.
    #[serde(rename = "a2a_chat")]
    A2aChat,
    /// Direct A2A chat.
    VnextChat,
}

impl Feature {
    /// Every feature in declaration order.
    pub const ALL: [Self; 11] = [
        Self::AgenticChat,
        Self::AgenticChatReasoning,
        Self::AgenticGenerativeUi,
        Self::BackendToolRendering,
        Self::HumanInTheLoop,
        Self::PredictiveStateUpdates,
        Self::SharedState,
        Self::ToolBasedGenerativeUi,
        Self::Subgraphs,
        Self::A2aChat,
        Self::VnextChat,
    ];

    /// Returns the snake_case tag for this feature.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AgenticChat => "agentic_chat",
            Self::AgenticChatReasoning => "agentic_chat_reasoning",
            Self::AgenticGenerativeUi => "agentic_generative_ui",
            Self::BackendToolRendering => "backend_tool_rendering",
            Self::HumanInTheLoop => "human_in_the_loop",
            Self::PredictiveStateUpdates => "predictive_state_updates",
            Self::SharedState => "shared_state",
            Self::ToolBasedGenerativeUi => "tool_based_generative_ui",
            Self::Subgraphs => "subgraphs",
            Self::A2aChat => "a2a_chat",
            Self::VnextChat => "vnext_chat",
        }
    }
}

impl AsRef<str> for Feature {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or_else(|| Error::UnknownFeature { feature: s.into() })
    }
}
