//! The advertised catalogue. Edit this list to add, remove, or rename an
//! integration or to change the features it advertises.

use dojo_primitives::Feature::{
    A2aChat, AgenticChat, AgenticChatReasoning, AgenticGenerativeUi, BackendToolRendering,
    HumanInTheLoop, PredictiveStateUpdates, SharedState, Subgraphs, ToolBasedGenerativeUi,
    VnextChat,
};
use dojo_primitives::MenuIntegration;

/// Every integration advertised to users, in display order.
pub static MENU_INTEGRATIONS: &[MenuIntegration] = &[
    MenuIntegration::new(
        "agent-spec-langgraph",
        "Open Agent Spec (LangGraph)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "agent-spec-wayflow",
        "Open Agent Spec (Wayflow)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "langgraph",
        "LangGraph (Python)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            AgenticGenerativeUi,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
            Subgraphs,
        ],
    ),
    MenuIntegration::new(
        "langgraph-fastapi",
        "LangGraph (FastAPI)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            AgenticChatReasoning,
            AgenticGenerativeUi,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
            Subgraphs,
        ],
    ),
    MenuIntegration::new(
        "langgraph-typescript",
        "LangGraph (Typescript)",
        &[
            AgenticChat,
            HumanInTheLoop,
            AgenticGenerativeUi,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
            Subgraphs,
        ],
    ),
    MenuIntegration::new(
        "mastra",
        "Mastra",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "mastra-agent-local",
        "Mastra Agent (Local)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            SharedState,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "spring-ai",
        "Spring AI",
        &[
            AgenticChat,
            SharedState,
            ToolBasedGenerativeUi,
            HumanInTheLoop,
            AgenticGenerativeUi,
        ],
    ),
    // predictive_state_updates stays off until production builds are fixed.
    MenuIntegration::new(
        "pydantic-ai",
        "Pydantic AI",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            AgenticGenerativeUi,
            SharedState,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "adk-middleware",
        "Google ADK",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "microsoft-agent-framework-dotnet",
        "Microsoft Agent Framework (.NET)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            AgenticGenerativeUi,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "microsoft-agent-framework-python",
        "Microsoft Agent Framework (Python)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            AgenticGenerativeUi,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "agno",
        "Agno",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new(
        "llama-index",
        "LlamaIndex",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            AgenticGenerativeUi,
            SharedState,
        ],
    ),
    MenuIntegration::new(
        "crewai",
        "CrewAI",
        &[
            AgenticChat,
            HumanInTheLoop,
            AgenticGenerativeUi,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new("a2a-basic", "A2A (Direct)", &[VnextChat]),
    MenuIntegration::new("middleware-starter", "Middleware Starter", &[AgenticChat]),
    MenuIntegration::new("server-starter", "Server Starter", &[AgenticChat]),
    MenuIntegration::new(
        "server-starter-all-features",
        "Server Starter (All Features)",
        &[
            AgenticChat,
            BackendToolRendering,
            HumanInTheLoop,
            AgenticGenerativeUi,
            PredictiveStateUpdates,
            SharedState,
            ToolBasedGenerativeUi,
        ],
    ),
    MenuIntegration::new("a2a", "A2A", &[A2aChat]),
    MenuIntegration::new(
        "aws-strands",
        "AWS Strands",
        &[
            AgenticChat,
            BackendToolRendering,
            AgenticGenerativeUi,
            SharedState,
            HumanInTheLoop,
        ],
    ),
];
