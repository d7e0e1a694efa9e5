//! Factories for every shipped integration.
//!
//! Each backend follows its own URL convention; most map a fixed set of
//! feature paths through [`map_agents`], a few build their map by hand.

use std::sync::Arc;

use dojo_agents::{
    A2AAgent, A2AClient, A2AMiddlewareAgent, AgentClient, AgentResult, ChatModelAgent,
    ChatModelConfig, HttpAgent, HttpAgentConfig, LangGraphAgent, LocalAgent, MastraClient, Reply,
};
use dojo_config::Endpoints;
use dojo_primitives::Feature::{
    A2aChat, AgenticChat, AgenticChatReasoning, AgenticGenerativeUi, BackendToolRendering,
    HumanInTheLoop, PredictiveStateUpdates, SharedState, Subgraphs, ToolBasedGenerativeUi,
    VnextChat,
};
use futures::future::{Ready, ready};

use crate::error::RegistryResult;
use crate::factory::{FactoryTable, FeatureAgents, map_agents};

/// Model used by the unlisted `langchain` integration.
pub const LANGCHAIN_MODEL: &str = "gpt-4o";

const A2A_MIDDLEWARE_INSTRUCTIONS: &str = "\
You are an HR agent. You are responsible for hiring employees and other typical HR tasks.

It's very important to contact all the departments necessary to complete the task.
For example, to hire an employee, you must contact all 3 departments: Finance, IT and Buildings Management. Help the Buildings Management department to find a table.

You can make tool calls on behalf of other agents.
DO NOT FORGET TO COMMUNICATE BACK TO THE RELEVANT AGENT IF MAKING A TOOL CALL ON BEHALF OF ANOTHER AGENT!!!

When choosing a seat with the buildings management agent, You MUST use the `pickTable` tool to have the user pick a seat.
The buildings management agent will then use the `pickSeat` tool to pick a seat.";

/// Builds the factory table for every shipped integration, including the
/// unlisted `langchain` one.
///
/// Endpoint values are spliced into URLs as-is; nothing is contacted until a
/// factory that performs discovery is invoked.
///
/// # Errors
///
/// Returns a registry error if two factories share an identifier.
#[allow(clippy::too_many_lines)]
pub fn default_factory_table(endpoints: &Endpoints) -> RegistryResult<FactoryTable> {
    let mut table = FactoryTable::new();

    table.register("middleware-starter", || {
        done(FeatureAgents::new().with(AgenticChat.as_str(), Arc::new(LocalAgent::middleware_starter())))
    })?;

    let url = endpoints.pydantic_ai_url.clone();
    table.register("pydantic-ai", move || {
        done(map_agents(
            |path| http("pydantic-ai", format!("{url}/{path}")),
            &[
                (AgenticChat, "agentic_chat"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
                (HumanInTheLoop, "human_in_the_loop"),
                (SharedState, "shared_state"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (BackendToolRendering, "backend_tool_rendering"),
            ],
        ))
    })?;

    let url = endpoints.server_starter_url.clone();
    table.register("server-starter", move || {
        done(FeatureAgents::new().with(AgenticChat.as_str(), Arc::new(http("server-starter", url.clone()))))
    })?;

    let url = endpoints.adk_middleware_url.clone();
    table.register("adk-middleware", move || {
        done(map_agents(
            |path| http("adk", format!("{url}/{path}")),
            &[
                (AgenticChat, "chat"),
                (AgenticGenerativeUi, "adk-agentic-generative-ui"),
                (ToolBasedGenerativeUi, "adk-tool-based-generative-ui"),
                (HumanInTheLoop, "adk-human-in-loop-agent"),
                (BackendToolRendering, "backend_tool_rendering"),
                (SharedState, "adk-shared-state-agent"),
                (PredictiveStateUpdates, "adk-predictive-state-agent"),
            ],
        ))
    })?;

    let url = endpoints.server_starter_all_features_url.clone();
    table.register("server-starter-all-features", move || {
        done(map_agents(
            |path| http("server-starter-all-features", format!("{url}/{path}")),
            &[
                (AgenticChat, "agentic_chat"),
                (BackendToolRendering, "backend_tool_rendering"),
                (HumanInTheLoop, "human_in_the_loop"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (SharedState, "shared_state"),
                (PredictiveStateUpdates, "predictive_state_updates"),
            ],
        ))
    })?;

    let mastra = Arc::new(MastraClient::new(endpoints.mastra_url.clone()));
    table.register("mastra", move || discover_mastra(Arc::clone(&mastra)))?;

    table.register("mastra-agent-local", || {
        done(map_agents(
            |_| LocalAgent::new("mastra", Reply::Echo),
            &[
                (AgenticChat, "agentic_chat"),
                (BackendToolRendering, "backend_tool_rendering"),
                (HumanInTheLoop, "human_in_the_loop"),
                (SharedState, "shared_state"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
            ],
        ))
    })?;

    let url = endpoints.langgraph_python_url.clone();
    table.register("langgraph", move || {
        let agents = map_agents(
            |graph_id| LangGraphAgent::new(&url, graph_id),
            &[
                (AgenticChat, "agentic_chat"),
                (BackendToolRendering, "backend_tool_rendering"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
                (HumanInTheLoop, "human_in_the_loop"),
                (PredictiveStateUpdates, "predictive_state_updates"),
                (SharedState, "shared_state"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (Subgraphs, "subgraphs"),
            ],
        );
        // Served by the HTTP endpoint rather than the platform API.
        let reasoning = http("langgraph", format!("{url}/agent/agentic_chat_reasoning"));
        done(agents.with(AgenticChatReasoning.as_str(), Arc::new(reasoning)))
    })?;

    let url = endpoints.langgraph_fast_api_url.clone();
    table.register("langgraph-fastapi", move || {
        done(map_agents(
            |path| http("langgraph", format!("{url}/agent/{path}")),
            &[
                (AgenticChat, "agentic_chat"),
                (BackendToolRendering, "backend_tool_rendering"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
                (HumanInTheLoop, "human_in_the_loop"),
                (PredictiveStateUpdates, "predictive_state_updates"),
                (SharedState, "shared_state"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (AgenticChatReasoning, "agentic_chat_reasoning"),
                (Subgraphs, "subgraphs"),
            ],
        ))
    })?;

    let url = endpoints.langgraph_typescript_url.clone();
    table.register("langgraph-typescript", move || {
        done(map_agents(
            |graph_id| LangGraphAgent::new(&url, graph_id),
            &[
                (AgenticChat, "agentic_chat"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
                (HumanInTheLoop, "human_in_the_loop"),
                (PredictiveStateUpdates, "predictive_state_updates"),
                (SharedState, "shared_state"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (Subgraphs, "subgraphs"),
            ],
        ))
    })?;

    table.register("langchain", || {
        let agent: Arc<dyn AgentClient> =
            Arc::new(ChatModelAgent::new(ChatModelConfig::from_env(LANGCHAIN_MODEL)));
        done(
            FeatureAgents::new()
                .with(AgenticChat.as_str(), Arc::clone(&agent))
                .with(ToolBasedGenerativeUi.as_str(), agent),
        )
    })?;

    let url = endpoints.agno_url.clone();
    table.register("agno", move || {
        done(map_agents(
            |path| http("agno", format!("{url}/{path}/agui")),
            &[
                (AgenticChat, "agentic_chat"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (BackendToolRendering, "backend_tool_rendering"),
                (HumanInTheLoop, "human_in_the_loop"),
            ],
        ))
    })?;

    let url = endpoints.spring_ai_url.clone();
    table.register("spring-ai", move || {
        done(map_agents(
            |path| http("spring-ai", format!("{url}/{path}/agui")),
            &[
                (AgenticChat, "agentic_chat"),
                (SharedState, "shared_state"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (HumanInTheLoop, "human_in_the_loop"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
            ],
        ))
    })?;

    let url = endpoints.llama_index_url.clone();
    table.register("llama-index", move || {
        done(map_agents(
            |path| http("llama-index", format!("{url}/{path}/run")),
            &[
                (AgenticChat, "agentic_chat"),
                (HumanInTheLoop, "human_in_the_loop"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
                (SharedState, "shared_state"),
                (BackendToolRendering, "backend_tool_rendering"),
            ],
        ))
    })?;

    let url = endpoints.crew_ai_url.clone();
    table.register("crewai", move || {
        done(map_agents(
            |path| http("crewai", format!("{url}/{path}")),
            &[
                (AgenticChat, "agentic_chat"),
                (HumanInTheLoop, "human_in_the_loop"),
                (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                (AgenticGenerativeUi, "agentic_generative_ui"),
                (SharedState, "shared_state"),
                (PredictiveStateUpdates, "predictive_state_updates"),
            ],
        ))
    })?;

    for (id, runtime) in [
        ("agent-spec-langgraph", "langgraph"),
        ("agent-spec-wayflow", "wayflow"),
    ] {
        let url = format!("{}/{runtime}", endpoints.agent_spec_url);
        table.register(id, move || {
            done(map_agents(
                |path| http("agent-spec", format!("{url}/{path}")),
                &[
                    (AgenticChat, "agentic_chat"),
                    (BackendToolRendering, "backend_tool_rendering"),
                    (HumanInTheLoop, "human_in_the_loop"),
                    (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                ],
            ))
        })?;
    }

    for (id, base) in [
        (
            "microsoft-agent-framework-python",
            &endpoints.agent_framework_python_url,
        ),
        (
            "microsoft-agent-framework-dotnet",
            &endpoints.agent_framework_dotnet_url,
        ),
    ] {
        let url = base.clone();
        table.register(id, move || {
            done(map_agents(
                |path| http("microsoft-agent-framework", format!("{url}/{path}")),
                &[
                    (AgenticChat, "agentic_chat"),
                    (BackendToolRendering, "backend_tool_rendering"),
                    (HumanInTheLoop, "human_in_the_loop"),
                    (AgenticGenerativeUi, "agentic_generative_ui"),
                    (SharedState, "shared_state"),
                    (ToolBasedGenerativeUi, "tool_based_generative_ui"),
                    (PredictiveStateUpdates, "predictive_state_updates"),
                ],
            ))
        })?;
    }

    let url = endpoints.a2a_url.clone();
    table.register("a2a-basic", move || {
        let client = Arc::new(A2AClient::new(url.clone()));
        let agent = A2AAgent::new(client, "Direct A2A agent").with_debug(cfg!(debug_assertions));
        done(FeatureAgents::new().with(VnextChat.as_str(), Arc::new(agent)))
    })?;

    let agent_urls = vec![
        endpoints.a2a_middleware_buildings_management_url.clone(),
        endpoints.a2a_middleware_finance_url.clone(),
        endpoints.a2a_middleware_it_url.clone(),
    ];
    let orchestrator = endpoints.a2a_middleware_orchestrator_url.clone();
    table.register("a2a", move || {
        let agent = A2AMiddlewareAgent::new(
            "Middleware that connects to remote A2A agents",
            agent_urls.clone(),
            http("a2a-middleware", orchestrator.clone()),
            A2A_MIDDLEWARE_INSTRUCTIONS,
        );
        done(FeatureAgents::new().with(A2aChat.as_str(), Arc::new(agent)))
    })?;

    let url = endpoints.aws_strands_url.clone();
    table.register("aws-strands", move || {
        // Hyphenated paths with a trailing slash; human_in_the_loop differs.
        let agents = map_agents(
            |path| http("aws-strands", format!("{url}/{path}/")),
            &[
                (AgenticChat, "agentic-chat"),
                (BackendToolRendering, "backend-tool-rendering"),
                (AgenticGenerativeUi, "agentic-generative-ui"),
                (SharedState, "shared-state"),
            ],
        );
        let hitl = HttpAgent::new(
            HttpAgentConfig::new(format!("{url}/human-in-the-loop"))
                .with_framework("aws-strands")
                .with_debug(true),
        );
        done(agents.with(HumanInTheLoop.as_str(), Arc::new(hitl)))
    })?;

    Ok(table)
}

fn http(framework: &'static str, url: String) -> HttpAgent {
    HttpAgent::new(HttpAgentConfig::new(url).with_framework(framework))
}

fn done(agents: FeatureAgents) -> Ready<AgentResult<FeatureAgents>> {
    ready(Ok(agents))
}

async fn discover_mastra(client: Arc<MastraClient>) -> AgentResult<FeatureAgents> {
    let agents = client.get_remote_agents().await?;
    Ok(agents
        .into_iter()
        .map(|(id, agent)| {
            let agent: Arc<dyn AgentClient> = Arc::new(agent);
            (id, agent)
        })
        .collect())
}
