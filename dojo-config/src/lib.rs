//! Backend endpoint configuration for integration builders.
//!
//! Values are opaque strings: builders splice them into client URLs without
//! validating them, so a malformed value only surfaces when the affected
//! agent is first run.

#![warn(missing_docs, clippy::pedantic)]

use std::env;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Base URLs of every backend the default integrations talk to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoints {
    /// Server starter backend.
    pub server_starter_url: String,
    /// Server starter with every demo feature mounted.
    pub server_starter_all_features_url: String,
    /// Remote Mastra server used for agent discovery.
    pub mastra_url: String,
    /// LangGraph Python deployment.
    pub langgraph_python_url: String,
    /// LangGraph served through FastAPI.
    pub langgraph_fast_api_url: String,
    /// LangGraph TypeScript deployment.
    pub langgraph_typescript_url: String,
    /// Agno backend.
    pub agno_url: String,
    /// LlamaIndex backend.
    pub llama_index_url: String,
    /// CrewAI backend.
    pub crew_ai_url: String,
    /// Pydantic AI backend.
    pub pydantic_ai_url: String,
    /// Google ADK middleware backend.
    pub adk_middleware_url: String,
    /// Spring AI backend.
    pub spring_ai_url: String,
    /// Direct A2A agent.
    pub a2a_url: String,
    /// A2A buildings management agent.
    pub a2a_middleware_buildings_management_url: String,
    /// A2A finance agent.
    pub a2a_middleware_finance_url: String,
    /// A2A IT agent.
    pub a2a_middleware_it_url: String,
    /// Orchestrator that routes between the A2A agents.
    pub a2a_middleware_orchestrator_url: String,
    /// Microsoft Agent Framework (.NET) backend.
    pub agent_framework_dotnet_url: String,
    /// Microsoft Agent Framework (Python) backend.
    pub agent_framework_python_url: String,
    /// AWS Strands backend.
    pub aws_strands_url: String,
    /// Open Agent Spec backend hosting the LangGraph and Wayflow runtimes.
    pub agent_spec_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            server_starter_url: "http://localhost:8000".to_owned(),
            server_starter_all_features_url: "http://localhost:8000".to_owned(),
            mastra_url: "http://localhost:4111".to_owned(),
            langgraph_python_url: "http://localhost:2024".to_owned(),
            langgraph_fast_api_url: "http://localhost:8000".to_owned(),
            langgraph_typescript_url: "http://localhost:2024".to_owned(),
            agno_url: "http://localhost:9001".to_owned(),
            llama_index_url: "http://localhost:9000".to_owned(),
            crew_ai_url: "http://localhost:9002".to_owned(),
            pydantic_ai_url: "http://localhost:9000".to_owned(),
            adk_middleware_url: "http://localhost:8000".to_owned(),
            spring_ai_url: "http://localhost:8080".to_owned(),
            a2a_url: "http://localhost:10002".to_owned(),
            a2a_middleware_buildings_management_url: "http://localhost:9001".to_owned(),
            a2a_middleware_finance_url: "http://localhost:9002".to_owned(),
            a2a_middleware_it_url: "http://localhost:9003".to_owned(),
            a2a_middleware_orchestrator_url: "http://localhost:9000".to_owned(),
            agent_framework_dotnet_url: "http://localhost:5018".to_owned(),
            agent_framework_python_url: "http://localhost:8888".to_owned(),
            aws_strands_url: "http://localhost:8000".to_owned(),
            agent_spec_url: "http://localhost:9003".to_owned(),
        }
    }
}

impl Endpoints {
    /// Environment variable names paired with the field they override.
    pub const ENV_VARS: [&'static str; 21] = [
        "SERVER_STARTER_URL",
        "SERVER_STARTER_ALL_FEATURES_URL",
        "MASTRA_URL",
        "LANGGRAPH_PYTHON_URL",
        "LANGGRAPH_FAST_API_URL",
        "LANGGRAPH_TYPESCRIPT_URL",
        "AGNO_URL",
        "LLAMA_INDEX_URL",
        "CREW_AI_URL",
        "PYDANTIC_AI_URL",
        "ADK_MIDDLEWARE_URL",
        "SPRING_AI_URL",
        "A2A_URL",
        "A2A_MIDDLEWARE_BUILDINGS_MANAGEMENT_URL",
        "A2A_MIDDLEWARE_FINANCE_URL",
        "A2A_MIDDLEWARE_IT_URL",
        "A2A_MIDDLEWARE_ORCHESTRATOR_URL",
        "AGENT_FRAMEWORK_DOTNET_URL",
        "AGENT_FRAMEWORK_PYTHON_URL",
        "AWS_STRANDS_URL",
        "AGENT_SPEC_URL",
    ];

    /// Loads defaults and overrides each field whose environment variable is set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name from
    /// [`Endpoints::ENV_VARS`] to its value.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for (name, slot) in Self::ENV_VARS.into_iter().zip(self.slots_mut()) {
            if let Some(value) = lookup(name) {
                debug!(variable = name, "endpoint overridden from environment");
                *slot = value;
            }
        }
        self
    }

    /// Sets every endpoint to `base`. Handy for pointing all integrations at a
    /// single local stub.
    #[must_use]
    pub fn uniform(base: impl Into<String>) -> Self {
        let base = base.into();
        let mut endpoints = Self::default();
        for slot in endpoints.slots_mut() {
            slot.clone_from(&base);
        }
        endpoints
    }

    fn slots_mut(&mut self) -> [&mut String; 21] {
        [
            &mut self.server_starter_url,
            &mut self.server_starter_all_features_url,
            &mut self.mastra_url,
            &mut self.langgraph_python_url,
            &mut self.langgraph_fast_api_url,
            &mut self.langgraph_typescript_url,
            &mut self.agno_url,
            &mut self.llama_index_url,
            &mut self.crew_ai_url,
            &mut self.pydantic_ai_url,
            &mut self.adk_middleware_url,
            &mut self.spring_ai_url,
            &mut self.a2a_url,
            &mut self.a2a_middleware_buildings_management_url,
            &mut self.a2a_middleware_finance_url,
            &mut self.a2a_middleware_it_url,
            &mut self.a2a_middleware_orchestrator_url,
            &mut self.agent_framework_dotnet_url,
            &mut self.agent_framework_python_url,
            &mut self.aws_strands_url,
            &mut self.agent_spec_url,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_supplied_fields() {
        let endpoints = Endpoints::default().with_overrides(|name| {
            (name == "MASTRA_URL").then(|| "https://mastra.example.com".to_owned())
        });

        assert_eq!(endpoints.mastra_url, "https://mastra.example.com");
        assert_eq!(endpoints.agno_url, Endpoints::default().agno_url);
    }

    #[test]
    fn env_var_names_line_up_with_fields() {
        let endpoints = Endpoints::default().with_overrides(|name| Some(name.to_owned()));

        assert_eq!(endpoints.server_starter_url, "SERVER_STARTER_URL");
        assert_eq!(endpoints.langgraph_fast_api_url, "LANGGRAPH_FAST_API_URL");
        assert_eq!(endpoints.a2a_middleware_it_url, "A2A_MIDDLEWARE_IT_URL");
        assert_eq!(endpoints.agent_spec_url, "AGENT_SPEC_URL");
        assert_eq!(endpoints.langgraph_python_url, "LANGGRAPH_PYTHON_URL");
        assert!(!Endpoints::ENV_VARS.contains(&"LANGGRAPH_URL"));
    }

    #[test]
    fn uniform_points_everything_at_one_base() {
        let endpoints = Endpoints::uniform("http://127.0.0.1:1");
        assert_eq!(endpoints.pydantic_ai_url, "http://127.0.0.1:1");
        assert_eq!(endpoints.a2a_middleware_orchestrator_url, "http://127.0.0.1:1");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let endpoints: Endpoints =
            serde_json::from_str(r#"{ "agnoUrl": "http://agno:9001" }"#).unwrap();
        assert_eq!(endpoints.agno_url, "http://agno:9001");
        assert_eq!(endpoints.mastra_url, Endpoints::default().mastra_url);
    }
}
