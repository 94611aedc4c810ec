//! `Tool` — a named executor advertised by an agent (`spec.md` §3, §4.1,
//! §9 "Function-valued Tool.executor fields → a small trait").
//!
//! The callable part lives behind [`crate::domain::ports::ToolExecutor`];
//! this struct only carries the advertised metadata plus a handle to the
//! registered executor.

use std::sync::Arc;

use crate::domain::ids::AgentId;
use crate::domain::ports::ToolExecutor;

#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub agent_id: AgentId,
    pub parameter_names: Vec<String>,
    pub executor: Arc<dyn ToolExecutor>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("agent_id", &self.agent_id)
            .field("parameter_names", &self.parameter_names)
            .finish_non_exhaustive()
    }
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        agent_id: impl Into<AgentId>,
        executor: Arc<dyn ToolExecutor>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            agent_id: agent_id.into(),
            parameter_names: Vec::new(),
            executor,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_parameter_names(mut self, names: Vec<String>) -> Self {
        self.parameter_names = names;
        self
    }

    /// Key used for tool identity within CTX: `(agent_id, name)` per
    /// `spec.md` §4.1 ("Identity key is `(agent_id, name)`").
    pub fn identity_key(&self) -> (AgentId, String) {
        (self.agent_id.clone(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::tool_executor::EchoToolExecutor;

    #[test]
    fn identity_key_combines_agent_and_name() {
        let tool = Tool::new("scan", "a1", Arc::new(EchoToolExecutor));
        assert_eq!(tool.identity_key(), (AgentId::new("a1"), "scan".to_string()));
    }
}
