//! `Mission` — an orchestrator-level container over tasks and agents
//! (`spec.md` §3, §6). Owned exclusively by ORCH.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{Scalar, Vec3};
use crate::domain::ids::{AgentId, MissionId, TaskId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionType {
    Surveillance,
    Transit,
    Delivery,
    SearchAndRescue,
    Custom(String),
}

impl MissionType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Surveillance => "surveillance",
            Self::Transit => "transit",
            Self::Delivery => "delivery",
            Self::SearchAndRescue => "search_and_rescue",
            Self::Custom(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissionState {
    Planning,
    Executing,
    Paused,
    Completed,
    Failed,
    Aborted,
}

impl MissionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Executing => "executing",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }

    pub fn can_transition_to(self, next: MissionState) -> bool {
        use MissionState::{Aborted, Completed, Executing, Failed, Paused, Planning};
        matches!(
            (self, next),
            (Planning, Executing)
                | (Executing, Paused)
                | (Paused, Executing)
                | (Executing, Completed)
                | (Executing, Failed)
                | (Planning, Aborted)
                | (Executing, Aborted)
                | (Paused, Aborted)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub mission_type: MissionType,
    pub description: String,
    pub target: Vec3,
    pub priority: Scalar,
    pub assigned_agents: Vec<AgentId>,
    pub tasks: Vec<TaskId>,
    pub state: MissionState,
    /// In `[0, 1]`.
    pub completion: Scalar,
    pub start_timestamp: Option<i64>,
    pub deadline: Option<i64>,
    pub parameters: HashMap<String, String>,
}

impl Mission {
    pub fn new(mission_type: MissionType, description: impl Into<String>) -> Self {
        Self {
            id: MissionId::new(crate::domain::ids::generate("mission")),
            mission_type,
            description: description.into(),
            target: Vec3::ZERO,
            priority: 0.5,
            assigned_agents: Vec::new(),
            tasks: Vec::new(),
            state: MissionState::Planning,
            completion: 0.0,
            start_timestamp: None,
            deadline: None,
            parameters: HashMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<MissionId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    pub fn transition(&mut self, next: MissionState) -> bool {
        if !self.state.can_transition_to(next) {
            return false;
        }
        self.state = next;
        true
    }
}
