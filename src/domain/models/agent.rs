//! The authoritative per-agent state owned by DEC (`spec.md` §3).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{Quat, Scalar, Vec3};
use crate::domain::ids::AgentId;

/// A role assigned by DEC's dynamic role-reassignment pass (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Leader,
    Scout,
    Guardian,
    Relay,
    Worker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::Scout => "scout",
            Self::Guardian => "guardian",
            Self::Relay => "relay",
            Self::Worker => "worker",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "leader" => Some(Self::Leader),
            "scout" => Some(Self::Scout),
            "guardian" => Some(Self::Guardian),
            "relay" => Some(Self::Relay),
            "worker" => Some(Self::Worker),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Worker
    }
}

/// Snapshot of one agent's pose, capabilities, and energy at a point in
/// time. Owned exclusively by DEC; CTX and FORM act on copies or
/// references passed by the orchestrator, never on the table itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub id: AgentId,
    pub role: Role,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    /// Normalized remaining energy, in `[0, 1]`.
    pub energy: Scalar,
    pub capabilities: HashMap<String, Scalar>,
    pub current_behavior: Option<String>,
    /// Unix millis.
    pub timestamp: i64,
    /// Task IDs currently assigned to this agent; used by the workload
    /// term in the task-allocation fitness formula (§4.4).
    pub assigned_tasks: Vec<crate::domain::ids::TaskId>,
}

impl AgentState {
    pub fn new(id: impl Into<AgentId>, timestamp: i64) -> Self {
        Self {
            id: id.into(),
            role: Role::default(),
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            energy: 1.0,
            capabilities: HashMap::new(),
            current_behavior: None,
            timestamp,
            assigned_tasks: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_capabilities(mut self, capabilities: HashMap<String, Scalar>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_energy(mut self, energy: Scalar) -> Self {
        self.energy = energy.clamp(0.0, 1.0);
        self
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }
}
