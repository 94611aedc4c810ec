//! `Task` and its status machine (`spec.md` §3, §4.4).

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{Scalar, Vec3};
use crate::domain::ids::{AgentId, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// State machine from `spec.md` §4.4: `pending -> assigned ->
    /// in_progress -> completed | failed`. Transitions to `failed` are
    /// caller-driven; allowed from any non-terminal state.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::{Assigned, Completed, Failed, InProgress, Pending};
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Assigned, InProgress)
                | (InProgress, Completed)
                | (Pending, Failed)
                | (Assigned, Failed)
                | (InProgress, Failed)
        )
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    pub location: Vec3,
    /// In `[0, 1]`.
    pub priority: Scalar,
    pub required_capabilities: Vec<String>,
    pub assigned_agents: Vec<AgentId>,
    pub status: TaskStatus,
    /// In `[0, 1]`; `1.0 <=> status == Completed`.
    pub completion: Scalar,
    pub deadline: Option<i64>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(crate::domain::ids::generate("task")),
            description: description.into(),
            location: Vec3::ZERO,
            priority: 0.5,
            required_capabilities: Vec::new(),
            assigned_agents: Vec::new(),
            status: TaskStatus::Pending,
            completion: 0.0,
            deadline: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_location(mut self, location: Vec3) -> Self {
        self.location = location;
        self
    }

    pub fn with_required_capabilities(mut self, caps: Vec<String>) -> Self {
        self.required_capabilities = caps;
        self
    }

    pub fn with_priority(mut self, priority: Scalar) -> Self {
        self.priority = priority.clamp(0.0, 1.0);
        self
    }

    /// Assigns a single agent and transitions `Pending -> Assigned`.
    /// Returns `false` (no-op) if the task is not pending.
    pub fn assign(&mut self, agent: AgentId) -> bool {
        if self.status != TaskStatus::Pending {
            return false;
        }
        self.assigned_agents = vec![agent];
        self.status = TaskStatus::Assigned;
        true
    }

    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::Completed;
        self.completion = 1.0;
    }
}
