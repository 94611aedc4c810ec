//! `ContextEntry` — a timestamped snapshot published to CTX (`spec.md` §3,
//! §4.1). Bounded per-agent ring buffer; CTX is the sole owner.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::{Quat, Vec3};
use crate::domain::ids::AgentId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextEntry {
    pub agent_id: AgentId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    pub mission_state: String,
    pub perception: HashMap<String, String>,
    pub planning: HashMap<String, String>,
    pub execution: HashMap<String, String>,
    /// Unix millis; ring buffers are kept sorted non-decreasing on this
    /// field (§8 testable property).
    pub timestamp: i64,
}

impl ContextEntry {
    pub fn new(agent_id: impl Into<AgentId>, timestamp: i64) -> Self {
        Self {
            agent_id: agent_id.into(),
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            mission_state: String::new(),
            perception: HashMap::new(),
            planning: HashMap::new(),
            execution: HashMap::new(),
            timestamp,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_mission_state(mut self, mission_state: impl Into<String>) -> Self {
        self.mission_state = mission_state.into();
        self
    }

    pub const fn is_valid(&self) -> bool {
        !self.agent_id.0.is_empty() && self.timestamp != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_with_empty_agent_id_is_invalid() {
        let entry = ContextEntry::new("", 1000);
        assert!(!entry.is_valid());
    }

    #[test]
    fn entry_with_zero_timestamp_is_invalid() {
        let entry = ContextEntry::new("a1", 0);
        assert!(!entry.is_valid());
    }

    #[test]
    fn well_formed_entry_is_valid() {
        let entry = ContextEntry::new("a1", 1000);
        assert!(entry.is_valid());
    }
}
