//! `EmergentBehavior` — a swarm-level pattern inferred from spatial
//! statistics (`spec.md` §3, §4.4).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::Scalar;
use crate::domain::ids::{AgentId, BehaviorId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorType {
    Aggregation,
    Formation,
}

impl BehaviorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aggregation => "aggregation",
            Self::Formation => "formation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergentBehavior {
    pub id: BehaviorId,
    pub behavior_type: BehaviorType,
    pub triggering_agents: Vec<AgentId>,
    pub parameters: HashMap<String, Scalar>,
    /// In `[0, 1]`.
    pub strength: Scalar,
    pub start_timestamp: i64,
    pub duration_ms: i64,
}

impl EmergentBehavior {
    pub fn new(
        behavior_type: BehaviorType,
        triggering_agents: Vec<AgentId>,
        strength: Scalar,
        start_timestamp: i64,
        duration_ms: i64,
    ) -> Self {
        Self {
            id: BehaviorId::new(crate::domain::ids::generate("behavior")),
            behavior_type,
            triggering_agents,
            parameters: HashMap::new(),
            strength,
            start_timestamp,
            duration_ms,
        }
    }

    /// `getActiveBehaviors` filters on `now - start < duration_ms`.
    pub fn is_active(&self, now_ms: i64) -> bool {
        now_ms - self.start_timestamp < self.duration_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn behavior_expires_after_duration() {
        let b = EmergentBehavior::new(BehaviorType::Aggregation, vec![], 0.6, 1000, 500);
        assert!(b.is_active(1200));
        assert!(!b.is_active(1600));
    }
}
