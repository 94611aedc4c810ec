//! `Proposal` — a task offer broadcast via MSG (`spec.md` §3, §4.2).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::geometry::Scalar;
use crate::domain::ids::{AgentId, ProposalId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub proposer: AgentId,
    pub description: String,
    pub required_agents: u32,
    pub estimated_duration_secs: u64,
    pub priority: Scalar,
    pub parameters: HashMap<String, String>,
    pub accepted_votes: HashSet<AgentId>,
    /// Unix millis after which the proposal is garbage-collectable.
    pub expiry_timestamp: i64,
}

impl Proposal {
    pub fn new(proposer: impl Into<AgentId>, description: impl Into<String>) -> Self {
        Self {
            id: ProposalId::new(crate::domain::ids::generate("proposal")),
            proposer: proposer.into(),
            description: description.into(),
            required_agents: 1,
            estimated_duration_secs: 0,
            priority: 0.5,
            parameters: HashMap::new(),
            accepted_votes: HashSet::new(),
            expiry_timestamp: 0,
        }
    }

    pub fn with_id(mut self, id: impl Into<ProposalId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_required_agents(mut self, n: u32) -> Self {
        self.required_agents = n;
        self
    }

    pub fn with_expiry(mut self, expiry_timestamp: i64) -> Self {
        self.expiry_timestamp = expiry_timestamp;
        self
    }

    pub fn is_active(&self, now_ms: i64) -> bool {
        self.expiry_timestamp > now_ms
    }

    /// `acceptProposal` is idempotent: returns whether the set changed.
    pub fn accept(&mut self, agent: AgentId) -> bool {
        self.accepted_votes.insert(agent)
    }
}
