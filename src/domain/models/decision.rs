//! `SwarmDecision` and its mode/outcome enums (`spec.md` §3, §4.4).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::Scalar;
use crate::domain::ids::{AgentId, DecisionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionMode {
    Centralized,
    Distributed,
    Consensus,
    /// Reserved; `spec.md` §4.4/§9 say to treat as `Consensus` with a
    /// mode-specific threshold until a dedicated rule is supplied.
    Hierarchical,
    /// Reserved; same treatment as `Hierarchical`.
    Democratic,
}

impl DecisionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Centralized => "centralized",
            Self::Distributed => "distributed",
            Self::Consensus => "consensus",
            Self::Hierarchical => "hierarchical",
            Self::Democratic => "democratic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionOutcome {
    Approved,
    Rejected,
    Distributed,
}

impl DecisionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Distributed => "distributed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwarmDecision {
    pub id: DecisionId,
    pub description: String,
    pub mode: DecisionMode,
    pub participating_agents: Vec<AgentId>,
    pub votes: HashMap<AgentId, Scalar>,
    pub threshold: Scalar,
    pub finalized: bool,
    pub outcome: Option<DecisionOutcome>,
    pub timestamp: i64,
}

impl SwarmDecision {
    pub fn new(
        description: impl Into<String>,
        mode: DecisionMode,
        participating_agents: Vec<AgentId>,
        threshold: Scalar,
        timestamp: i64,
    ) -> Self {
        Self {
            id: DecisionId::new(crate::domain::ids::generate("decision")),
            description: description.into(),
            mode,
            participating_agents,
            votes: HashMap::new(),
            threshold,
            finalized: false,
            outcome: None,
            timestamp,
        }
    }

    /// Arithmetic mean of recorded confidences; `0.0` with no votes.
    pub fn mean_confidence(&self) -> Scalar {
        if self.votes.is_empty() {
            return 0.0;
        }
        let sum: Scalar = self.votes.values().sum();
        sum / self.votes.len() as Scalar
    }

    /// Records a vote if the decision is not yet finalized. Returns
    /// `false` without mutating state when already finalized (§8: "a
    /// subsequent vote on a finalized decision returns false and does not
    /// modify votes").
    pub fn record_vote(&mut self, agent: AgentId, confidence: Scalar) -> bool {
        if self.finalized {
            return false;
        }
        self.votes.insert(agent, confidence);
        true
    }

    pub fn finalize(&mut self, outcome: DecisionOutcome) {
        self.finalized = true;
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_after_finalized_is_rejected_and_leaves_votes_unchanged() {
        let mut d = SwarmDecision::new(
            "proceed",
            DecisionMode::Consensus,
            vec![AgentId::new("a1"), AgentId::new("a2")],
            0.7,
            1000,
        );
        d.record_vote(AgentId::new("a1"), 0.9);
        d.finalize(DecisionOutcome::Approved);
        let accepted = d.record_vote(AgentId::new("a2"), 0.5);
        assert!(!accepted);
        assert_eq!(d.votes.len(), 1);
    }

    #[test]
    fn mean_confidence_of_consensus_approve_scenario() {
        let mut d = SwarmDecision::new(
            "proceed",
            DecisionMode::Consensus,
            vec![AgentId::new("a"), AgentId::new("b"), AgentId::new("c")],
            0.7,
            1000,
        );
        d.record_vote(AgentId::new("a"), 0.9);
        d.record_vote(AgentId::new("b"), 0.8);
        d.record_vote(AgentId::new("c"), 0.7);
        assert!((d.mean_confidence() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn mean_confidence_of_consensus_reject_scenario() {
        let mut d = SwarmDecision::new(
            "proceed",
            DecisionMode::Consensus,
            vec![AgentId::new("a"), AgentId::new("b"), AgentId::new("c")],
            0.7,
            1000,
        );
        d.record_vote(AgentId::new("a"), 0.6);
        d.record_vote(AgentId::new("b"), 0.5);
        d.record_vote(AgentId::new("c"), 0.8);
        assert!((d.mean_confidence() - 0.633_333_3).abs() < 1e-5);
    }
}
