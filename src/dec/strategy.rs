//! Built-in [`DecisionModeStrategy`] implementing the `Consensus` rule
//! from `spec.md` §4.4, with `Hierarchical` and `Democratic` treated as
//! `Consensus` per §4.4/§9 until a dedicated rule is supplied.
//!
//! `Centralized` and `Distributed` finalize unconditionally (on first
//! vote, and on tick, respectively) and are handled directly by
//! [`crate::dec::DecisionEngine`] rather than through this seam, since
//! neither needs the vote-tally evaluation a strategy provides.

use async_trait::async_trait;

use crate::domain::models::decision::{DecisionMode, DecisionOutcome, SwarmDecision};
use crate::domain::ports::DecisionModeStrategy;

#[derive(Debug, Default)]
pub struct DefaultDecisionStrategy;

#[async_trait]
impl DecisionModeStrategy for DefaultDecisionStrategy {
    async fn evaluate(&self, decision: &SwarmDecision) -> Option<DecisionOutcome> {
        match decision.mode {
            DecisionMode::Centralized | DecisionMode::Distributed => None,
            DecisionMode::Consensus | DecisionMode::Hierarchical | DecisionMode::Democratic => {
                if decision.votes.len() < decision.participating_agents.len() {
                    return None;
                }
                // Ties go to approved iff mean exactly equals threshold (§4.4).
                if decision.mean_confidence() >= decision.threshold {
                    Some(DecisionOutcome::Approved)
                } else {
                    Some(DecisionOutcome::Rejected)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::AgentId;

    fn decision_with_votes(threshold: f32, votes: &[(&str, f32)]) -> SwarmDecision {
        let participants = votes.iter().map(|(id, _)| AgentId::new(*id)).collect();
        let mut d = SwarmDecision::new("test", DecisionMode::Consensus, participants, threshold, 1000);
        for (id, confidence) in votes {
            d.record_vote(AgentId::new(*id), *confidence);
        }
        d
    }

    #[tokio::test]
    async fn incomplete_votes_do_not_finalize() {
        let strategy = DefaultDecisionStrategy;
        let participants = vec![AgentId::new("A"), AgentId::new("B")];
        let mut d = SwarmDecision::new("test", DecisionMode::Consensus, participants, 0.5, 1000);
        d.record_vote(AgentId::new("A"), 0.9);
        assert_eq!(strategy.evaluate(&d).await, None);
    }

    #[tokio::test]
    async fn exact_threshold_tie_approves() {
        let strategy = DefaultDecisionStrategy;
        let d = decision_with_votes(0.7, &[("A", 0.7), ("B", 0.7)]);
        assert_eq!(strategy.evaluate(&d).await, Some(DecisionOutcome::Approved));
    }

    #[tokio::test]
    async fn hierarchical_mode_uses_consensus_rule() {
        let strategy = DefaultDecisionStrategy;
        let participants = vec![AgentId::new("A")];
        let mut d = SwarmDecision::new("test", DecisionMode::Hierarchical, participants, 0.5, 1000);
        d.record_vote(AgentId::new("A"), 0.9);
        assert_eq!(strategy.evaluate(&d).await, Some(DecisionOutcome::Approved));
    }
}
