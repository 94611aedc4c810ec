//! `ConsensusRound` — a topic-scoped vote requiring a quorum of agents
//! (`spec.md` §3, §4.2).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::ids::{AgentId, ConsensusId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusRound {
    pub id: ConsensusId,
    pub topic: String,
    pub required_votes: u32,
    pub votes: HashMap<AgentId, String>,
    pub achieved: bool,
    pub timestamp: i64,
}

impl ConsensusRound {
    pub fn new(topic: impl Into<String>, required_votes: u32, timestamp: i64) -> Self {
        Self {
            id: ConsensusId::new(crate::domain::ids::generate("consensus")),
            topic: topic.into(),
            required_votes,
            votes: HashMap::new(),
            achieved: false,
            timestamp,
        }
    }

    /// `vote` overwrites any prior ballot by the same agent, then checks
    /// whether the quorum is now met.
    pub fn vote(&mut self, agent: impl Into<AgentId>, ballot: impl Into<String>) {
        self.votes.insert(agent.into(), ballot.into());
        if self.votes.len() as u32 >= self.required_votes {
            self.achieved = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vote_overwrites_prior_ballot_by_same_agent() {
        let mut round = ConsensusRound::new("formation-change", 2, 1000);
        round.vote("a1", "yes");
        round.vote("a1", "no");
        assert_eq!(round.votes.get(&AgentId::new("a1")).map(String::as_str), Some("no"));
    }

    #[test]
    fn achieved_flips_once_quorum_met() {
        let mut round = ConsensusRound::new("formation-change", 2, 1000);
        round.vote("a1", "yes");
        assert!(!round.achieved);
        round.vote("a2", "yes");
        assert!(round.achieved);
    }
}
