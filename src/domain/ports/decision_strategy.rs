//! Extensibility seam for DEC's decision finalization rule (`spec.md`
//! §9: "interface abstractions only where extensibility is a stated
//! requirement — tool executors, decision mode strategies").
//!
//! The four built-in modes (`Centralized`, `Distributed`, `Consensus`,
//! and the `Hierarchical`/`Democratic` modes that `spec.md` §4.4 and §9
//! say to treat as `Consensus` until specialized) are implemented as the
//! default strategy in `crate::dec`. A caller may supply a custom
//! strategy instead of forking the crate.

use async_trait::async_trait;

use crate::domain::models::decision::{DecisionOutcome, SwarmDecision};

/// Decides whether (and how) a [`SwarmDecision`] should finalize, given
/// its current vote tally.
#[async_trait]
pub trait DecisionModeStrategy: Send + Sync {
    /// Returns `Some(outcome)` if the decision should finalize now, or
    /// `None` if it should remain open.
    async fn evaluate(&self, decision: &SwarmDecision) -> Option<DecisionOutcome>;
}
