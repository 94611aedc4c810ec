//! `Resource` — a capacity-bounded shared asset tracked by CTX
//! (`spec.md` §3, §4.1).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::geometry::Scalar;
use crate::domain::ids::{AgentId, ResourceId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: ResourceId,
    pub resource_type: String,
    pub owner_id: AgentId,
    pub capacity: Scalar,
    pub current_usage: Scalar,
    pub available: bool,
    pub metadata: HashMap<String, String>,
}

impl Resource {
    pub fn new(
        id: impl Into<ResourceId>,
        resource_type: impl Into<String>,
        owner_id: impl Into<AgentId>,
        capacity: Scalar,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            owner_id: owner_id.into(),
            capacity,
            current_usage: 0.0,
            available: true,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// `requestResource` admission check (§4.1): unavailable resources and
    /// amounts that would overrun capacity are refused; bookkeeping does
    /// not track which requester holds which share (§9 open question).
    pub fn can_reserve(&self, amount: Scalar) -> bool {
        self.available && self.current_usage + amount <= self.capacity
    }

    pub fn reserve(&mut self, amount: Scalar) {
        self.current_usage += amount;
    }

    /// `releaseResource` zeroes the counter unconditionally, per the
    /// source-compatible semantics `spec.md` §9 requires.
    pub fn release(&mut self) {
        self.current_usage = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_reserve_refuses_when_unavailable() {
        let mut r = Resource::new("r1", "battery", "a1", 1.0);
        r.available = false;
        assert!(!r.can_reserve(0.1));
    }

    #[test]
    fn can_reserve_refuses_when_overcommitting() {
        let mut r = Resource::new("r1", "battery", "a1", 1.0);
        r.reserve(0.6);
        assert!(!r.can_reserve(0.5));
        assert!((r.current_usage - 0.6).abs() < 1e-6);
    }

    #[test]
    fn release_zeroes_usage_regardless_of_requester() {
        let mut r = Resource::new("r1", "battery", "a1", 1.0);
        r.reserve(0.6);
        r.release();
        assert!((r.current_usage - 0.0).abs() < 1e-6);
    }
}
