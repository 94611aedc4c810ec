//! Opaque, non-empty string identifiers for every entity kind in the
//! substrate, plus the monotonic ID generator described in `spec.md` §3.
//!
//! Each kind gets its own newtype so that, for example, an `AgentId` can
//! never be passed where a `TaskId` is expected. All of them deref to
//! `str` for ergonomic comparisons and formatting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }
    };
}

id_newtype!(AgentId);
id_newtype!(TaskId);
id_newtype!(ResourceId);
id_newtype!(MessageId);
id_newtype!(ProposalId);
id_newtype!(ConsensusId);
id_newtype!(DecisionId);
id_newtype!(BehaviorId);
id_newtype!(MissionId);

/// Per-prefix monotonic sequence counters, used to break ties when the
/// wall clock resolution is coarser than the allocation rate (spec.md §3,
/// §9 "Monotonic-time IDs that collide under coarse clocks").
///
/// A real process allocates a handful of prefixes (`task`, `msg`,
/// `proposal`, ...); a small fixed-size table keyed by prefix via a single
/// lock-free counter per distinct prefix is overkill, so we keep one
/// global counter and fold the prefix into the formatted ID instead of
/// trying to shard counters per prefix.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Generate an ID of the form `"<prefix>_<monotonic_ms_timestamp>_<seq>"`.
///
/// The sequence suffix guarantees uniqueness within a process even when
/// multiple IDs are minted within the same millisecond.
pub fn generate(prefix: &str) -> String {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{now_ms}_{seq}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_even_within_the_same_millisecond() {
        let ids: Vec<String> = (0..1000).map(|_| generate("task")).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
    }

    #[test]
    fn generated_ids_carry_the_requested_prefix() {
        let id = generate("agent");
        assert!(id.starts_with("agent_"));
    }

    #[test]
    fn newtype_deref_and_display_agree() {
        let id = AgentId::new("scout-1");
        assert_eq!(id.as_str(), "scout-1");
        assert_eq!(format!("{id}"), "scout-1");
        assert_eq!(&*id, "scout-1");
    }

    #[test]
    fn empty_id_is_detected() {
        assert!(AgentId::new("").is_empty());
        assert!(!AgentId::new("x").is_empty());
    }
}
