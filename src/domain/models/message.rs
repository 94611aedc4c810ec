//! `Message` and supporting enums for MSG (`spec.md` §3, §4.2).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::ids::{AgentId, MessageId};

/// Finite set of message kinds MSG itself ever produces, plus an escape
/// hatch for application-defined kinds used with callback registration
/// (`spec.md` §9: "tagged variants for finite enums ... message kind").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Broadcast,
    Proposal,
    Accept,
    Reject,
    ConsensusRequest,
    Custom(String),
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Broadcast => "broadcast",
            Self::Proposal => "proposal",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::ConsensusRequest => "consensus_request",
            Self::Custom(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MessagePriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl Default for MessagePriority {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: AgentId,
    /// Empty means broadcast, per `spec.md` §3.
    pub receiver: AgentId,
    pub kind: MessageKind,
    pub content: String,
    pub data: HashMap<String, String>,
    pub priority: MessagePriority,
    /// Unix millis.
    pub timestamp: i64,
    pub ttl_seconds: Option<u64>,
}

impl Message {
    pub fn new(sender: impl Into<AgentId>, kind: MessageKind, timestamp: i64) -> Self {
        Self {
            id: MessageId::new(crate::domain::ids::generate("msg")),
            sender: sender.into(),
            receiver: AgentId::new(""),
            kind,
            content: String::new(),
            data: HashMap::new(),
            priority: MessagePriority::default(),
            timestamp,
            ttl_seconds: None,
        }
    }

    pub fn with_receiver(mut self, receiver: impl Into<AgentId>) -> Self {
        self.receiver = receiver.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_data(mut self, data: HashMap<String, String>) -> Self {
        self.data = data;
        self
    }

    pub fn with_priority(mut self, priority: MessagePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_ttl_secs(mut self, ttl: u64) -> Self {
        self.ttl_seconds = Some(ttl);
        self
    }

    /// Message contract from `spec.md` §4.2: `sender != "" && timestamp > 0`.
    pub fn is_valid(&self) -> bool {
        !self.sender.is_empty() && self.timestamp > 0
    }

    pub fn is_broadcast(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_with_empty_sender_is_invalid() {
        let m = Message::new("", MessageKind::Broadcast, 1000);
        assert!(!m.is_valid());
    }

    #[test]
    fn message_with_zero_timestamp_is_invalid() {
        let m = Message::new("a1", MessageKind::Broadcast, 0);
        assert!(!m.is_valid());
    }

    #[test]
    fn message_without_receiver_is_broadcast() {
        let m = Message::new("a1", MessageKind::Broadcast, 1000);
        assert!(m.is_broadcast());
    }

    #[test]
    fn message_with_receiver_is_not_broadcast() {
        let m = Message::new("a1", MessageKind::Accept, 1000).with_receiver("a2");
        assert!(!m.is_broadcast());
    }

    #[test]
    fn priority_ordering_is_low_to_urgent() {
        assert!(MessagePriority::Low < MessagePriority::Normal);
        assert!(MessagePriority::Normal < MessagePriority::High);
        assert!(MessagePriority::High < MessagePriority::Urgent);
    }
}
