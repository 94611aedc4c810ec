//! Per-subsystem error taxonomy.
//!
//! Every public boundary method still returns a bool/Option/sentinel — no
//! error crosses a subsystem boundary in normal operation. These enums
//! exist for internal propagation and for the `*_detailed` query variants
//! that want more than a yes/no answer, mirroring how the teacher's own
//! `domain::error` types separate "what went wrong" from "what the caller
//! does about it."

use thiserror::Error;

/// Errors raised inside the context/tool/resource registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CtxError {
    #[error("registry is not running")]
    NotInitialized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no entity found for id {0}")]
    NotFound(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("no executable tool named {0}")]
    NotExecutable(String),
}

impl CtxError {
    /// Whether retrying the same call later could plausibly succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::CapacityExceeded(_))
    }

    /// Whether the call is permanently wrong and retrying is pointless.
    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Errors raised inside the messaging/proposal/consensus layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MsgError {
    #[error("messaging layer is not running")]
    NotInitialized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no entity found for id {0}")]
    NotFound(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("proposal or consensus round has expired or already finalized")]
    ExpiredOrFinalized,
}

impl MsgError {
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::CapacityExceeded(_))
    }

    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Errors raised inside decision-making, role assignment, and task
/// allocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecError {
    #[error("decision engine is not running")]
    NotInitialized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no entity found for id {0}")]
    NotFound(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("decision already finalized")]
    ExpiredOrFinalized,
}

impl DecError {
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::CapacityExceeded(_))
    }

    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

/// Errors raised inside formation control.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no entity found for id {0}")]
    NotFound(String),
}

/// Errors raised by the orchestrator facade.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchError {
    #[error("orchestrator is not running; call start() after initialize()")]
    NotInitialized,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("no entity found for id {0}")]
    NotFound(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),
}

impl OrchError {
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NotInitialized | Self::CapacityExceeded(_))
    }

    pub const fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctx_not_initialized_is_transient() {
        assert!(CtxError::NotInitialized.is_transient());
        assert!(!CtxError::NotInitialized.is_permanent());
    }

    #[test]
    fn ctx_invalid_argument_is_permanent() {
        let e = CtxError::InvalidArgument("empty id".into());
        assert!(e.is_permanent());
        assert!(!e.is_transient());
    }

    #[test]
    fn msg_capacity_exceeded_is_transient() {
        let e = MsgError::CapacityExceeded("message_buffer_size".into());
        assert!(e.is_transient());
    }

    #[test]
    fn dec_expired_or_finalized_is_permanent() {
        assert!(DecError::ExpiredOrFinalized.is_permanent());
    }

    #[test]
    fn error_messages_are_human_readable() {
        let e = CtxError::NotFound("agent_1".into());
        assert_eq!(e.to_string(), "no entity found for id agent_1");
    }
}
