//! Domain entities for the swarm coordination substrate. Pure data plus
//! small invariant-checking methods; no subsystem wiring lives here.

pub mod agent;
pub mod behavior;
pub mod consensus;
pub mod context;
pub mod decision;
pub mod message;
pub mod mission;
pub mod proposal;
pub mod resource;
pub mod task;
pub mod tool;

pub use agent::{AgentState, Role};
pub use behavior::{BehaviorType, EmergentBehavior};
pub use consensus::ConsensusRound;
pub use context::ContextEntry;
pub use decision::{DecisionMode, DecisionOutcome, SwarmDecision};
pub use message::{Message, MessageKind, MessagePriority};
pub use mission::{Mission, MissionState, MissionType};
pub use proposal::Proposal;
pub use resource::Resource;
pub use task::{Task, TaskStatus};
pub use tool::Tool;
