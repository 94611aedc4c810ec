//! Swarm Substrate — an in-process coordination substrate for agentic
//! swarms.
//!
//! Four subsystems compose a running swarm:
//!
//! - [`ctx`] — the context registry: per-agent context history, tool
//!   discovery/execution, and shared resource accounting.
//! - [`msg`] — agent-to-agent messaging: queued delivery, proposals,
//!   and consensus rounds.
//! - [`dec`] — distributed decision-making: role assignment, task
//!   allocation, and emergent-behavior detection.
//! - [`form`] — geometric formation control: the per-tick control law
//!   that turns a formation shape into per-agent velocity/acceleration
//!   commands.
//!
//! [`orch::Orchestrator`] is the thin facade that owns one instance of
//! each subsystem and drives them through a shared tick. Most callers
//! only need `Orchestrator`; the subsystems are public so advanced
//! callers can reach operations the facade doesn't re-expose (tool
//! registration, proposals, consensus voting).

pub mod config;
pub mod ctx;
pub mod dec;
pub mod domain;
pub mod form;
pub mod logging;
pub mod msg;
pub mod orch;

pub use config::{CtxConfig, DecConfig, FormConfig, MsgConfig, SwarmConfig, SwarmSubstrateConfig};
pub use domain::error::{CtxError, DecError, FormError, MsgError, OrchError};
pub use orch::{OrchEvent, Orchestrator};
