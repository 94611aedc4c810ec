//! Configuration aggregate for the substrate, loaded the way the
//! originating workspace's `infrastructure::config::ConfigLoader` does:
//! programmatic defaults, merged with an optional YAML file, merged with
//! `SWARM_`-prefixed environment variables, then validated.

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::decision::DecisionMode;
use crate::form::FormationType;

/// Swarm-level options (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SwarmConfig {
    pub min_agents: u32,
    pub max_agents: u32,
    pub update_rate_hz: f32,
    pub enable_auto_recovery: bool,
    pub enable_adaptive_formation: bool,
    pub agent_timeout_sec: f32,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            min_agents: 2,
            max_agents: 100,
            update_rate_hz: 10.0,
            enable_auto_recovery: true,
            enable_adaptive_formation: true,
            agent_timeout_sec: 5.0,
        }
    }
}

/// CTX options (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CtxConfig {
    pub server_id: String,
    /// Unused in-process; retained for wire compatibility (§6).
    pub port: u16,
    pub max_agents: u32,
    pub context_buffer_size: usize,
    pub context_timeout_sec: f32,
    /// Reserved.
    pub enable_encryption: bool,
}

impl Default for CtxConfig {
    fn default() -> Self {
        Self {
            server_id: "ctx-0".to_string(),
            port: 0,
            max_agents: 100,
            context_buffer_size: 1000,
            context_timeout_sec: 5.0,
            enable_encryption: false,
        }
    }
}

/// MSG options (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MsgConfig {
    pub agent_id: String,
    /// Unused in-process.
    pub port: u16,
    pub max_connections: u32,
    pub message_buffer_size: usize,
    pub heartbeat_interval_sec: f32,
    pub connection_timeout_sec: f32,
    /// Reserved.
    pub enable_encryption: bool,
}

impl Default for MsgConfig {
    fn default() -> Self {
        Self {
            agent_id: "msg-0".to_string(),
            port: 0,
            max_connections: 100,
            message_buffer_size: 1000,
            heartbeat_interval_sec: 5.0,
            connection_timeout_sec: 15.0,
            enable_encryption: false,
        }
    }
}

/// DEC options (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DecConfig {
    pub default_decision_mode: DecisionMode,
    pub consensus_threshold: f32,
    pub role_change_threshold: f32,
    pub max_agents: u32,
    pub communication_range_meters: f32,
    pub perception_range_meters: f32,
    pub enable_emergent_behavior: bool,
    pub enable_dynamic_roles: bool,
}

impl Default for DecConfig {
    fn default() -> Self {
        Self {
            default_decision_mode: DecisionMode::Consensus,
            consensus_threshold: 0.7,
            role_change_threshold: 0.1,
            max_agents: 100,
            communication_range_meters: 100.0,
            perception_range_meters: 50.0,
            enable_emergent_behavior: true,
            enable_dynamic_roles: true,
        }
    }
}

/// FORM options (`spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormConfig {
    pub formation_type: FormationType,
    pub spacing: f32,
    pub collision_radius: f32,
    pub max_velocity: f32,
    pub max_acceleration: f32,
    pub k_position: f32,
    pub k_velocity: f32,
    pub k_separation: f32,
    pub k_cohesion: f32,
    pub k_alignment: f32,
    pub formation_radius: f32,
    pub formation_angle: f32,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            formation_type: FormationType::Line,
            spacing: 5.0,
            collision_radius: 2.0,
            max_velocity: 10.0,
            max_acceleration: 5.0,
            k_position: 1.0,
            k_velocity: 1.0,
            k_separation: 1.0,
            k_cohesion: 0.5,
            k_alignment: 0.5,
            formation_radius: 10.0,
            formation_angle: std::f32::consts::FRAC_PI_4,
        }
    }
}

/// The full configuration tree accepted by `Orchestrator::initialize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SwarmSubstrateConfig {
    pub swarm: SwarmConfig,
    pub ctx: CtxConfig,
    pub msg: MsgConfig,
    pub dec: DecConfig,
    pub form: FormConfig,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("swarm.min_agents must be >= 1")]
    MinAgentsTooLow,

    #[error("swarm.max_agents must be >= swarm.min_agents")]
    MaxAgentsBelowMin,

    #[error("swarm.update_rate_hz must be > 0")]
    InvalidUpdateRate,

    #[error("ctx.context_buffer_size must be > 0")]
    InvalidContextBufferSize,

    #[error("msg.message_buffer_size must be > 0")]
    InvalidMessageBufferSize,

    #[error("dec.consensus_threshold must be in [0, 1]")]
    InvalidConsensusThreshold,

    #[error("form.max_velocity must be > 0")]
    InvalidMaxVelocity,

    #[error("form.max_acceleration must be > 0")]
    InvalidMaxAcceleration,
}

impl SwarmSubstrateConfig {
    /// Loads defaults, merges an optional `swarm.yaml` in the current
    /// directory, then `SWARM_`-prefixed environment variables (double
    /// underscore separates nesting, e.g. `SWARM_DEC__CONSENSUS_THRESHOLD`),
    /// and validates the result.
    pub fn load() -> anyhow::Result<Self> {
        let config: Self = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Yaml::file("swarm.yaml"))
            .merge(Env::prefixed("SWARM_").split("__"))
            .extract()?;
        Self::validate(&config)?;
        Ok(config)
    }

    pub fn validate(config: &Self) -> Result<(), ConfigError> {
        if config.swarm.min_agents < 1 {
            return Err(ConfigError::MinAgentsTooLow);
        }
        if config.swarm.max_agents < config.swarm.min_agents {
            return Err(ConfigError::MaxAgentsBelowMin);
        }
        if config.swarm.update_rate_hz <= 0.0 {
            return Err(ConfigError::InvalidUpdateRate);
        }
        if config.ctx.context_buffer_size == 0 {
            return Err(ConfigError::InvalidContextBufferSize);
        }
        if config.msg.message_buffer_size == 0 {
            return Err(ConfigError::InvalidMessageBufferSize);
        }
        if !(0.0..=1.0).contains(&config.dec.consensus_threshold) {
            return Err(ConfigError::InvalidConsensusThreshold);
        }
        if config.form.max_velocity <= 0.0 {
            return Err(ConfigError::InvalidMaxVelocity);
        }
        if config.form.max_acceleration <= 0.0 {
            return Err(ConfigError::InvalidMaxAcceleration);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        let config = SwarmSubstrateConfig::default();
        assert!(SwarmSubstrateConfig::validate(&config).is_ok());
    }

    #[test]
    fn rejects_max_agents_below_min_agents() {
        let mut config = SwarmSubstrateConfig::default();
        config.swarm.min_agents = 10;
        config.swarm.max_agents = 5;
        assert_eq!(
            SwarmSubstrateConfig::validate(&config),
            Err(ConfigError::MaxAgentsBelowMin)
        );
    }

    #[test]
    fn rejects_out_of_range_consensus_threshold() {
        let mut config = SwarmSubstrateConfig::default();
        config.dec.consensus_threshold = 1.5;
        assert_eq!(
            SwarmSubstrateConfig::validate(&config),
            Err(ConfigError::InvalidConsensusThreshold)
        );
    }

    #[test]
    fn env_vars_override_yaml_and_defaults() {
        temp_env::with_var("SWARM_DEC__CONSENSUS_THRESHOLD", Some("0.9"), || {
            let config: SwarmSubstrateConfig = Figment::new()
                .merge(Serialized::defaults(SwarmSubstrateConfig::default()))
                .merge(Env::prefixed("SWARM_").split("__"))
                .extract()
                .expect("figment extraction should succeed");
            assert!((config.dec.consensus_threshold - 0.9).abs() < 1e-6);
        });
    }
}
