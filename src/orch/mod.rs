//! ORCH — the thin facade composing CTX, MSG, DEC, and FORM into
//! per-tick swarm updates and mission lifecycle (`spec.md` §2, §6).
//!
//! Lock hierarchy (`spec.md` §5): `ORCH.state > ORCH.missions >
//! DEC.* > MSG.* > CTX.*`. `ORCH.state` covers `running`/`leader_id`/
//! `form_params`; `missions` is its own table; agent state lives
//! entirely inside DEC (the Ownership model in `spec.md` §3 gives DEC
//! exclusive ownership of `AgentState`, so ORCH never keeps its own
//! agent table to alias against). No subsystem below this facade ever
//! calls back up it while holding a lock.

pub mod events;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{broadcast, RwLock};

use crate::config::SwarmSubstrateConfig;
use crate::ctx::ContextRegistry;
use crate::dec::DecisionEngine;
use crate::domain::geometry::{Scalar, Vec3};
use crate::domain::ids::{AgentId, MissionId};
use crate::domain::models::agent::AgentState;
use crate::domain::models::context::ContextEntry;
use crate::domain::models::message::Message;
use crate::domain::models::mission::{Mission, MissionState};
use crate::form::{self, FormationCommand, FormationParams, FormationType};
use crate::msg::MessageBus;

pub use events::OrchEvent;

/// Per-tick command for one follower, with the agent it applies to.
#[derive(Debug, Clone)]
pub struct FollowerCommand {
    pub agent_id: AgentId,
    pub command: FormationCommand,
}

/// Aggregate swarm snapshot returned by `getSwarmState`.
#[derive(Debug, Clone)]
pub struct SwarmState {
    pub agents: Vec<AgentState>,
    pub centroid: Vec3,
    pub cohesion: Scalar,
    pub dispersion: Scalar,
}

pub struct Orchestrator {
    config: SwarmSubstrateConfig,
    running: AtomicBool,
    missions: RwLock<HashMap<MissionId, Mission>>,
    ctx: ContextRegistry,
    msg: MessageBus,
    dec: DecisionEngine,
    form_params: RwLock<FormationParams>,
    leader_id: RwLock<Option<AgentId>>,
    event_tx: broadcast::Sender<OrchEvent>,
}

impl Orchestrator {
    /// `initialize(config)` (`spec.md` §6): validates the configuration
    /// and constructs the composed substrate. Subsystem configuration is
    /// fixed at construction (see `DESIGN.md`); a fresh `Orchestrator` is
    /// the unit of reconfiguration.
    pub fn initialize(config: SwarmSubstrateConfig) -> Result<Self, crate::config::ConfigError> {
        SwarmSubstrateConfig::validate(&config)?;
        let (event_tx, _rx) = broadcast::channel(256);
        let form_params = FormationParams {
            formation_type: config.form.formation_type,
            spacing: config.form.spacing,
            collision_radius: config.form.collision_radius,
            max_velocity: config.form.max_velocity,
            max_acceleration: config.form.max_acceleration,
            k_position: config.form.k_position,
            k_velocity: config.form.k_velocity,
            k_separation: config.form.k_separation,
            k_cohesion: config.form.k_cohesion,
            k_alignment: config.form.k_alignment,
            formation_radius: config.form.formation_radius,
            formation_angle: config.form.formation_angle,
            custom_positions: HashMap::new(),
            update_rate_hz: config.swarm.update_rate_hz,
        };
        Ok(Self {
            ctx: ContextRegistry::new(config.ctx.clone()),
            msg: MessageBus::new(config.msg.clone()),
            dec: DecisionEngine::new(config.dec.clone()),
            config,
            running: AtomicBool::new(false),
            missions: RwLock::new(HashMap::new()),
            form_params: RwLock::new(form_params),
            leader_id: RwLock::new(None),
            event_tx,
        })
    }

    pub fn start(&self) -> bool {
        self.ctx.start();
        self.msg.start();
        self.dec.start();
        self.running.store(true, Ordering::SeqCst);
        true
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.ctx.stop();
        self.msg.stop();
        self.dec.stop();
    }

    /// `reset()` (`spec.md` §5): implies `stop()` then drops all state
    /// across every subsystem.
    pub async fn reset(&self) {
        self.stop();
        self.ctx.reset().await;
        self.msg.reset().await;
        self.dec.reset().await;
        self.missions.write().await.clear();
        *self.leader_id.write().await = None;
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<OrchEvent> {
        self.event_tx.subscribe()
    }

    // --- Agent CRUD (`spec.md` §6) ---

    pub async fn add_agent(&self, agent: AgentState) -> bool {
        self.dec.add_agent(agent).await
    }

    pub async fn remove_agent(&self, id: &AgentId) -> bool {
        self.dec.remove_agent(id).await
    }

    pub async fn update_agent(&self, agent: AgentState) -> bool {
        self.dec.update_agent(agent).await
    }

    pub async fn get_agent(&self, id: &AgentId) -> Option<AgentState> {
        self.dec.get_agent(id).await
    }

    pub async fn get_all_agents(&self) -> Vec<AgentState> {
        self.dec.get_all_agents().await
    }

    pub async fn get_agent_count(&self) -> usize {
        self.dec.get_agent_count().await
    }

    // --- Mission CRUD and lifecycle (`spec.md` §6) ---

    /// `createMission` (§6): assigns an id if unset, sets `state =
    /// Planning`.
    pub async fn create_mission(&self, mut mission: Mission) -> MissionId {
        if mission.id.is_empty() {
            mission.id = crate::domain::ids::MissionId::new(crate::domain::ids::generate("mission"));
        }
        mission.state = MissionState::Planning;
        let id = mission.id.clone();
        self.missions.write().await.insert(id.clone(), mission);
        id
    }

    async fn transition_mission(&self, id: &MissionId, next: MissionState) -> bool {
        let transitioned = {
            let mut missions = self.missions.write().await;
            let Some(mission) = missions.get_mut(id) else {
                return false;
            };
            mission.transition(next)
        };
        if transitioned {
            let _ = self.event_tx.send(OrchEvent::MissionTransitioned {
                mission_id: id.clone(),
                state: next,
            });
        }
        transitioned
    }

    pub async fn start_mission(&self, id: &MissionId) -> bool {
        self.transition_mission(id, MissionState::Executing).await
    }

    pub async fn pause_mission(&self, id: &MissionId) -> bool {
        self.transition_mission(id, MissionState::Paused).await
    }

    pub async fn resume_mission(&self, id: &MissionId) -> bool {
        self.transition_mission(id, MissionState::Executing).await
    }

    pub async fn abort_mission(&self, id: &MissionId) -> bool {
        self.transition_mission(id, MissionState::Aborted).await
    }

    pub async fn get_mission(&self, id: &MissionId) -> Option<Mission> {
        self.missions.read().await.get(id).cloned()
    }

    pub async fn get_active_missions(&self) -> Vec<Mission> {
        self.missions
            .read()
            .await
            .values()
            .filter(|m| matches!(m.state, MissionState::Planning | MissionState::Executing))
            .cloned()
            .collect()
    }

    // --- Formation (`spec.md` §6, §4.3) ---

    pub async fn set_formation(&self, formation_type: FormationType) {
        self.form_params.write().await.formation_type = formation_type;
    }

    pub async fn set_formation_leader(&self, id: AgentId) {
        *self.leader_id.write().await = Some(id);
    }

    pub async fn get_formation_type(&self) -> FormationType {
        self.form_params.read().await.formation_type
    }

    /// `getFormationCommands()` (§6): per-follower commands for the
    /// current snapshot. Empty if no leader is set or the leader is
    /// unknown to DEC.
    pub async fn get_formation_commands(&self) -> Vec<FollowerCommand> {
        let Some(leader_id) = self.leader_id.read().await.clone() else {
            return Vec::new();
        };
        let Some(leader) = self.dec.get_agent(&leader_id).await else {
            return Vec::new();
        };
        let all_agents = self.dec.get_all_agents().await;
        let followers: Vec<(AgentId, AgentState)> = all_agents
            .into_iter()
            .filter(|a| a.id != leader_id)
            .map(|a| (a.id.clone(), a))
            .collect();
        let n = followers.len() + 1;
        let params = self.form_params.read().await.clone();
        form::compute_formation_commands(&params, &leader, &followers, n)
            .into_iter()
            .map(|(agent_id, command)| FollowerCommand { agent_id, command })
            .collect()
    }

    // --- Swarm intelligence toggles & queries (`spec.md` §6) ---

    pub fn enable_collective_decision_making(&self, _enabled: bool) {
        // Decision-making is always available through `propose_decision`;
        // this toggle is reserved for a future gate on automatic proposal
        // generation, which this substrate does not perform on its own.
    }

    pub fn enable_emergent_behaviors(&self, enabled: bool) {
        self.dec.set_enable_emergent_behavior(enabled);
    }

    pub fn enable_dynamic_role_assignment(&self, enabled: bool) {
        self.dec.set_enable_dynamic_roles(enabled);
    }

    pub async fn get_emergent_behaviors(&self, now: i64) -> Vec<crate::domain::models::behavior::EmergentBehavior> {
        self.dec.get_active_behaviors(now).await
    }

    /// `assessSwarmCapabilities` (§6): union of every registered agent's
    /// capability names.
    pub async fn assess_swarm_capabilities(&self) -> Vec<String> {
        let agents = self.dec.get_all_agents().await;
        let mut caps: Vec<String> = agents
            .iter()
            .flat_map(|a| a.capabilities.keys().cloned())
            .collect();
        caps.sort();
        caps.dedup();
        caps
    }

    // --- Messaging passthrough (`spec.md` §6) ---

    pub async fn broadcast_message(&self, message: Message) -> bool {
        self.msg.send_broadcast(message).await
    }

    pub async fn send_agent_message(&self, message: Message) -> bool {
        self.msg.send_message(message).await
    }

    pub async fn get_messages(&self) -> Vec<Message> {
        self.msg.receive_messages().await
    }

    pub async fn publish_context(&self, entry: ContextEntry) -> bool {
        self.ctx.publish_context(entry).await
    }

    pub async fn query_swarm_context(&self, agent_id: &AgentId) -> Vec<ContextEntry> {
        self.ctx.query_context(agent_id).await
    }

    // --- Snapshot queries (`spec.md` §6) ---

    pub async fn get_swarm_state(&self) -> SwarmState {
        let agents = self.dec.get_all_agents().await;
        SwarmState {
            agents,
            centroid: self.dec.swarm_centroid().await,
            cohesion: self.dec.swarm_cohesion().await,
            dispersion: self.dec.swarm_dispersion().await,
        }
    }

    pub async fn get_swarm_centroid(&self) -> Vec3 {
        self.dec.swarm_centroid().await
    }

    pub async fn get_swarm_cohesion(&self) -> Scalar {
        self.dec.swarm_cohesion().await
    }

    pub async fn get_swarm_dispersion(&self) -> Scalar {
        self.dec.swarm_dispersion().await
    }

    /// Direct accessors for the composed subsystems, for callers that
    /// need operations this facade does not re-expose (e.g. tool
    /// registration, proposals, consensus).
    pub fn ctx(&self) -> &ContextRegistry {
        &self.ctx
    }

    pub fn msg(&self) -> &MessageBus {
        &self.msg
    }

    pub fn dec(&self) -> &DecisionEngine {
        &self.dec
    }

    /// `update(dt)` (`spec.md` §2, §6): drives one tick of the data flow
    /// documented in `spec.md` §2 — publish agent states to CTX, let DEC
    /// finalize decisions/allocate tasks/reassign roles/detect
    /// behaviors, let FORM compute follower commands, advance missions,
    /// emit `TickCompleted`.
    pub async fn update(&self, dt: f32) -> bool {
        if !self.is_running() {
            return false;
        }
        let now = chrono::Utc::now().timestamp_millis();

        for agent in self.dec.get_all_agents().await {
            let entry = ContextEntry::new(agent.id.clone(), now)
                .with_position(agent.position)
                .with_mission_state(
                    agent
                        .current_behavior
                        .clone()
                        .unwrap_or_default(),
                );
            self.ctx.publish_context(entry).await;
        }

        self.msg.sweep_expired_proposals().await;
        self.msg.sweep_stale_peers(now).await;
        let outcome = self.dec.tick(now).await;
        for task_id in outcome.assigned_tasks {
            let _ = self.event_tx.send(OrchEvent::TaskAssigned { task_id });
        }
        for behavior_id in outcome.detected_behaviors {
            let _ = self.event_tx.send(OrchEvent::BehaviorDetected { behavior_id });
        }

        {
            let mut missions = self.missions.write().await;
            for mission in missions.values_mut() {
                if mission.state == MissionState::Executing && (mission.completion - 1.0).abs() < 1e-6 {
                    mission.state = MissionState::Completed;
                }
            }
        }

        let _ = self.event_tx.send(OrchEvent::TickCompleted { dt, timestamp: now });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::mission::MissionType;

    fn orchestrator() -> Orchestrator {
        let orch = Orchestrator::initialize(SwarmSubstrateConfig::default()).unwrap();
        orch.start();
        orch
    }

    #[tokio::test]
    async fn add_agent_and_get_agent_round_trip() {
        let orch = orchestrator();
        let agent = AgentState::new("scout-1", 0);
        assert!(orch.add_agent(agent).await);
        assert!(orch.get_agent(&AgentId::new("scout-1")).await.is_some());
    }

    #[tokio::test]
    async fn mission_lifecycle_transitions_through_orchestrator() {
        let orch = orchestrator();
        let mission = Mission::new(MissionType::Surveillance, "patrol sector 7");
        let id = orch.create_mission(mission).await;
        assert!(orch.start_mission(&id).await);
        let stored = orch.get_mission(&id).await.unwrap();
        assert_eq!(stored.state, MissionState::Executing);
        assert!(orch.pause_mission(&id).await);
        assert!(!orch.start_mission(&MissionId::new("unknown")).await);
    }

    #[tokio::test]
    async fn formation_commands_empty_until_leader_is_set() {
        let orch = orchestrator();
        orch.add_agent(AgentState::new("leader", 0)).await;
        orch.add_agent(AgentState::new("follower", 0)).await;
        assert!(orch.get_formation_commands().await.is_empty());

        orch.set_formation_leader(AgentId::new("leader")).await;
        let commands = orch.get_formation_commands().await;
        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].agent_id, AgentId::new("follower"));
    }

    #[tokio::test]
    async fn update_emits_tick_completed_event() {
        let orch = orchestrator();
        let mut rx = orch.subscribe_events();
        assert!(orch.update(0.1).await);
        let event = rx.try_recv().unwrap();
        assert!(matches!(event, OrchEvent::TickCompleted { .. }));
    }

    #[tokio::test]
    async fn update_emits_task_assigned_event_when_a_pending_task_is_allocated() {
        use crate::domain::models::task::Task;

        let orch = orchestrator();
        let mut agent = AgentState::new("s1", 0);
        agent.capabilities.insert("sensing".to_string(), 0.9);
        orch.add_agent(agent).await;
        let task = Task::new("survey").with_required_capabilities(vec!["sensing".to_string()]);
        orch.dec().add_task(task).await;

        let mut rx = orch.subscribe_events();
        orch.update(0.1).await;

        let mut saw_task_assigned = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, OrchEvent::TaskAssigned { .. }) {
                saw_task_assigned = true;
            }
        }
        assert!(saw_task_assigned);
    }

    #[tokio::test]
    async fn reset_clears_agents_and_missions() {
        let orch = orchestrator();
        orch.add_agent(AgentState::new("a1", 0)).await;
        let mission = Mission::new(MissionType::Transit, "resupply");
        orch.create_mission(mission).await;
        orch.reset().await;
        assert_eq!(orch.get_agent_count().await, 0);
        assert!(orch.get_active_missions().await.is_empty());
    }
}
