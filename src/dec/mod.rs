//! DEC — distributed decision-making, role assignment, task allocation,
//! and emergent-behavior detection (`spec.md` §4.4).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::DecConfig;
use crate::domain::geometry::{Scalar, Vec3};
use crate::domain::ids::{AgentId, BehaviorId, DecisionId, TaskId};
use crate::domain::models::agent::{AgentState, Role};
use crate::domain::models::behavior::{BehaviorType, EmergentBehavior};
use crate::domain::models::decision::{DecisionMode, DecisionOutcome, SwarmDecision};
use crate::domain::models::task::{Task, TaskStatus};
use crate::domain::ports::DecisionModeStrategy;

mod strategy;
pub use strategy::DefaultDecisionStrategy;

/// What a single [`DecisionEngine::tick`] call newly produced, so ORCH can
/// raise `TaskAssigned`/`BehaviorDetected` notifications without
/// re-deriving the delta itself.
#[derive(Debug, Clone, Default)]
pub struct TickOutcome {
    pub assigned_tasks: Vec<TaskId>,
    pub detected_behaviors: Vec<BehaviorId>,
}

pub struct DecisionEngine {
    config: DecConfig,
    running: AtomicBool,
    enable_emergent_behavior: AtomicBool,
    enable_dynamic_roles: AtomicBool,
    agents: RwLock<HashMap<AgentId, AgentState>>,
    decisions: RwLock<HashMap<DecisionId, SwarmDecision>>,
    tasks: RwLock<HashMap<TaskId, Task>>,
    behaviors: RwLock<HashMap<BehaviorId, EmergentBehavior>>,
    strategy: Arc<dyn DecisionModeStrategy>,
}

impl DecisionEngine {
    pub fn new(config: DecConfig) -> Self {
        Self::with_strategy(config, Arc::new(DefaultDecisionStrategy))
    }

    pub fn with_strategy(config: DecConfig, strategy: Arc<dyn DecisionModeStrategy>) -> Self {
        let enable_emergent_behavior = AtomicBool::new(config.enable_emergent_behavior);
        let enable_dynamic_roles = AtomicBool::new(config.enable_dynamic_roles);
        Self {
            config,
            running: AtomicBool::new(false),
            enable_emergent_behavior,
            enable_dynamic_roles,
            agents: RwLock::new(HashMap::new()),
            decisions: RwLock::new(HashMap::new()),
            tasks: RwLock::new(HashMap::new()),
            behaviors: RwLock::new(HashMap::new()),
            strategy,
        }
    }

    /// Runtime toggle backing `ORCH.enableEmergentBehaviors` (`spec.md` §6).
    pub fn set_enable_emergent_behavior(&self, enabled: bool) {
        self.enable_emergent_behavior.store(enabled, Ordering::SeqCst);
    }

    /// Runtime toggle backing `ORCH.enableDynamicRoleAssignment` (`spec.md` §6).
    pub fn set_enable_dynamic_roles(&self, enabled: bool) {
        self.enable_dynamic_roles.store(enabled, Ordering::SeqCst);
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub async fn reset(&self) {
        self.stop();
        self.agents.write().await.clear();
        self.decisions.write().await.clear();
        self.tasks.write().await.clear();
        self.behaviors.write().await.clear();
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    // --- Agent table (ORCH's Agent CRUD delegates here; spec.md §6) ---

    pub async fn add_agent(&self, agent: AgentState) -> bool {
        if !self.is_running() || agent.id.is_empty() {
            return false;
        }
        let mut agents = self.agents.write().await;
        if agents.len() as u32 >= self.config.max_agents {
            return false;
        }
        agents.insert(agent.id.clone(), agent);
        true
    }

    pub async fn remove_agent(&self, id: &AgentId) -> bool {
        self.agents.write().await.remove(id).is_some()
    }

    pub async fn update_agent(&self, agent: AgentState) -> bool {
        let mut agents = self.agents.write().await;
        if !agents.contains_key(&agent.id) {
            return false;
        }
        agents.insert(agent.id.clone(), agent);
        true
    }

    pub async fn get_agent(&self, id: &AgentId) -> Option<AgentState> {
        self.agents.read().await.get(id).cloned()
    }

    pub async fn get_all_agents(&self) -> Vec<AgentState> {
        self.agents.read().await.values().cloned().collect()
    }

    pub async fn get_agent_count(&self) -> usize {
        self.agents.read().await.len()
    }

    // --- Decisions (§4.4) ---

    pub async fn propose_decision(
        &self,
        description: impl Into<String>,
        mode: DecisionMode,
        participating_agents: Vec<AgentId>,
        threshold: Scalar,
        now: i64,
    ) -> DecisionId {
        let decision = SwarmDecision::new(description, mode, participating_agents, threshold, now);
        let id = decision.id.clone();
        self.decisions.write().await.insert(id.clone(), decision);
        id
    }

    /// `voteOnDecision` analogue: records the vote, then asks the
    /// configured strategy whether the decision should finalize.
    /// Returns `false` (and leaves votes untouched) if already finalized.
    pub async fn vote_on_decision(&self, id: &DecisionId, agent: impl Into<AgentId>, confidence: Scalar) -> bool {
        let mut decisions = self.decisions.write().await;
        let Some(decision) = decisions.get_mut(id) else {
            return false;
        };
        let accepted = decision.record_vote(agent.into(), confidence);
        if !accepted {
            return false;
        }
        // Centralized: finalize on first recorded vote with outcome
        // approved (§4.4).
        if decision.mode == DecisionMode::Centralized {
            decision.finalize(DecisionOutcome::Approved);
            return true;
        }
        if let Some(outcome) = self.strategy.evaluate(decision).await {
            decision.finalize(outcome);
        }
        true
    }

    pub async fn get_decision(&self, id: &DecisionId) -> Option<SwarmDecision> {
        self.decisions.read().await.get(id).cloned()
    }

    pub async fn get_active_decisions(&self) -> Vec<SwarmDecision> {
        self.decisions
            .read()
            .await
            .values()
            .filter(|d| !d.finalized)
            .cloned()
            .collect()
    }

    /// Finalizes every still-open `Distributed` decision, per §4.4:
    /// "finalizes immediately on next tick with outcome `distributed`".
    async fn finalize_distributed_decisions(&self) {
        let mut decisions = self.decisions.write().await;
        for decision in decisions.values_mut() {
            if !decision.finalized && decision.mode == DecisionMode::Distributed {
                decision.finalize(DecisionOutcome::Distributed);
            }
        }
    }

    // --- Tasks (§4.4) ---

    pub async fn add_task(&self, task: Task) -> TaskId {
        let id = task.id.clone();
        self.tasks.write().await.insert(id.clone(), task);
        id
    }

    pub async fn get_task(&self, id: &TaskId) -> Option<Task> {
        self.tasks.read().await.get(id).cloned()
    }

    pub async fn get_all_tasks(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }

    /// Caller-driven transition, per §4.4 ("the core never auto-fails a
    /// task").
    pub async fn transition_task(&self, id: &TaskId, next: TaskStatus) -> bool {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.get_mut(id) else {
            return false;
        };
        if !task.status.can_transition_to(next) {
            return false;
        }
        task.status = next;
        if next == TaskStatus::Completed {
            task.completion = 1.0;
        }
        true
    }

    /// Task-allocation fitness formula from `spec.md` §4.4.
    fn fitness(task: &Task, agent: &AgentState) -> Scalar {
        if task
            .required_capabilities
            .iter()
            .any(|cap| !agent.capabilities.contains_key(cap))
        {
            return 0.0;
        }
        let cap_sum: Scalar = task
            .required_capabilities
            .iter()
            .filter_map(|cap| agent.capabilities.get(cap))
            .sum();
        let distance = agent.position.distance(task.location);
        let distance_term = 1.0 / (1.0 + 0.01 * distance);
        let workload_term = 1.0 / (1.0 + agent.assigned_tasks.len() as Scalar);
        cap_sum * distance_term * agent.energy * workload_term
    }

    /// Runs once per tick: for every `pending` task, assigns it to the
    /// single highest-fitness agent (ties broken by agent-ID lexical
    /// order), per `spec.md` §4.4. Returns the IDs of tasks newly
    /// assigned this call, for callers that want to raise a
    /// `TaskAssigned` notification.
    pub async fn allocate_tasks(&self) -> Vec<TaskId> {
        let mut agents = self.agents.write().await;
        let mut tasks = self.tasks.write().await;
        let mut assigned = Vec::new();
        for task in tasks.values_mut() {
            if task.status != TaskStatus::Pending {
                continue;
            }
            let mut best: Option<(AgentId, Scalar)> = None;
            for agent in agents.values() {
                let score = Self::fitness(task, agent);
                if score <= 0.0 {
                    continue;
                }
                best = match best {
                    None => Some((agent.id.clone(), score)),
                    Some((best_id, best_score)) => {
                        if score > best_score || (score == best_score && agent.id < best_id) {
                            Some((agent.id.clone(), score))
                        } else {
                            Some((best_id, best_score))
                        }
                    }
                };
            }
            if let Some((agent_id, _)) = best {
                task.assign(agent_id.clone());
                if let Some(winner) = agents.get_mut(&agent_id) {
                    winner.assigned_tasks.push(task.id.clone());
                }
                assigned.push(task.id.clone());
            }
        }
        assigned
    }

    // --- Role reassignment (§4.4) ---

    /// Reassigns roles by energy rank, per the quotas in `spec.md` §4.4:
    /// `leaders = max(1, n/10)`, `scouts = n/5`, `guardians = n/10`,
    /// `relays = n/10`, remainder workers.
    pub async fn reassign_roles(&self) {
        let mut agents = self.agents.write().await;
        let n = agents.len();
        if n == 0 {
            return;
        }
        let leaders = (n / 10).max(1);
        let scouts = n / 5;
        let guardians = n / 10;
        let relays = n / 10;

        let mut ids: Vec<AgentId> = agents.keys().cloned().collect();
        ids.sort_by(|a, b| {
            let ea = agents.get(a).map_or(0.0, |s| s.energy);
            let eb = agents.get(b).map_or(0.0, |s| s.energy);
            eb.partial_cmp(&ea).unwrap_or(std::cmp::Ordering::Equal)
        });

        for (i, id) in ids.iter().enumerate() {
            let role = if i < leaders {
                Role::Leader
            } else if i < leaders + scouts {
                Role::Scout
            } else if i < leaders + scouts + guardians {
                Role::Guardian
            } else if i < leaders + scouts + guardians + relays {
                Role::Relay
            } else {
                Role::Worker
            };
            if let Some(agent) = agents.get_mut(id) {
                agent.role = role;
            }
        }
    }

    // --- Emergent behavior detection (§4.4) ---

    fn centroid(states: &[AgentState]) -> Vec3 {
        states.iter().map(|s| s.position).sum::<Vec3>() / states.len() as Scalar
    }

    /// Dispersion: RMS distance to centroid, in metres.
    fn dispersion(states: &[AgentState], centroid: Vec3) -> Scalar {
        let sum_sq: Scalar = states
            .iter()
            .map(|s| s.position.distance(centroid).powi(2))
            .sum();
        (sum_sq / states.len() as Scalar).sqrt()
    }

    /// Cohesion: `1 / (1 + 0.1 * mean_distance_to_centroid)`.
    fn cohesion(states: &[AgentState], centroid: Vec3) -> Scalar {
        let mean_distance: Scalar =
            states.iter().map(|s| s.position.distance(centroid)).sum::<Scalar>() / states.len() as Scalar;
        1.0 / (1.0 + 0.1 * mean_distance)
    }

    /// Runs at each tick while enabled and `n >= 3`, per `spec.md` §4.4.
    /// Returns the IDs of behaviors newly detected this call, for callers
    /// that want to raise a `BehaviorDetected` notification.
    pub async fn detect_emergent_behaviors(&self, now: i64) -> Vec<BehaviorId> {
        if !self.enable_emergent_behavior.load(Ordering::SeqCst) {
            return Vec::new();
        }
        let states: Vec<AgentState> = self.agents.read().await.values().cloned().collect();
        if states.len() < 3 {
            return Vec::new();
        }
        let centroid = Self::centroid(&states);
        let dispersion = Self::dispersion(&states, centroid);
        let cohesion = Self::cohesion(&states, centroid);
        let ids: Vec<AgentId> = states.iter().map(|s| s.id.clone()).collect();

        let mut detected = Vec::new();
        let mut behaviors = self.behaviors.write().await;
        if dispersion < 10.0 {
            let strength = 1.0 - dispersion / 10.0;
            let behavior = EmergentBehavior::new(
                BehaviorType::Aggregation,
                ids.clone(),
                strength,
                now,
                5_000,
            );
            detected.push(behavior.id.clone());
            behaviors.insert(behavior.id.clone(), behavior);
        }
        if cohesion > 0.7 {
            let behavior = EmergentBehavior::new(BehaviorType::Formation, ids, cohesion, now, 5_000);
            detected.push(behavior.id.clone());
            behaviors.insert(behavior.id.clone(), behavior);
        }
        detected
    }

    pub async fn get_active_behaviors(&self, now: i64) -> Vec<EmergentBehavior> {
        self.behaviors
            .read()
            .await
            .values()
            .filter(|b| b.is_active(now))
            .cloned()
            .collect()
    }

    /// Swarm-wide spatial statistics exposed by ORCH's snapshot queries.
    pub async fn swarm_centroid(&self) -> Vec3 {
        let states: Vec<AgentState> = self.agents.read().await.values().cloned().collect();
        if states.is_empty() {
            Vec3::ZERO
        } else {
            Self::centroid(&states)
        }
    }

    pub async fn swarm_cohesion(&self) -> Scalar {
        let states: Vec<AgentState> = self.agents.read().await.values().cloned().collect();
        if states.is_empty() {
            return 0.0;
        }
        let centroid = Self::centroid(&states);
        Self::cohesion(&states, centroid)
    }

    pub async fn swarm_dispersion(&self) -> Scalar {
        let states: Vec<AgentState> = self.agents.read().await.values().cloned().collect();
        if states.is_empty() {
            return 0.0;
        }
        let centroid = Self::centroid(&states);
        Self::dispersion(&states, centroid)
    }

    /// Runs one full DEC tick: finalize distributed decisions, allocate
    /// pending tasks, optionally reassign roles, optionally detect
    /// emergent behaviors. Returns the task and behavior IDs that were
    /// newly created this tick, so ORCH can raise notifications for them.
    pub async fn tick(&self, now: i64) -> TickOutcome {
        self.finalize_distributed_decisions().await;
        let assigned_tasks = self.allocate_tasks().await;
        if self.enable_dynamic_roles.load(Ordering::SeqCst) {
            self.reassign_roles().await;
        }
        let detected_behaviors = self.detect_emergent_behaviors(now).await;
        TickOutcome { assigned_tasks, detected_behaviors }
    }
}
