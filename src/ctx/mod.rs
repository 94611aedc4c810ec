//! CTX — context, tool, and resource registry (`spec.md` §4.1).
//!
//! One `tokio::sync::RwLock`-guarded table per category, mirroring the
//! per-category locking shape used for the originating workspace's
//! circuit-breaker and event-bus services. Every mutation takes its
//! table's lock only for the duration of the in-memory update; no I/O or
//! callback dispatch happens while a lock is held.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::CtxConfig;
use crate::domain::error::CtxError;
use crate::domain::ids::{AgentId, ResourceId};
use crate::domain::models::context::ContextEntry;
use crate::domain::models::resource::Resource;
use crate::domain::models::tool::Tool;

type ToolKey = (AgentId, String);

/// The context/tool/resource registry. `running` gates every mutating
/// call per `spec.md` §5 ("all mutating APIs must reject work when not
/// running").
pub struct ContextRegistry {
    config: CtxConfig,
    running: AtomicBool,
    contexts: RwLock<HashMap<AgentId, VecDeque<ContextEntry>>>,
    tools: RwLock<HashMap<ToolKey, Tool>>,
    resources: RwLock<HashMap<ResourceId, Resource>>,
    agents: RwLock<HashSet<AgentId>>,
}

impl ContextRegistry {
    pub fn new(config: CtxConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
            contexts: RwLock::new(HashMap::new()),
            tools: RwLock::new(HashMap::new()),
            resources: RwLock::new(HashMap::new()),
            agents: RwLock::new(HashSet::new()),
        }
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub async fn reset(&self) {
        self.stop();
        self.contexts.write().await.clear();
        self.tools.write().await.clear();
        self.resources.write().await.clear();
        self.agents.write().await.clear();
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// `registerAgent` (§4.1): fails when not running, id is empty, or
    /// the registered-agent set is already at `max_agents`.
    pub async fn register_agent(&self, id: impl Into<AgentId>) -> bool {
        if !self.is_running() {
            return false;
        }
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        let mut agents = self.agents.write().await;
        if agents.len() as u32 >= self.config.max_agents {
            return false;
        }
        agents.insert(id);
        true
    }

    pub async fn is_agent_registered(&self, id: &AgentId) -> bool {
        self.agents.read().await.contains(id)
    }

    /// `publishContext` (§4.1): appends to the per-agent ring (capacity
    /// `context_buffer_size`), evicting oldest on overflow, then sweeps
    /// all agents for entries older than `context_timeout_sec`.
    pub async fn publish_context(&self, entry: ContextEntry) -> bool {
        if !self.is_running() || entry.agent_id.is_empty() || entry.timestamp == 0 {
            return false;
        }
        let mut contexts = self.contexts.write().await;
        let ring = contexts.entry(entry.agent_id.clone()).or_default();
        let now = entry.timestamp;
        ring.push_back(entry);
        while ring.len() > self.config.context_buffer_size {
            ring.pop_front();
        }
        let timeout_ms = (self.config.context_timeout_sec * 1000.0) as i64;
        for ring in contexts.values_mut() {
            while ring
                .front()
                .is_some_and(|e| now.saturating_sub(e.timestamp) > timeout_ms)
            {
                ring.pop_front();
            }
        }
        true
    }

    /// `queryContext` (§4.1): if `agent_id` is empty, returns the latest
    /// entry from every agent with any; otherwise returns that agent's
    /// full ring in insertion order.
    pub async fn query_context(&self, agent_id: &AgentId) -> Vec<ContextEntry> {
        let contexts = self.contexts.read().await;
        if agent_id.is_empty() {
            contexts
                .values()
                .filter_map(|ring| ring.back().cloned())
                .collect()
        } else {
            contexts
                .get(agent_id)
                .map(|ring| ring.iter().cloned().collect())
                .unwrap_or_default()
        }
    }

    pub async fn get_latest_context(&self, agent_id: &AgentId) -> Option<ContextEntry> {
        self.contexts
            .read()
            .await
            .get(agent_id)
            .and_then(|ring| ring.back().cloned())
    }

    pub async fn get_context_history(&self, agent_id: &AgentId, count: usize) -> Vec<ContextEntry> {
        self.contexts
            .read()
            .await
            .get(agent_id)
            .map(|ring| {
                ring.iter()
                    .rev()
                    .take(count)
                    .rev()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `registerTool` (§4.1): identity key is `(agent_id, name)`;
    /// re-registration overwrites.
    pub async fn register_tool(&self, tool: Tool) -> bool {
        if !self.is_running() || tool.name.is_empty() || tool.agent_id.is_empty() {
            return false;
        }
        let key = tool.identity_key();
        self.tools.write().await.insert(key, tool);
        true
    }

    pub async fn unregister_tool(&self, agent_id: &AgentId, name: &str) -> bool {
        self.tools
            .write()
            .await
            .remove(&(agent_id.clone(), name.to_string()))
            .is_some()
    }

    /// `discoverTools` (§4.1): substring match on description,
    /// case-sensitive; empty `capability` matches all.
    pub async fn discover_tools(&self, capability: &str) -> Vec<Tool> {
        self.tools
            .read()
            .await
            .values()
            .filter(|tool| capability.is_empty() || tool.description.contains(capability))
            .cloned()
            .collect()
    }

    /// `executeTool` (§4.1): runs the first tool with matching `name`
    /// regardless of owner; sentinel string if none qualifies.
    pub async fn execute_tool(&self, name: &str, params: &HashMap<String, String>) -> String {
        let tool = {
            let tools = self.tools.read().await;
            tools.values().find(|t| t.name == name).cloned()
        };
        match tool {
            Some(tool) => tool.executor.execute(params).await,
            None => "Error: Tool not found or not executable".to_string(),
        }
    }

    /// `registerResource` (§4.1): fails on empty id/type or non-positive
    /// capacity.
    pub async fn register_resource(&self, resource: Resource) -> bool {
        if resource.id.is_empty() || resource.resource_type.is_empty() || resource.capacity <= 0.0
        {
            return false;
        }
        self.resources
            .write()
            .await
            .insert(resource.id.clone(), resource);
        true
    }

    pub async fn unregister_resource(&self, id: &ResourceId) -> bool {
        if id.is_empty() {
            return false;
        }
        self.resources.write().await.remove(id).is_some()
    }

    /// `requestResource` (§4.1): fails if unknown, unavailable, or the
    /// requested amount would overrun capacity; otherwise increments
    /// usage. The requester identity is accepted for the public contract
    /// but, per `spec.md` §9, not tracked in bookkeeping.
    pub async fn request_resource(
        &self,
        id: &ResourceId,
        _requester: &AgentId,
        amount: crate::domain::geometry::Scalar,
    ) -> bool {
        let mut resources = self.resources.write().await;
        let Some(resource) = resources.get_mut(id) else {
            return false;
        };
        if !resource.can_reserve(amount) {
            return false;
        }
        resource.reserve(amount);
        true
    }

    /// `releaseResource` (§4.1): zeroes usage unconditionally, per the
    /// source-compatible semantics `spec.md` §9 mandates.
    pub async fn release_resource(&self, id: &ResourceId, _requester: &AgentId) -> bool {
        let mut resources = self.resources.write().await;
        let Some(resource) = resources.get_mut(id) else {
            return false;
        };
        resource.release();
        true
    }

    pub async fn get_resource(&self, id: &ResourceId) -> Option<Resource> {
        self.resources.read().await.get(id).cloned()
    }

    /// Typed variant of `register_agent` for callers that want the
    /// reason a registration was refused.
    pub async fn register_agent_detailed(&self, id: impl Into<AgentId>) -> Result<(), CtxError> {
        if !self.is_running() {
            return Err(CtxError::NotInitialized);
        }
        let id = id.into();
        if id.is_empty() {
            return Err(CtxError::InvalidArgument("agent id is empty".to_string()));
        }
        let mut agents = self.agents.write().await;
        if agents.len() as u32 >= self.config.max_agents {
            return Err(CtxError::CapacityExceeded("max_agents".to_string()));
        }
        agents.insert(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::geometry::Vec3;
    use crate::domain::ports::EchoToolExecutor;
    use std::sync::Arc;

    fn registry() -> ContextRegistry {
        let r = ContextRegistry::new(CtxConfig::default());
        r.start();
        r
    }

    #[tokio::test]
    async fn publish_fails_before_start() {
        let r = ContextRegistry::new(CtxConfig::default());
        let entry = ContextEntry::new("a1", 1000);
        assert!(!r.publish_context(entry).await);
    }

    #[tokio::test]
    async fn publish_rejects_empty_agent_id_and_zero_timestamp() {
        let r = registry();
        assert!(!r.publish_context(ContextEntry::new("", 1000)).await);
        assert!(!r.publish_context(ContextEntry::new("a1", 0)).await);
    }

    #[tokio::test]
    async fn latest_context_round_trips_until_overwritten() {
        let r = registry();
        let entry = ContextEntry::new("a1", 1000).with_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(r.publish_context(entry.clone()).await);
        let latest = r.get_latest_context(&AgentId::new("a1")).await.unwrap();
        assert_eq!(latest.timestamp, entry.timestamp);
    }

    #[tokio::test]
    async fn ring_buffer_evicts_oldest_beyond_capacity() {
        let mut config = CtxConfig::default();
        config.context_buffer_size = 2;
        let r = ContextRegistry::new(config);
        r.start();
        for t in [1000, 2000, 3000] {
            r.publish_context(ContextEntry::new("a1", t)).await;
        }
        let history = r.get_context_history(&AgentId::new("a1"), 10).await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].timestamp, 2000);
        assert_eq!(history[1].timestamp, 3000);
    }

    #[tokio::test]
    async fn context_expiry_drops_entries_older_than_timeout() {
        let mut config = CtxConfig::default();
        config.context_timeout_sec = 5.0;
        let r = ContextRegistry::new(config);
        r.start();
        r.publish_context(ContextEntry::new("a1", 1000)).await;
        r.publish_context(ContextEntry::new("a1", 7000)).await;
        let latest = r.get_latest_context(&AgentId::new("a1")).await.unwrap();
        assert_eq!(latest.timestamp, 7000);
        let history = r.get_context_history(&AgentId::new("a1"), 10).await;
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn register_agent_respects_max_agents() {
        let mut config = CtxConfig::default();
        config.max_agents = 1;
        let r = ContextRegistry::new(config);
        r.start();
        assert!(r.register_agent("a1").await);
        assert!(!r.register_agent("a2").await);
    }

    #[tokio::test]
    async fn discover_tools_matches_substring_case_sensitively() {
        let r = registry();
        let tool = Tool::new("scan", "a1", Arc::new(EchoToolExecutor))
            .with_description("infrared Scanning capability");
        r.register_tool(tool).await;
        assert_eq!(r.discover_tools("Scanning").await.len(), 1);
        assert_eq!(r.discover_tools("scanning").await.len(), 0);
        assert_eq!(r.discover_tools("").await.len(), 1);
    }

    #[tokio::test]
    async fn execute_tool_returns_sentinel_when_missing() {
        let r = registry();
        let out = r.execute_tool("missing", &HashMap::new()).await;
        assert_eq!(out, "Error: Tool not found or not executable");
    }

    #[tokio::test]
    async fn resource_overcommit_is_refused_scenario() {
        let r = registry();
        let mut resource = Resource::new("r1", "battery", "a1", 1.0);
        resource.reserve(0.6);
        r.register_resource(resource).await;
        let ok = r
            .request_resource(&ResourceId::new("r1"), &AgentId::new("x"), 0.5)
            .await;
        assert!(!ok);
        let stored = r.get_resource(&ResourceId::new("r1")).await.unwrap();
        assert!((stored.current_usage - 0.6).abs() < 1e-6);
    }

    #[tokio::test]
    async fn release_zeroes_usage_even_for_a_different_requester() {
        let r = registry();
        let resource = Resource::new("r1", "battery", "a1", 1.0);
        r.register_resource(resource).await;
        r.request_resource(&ResourceId::new("r1"), &AgentId::new("a1"), 0.5)
            .await;
        let released = r
            .release_resource(&ResourceId::new("r1"), &AgentId::new("someone-else"))
            .await;
        assert!(released);
        let stored = r.get_resource(&ResourceId::new("r1")).await.unwrap();
        assert!((stored.current_usage - 0.0).abs() < 1e-6);
    }
}
