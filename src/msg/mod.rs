//! MSG — agent-to-agent messaging, proposals, and consensus
//! (`spec.md` §4.2).

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::config::MsgConfig;
use crate::domain::ids::{AgentId, ConsensusId, ProposalId};
use crate::domain::models::consensus::ConsensusRound;
use crate::domain::models::message::{Message, MessageKind};
use crate::domain::models::proposal::Proposal;

/// A non-reentrant callback invoked synchronously after `sendMessage`
/// enqueues a message of the registered kind (`spec.md` §4.2, §5).
pub trait MessageCallback: Send + Sync {
    fn on_message(&self, message: &Message);
}

pub struct MessageBus {
    config: MsgConfig,
    running: AtomicBool,
    queue: RwLock<VecDeque<Message>>,
    proposals: RwLock<HashMap<ProposalId, Proposal>>,
    consensus: RwLock<HashMap<ConsensusId, ConsensusRound>>,
    peers: RwLock<HashMap<AgentId, i64>>,
    callbacks: RwLock<HashMap<String, std::sync::Arc<dyn MessageCallback>>>,
}

impl MessageBus {
    pub fn new(config: MsgConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
            queue: RwLock::new(VecDeque::new()),
            proposals: RwLock::new(HashMap::new()),
            consensus: RwLock::new(HashMap::new()),
            peers: RwLock::new(HashMap::new()),
            callbacks: RwLock::new(HashMap::new()),
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
        self.queue.write().await.clear();
        self.proposals.write().await.clear();
        self.consensus.write().await.clear();
        self.peers.write().await.clear();
        self.callbacks.write().await.clear();
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub async fn register_callback(&self, kind: MessageKind, callback: std::sync::Arc<dyn MessageCallback>) {
        self.callbacks
            .write()
            .await
            .insert(kind.as_str().to_string(), callback);
    }

    /// `sendMessage` (§4.2): rejects invalid messages, appends to the
    /// bounded queue (evicting the oldest on overflow), then dispatches
    /// the registered callback for `message.kind` synchronously.
    pub async fn send_message(&self, message: Message) -> bool {
        if !self.is_running() || !message.is_valid() {
            return false;
        }
        let callback = {
            let mut queue = self.queue.write().await;
            queue.push_back(message.clone());
            while queue.len() > self.config.message_buffer_size {
                queue.pop_front();
            }
            self.callbacks
                .read()
                .await
                .get(message.kind.as_str())
                .cloned()
        };
        if let Some(callback) = callback {
            callback.on_message(&message);
        }
        true
    }

    /// `sendBroadcast` (§4.2): clears receiver, sets kind to `Broadcast`,
    /// forwards to `sendMessage`.
    pub async fn send_broadcast(&self, mut message: Message) -> bool {
        message.receiver = AgentId::new("");
        message.kind = MessageKind::Broadcast;
        self.send_message(message).await
    }

    /// Broadcasts `message` without touching its `kind`, unlike
    /// `send_broadcast`. `proposeTask`/`initiateConsensus` need this: §4.2
    /// says they broadcast a `Proposal`/`Request` message, and
    /// `sendMessage`'s callback dispatch keys on `kind` (§4.2), so
    /// clobbering it to `Broadcast` would make those callbacks
    /// unreachable.
    async fn broadcast_as(&self, mut message: Message) -> bool {
        message.receiver = AgentId::new("");
        self.send_message(message).await
    }

    pub async fn receive_messages(&self) -> Vec<Message> {
        self.queue.write().await.drain(..).collect()
    }

    /// `receiveMessage` (§4.2): pops the head if `sender` is empty;
    /// otherwise removes the first message from that sender.
    pub async fn receive_message(&self, sender: &AgentId) -> Option<Message> {
        let mut queue = self.queue.write().await;
        if sender.is_empty() {
            queue.pop_front()
        } else {
            let pos = queue.iter().position(|m| &m.sender == sender)?;
            queue.remove(pos)
        }
    }

    /// `proposeTask` (§4.2): records the proposal and broadcasts a
    /// `Proposal` message carrying `data["proposal_id"]`.
    pub async fn propose_task(&self, mut proposal: Proposal) -> ProposalId {
        if proposal.id.is_empty() {
            proposal.id = ProposalId::new(crate::domain::ids::generate("proposal"));
        }
        let id = proposal.id.clone();
        let proposer = proposal.proposer.clone();
        self.proposals.write().await.insert(id.clone(), proposal);

        let mut data = HashMap::new();
        data.insert("proposal_id".to_string(), id.to_string());
        let message = Message::new(proposer, MessageKind::Proposal, now_ms()).with_data(data);
        self.broadcast_as(message).await;
        id
    }

    /// `acceptProposal` (§4.2): idempotently records `agent`'s
    /// acceptance, then sends an `Accept` message to the proposer.
    pub async fn accept_proposal(&self, pid: &ProposalId, agent: impl Into<AgentId>) -> bool {
        let agent = agent.into();
        let proposer = {
            let mut proposals = self.proposals.write().await;
            let Some(proposal) = proposals.get_mut(pid) else {
                return false;
            };
            proposal.accept(agent.clone());
            proposal.proposer.clone()
        };
        let message = Message::new(agent, MessageKind::Accept, now_ms()).with_receiver(proposer);
        self.send_message(message).await;
        true
    }

    /// `rejectProposal` (§4.2): sends a `Reject` message; does not
    /// mutate vote state.
    pub async fn reject_proposal(
        &self,
        pid: &ProposalId,
        agent: impl Into<AgentId>,
        reason: impl Into<String>,
    ) -> bool {
        let agent = agent.into();
        let proposer = {
            let proposals = self.proposals.read().await;
            match proposals.get(pid) {
                Some(p) => p.proposer.clone(),
                None => return false,
            }
        };
        let message = Message::new(agent, MessageKind::Reject, now_ms())
            .with_receiver(proposer)
            .with_content(reason);
        self.send_message(message).await;
        true
    }

    /// `getActiveProposals` (§4.2): proposals whose expiry is in the
    /// future.
    pub async fn get_active_proposals(&self) -> Vec<Proposal> {
        let now = now_ms();
        self.proposals
            .read()
            .await
            .values()
            .filter(|p| p.is_active(now))
            .cloned()
            .collect()
    }

    /// Sweeps expired proposals; invoked from the orchestrator tick.
    pub async fn sweep_expired_proposals(&self) {
        let now = now_ms();
        self.proposals.write().await.retain(|_, p| p.expiry_timestamp >= now);
    }

    /// `initiateConsensus` (§4.2): creates a round, broadcasts a
    /// `ConsensusRequest` carrying `data["consensus_id"]`.
    pub async fn initiate_consensus(&self, topic: impl Into<String>, required_votes: u32) -> ConsensusId {
        let round = ConsensusRound::new(topic, required_votes, now_ms());
        let id = round.id.clone();
        self.consensus.write().await.insert(id.clone(), round);

        let mut data = HashMap::new();
        data.insert("consensus_id".to_string(), id.to_string());
        let message = Message::new("msg-bus", MessageKind::ConsensusRequest, now_ms()).with_data(data);
        self.broadcast_as(message).await;
        id
    }

    /// `vote` (§4.2): overwrites the agent's prior ballot; sets
    /// `achieved` once the quorum is met.
    pub async fn vote(&self, cid: &ConsensusId, agent: impl Into<AgentId>, ballot: impl Into<String>) -> bool {
        let mut rounds = self.consensus.write().await;
        let Some(round) = rounds.get_mut(cid) else {
            return false;
        };
        round.vote(agent, ballot);
        true
    }

    pub async fn get_consensus_status(&self, cid: &ConsensusId) -> Option<ConsensusRound> {
        self.consensus.read().await.get(cid).cloned()
    }

    /// `getActiveConsensus` (§4.2): achieved rounds remain queryable via
    /// `get_consensus_status` but are excluded here.
    pub async fn get_active_consensus(&self) -> Vec<ConsensusRound> {
        self.consensus
            .read()
            .await
            .values()
            .filter(|r| !r.achieved)
            .cloned()
            .collect()
    }

    pub async fn connect_to_peer(&self, id: impl Into<AgentId>, _address: &str, _port: u16) {
        self.peers.write().await.insert(id.into(), now_ms());
    }

    pub async fn disconnect_from_peer(&self, id: &AgentId) -> bool {
        self.peers.write().await.remove(id).is_some()
    }

    pub async fn is_peer_connected(&self, id: &AgentId) -> bool {
        self.peers.read().await.contains_key(id)
    }

    pub async fn get_connected_peers(&self) -> Vec<AgentId> {
        self.peers.read().await.keys().cloned().collect()
    }

    /// Removes peers whose last-seen timestamp is older than
    /// `connection_timeout_sec`; invoked from the orchestrator tick
    /// (`spec.md` §4.2: "Peer timeouts are the caller's responsibility").
    pub async fn sweep_stale_peers(&self, now: i64) {
        let timeout_ms = (self.config.connection_timeout_sec * 1000.0) as i64;
        self.peers
            .write()
            .await
            .retain(|_, last_seen| now.saturating_sub(*last_seen) <= timeout_ms);
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> MessageBus {
        let b = MessageBus::new(MsgConfig::default());
        b.start();
        b
    }

    #[tokio::test]
    async fn invalid_message_is_rejected() {
        let b = bus();
        assert!(!b.send_message(Message::new("", MessageKind::Broadcast, 1000)).await);
    }

    #[tokio::test]
    async fn queue_evicts_oldest_beyond_buffer_size() {
        let mut config = MsgConfig::default();
        config.message_buffer_size = 2;
        let b = MessageBus::new(config);
        b.start();
        for i in 0..3 {
            b.send_message(Message::new(format!("a{i}"), MessageKind::Broadcast, 1000 + i))
                .await;
        }
        let messages = b.receive_messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender.as_str(), "a1");
    }

    #[tokio::test]
    async fn receive_message_by_sender_removes_first_match() {
        let b = bus();
        b.send_message(Message::new("a1", MessageKind::Broadcast, 1000)).await;
        b.send_message(Message::new("a2", MessageKind::Broadcast, 1001)).await;
        let found = b.receive_message(&AgentId::new("a2")).await.unwrap();
        assert_eq!(found.sender.as_str(), "a2");
        let remaining = b.receive_messages().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].sender.as_str(), "a1");
    }

    #[tokio::test]
    async fn accept_proposal_is_idempotent_end_to_end() {
        let b = bus();
        let proposal = Proposal::new("a1", "scout ahead").with_expiry(now_ms() + 60_000);
        let pid = b.propose_task(proposal).await;
        assert!(b.accept_proposal(&pid, "a2").await);
        assert!(b.accept_proposal(&pid, "a2").await);
        let active = b.get_active_proposals().await;
        let stored = active.iter().find(|p| p.id == pid).unwrap();
        assert_eq!(stored.accepted_votes.len(), 1);
    }

    #[tokio::test]
    async fn reject_proposal_does_not_mutate_accepted_votes() {
        let b = bus();
        let proposal = Proposal::new("a1", "scout ahead").with_expiry(now_ms() + 60_000);
        let pid = b.propose_task(proposal).await;
        b.accept_proposal(&pid, "a2").await;
        b.reject_proposal(&pid, "a3", "busy").await;
        let active = b.get_active_proposals().await;
        let stored = active.iter().find(|p| p.id == pid).unwrap();
        assert_eq!(stored.accepted_votes.len(), 1);
    }

    #[tokio::test]
    async fn expired_proposals_are_excluded_from_active_list() {
        let b = bus();
        let proposal = Proposal::new("a1", "scout ahead").with_expiry(now_ms() - 1000);
        b.propose_task(proposal).await;
        assert!(b.get_active_proposals().await.is_empty());
    }

    #[tokio::test]
    async fn propose_task_broadcasts_with_proposal_kind_preserved() {
        let b = bus();
        let proposal = Proposal::new("a1", "scout ahead").with_expiry(now_ms() + 60_000);
        b.propose_task(proposal).await;
        let messages = b.receive_messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::Proposal);
        assert!(messages[0].is_broadcast());
    }

    #[tokio::test]
    async fn propose_task_invokes_callback_registered_for_proposal_kind() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        struct Flag(Arc<AtomicBool>);
        impl MessageCallback for Flag {
            fn on_message(&self, _message: &Message) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let b = bus();
        let invoked = Arc::new(AtomicBool::new(false));
        b.register_callback(MessageKind::Proposal, Arc::new(Flag(invoked.clone())))
            .await;
        let proposal = Proposal::new("a1", "scout ahead").with_expiry(now_ms() + 60_000);
        b.propose_task(proposal).await;
        assert!(invoked.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn consensus_achieves_once_quorum_reached() {
        let b = bus();
        let cid = b.initiate_consensus("formation-change", 2).await;
        assert!(b.vote(&cid, "a1", "yes").await);
        assert!(!b.get_consensus_status(&cid).await.unwrap().achieved);
        b.vote(&cid, "a2", "yes").await;
        assert!(b.get_consensus_status(&cid).await.unwrap().achieved);
        assert!(b.get_active_consensus().await.is_empty());
    }

    #[tokio::test]
    async fn initiate_consensus_broadcasts_with_consensus_request_kind_preserved() {
        let b = bus();
        b.initiate_consensus("formation-change", 2).await;
        let messages = b.receive_messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].kind, MessageKind::ConsensusRequest);
        assert!(messages[0].is_broadcast());
    }

    #[tokio::test]
    async fn peer_connection_round_trips() {
        let b = bus();
        b.connect_to_peer("p1", "10.0.0.1", 9000).await;
        assert!(b.is_peer_connected(&AgentId::new("p1")).await);
        b.disconnect_from_peer(&AgentId::new("p1")).await;
        assert!(!b.is_peer_connected(&AgentId::new("p1")).await);
    }
}
