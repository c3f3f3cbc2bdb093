//! Outbound relay to the external chat bridge.
//!
//! The relay only ever pushes lines onto a queue; the task draining the queue
//! owns the actual bridge client. It also answers two questions the router
//! asks about the bridge: whether a trigger belongs to the bridge's own
//! command table, and what display name a bridge member ID maps to.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::channels::{BridgeChannel, BridgeOutbound};

/// Capabilities of the external bridge used by the router.
pub trait BridgeGateway: Send + Sync {
    /// Relay a line. Fire-and-forget.
    fn send(&self, channel: BridgeChannel, display_name: &str, text: &str);

    /// Whether `text` is a command handled by the bridge itself.
    fn is_external_command(&self, text: &str) -> bool;

    /// Current display name of a bridge member.
    fn member_name(&self, member_id: u64) -> Option<String>;
}

/// Queue-backed bridge gateway.
#[derive(Debug)]
pub struct BridgeRelay {
    /// `None` when the bridge is disabled.
    outbound_tx: Option<mpsc::UnboundedSender<BridgeOutbound>>,
    external_commands: HashSet<String>,
    members: RwLock<HashMap<u64, String>>,
}

impl BridgeRelay {
    pub fn new<I, S>(outbound_tx: mpsc::UnboundedSender<BridgeOutbound>, external_commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outbound_tx: Some(outbound_tx),
            external_commands: external_commands.into_iter().map(Into::into).collect(),
            members: RwLock::new(HashMap::new()),
        }
    }

    /// A relay that drops everything it is given.
    pub fn disabled() -> Self {
        Self {
            outbound_tx: None,
            external_commands: HashSet::new(),
            members: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.outbound_tx.is_some()
    }

    /// Record (or update) a bridge member's display name.
    pub fn set_member(&self, member_id: u64, name: impl Into<String>) {
        let mut members = self.members.write().unwrap_or_else(|e| e.into_inner());
        members.insert(member_id, name.into());
    }

    pub fn remove_member(&self, member_id: u64) {
        let mut members = self.members.write().unwrap_or_else(|e| e.into_inner());
        members.remove(&member_id);
    }
}

impl BridgeGateway for BridgeRelay {
    fn send(&self, channel: BridgeChannel, display_name: &str, text: &str) {
        let Some(tx) = &self.outbound_tx else {
            debug!(?channel, "Bridge disabled, not relaying: {}", text);
            return;
        };

        let outbound = BridgeOutbound {
            channel,
            display_name: display_name.to_string(),
            text: text.to_string(),
        };
        if let Err(e) = tx.send(outbound) {
            warn!("Failed to relay message to the bridge: {}", e);
        }
    }

    fn is_external_command(&self, text: &str) -> bool {
        self.external_commands.contains(text)
    }

    fn member_name(&self, member_id: u64) -> Option<String> {
        let members = self.members.read().unwrap_or_else(|e| e.into_inner());
        members.get(&member_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_queues_outbound() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let relay = BridgeRelay::new(tx, Vec::<String>::new());

        relay.send(BridgeChannel::Primary, "alice", "hello");

        assert_eq!(
            rx.try_recv().ok(),
            Some(BridgeOutbound {
                channel: BridgeChannel::Primary,
                display_name: "alice".to_string(),
                text: "hello".to_string(),
            })
        );
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let relay = BridgeRelay::new(tx, Vec::<String>::new());
        relay.send(BridgeChannel::Secondary, "", "nobody listening");
    }

    #[test]
    fn test_disabled_relay() {
        let relay = BridgeRelay::disabled();
        assert!(!relay.is_enabled());
        relay.send(BridgeChannel::Primary, "alice", "hello");
        assert!(!relay.is_external_command("/link"));
    }

    #[test]
    fn test_external_commands_are_exact() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let relay = BridgeRelay::new(tx, ["/link", "/unlink"]);
        assert!(relay.is_external_command("/link"));
        assert!(!relay.is_external_command("/link me"));
        assert!(!relay.is_external_command("/LINK"));
    }

    #[test]
    fn test_member_directory() {
        let relay = BridgeRelay::disabled();
        relay.set_member(42, "Zamiel");
        assert_eq!(relay.member_name(42).as_deref(), Some("Zamiel"));
        relay.remove_member(42);
        assert_eq!(relay.member_name(42), None);
    }
}
