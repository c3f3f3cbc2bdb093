//! Bridge channel selection and outbound message shape.

use serde::Serialize;
use tokio::sync::mpsc;

/// Which external channel a relayed line goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeChannel {
    /// The public lobby mirror (e.g. Discord #general).
    Primary,
    /// Server chatter that should not clutter the lobby mirror.
    Secondary,
}

impl BridgeChannel {
    /// Pick the channel for a relayed lobby line.
    ///
    /// Server messages go to the secondary channel unless they are echoes of
    /// something that already belongs on the primary one.
    pub fn for_lobby_line(server: bool, echo_suppressed: bool) -> Self {
        if server && !echo_suppressed {
            BridgeChannel::Secondary
        } else {
            BridgeChannel::Primary
        }
    }
}

/// A line relayed out to the external system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeOutbound {
    pub channel: BridgeChannel,
    pub display_name: String,
    pub text: String,
}

/// Both ends of the outbound bridge queue.
pub struct BridgeChannels {
    pub outbound_tx: mpsc::UnboundedSender<BridgeOutbound>,
    pub outbound_rx: mpsc::UnboundedReceiver<BridgeOutbound>,
}

impl BridgeChannels {
    pub fn new() -> Self {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        Self {
            outbound_tx,
            outbound_rx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_selection() {
        assert_eq!(BridgeChannel::for_lobby_line(false, false), BridgeChannel::Primary);
        assert_eq!(BridgeChannel::for_lobby_line(false, true), BridgeChannel::Primary);
        assert_eq!(BridgeChannel::for_lobby_line(true, false), BridgeChannel::Secondary);
        assert_eq!(BridgeChannel::for_lobby_line(true, true), BridgeChannel::Primary);
    }
}
