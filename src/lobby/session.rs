//! Session handles and the messages delivered through them.
//!
//! A `SessionHandle` is a cheap, cloneable reference to a connected client.
//! Delivery is fire-and-forget over an unbounded channel owned by the
//! transport layer; a closed channel means the session went away and the
//! message is dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::common::{OriginKind, UserId};

/// Unique identifier for a live connection.
pub type SessionId = u64;

/// Generic text sent to a client when an internal failure aborts its request.
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Something went wrong. Please contact an administrator.";

/// A chat line as delivered to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatNotification {
    pub text: String,
    pub display_name: String,
    /// Sent from the external bridge.
    pub discord: bool,
    /// Sent by the server itself.
    pub server: bool,
    pub timestamp: DateTime<Utc>,
    pub room: String,
}

impl ChatNotification {
    pub fn new(
        text: impl Into<String>,
        display_name: impl Into<String>,
        origin: OriginKind,
        timestamp: DateTime<Utc>,
        room: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            display_name: display_name.into(),
            discord: origin == OriginKind::ExternalBridge,
            server: origin == OriginKind::ServerInternal,
            timestamp,
            room: room.into(),
        }
    }
}

/// Everything the router can push to a single session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SessionMessage {
    Chat(ChatNotification),
    Warning(String),
    Error(String),
}

/// Handle to a connected session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    user_id: UserId,
    username: String,
    admin: bool,
    tx: mpsc::UnboundedSender<SessionMessage>,
}

impl SessionHandle {
    pub fn new(
        id: SessionId,
        user_id: UserId,
        username: impl Into<String>,
        tx: mpsc::UnboundedSender<SessionMessage>,
    ) -> Self {
        Self {
            id,
            user_id,
            username: username.into(),
            admin: false,
            tx,
        }
    }

    /// Create a handle together with the receiving end of its outbox.
    pub fn channel(
        id: SessionId,
        user_id: UserId,
        username: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, user_id, username, tx), rx)
    }

    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Whether the transport side is still listening.
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Deliver a chat line. Returns `false` when the session is gone.
    pub fn notify(&self, notification: ChatNotification) -> bool {
        self.send(SessionMessage::Chat(notification))
    }

    pub fn warning(&self, message: impl Into<String>) -> bool {
        self.send(SessionMessage::Warning(message.into()))
    }

    /// Send an error; an empty message is replaced by the generic one.
    pub fn error(&self, message: impl Into<String>) -> bool {
        let message = message.into();
        let message = if message.is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        };
        self.send(SessionMessage::Error(message))
    }

    fn send(&self, message: SessionMessage) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(_) => {
                debug!(
                    session_id = self.id,
                    username = %self.username,
                    "Session closed, dropping message"
                );
                false
            }
        }
    }
}

impl PartialEq for SessionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SessionHandle {}
