//! Shared types used across the application.

use std::fmt;

use crate::common::error::RoomError;
use crate::lobby::session::SessionHandle;

/// Unique identifier for a registered user.
pub type UserId = u64;

/// Unique identifier for a game (and its chat room).
pub type GameId = u64;

/// Identifier of the global lobby room.
pub const LOBBY_ROOM: &str = "lobby";

/// Prefix of every game room identifier (`game<id>`).
pub const GAME_ROOM_PREFIX: &str = "game";

/// A chat scope: the lobby or one game's room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Lobby,
    Game(GameId),
}

impl Room {
    /// Parse a room identifier (`lobby` or `game<digits>`).
    pub fn parse(raw: &str) -> Result<Self, RoomError> {
        if raw == LOBBY_ROOM {
            return Ok(Room::Lobby);
        }
        if !raw.starts_with(GAME_ROOM_PREFIX) {
            return Err(RoomError::Invalid {
                room: raw.to_string(),
            });
        }
        Self::game_id(raw)
            .map(Room::Game)
            .map_err(|_| RoomError::Invalid {
                room: raw.to_string(),
            })
    }

    /// Check if a raw identifier is the lobby or a well-formed game room.
    pub fn is_valid(raw: &str) -> bool {
        Self::parse(raw).is_ok()
    }

    /// Extract the numeric game ID from a non-lobby room identifier.
    ///
    /// The `game` prefix is stripped when present and the remainder must be
    /// all ASCII digits.
    pub fn game_id(raw: &str) -> Result<GameId, RoomError> {
        let digits = raw.strip_prefix(GAME_ROOM_PREFIX).unwrap_or(raw);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RoomError::BadGameId {
                room: raw.to_string(),
            });
        }
        digits.parse().map_err(|_| RoomError::BadGameId {
            room: raw.to_string(),
        })
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Room::Lobby => f.write_str(LOBBY_ROOM),
            Room::Game(id) => write!(f, "{}{}", GAME_ROOM_PREFIX, id),
        }
    }
}

/// Where an inbound message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A connected in-app user; identity comes from the session.
    Native,
    /// The external chat bridge (Discord).
    ExternalBridge {
        display_name: String,
        /// Secondary identity tag shown in logs (`name#qualifier`).
        qualifier: Option<String>,
    },
    /// The server process itself.
    ServerInternal {
        display_name: String,
        /// Set when the server is echoing a message back from the bridge.
        echo_suppressed: bool,
    },
}

/// Field-less view of [`Origin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginKind {
    Native,
    ExternalBridge,
    ServerInternal,
}

impl Origin {
    pub fn kind(&self) -> OriginKind {
        match self {
            Origin::Native => OriginKind::Native,
            Origin::ExternalBridge { .. } => OriginKind::ExternalBridge,
            Origin::ServerInternal { .. } => OriginKind::ServerInternal,
        }
    }

    pub fn is_bridge(&self) -> bool {
        matches!(self, Origin::ExternalBridge { .. })
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Origin::ServerInternal { .. })
    }
}

/// A single chat/command event to be routed.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Raw message body.
    pub text: String,
    /// Raw room identifier as sent by the client.
    pub room: String,
    pub origin: Origin,
    /// Session of the sender. Required for native events.
    pub session: Option<SessionHandle>,
}

impl InboundEvent {
    /// A message typed by a connected user.
    pub fn native(session: SessionHandle, room: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            room: room.into(),
            origin: Origin::Native,
            session: Some(session),
        }
    }

    /// A lobby message relayed in from the bridge.
    pub fn from_bridge(
        display_name: impl Into<String>,
        qualifier: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            room: LOBBY_ROOM.to_string(),
            origin: Origin::ExternalBridge {
                display_name: display_name.into(),
                qualifier,
            },
            session: None,
        }
    }

    /// A lobby message sent by the server itself.
    pub fn server(display_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            room: LOBBY_ROOM.to_string(),
            origin: Origin::ServerInternal {
                display_name: display_name.into(),
                echo_suppressed: false,
            },
            session: None,
        }
    }

    /// Mark a server message as an echo so the bridge copy goes to the
    /// primary channel.
    pub fn echoed(mut self) -> Self {
        if let Origin::ServerInternal {
            ref mut echo_suppressed,
            ..
        } = self.origin
        {
            *echo_suppressed = true;
        }
        self
    }
}
