//! Common utilities and types shared across the application.

pub mod error;
pub mod types;

pub use types::{GameId, InboundEvent, Origin, OriginKind, Room, UserId, LOBBY_ROOM};
