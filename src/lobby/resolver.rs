//! Recipient resolution for chat rooms.

use std::sync::Arc;

use thiserror::Error;

use crate::common::{GameId, Room};
use crate::lobby::roster::{GameDirectory, SessionRoster};
use crate::lobby::session::SessionHandle;

/// The requested game does not exist (anymore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Game {0} does not exist.")]
pub struct GameNotFound(pub GameId);

/// Maps a room to the sessions that should see its messages.
#[derive(Clone)]
pub struct RecipientResolver {
    roster: Arc<dyn SessionRoster>,
    games: Arc<dyn GameDirectory>,
}

impl RecipientResolver {
    pub fn new(roster: Arc<dyn SessionRoster>, games: Arc<dyn GameDirectory>) -> Self {
        Self { roster, games }
    }

    /// Resolve the live recipient set for a room.
    ///
    /// The lobby is every connected session. A game room is the game's players
    /// followed by its spectators; the two lists are disjoint, so nothing is
    /// deduplicated.
    pub fn resolve(&self, room: Room) -> Result<Vec<SessionHandle>, GameNotFound> {
        match room {
            Room::Lobby => Ok(self.roster.snapshot()),
            Room::Game(id) => {
                let members = self.games.members(id).ok_or(GameNotFound(id))?;
                let mut recipients = members.players;
                recipients.extend(members.spectators);
                Ok(recipients)
            }
        }
    }

    /// Snapshot of the whole lobby roster.
    pub fn lobby(&self) -> Vec<SessionHandle> {
        self.roster.snapshot()
    }
}
