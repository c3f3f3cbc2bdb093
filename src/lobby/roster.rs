//! Live session roster and game registry.
//!
//! Both registries are owned by the wider server and mutated as sessions
//! connect and games start or end. The router only reads them, so each trait
//! exposes a snapshot read that clones the current membership under a read
//! lock.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use crate::common::GameId;
use crate::lobby::session::{SessionHandle, SessionId};

/// Read access to every connected session.
pub trait SessionRoster: Send + Sync {
    /// Snapshot of all live sessions.
    fn snapshot(&self) -> Vec<SessionHandle>;
}

/// Player and spectator sessions of one game.
#[derive(Debug, Clone, Default)]
pub struct GameMembers {
    pub players: Vec<SessionHandle>,
    pub spectators: Vec<SessionHandle>,
}

/// Read access to running games.
pub trait GameDirectory: Send + Sync {
    /// Snapshot of a game's membership, or `None` if no such game exists.
    fn members(&self, id: GameId) -> Option<GameMembers>;
}

/// In-memory roster keyed by session ID.
#[derive(Debug, Default)]
pub struct InMemoryRoster {
    sessions: RwLock<BTreeMap<SessionId, SessionHandle>>,
}

impl InMemoryRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: SessionHandle) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.insert(session.id(), session);
    }

    pub fn remove(&self, id: SessionId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionRoster for InMemoryRoster {
    fn snapshot(&self) -> Vec<SessionHandle> {
        let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
        sessions.values().cloned().collect()
    }
}

/// In-memory game table.
#[derive(Debug, Default)]
pub struct InMemoryGames {
    games: RwLock<HashMap<GameId, GameMembers>>,
}

impl InMemoryGames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a game.
    pub fn insert(&self, id: GameId, members: GameMembers) {
        let mut games = self.games.write().unwrap_or_else(|e| e.into_inner());
        games.insert(id, members);
    }

    pub fn remove(&self, id: GameId) -> Option<GameMembers> {
        let mut games = self.games.write().unwrap_or_else(|e| e.into_inner());
        games.remove(&id)
    }

    /// Number of games in progress.
    pub fn len(&self) -> usize {
        self.games.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl GameDirectory for InMemoryGames {
    fn members(&self, id: GameId) -> Option<GameMembers> {
        let games = self.games.read().unwrap_or_else(|e| e.into_inner());
        games.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_snapshot_is_detached() {
        let roster = InMemoryRoster::new();
        let (alice, _rx_a) = SessionHandle::channel(1, 10, "alice");
        let (bob, _rx_b) = SessionHandle::channel(2, 20, "bob");
        roster.insert(alice);
        roster.insert(bob);

        let snapshot = roster.snapshot();
        roster.remove(1);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_games_lookup() {
        let games = InMemoryGames::new();
        let (alice, _rx) = SessionHandle::channel(1, 10, "alice");
        games.insert(
            7,
            GameMembers {
                players: vec![alice],
                spectators: Vec::new(),
            },
        );

        assert_eq!(games.members(7).map(|g| g.players.len()), Some(1));
        assert!(games.members(8).is_none());

        games.remove(7);
        assert!(games.members(7).is_none());
    }

    #[test]
    fn test_registry_sizes() {
        let roster = InMemoryRoster::new();
        let games = InMemoryGames::new();
        assert!(roster.is_empty());
        assert!(games.is_empty());

        let (alice, _rx) = SessionHandle::channel(1, 10, "alice");
        roster.insert(alice.clone());
        games.insert(
            3,
            GameMembers {
                players: vec![alice],
                spectators: Vec::new(),
            },
        );
        assert!(!roster.is_empty());
        assert_eq!(games.len(), 1);

        roster.remove(1);
        games.remove(3);
        assert!(roster.is_empty());
        assert!(games.is_empty());
    }
}
