//! Connected sessions, running games, and recipient resolution.

pub mod resolver;
pub mod roster;
pub mod session;

pub use resolver::{GameNotFound, RecipientResolver};
pub use roster::{GameDirectory, GameMembers, InMemoryGames, InMemoryRoster, SessionRoster};
pub use session::{ChatNotification, SessionHandle, SessionMessage};
