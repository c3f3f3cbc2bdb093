//! Chat pipeline: sanitizing, persistence, mention rendering and routing.

pub mod mentions;
pub mod router;
pub mod sanitize;
pub mod store;

pub use router::{ChatRouter, RouterSettings};
pub use sanitize::{Sanitizer, StrictSanitizer};
pub use store::{ChatStore, JsonlChatStore, MemoryChatStore};
