//! Waiting list for players who want to be pinged when the next game starts.

use std::sync::Mutex;

use tracing::debug;

/// Ordered, duplicate-free list of display names.
#[derive(Debug, Default)]
pub struct WaitingList {
    names: Mutex<Vec<String>>,
}

impl WaitingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Returns `false` if it was already on the list.
    pub fn add(&self, name: &str) -> bool {
        let mut names = self.names.lock().unwrap_or_else(|e| e.into_inner());
        if names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return false;
        }
        names.push(name.to_string());
        debug!(count = names.len(), "Added {} to the waiting list", name);
        true
    }

    /// Remove a name. Returns `false` if it was not on the list.
    pub fn remove(&self, name: &str) -> bool {
        let mut names = self.names.lock().unwrap_or_else(|e| e.into_inner());
        let before = names.len();
        names.retain(|n| !n.eq_ignore_ascii_case(name));
        before != names.len()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.names.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Human-readable summary used by `/list`.
    pub fn describe(&self) -> String {
        let names = self.snapshot();
        if names.is_empty() {
            "The waiting list is empty.".to_string()
        } else {
            format!("Waiting list: {}", names.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let list = WaitingList::new();
        assert!(list.add("Alice"));
        assert!(!list.add("alice"));
        assert_eq!(list.snapshot(), vec!["Alice"]);
    }

    #[test]
    fn test_remove() {
        let list = WaitingList::new();
        list.add("Alice");
        list.add("Bob");
        assert!(list.remove("ALICE"));
        assert!(!list.remove("Carol"));
        assert_eq!(list.snapshot(), vec!["Bob"]);
    }

    #[test]
    fn test_describe() {
        let list = WaitingList::new();
        assert_eq!(list.describe(), "The waiting list is empty.");
        list.add("Alice");
        list.add("Bob");
        assert_eq!(list.describe(), "Waiting list: Alice, Bob");
    }
}
