//! Chat history persistence.
//!
//! Every accepted chat line is appended to the chat log before it is
//! delivered. The log is append-only and does not deduplicate: writing the
//! same line twice produces two rows.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::error::{StorageError, StorageResult};
use crate::common::UserId;

/// Who wrote a chat log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatActor {
    /// An in-app user (user ID 0 for the server itself).
    Native { user_id: UserId },
    /// A bridge user, identified only by name.
    Bridge { username: String },
}

/// One row of the chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    #[serde(flatten)]
    pub actor: ChatActor,
    pub message: String,
    pub room: String,
    pub datetime_sent: DateTime<Utc>,
}

impl ChatLogEntry {
    pub fn new(actor: ChatActor, message: impl Into<String>, room: impl Into<String>) -> Self {
        Self {
            actor,
            message: message.into(),
            room: room.into(),
            datetime_sent: Utc::now(),
        }
    }
}

/// Append-only chat history.
pub trait ChatStore: Send + Sync {
    fn insert(&self, entry: &ChatLogEntry) -> StorageResult<()>;
}

/// Chat log stored as JSON lines in a single file.
#[derive(Debug)]
pub struct JsonlChatStore {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlChatStore {
    /// Open (or create) the log file for appending.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StorageError::Open {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChatStore for JsonlChatStore {
    fn insert(&self, entry: &ChatLogEntry) -> StorageResult<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = self.file.lock().map_err(|_| StorageError::Unavailable {
            message: "chat log lock poisoned".to_string(),
        })?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        Ok(())
    }
}

/// Chat log kept in memory, for tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemoryChatStore {
    entries: Mutex<Vec<ChatLogEntry>>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<ChatLogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl ChatStore for MemoryChatStore {
    fn insert(&self, entry: &ChatLogEntry) -> StorageResult<()> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::Unavailable {
            message: "memory store lock poisoned".to_string(),
        })?;
        entries.push(entry.clone());
        Ok(())
    }
}
