//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {message}")]
    IoError { path: String, message: String },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Chat log persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open chat log '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write chat log entry: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to encode chat log entry: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Chat store unavailable: {message}")]
    Unavailable { message: String },
}

/// Room identifier errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("'{room}' is not a valid room")]
    Invalid { room: String },

    #[error("Failed to parse the game ID from room '{room}'")]
    BadGameId { room: String },
}

/// Errors raised by command handlers; the message is shown to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("{0}")]
    Usage(String),

    #[error("You must be an administrator to use the \"{trigger}\" command.")]
    NotPermitted { trigger: String },

    #[error("{0}")]
    Rejected(String),
}

/// Outcome of a failed dispatch step. Every variant is handled by the router
/// and never escapes `ChatRouter::route`.
#[derive(Debug, Error)]
pub enum RouteError {
    /// Bad input from the sender; they get a warning.
    #[error("{0}")]
    UserInput(String),

    /// A native event arrived without its session.
    #[error("Failed to send a chat message because the sender's session was missing")]
    Precondition,

    #[error("Failed to insert a chat message into the database: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Parse(#[from] RoomError),

    /// Bridge-only command invoked from somewhere else.
    #[error("Sorry, but you can only perform the \"{trigger}\" command from Discord.")]
    CommandMismatch { trigger: String },

    #[error("That is not a valid command.")]
    UnrecognizedCommand,

    #[error("{0}")]
    Command(#[from] CommandError),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result type alias for a single dispatch step.
pub type RouteResult<T> = std::result::Result<T, RouteError>;
