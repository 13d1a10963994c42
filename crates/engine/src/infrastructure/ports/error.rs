//! Error types for port operations.

use std::path::PathBuf;

/// Errors from the game client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GameError {
    /// The game connection is gone; nothing can be ordered until restart.
    #[error("Game connection closed")]
    Disconnected,

    /// A request got no answer in time.
    #[error("Game request '{0}' timed out")]
    Timeout(&'static str),

    /// The client refused or failed the order (path blocked, goal changed, dig cancelled...).
    #[error("Game rejected request: {0}")]
    Rejected(String),

    /// A response did not match the expected shape.
    #[error("Bridge protocol error: {0}")]
    Protocol(String),
}

impl GameError {
    pub fn rejected(message: impl ToString) -> Self {
        Self::Rejected(message.to_string())
    }

    pub fn protocol(message: impl ToString) -> Self {
        Self::Protocol(message.to_string())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors loading catalog tables for a game version.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid game version: {0}")]
    InvalidVersion(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
