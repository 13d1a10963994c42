//! Result of one executed command.

use serde::{Deserialize, Serialize};

/// What the actor reports back after handling a command.
///
/// Both variants carry the user-visible text; an outcome is never silent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ActionOutcome {
    Success(String),
    Failure(String),
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success(message.into())
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            Self::Success(message) | Self::Failure(message) => message,
        }
    }
}
