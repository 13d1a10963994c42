//! Canonical command vocabulary.
//!
//! Every chat input, whether matched literally or classified by a language
//! model, ends up as exactly one [`Command`]. Argument-carrying commands hold
//! an [`ItemToken`], which is lowercase, trimmed and free of whitespace and
//! punctuation by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for a block or item identifier
const MAX_TOKEN_LENGTH: usize = 64;

// ============================================================================
// ItemToken
// ============================================================================

/// A validated single-token identifier for a block or item (`iron_ore`, `diamond`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemToken(String);

impl ItemToken {
    /// Create a new validated token. Input is trimmed and lowercased.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The token is empty after trimming
    /// - The token exceeds 64 characters
    /// - The token contains anything other than ASCII letters, digits or `_`
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DomainError> {
        let token = raw.as_ref().trim().to_ascii_lowercase();
        if token.is_empty() {
            return Err(DomainError::validation("Item token cannot be empty"));
        }
        if token.len() > MAX_TOKEN_LENGTH {
            return Err(DomainError::validation(format!(
                "Item token cannot exceed {} characters",
                MAX_TOKEN_LENGTH
            )));
        }
        if let Some(bad) = token
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(DomainError::validation(format!(
                "Item token contains invalid character '{}'",
                bad
            )));
        }
        Ok(Self(token))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ItemToken {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ItemToken> for String {
    fn from(token: ItemToken) -> String {
        token.0
    }
}

// ============================================================================
// Command
// ============================================================================

/// A canonical bot command.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum Command {
    /// Continuously follow the speaker.
    Follow,
    /// Drop the persistent follow goal.
    StopFollow,
    /// Walk to the speaker once.
    Come,
    /// Mine the nearest block of the given kind.
    Mine(ItemToken),
    /// Deliver every held unit of the given item to the speaker.
    Give(ItemToken),
    /// Nothing recognizable was asked.
    None,
}

impl Command {
    /// The vocabulary word for this command, as the classifier spells it.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Follow => "follow",
            Command::StopFollow => "stop_follow",
            Command::Come => "come",
            Command::Mine(_) => "mine",
            Command::Give(_) => "give",
            Command::None => "none",
        }
    }

    /// Argument token, if this command carries one.
    pub fn argument(&self) -> Option<&ItemToken> {
        match self {
            Command::Mine(token) | Command::Give(token) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.argument() {
            Some(arg) => write!(f, "{} {}", self.verb(), arg),
            None => f.write_str(self.verb()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_trimmed_and_lowercased() {
        let token = ItemToken::new("  Iron_Ore ").unwrap();
        assert_eq!(token.as_str(), "iron_ore");
    }

    #[test]
    fn token_rejects_whitespace_and_punctuation() {
        assert!(ItemToken::new("").is_err());
        assert!(ItemToken::new("   ").is_err());
        assert!(ItemToken::new("iron ore").is_err());
        assert!(ItemToken::new("iron-ore").is_err());
        assert!(ItemToken::new("diamond!").is_err());
    }

    #[test]
    fn token_rejects_overlong_input() {
        let long = "a".repeat(MAX_TOKEN_LENGTH + 1);
        assert!(ItemToken::new(long).is_err());
    }

    #[test]
    fn display_matches_classifier_vocabulary() {
        let mine = Command::Mine(ItemToken::new("stone").unwrap());
        assert_eq!(mine.to_string(), "mine stone");
        assert_eq!(Command::StopFollow.to_string(), "stop_follow");
        assert_eq!(Command::None.to_string(), "none");
    }

    #[test]
    fn token_deserialization_validates() {
        let ok: Result<ItemToken, _> = serde_json::from_str("\"Diamond\"");
        assert_eq!(ok.unwrap().as_str(), "diamond");

        let bad: Result<ItemToken, _> = serde_json::from_str("\"two words\"");
        assert!(bad.is_err());
    }
}
