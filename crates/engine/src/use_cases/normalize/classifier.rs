//! Language-model text classifier.
//!
//! Asks the model for exactly one line from the command vocabulary and maps
//! whatever comes back onto a [`Command`]. Model output is never trusted:
//! anything outside the vocabulary becomes [`Command::None`].

use std::sync::Arc;

use minebot_domain::{Command, ItemToken};

use crate::infrastructure::ports::{ChatMessage, LlmError, LlmPort, LlmRequest};

/// Enough for a verb plus one token; longer output is malformed anyway.
const CLASSIFIER_MAX_TOKENS: u32 = 16;

const SYSTEM_PROMPT: &str = r#"You are a STRICT command generator for a Minecraft bot.

Output EXACTLY one command from:
follow
stop_follow
come
mine <block>
give <item>
none

Rules:
- lowercase only
- underscores only
- no extra words
- no punctuation
- no explanations

Examples:
"follow me" -> follow
"stop following me" -> stop_follow
"come here" -> come
"mine iron ore" -> mine iron_ore
"bring me diamonds" -> give diamond
"what's up?" -> none"#;

/// Single-attempt classifier over an [`LlmPort`].
pub struct TextClassifier {
    llm: Arc<dyn LlmPort>,
}

impl TextClassifier {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    /// Classify free text into a command.
    ///
    /// Only a failed model call is an error; malformed output is `None`.
    pub async fn classify(&self, text: &str) -> Result<Command, LlmError> {
        let request = LlmRequest::new(vec![ChatMessage::user(text)])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.0)
            .with_max_tokens(Some(CLASSIFIER_MAX_TOKENS));

        let response = self.llm.generate(request).await?;
        let command = parse_classifier_line(&response.content);

        tracing::debug!(
            text = %text,
            raw = %response.content.trim(),
            command = %command,
            "Classified chat text"
        );

        Ok(command)
    }
}

/// Map a raw classifier reply onto the vocabulary.
///
/// Only the first non-empty line counts. Accepted shapes are a bare
/// `follow`/`stop_follow`/`come`/`none` or `mine`/`give` followed by exactly
/// one token.
pub fn parse_classifier_line(raw: &str) -> Command {
    let line = raw
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_lowercase();
    let words: Vec<&str> = line.split_whitespace().collect();

    match words.as_slice() {
        ["follow"] => Command::Follow,
        ["stop_follow"] => Command::StopFollow,
        ["come"] => Command::Come,
        ["mine", arg] => argument(arg).map_or(Command::None, Command::Mine),
        ["give", arg] => argument(arg).map_or(Command::None, Command::Give),
        _ => Command::None,
    }
}

fn argument(raw: &str) -> Option<ItemToken> {
    let trimmed = raw.trim_matches(|c: char| !(c.is_ascii_alphanumeric() || c == '_'));
    let name = trimmed.strip_prefix("minecraft:").unwrap_or(trimmed);
    ItemToken::new(name).ok()
}
