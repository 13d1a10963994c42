//! Session dispatcher.
//!
//! Entry point for every chat-like event, whether it came from the game or was
//! relayed from an observer. Normalizes the text, routes the command to the
//! goal controller or the action executor and produces exactly one reply for
//! every event it does not ignore.

use std::sync::Arc;

use minebot_domain::Command;

use crate::use_cases::{
    ActionExecutor, ActionRequest, CommandNormalizer, FollowError, GoalController, Normalized,
};

pub const UNRECOGNIZED_REPLY: &str = "Sorry, I didn't understand that";
pub const CLASSIFIER_FAILED_REPLY: &str = "NLP failed";

/// One line of chat attributed to a speaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub speaker: String,
    pub text: String,
}

impl ChatEvent {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

pub struct SessionDispatcher {
    username: String,
    normalizer: CommandNormalizer,
    goals: Arc<GoalController>,
    executor: ActionExecutor,
}

impl SessionDispatcher {
    pub fn new(
        username: impl Into<String>,
        normalizer: CommandNormalizer,
        goals: Arc<GoalController>,
        executor: ActionExecutor,
    ) -> Self {
        Self {
            username: username.into(),
            normalizer,
            goals,
            executor,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Handle one chat event.
    ///
    /// Returns `None` for the actor's own messages and for text the literal
    /// matcher ignores; every other event yields exactly one reply.
    pub async fn handle(&self, event: &ChatEvent) -> Option<String> {
        if event.speaker == self.username {
            return None;
        }

        let normalized = match self.normalizer.normalize(&event.text).await {
            Ok(normalized) => normalized,
            Err(e) => {
                tracing::error!(speaker = %event.speaker, error = %e, "Failed to normalize chat");
                return Some(CLASSIFIER_FAILED_REPLY.to_string());
            }
        };

        match normalized {
            Normalized::Ignored => None,
            Normalized::MissingArgument(verb) => Some(usage(verb)),
            Normalized::Command(command) => {
                tracing::info!(speaker = %event.speaker, command = %command, "Dispatching command");
                Some(self.route(&event.speaker, command).await)
            }
        }
    }

    async fn route(&self, speaker: &str, command: Command) -> String {
        match command {
            Command::Follow => match self.goals.follow(speaker).await {
                Ok(_) => "Started following you".to_string(),
                Err(FollowError::TargetUnresolved(_)) => "I can't see you".to_string(),
                Err(FollowError::Cancelled) => "Follow cancelled".to_string(),
                Err(e @ FollowError::Navigation(_)) => {
                    tracing::warn!(speaker = %speaker, error = ?e, "Follow failed");
                    "Failed to follow you".to_string()
                }
            },
            Command::StopFollow => {
                self.goals.stop().await;
                "Stopped following".to_string()
            }
            Command::None => UNRECOGNIZED_REPLY.to_string(),
            command => match ActionRequest::from_command(speaker, &command) {
                Some(request) => self.executor.execute(request).await.into_message(),
                None => UNRECOGNIZED_REPLY.to_string(),
            },
        }
    }
}

fn usage(verb: &str) -> String {
    match verb {
        "give" => "Usage: give <item_name>".to_string(),
        _ => "Usage: mine <block_name>".to_string(),
    }
}
