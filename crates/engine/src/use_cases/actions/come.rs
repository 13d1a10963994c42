//! `come`: walk to the speaker once.

use minebot_domain::MovementGoal;

use super::{ActionError, ActionExecutor, APPROACH_TOLERANCE};

impl ActionExecutor {
    pub(super) async fn come(&self, speaker: &str) -> Result<String, ActionError> {
        let position = self
            .game
            .player_position(speaker)
            .await?
            .ok_or_else(|| ActionError::TargetUnresolved(speaker.to_string()))?;

        let ticket = self
            .navigate(MovementGoal::Near {
                position,
                range: APPROACH_TOLERANCE,
            })
            .await?;
        self.goals.release(ticket).await;

        Ok("Here I am".to_string())
    }
}

pub(super) fn failure_reply(error: &ActionError) -> String {
    match error {
        ActionError::TargetUnresolved(_) => "Cannot see you".to_string(),
        _ => "Couldn't reach you".to_string(),
    }
}
