//! `give <item>`: walk to the speaker and drop every held unit of an item.

use minebot_domain::{ItemToken, MovementGoal};

use super::{ActionError, ActionExecutor, CatalogKind, APPROACH_TOLERANCE};

impl ActionExecutor {
    pub(super) async fn give(&self, speaker: &str, item: &ItemToken) -> Result<String, ActionError> {
        if self.catalog.item_id(item.as_str()).is_none() {
            return Err(ActionError::UnknownCatalogEntry {
                kind: CatalogKind::Item,
                name: item.clone(),
            });
        }

        // Toss by the id the client reports; catalog ids may lag its version.
        let inventory = self.game.actor().await?.inventory;
        let held = inventory.count_of(item.as_str());
        let Some(item_id) = inventory.item_id_of(item.as_str()).filter(|_| held > 0) else {
            return Err(ActionError::InsufficientInventory(item.clone()));
        };

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
        let tossed = self.game.toss(item_id, held).await;
        self.goals.release(ticket).await;
        tossed.map_err(ActionError::ActionFailure)?;

        Ok(format!("Gave you {} {}", held, item))
    }
}

pub(super) fn failure_reply(item: &ItemToken, error: &ActionError) -> String {
    match error {
        ActionError::UnknownCatalogEntry { .. } => format!("Unknown item: {}", item),
        ActionError::InsufficientInventory(_) => format!("I don't have {}", item),
        ActionError::TargetUnresolved(_) => "Cannot see you".to_string(),
        _ => format!("Failed to deliver {}", item),
    }
}
