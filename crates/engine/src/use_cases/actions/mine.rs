//! `mine <block>`: find the nearest matching block, walk there, dig it.

use minebot_domain::{ItemToken, MovementGoal};

use super::{ActionError, ActionExecutor, CatalogKind, MINE_SEARCH_RADIUS};

impl ActionExecutor {
    pub(super) async fn mine(&self, block: &ItemToken) -> Result<String, ActionError> {
        let block_id =
            self.catalog
                .block_id(block.as_str())
                .ok_or_else(|| ActionError::UnknownCatalogEntry {
                    kind: CatalogKind::Block,
                    name: block.clone(),
                })?;

        let position = self
            .game
            .find_nearest_block(block_id, MINE_SEARCH_RADIUS)
            .await?
            .ok_or_else(|| ActionError::NotFound(block.clone()))?;

        tracing::debug!(block = %block, block_id, position = %position, "Found block to mine");

        let ticket = self.navigate(MovementGoal::Block { position }).await?;
        let dug = self.game.dig(position).await;
        self.goals.release(ticket).await;
        dug.map_err(ActionError::ActionFailure)?;

        Ok(format!("Successfully mined {}", block))
    }
}

pub(super) fn failure_reply(block: &ItemToken, error: &ActionError) -> String {
    match error {
        ActionError::UnknownCatalogEntry { .. } => format!("Unknown block: {}", block),
        ActionError::NotFound(_) => format!("No {} nearby", block),
        _ => format!("Failed to mine {}", block),
    }
}
