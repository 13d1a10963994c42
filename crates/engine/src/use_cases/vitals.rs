//! Vitals guard: keeps health and stamina topped up.

use std::sync::Arc;

use minebot_domain::Vitals;

use crate::infrastructure::ports::GameClientPort;

/// Reacts to vitals notifications by raising below-max stats to max.
///
/// Holds no state between invocations and never fails; a rejected write is
/// logged and the next notification tries again.
pub struct VitalsGuard {
    game: Arc<dyn GameClientPort>,
}

impl VitalsGuard {
    pub fn new(game: Arc<dyn GameClientPort>) -> Self {
        Self { game }
    }

    /// Handle one vitals change. Returns the values the actor should now have.
    pub async fn on_vitals_changed(&self, current: Vitals) -> Vitals {
        let restored = current.restored();
        if restored == current {
            return current;
        }

        tracing::debug!(
            health = current.health,
            stamina = current.stamina,
            "Restoring vitals"
        );
        if let Err(e) = self.game.set_vitals(restored).await {
            tracing::warn!(error = %e, "Failed to restore vitals");
        }
        restored
    }
}
