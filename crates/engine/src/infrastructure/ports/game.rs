//! Game-side ports: the client that owns the world connection and the
//! block/item catalog for the connected protocol version.

use async_trait::async_trait;
use minebot_domain::{ActorSnapshot, BlockPosition, MovementGoal, Position, Vitals};

use super::error::{CatalogError, GameError};

/// Orders and queries against the connected game client.
///
/// Movement has a single goal slot on the client side: `goto` and `set_goal`
/// both replace whatever goal was active, and a replaced `goto` fails.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameClientPort: Send + Sync {
    /// Snapshot of the controlled actor.
    async fn actor(&self) -> Result<ActorSnapshot, GameError>;

    /// Live position of a player, `None` while out of tracking range.
    async fn player_position(&self, name: &str) -> Result<Option<Position>, GameError>;

    /// Navigate once. Resolves on arrival.
    async fn goto(&self, goal: MovementGoal) -> Result<(), GameError>;

    /// Install a continuous goal. Resolves once installed, not on arrival.
    async fn set_goal(&self, goal: MovementGoal) -> Result<(), GameError>;

    /// Replace the current goal with nothing.
    async fn clear_goal(&self) -> Result<(), GameError>;

    /// Nearest block with the given id within `max_distance` of the actor.
    async fn find_nearest_block(
        &self,
        block_id: u32,
        max_distance: u32,
    ) -> Result<Option<BlockPosition>, GameError>;

    async fn dig(&self, position: BlockPosition) -> Result<(), GameError>;

    /// Drop `count` units of an item in one operation.
    async fn toss(&self, item_id: u32, count: u32) -> Result<(), GameError>;

    async fn chat(&self, message: &str) -> Result<(), GameError>;

    async fn set_vitals(&self, vitals: Vitals) -> Result<(), GameError>;
}

/// Unsolicited notifications from the game client.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// The actor joined the world running `version`.
    Spawn { version: String },
    VitalsChanged(Vitals),
    Chat { speaker: String, text: String },
    /// The game connection ended; no further events follow.
    End { reason: Option<String> },
}

/// Block and item name lookup for the connected world's version.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogPort: Send + Sync {
    /// Load the tables for `version` and resolve subsequent lookups against them.
    async fn select_version(&self, version: &str) -> Result<(), CatalogError>;

    fn block_id(&self, name: &str) -> Option<u32>;
    fn item_id(&self, name: &str) -> Option<u32>;
}
