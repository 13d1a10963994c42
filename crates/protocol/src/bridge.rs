//! Game bridge messages (Bot ↔ game-client sidecar).
//!
//! The sidecar owns the game protocol connection, pathfinding and world
//! search. The bot sends correlated requests and receives both responses and
//! unsolicited world events over the same socket.

use serde::{Deserialize, Serialize};

use crate::types::{BlockPositionData, GoalData, PositionData};

/// A request to the sidecar. `id` correlates the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub id: String,
    #[serde(flatten)]
    pub op: BridgeOp,
}

/// Operations the sidecar performs on the bot's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeOp {
    /// Read the actor snapshot. Result: [`ActorData`].
    Actor,
    /// Look up a player's live position. Result: `PositionData` or null.
    PlayerPosition { name: String },
    /// Navigate once; resolves on arrival, errors when replaced or unreachable.
    Goto { goal: GoalData },
    /// Install a continuous goal; resolves once installed.
    SetGoal { goal: GoalData },
    /// Replace the current goal with nothing.
    ClearGoal,
    /// Nearest matching block. Result: `BlockPositionData` or null.
    FindBlock { block_id: u32, max_distance: u32 },
    Dig { position: BlockPositionData },
    Toss { item_id: u32, count: u32 },
    Chat { message: String },
    SetVitals { health: f32, stamina: u32 },
}

impl BridgeOp {
    /// Short operation name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            BridgeOp::Actor => "actor",
            BridgeOp::PlayerPosition { .. } => "player_position",
            BridgeOp::Goto { .. } => "goto",
            BridgeOp::SetGoal { .. } => "set_goal",
            BridgeOp::ClearGoal => "clear_goal",
            BridgeOp::FindBlock { .. } => "find_block",
            BridgeOp::Dig { .. } => "dig",
            BridgeOp::Toss { .. } => "toss",
            BridgeOp::Chat { .. } => "chat",
            BridgeOp::SetVitals { .. } => "set_vitals",
        }
    }
}

/// Anything the sidecar sends to the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeMessage {
    Response {
        id: String,
        #[serde(default)]
        result: serde_json::Value,
        #[serde(default)]
        error: Option<String>,
    },
    Event(BridgeEvent),
}

/// Unsolicited world events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// The actor joined the world; `version` selects the block/item catalog.
    Spawn { version: String },
    Vitals { health: f32, stamina: u32 },
    Chat { speaker: String, text: String },
    /// The game connection ended.
    End {
        #[serde(default)]
        reason: Option<String>,
    },
}

/// Result payload of [`BridgeOp::Actor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorData {
    pub name: String,
    pub position: PositionData,
    pub health: f32,
    pub stamina: u32,
    #[serde(default)]
    pub inventory: Vec<ItemStackData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStackData {
    pub name: String,
    pub item_id: u32,
    pub count: u32,
}
