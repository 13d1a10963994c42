//! Shared coordinate and goal DTOs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionData {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockPositionData {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Movement goal as the sidecar's pathfinder understands it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GoalData {
    Near { position: PositionData, range: f64 },
    Block { position: BlockPositionData },
    Follow { player: String, range: f64 },
}
