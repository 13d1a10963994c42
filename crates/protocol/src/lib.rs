//! Minebot Protocol - wire types shared with external processes
//!
//! This crate contains the JSON message types for:
//! - the observer relay (dashboard WebSocket): `ClientMessage`, `ServerMessage`
//! - the game bridge (sidecar owning the game connection): `BridgeRequest`,
//!   `BridgeOp`, `BridgeMessage`, `BridgeEvent`
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json and chrono
//! 2. **No business logic** - Pure data types and serialization
//! 3. **No domain types** - conversions live in the engine

pub mod bridge;
pub mod relay;
pub mod types;

pub use bridge::{ActorData, BridgeEvent, BridgeMessage, BridgeOp, BridgeRequest, ItemStackData};
pub use relay::{ActorStatsData, ClientMessage, InventoryEntryData, ServerMessage};
pub use types::{BlockPositionData, GoalData, PositionData};
