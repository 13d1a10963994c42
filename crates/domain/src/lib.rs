//! Minebot Domain - core value types shared by every layer.
//!
//! Pure data and invariants: no I/O, no async, no knowledge of how commands
//! reach the bot or how the game is connected.

pub mod actor;
pub mod command;
pub mod error;
pub mod goal;
pub mod outcome;

pub use actor::{
    ActorSnapshot, BlockPosition, Inventory, ItemStack, Position, Vitals, MAX_HEALTH, MAX_STAMINA,
};
pub use command::{Command, ItemToken};
pub use error::DomainError;
pub use goal::{FollowGoal, GoalState, MovementGoal};
pub use outcome::ActionOutcome;
