//! Use cases - chat command orchestration.
//!
//! - `normalize` turns chat text into canonical commands
//! - `goal` owns the single movement-goal slot and the follow state machine
//! - `actions` runs the multi-step commands against the game client
//! - `vitals` keeps the actor's vitals topped up

pub mod actions;
pub mod goal;
pub mod normalize;
pub mod vitals;

pub use actions::{ActionError, ActionExecutor, ActionRequest};
pub use goal::{FollowError, GoalController};
pub use normalize::{CommandNormalizer, NormalizeError, Normalized, NormalizerMode, TextClassifier};
pub use vitals::VitalsGuard;
