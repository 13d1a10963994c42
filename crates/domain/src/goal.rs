//! Movement goals and the persistent-goal state machine.

use serde::{Deserialize, Serialize};

use crate::actor::{BlockPosition, Position};

/// A navigation order understood by the external movement subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MovementGoal {
    /// Get within `range` of a position.
    Near { position: Position, range: f64 },
    /// Stand on / reach a specific block.
    Block { position: BlockPosition },
    /// Keep within `range` of a named player, re-evaluated continuously.
    Follow { player: String, range: f64 },
}

/// Descriptor of the continuous follow behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowGoal {
    pub target: String,
    pub tolerance: f64,
}

impl FollowGoal {
    pub fn new(target: impl Into<String>, tolerance: f64) -> Self {
        Self {
            target: target.into(),
            tolerance,
        }
    }

    /// The movement order that realizes this goal.
    pub fn to_movement(&self) -> MovementGoal {
        MovementGoal::Follow {
            player: self.target.clone(),
            range: self.tolerance,
        }
    }
}

/// State of the single persistent-goal slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GoalState {
    #[default]
    Idle,
    FollowingTarget(FollowGoal),
}

impl GoalState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GoalState::Idle)
    }

    /// Name of the followed player, if any.
    pub fn following(&self) -> Option<&str> {
        match self {
            GoalState::FollowingTarget(goal) => Some(goal.target.as_str()),
            GoalState::Idle => None,
        }
    }
}
