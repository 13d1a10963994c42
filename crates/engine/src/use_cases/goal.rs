//! Goal controller.
//!
//! Owns the actor's single movement-goal slot. Every navigation order, the
//! continuous follow goal included, first claims a [`NavigationTicket`];
//! claiming bumps the slot generation, so the most recent claim always owns
//! the slot and older holders can tell they were replaced. Replacement is the
//! only cancellation primitive.

use std::sync::Arc;
use std::time::Duration;

use minebot_domain::{FollowGoal, GoalState, Position};
use tokio::sync::{watch, Mutex};

use crate::infrastructure::ports::{GameClientPort, GameError};

/// Distance tolerance for the continuous follow goal.
pub const FOLLOW_TOLERANCE: f64 = 1.0;

/// How often an unresolved follow target is looked up again.
pub const RESOLVE_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// How long a follow target may stay unresolved before the command fails.
pub const RESOLVE_TIMEOUT: Duration = Duration::from_millis(5000);

/// Proof of owning the movement slot at some generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket {
    generation: u64,
}

/// Errors from installing a follow goal.
#[derive(Debug, thiserror::Error)]
pub enum FollowError {
    #[error("Target {0} could not be resolved in time")]
    TargetUnresolved(String),
    #[error("Follow was replaced before it could start")]
    Cancelled,
    #[error("Failed to install follow goal: {0}")]
    Navigation(#[source] GameError),
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    /// Generation of a follow that has claimed the slot but not yet installed.
    resolving: Option<u64>,
}

/// Idle / FollowingTarget state machine over the shared movement slot.
///
/// The slot lock orders claims against client-side installs and clears, so it
/// is held across those bridge calls. The published state lives outside it and
/// never waits on the bridge.
pub struct GoalController {
    game: Arc<dyn GameClientPort>,
    slot: Mutex<Slot>,
    state: watch::Sender<GoalState>,
    poll_interval: Duration,
    resolve_timeout: Duration,
}

impl GoalController {
    pub fn new(game: Arc<dyn GameClientPort>) -> Self {
        Self::with_timing(game, RESOLVE_POLL_INTERVAL, RESOLVE_TIMEOUT)
    }

    pub fn with_timing(
        game: Arc<dyn GameClientPort>,
        poll_interval: Duration,
        resolve_timeout: Duration,
    ) -> Self {
        Self {
            game,
            slot: Mutex::new(Slot::default()),
            state: watch::channel(GoalState::Idle).0,
            poll_interval,
            resolve_timeout,
        }
    }

    /// Current persistent-goal state.
    pub fn state(&self) -> GoalState {
        self.state.borrow().clone()
    }

    /// Take ownership of the movement slot for a one-shot navigation.
    ///
    /// A running follow goal is dropped from the state machine here; the
    /// navigation order the caller is about to issue replaces it client-side.
    pub async fn claim_navigation(&self) -> NavigationTicket {
        self.claim(false).await
    }

    async fn claim(&self, for_follow: bool) -> NavigationTicket {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        slot.resolving = for_follow.then_some(slot.generation);
        if let GoalState::FollowingTarget(goal) = self.state.send_replace(GoalState::Idle) {
            tracing::debug!(target = %goal.target, "Follow goal preempted by navigation");
        }
        NavigationTicket {
            generation: slot.generation,
        }
    }

    /// Whether `ticket` still owns the slot.
    pub async fn is_current(&self, ticket: NavigationTicket) -> bool {
        self.slot.lock().await.generation == ticket.generation
    }

    /// Hand the slot back after a one-shot navigation finished or failed.
    ///
    /// Clears the client goal only if nobody claimed the slot since; a stale
    /// ticket is a no-op.
    pub async fn release(&self, ticket: NavigationTicket) {
        let slot = self.slot.lock().await;
        self.clear_if_current(&slot, ticket).await;
    }

    async fn clear_if_current(&self, slot: &Slot, ticket: NavigationTicket) {
        if slot.generation != ticket.generation {
            return;
        }
        if let Err(e) = self.game.clear_goal().await {
            tracing::warn!(error = %e, "Failed to clear movement goal");
        }
    }

    /// Resolve `target` and install a continuous follow goal on it.
    ///
    /// Replaces any current goal. The target is polled every poll interval
    /// until it resolves or the resolve timeout passes.
    pub async fn follow(&self, target: &str) -> Result<FollowGoal, FollowError> {
        let ticket = self.claim(true).await;
        let resolution = self.resolve(target, ticket).await;

        let mut slot = self.slot.lock().await;
        if slot.resolving == Some(ticket.generation) {
            slot.resolving = None;
        }
        match resolution {
            Resolution::Found(position) => {
                tracing::debug!(target = %target, position = %position, "Follow target resolved");
            }
            Resolution::Cancelled => return Err(FollowError::Cancelled),
            Resolution::TimedOut => {
                self.clear_if_current(&slot, ticket).await;
                return Err(FollowError::TargetUnresolved(target.to_string()));
            }
        }
        if slot.generation != ticket.generation {
            return Err(FollowError::Cancelled);
        }

        let goal = FollowGoal::new(target, FOLLOW_TOLERANCE);
        self.game
            .set_goal(goal.to_movement())
            .await
            .map_err(FollowError::Navigation)?;
        self.state
            .send_replace(GoalState::FollowingTarget(goal.clone()));

        tracing::info!(target = %goal.target, tolerance = goal.tolerance, "Following target");
        Ok(goal)
    }

    /// Drop the follow goal, or cancel a follow that is still resolving.
    ///
    /// Idempotent. With no follow in either form this touches nothing, so
    /// one-shot navigations keep their tickets.
    ///
    /// Returns whether a follow goal was active.
    pub async fn stop(&self) -> bool {
        let mut slot = self.slot.lock().await;
        let generation = slot.generation;
        let resolving = slot.resolving.take() == Some(generation);
        let following = matches!(*self.state.borrow(), GoalState::FollowingTarget(_));
        if !resolving && !following {
            return false;
        }

        slot.generation += 1;
        match self.state.send_replace(GoalState::Idle) {
            GoalState::FollowingTarget(goal) => {
                if let Err(e) = self.game.clear_goal().await {
                    tracing::warn!(error = %e, "Failed to clear follow goal");
                }
                tracing::info!(target = %goal.target, "Stopped following");
                true
            }
            GoalState::Idle => {
                tracing::debug!("Cancelled follow still resolving");
                false
            }
        }
    }

    async fn resolve(&self, target: &str, ticket: NavigationTicket) -> Resolution {
        let polling = async {
            let mut ticker = tokio::time::interval(self.poll_interval);
            loop {
                ticker.tick().await;
                if !self.is_current(ticket).await {
                    return Resolution::Cancelled;
                }
                match self.game.player_position(target).await {
                    Ok(Some(position)) => return Resolution::Found(position),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::debug!(target = %target, error = %e, "Target lookup failed, retrying");
                    }
                }
            }
        };

        tokio::time::timeout(self.resolve_timeout, polling)
            .await
            .unwrap_or(Resolution::TimedOut)
    }
}

enum Resolution {
    Found(Position),
    Cancelled,
    TimedOut,
}
