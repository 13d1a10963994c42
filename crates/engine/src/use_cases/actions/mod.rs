//! Action executor.
//!
//! Runs the multi-step commands (`come`, `mine`, `give`). Each follows the
//! same resolve → navigate → act shape, owns the movement slot through a
//! [`NavigationTicket`] while it moves, and hands the slot back when done.
//! Every failure ends up as a terse user-facing [`ActionOutcome`]; details go
//! to the log.

mod come;
mod error;
mod give;
mod mine;

pub use error::{ActionError, CatalogKind};

use std::sync::Arc;

use minebot_domain::{ActionOutcome, Command, ItemToken, MovementGoal};

use crate::infrastructure::ports::{CatalogPort, GameClientPort};
use crate::use_cases::goal::{GoalController, NavigationTicket};

/// How far around the actor `mine` searches for a matching block.
pub const MINE_SEARCH_RADIUS: u32 = 32;

/// Proximity tolerance when walking up to a player.
pub const APPROACH_TOLERANCE: f64 = 1.0;

/// Reply for any navigation that lost the slot to a newer order.
pub const INTERRUPTED_REPLY: &str = "Interrupted by a newer command";

/// A multi-step action ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionRequest {
    Come { speaker: String },
    Mine { block: ItemToken },
    Give { speaker: String, item: ItemToken },
}

impl ActionRequest {
    /// The action for `command`, if it is one the executor runs.
    pub fn from_command(speaker: &str, command: &Command) -> Option<Self> {
        match command {
            Command::Come => Some(ActionRequest::Come {
                speaker: speaker.to_string(),
            }),
            Command::Mine(block) => Some(ActionRequest::Mine {
                block: block.clone(),
            }),
            Command::Give(item) => Some(ActionRequest::Give {
                speaker: speaker.to_string(),
                item: item.clone(),
            }),
            Command::Follow | Command::StopFollow | Command::None => None,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            ActionRequest::Come { .. } => "come",
            ActionRequest::Mine { .. } => "mine",
            ActionRequest::Give { .. } => "give",
        }
    }
}

pub struct ActionExecutor {
    game: Arc<dyn GameClientPort>,
    catalog: Arc<dyn CatalogPort>,
    goals: Arc<GoalController>,
}

impl ActionExecutor {
    pub fn new(
        game: Arc<dyn GameClientPort>,
        catalog: Arc<dyn CatalogPort>,
        goals: Arc<GoalController>,
    ) -> Self {
        Self {
            game,
            catalog,
            goals,
        }
    }

    /// Run `request` to completion. Never fails; failures are outcomes.
    pub async fn execute(&self, request: ActionRequest) -> ActionOutcome {
        let verb = request.verb();
        let result = match &request {
            ActionRequest::Come { speaker } => self.come(speaker).await,
            ActionRequest::Mine { block } => self.mine(block).await,
            ActionRequest::Give { speaker, item } => self.give(speaker, item).await,
        };

        match result {
            Ok(message) => {
                tracing::info!(action = verb, reply = %message, "Action completed");
                ActionOutcome::success(message)
            }
            Err(e) => {
                if e.is_game_fault() {
                    tracing::warn!(action = verb, error = ?e, "Action failed");
                } else {
                    tracing::info!(action = verb, reason = %e, "Action not performed");
                }
                let message = match (&request, &e) {
                    (_, ActionError::Interrupted) => INTERRUPTED_REPLY.to_string(),
                    (ActionRequest::Come { .. }, e) => come::failure_reply(e),
                    (ActionRequest::Mine { block }, e) => mine::failure_reply(block, e),
                    (ActionRequest::Give { item, .. }, e) => give::failure_reply(item, e),
                };
                ActionOutcome::failure(message)
            }
        }
    }

    /// Claim the slot and navigate once.
    ///
    /// On success the caller holds the returned ticket and must release it.
    /// On failure the ticket is already released.
    async fn navigate(&self, goal: MovementGoal) -> Result<NavigationTicket, ActionError> {
        let ticket = self.goals.claim_navigation().await;
        tracing::debug!(goal = ?goal, "Navigating");

        let Err(e) = self.game.goto(goal).await else {
            return Ok(ticket);
        };
        if !self.goals.is_current(ticket).await {
            tracing::debug!(error = %e, "Navigation replaced by a newer order");
            return Err(ActionError::Interrupted);
        }
        self.goals.release(ticket).await;
        Err(ActionError::NavigationFailure(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{FakeGame, StaticCatalog};
    use minebot_domain::{GoalState, Position};

    #[test]
    fn only_multi_step_commands_become_requests() {
        let stone = ItemToken::new("stone").unwrap();

        assert_eq!(
            ActionRequest::from_command("alex", &Command::Mine(stone.clone())),
            Some(ActionRequest::Mine { block: stone })
        );
        assert_eq!(
            ActionRequest::from_command("alex", &Command::Come),
            Some(ActionRequest::Come {
                speaker: "alex".into()
            })
        );
        assert_eq!(ActionRequest::from_command("alex", &Command::Follow), None);
        assert_eq!(ActionRequest::from_command("alex", &Command::StopFollow), None);
        assert_eq!(ActionRequest::from_command("alex", &Command::None), None);
    }

    #[tokio::test]
    async fn replaced_navigation_reports_interruption() {
        let game = Arc::new(
            FakeGame::new("Bot")
                .with_player("alex", Position::new(30.0, 64.0, 0.0))
                .with_player("sam", Position::new(-5.0, 64.0, 2.0)),
        );
        game.world().hold_goto = true;
        let goals = Arc::new(GoalController::new(game.clone()));
        let executor = Arc::new(ActionExecutor::new(
            game.clone(),
            Arc::new(StaticCatalog::new()),
            goals.clone(),
        ));

        let walking = {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .execute(ActionRequest::Come {
                        speaker: "alex".into(),
                    })
                    .await
            })
        };
        game.goto_started().await;

        goals.follow("sam").await.unwrap();
        let outcome = walking.await.unwrap();

        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), INTERRUPTED_REPLY);
        // The interrupted action must not clear the newer follow goal.
        assert_eq!(game.world().clear_goals, 0);
        assert!(matches!(goals.state(), GoalState::FollowingTarget(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_follow_while_idle_keeps_navigation_failure_generic() {
        let game = Arc::new(FakeGame::new("Bot").with_player("alex", Position::new(30.0, 64.0, 0.0)));
        {
            let mut world = game.world();
            world.fail_goto = true;
            world.goto_delay = Some(std::time::Duration::from_millis(200));
        }
        let goals = Arc::new(GoalController::new(game.clone()));
        let executor = Arc::new(ActionExecutor::new(
            game.clone(),
            Arc::new(StaticCatalog::new()),
            goals.clone(),
        ));

        let walking = {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .execute(ActionRequest::Come {
                        speaker: "alex".into(),
                    })
                    .await
            })
        };
        game.goto_started().await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        assert!(!goals.stop().await);
        let outcome = walking.await.unwrap();

        assert_eq!(outcome.message(), "Couldn't reach you");
        // The failed walk still hands the slot back.
        assert_eq!(game.world().clear_goals, 1);
        assert_eq!(game.world().goal, None);
    }

    #[tokio::test]
    async fn finished_action_leaves_no_goal_behind() {
        let game = Arc::new(FakeGame::new("Bot").with_player("alex", Position::new(8.0, 64.0, 0.0)));
        let goals = Arc::new(GoalController::new(game.clone()));
        let executor = ActionExecutor::new(game.clone(), Arc::new(StaticCatalog::new()), goals);

        let outcome = executor
            .execute(ActionRequest::Come {
                speaker: "alex".into(),
            })
            .await;

        assert!(outcome.is_success());
        let world = game.world();
        assert_eq!(world.position, Position::new(8.0, 64.0, 0.0));
        assert_eq!(world.goal, None);
    }
}
