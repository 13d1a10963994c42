//! In-memory stand-ins for the game client and catalog.
//!
//! `FakeGame` keeps enough world state to run whole chat scenarios: players
//! with positions, an inventory that shrinks when items are tossed, a block
//! index for searches and a record of every order issued. Its movement slot
//! behaves like the real client's: any new `goto`, `set_goal` or `clear_goal`
//! replaces the previous goal, and a replaced `goto` fails.
//!
//! ```rust,ignore
//! let game = FakeGame::new("Bot")
//!     .with_player("alex", Position::new(10.0, 64.0, 0.0))
//!     .with_stack("iron_ore", 15, 3);
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use minebot_domain::{
    ActorSnapshot, BlockPosition, Inventory, ItemStack, MovementGoal, Position, Vitals,
};
use tokio::sync::{watch, Notify};

use crate::app::{App, AppPorts};
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::ports::{CatalogError, CatalogPort, GameClientPort, GameError};
use crate::use_cases::CommandNormalizer;

/// Timestamp every test clock reports.
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Catalog with the handful of names the scenarios use.
pub fn test_catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_block("stone", 1)
        .with_block("iron_ore", 15)
        .with_item("iron_ore", 64)
        .with_item("diamond", 802)
}

/// Literal-mode app named `Bot` around `game`, relaying observers as `dashboard`.
pub fn test_app(game: Arc<FakeGame>) -> Arc<App> {
    Arc::new(App::new(
        "Bot",
        "dashboard",
        CommandNormalizer::literal(),
        AppPorts {
            game,
            catalog: Arc::new(test_catalog()),
            clock: Arc::new(FixedClock(test_now())),
        },
    ))
}

/// Everything the fake world knows and everything it was asked to do.
#[derive(Debug, Default)]
pub struct FakeWorld {
    pub position: Position,
    pub vitals: Vitals,
    pub inventory: Inventory,
    pub players: HashMap<String, Position>,
    pub blocks: HashMap<u32, BlockPosition>,

    /// Goal currently installed on the client.
    pub goal: Option<MovementGoal>,
    pub gotos: Vec<MovementGoal>,
    pub set_goals: Vec<MovementGoal>,
    pub clear_goals: usize,
    pub searches: Vec<(u32, u32)>,
    pub dug: Vec<BlockPosition>,
    pub tossed: Vec<(u32, u32)>,
    pub chats: Vec<String>,
    pub vitals_set: Vec<Vitals>,

    pub fail_goto: bool,
    pub fail_dig: bool,
    pub fail_toss: bool,
    /// When set, `goto` does not arrive until its goal is replaced.
    pub hold_goto: bool,
    /// Travel time before `goto` arrives or fails.
    pub goto_delay: Option<Duration>,
}

pub struct FakeGame {
    name: String,
    world: Mutex<FakeWorld>,
    goal_changes: watch::Sender<u64>,
    goto_started: Notify,
}

impl FakeGame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world: Mutex::new(FakeWorld::default()),
            goal_changes: watch::channel(0).0,
            goto_started: Notify::new(),
        }
    }

    pub fn with_position(self, position: Position) -> Self {
        self.world().position = position;
        self
    }

    pub fn with_player(self, name: &str, position: Position) -> Self {
        self.world().players.insert(name.to_string(), position);
        self
    }

    pub fn with_stack(self, name: &str, item_id: u32, count: u32) -> Self {
        {
            let mut world = self.world();
            let mut stacks = world.inventory.stacks().to_vec();
            stacks.push(ItemStack::new(name, item_id, count));
            world.inventory = Inventory::new(stacks);
        }
        self
    }

    pub fn with_block(self, block_id: u32, position: BlockPosition) -> Self {
        self.world().blocks.insert(block_id, position);
        self
    }

    pub fn with_vitals(self, vitals: Vitals) -> Self {
        self.world().vitals = vitals;
        self
    }

    /// Lock the world for inspection or tweaking.
    pub fn world(&self) -> MutexGuard<'_, FakeWorld> {
        match self.world.lock() {
            Ok(world) => world,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Resolves once some `goto` call has started.
    pub async fn goto_started(&self) {
        self.goto_started.notified().await;
    }

    fn replace_goal(&self, goal: Option<MovementGoal>) -> u64 {
        self.world().goal = goal;
        self.goal_changes.send_modify(|generation| *generation += 1);
        *self.goal_changes.borrow()
    }
}

#[async_trait]
impl GameClientPort for FakeGame {
    async fn actor(&self) -> Result<ActorSnapshot, GameError> {
        let world = self.world();
        Ok(ActorSnapshot {
            name: self.name.clone(),
            position: world.position,
            vitals: world.vitals,
            inventory: world.inventory.clone(),
        })
    }

    async fn player_position(&self, name: &str) -> Result<Option<Position>, GameError> {
        Ok(self.world().players.get(name).copied())
    }

    async fn goto(&self, goal: MovementGoal) -> Result<(), GameError> {
        self.world().gotos.push(goal.clone());
        let generation = self.replace_goal(Some(goal.clone()));
        let mut changes = self.goal_changes.subscribe();
        self.goto_started.notify_one();

        let delay = self.world().goto_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let (fail, hold) = {
            let world = self.world();
            (world.fail_goto, world.hold_goto)
        };
        if fail {
            return Err(GameError::rejected("no path to goal"));
        }
        if hold {
            let _ = changes.wait_for(|current| *current != generation).await;
            return Err(GameError::rejected("goal was changed"));
        }

        let mut world = self.world();
        let destination = match goal {
            MovementGoal::Near { position, .. } => position,
            MovementGoal::Block { position } => position.center(),
            MovementGoal::Follow { ref player, .. } => {
                world.players.get(player).copied().unwrap_or(world.position)
            }
        };
        world.position = destination;
        Ok(())
    }

    async fn set_goal(&self, goal: MovementGoal) -> Result<(), GameError> {
        self.world().set_goals.push(goal.clone());
        self.replace_goal(Some(goal));
        Ok(())
    }

    async fn clear_goal(&self) -> Result<(), GameError> {
        self.world().clear_goals += 1;
        self.replace_goal(None);
        Ok(())
    }

    async fn find_nearest_block(
        &self,
        block_id: u32,
        max_distance: u32,
    ) -> Result<Option<BlockPosition>, GameError> {
        let mut world = self.world();
        world.searches.push((block_id, max_distance));
        let origin = world.position;
        Ok(world
            .blocks
            .get(&block_id)
            .copied()
            .filter(|block| block.center().distance_to(&origin) <= f64::from(max_distance)))
    }

    async fn dig(&self, position: BlockPosition) -> Result<(), GameError> {
        let mut world = self.world();
        if world.fail_dig {
            return Err(GameError::rejected("digging aborted"));
        }
        world.dug.push(position);
        world.blocks.retain(|_, block| *block != position);
        Ok(())
    }

    async fn toss(&self, item_id: u32, count: u32) -> Result<(), GameError> {
        let mut world = self.world();
        if world.fail_toss {
            return Err(GameError::rejected("window closed"));
        }
        world.tossed.push((item_id, count));
        world.inventory.remove(item_id, count);
        Ok(())
    }

    async fn chat(&self, message: &str) -> Result<(), GameError> {
        self.world().chats.push(message.to_string());
        Ok(())
    }

    async fn set_vitals(&self, vitals: Vitals) -> Result<(), GameError> {
        let mut world = self.world();
        world.vitals = vitals;
        world.vitals_set.push(vitals);
        Ok(())
    }
}

/// Fixed name tables; `select_version` always succeeds.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    blocks: HashMap<String, u32>,
    items: HashMap<String, u32>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(mut self, name: &str, id: u32) -> Self {
        self.blocks.insert(name.to_string(), id);
        self
    }

    pub fn with_item(mut self, name: &str, id: u32) -> Self {
        self.items.insert(name.to_string(), id);
        self
    }
}

#[async_trait]
impl CatalogPort for StaticCatalog {
    async fn select_version(&self, _version: &str) -> Result<(), CatalogError> {
        Ok(())
    }

    fn block_id(&self, name: &str) -> Option<u32> {
        self.blocks.get(name).copied()
    }

    fn item_id(&self, name: &str) -> Option<u32> {
        self.items.get(name).copied()
    }
}
