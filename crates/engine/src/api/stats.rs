//! Actor stats snapshots for observers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use minebot_domain::{ActorSnapshot, Position};
use minebot_protocol::{ActorStatsData, InventoryEntryData, PositionData, ServerMessage};

use crate::app::App;
use crate::infrastructure::ports::GameError;

/// Latest stats snapshot, served to new observers and over HTTP.
#[derive(Default)]
pub struct StatsStore {
    latest: RwLock<Option<ActorStatsData>>,
}

impl StatsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn latest(&self) -> Option<ActorStatsData> {
        self.latest.read().await.clone()
    }

    pub async fn update(&self, stats: ActorStatsData) {
        *self.latest.write().await = Some(stats);
    }
}

pub fn to_stats_data(
    snapshot: ActorSnapshot,
    following: Option<String>,
    captured_at: DateTime<Utc>,
) -> ActorStatsData {
    ActorStatsData {
        position: to_position_data(snapshot.position),
        health: snapshot.vitals.health,
        stamina: snapshot.vitals.stamina,
        following,
        inventory: snapshot
            .inventory
            .totals()
            .into_iter()
            .map(|(name, count)| InventoryEntryData { name, count })
            .collect(),
        name: snapshot.name,
        captured_at,
    }
}

fn to_position_data(position: Position) -> PositionData {
    PositionData {
        x: position.x,
        y: position.y,
        z: position.z,
    }
}

/// Read the actor and goal state into a fresh snapshot and store it.
pub async fn capture_stats(app: &App) -> Result<ActorStatsData, GameError> {
    let snapshot = app.game.actor().await?;
    let following = app.goals.state().following().map(str::to_string);
    let stats = to_stats_data(snapshot, following, app.clock.now());
    app.stats.update(stats.clone()).await;
    Ok(stats)
}

/// Push a stats snapshot to every observer each `interval` until cancelled.
pub async fn run_stats_broadcaster(app: Arc<App>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "Starting stats broadcaster");
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Stats broadcaster shutting down");
                break;
            }
            _ = ticker.tick() => {}
        }

        match capture_stats(&app).await {
            Ok(stats) => app.connections.broadcast(ServerMessage::Stats { stats }).await,
            Err(e) => tracing::debug!(error = %e, "Failed to capture actor stats"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{test_app, test_now, FakeGame};
    use minebot_domain::{Inventory, ItemStack, Vitals};
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[test]
    fn snapshot_sums_inventory_by_name() {
        let snapshot = ActorSnapshot {
            name: "Bot".into(),
            position: Position::new(1.0, 64.0, -2.5),
            vitals: Vitals::new(18.5, 7),
            inventory: Inventory::new(vec![
                ItemStack::new("stone", 1, 64),
                ItemStack::new("dirt", 3, 5),
                ItemStack::new("stone", 1, 10),
            ]),
        };

        let stats = to_stats_data(snapshot, Some("alex".into()), test_now());

        assert_eq!(stats.name, "Bot");
        assert_eq!(stats.position, PositionData { x: 1.0, y: 64.0, z: -2.5 });
        assert_eq!(stats.health, 18.5);
        assert_eq!(stats.stamina, 7);
        assert_eq!(stats.following.as_deref(), Some("alex"));
        assert_eq!(
            stats.inventory,
            vec![
                InventoryEntryData { name: "dirt".into(), count: 5 },
                InventoryEntryData { name: "stone".into(), count: 74 },
            ]
        );
        assert_eq!(stats.captured_at, test_now());
    }

    #[tokio::test]
    async fn capture_updates_latest() {
        let app = test_app(Arc::new(FakeGame::new("Bot").with_stack("diamond", 802, 2)));
        assert!(app.stats.latest().await.is_none());

        let stats = capture_stats(&app).await.unwrap();

        assert_eq!(app.stats.latest().await, Some(stats.clone()));
        assert_eq!(stats.following, None);
        assert_eq!(stats.inventory.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn broadcaster_pushes_until_cancelled() {
        let app = test_app(Arc::new(FakeGame::new("Bot")));
        let (tx, mut rx) = mpsc::channel(8);
        app.connections.register(Uuid::new_v4(), None, tx).await;
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_stats_broadcaster(
            app.clone(),
            Duration::from_millis(1000),
            cancel.clone(),
        ));

        for _ in 0..2 {
            match rx.recv().await {
                Some(ServerMessage::Stats { stats }) => assert_eq!(stats.name, "Bot"),
                other => panic!("expected stats, got {other:?}"),
            }
        }

        cancel.cancel();
        task.await.unwrap();
    }
}
