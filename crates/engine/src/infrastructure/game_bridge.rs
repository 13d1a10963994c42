//! Game client adapter over a WebSocket bridge.
//!
//! A sidecar process owns the game protocol connection, pathfinding and world
//! search. This adapter turns [`GameClientPort`] calls into correlated
//! [`BridgeRequest`]s and forwards the sidecar's unsolicited events as
//! [`GameEvent`]s.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uuid::Uuid;

use minebot_domain::{
    ActorSnapshot, BlockPosition, Inventory, ItemStack, MovementGoal, Position, Vitals,
};
use minebot_protocol::{
    ActorData, BlockPositionData, BridgeEvent, BridgeMessage, BridgeOp, BridgeRequest, GoalData,
    PositionData,
};

use crate::infrastructure::ports::{GameClientPort, GameError, GameEvent};

/// Timeout for every request except `goto`, which waits for arrival.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Buffer size for outbound requests and inbound events.
const CHANNEL_BUFFER: usize = 64;

type PendingResult = Result<serde_json::Value, GameError>;

/// Errors establishing the bridge connection.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Failed to connect to game bridge at {url}: {message}")]
    Connect { url: String, message: String },
}

/// In-flight requests awaiting a response, keyed by correlation id.
#[derive(Default)]
struct PendingRequests {
    inner: HashMap<String, oneshot::Sender<PendingResult>>,
}

impl PendingRequests {
    fn insert(&mut self, id: String, tx: oneshot::Sender<PendingResult>) {
        self.inner.insert(id, tx);
    }

    /// Returns false if no request is waiting on `id` (e.g. it already timed out).
    fn resolve(&mut self, id: &str, result: PendingResult) -> bool {
        match self.inner.remove(id) {
            Some(tx) => {
                let _ = tx.send(result);
                true
            }
            None => {
                tracing::debug!(
                    request_id = %id,
                    "Response received for unknown request ID - request may have timed out"
                );
                false
            }
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        self.inner.remove(id).is_some()
    }

    fn fail_all(&mut self, error: GameError) -> usize {
        let count = self.inner.len();
        for (_, tx) in self.inner.drain() {
            let _ = tx.send(Err(error.clone()));
        }
        count
    }
}

/// [`GameClientPort`] backed by the sidecar bridge.
pub struct GameBridge {
    tx: mpsc::Sender<BridgeRequest>,
    pending: Arc<Mutex<PendingRequests>>,
    request_timeout: Duration,
}

impl GameBridge {
    /// Connect to the sidecar. Returns the port and the event stream; the
    /// stream ends with a [`GameEvent::End`] when the socket closes.
    pub async fn connect(
        url: &str,
        request_timeout: Duration,
    ) -> Result<(Self, mpsc::Receiver<GameEvent>), BridgeError> {
        let (ws_stream, _) = connect_async(url).await.map_err(|e| BridgeError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        tracing::info!(url = %url, "Connected to game bridge");

        let (mut write, mut read) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<BridgeRequest>(CHANNEL_BUFFER);
        let (event_tx, event_rx) = mpsc::channel::<GameEvent>(CHANNEL_BUFFER);
        let pending = Arc::new(Mutex::new(PendingRequests::default()));

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let json = match serde_json::to_string(&request) {
                    Ok(j) => j,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to serialize bridge request");
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::Text(json)).await {
                    tracing::error!(error = %e, "Failed to send bridge request");
                    break;
                }
            }
        });

        let pending_for_reader = Arc::clone(&pending);
        tokio::spawn(async move {
            let mut end_reason = Some("bridge closed".to_string());
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(Message::Text(text)) => match serde_json::from_str::<BridgeMessage>(&text) {
                        Ok(BridgeMessage::Response { id, result, error }) => {
                            let outcome = match error {
                                Some(message) => Err(GameError::Rejected(message)),
                                None => Ok(result),
                            };
                            pending_for_reader.lock().await.resolve(&id, outcome);
                        }
                        Ok(BridgeMessage::Event(event)) => {
                            let event = to_game_event(event);
                            let is_end = matches!(event, GameEvent::End { .. });
                            if event_tx.send(event).await.is_err() {
                                tracing::debug!("Game event receiver dropped");
                            }
                            if is_end {
                                end_reason = None;
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to parse bridge message");
                        }
                    },
                    Ok(Message::Close(_)) => {
                        tracing::info!("Game bridge closed connection");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Game bridge WebSocket error");
                        end_reason = Some(e.to_string());
                        break;
                    }
                    _ => {}
                }
            }

            let failed = pending_for_reader
                .lock()
                .await
                .fail_all(GameError::Disconnected);
            if failed > 0 {
                tracing::warn!(count = failed, "Failed in-flight bridge requests on disconnect");
            }
            if let Some(reason) = end_reason {
                let _ = event_tx.send(GameEvent::End { reason: Some(reason) }).await;
            }
        });

        Ok((
            Self {
                tx,
                pending,
                request_timeout,
            },
            event_rx,
        ))
    }

    async fn request(&self, op: BridgeOp) -> Result<serde_json::Value, GameError> {
        let id = Uuid::new_v4().to_string();
        let op_name = op.name();
        let waits_for_arrival = matches!(op, BridgeOp::Goto { .. });

        let (result_tx, result_rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), result_tx);

        if self
            .tx
            .send(BridgeRequest {
                id: id.clone(),
                op,
            })
            .await
            .is_err()
        {
            self.pending.lock().await.remove(&id);
            return Err(GameError::Disconnected);
        }

        tracing::trace!(request_id = %id, op = op_name, "Bridge request sent");

        let received = if waits_for_arrival {
            result_rx.await
        } else {
            match tokio::time::timeout(self.request_timeout, result_rx).await {
                Ok(received) => received,
                Err(_) => {
                    self.pending.lock().await.remove(&id);
                    return Err(GameError::Timeout(op_name));
                }
            }
        };

        received.map_err(|_| GameError::Disconnected)?
    }

    async fn request_as<T: DeserializeOwned>(&self, op: BridgeOp) -> Result<T, GameError> {
        let value = self.request(op).await?;
        serde_json::from_value(value).map_err(GameError::protocol)
    }
}

#[async_trait]
impl GameClientPort for GameBridge {
    async fn actor(&self) -> Result<ActorSnapshot, GameError> {
        let data: ActorData = self.request_as(BridgeOp::Actor).await?;
        Ok(to_actor_snapshot(data))
    }

    async fn player_position(&self, name: &str) -> Result<Option<Position>, GameError> {
        let position: Option<PositionData> = self
            .request_as(BridgeOp::PlayerPosition {
                name: name.to_string(),
            })
            .await?;
        Ok(position.map(to_position))
    }

    async fn goto(&self, goal: MovementGoal) -> Result<(), GameError> {
        self.request(BridgeOp::Goto {
            goal: to_goal_data(goal),
        })
        .await
        .map(|_| ())
    }

    async fn set_goal(&self, goal: MovementGoal) -> Result<(), GameError> {
        self.request(BridgeOp::SetGoal {
            goal: to_goal_data(goal),
        })
        .await
        .map(|_| ())
    }

    async fn clear_goal(&self) -> Result<(), GameError> {
        self.request(BridgeOp::ClearGoal).await.map(|_| ())
    }

    async fn find_nearest_block(
        &self,
        block_id: u32,
        max_distance: u32,
    ) -> Result<Option<BlockPosition>, GameError> {
        let found: Option<BlockPositionData> = self
            .request_as(BridgeOp::FindBlock {
                block_id,
                max_distance,
            })
            .await?;
        Ok(found.map(|p| BlockPosition::new(p.x, p.y, p.z)))
    }

    async fn dig(&self, position: BlockPosition) -> Result<(), GameError> {
        self.request(BridgeOp::Dig {
            position: to_block_data(position),
        })
        .await
        .map(|_| ())
    }

    async fn toss(&self, item_id: u32, count: u32) -> Result<(), GameError> {
        self.request(BridgeOp::Toss { item_id, count })
            .await
            .map(|_| ())
    }

    async fn chat(&self, message: &str) -> Result<(), GameError> {
        self.request(BridgeOp::Chat {
            message: message.to_string(),
        })
        .await
        .map(|_| ())
    }

    async fn set_vitals(&self, vitals: Vitals) -> Result<(), GameError> {
        self.request(BridgeOp::SetVitals {
            health: vitals.health,
            stamina: vitals.stamina,
        })
        .await
        .map(|_| ())
    }
}

// =============================================================================
// Wire <-> domain conversions
// =============================================================================

fn to_game_event(event: BridgeEvent) -> GameEvent {
    match event {
        BridgeEvent::Spawn { version } => GameEvent::Spawn { version },
        BridgeEvent::Vitals { health, stamina } => {
            GameEvent::VitalsChanged(Vitals::new(health, stamina))
        }
        BridgeEvent::Chat { speaker, text } => GameEvent::Chat { speaker, text },
        BridgeEvent::End { reason } => GameEvent::End { reason },
    }
}

fn to_actor_snapshot(data: ActorData) -> ActorSnapshot {
    ActorSnapshot {
        name: data.name,
        position: to_position(data.position),
        vitals: Vitals::new(data.health, data.stamina),
        inventory: Inventory::new(
            data.inventory
                .into_iter()
                .map(|s| ItemStack::new(s.name, s.item_id, s.count))
                .collect(),
        ),
    }
}

fn to_position(data: PositionData) -> Position {
    Position::new(data.x, data.y, data.z)
}

fn to_position_data(position: Position) -> PositionData {
    PositionData {
        x: position.x,
        y: position.y,
        z: position.z,
    }
}

fn to_block_data(position: BlockPosition) -> BlockPositionData {
    BlockPositionData {
        x: position.x,
        y: position.y,
        z: position.z,
    }
}

fn to_goal_data(goal: MovementGoal) -> GoalData {
    match goal {
        MovementGoal::Near { position, range } => GoalData::Near {
            position: to_position_data(position),
            range,
        },
        MovementGoal::Block { position } => GoalData::Block {
            position: to_block_data(position),
        },
        MovementGoal::Follow { player, range } => GoalData::Follow { player, range },
    }
}
