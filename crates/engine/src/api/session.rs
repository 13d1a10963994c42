//! Game event loop.
//!
//! Consumes the game client's notifications for the lifetime of the
//! connection. Chat events are handled on their own tasks so a slow command
//! (classifier call, follow resolution, long walk) never holds up the next one.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use minebot_protocol::ServerMessage;

use crate::api::dispatcher::ChatEvent;
use crate::app::App;
use crate::infrastructure::ports::GameEvent;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Game connection ended: {0}")]
    Ended(String),
}

/// Run one chat event through the dispatcher and deliver the reply to the
/// game chat and every observer.
pub async fn respond_to_chat(app: Arc<App>, event: ChatEvent) {
    let Some(reply) = app.dispatcher.handle(&event).await else {
        return;
    };

    if let Err(e) = app.game.chat(&reply).await {
        tracing::warn!(speaker = %event.speaker, error = %e, "Failed to send chat reply");
    }
    app.connections
        .broadcast(ServerMessage::Reply {
            speaker: app.username().to_string(),
            text: reply,
        })
        .await;
}

/// Process game events until the connection ends or `cancel` fires.
///
/// Returns `Ok` only on cancellation; a lost game connection is an error.
pub async fn run_game_events(
    app: Arc<App>,
    mut events: mpsc::Receiver<GameEvent>,
    cancel: CancellationToken,
) -> Result<(), SessionError> {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Game event loop shutting down");
                return Ok(());
            }
            event = events.recv() => event,
        };

        match event {
            Some(GameEvent::Spawn { version }) => {
                tracing::info!(version = %version, username = %app.username(), "Bot has joined the world");
                if let Err(e) = app.catalog.select_version(&version).await {
                    tracing::error!(version = %version, error = %e, "Failed to load catalog for game version");
                }
            }
            Some(GameEvent::VitalsChanged(vitals)) => {
                let app = app.clone();
                tokio::spawn(async move {
                    app.vitals.on_vitals_changed(vitals).await;
                });
            }
            Some(GameEvent::Chat { speaker, text }) => {
                tokio::spawn(respond_to_chat(app.clone(), ChatEvent::new(speaker, text)));
            }
            Some(GameEvent::End { reason }) => {
                let reason = reason.unwrap_or_else(|| "no reason given".to_string());
                tracing::error!(reason = %reason, "Game connection ended");
                return Err(SessionError::Ended(reason));
            }
            None => return Err(SessionError::Ended("event stream closed".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{test_app, FakeGame};
    use minebot_domain::{Position, Vitals};
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn chat_reply_goes_to_game_and_observers() {
        let game = Arc::new(FakeGame::new("Bot").with_player("alex", Position::new(3.0, 64.0, 3.0)));
        let app = test_app(game.clone());
        let (observer_tx, mut observer_rx) = mpsc::channel(8);
        app.connections.register(Uuid::new_v4(), None, observer_tx).await;

        let (tx, rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();
        let session = tokio::spawn(run_game_events(app.clone(), rx, cancel.clone()));

        tx.send(GameEvent::Chat {
            speaker: "alex".into(),
            text: "come here".into(),
        })
        .await
        .unwrap();

        let reply = tokio::time::timeout(Duration::from_secs(1), observer_rx.recv())
            .await
            .unwrap();
        assert_eq!(
            reply,
            Some(ServerMessage::Reply {
                speaker: "Bot".into(),
                text: "Here I am".into(),
            })
        );
        assert_eq!(game.world().chats, vec!["Here I am".to_string()]);

        cancel.cancel();
        assert!(session.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn own_chat_produces_no_reply() {
        let game = Arc::new(FakeGame::new("Bot"));
        let app = test_app(game.clone());

        respond_to_chat(app, ChatEvent::new("Bot", "Here I am")).await;

        assert!(game.world().chats.is_empty());
    }

    #[tokio::test]
    async fn vitals_events_restore_vitals() {
        let game = Arc::new(FakeGame::new("Bot").with_vitals(Vitals::new(12.0, 20)));
        let app = test_app(game.clone());
        let (tx, rx) = mpsc::channel(8);

        tx.send(GameEvent::VitalsChanged(Vitals::new(12.0, 20)))
            .await
            .unwrap();
        tx.send(GameEvent::End { reason: None }).await.unwrap();
        let result = run_game_events(app, rx, CancellationToken::new()).await;
        assert!(matches!(result, Err(SessionError::Ended(_))));

        tokio::time::timeout(Duration::from_secs(1), async {
            while game.world().vitals_set.is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
        assert_eq!(game.world().vitals, Vitals::new(20.0, 20));
    }

    #[tokio::test]
    async fn end_event_stops_with_reason() {
        let app = test_app(Arc::new(FakeGame::new("Bot")));
        let (tx, rx) = mpsc::channel(8);
        tx.send(GameEvent::Spawn {
            version: "1.20.4".into(),
        })
        .await
        .unwrap();
        tx.send(GameEvent::End {
            reason: Some("kicked".into()),
        })
        .await
        .unwrap();

        let result = run_game_events(app, rx, CancellationToken::new()).await;

        assert!(matches!(result, Err(SessionError::Ended(reason)) if reason == "kicked"));
    }

    #[tokio::test]
    async fn closed_stream_is_an_error() {
        let app = test_app(Arc::new(FakeGame::new("Bot")));
        let (tx, rx) = mpsc::channel(1);
        drop(tx);

        let result = run_game_events(app, rx, CancellationToken::new()).await;

        assert!(matches!(result, Err(SessionError::Ended(_))));
    }
}
