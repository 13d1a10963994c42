//! Application state and composition.

use std::sync::Arc;

use crate::api::connections::ConnectionManager;
use crate::api::dispatcher::SessionDispatcher;
use crate::api::stats::StatsStore;
use crate::infrastructure::ports::{CatalogPort, ClockPort, GameClientPort};
use crate::use_cases::{ActionExecutor, CommandNormalizer, GoalController, VitalsGuard};

/// Main application state.
///
/// Owns the ports, the use cases built on them and the observer relay state.
/// Passed to HTTP/WebSocket handlers via Axum state.
pub struct App {
    pub game: Arc<dyn GameClientPort>,
    pub catalog: Arc<dyn CatalogPort>,
    pub clock: Arc<dyn ClockPort>,
    pub goals: Arc<GoalController>,
    pub dispatcher: SessionDispatcher,
    pub vitals: VitalsGuard,
    pub connections: Arc<ConnectionManager>,
    pub stats: StatsStore,
    /// Speaker name for text relayed from observers.
    pub relay_speaker: String,
}

/// External collaborators the application is built on.
pub struct AppPorts {
    pub game: Arc<dyn GameClientPort>,
    pub catalog: Arc<dyn CatalogPort>,
    pub clock: Arc<dyn ClockPort>,
}

impl App {
    pub fn new(
        username: impl Into<String>,
        relay_speaker: impl Into<String>,
        normalizer: CommandNormalizer,
        ports: AppPorts,
    ) -> Self {
        let AppPorts {
            game,
            catalog,
            clock,
        } = ports;

        let goals = Arc::new(GoalController::new(game.clone()));
        let executor = ActionExecutor::new(game.clone(), catalog.clone(), goals.clone());
        let dispatcher = SessionDispatcher::new(username, normalizer, goals.clone(), executor);

        Self {
            vitals: VitalsGuard::new(game.clone()),
            game,
            catalog,
            clock,
            goals,
            dispatcher,
            connections: Arc::new(ConnectionManager::new()),
            stats: StatsStore::new(),
            relay_speaker: relay_speaker.into(),
        }
    }

    /// Name the actor plays under.
    pub fn username(&self) -> &str {
        self.dispatcher.username()
    }
}
