//! API layer - chat dispatch, game event loop, HTTP and WebSocket entry points.

pub mod connections;
pub mod dispatcher;
pub mod http;
pub mod session;
pub mod stats;
pub mod websocket;

pub use connections::ConnectionManager;
pub use dispatcher::{ChatEvent, SessionDispatcher};
pub use session::{run_game_events, SessionError};
pub use stats::{run_stats_broadcaster, StatsStore};
