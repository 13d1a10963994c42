//! Minebot Engine library.
//!
//! Turns chat from a game world into movement, mining and item delivery
//! for one bot-controlled actor.
//!
//! ## Structure
//!
//! - `use_cases/` - Command normalization, action execution, goal control, vitals
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - Chat dispatch, game event loop, HTTP and WebSocket entry points
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

/// In-memory game and catalog fakes for tests.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
