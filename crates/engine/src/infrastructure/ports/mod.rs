//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - The game client (could swap the WebSocket sidecar for an in-process client)
//! - The block/item catalog (could swap minecraft-data files for a live registry)
//! - LLM calls (any OpenAI-compatible endpoint)
//! - Clock (for testing)

mod error;
mod external;
mod game;
mod testing;

// =============================================================================
// Game Ports
// =============================================================================
pub use game::{CatalogPort, GameClientPort, GameEvent};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole, TokenUsage,
};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::MockLlmPort;
#[cfg(test)]
pub use game::{MockCatalogPort, MockGameClientPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::{CatalogError, GameError, LlmError};
