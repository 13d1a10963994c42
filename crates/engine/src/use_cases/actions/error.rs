//! Action error taxonomy.

use std::fmt;

use minebot_domain::ItemToken;

use crate::infrastructure::ports::GameError;

/// Which catalog table a name was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Block,
    Item,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CatalogKind::Block => "block",
            CatalogKind::Item => "item",
        })
    }
}

/// Why a multi-step action did not complete.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("Player {0} is not visible")]
    TargetUnresolved(String),

    #[error("Unknown {kind}: {name}")]
    UnknownCatalogEntry { kind: CatalogKind, name: ItemToken },

    #[error("No {0} within search range")]
    NotFound(ItemToken),

    #[error("No {0} in inventory")]
    InsufficientInventory(ItemToken),

    #[error("Navigation failed: {0}")]
    NavigationFailure(#[source] GameError),

    #[error("Action failed: {0}")]
    ActionFailure(#[source] GameError),

    /// The navigation order was replaced by a newer one before it finished.
    #[error("Navigation replaced by a newer order")]
    Interrupted,

    /// A query against the game client failed outside navigation or acting.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl ActionError {
    /// Whether the underlying game error deserves operator attention.
    pub fn is_game_fault(&self) -> bool {
        matches!(
            self,
            ActionError::NavigationFailure(_) | ActionError::ActionFailure(_) | ActionError::Game(_)
        )
    }
}
