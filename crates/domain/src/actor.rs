//! Read-only snapshots of the controlled actor.
//!
//! The game client owns and mutates all of this; the core only ever sees
//! copies taken at a point in time.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum health the vitals guard restores to.
pub const MAX_HEALTH: f32 = 20.0;

/// Maximum stamina (food) the vitals guard restores to.
pub const MAX_STAMINA: u32 = 20;

/// A continuous world position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1}, {:.1})", self.x, self.y, self.z)
    }
}

/// Integer coordinates of a single block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Centre of the block as a continuous position.
    pub fn center(&self) -> Position {
        Position::new(
            f64::from(self.x) + 0.5,
            f64::from(self.y) + 0.5,
            f64::from(self.z) + 0.5,
        )
    }
}

impl fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Health and stamina of the actor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub health: f32,
    pub stamina: u32,
}

impl Vitals {
    pub fn new(health: f32, stamina: u32) -> Self {
        Self { health, stamina }
    }

    /// Raise every below-max stat to its maximum; values already at or above
    /// max are left untouched.
    pub fn restored(self) -> Self {
        Self {
            health: if self.health < MAX_HEALTH {
                MAX_HEALTH
            } else {
                self.health
            },
            stamina: self.stamina.max(MAX_STAMINA),
        }
    }
}

impl Default for Vitals {
    fn default() -> Self {
        Self::new(MAX_HEALTH, MAX_STAMINA)
    }
}

/// One inventory slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub name: String,
    pub item_id: u32,
    pub count: u32,
}

impl ItemStack {
    pub fn new(name: impl Into<String>, item_id: u32, count: u32) -> Self {
        Self {
            name: name.into(),
            item_id,
            count,
        }
    }
}

/// The actor's inventory as a list of stacks.
///
/// The same item may occupy several stacks; quantities are always summed by name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    stacks: Vec<ItemStack>,
}

impl Inventory {
    pub fn new(stacks: Vec<ItemStack>) -> Self {
        Self { stacks }
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    /// Total owned quantity of the named item.
    pub fn count_of(&self, name: &str) -> u32 {
        self.stacks
            .iter()
            .filter(|s| s.name == name)
            .map(|s| s.count)
            .sum()
    }

    /// Item id the client reports for the named item, if any stack holds it.
    pub fn item_id_of(&self, name: &str) -> Option<u32> {
        self.stacks.iter().find(|s| s.name == name).map(|s| s.item_id)
    }

    /// Remove up to `count` units of the item with this id, draining stacks in
    /// order. Returns how many were actually removed.
    pub fn remove(&mut self, item_id: u32, count: u32) -> u32 {
        let mut remaining = count;
        for stack in self.stacks.iter_mut().filter(|s| s.item_id == item_id) {
            let taken = stack.count.min(remaining);
            stack.count -= taken;
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        self.stacks.retain(|s| s.count > 0);
        count - remaining
    }

    /// Per-item totals, sorted by name.
    pub fn totals(&self) -> Vec<(String, u32)> {
        let mut totals: Vec<(String, u32)> = Vec::new();
        for stack in &self.stacks {
            match totals.iter_mut().find(|(name, _)| *name == stack.name) {
                Some((_, total)) => *total += stack.count,
                None => totals.push((stack.name.clone(), stack.count)),
            }
        }
        totals.sort_by(|a, b| a.0.cmp(&b.0));
        totals
    }
}

/// Point-in-time view of the controlled actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSnapshot {
    pub name: String,
    pub position: Position,
    pub vitals: Vitals,
    pub inventory: Inventory,
}
