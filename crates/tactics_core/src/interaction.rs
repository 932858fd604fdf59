//! Per-frame snapshot of the interaction state machine.
//!
//! The rendering collaborator pulls one of these each frame via
//! [`GameplayManager::update`](crate::gameplay::GameplayManager::update)
//! instead of reaching into the manager's internals. All fields are plain
//! data; the snapshot holds no handles into the map or arena.

use std::collections::{HashMap, HashSet};

use crate::math::Fixed;
use crate::tile::TileCoord;

/// Everything a renderer needs to draw the current interaction state.
#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    /// Tile of the currently selected unit, if any.
    pub selected_tile: Option<TileCoord>,

    /// Tiles the selected unit can end a move on, with minimum cost.
    pub reachable: HashMap<TileCoord, u32>,

    /// Tiles attackable from the selected unit's current position.
    pub attackable: HashSet<TileCoord>,

    /// Combined planned path for visualization, legs concatenated with the
    /// duplicate junction tile of each subsequent leg dropped.
    pub planned_path: Vec<TileCoord>,

    /// Each plan leg's own sub-path, in commit order.
    pub plan_steps: Vec<Vec<TileCoord>>,

    /// Movement points left in the shared plan pool, when a plan exists.
    pub plan_movement_remaining: Option<u32>,

    /// Reachable set relative to the plan's current endpoint.
    pub plan_reachable: HashMap<TileCoord, u32>,

    /// Attackable set relative to the plan's current endpoint.
    pub plan_attackable: HashSet<TileCoord>,

    /// Whether an attack animation window is open (input is ignored).
    pub is_animating: bool,

    /// Seconds left on the animation window; zero when not animating.
    pub animation_remaining_secs: Fixed,

    /// Attacker's tile for the animation in progress.
    pub animation_source: Option<TileCoord>,

    /// Target's tile for the animation in progress.
    pub animation_target: Option<TileCoord>,
}

impl InteractionState {
    /// Reset every field to its empty state.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
