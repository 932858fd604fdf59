//! # Tactics Core
//!
//! Deterministic simulation core for a turn-based tactics game played on a
//! grid of tiles (hex, square, or isometric topology).
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (unit definitions are embedded or supplied as strings)
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Headless rules testing
//! - Identical behavior across platforms
//! - Swappable presentation layers
//!
//! ## Crate Structure
//!
//! - [`grid`] - Grid map and the three tile topologies
//! - [`tile`] - Individual tile state (elevation, ramps, occupancy)
//! - [`unit`] - Unit combat/movement state and the unit arena
//! - [`pathfinding`] - Reachability, A* search, and range queries
//! - [`gameplay`] - The selection/planning/execution state machine
//! - [`data`] - Data-driven unit definitions
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod data;
pub mod error;
pub mod gameplay;
pub mod grid;
pub mod interaction;
pub mod math;
pub mod pathfinding;
pub mod tile;
pub mod unit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{UnitData, UnitRegistry};
    pub use crate::error::{GameError, Result};
    pub use crate::gameplay::{GameplayConfig, GameplayManager};
    pub use crate::grid::{GridMap, HexOrientation, Topology};
    pub use crate::interaction::InteractionState;
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::tile::{ResourceKind, Tile, TileCoord};
    pub use crate::unit::{Team, Unit, UnitArena, UnitId};
}
