//! Error types for the game simulation.

use thiserror::Error;

use crate::tile::TileCoord;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
///
/// Terrain mutations (`add_ramp`/`remove_ramp`) report failure via `bool`
/// returns and never produce a [`GameError`]; gameplay clicks that match no
/// valid transition are absorbed by the state machine as no-ops.
#[derive(Debug, Error)]
pub enum GameError {
    /// Unit type name not present in the definition table.
    ///
    /// This is a content/configuration bug: fix the data, don't handle it.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(String),

    /// Data file parsing error.
    #[error("Failed to parse unit data '{path}': {message}")]
    DataParseError {
        /// Identifier of the data source that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Attempted to place a unit on a tile that already holds one.
    #[error("Tile ({},{}) is already occupied", .0.x, .0.y)]
    TileOccupied(TileCoord),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
