//! Individual tile state: elevation, ramps, occupancy, resources.
//!
//! A tile's identity (grid coordinates) and generated world position are
//! fixed at map construction. Elevation and ramps are mutated by the map
//! editing collaborator; occupancy is mutated by the gameplay manager.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::math::Vec2Fixed;
use crate::unit::UnitId;

/// Integer grid coordinates identifying a tile within its map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Pack into a single value for deterministic frontier tie-breaking.
    #[must_use]
    pub const fn tie_breaker(self) -> u64 {
        ((self.y as u64) << 32) | (self.x as u64)
    }
}

/// Resource marker on a tile.
///
/// Informational only to this core; the economy layer interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Iron deposit.
    Iron,
    /// Fissium deposit.
    Fissium,
}

/// A single grid cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    coord: TileCoord,
    position: Vec2Fixed,
    elevation: u32,
    ramps: HashSet<u8>,
    occupant: Option<UnitId>,
    resource: Option<ResourceKind>,
}

impl Tile {
    /// Create a tile at the given coordinates and generated world position.
    #[must_use]
    pub fn new(coord: TileCoord, position: Vec2Fixed) -> Self {
        Self {
            coord,
            position,
            elevation: 0,
            ramps: HashSet::new(),
            occupant: None,
            resource: None,
        }
    }

    /// Grid coordinates of this tile.
    #[must_use]
    pub const fn coord(&self) -> TileCoord {
        self.coord
    }

    /// Generated world position (topology-specific formula).
    #[must_use]
    pub const fn position(&self) -> Vec2Fixed {
        self.position
    }

    /// Current elevation level.
    #[must_use]
    pub const fn elevation(&self) -> u32 {
        self.elevation
    }

    /// Set the elevation level.
    pub fn set_elevation(&mut self, elevation: u32) {
        self.elevation = elevation;
    }

    /// Edge indices carrying a ramp on this tile.
    ///
    /// By the bidirectionality invariant, a ramp on edge `e` always has a
    /// mirrored ramp on the neighbor's opposite edge. Mutation goes through
    /// [`GridMap::add_ramp`](crate::grid::GridMap::add_ramp) so both sides
    /// stay in sync.
    #[must_use]
    pub const fn ramps(&self) -> &HashSet<u8> {
        &self.ramps
    }

    /// Check whether this tile has a ramp on the given edge.
    #[must_use]
    pub fn has_ramp(&self, edge: u8) -> bool {
        self.ramps.contains(&edge)
    }

    pub(crate) fn insert_ramp(&mut self, edge: u8) {
        self.ramps.insert(edge);
    }

    pub(crate) fn remove_ramp(&mut self, edge: u8) -> bool {
        self.ramps.remove(&edge)
    }

    /// Handle of the unit standing on this tile, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<UnitId> {
        self.occupant
    }

    /// Check whether a unit stands on this tile.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Set or clear the occupying unit handle.
    pub fn set_occupant(&mut self, occupant: Option<UnitId>) {
        self.occupant = occupant;
    }

    /// Resource marker, if any.
    #[must_use]
    pub const fn resource(&self) -> Option<ResourceKind> {
        self.resource
    }

    /// Set or clear the resource marker.
    pub fn set_resource(&mut self, resource: Option<ResourceKind>) {
        self.resource = resource;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_starts_empty() {
        let tile = Tile::new(TileCoord::new(3, 4), Vec2Fixed::ZERO);
        assert_eq!(tile.coord(), TileCoord::new(3, 4));
        assert_eq!(tile.elevation(), 0);
        assert!(tile.ramps().is_empty());
        assert!(!tile.is_occupied());
        assert!(tile.resource().is_none());
    }

    #[test]
    fn test_tie_breaker_orders_row_major() {
        let a = TileCoord::new(5, 0);
        let b = TileCoord::new(0, 1);
        assert!(a.tie_breaker() < b.tie_breaker());
    }

    #[test]
    fn test_occupant_roundtrip() {
        let mut tile = Tile::new(TileCoord::new(0, 0), Vec2Fixed::ZERO);
        tile.set_occupant(Some(7));
        assert!(tile.is_occupied());
        assert_eq!(tile.occupant(), Some(7));
        tile.set_occupant(None);
        assert!(!tile.is_occupied());
    }
}
