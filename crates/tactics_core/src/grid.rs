//! Grid map and the three tile topologies.
//!
//! One [`GridMap`] type serves hex, square, and isometric boards through a
//! [`Topology`] variant: the topology decides edge count, neighbor offsets,
//! opposite-edge mapping, and the position-generation formula; everything
//! else (tile storage, ramps, bounds checks, nearest-tile scan) is shared.
//!
//! # Edge indexing
//!
//! Edge indices are stable per topology and chosen so that the opposite edge
//! is always `(e + edge_count/2) % edge_count`:
//!
//! - Hex flat-top: 0=SE, 1=S, 2=SW, 3=NW, 4=N, 5=NE (column parity shifts
//!   the diagonal offsets)
//! - Hex pointy-top: 0=E, 1=SE, 2=SW, 3=W, 4=NW, 5=NE (row parity shifts
//!   the diagonal offsets)
//! - Square: 0=N, 1=E, 2=S, 3=W
//! - Isometric: 0=NE, 1=SE, 2=SW, 3=NW

use serde::{Deserialize, Serialize};

use crate::math::{fixed_sqrt, Fixed, Vec2Fixed};
use crate::tile::{Tile, TileCoord};

/// Hexagon orientation: which way the flat side faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum HexOrientation {
    /// Flat side up; columns shift vertically by parity.
    #[default]
    Flat,
    /// Point up; rows shift horizontally by parity.
    Pointy,
}

/// Per-topology parameters. Immutable for the map's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topology {
    /// Hexagonal tiles.
    Hex {
        /// Circumradius of each hexagon.
        #[serde(with = "crate::math::fixed_serde")]
        radius: Fixed,
        /// Vertical squash factor applied to tile heights (perspective).
        #[serde(with = "crate::math::fixed_serde")]
        vertical_scale: Fixed,
        /// Flat-top or pointy-top layout.
        orientation: HexOrientation,
    },
    /// Axis-aligned square tiles.
    Square {
        /// Tile width in world units.
        #[serde(with = "crate::math::fixed_serde")]
        tile_width: Fixed,
        /// Tile height in world units.
        #[serde(with = "crate::math::fixed_serde")]
        tile_height: Fixed,
    },
    /// Diamond-projected isometric tiles.
    Isometric {
        /// Tile width in world units.
        #[serde(with = "crate::math::fixed_serde")]
        tile_width: Fixed,
        /// Tile height in world units.
        #[serde(with = "crate::math::fixed_serde")]
        tile_height: Fixed,
    },
}

/// Flat-top hex neighbor offsets: `[edge][column parity] = (dx, dy)`.
const HEX_FLAT_OFFSETS: [[(i32, i32); 2]; 6] = [
    [(1, 0), (1, 1)],    // 0 SE
    [(0, 1), (0, 1)],    // 1 S
    [(-1, 0), (-1, 1)],  // 2 SW
    [(-1, -1), (-1, 0)], // 3 NW
    [(0, -1), (0, -1)],  // 4 N
    [(1, -1), (1, 0)],   // 5 NE
];

/// Pointy-top hex neighbor offsets: `[edge][row parity] = (dx, dy)`.
const HEX_POINTY_OFFSETS: [[(i32, i32); 2]; 6] = [
    [(1, 0), (1, 0)],    // 0 E
    [(0, 1), (1, 1)],    // 1 SE
    [(-1, 1), (0, 1)],   // 2 SW
    [(-1, 0), (-1, 0)],  // 3 W
    [(-1, -1), (0, -1)], // 4 NW
    [(0, -1), (1, -1)],  // 5 NE
];

/// Square grid neighbor offsets: N, E, S, W.
const SQUARE_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Isometric neighbor offsets: NE, SE, SW, NW (cardinal in grid space).
const ISO_OFFSETS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

impl Topology {
    /// Number of edges per tile for this topology.
    #[must_use]
    pub const fn edge_count(&self) -> u8 {
        match self {
            Self::Hex { .. } => 6,
            Self::Square { .. } | Self::Isometric { .. } => 4,
        }
    }

    /// The edge on a neighbor that faces back across edge `edge`.
    ///
    /// A fixed involution: applying it twice returns the original edge.
    #[must_use]
    pub const fn opposite_edge(&self, edge: u8) -> u8 {
        match self {
            Self::Hex { .. } => (edge + 3) % 6,
            Self::Square { .. } | Self::Isometric { .. } => (edge + 2) % 4,
        }
    }

    /// Grid-coordinate offset across `edge` from a tile at `coord`.
    ///
    /// Returns `None` for an out-of-range edge index.
    #[must_use]
    pub fn neighbor_offset(&self, coord: TileCoord, edge: u8) -> Option<(i32, i32)> {
        let edge = edge as usize;
        match self {
            Self::Hex { orientation, .. } => {
                if edge >= 6 {
                    return None;
                }
                match orientation {
                    HexOrientation::Flat => {
                        let parity = (coord.x % 2) as usize;
                        Some(HEX_FLAT_OFFSETS[edge][parity])
                    }
                    HexOrientation::Pointy => {
                        let parity = (coord.y % 2) as usize;
                        Some(HEX_POINTY_OFFSETS[edge][parity])
                    }
                }
            }
            Self::Square { .. } => SQUARE_OFFSETS.get(edge).copied(),
            Self::Isometric { .. } => ISO_OFFSETS.get(edge).copied(),
        }
    }

    /// Width of a single tile's bounding box.
    #[must_use]
    pub fn tile_width(&self) -> Fixed {
        match *self {
            Self::Hex {
                radius,
                orientation,
                ..
            } => match orientation {
                HexOrientation::Flat => Fixed::from_num(2) * radius,
                HexOrientation::Pointy => sqrt3() * radius,
            },
            Self::Square { tile_width, .. } | Self::Isometric { tile_width, .. } => tile_width,
        }
    }

    /// Height of a single tile's bounding box (after vertical scaling).
    #[must_use]
    pub fn tile_height(&self) -> Fixed {
        match *self {
            Self::Hex {
                radius,
                vertical_scale,
                orientation,
            } => match orientation {
                HexOrientation::Flat => vertical_scale * sqrt3() * radius,
                HexOrientation::Pointy => Fixed::from_num(2) * radius * vertical_scale,
            },
            Self::Square { tile_height, .. } | Self::Isometric { tile_height, .. } => tile_height,
        }
    }

    /// Characteristic tile size used by the A* heuristic.
    ///
    /// The largest tile dimension: distance divided by this underestimates
    /// the hop count, keeping the heuristic admissible at unit edge cost.
    #[must_use]
    pub fn tile_size(&self) -> Fixed {
        self.tile_width().max(self.tile_height())
    }

    /// Vertical scaling factor applied before nearest-tile distance checks.
    ///
    /// Hex boards are squashed by `vertical_scale`, isometric boards by the
    /// tile aspect ratio; the scan unsquashes Y so distances are measured in
    /// the tiles' own geometry.
    fn nearest_y_scale(&self) -> Fixed {
        match *self {
            Self::Hex { vertical_scale, .. } => {
                if vertical_scale > Fixed::ZERO {
                    Fixed::ONE / vertical_scale
                } else {
                    Fixed::ONE
                }
            }
            Self::Square { .. } => Fixed::ONE,
            Self::Isometric {
                tile_width,
                tile_height,
            } => {
                if tile_height > Fixed::ZERO {
                    tile_width / tile_height
                } else {
                    Fixed::ONE
                }
            }
        }
    }

    /// Horizontal/vertical spacing between adjacent tile centers.
    fn spacing(&self) -> (Fixed, Fixed) {
        match *self {
            Self::Hex { orientation, .. } => {
                let (w, h) = (self.tile_width(), self.tile_height());
                let three_quarters = Fixed::from_num(3) / Fixed::from_num(4);
                match orientation {
                    HexOrientation::Flat => (three_quarters * w, h),
                    HexOrientation::Pointy => (w, three_quarters * h),
                }
            }
            Self::Square {
                tile_width,
                tile_height,
            }
            | Self::Isometric {
                tile_width,
                tile_height,
            } => (tile_width, tile_height),
        }
    }

    /// Generated world position for the tile at `coord`.
    fn position(&self, coord: TileCoord, cols: u32) -> Vec2Fixed {
        let (hs, vs) = self.spacing();
        let x = Fixed::from_num(coord.x);
        let y = Fixed::from_num(coord.y);
        let half = Fixed::from_num(2);

        match self {
            Self::Hex { orientation, .. } => {
                let mut pos = Vec2Fixed::new(x * hs, y * vs);
                match orientation {
                    HexOrientation::Flat => {
                        if coord.x % 2 == 1 {
                            pos.y += vs / half;
                        }
                    }
                    HexOrientation::Pointy => {
                        if coord.y % 2 == 1 {
                            pos.x += hs / half;
                        }
                    }
                }
                pos
            }
            Self::Square { .. } => Vec2Fixed::new(x * hs, y * vs),
            Self::Isometric {
                tile_width,
                tile_height,
            } => {
                let half_w = *tile_width / half;
                let half_h = *tile_height / half;
                Vec2Fixed::new(
                    Fixed::from_num(cols) * half_w + (x - y) * half_w,
                    half_h + (x + y) * half_h,
                )
            }
        }
    }
}

/// `sqrt(3)` in fixed-point, used by the hex geometry formulas.
fn sqrt3() -> Fixed {
    fixed_sqrt(Fixed::from_num(3))
}

/// World-space extents of a generated map, for camera/viewport collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Left edge.
    #[serde(with = "crate::math::fixed_serde")]
    pub x: Fixed,
    /// Top edge.
    #[serde(with = "crate::math::fixed_serde")]
    pub y: Fixed,
    /// Total width.
    #[serde(with = "crate::math::fixed_serde")]
    pub width: Fixed,
    /// Total height.
    #[serde(with = "crate::math::fixed_serde")]
    pub height: Fixed,
}

impl WorldBounds {
    /// Right edge.
    #[must_use]
    pub fn x2(&self) -> Fixed {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn y2(&self) -> Fixed {
        self.y + self.height
    }

    /// Geometric center.
    #[must_use]
    pub fn center(&self) -> Vec2Fixed {
        let two = Fixed::from_num(2);
        Vec2Fixed::new(self.x + self.width / two, self.y + self.height / two)
    }
}

/// A fully generated tile grid of one topology.
///
/// Constructed once from column/row/topology parameters; the tile array is
/// fixed-size for the map's lifetime. Tiles themselves stay mutable
/// (elevation, ramps, occupancy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridMap {
    cols: u32,
    rows: u32,
    topology: Topology,
    /// Tiles in row-major order.
    tiles: Vec<Tile>,
}

impl GridMap {
    /// Generate a new map with all tiles at elevation 0.
    ///
    /// # Panics
    ///
    /// Panics if `cols` or `rows` is zero.
    #[must_use]
    pub fn new(cols: u32, rows: u32, topology: Topology) -> Self {
        assert!(cols > 0, "GridMap cols must be positive");
        assert!(rows > 0, "GridMap rows must be positive");

        let mut tiles = Vec::with_capacity((cols as usize) * (rows as usize));
        for y in 0..rows {
            for x in 0..cols {
                let coord = TileCoord::new(x, y);
                tiles.push(Tile::new(coord, topology.position(coord, cols)));
            }
        }

        Self {
            cols,
            rows,
            topology,
            tiles,
        }
    }

    /// Column count.
    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Row count.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Topology parameters.
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Number of edges per tile.
    #[must_use]
    pub const fn edge_count(&self) -> u8 {
        self.topology.edge_count()
    }

    /// The edge facing back across `edge`.
    #[must_use]
    pub const fn opposite_edge(&self, edge: u8) -> u8 {
        self.topology.opposite_edge(edge)
    }

    /// Characteristic tile size (largest tile dimension).
    #[must_use]
    pub fn tile_size(&self) -> Fixed {
        self.topology.tile_size()
    }

    /// Check if coordinates are within the grid.
    #[must_use]
    pub const fn in_bounds(&self, coord: TileCoord) -> bool {
        coord.x < self.cols && coord.y < self.rows
    }

    fn index(&self, coord: TileCoord) -> usize {
        (coord.y as usize) * (self.cols as usize) + (coord.x as usize)
    }

    /// Get a tile by coordinates. Returns `None` if out of bounds.
    #[must_use]
    pub fn get(&self, coord: TileCoord) -> Option<&Tile> {
        if self.in_bounds(coord) {
            Some(&self.tiles[self.index(coord)])
        } else {
            None
        }
    }

    /// Get a mutable tile by coordinates. Returns `None` if out of bounds.
    pub fn get_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        if self.in_bounds(coord) {
            let idx = self.index(coord);
            Some(&mut self.tiles[idx])
        } else {
            None
        }
    }

    /// Iterate all tile coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        let cols = self.cols;
        (0..self.rows).flat_map(move |y| (0..cols).map(move |x| TileCoord::new(x, y)))
    }

    /// Iterate all tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// The adjacent tile across `edge`, or `None` if off-map.
    #[must_use]
    pub fn neighbor(&self, coord: TileCoord, edge: u8) -> Option<TileCoord> {
        let (dx, dy) = self.topology.neighbor_offset(coord, edge)?;
        let nx = i64::from(coord.x) + i64::from(dx);
        let ny = i64::from(coord.y) + i64::from(dy);

        if nx < 0 || ny < 0 || nx >= i64::from(self.cols) || ny >= i64::from(self.rows) {
            return None;
        }

        Some(TileCoord::new(nx as u32, ny as u32))
    }

    /// Add a ramp across `edge` of the tile at `coord`.
    ///
    /// Fails (returns `false`, no mutation) if there is no neighbor across
    /// that edge or both tiles share the same elevation — ramps only connect
    /// distinct elevations. On success the edge is added to this tile's ramp
    /// set and the opposite edge to the neighbor's, always both sides.
    pub fn add_ramp(&mut self, coord: TileCoord, edge: u8) -> bool {
        let Some(neighbor) = self.neighbor(coord, edge) else {
            return false;
        };
        let (Some(tile), Some(other)) = (self.get(coord), self.get(neighbor)) else {
            return false;
        };
        if tile.elevation() == other.elevation() {
            return false;
        }

        let opposite = self.opposite_edge(edge);
        if let Some(tile) = self.get_mut(coord) {
            tile.insert_ramp(edge);
        }
        if let Some(other) = self.get_mut(neighbor) {
            other.insert_ramp(opposite);
        }
        true
    }

    /// Remove the ramp across `edge` of the tile at `coord`.
    ///
    /// Removing from one side removes from both. Returns `false` if there is
    /// no neighbor or no ramp on that edge.
    pub fn remove_ramp(&mut self, coord: TileCoord, edge: u8) -> bool {
        let Some(neighbor) = self.neighbor(coord, edge) else {
            return false;
        };

        let removed = match self.get_mut(coord) {
            Some(tile) => tile.remove_ramp(edge),
            None => false,
        };
        if removed {
            let opposite = self.opposite_edge(edge);
            if let Some(other) = self.get_mut(neighbor) {
                other.remove_ramp(opposite);
            }
        }
        removed
    }

    /// The tile whose generated position is geometrically closest to `pos`.
    ///
    /// Linear scan over squared distances with the topology's vertical
    /// scaling unapplied first.
    #[must_use]
    pub fn nearest_tile(&self, pos: Vec2Fixed) -> TileCoord {
        let y_scale = self.topology.nearest_y_scale();
        let scaled_pos_y = pos.y * y_scale;

        let mut best = TileCoord::new(0, 0);
        let mut best_dist = Fixed::MAX;

        for tile in &self.tiles {
            let dx = tile.position().x - pos.x;
            let dy = tile.position().y * y_scale - scaled_pos_y;
            let dist = dx * dx + dy * dy;
            if dist < best_dist {
                best_dist = dist;
                best = tile.coord();
            }
        }

        best
    }

    /// World-space extents of the generated map.
    #[must_use]
    pub fn world_bounds(&self) -> WorldBounds {
        let (hs, vs) = self.topology.spacing();
        let cols = Fixed::from_num(self.cols);
        let rows = Fixed::from_num(self.rows);
        let one = Fixed::ONE;
        let one_and_half = Fixed::from_num(3) / Fixed::from_num(2);
        let two = Fixed::from_num(2);

        match self.topology {
            Topology::Hex { orientation, .. } => {
                let width = match orientation {
                    HexOrientation::Flat => hs * (cols + one),
                    HexOrientation::Pointy => hs * (cols + one_and_half),
                };
                WorldBounds {
                    x: -hs,
                    y: -vs,
                    width,
                    height: vs * (rows + one_and_half),
                }
            }
            Topology::Square { .. } => WorldBounds {
                x: -hs,
                y: -vs,
                width: hs * (cols + one),
                height: vs * (rows + one),
            },
            Topology::Isometric {
                tile_width,
                tile_height,
            } => {
                let span = cols + rows + Fixed::from_num(4);
                WorldBounds {
                    x: (cols - rows - two) * tile_width / two,
                    y: -tile_height,
                    width: span * tile_width / two,
                    height: span * tile_height / two,
                }
            }
        }
    }
}
