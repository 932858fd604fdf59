//! Test fixtures and helpers.
//!
//! Pre-built maps and unit registries for consistent testing.

use fixed::types::I32F32;
use tactics_core::data::UnitRegistry;
use tactics_core::grid::{GridMap, HexOrientation, Topology};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// The embedded default unit registry.
#[must_use]
pub fn registry() -> UnitRegistry {
    UnitRegistry::builtin()
}

/// A flat, unoccupied square map with unit-less 64x64 tiles.
#[must_use]
pub fn square_map(cols: u32, rows: u32) -> GridMap {
    GridMap::new(
        cols,
        rows,
        Topology::Square {
            tile_width: fixed(64),
            tile_height: fixed(64),
        },
    )
}

/// A flat, unoccupied flat-top hex map at the default perspective squash.
#[must_use]
pub fn flat_hex_map(cols: u32, rows: u32) -> GridMap {
    GridMap::new(
        cols,
        rows,
        Topology::Hex {
            radius: fixed(100),
            vertical_scale: fixed_f(0.7),
            orientation: HexOrientation::Flat,
        },
    )
}

/// A flat, unoccupied pointy-top hex map at the default perspective squash.
#[must_use]
pub fn pointy_hex_map(cols: u32, rows: u32) -> GridMap {
    GridMap::new(
        cols,
        rows,
        Topology::Hex {
            radius: fixed(100),
            vertical_scale: fixed_f(0.7),
            orientation: HexOrientation::Pointy,
        },
    )
}

/// A flat, unoccupied isometric map with a 2:1 diamond projection.
#[must_use]
pub fn iso_map(cols: u32, rows: u32) -> GridMap {
    GridMap::new(
        cols,
        rows,
        Topology::Isometric {
            tile_width: fixed(128),
            tile_height: fixed(64),
        },
    )
}
