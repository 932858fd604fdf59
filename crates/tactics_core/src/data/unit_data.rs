//! Unit type definitions and the definition registry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};

/// Immutable definition of a unit type.
///
/// Loaded once from RON and consulted at unit construction; a
/// [`Unit`](crate::unit::Unit) copies these values into its mutable state.
///
/// # Example RON
///
/// ```ron
/// (
///     movement: 2,
///     health: 3,
///     damage: 2,
///     range: 1,
///     max_attacks: 1,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    /// Movement points per turn.
    #[serde(default = "default_movement")]
    pub movement: u32,

    /// Maximum health points.
    #[serde(default = "default_health")]
    pub health: u32,

    /// Starting armor points (each absorbs one full attack).
    #[serde(default)]
    pub armor: u32,

    /// Damage dealt per attack.
    #[serde(default = "default_damage")]
    pub damage: u32,

    /// Attack range in tiles.
    #[serde(default = "default_range")]
    pub range: u32,

    /// Whether this unit can target flying units.
    #[serde(default = "default_true")]
    pub can_target_air: bool,

    /// Attacks allowed per turn.
    #[serde(default = "default_max_attacks")]
    pub max_attacks: u32,

    /// Whether this unit flies (bypasses elevation and ramps).
    #[serde(default)]
    pub flying: bool,
}

const fn default_movement() -> u32 {
    2
}

const fn default_health() -> u32 {
    3
}

const fn default_damage() -> u32 {
    2
}

const fn default_range() -> u32 {
    1
}

const fn default_max_attacks() -> u32 {
    1
}

const fn default_true() -> bool {
    true
}

/// Embedded default unit set.
const BUILTIN_UNITS: &str = include_str!("../../data/units.ron");

/// Registry of unit definitions keyed by type name.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    defs: HashMap<String, UnitData>,
    /// Type names in declaration order, for stable enumeration.
    names: Vec<String>,
}

impl UnitRegistry {
    /// Parse a registry from RON text.
    ///
    /// The expected format is a map from type name to definition.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DataParseError`] if the RON is malformed.
    pub fn from_ron_str(source: &str, path: &str) -> Result<Self> {
        let parsed: Vec<(String, UnitData)> =
            ron::from_str(source).map_err(|e| GameError::DataParseError {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let mut defs = HashMap::with_capacity(parsed.len());
        let mut names = Vec::with_capacity(parsed.len());
        for (name, def) in parsed {
            if defs.insert(name.clone(), def).is_none() {
                names.push(name);
            }
        }

        Ok(Self { defs, names })
    }

    /// The compile-time embedded default unit set.
    ///
    /// # Panics
    ///
    /// Panics if the embedded data is malformed (caught at test time).
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_ron_str(BUILTIN_UNITS, "data/units.ron")
            .unwrap_or_else(|e| panic!("embedded unit data is invalid: {e}"))
    }

    /// Look up a definition by type name.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnitType`] if the name is absent.
    pub fn get(&self, type_name: &str) -> Result<&UnitData> {
        self.defs
            .get(type_name)
            .ok_or_else(|| GameError::UnknownUnitType(type_name.to_string()))
    }

    /// Check whether a type name is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.defs.contains_key(type_name)
    }

    /// Registered type names in declaration order.
    #[must_use]
    pub fn type_names(&self) -> &[String] {
        &self.names
    }

    /// Number of registered definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
