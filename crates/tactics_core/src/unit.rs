//! Unit combat/movement state and the unit arena.
//!
//! Units are built from immutable [`UnitData`] definitions looked up by type
//! name, then mutated by gameplay (damage, movement spend, attack spend).
//! Tiles refer to units through [`UnitId`] arena handles rather than
//! references, so removing a dead unit can never dangle.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::data::{UnitData, UnitRegistry};
use crate::error::Result;

/// Unique handle for units stored in a [`UnitArena`].
pub type UnitId = u32;

/// One of the two opposing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Team {
    /// Red team.
    #[default]
    Red,
    /// Blue team.
    Blue,
}

impl Team {
    /// The opposing team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

/// Mutable combat/movement state of a single unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    type_name: String,
    team: Team,
    health: u32,
    max_health: u32,
    /// Depletable shield: one point fully absorbs one attack instance.
    armor: u32,
    damage: u32,
    range: u32,
    attacks_remaining: u32,
    max_attacks: u32,
    movement_points: u32,
    max_movement_points: u32,
    flying: bool,
    can_target_air: bool,
}

impl Unit {
    /// Build a unit from the definition registered under `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnitType`](crate::error::GameError) if the
    /// type name is absent — a content bug, not a recoverable condition.
    pub fn new(type_name: &str, team: Team, registry: &UnitRegistry) -> Result<Self> {
        let def = registry.get(type_name)?;
        Ok(Self::from_definition(type_name, team, def))
    }

    /// Build a unit directly from a definition.
    #[must_use]
    pub fn from_definition(type_name: &str, team: Team, def: &UnitData) -> Self {
        Self {
            type_name: type_name.to_string(),
            team,
            health: def.health,
            max_health: def.health,
            armor: def.armor,
            damage: def.damage,
            range: def.range,
            attacks_remaining: def.max_attacks,
            max_attacks: def.max_attacks,
            movement_points: def.movement,
            max_movement_points: def.movement,
            flying: def.flying,
            can_target_air: def.can_target_air,
        }
    }

    /// Type name this unit was built from.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Team this unit fights for.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Current health, never negative.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Maximum health.
    #[must_use]
    pub const fn max_health(&self) -> u32 {
        self.max_health
    }

    /// Current armor points.
    #[must_use]
    pub const fn armor(&self) -> u32 {
        self.armor
    }

    /// Grant bonus armor (stacks additively, e.g. the elevation bonus).
    pub fn add_armor(&mut self, amount: u32) {
        self.armor += amount;
    }

    /// Damage dealt per attack.
    #[must_use]
    pub const fn damage(&self) -> u32 {
        self.damage
    }

    /// Attack range in tiles (hop count).
    #[must_use]
    pub const fn range(&self) -> u32 {
        self.range
    }

    /// Attacks left this turn.
    #[must_use]
    pub const fn attacks_remaining(&self) -> u32 {
        self.attacks_remaining
    }

    /// Maximum attacks per turn.
    #[must_use]
    pub const fn max_attacks(&self) -> u32 {
        self.max_attacks
    }

    /// Movement points left this turn.
    #[must_use]
    pub const fn movement_points(&self) -> u32 {
        self.movement_points
    }

    /// Maximum movement points per turn.
    #[must_use]
    pub const fn max_movement_points(&self) -> u32 {
        self.max_movement_points
    }

    /// Whether this unit flies (bypasses elevation and ramps).
    #[must_use]
    pub const fn is_flying(&self) -> bool {
        self.flying
    }

    /// Whether this unit can target flying units.
    #[must_use]
    pub const fn can_target_air(&self) -> bool {
        self.can_target_air
    }

    /// Alive while health is above zero.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Can still spend movement this turn.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        self.movement_points > 0
    }

    /// Can still attack this turn.
    #[must_use]
    pub const fn can_attack(&self) -> bool {
        self.attacks_remaining > 0 && self.is_alive()
    }

    /// Can take any action this turn.
    #[must_use]
    pub const fn can_act(&self) -> bool {
        self.can_move() || self.can_attack()
    }

    /// Apply one attack instance of `damage`.
    ///
    /// Armor absorption: one armor point fully negates one incoming attack
    /// regardless of its damage value. Without armor, health saturates at 0.
    pub fn take_damage(&mut self, damage: u32) {
        if self.armor > 0 {
            self.armor -= 1;
        } else {
            self.health = self.health.saturating_sub(damage);
        }
    }

    /// Spend movement points. Saturates at 0.
    pub fn spend_movement(&mut self, cost: u32) {
        self.movement_points = self.movement_points.saturating_sub(cost);
    }

    /// Spend one attack. Saturates at 0.
    pub fn spend_attack(&mut self) {
        self.attacks_remaining = self.attacks_remaining.saturating_sub(1);
    }

    /// Restore movement and attack allowances at a turn boundary.
    pub fn reset_turn(&mut self) {
        self.movement_points = self.max_movement_points;
        self.attacks_remaining = self.max_attacks;
    }
}

/// Storage for all units in play.
///
/// Uses a `HashMap` with monotonically increasing ids; iteration order is
/// made deterministic via [`UnitArena::sorted_ids`] where it matters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitArena {
    units: HashMap<UnitId, Unit>,
    next_id: UnitId,
}

impl UnitArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            units: HashMap::new(),
            next_id: 1,
        }
    }

    /// Insert a unit and return its handle.
    pub fn insert(&mut self, unit: Unit) -> UnitId {
        let id = self.next_id;
        self.next_id += 1;
        self.units.insert(id, unit);
        id
    }

    /// Remove a unit by handle.
    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Get a unit by handle.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a mutable unit by handle.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Check if a handle is live.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    /// Number of live units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Sorted handles for deterministic iteration.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<UnitId> {
        let mut ids: Vec<_> = self.units.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all units (not in deterministic order).
    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, &Unit)> {
        self.units.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Local copy of `tactics_test_utils::fixtures::registry`: the dev-dependency
    // cycle gives test_utils a separate build of this crate, so its fixture
    // types don't unify with the lib-test build.
    fn registry() -> UnitRegistry {
        UnitRegistry::builtin()
    }

    #[test]
    fn test_unit_from_registry() {
        let reg = registry();
        let unit = Unit::new("marine", Team::Red, &reg).unwrap();
        assert_eq!(unit.health(), 3);
        assert_eq!(unit.max_movement_points(), 2);
        assert_eq!(unit.damage(), 2);
        assert!(!unit.is_flying());
    }

    #[test]
    fn test_unknown_type_fails_fast() {
        let reg = registry();
        assert!(Unit::new("zeppelin", Team::Red, &reg).is_err());
    }

    #[test]
    fn test_take_damage_reduces_health() {
        let reg = registry();
        let mut unit = Unit::new("marine", Team::Red, &reg).unwrap(); // HP:3, Armor:0
        unit.take_damage(2);
        assert_eq!(unit.health(), 1);
        unit.take_damage(2);
        assert_eq!(unit.health(), 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn test_armor_absorbs_one_attack() {
        let reg = registry();
        let mut unit = Unit::new("tank", Team::Red, &reg).unwrap(); // HP:5, Armor:1

        // First hit is fully absorbed regardless of damage magnitude.
        unit.take_damage(99);
        assert_eq!(unit.health(), 5);
        assert_eq!(unit.armor(), 0);

        // Second hit lands on health.
        unit.take_damage(4);
        assert_eq!(unit.health(), 1);
    }

    #[test]
    fn test_health_clamped_at_zero() {
        let reg = registry();
        let mut unit = Unit::new("marine", Team::Red, &reg).unwrap();
        unit.take_damage(10);
        assert_eq!(unit.health(), 0);
    }

    #[test]
    fn test_reset_turn_restores_allowances() {
        let reg = registry();
        let mut unit = Unit::new("battlecruiser", Team::Blue, &reg).unwrap();
        unit.spend_movement(3);
        unit.spend_attack();
        unit.spend_attack();
        assert!(!unit.can_move());
        assert!(!unit.can_attack());

        unit.reset_turn();
        assert_eq!(unit.movement_points(), unit.max_movement_points());
        assert_eq!(unit.attacks_remaining(), unit.max_attacks());
    }

    #[test]
    fn test_dead_unit_cannot_attack() {
        let reg = registry();
        let mut unit = Unit::new("marine", Team::Red, &reg).unwrap();
        unit.take_damage(10);
        assert!(!unit.can_attack());
    }

    #[test]
    fn test_battlecruiser_stats() {
        let reg = registry();
        let unit = Unit::new("battlecruiser", Team::Red, &reg).unwrap();
        assert_eq!(unit.max_health(), 7);
        assert_eq!(unit.armor(), 2);
        assert_eq!(unit.damage(), 4);
        assert_eq!(unit.range(), 4);
        assert_eq!(unit.max_movement_points(), 3);
        assert_eq!(unit.max_attacks(), 2);
        assert!(unit.is_flying());
        assert!(!unit.can_target_air());
    }

    #[test]
    fn test_arena_handles_are_stable() {
        let reg = registry();
        let mut arena = UnitArena::new();
        let a = arena.insert(Unit::new("marine", Team::Red, &reg).unwrap());
        let b = arena.insert(Unit::new("tank", Team::Blue, &reg).unwrap());
        assert_ne!(a, b);

        arena.remove(a);
        assert!(!arena.contains(a));
        assert!(arena.contains(b));
        assert_eq!(arena.len(), 1);

        // Removed ids are never reused.
        let c = arena.insert(Unit::new("fighter", Team::Red, &reg).unwrap());
        assert_ne!(c, a);
    }

    #[test]
    fn test_sorted_ids_deterministic() {
        let reg = registry();
        let mut arena = UnitArena::new();
        let mut inserted = Vec::new();
        for _ in 0..5 {
            inserted.push(arena.insert(Unit::new("marine", Team::Red, &reg).unwrap()));
        }
        assert_eq!(arena.sorted_ids(), inserted);
    }
}
