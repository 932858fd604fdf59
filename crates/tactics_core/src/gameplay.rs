//! The interaction state machine: select, plan, execute, attack.
//!
//! [`GameplayManager`] is the sole mutator of tile occupancy and unit combat
//! state. It is driven by three inbound calls (`on_tile_clicked`, `end_turn`,
//! `tick`) and observed through one outbound pull (`update`). The phase is an
//! explicit tagged variant rather than a chain of flags, so every click
//! transition is a named branch on the current phase.
//!
//! Clicks that match no valid transition are absorbed, never errored: the
//! catch-all either soft-cancels an in-progress plan or clears the selection.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{GameError, Result};
use crate::grid::GridMap;
use crate::interaction::InteractionState;
use crate::math::Fixed;
use crate::pathfinding;
use crate::tile::TileCoord;
use crate::unit::{Unit, UnitArena, UnitId};

/// Tunables injected at construction.
#[derive(Debug, Clone)]
pub struct GameplayConfig {
    /// Duration of the blocking window after an attack, in seconds.
    pub attack_animation_secs: Fixed,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            // 0.4 s.
            attack_animation_secs: Fixed::from_num(2) / 5,
        }
    }
}

/// A selected unit with its position-relative query results.
#[derive(Debug, Clone)]
struct Selection {
    tile: TileCoord,
    unit: UnitId,
    reachable: HashMap<TileCoord, u32>,
    attackable: HashSet<TileCoord>,
}

/// One committed-but-unexecuted move leg.
#[derive(Debug, Clone)]
struct PlanLeg {
    path: Vec<TileCoord>,
    cost: u32,
}

/// Accumulated move legs sharing one movement pool.
#[derive(Debug, Clone)]
struct Plan {
    legs: Vec<PlanLeg>,
    movement_left: u32,
    /// Reachable set relative to the last leg's endpoint.
    reachable: HashMap<TileCoord, u32>,
    /// Attackable set relative to the last leg's endpoint.
    attackable: HashSet<TileCoord>,
}

impl Plan {
    fn endpoint(&self) -> TileCoord {
        // A plan always holds at least one leg, and legs are never empty.
        self.legs
            .last()
            .and_then(|leg| leg.path.last())
            .copied()
            .unwrap_or(TileCoord::new(0, 0))
    }

    fn total_cost(&self) -> u32 {
        self.legs.iter().map(|leg| leg.cost).sum()
    }
}

/// The blocking window after an attack.
#[derive(Debug, Clone)]
struct Animation {
    timer: Fixed,
    source: TileCoord,
    target: TileCoord,
    /// Phase to restore once the timer elapses, computed at attack time.
    after: Box<Phase>,
}

/// Explicit interaction phase.
#[derive(Debug, Clone, Default)]
enum Phase {
    /// Nothing selected.
    #[default]
    Idle,
    /// A unit is selected, no plan yet.
    Selected(Selection),
    /// A selected unit has one or more committed move legs.
    Planning(Selection, Plan),
    /// Input-blocking attack animation in progress.
    Animating(Animation),
}

/// Drives selection, movement planning, and combat from tile clicks.
#[derive(Debug, Default)]
pub struct GameplayManager {
    config: GameplayConfig,
    phase: Phase,
}

impl GameplayManager {
    /// Create a manager with the given tunables.
    #[must_use]
    pub fn new(config: GameplayConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    /// Whether an attack animation is blocking input.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Animating(_))
    }

    /// Tile of the current selection, if any.
    #[must_use]
    pub fn selected_tile(&self) -> Option<TileCoord> {
        match &self.phase {
            Phase::Selected(sel) | Phase::Planning(sel, _) => Some(sel.tile),
            Phase::Idle | Phase::Animating(_) => None,
        }
    }

    /// Place a unit on a tile, registering it in the arena.
    ///
    /// # Errors
    ///
    /// [`GameError::TileOccupied`] if the tile already holds a unit, or
    /// [`GameError::InvalidState`] if the coordinate is off the map.
    pub fn deploy(
        map: &mut GridMap,
        units: &mut UnitArena,
        coord: TileCoord,
        unit: Unit,
    ) -> Result<UnitId> {
        let tile = map
            .get(coord)
            .ok_or_else(|| GameError::InvalidState(format!("deploy target {coord:?} off map")))?;
        if tile.is_occupied() {
            return Err(GameError::TileOccupied(coord));
        }

        let type_name = unit.type_name().to_string();
        let id = units.insert(unit);
        if let Some(tile) = map.get_mut(coord) {
            tile.set_occupant(Some(id));
        }
        debug!(unit = %type_name, id, x = coord.x, y = coord.y, "deployed unit");
        Ok(id)
    }

    /// Single inbound entry point for tile clicks.
    ///
    /// Evaluates the transitions in strict priority order; a click that
    /// matches nothing falls through to soft-cancel or deselect.
    pub fn on_tile_clicked(&mut self, coord: TileCoord, map: &mut GridMap, units: &mut UnitArena) {
        let phase = std::mem::take(&mut self.phase);
        self.phase = match phase {
            // Animation is a blocking window: nothing mutates.
            Phase::Animating(anim) => Phase::Animating(anim),
            Phase::Idle => Self::try_select(coord, map, units).map_or(Phase::Idle, Phase::Selected),
            Phase::Selected(sel) => self.click_while_selected(&sel, coord, map, units),
            Phase::Planning(sel, plan) => self.click_while_planning(sel, plan, coord, map, units),
        };
    }

    /// Deselect everything, discard any plan, and restore every unit's
    /// per-turn allowances. Full-map sweep.
    pub fn end_turn(&mut self, map: &GridMap, units: &mut UnitArena) {
        self.phase = Phase::Idle;
        for coord in map.coords() {
            if let Some(id) = map.get(coord).and_then(crate::tile::Tile::occupant) {
                if let Some(unit) = units.get_mut(id) {
                    unit.reset_turn();
                }
            }
        }
        debug!("turn ended, allowances restored");
    }

    /// Advance the animation timer. No other state is time-dependent.
    pub fn tick(&mut self, delta_secs: Fixed) {
        if let Phase::Animating(anim) = &mut self.phase {
            anim.timer -= delta_secs;
            if anim.timer <= Fixed::ZERO {
                let after = std::mem::take(&mut anim.after);
                self.phase = *after;
            }
        }
    }

    /// Populate the per-frame snapshot for the rendering collaborator.
    pub fn update(&self, state: &mut InteractionState) {
        state.clear();
        match &self.phase {
            Phase::Idle => {}
            Phase::Selected(sel) => {
                state.selected_tile = Some(sel.tile);
                state.reachable = sel.reachable.clone();
                state.attackable = sel.attackable.clone();
            }
            Phase::Planning(sel, plan) => {
                state.selected_tile = Some(sel.tile);
                state.reachable = sel.reachable.clone();
                state.attackable = sel.attackable.clone();
                state.planned_path = combined_path(plan);
                state.plan_steps = plan.legs.iter().map(|leg| leg.path.clone()).collect();
                state.plan_movement_remaining = Some(plan.movement_left);
                state.plan_reachable = plan.reachable.clone();
                state.plan_attackable = plan.attackable.clone();
            }
            Phase::Animating(anim) => {
                state.is_animating = true;
                state.animation_remaining_secs = anim.timer;
                state.animation_source = Some(anim.source);
                state.animation_target = Some(anim.target);
            }
        }
    }

    /// Transitions 2, 5, 6, 7, 9 (no plan in progress).
    fn click_while_selected(
        &self,
        sel: &Selection,
        coord: TileCoord,
        map: &mut GridMap,
        units: &mut UnitArena,
    ) -> Phase {
        // 2: clicking the selected unit's own tile deselects.
        if coord == sel.tile {
            return Phase::Idle;
        }

        // 5: direct attack from the current position.
        if sel.attackable.contains(&coord) {
            return self.resolve_attack(sel.unit, sel.tile, coord, map, units);
        }

        // 6: switch selection to another actionable unit.
        if let Some(next) = Self::try_select(coord, map, units) {
            return Phase::Selected(next);
        }

        // 7: start a plan with a first leg.
        if let Some(&cost) = sel.reachable.get(&coord) {
            if let Some(unit) = units.get(sel.unit) {
                if let Some(path) = pathfinding::find_path(map, sel.tile, coord, unit.is_flying())
                {
                    if cost <= unit.movement_points() {
                        let movement_left = unit.movement_points() - cost;
                        let plan = Self::build_plan(
                            vec![PlanLeg { path, cost }],
                            movement_left,
                            unit,
                            coord,
                            map,
                            units,
                        );
                        return Phase::Planning(sel.clone(), plan);
                    }
                }
            }
        }

        // 9: no plan to cancel, so the selection clears.
        Phase::Idle
    }

    /// Transitions 2, 3, 4, 6, 8, 9 (plan in progress).
    fn click_while_planning(
        &self,
        sel: Selection,
        plan: Plan,
        coord: TileCoord,
        map: &mut GridMap,
        units: &mut UnitArena,
    ) -> Phase {
        // 2: deselect, discarding the plan.
        if coord == sel.tile {
            return Phase::Idle;
        }

        // 3: clicking the plan endpoint executes it.
        if coord == plan.endpoint() {
            let endpoint = Self::execute_plan(&sel, &plan, map, units);
            return Self::try_select(endpoint, map, units).map_or(Phase::Idle, Phase::Selected);
        }

        // 4: attack from the plan endpoint, executing the plan first.
        if plan.attackable.contains(&coord) {
            let endpoint = Self::execute_plan(&sel, &plan, map, units);
            return self.resolve_attack(sel.unit, endpoint, coord, map, units);
        }

        // 6: switch selection, clearing the plan.
        if let Some(next) = Self::try_select(coord, map, units) {
            return Phase::Selected(next);
        }

        // 8: extend the plan from its endpoint.
        if let Some(&cost) = plan.reachable.get(&coord) {
            if let Some(unit) = units.get(sel.unit) {
                if let Some(path) =
                    pathfinding::find_path(map, plan.endpoint(), coord, unit.is_flying())
                {
                    if cost <= plan.movement_left {
                        let mut legs = plan.legs;
                        legs.push(PlanLeg { path, cost });
                        let movement_left = plan.movement_left - cost;
                        let plan =
                            Self::build_plan(legs, movement_left, unit, coord, map, units);
                        return Phase::Planning(sel, plan);
                    }
                }
            }
        }

        // 9: soft cancel, recomputing from the original selection.
        Self::try_select(sel.tile, map, units).map_or(Phase::Idle, Phase::Selected)
    }

    /// Assemble a plan with endpoint-relative query sets.
    fn build_plan(
        legs: Vec<PlanLeg>,
        movement_left: u32,
        unit: &Unit,
        endpoint: TileCoord,
        map: &GridMap,
        units: &UnitArena,
    ) -> Plan {
        let reachable = pathfinding::reachable_tiles(map, endpoint, movement_left, unit.is_flying());
        let attackable = Self::attackable_from(unit, endpoint, map, units);
        Plan {
            legs,
            movement_left,
            reachable,
            attackable,
        }
    }

    /// Commit all accumulated legs: relocate the unit and spend movement.
    /// Returns the new position.
    fn execute_plan(
        sel: &Selection,
        plan: &Plan,
        map: &mut GridMap,
        units: &mut UnitArena,
    ) -> TileCoord {
        let endpoint = plan.endpoint();
        let cost = plan.total_cost();

        if let Some(tile) = map.get_mut(sel.tile) {
            tile.set_occupant(None);
        }
        if let Some(tile) = map.get_mut(endpoint) {
            tile.set_occupant(Some(sel.unit));
        }
        if let Some(unit) = units.get_mut(sel.unit) {
            unit.spend_movement(cost);
        }

        debug!(
            unit = sel.unit,
            from_x = sel.tile.x,
            from_y = sel.tile.y,
            to_x = endpoint.x,
            to_y = endpoint.y,
            cost,
            "plan executed"
        );
        endpoint
    }

    /// Resolve an attack from `source` against the occupant of `target`,
    /// then open the animation window.
    fn resolve_attack(
        &self,
        attacker_id: UnitId,
        source: TileCoord,
        target: TileCoord,
        map: &mut GridMap,
        units: &mut UnitArena,
    ) -> Phase {
        let Some(target_id) = map.get(target).and_then(crate::tile::Tile::occupant) else {
            return Self::try_select(source, map, units).map_or(Phase::Idle, Phase::Selected);
        };

        let source_elevation = map.get(source).map_or(0, crate::tile::Tile::elevation);
        let target_elevation = map.get(target).map_or(0, crate::tile::Tile::elevation);

        let (damage, flying) = match units.get(attacker_id) {
            Some(a) => (a.damage(), a.is_flying()),
            None => return Phase::Idle,
        };

        // High ground: +1 armor for the defender against non-flying attackers.
        if target_elevation > source_elevation && !flying {
            if let Some(defender) = units.get_mut(target_id) {
                defender.add_armor(1);
            }
        }

        if let Some(defender) = units.get_mut(target_id) {
            defender.take_damage(damage);
            debug!(
                attacker = attacker_id,
                defender = target_id,
                damage,
                health = defender.health(),
                armor = defender.armor(),
                "attack resolved"
            );
            if !defender.is_alive() {
                if let Some(tile) = map.get_mut(target) {
                    tile.set_occupant(None);
                }
                units.remove(target_id);
                debug!(defender = target_id, "unit destroyed");
            }
        }

        if let Some(attacker) = units.get_mut(attacker_id) {
            attacker.spend_attack();
        }

        // Follow-up phase is decided now, not when the timer elapses.
        let after = Self::try_select(source, map, units).map_or(Phase::Idle, Phase::Selected);
        Phase::Animating(Animation {
            timer: self.config.attack_animation_secs,
            source,
            target,
            after: Box::new(after),
        })
    }

    /// Build a selection for the unit on `coord`, if it can still act.
    fn try_select(coord: TileCoord, map: &GridMap, units: &UnitArena) -> Option<Selection> {
        let id = map.get(coord)?.occupant()?;
        let unit = units.get(id)?;
        if !unit.can_act() {
            return None;
        }

        let reachable =
            pathfinding::reachable_tiles(map, coord, unit.movement_points(), unit.is_flying());
        let attackable = Self::attackable_from(unit, coord, map, units);
        Some(Selection {
            tile: coord,
            unit: id,
            reachable,
            attackable,
        })
    }

    /// Enemy-occupied tiles within range, honoring air-targeting limits.
    fn attackable_from(
        attacker: &Unit,
        from: TileCoord,
        map: &GridMap,
        units: &UnitArena,
    ) -> HashSet<TileCoord> {
        if !attacker.can_attack() {
            return HashSet::new();
        }
        pathfinding::tiles_in_range(map, from, attacker.range())
            .into_iter()
            .filter(|&coord| {
                map.get(coord)
                    .and_then(crate::tile::Tile::occupant)
                    .and_then(|id| units.get(id))
                    .is_some_and(|target| {
                        target.team() != attacker.team()
                            && (!target.is_flying() || attacker.can_target_air())
                    })
            })
            .collect()
    }
}

/// Concatenate leg paths, dropping each subsequent leg's duplicate junction.
fn combined_path(plan: &Plan) -> Vec<TileCoord> {
    let mut combined = Vec::new();
    for leg in &plan.legs {
        let skip = usize::from(!combined.is_empty());
        combined.extend(leg.path.iter().skip(skip).copied());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::UnitRegistry;
    use crate::grid::Topology;
    use crate::unit::Team;

    // Local copies of `tactics_test_utils::fixtures::{registry, square_map}`:
    // the dev-dependency cycle gives test_utils a separate build of this crate,
    // so its UnitRegistry/GridMap don't unify with the lib-test build.
    fn registry() -> UnitRegistry {
        UnitRegistry::builtin()
    }

    fn square_map(cols: u32, rows: u32) -> GridMap {
        GridMap::new(
            cols,
            rows,
            Topology::Square {
                tile_width: Fixed::from_num(64),
                tile_height: Fixed::from_num(64),
            },
        )
    }

    fn manager() -> GameplayManager {
        GameplayManager::new(GameplayConfig::default())
    }

    fn deploy(
        map: &mut GridMap,
        units: &mut UnitArena,
        name: &str,
        team: Team,
        x: u32,
        y: u32,
    ) -> UnitId {
        let unit = Unit::new(name, team, &registry()).unwrap();
        GameplayManager::deploy(map, units, TileCoord::new(x, y), unit).unwrap()
    }

    fn snapshot(mgr: &GameplayManager) -> InteractionState {
        let mut state = InteractionState::default();
        mgr.update(&mut state);
        state
    }

    #[test]
    fn test_deploy_rejects_occupied_tile() {
        let mut map = square_map(5, 5);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 2, 2);

        let again = Unit::new("marine", Team::Blue, &registry()).unwrap();
        let err = GameplayManager::deploy(&mut map, &mut units, TileCoord::new(2, 2), again)
            .unwrap_err();
        assert!(matches!(err, GameError::TileOccupied(_)));
    }

    #[test]
    fn test_select_and_deselect_on_own_tile() {
        let mut map = square_map(5, 5);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 2, 2);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(2, 2)));

        let state = snapshot(&mgr);
        assert!(!state.reachable.is_empty());

        // Transition 2: own tile deselects.
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), None);
    }

    #[test]
    fn test_click_on_empty_tile_while_idle_is_noop() {
        let mut map = square_map(5, 5);
        let mut units = UnitArena::new();
        let mut mgr = manager();

        mgr.on_tile_clicked(TileCoord::new(1, 1), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), None);
    }

    #[test]
    fn test_plan_start_and_execute_relocates_unit() {
        let mut map = square_map(6, 6);
        let mut units = UnitArena::new();
        let id = deploy(&mut map, &mut units, "marine", Team::Red, 1, 1); // 2 MP

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(1, 1), &mut map, &mut units);

        // Transition 7: start a plan to a reachable tile.
        mgr.on_tile_clicked(TileCoord::new(3, 1), &mut map, &mut units);
        let state = snapshot(&mgr);
        assert_eq!(state.plan_movement_remaining, Some(0));
        assert_eq!(
            state.planned_path,
            [
                TileCoord::new(1, 1),
                TileCoord::new(2, 1),
                TileCoord::new(3, 1)
            ]
        );

        // Transition 3: clicking the endpoint executes.
        mgr.on_tile_clicked(TileCoord::new(3, 1), &mut map, &mut units);
        assert!(map.get(TileCoord::new(1, 1)).unwrap().occupant().is_none());
        assert_eq!(map.get(TileCoord::new(3, 1)).unwrap().occupant(), Some(id));
        assert_eq!(units.get(id).unwrap().movement_points(), 0);

        // Unit can still attack, so it is auto-reselected at the new tile.
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(3, 1)));
    }

    #[test]
    fn test_plan_extension_shares_movement_pool() {
        let mut map = square_map(8, 8);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "fighter", Team::Red, 0, 0); // 4 MP

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(0, 0), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 0), &mut map, &mut units); // leg 1, cost 2
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units); // leg 2, cost 2

        let state = snapshot(&mgr);
        assert_eq!(state.plan_steps.len(), 2);
        assert_eq!(state.plan_movement_remaining, Some(0));
        // Junction (2,0) appears once in the combined path.
        assert_eq!(
            state
                .planned_path
                .iter()
                .filter(|&&c| c == TileCoord::new(2, 0))
                .count(),
            1
        );
        // Pool exhausted: nothing further is plan-reachable.
        assert!(state.plan_reachable.is_empty());
    }

    #[test]
    fn test_soft_cancel_discards_plan_keeps_selection() {
        let mut map = square_map(8, 8);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 1, 1);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(1, 1), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 1), &mut map, &mut units);
        assert!(snapshot(&mgr).plan_movement_remaining.is_some());

        // Transition 9: unmatched click discards the plan but not the selection.
        mgr.on_tile_clicked(TileCoord::new(7, 7), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(1, 1)));
        assert!(snapshot(&mgr).plan_movement_remaining.is_none());

        // Transition 9 without a plan: unmatched click deselects.
        mgr.on_tile_clicked(TileCoord::new(7, 7), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), None);
    }

    #[test]
    fn test_selection_switch_clears_plan() {
        let mut map = square_map(8, 8);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 1, 1);
        deploy(&mut map, &mut units, "tank", Team::Red, 6, 6);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(1, 1), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 1), &mut map, &mut units);

        // Transition 6: click another actionable unit.
        mgr.on_tile_clicked(TileCoord::new(6, 6), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(6, 6)));
        assert!(snapshot(&mgr).plan_movement_remaining.is_none());
    }

    #[test]
    fn test_direct_attack_two_hits_kill_marine() {
        let mut map = square_map(5, 5);
        let mut units = UnitArena::new();
        let attacker = deploy(&mut map, &mut units, "marine", Team::Red, 2, 2); // DMG:2
        let defender = deploy(&mut map, &mut units, "marine", Team::Blue, 2, 3); // HP:3

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);

        // Transition 5: direct attack.
        mgr.on_tile_clicked(TileCoord::new(2, 3), &mut map, &mut units);
        assert!(mgr.is_animating());
        assert_eq!(units.get(defender).unwrap().health(), 1);
        assert_eq!(units.get(attacker).unwrap().attacks_remaining(), 0);

        // Let the animation elapse; attacker can still move so it reselects.
        mgr.tick(Fixed::from_num(1));
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(2, 2)));

        // New turn restores the attack allowance; second hit kills.
        mgr.end_turn(&map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 3), &mut map, &mut units);
        mgr.tick(Fixed::from_num(1));

        assert!(!units.contains(defender));
        assert!(map.get(TileCoord::new(2, 3)).unwrap().occupant().is_none());
    }

    #[test]
    fn test_animation_blocks_input() {
        let mut map = square_map(5, 5);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 2, 2);
        let defender = deploy(&mut map, &mut units, "marine", Team::Blue, 2, 3);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 3), &mut map, &mut units);
        assert!(mgr.is_animating());

        let before = units.get(defender).unwrap().health();

        // Transition 1: clicks are swallowed whole while animating.
        mgr.on_tile_clicked(TileCoord::new(2, 3), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        assert!(mgr.is_animating());
        assert_eq!(units.get(defender).unwrap().health(), before);

        let state = snapshot(&mgr);
        assert!(state.is_animating);
        assert_eq!(state.animation_source, Some(TileCoord::new(2, 2)));
        assert_eq!(state.animation_target, Some(TileCoord::new(2, 3)));

        // Partial tick leaves the window open.
        mgr.tick(Fixed::from_num(1) / 10);
        assert!(mgr.is_animating());
        mgr.tick(Fixed::from_num(1));
        assert!(!mgr.is_animating());
    }

    #[test]
    fn test_elevation_bonus_grants_one_armor() {
        let mut map = square_map(5, 5);
        map.get_mut(TileCoord::new(2, 3)).unwrap().set_elevation(1);

        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 2, 2);
        let defender = deploy(&mut map, &mut units, "marine", Team::Blue, 2, 3); // HP:3, Armor:0

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 3), &mut map, &mut units);

        // The granted armor point absorbed the hit; health untouched.
        assert_eq!(units.get(defender).unwrap().health(), 3);
        assert_eq!(units.get(defender).unwrap().armor(), 0);
    }

    #[test]
    fn test_flying_attacker_ignores_elevation_bonus() {
        let mut map = square_map(5, 5);
        map.get_mut(TileCoord::new(2, 3)).unwrap().set_elevation(1);

        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "fighter", Team::Red, 2, 2); // DMG:3, flying
        let defender = deploy(&mut map, &mut units, "marine", Team::Blue, 2, 3);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(2, 3), &mut map, &mut units);

        // No bonus armor: the hit lands on health and kills.
        assert!(!units.contains(defender));
    }

    #[test]
    fn test_cannot_target_air_without_capability() {
        let mut map = square_map(5, 5);
        let mut units = UnitArena::new();
        // Tank cannot target air; fighter is flying.
        deploy(&mut map, &mut units, "tank", Team::Red, 2, 2);
        let flier = deploy(&mut map, &mut units, "fighter", Team::Blue, 2, 3);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        let state = snapshot(&mgr);
        assert!(!state.attackable.contains(&TileCoord::new(2, 3)));

        // The click falls through to selection switch (the flier can act).
        mgr.on_tile_clicked(TileCoord::new(2, 3), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(2, 3)));
        assert!(units.get(flier).unwrap().health() == 4);
    }

    #[test]
    fn test_friendly_units_are_not_attackable() {
        let mut map = square_map(5, 5);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 2, 2);
        deploy(&mut map, &mut units, "marine", Team::Red, 2, 3);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        assert!(snapshot(&mgr).attackable.is_empty());
    }

    #[test]
    fn test_attack_from_plan_endpoint_executes_plan_first() {
        let mut map = square_map(8, 8);
        let mut units = UnitArena::new();
        let attacker = deploy(&mut map, &mut units, "marine", Team::Red, 0, 0); // RNG:1, MP:2
        let defender = deploy(&mut map, &mut units, "marine", Team::Blue, 3, 0); // HP:3

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(0, 0), &mut map, &mut units);
        // Out of range from (0,0); plan two tiles east.
        assert!(!snapshot(&mgr).attackable.contains(&TileCoord::new(3, 0)));
        mgr.on_tile_clicked(TileCoord::new(2, 0), &mut map, &mut units);
        assert!(snapshot(&mgr).plan_attackable.contains(&TileCoord::new(3, 0)));

        // Transition 4: attack from the endpoint commits the move first.
        mgr.on_tile_clicked(TileCoord::new(3, 0), &mut map, &mut units);
        assert_eq!(map.get(TileCoord::new(2, 0)).unwrap().occupant(), Some(attacker));
        assert_eq!(units.get(defender).unwrap().health(), 1);
        assert!(mgr.is_animating());

        let state = snapshot(&mgr);
        assert_eq!(state.animation_source, Some(TileCoord::new(2, 0)));
        assert_eq!(state.animation_target, Some(TileCoord::new(3, 0)));
    }

    #[test]
    fn test_plan_through_friendly_unit() {
        // Corridor with a friendly unit in the middle: reachable beyond it,
        // but the occupied tile itself is not settleable.
        let mut map = square_map(5, 1);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "marine", Team::Red, 0, 0);
        deploy(&mut map, &mut units, "marine", Team::Red, 1, 0);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(0, 0), &mut map, &mut units);
        let state = snapshot(&mgr);
        assert!(!state.reachable.contains_key(&TileCoord::new(1, 0)));
        assert_eq!(state.reachable.get(&TileCoord::new(2, 0)), Some(&2));
    }

    #[test]
    fn test_end_turn_restores_allowances_and_clears_state() {
        let mut map = square_map(6, 6);
        let mut units = UnitArena::new();
        let id = deploy(&mut map, &mut units, "marine", Team::Red, 1, 1);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(1, 1), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(3, 1), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(3, 1), &mut map, &mut units); // execute
        assert_eq!(units.get(id).unwrap().movement_points(), 0);

        mgr.end_turn(&map, &mut units);
        assert_eq!(mgr.selected_tile(), None);
        assert_eq!(units.get(id).unwrap().movement_points(), 2);
        assert_eq!(units.get(id).unwrap().attacks_remaining(), 1);
    }

    #[test]
    fn test_exhausted_unit_cannot_be_selected() {
        let mut map = square_map(6, 6);
        let mut units = UnitArena::new();
        let id = deploy(&mut map, &mut units, "marine", Team::Red, 1, 1);
        units.get_mut(id).unwrap().spend_movement(2);
        units.get_mut(id).unwrap().spend_attack();

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(1, 1), &mut map, &mut units);
        assert_eq!(mgr.selected_tile(), None);
    }

    #[test]
    fn test_execute_plan_deselects_fully_spent_unit() {
        let mut map = square_map(6, 6);
        let mut units = UnitArena::new();
        let id = deploy(&mut map, &mut units, "marine", Team::Red, 1, 1);
        // No attacks left, so after spending all movement it cannot act.
        units.get_mut(id).unwrap().spend_attack();

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(1, 1), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(3, 1), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(3, 1), &mut map, &mut units);

        assert_eq!(mgr.selected_tile(), None);
        assert_eq!(map.get(TileCoord::new(3, 1)).unwrap().occupant(), Some(id));
    }

    #[test]
    fn test_battlecruiser_two_attacks_per_turn() {
        let mut map = square_map(8, 8);
        let mut units = UnitArena::new();
        deploy(&mut map, &mut units, "battlecruiser", Team::Red, 2, 2); // ATK:2, DMG:4, RNG:4
        let a = deploy(&mut map, &mut units, "marine", Team::Blue, 4, 2);
        let b = deploy(&mut map, &mut units, "marine", Team::Blue, 2, 4);

        let mut mgr = manager();
        mgr.on_tile_clicked(TileCoord::new(2, 2), &mut map, &mut units);
        mgr.on_tile_clicked(TileCoord::new(4, 2), &mut map, &mut units);
        mgr.tick(Fixed::from_num(1));
        assert!(!units.contains(a));

        // Auto-reselected with one attack left.
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(2, 2)));
        mgr.on_tile_clicked(TileCoord::new(2, 4), &mut map, &mut units);
        mgr.tick(Fixed::from_num(1));
        assert!(!units.contains(b));

        // Attacks are spent: a third enemy is no longer attackable, so the
        // click falls through to a selection switch instead of an attack.
        let c = deploy(&mut map, &mut units, "marine", Team::Blue, 3, 2);
        mgr.on_tile_clicked(TileCoord::new(3, 2), &mut map, &mut units);
        assert!(units.contains(c));
        assert_eq!(mgr.selected_tile(), Some(TileCoord::new(3, 2)));
    }
}
