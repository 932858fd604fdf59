//! Reachability, shortest-path search, and range queries.
//!
//! Stateless algorithms over a [`GridMap`], parameterized by the moving
//! unit's flight capability. Every algorithm funnels terrain legality
//! through [`can_traverse`]; edge cost is uniform at 1.
//!
//! Occupancy has a dual treatment in reachability: occupied tiles are
//! *passable* (a unit can plan through a friendly tile) but never
//! *settleable* (they are filtered from the final reachable set). Range
//! queries ignore terrain and occupancy entirely.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::grid::GridMap;
use crate::math::Fixed;
use crate::tile::{Tile, TileCoord};

/// Terrain legality of a single step from `from` to `to` across `edge`.
///
/// Flying units bypass all elevation and ramp constraints. Ground units may
/// step between equal elevations, or across an edge carrying a ramp (the
/// bidirectionality invariant guarantees the mirrored ramp on `to`).
#[must_use]
pub fn can_traverse(from: &Tile, to: &Tile, edge: u8, is_flying: bool) -> bool {
    if is_flying {
        return true;
    }
    if from.elevation() == to.elevation() {
        return true;
    }
    from.has_ramp(edge)
}

/// A node in the uniform-cost frontier.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct CostNode {
    coord: TileCoord,
    cost: u32,
    /// Deterministic tie-breaking: lower coordinates first.
    tie_breaker: u64,
}

impl Ord for CostNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for min-heap behavior.
        match other.cost.cmp(&self.cost) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for CostNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compute every tile a unit could end its move on, with minimum cost.
///
/// Cost-bounded uniform-cost search from `start`, expanding through legal
/// edges only and never past `max_cost`. The result excludes `start` itself
/// and any occupied tile; occupied tiles still relay expansion so that
/// tiles beyond them get correct costs.
#[must_use]
pub fn reachable_tiles(
    map: &GridMap,
    start: TileCoord,
    max_cost: u32,
    is_flying: bool,
) -> HashMap<TileCoord, u32> {
    let mut visited: HashMap<TileCoord, u32> = HashMap::new();
    visited.insert(start, 0);

    let mut frontier = BinaryHeap::new();
    frontier.push(CostNode {
        coord: start,
        cost: 0,
        tie_breaker: start.tie_breaker(),
    });

    while let Some(current) = frontier.pop() {
        // Stale entry: a cheaper path already settled this tile.
        if visited.get(&current.coord).copied() != Some(current.cost) {
            continue;
        }
        let Some(tile) = map.get(current.coord) else {
            continue;
        };

        for edge in 0..map.edge_count() {
            let Some(next) = map.neighbor(current.coord, edge) else {
                continue;
            };
            let Some(next_tile) = map.get(next) else {
                continue;
            };
            if !can_traverse(tile, next_tile, edge, is_flying) {
                continue;
            }

            let new_cost = current.cost + 1;
            if new_cost > max_cost {
                continue;
            }

            let better = visited.get(&next).map_or(true, |&c| new_cost < c);
            if better {
                visited.insert(next, new_cost);
                frontier.push(CostNode {
                    coord: next,
                    cost: new_cost,
                    tie_breaker: next.tie_breaker(),
                });
            }
        }
    }

    visited
        .into_iter()
        .filter(|&(coord, _)| {
            coord != start && map.get(coord).is_some_and(|t| !t.is_occupied())
        })
        .collect()
}

/// A node in the A* open set.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    coord: TileCoord,
    /// f = g + heuristic.
    f_score: Fixed,
    tie_breaker: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Euclidean distance between tile centers divided by the characteristic
/// tile size: a topology-agnostic admissible hop-count estimate.
fn heuristic(map: &GridMap, a: TileCoord, b: TileCoord) -> Fixed {
    let (Some(ta), Some(tb)) = (map.get(a), map.get(b)) else {
        return Fixed::ZERO;
    };
    let dist = ta.position().distance(tb.position());
    let size = map.tile_size();
    if size > Fixed::ZERO {
        dist / size
    } else {
        dist
    }
}

/// Find a shortest path from `start` to `goal`, inclusive of both endpoints.
///
/// Returns `None` — an ordinary outcome, not an error — when the goal is
/// occupied, equals the start, or no legal route exists.
#[must_use]
pub fn find_path(
    map: &GridMap,
    start: TileCoord,
    goal: TileCoord,
    is_flying: bool,
) -> Option<Vec<TileCoord>> {
    if start == goal {
        return None;
    }
    if map.get(goal)?.is_occupied() {
        return None;
    }
    map.get(start)?;

    let mut came_from: HashMap<TileCoord, TileCoord> = HashMap::new();
    let mut g_score: HashMap<TileCoord, u32> = HashMap::new();
    g_score.insert(start, 0);

    let mut open_set = BinaryHeap::new();
    open_set.push(AStarNode {
        coord: start,
        f_score: heuristic(map, start, goal),
        tie_breaker: start.tie_breaker(),
    });

    while let Some(current) = open_set.pop() {
        if current.coord == goal {
            return Some(reconstruct_path(&came_from, goal));
        }

        let current_g = g_score.get(&current.coord).copied().unwrap_or(u32::MAX);
        let Some(tile) = map.get(current.coord) else {
            continue;
        };

        for edge in 0..map.edge_count() {
            let Some(next) = map.neighbor(current.coord, edge) else {
                continue;
            };
            let Some(next_tile) = map.get(next) else {
                continue;
            };
            if !can_traverse(tile, next_tile, edge, is_flying) {
                continue;
            }

            let tentative_g = current_g + 1;
            let neighbor_g = g_score.get(&next).copied().unwrap_or(u32::MAX);

            if tentative_g < neighbor_g {
                came_from.insert(next, current.coord);
                g_score.insert(next, tentative_g);

                let f = Fixed::from_num(tentative_g) + heuristic(map, next, goal);
                open_set.push(AStarNode {
                    coord: next,
                    f_score: f,
                    tie_breaker: next.tie_breaker(),
                });
            }
        }
    }

    None
}

/// Reconstruct the path from the `came_from` map, start to goal.
fn reconstruct_path(came_from: &HashMap<TileCoord, TileCoord>, goal: TileCoord) -> Vec<TileCoord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

/// All tiles within `range` hops of `center`, excluding `center` itself.
///
/// Plain breadth-first search bounded by hop count. Range queries (e.g.
/// attack range) ignore terrain blocking and occupancy.
#[must_use]
pub fn tiles_in_range(map: &GridMap, center: TileCoord, range: u32) -> HashSet<TileCoord> {
    let mut result = HashSet::new();
    let mut visited = HashSet::new();
    visited.insert(center);

    let mut frontier = VecDeque::new();
    frontier.push_back((center, 0u32));

    while let Some((current, dist)) = frontier.pop_front() {
        if dist >= range {
            continue;
        }
        for edge in 0..map.edge_count() {
            let Some(next) = map.neighbor(current, edge) else {
                continue;
            };
            if !visited.insert(next) {
                continue;
            }
            result.insert(next);
            frontier.push_back((next, dist + 1));
        }
    }

    result
}
