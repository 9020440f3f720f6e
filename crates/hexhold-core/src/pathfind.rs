//! Cheapest-path search over the implicit infinite grid.
//!
//! Dijkstra with hash-keyed dist/prev maps instead of index vectors: the
//! grid has no bounds, so the search carries an explicit pop budget and
//! treats exhaustion exactly like "no path". Entry costs come from each
//! tile's permanent `max_level`, so a vacated tile stays expensive.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashMap, HashSet},
};

use hexhold_protocol::Hex;

use crate::tile::TileMap;

/// An ordered route, start excluded, goal included.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub steps: Vec<Hex>,
    /// Sum of entry costs along `steps`.
    pub cost: u64,
}

/// Cheapest path from `start` to `goal` for an agent of `rank`.
///
/// Coordinates in `obstacles` are never entered, the goal included: a
/// path to an occupied destination is unreachable by definition. Tiles
/// whose `max_level` exceeds `rank` are impassable. Returns `None` when
/// no route exists within `budget` heap pops; an adjacent, passable,
/// unoccupied goal is special-cased so single-step moves survive budget
/// pressure.
pub fn find_path(
    map: &TileMap,
    start: Hex,
    goal: Hex,
    rank: u32,
    obstacles: &HashSet<Hex>,
    budget: usize,
) -> Option<Path> {
    if start == goal || obstacles.contains(&goal) || !map.passable_for(goal, rank) {
        return None;
    }

    let mut dist: HashMap<Hex, u64> = HashMap::new();
    let mut prev: HashMap<Hex, Hex> = HashMap::new();
    dist.insert(start, 0);

    // Tie-break on (q, r) after cost so expansion order is deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, i32, i32)>> = BinaryHeap::new();
    heap.push(Reverse((0, start.q, start.r)));

    let mut pops = 0_usize;
    while let Some(Reverse((cost, q, r))) = heap.pop() {
        let current = Hex::new(q, r);
        if cost != *dist.get(&current).unwrap_or(&u64::MAX) {
            continue;
        }
        if current == goal {
            return Some(rebuild(&prev, start, goal, cost));
        }

        pops += 1;
        if pops > budget {
            break;
        }

        for neighbor in current.neighbors() {
            if obstacles.contains(&neighbor) || !map.passable_for(neighbor, rank) {
                continue;
            }
            let new_cost = cost.saturating_add(map.entry_cost(neighbor));
            if new_cost < *dist.get(&neighbor).unwrap_or(&u64::MAX) {
                dist.insert(neighbor, new_cost);
                prev.insert(neighbor, current);
                heap.push(Reverse((new_cost, neighbor.q, neighbor.r)));
            }
        }
    }

    // Budget exhausted or frontier dead. Guarantee adjacent moves.
    if start.distance(goal) == 1 {
        return Some(Path {
            steps: vec![goal],
            cost: map.entry_cost(goal),
        });
    }
    None
}

fn rebuild(prev: &HashMap<Hex, Hex>, start: Hex, goal: Hex, cost: u64) -> Path {
    let mut steps = vec![goal];
    let mut at = goal;
    while let Some(&p) = prev.get(&at) {
        if p == start {
            break;
        }
        steps.push(p);
        at = p;
    }
    steps.reverse();
    Path { steps, cost }
}
