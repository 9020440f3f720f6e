use std::collections::HashMap;

use hexhold_protocol::{Hex, TileSnapshot};

/// One discovered tile. `current_level` is positional advantage and resets
/// to 0 whenever an agent leaves; `max_level` is the permanent high-water
/// mark and only ever rises.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub current_level: u32,
    pub max_level: u32,
    /// Accumulated growth ticks toward `current_level + 1`.
    pub progress: u32,
}

impl Tile {
    /// Movement cost to enter this tile. Bound to the permanent
    /// `max_level`, not the transient `current_level`.
    pub fn entry_cost(&self) -> u64 {
        if self.max_level >= 2 {
            self.max_level as u64
        } else {
            1
        }
    }

    /// Whether an agent of `rank` may enter at all.
    pub fn passable_for(&self, rank: u32) -> bool {
        self.max_level <= rank
    }

    /// Reset on agent departure. Territory advantage is positional.
    pub fn reset_occupation(&mut self) {
        self.current_level = 0;
        self.progress = 0;
    }
}

/// Sparse map over the implicitly infinite grid. Tiles are created lazily
/// the first time they or a neighbor become reachable and are never
/// deleted.
#[derive(Clone, Debug, Default)]
pub struct TileMap {
    tiles: HashMap<Hex, Tile>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize `at` and its six neighbors at level 0 if absent. This
    /// is the only way tiles come into existence.
    pub fn reveal(&mut self, at: Hex) {
        self.tiles.entry(at).or_default();
        for n in at.neighbors() {
            self.tiles.entry(n).or_default();
        }
    }

    pub fn get(&self, at: Hex) -> Option<&Tile> {
        self.tiles.get(&at)
    }

    pub fn get_mut(&mut self, at: Hex) -> Option<&mut Tile> {
        self.tiles.get_mut(&at)
    }

    /// Entry cost for the pathfinder. Unrevealed coordinates are cheap by
    /// definition (they would materialize at level 0).
    pub fn entry_cost(&self, at: Hex) -> u64 {
        self.tiles.get(&at).map(|t| t.entry_cost()).unwrap_or(1)
    }

    /// Rank gate for the pathfinder; unrevealed coordinates never lock.
    pub fn passable_for(&self, at: Hex, rank: u32) -> bool {
        self.tiles.get(&at).map(|t| t.passable_for(rank)).unwrap_or(true)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Hex, &Tile)> {
        self.tiles.iter()
    }

    pub fn to_snapshots(&self) -> Vec<TileSnapshot> {
        let mut out: Vec<TileSnapshot> = self
            .tiles
            .iter()
            .map(|(at, t)| TileSnapshot {
                at: *at,
                current_level: t.current_level,
                max_level: t.max_level,
                progress: t.progress,
            })
            .collect();
        // Stable order so snapshots of equal states compare equal.
        out.sort_by_key(|t| t.at);
        out
    }

    pub fn from_snapshots(snapshots: &[TileSnapshot]) -> Self {
        let tiles = snapshots
            .iter()
            .map(|s| {
                (
                    s.at,
                    Tile {
                        current_level: s.current_level,
                        max_level: s.max_level,
                        progress: s.progress,
                    },
                )
            })
            .collect();
        Self { tiles }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reveal_creates_center_and_six_neighbors() {
        let mut map = TileMap::new();
        map.reveal(Hex::ORIGIN);
        assert_eq!(map.len(), 7);
        map.reveal(Hex::ORIGIN);
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn entry_cost_tracks_max_level_not_current() {
        let mut map = TileMap::new();
        map.reveal(Hex::ORIGIN);
        let tile = map.get_mut(Hex::ORIGIN).unwrap();
        tile.max_level = 4;
        tile.current_level = 0; // vacated
        assert_eq!(map.entry_cost(Hex::ORIGIN), 4);
        assert_eq!(map.entry_cost(Hex::new(50, 50)), 1); // unrevealed
    }

    #[test]
    fn rank_gate_blocks_low_rank_agents() {
        let mut map = TileMap::new();
        map.reveal(Hex::ORIGIN);
        map.get_mut(Hex::ORIGIN).unwrap().max_level = 3;
        assert!(!map.passable_for(Hex::ORIGIN, 2));
        assert!(map.passable_for(Hex::ORIGIN, 3));
    }
}
