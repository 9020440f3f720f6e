//! Game-balance tunables. Everything here is data, not structure: the
//! growth curve, reward scaling, and AI weights are deliberately plain
//! numbers so balance runs can sweep them without touching code.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TuningLoadError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Core simulation tunables.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Capacity of the recent-upgrades queue; a full queue unlocks
    /// record-breaking upgrades ("cycle lock").
    pub cycle_capacity: usize,
    /// Coins per movement token when converting.
    pub move_exchange_rate: u64,
    /// Ticks to grow a tile to level 1.
    pub grow_ticks_base: u32,
    /// Extra ticks per level above 1.
    pub grow_ticks_per_level: u32,
    /// Coin reward = level^2 * this for record-breaking levels.
    pub coin_reward_base: u64,
    /// Movement-token reward per level gained.
    pub move_reward_per_level: u64,
    /// Fraction (percent) of the record reward paid for merely restoring
    /// a previously-reached level.
    pub restore_reward_pct: u64,
    /// Heap-pop budget for one pathfinder query; exhaustion means "no path".
    pub path_budget: usize,
    /// Ticks between bot decision points.
    pub decision_interval: u32,
    /// Distance from the origin at which bots spawn.
    pub spawn_distance: i32,
    /// Starting resources for every agent.
    pub starting_moves: u64,
    pub starting_coins: u64,
    pub ai: AiWeights,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            cycle_capacity: 3,
            move_exchange_rate: 2,
            grow_ticks_base: 3,
            grow_ticks_per_level: 2,
            coin_reward_base: 5,
            move_reward_per_level: 2,
            restore_reward_pct: 40,
            path_budget: 4096,
            decision_interval: 4,
            spawn_distance: 6,
            starting_moves: 10,
            starting_coins: 6,
            ai: AiWeights::default(),
        }
    }
}

impl Tuning {
    /// Ticks of accumulated progress needed to reach `target_level`.
    /// Monotonic in the target level.
    pub fn ticks_to_grow(&self, target_level: u32) -> u32 {
        self.grow_ticks_base + self.grow_ticks_per_level * target_level.saturating_sub(1)
    }

    /// Load tunables from a YAML file; missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, TuningLoadError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Opponent-AI utility weights. All independently tunable; the selfplay
/// harness exists to sweep these.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AiWeights {
    /// Multiplier on the per-mode strategic value term.
    pub strategic: f64,
    /// Multiplier on the income term (`next_level^2`).
    pub income: f64,
    /// Distance penalty per hex of heuristic distance.
    pub distance: f64,
    /// Distance penalty used in Expand mode (nearest virgin land wins).
    pub distance_expand: f64,
    /// Flat penalty when the estimated trip cost meets or exceeds the
    /// agent's spendable budget. Large but soft, so emergency fallbacks
    /// still rank somewhere.
    pub risk: f64,
    /// Penalty per level above the mode's soft level cap.
    pub soft_cap: f64,
    /// Penalty for re-targeting a tile already in the upgrade queue
    /// (Expand mode only; a duplicate wastes a scarce slot).
    pub queue_duplicate: f64,
    /// Bonus per hex of proximity to the rival's last known position,
    /// applied only when resources are abundant.
    pub aggression: f64,
    /// Score head-start for growing in place instead of relocating.
    pub stay_bias: f64,
    /// Resource level considered "abundant" for aggression purposes.
    pub abundance_threshold: u64,
    /// Spendable-resource floor below which Survival mode engages.
    pub survival_threshold: u64,
    /// Rank below which Evolution mode engages.
    pub evolution_rank: u32,
    /// Spendable resources required for Development mode.
    pub development_resources: u64,
    /// Candidate scan radius (hexes); Survival uses the smaller one.
    pub search_radius: i32,
    pub survival_radius: i32,
    /// How many top-scored candidates get validated against the real
    /// pathfinder before the agent gives up this decision point.
    pub validate_top: usize,
    pub validate_top_survival: usize,
}

impl Default for AiWeights {
    fn default() -> Self {
        Self {
            strategic: 1.0,
            income: 0.6,
            distance: 1.5,
            distance_expand: 4.0,
            risk: 1000.0,
            soft_cap: 8.0,
            queue_duplicate: 25.0,
            aggression: 0.8,
            stay_bias: 6.0,
            abundance_threshold: 20,
            survival_threshold: 3,
            evolution_rank: 3,
            development_resources: 12,
            search_radius: 6,
            survival_radius: 3,
            validate_top: 3,
            validate_top_survival: 6,
        }
    }
}
