use serde::{Deserialize, Serialize};

use crate::{AgentId, GameStatus, Hex, Role, Step, WinCondition};

/// Full game state for front-end sync or save/restore. Restoring a
/// snapshot and ticking must match ticking the live state; `rng_state`
/// exists so that holds for randomized decisions too.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub status: GameStatus,
    pub win: WinCondition,
    pub tiles: Vec<TileSnapshot>,
    pub agents: Vec<AgentSnapshot>,
    pub rng_state: [u8; 32],
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub at: Hex,
    pub current_level: u32,
    pub max_level: u32,
    pub progress: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub role: Role,
    pub position: Hex,
    pub player_level: u32,
    pub coins: u64,
    pub total_coins_earned: u64,
    pub moves: u64,
    pub recent_upgrades: Vec<Hex>,
    pub queue: Vec<Step>,
    pub growing: bool,
    #[serde(default)]
    pub last_seen_rival: Option<Hex>,
    #[serde(default)]
    pub decision_cooldown: u32,
}
