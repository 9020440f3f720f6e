//! Win conditions, terminal status, and the leaderboard hand-off record.

use serde::{Deserialize, Serialize};

use crate::AgentId;

/// Which resource races toward the victory target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WinKind {
    /// First agent whose lifetime coin earnings reach the target.
    Wealth,
    /// First agent whose rank (highest level ever produced) reaches the target.
    Domination,
}

/// Victory settings for a session. Immutable once the session starts.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WinCondition {
    pub kind: WinKind,
    pub target: u64,
    /// Number of autonomous opponents spawned at session start.
    pub opponents: u8,
}

impl Default for WinCondition {
    fn default() -> Self {
        Self {
            kind: WinKind::Wealth,
            target: 500,
            opponents: 1,
        }
    }
}

/// Session status. Terminal states freeze all gameplay mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost { by: AgentId },
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// Final outcome supplied to the leaderboard collaborator when a session
/// ends, is won, or is abandoned.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameResult {
    pub display_name: String,
    pub total_coins_earned: u64,
    pub player_level: u32,
    pub status: GameStatus,
    pub ticks: u64,
}
