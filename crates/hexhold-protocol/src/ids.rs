use serde::{Deserialize, Serialize};

/// Stable agent identity for one session. The player is always `AgentId(0)`;
/// bots are numbered from 1 in spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u8);

impl AgentId {
    pub const PLAYER: AgentId = AgentId(0);

    pub fn is_player(self) -> bool {
        self == Self::PLAYER
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_player() {
            write!(f, "player")
        } else {
            write!(f, "bot-{}", self.0)
        }
    }
}

/// Whether an agent is driven by commands or by the opponent AI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Bot,
}
