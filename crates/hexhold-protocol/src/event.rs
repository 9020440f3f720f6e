use serde::{Deserialize, Serialize};

use crate::{AgentId, GameStatus, Hex};

/// Gameplay events raised by the engine. The session layer renders these
/// into the bounded human-readable log that front-ends display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A tile reached a level it had held before (restore or catch-up).
    LevelUp {
        agent: AgentId,
        at: Hex,
        level: u32,
    },
    /// A tile's permanent high-water mark rose; the agent's rank may have too.
    RecordBroken {
        agent: AgentId,
        at: Hex,
        level: u32,
        new_rank: u32,
    },
    /// A record at level >= 2 consumed and reset the agent's upgrade cycle.
    CycleSpent { agent: AgentId, at: Hex },
    /// A queued path was aborted because its next step became occupied.
    MoveBlocked { agent: AgentId, at: Hex },
    /// The session reached a terminal state.
    GameEnded { status: GameStatus },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::LevelUp { agent, at, level } => {
                write!(f, "{agent} grew {at} to level {level}")
            }
            Event::RecordBroken {
                agent,
                at,
                level,
                new_rank,
            } => write!(
                f,
                "{agent} broke the record at {at}: level {level} (rank {new_rank})"
            ),
            Event::CycleSpent { agent, at } => {
                write!(f, "{agent} spent a full upgrade cycle at {at}")
            }
            Event::MoveBlocked { agent, at } => {
                write!(f, "{agent} was blocked at {at} and stopped")
            }
            Event::GameEnded { status } => match status {
                GameStatus::Won => write!(f, "victory!"),
                GameStatus::Lost { by } => write!(f, "defeat: {by} reached the target first"),
                GameStatus::InProgress => write!(f, "game over"),
            },
        }
    }
}
