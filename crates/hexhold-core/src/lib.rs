//! Hexhold simulation core.
//!
//! A single-threaded, discrete-time territory game over an implicitly
//! infinite hex grid: agents capture and upgrade tiles, spend a dual
//! currency to travel, and race to a configurable victory target. The
//! scheduler exclusively owns all mutable state; the pathfinder and the
//! opponent AI read snapshots plus an explicit obstacle set and return
//! proposals the scheduler may commit.

mod agent;
pub mod ai;
mod config;
mod engine;
mod growth;
pub mod pathfind;
mod rng;
pub mod selfplay;
mod session;
mod storage;
mod tile;

pub use crate::agent::Agent;
pub use crate::config::{AiWeights, Tuning, TuningLoadError};
pub use crate::engine::{Engine, MovePlan, StepOutcome};
pub use crate::growth::{check_growth, reward, tick_growth, GrowthKind, LevelUp, Reward};
pub use crate::rng::GameRng;
pub use crate::session::{CommandOutcome, Session};
pub use crate::storage::{MemoryScoreStore, ScoreRow, ScoreStore, UserRecord};
pub use crate::tile::{Tile, TileMap};
