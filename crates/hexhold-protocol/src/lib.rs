//! Shared data types between the Hexhold simulation core and its
//! front-ends: coordinates, ids, commands, events, snapshots, win
//! conditions, and structured refusal reasons. No simulation logic.

mod command;
mod event;
mod hex;
mod ids;
mod refusal;
mod snapshot;
mod step;
mod victory;

pub use crate::command::Command;
pub use crate::event::Event;
pub use crate::hex::Hex;
pub use crate::ids::{AgentId, Role};
pub use crate::refusal::{CommandRefusal, GrowthRefusal, MoveRefusal};
pub use crate::snapshot::{AgentSnapshot, Snapshot, TileSnapshot};
pub use crate::step::Step;
pub use crate::victory::{GameResult, GameStatus, WinCondition, WinKind};
