//! Structured refusal reasons. Every failure inside the simulation core is
//! recoverable and local; these enums are the whole error surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a growth attempt was refused. State is unchanged on refusal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum GrowthRefusal {
    #[error("upgrade cycle incomplete: capture more new tiles first")]
    CycleIncomplete,
    #[error("rank too low for this level")]
    RankTooLow,
}

/// Why a move attempt was refused. State is unchanged on refusal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum MoveRefusal {
    #[error("rank too low to enter the target tile")]
    RankTooLow,
    #[error("no open path to the target")]
    PathBlocked,
    #[error("not enough moves or coins for this trip")]
    InsufficientResources,
}

/// Session-level command failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum CommandRefusal {
    #[error("no session in progress")]
    NoSession,
    #[error("session already running")]
    SessionAlreadyRunning,
    #[error("session has ended")]
    SessionOver,
    #[error("no pending action to resolve")]
    NothingPending,
    #[error(transparent)]
    Move(#[from] MoveRefusal),
    #[error(transparent)]
    Growth(#[from] GrowthRefusal),
}
