use serde::{Deserialize, Serialize};

use crate::Hex;

/// One pending entry in an agent's movement queue. An upgrade is a
/// queue entry in its own right so every consumer handles both cases
/// exhaustively instead of testing a flag on a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    /// Advance to an adjacent coordinate.
    Move { to: Hex },
    /// Stay put and run the growth state machine on the current tile.
    GrowInPlace,
}
