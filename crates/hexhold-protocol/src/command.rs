use serde::{Deserialize, Serialize};

use crate::{Hex, WinCondition};

/// All possible front-end→sim commands. Fully serializable.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Begin a fresh session with the given victory settings.
    StartSession { win: WinCondition },
    /// End the current session early; the result is still recorded.
    AbandonSession,
    /// Flip the player's grow-in-place flag on the current tile.
    ToggleGrowth,
    /// Plan and (if free) commit a path toward `target`. A move that
    /// needs coin spend raises a pending confirmation instead.
    AttemptMove { target: Hex },
    /// Resolve a pending coin-spend confirmation.
    ConfirmPending,
    CancelPending,
    /// Drain one entry of the player's movement queue.
    AdvanceStep,
    /// Advance the whole world by one discrete step.
    Tick,
}
