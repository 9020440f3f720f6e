//! Per-tile growth state machine: eligibility gates, tick progression,
//! rewards, and the queue/rank bookkeeping that fires on record levels.
//!
//! `check_growth` is a pure decision function; `tick_growth` is the only
//! mutator and is called once per tick for an agent actively growing the
//! tile it stands on.

use hexhold_protocol::GrowthRefusal;

use crate::{agent::Agent, config::Tuning, tile::Tile};

/// What kind of level-up a growth attempt would be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthKind {
    /// Re-climbing toward an already-reached `max_level`.
    Restore,
    /// First capture of virgin land (level 0 -> 1).
    FirstCapture,
    /// Raising the tile's permanent high-water mark past 1.
    RecordBreak,
}

/// Coins and movement tokens credited for a completed level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reward {
    pub coins: u64,
    pub moves: u64,
}

/// Reward for completing `level`. Record-breaking levels pay squared in
/// the level so a new record always beats a repeat capture; restores pay
/// a tuned fraction of that.
pub fn reward(level: u32, kind: GrowthKind, tuning: &Tuning) -> Reward {
    let level64 = level as u64;
    let record_coins = level64 * level64 * tuning.coin_reward_base;
    let coins = match kind {
        GrowthKind::Restore => record_coins * tuning.restore_reward_pct / 100,
        GrowthKind::FirstCapture | GrowthKind::RecordBreak => record_coins,
    };
    Reward {
        coins,
        moves: level64 * tuning.move_reward_per_level,
    }
}

/// Decide whether `agent` may grow `tile` to its next level. Pure: never
/// mutates, and reports which gate blocked a refused attempt.
pub fn check_growth(tile: &Tile, agent: &Agent, tuning: &Tuning) -> Result<GrowthKind, GrowthRefusal> {
    let target = tile.current_level + 1;

    // Restoring a previously-reached level is always allowed.
    if target <= tile.max_level {
        return Ok(GrowthKind::Restore);
    }

    // New record. Virgin land is free game.
    if target == 1 {
        return Ok(GrowthKind::FirstCapture);
    }

    // Record past level 1: the cycle lock and the rank gate both apply.
    if !agent.cycle_full(tuning) {
        return Err(GrowthRefusal::CycleIncomplete);
    }
    if agent.player_level < target - 1 {
        return Err(GrowthRefusal::RankTooLow);
    }
    Ok(GrowthKind::RecordBreak)
}

/// Outcome of one completed level-up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub new_level: u32,
    pub kind: GrowthKind,
    pub reward: Reward,
    pub new_rank: u32,
    /// Whether the tile still has head-room below its own `max_level`,
    /// i.e. the agent keeps catching up without a fresh decision.
    pub keep_growing: bool,
}

/// Advance growth by one tick. Returns `Err` if the attempt is gated,
/// `Ok(None)` if progress accumulated without completing a level, and
/// `Ok(Some(..))` when a level-up fired (reward already credited and all
/// queue/rank bookkeeping applied).
pub fn tick_growth(
    tile: &mut Tile,
    agent: &mut Agent,
    tuning: &Tuning,
) -> Result<Option<LevelUp>, GrowthRefusal> {
    let kind = check_growth(tile, agent, tuning)?;
    let target = tile.current_level + 1;

    tile.progress += 1;
    if tile.progress < tuning.ticks_to_grow(target) {
        return Ok(None);
    }

    tile.current_level = target;
    tile.progress = 0;

    if target > tile.max_level {
        tile.max_level = target;
        match kind {
            GrowthKind::FirstCapture => agent.push_recent_upgrade(agent.position, tuning),
            // A record past level 1 consumes the whole cycle.
            GrowthKind::RecordBreak => agent.recent_upgrades.clear(),
            GrowthKind::Restore => {}
        }
        agent.player_level = agent.player_level.max(target);
    }

    let pay = reward(target, kind, tuning);
    agent.credit(pay.coins, pay.moves);

    Ok(Some(LevelUp {
        new_level: target,
        kind,
        reward: pay,
        new_rank: agent.player_level,
        keep_growing: tile.current_level < tile.max_level,
    }))
}
