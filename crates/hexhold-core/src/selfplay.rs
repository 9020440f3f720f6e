//! Headless self-play harness for balance tuning.
//!
//! Runs fully autonomous games (the player slot is driven by the same
//! opponent AI) and collects metrics for sweeping reward curves and AI
//! weights.

use hexhold_protocol::{AgentId, GameStatus, WinCondition};
use serde::{Deserialize, Serialize};

use crate::{config::Tuning, engine::Engine};

/// Configuration for one self-play run.
#[derive(Clone, Debug)]
pub struct SelfPlayConfig {
    pub win: WinCondition,
    /// Random seed for determinism.
    pub seed: u64,
    /// Ticks before declaring a draw.
    pub max_ticks: u64,
    pub tuning: Tuning,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            win: WinCondition::default(),
            seed: 42,
            max_ticks: 5_000,
            tuning: Tuning::default(),
        }
    }
}

/// How a self-play game ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfPlayOutcome {
    /// An agent reached the victory target.
    TargetReached { by: AgentId },
    /// Tick limit hit with no winner.
    Draw,
}

/// Per-agent statistics for one game.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentStats {
    pub agent: u8,
    pub final_rank: u32,
    pub coins_earned: u64,
    pub records_broken: u32,
}

/// Metrics collected during one self-play game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SelfPlayResult {
    pub outcome: SelfPlayOutcome,
    pub ticks_played: u64,
    pub tiles_discovered: usize,
    pub agents: Vec<AgentStats>,
}

/// Run one deterministic AI-vs-AI game.
pub fn run_selfplay(config: &SelfPlayConfig) -> SelfPlayResult {
    let mut engine = Engine::new(config.win, config.tuning.clone(), config.seed);

    while engine.status() == GameStatus::InProgress && engine.tick_count() < config.max_ticks {
        engine.auto_player();
        engine.tick();
    }

    let outcome = match engine.status() {
        GameStatus::Won => SelfPlayOutcome::TargetReached {
            by: AgentId::PLAYER,
        },
        GameStatus::Lost { by } => SelfPlayOutcome::TargetReached { by },
        GameStatus::InProgress => SelfPlayOutcome::Draw,
    };

    let tiles_discovered = engine.map().len();
    let agents = engine
        .agents()
        .iter()
        .map(|a| AgentStats {
            agent: a.id.0,
            final_rank: a.player_level,
            coins_earned: a.total_coins_earned,
            records_broken: engine.records_broken(a.id),
        })
        .collect();

    SelfPlayResult {
        outcome,
        ticks_played: engine.tick_count(),
        tiles_discovered,
        agents,
    }
}

/// Aggregate over a batch of seeds.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub games: u32,
    pub draws: u32,
    pub wins_by_agent: Vec<u32>,
    pub mean_ticks: f64,
    pub mean_tiles_discovered: f64,
}

pub fn run_batch_selfplay(base: &SelfPlayConfig, games: u32) -> AggregateMetrics {
    let mut out = AggregateMetrics {
        games,
        wins_by_agent: vec![0; base.win.opponents as usize + 1],
        ..AggregateMetrics::default()
    };
    let mut total_ticks = 0_u64;
    let mut total_tiles = 0_usize;

    for i in 0..games {
        let config = SelfPlayConfig {
            seed: base.seed.wrapping_add(i as u64),
            ..base.clone()
        };
        let result = run_selfplay(&config);
        total_ticks += result.ticks_played;
        total_tiles += result.tiles_discovered;
        match result.outcome {
            SelfPlayOutcome::TargetReached { by } => out.wins_by_agent[by.0 as usize] += 1,
            SelfPlayOutcome::Draw => out.draws += 1,
        }
    }

    if games > 0 {
        out.mean_ticks = total_ticks as f64 / games as f64;
        out.mean_tiles_discovered = total_tiles as f64 / games as f64;
    }
    out
}
