//! Leaderboard storage as an injected collaborator. The simulation core
//! only ever hands results out through [`ScoreStore`]; storage, ranking,
//! and display live behind the trait, with lifecycle owned by whoever
//! builds the session.

use std::collections::HashMap;

use hexhold_protocol::GameResult;
use serde::{Deserialize, Serialize};

/// A known player profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub best_coins: u64,
    pub best_level: u32,
    pub games_played: u32,
}

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub name: String,
    pub total_coins_earned: u64,
    pub player_level: u32,
}

pub trait ScoreStore {
    fn find_user(&self, name: &str) -> Option<UserRecord>;
    fn upsert_user(&mut self, record: UserRecord);
    fn record_score(&mut self, result: &GameResult);
    /// Best scores, highest coins first, at most `limit` rows.
    fn top_scores(&self, limit: usize) -> Vec<ScoreRow>;
}

/// In-memory store for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    users: HashMap<String, UserRecord>,
    scores: Vec<ScoreRow>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn find_user(&self, name: &str) -> Option<UserRecord> {
        self.users.get(name).cloned()
    }

    fn upsert_user(&mut self, record: UserRecord) {
        self.users.insert(record.name.clone(), record);
    }

    fn record_score(&mut self, result: &GameResult) {
        let user = self
            .users
            .entry(result.display_name.clone())
            .or_insert_with(|| UserRecord {
                name: result.display_name.clone(),
                best_coins: 0,
                best_level: 0,
                games_played: 0,
            });
        user.games_played += 1;
        user.best_coins = user.best_coins.max(result.total_coins_earned);
        user.best_level = user.best_level.max(result.player_level);

        self.scores.push(ScoreRow {
            name: result.display_name.clone(),
            total_coins_earned: result.total_coins_earned,
            player_level: result.player_level,
        });
    }

    fn top_scores(&self, limit: usize) -> Vec<ScoreRow> {
        let mut rows = self.scores.clone();
        rows.sort_by(|a, b| {
            b.total_coins_earned
                .cmp(&a.total_coins_earned)
                .then(b.player_level.cmp(&a.player_level))
                .then(a.name.cmp(&b.name))
        });
        rows.truncate(limit);
        rows
    }
}
