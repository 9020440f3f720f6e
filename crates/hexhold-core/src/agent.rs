use std::collections::VecDeque;

use hexhold_protocol::{AgentId, AgentSnapshot, Hex, Role, Step};

use crate::config::Tuning;

/// One agent on the grid: the player or an autonomous opponent.
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub role: Role,
    pub position: Hex,
    /// Highest `max_level` this agent has ever produced on any tile.
    /// Global rank: gates both movement and record-breaking upgrades.
    pub player_level: u32,
    pub coins: u64,
    pub total_coins_earned: u64,
    /// Movement tokens.
    pub moves: u64,
    /// Bounded FIFO of tiles whose first capture filled a cycle slot.
    pub recent_upgrades: VecDeque<Hex>,
    /// Pending steps; the head may be a grow-in-place instruction.
    pub queue: VecDeque<Step>,
    pub growing: bool,
    /// AI memory: rival's position at the last tick.
    pub last_seen_rival: Option<Hex>,
    /// Ticks until the next AI decision point.
    pub decision_cooldown: u32,
}

impl Agent {
    pub fn new(id: AgentId, role: Role, position: Hex, tuning: &Tuning) -> Self {
        Self {
            id,
            role,
            position,
            player_level: 0,
            coins: tuning.starting_coins,
            total_coins_earned: 0,
            moves: tuning.starting_moves,
            recent_upgrades: VecDeque::with_capacity(tuning.cycle_capacity),
            queue: VecDeque::new(),
            growing: false,
            last_seen_rival: None,
            decision_cooldown: 0,
        }
    }

    /// Single affordability budget: movement tokens plus coins converted
    /// at the exchange rate. Whole moves only.
    pub fn spendable(&self, tuning: &Tuning) -> u64 {
        self.moves + self.coins / tuning.move_exchange_rate
    }

    /// Pay `cost` movement, tokens first, then coins at the exchange
    /// rate. Refuses (and leaves state untouched) rather than allowing a
    /// fractional conversion.
    pub fn pay_movement(&mut self, cost: u64, tuning: &Tuning) -> bool {
        if self.moves >= cost {
            self.moves -= cost;
            return true;
        }
        let shortfall = cost - self.moves;
        let coin_cost = shortfall * tuning.move_exchange_rate;
        if self.coins < coin_cost {
            return false;
        }
        self.moves = 0;
        self.coins -= coin_cost;
        true
    }

    /// Idle recharge: convert as many coins to moves as the rate allows.
    /// Returns how many moves were gained.
    pub fn convert_coins_to_moves(&mut self, tuning: &Tuning) -> u64 {
        let gained = self.coins / tuning.move_exchange_rate;
        if gained > 0 {
            self.coins -= gained * tuning.move_exchange_rate;
            self.moves += gained;
        }
        gained
    }

    pub fn credit(&mut self, coins: u64, moves: u64) {
        self.coins += coins;
        self.total_coins_earned += coins;
        self.moves += moves;
    }

    /// Push a first-capture tile onto the cycle queue, evicting the
    /// oldest entry at capacity.
    pub fn push_recent_upgrade(&mut self, at: Hex, tuning: &Tuning) {
        while self.recent_upgrades.len() >= tuning.cycle_capacity {
            self.recent_upgrades.pop_front();
        }
        self.recent_upgrades.push_back(at);
    }

    pub fn cycle_full(&self, tuning: &Tuning) -> bool {
        self.recent_upgrades.len() >= tuning.cycle_capacity
    }

    pub fn abort_queue(&mut self) {
        self.queue.clear();
    }

    pub fn to_snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            role: self.role,
            position: self.position,
            player_level: self.player_level,
            coins: self.coins,
            total_coins_earned: self.total_coins_earned,
            moves: self.moves,
            recent_upgrades: self.recent_upgrades.iter().copied().collect(),
            queue: self.queue.iter().copied().collect(),
            growing: self.growing,
            last_seen_rival: self.last_seen_rival,
            decision_cooldown: self.decision_cooldown,
        }
    }

    pub fn from_snapshot(snap: &AgentSnapshot) -> Self {
        Self {
            id: snap.id,
            role: snap.role,
            position: snap.position,
            player_level: snap.player_level,
            coins: snap.coins,
            total_coins_earned: snap.total_coins_earned,
            moves: snap.moves,
            recent_upgrades: snap.recent_upgrades.iter().copied().collect(),
            queue: snap.queue.iter().copied().collect(),
            growing: snap.growing,
            last_seen_rival: snap.last_seen_rival,
            decision_cooldown: snap.decision_cooldown,
        }
    }
}
