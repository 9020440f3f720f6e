//! The command surface front-ends talk to: session lifecycle, player
//! commands with pending-confirmation for coin spends, the bounded
//! human-readable log, and the leaderboard hand-off on session end.

use std::collections::VecDeque;

use hexhold_protocol::{
    Command, CommandRefusal, GameResult, GameStatus, Hex, MoveRefusal, Snapshot, WinCondition,
};

use crate::{
    config::Tuning,
    engine::{Engine, MovePlan, StepOutcome},
    storage::ScoreStore,
};

const LOG_CAP: usize = 32;

/// What a successfully executed command did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    SessionStarted,
    SessionEnded { status: GameStatus },
    GrowthToggled { growing: bool },
    /// The move was free (covered by movement tokens) and is committed.
    MoveCommitted { steps: usize },
    /// The move needs coins; call ConfirmPending or CancelPending.
    ConfirmationRequired { coin_cost: u64 },
    PendingCancelled,
    Stepped { to: Option<Hex> },
    Ticked { status: GameStatus },
}

pub struct Session<S: ScoreStore> {
    display_name: String,
    tuning: Tuning,
    store: S,
    engine: Option<Engine>,
    pending: Option<MovePlan>,
    log: VecDeque<String>,
    /// How many engine events have been rendered into the log so far.
    drained_events: u64,
    /// Guards double-recording on abandon-after-victory.
    recorded: bool,
    seed: u64,
}

impl<S: ScoreStore> Session<S> {
    pub fn new(display_name: impl Into<String>, tuning: Tuning, store: S, seed: u64) -> Self {
        Self {
            display_name: display_name.into(),
            tuning,
            store,
            engine: None,
            pending: None,
            log: VecDeque::new(),
            drained_events: 0,
            recorded: false,
            seed,
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<CommandOutcome, CommandRefusal> {
        match command {
            Command::StartSession { win } => self.start(win),
            Command::AbandonSession => self.abandon(),
            Command::ToggleGrowth => self.toggle_growth(),
            Command::AttemptMove { target } => self.attempt_move(target),
            Command::ConfirmPending => self.confirm_pending(),
            Command::CancelPending => self.cancel_pending(),
            Command::AdvanceStep => self.advance_step(),
            Command::Tick => self.tick(),
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.engine.as_ref().map(Engine::snapshot)
    }

    pub fn status(&self) -> Option<GameStatus> {
        self.engine.as_ref().map(Engine::status)
    }

    pub fn pending_coin_cost(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.coin_cost)
    }

    /// Recent log lines, newest first.
    pub fn recent_log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().rev().map(String::as_str)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------

    fn start(&mut self, win: WinCondition) -> Result<CommandOutcome, CommandRefusal> {
        if matches!(self.status(), Some(GameStatus::InProgress)) {
            return Err(CommandRefusal::SessionAlreadyRunning);
        }
        self.engine = Some(Engine::new(win, self.tuning.clone(), self.seed));
        self.pending = None;
        self.drained_events = 0;
        self.recorded = false;
        self.log.clear();
        self.push_log("session started".to_string());
        Ok(CommandOutcome::SessionStarted)
    }

    fn abandon(&mut self) -> Result<CommandOutcome, CommandRefusal> {
        let engine = self.engine.take().ok_or(CommandRefusal::NoSession)?;
        let status = engine.status();
        self.record_result(&engine);
        self.pending = None;
        self.push_log("session abandoned".to_string());
        Ok(CommandOutcome::SessionEnded { status })
    }

    fn toggle_growth(&mut self) -> Result<CommandOutcome, CommandRefusal> {
        let engine = self.live_engine_mut()?;
        let growing = engine.toggle_player_growth().map_err(CommandRefusal::Growth)?;
        Ok(CommandOutcome::GrowthToggled { growing })
    }

    fn attempt_move(&mut self, target: Hex) -> Result<CommandOutcome, CommandRefusal> {
        let engine = self.live_engine_mut()?;
        let plan = engine.plan_player_move(target).map_err(CommandRefusal::Move)?;

        if plan.coin_cost == 0 {
            let steps = plan.path.steps.len();
            engine.commit_player_path(&plan);
            self.pending = None;
            Ok(CommandOutcome::MoveCommitted { steps })
        } else {
            let coin_cost = plan.coin_cost;
            self.pending = Some(plan);
            Ok(CommandOutcome::ConfirmationRequired { coin_cost })
        }
    }

    fn confirm_pending(&mut self) -> Result<CommandOutcome, CommandRefusal> {
        let plan = self.pending.take().ok_or(CommandRefusal::NothingPending)?;
        let engine = self.live_engine_mut()?;
        // Revalidate: the world moved while the confirmation was open.
        let fresh = engine
            .plan_player_move(*plan.path.steps.last().expect("planned path is never empty"))
            .map_err(CommandRefusal::Move)?;
        let steps = fresh.path.steps.len();
        engine.commit_player_path(&fresh);
        Ok(CommandOutcome::MoveCommitted { steps })
    }

    fn cancel_pending(&mut self) -> Result<CommandOutcome, CommandRefusal> {
        self.pending.take().ok_or(CommandRefusal::NothingPending)?;
        Ok(CommandOutcome::PendingCancelled)
    }

    fn advance_step(&mut self) -> Result<CommandOutcome, CommandRefusal> {
        let engine = self.live_engine_mut()?;
        match engine.advance_player_step() {
            Ok(StepOutcome::Moved(to)) => Ok(CommandOutcome::Stepped { to: Some(to) }),
            Ok(_) => Ok(CommandOutcome::Stepped { to: None }),
            Err(refusal) => {
                self.drain_engine_log();
                if refusal == MoveRefusal::PathBlocked {
                    self.push_log("path blocked; route cancelled".to_string());
                }
                Err(CommandRefusal::Move(refusal))
            }
        }
    }

    fn tick(&mut self) -> Result<CommandOutcome, CommandRefusal> {
        let engine = self.engine.as_mut().ok_or(CommandRefusal::NoSession)?;
        engine.tick();
        let status = engine.status();
        self.drain_engine_log();
        if status.is_terminal() {
            self.record_current();
        }
        Ok(CommandOutcome::Ticked { status })
    }

    // -------------------------------------------------------------------

    fn live_engine_mut(&mut self) -> Result<&mut Engine, CommandRefusal> {
        let engine = self.engine.as_mut().ok_or(CommandRefusal::NoSession)?;
        if engine.status().is_terminal() {
            return Err(CommandRefusal::SessionOver);
        }
        Ok(engine)
    }

    fn record_result(&mut self, engine: &Engine) {
        if self.recorded {
            return;
        }
        self.recorded = true;
        let player = engine.player();
        self.store.record_score(&GameResult {
            display_name: self.display_name.clone(),
            total_coins_earned: player.total_coins_earned,
            player_level: player.player_level,
            status: engine.status(),
            ticks: engine.tick_count(),
        });
    }

    /// Like [`Self::record_result`] but for the engine still held in
    /// `self.engine`; reads and writes stay on disjoint fields.
    fn record_current(&mut self) {
        if self.recorded {
            return;
        }
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let player = engine.player();
        let result = GameResult {
            display_name: self.display_name.clone(),
            total_coins_earned: player.total_coins_earned,
            player_level: player.player_level,
            status: engine.status(),
            ticks: engine.tick_count(),
        };
        self.recorded = true;
        self.store.record_score(&result);
    }

    /// Append engine events raised since the last drain to the readable
    /// log, oldest first. Session-only lines already in the log stay.
    fn drain_engine_log(&mut self) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        let total = engine.event_count();
        let fresh = (total.saturating_sub(self.drained_events) as usize).min(LOG_CAP);
        let lines: Vec<String> = engine
            .recent_events()
            .take(fresh)
            .map(ToString::to_string)
            .collect();
        self.drained_events = total;
        // Newest-first from the engine; replay oldest-first into our log.
        for line in lines.into_iter().rev() {
            self.push_log(line);
        }
    }

    fn push_log(&mut self, line: String) {
        while self.log.len() >= LOG_CAP {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryScoreStore, ScoreStore};
    use hexhold_protocol::WinKind;

    fn session() -> Session<MemoryScoreStore> {
        Session::new("ada", Tuning::default(), MemoryScoreStore::new(), 11)
    }

    fn started() -> Session<MemoryScoreStore> {
        let mut s = session();
        s.execute(Command::StartSession {
            win: WinCondition {
                kind: WinKind::Wealth,
                target: 200,
                opponents: 1,
            },
        })
        .unwrap();
        s
    }

    #[test]
    fn commands_require_a_session() {
        let mut s = session();
        assert_eq!(
            s.execute(Command::Tick),
            Err(CommandRefusal::NoSession)
        );
        assert_eq!(
            s.execute(Command::ToggleGrowth),
            Err(CommandRefusal::NoSession)
        );
    }

    #[test]
    fn double_start_is_refused() {
        let mut s = started();
        assert_eq!(
            s.execute(Command::StartSession {
                win: WinCondition::default()
            }),
            Err(CommandRefusal::SessionAlreadyRunning)
        );
    }

    #[test]
    fn free_move_commits_immediately() {
        let mut s = started();
        let outcome = s
            .execute(Command::AttemptMove {
                target: Hex::new(1, 0),
            })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::MoveCommitted { steps: 1 });
        assert_eq!(
            s.execute(Command::AdvanceStep).unwrap(),
            CommandOutcome::Stepped {
                to: Some(Hex::new(1, 0))
            }
        );
    }

    #[test]
    fn expensive_move_raises_confirmation() {
        let mut s = started();
        {
            let engine = s.engine.as_mut().unwrap();
            engine.agents_mut()[0].moves = 0;
            engine.agents_mut()[0].coins = 10;
        }
        let outcome = s
            .execute(Command::AttemptMove {
                target: Hex::new(1, 0),
            })
            .unwrap();
        assert_eq!(outcome, CommandOutcome::ConfirmationRequired { coin_cost: 2 });
        assert_eq!(s.pending_coin_cost(), Some(2));

        let outcome = s.execute(Command::ConfirmPending).unwrap();
        assert_eq!(outcome, CommandOutcome::MoveCommitted { steps: 1 });
        assert_eq!(s.pending_coin_cost(), None);
    }

    #[test]
    fn cancel_clears_pending_without_moving() {
        let mut s = started();
        {
            let engine = s.engine.as_mut().unwrap();
            engine.agents_mut()[0].moves = 0;
            engine.agents_mut()[0].coins = 10;
        }
        s.execute(Command::AttemptMove {
            target: Hex::new(1, 0),
        })
        .unwrap();
        assert_eq!(
            s.execute(Command::CancelPending).unwrap(),
            CommandOutcome::PendingCancelled
        );
        assert!(s.snapshot().unwrap().agents[0].queue.is_empty());
        assert_eq!(
            s.execute(Command::ConfirmPending),
            Err(CommandRefusal::NothingPending)
        );
    }

    #[test]
    fn unaffordable_move_is_refused_structurally() {
        let mut s = started();
        {
            let engine = s.engine.as_mut().unwrap();
            engine.agents_mut()[0].moves = 0;
            engine.agents_mut()[0].coins = 1;
        }
        assert_eq!(
            s.execute(Command::AttemptMove {
                target: Hex::new(2, 0)
            }),
            Err(CommandRefusal::Move(MoveRefusal::InsufficientResources))
        );
    }

    #[test]
    fn abandon_records_the_result() {
        let mut s = started();
        s.execute(Command::Tick).unwrap();
        s.execute(Command::AbandonSession).unwrap();
        let rows = s.store().top_scores(10);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "ada");
    }

    #[test]
    fn victory_records_exactly_once() {
        let mut s = started();
        s.engine.as_mut().unwrap().agents_mut()[0].total_coins_earned = 200;
        s.execute(Command::Tick).unwrap();
        assert_eq!(s.status(), Some(GameStatus::Won));
        // Further ticks and the final abandon must not duplicate the row.
        s.execute(Command::Tick).unwrap();
        s.execute(Command::AbandonSession).unwrap();
        assert_eq!(s.store().top_scores(10).len(), 1);
    }

    #[test]
    fn session_lines_survive_event_drains() {
        let mut s = started();
        s.execute(Command::ToggleGrowth).unwrap();
        for _ in 0..10 {
            s.execute(Command::Tick).unwrap();
        }
        // The start marker predates every engine event and must still be
        // in the log after ticks drained them in.
        assert!(s.recent_log().any(|l| l.contains("session started")));
    }

    #[test]
    fn log_reports_level_ups_newest_first() {
        let mut s = started();
        s.execute(Command::ToggleGrowth).unwrap();
        for _ in 0..10 {
            s.execute(Command::Tick).unwrap();
        }
        let first = s.recent_log().next().unwrap().to_string();
        assert!(first.contains("level") || first.contains("record"), "{first}");
    }
}
