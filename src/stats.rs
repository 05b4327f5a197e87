use serde::{Deserialize, Serialize};

use crate::session::SessionStats;

// Quiet period before a dirty session is written out.
pub const SAVE_DEBOUNCE_MS: f64 = 2000.0;

/// The record the stats repository stores. Cumulative across sessions; the
/// snake_case field names are part of the external contract and must not
/// drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsRecord {
    pub bankroll: i64,
    pub hands_played: u32,
    pub hands_won: u32,
    pub hands_lost: u32,
    pub hands_pushed: u32,
    pub total_moves: u32,
    pub strategy_decisions: u32,
    pub strategy_correct: u32,
    pub strategy_streak: u32,
}

impl StatsRecord {
    pub fn with_bankroll(bankroll: i64) -> Self {
        StatsRecord {
            bankroll,
            ..StatsRecord::default()
        }
    }
}

/// Schedules debounced writes of the cumulative record. The clock is
/// injected by the caller in milliseconds; every write carries absolute
/// totals, never deltas, so repeating one is harmless.
#[derive(Debug)]
pub struct StatsSync {
    initial: StatsRecord,
    dirty: bool,
    last_change_ms: f64,
}

impl StatsSync {
    pub fn new(default_bankroll: i64) -> Self {
        StatsSync {
            initial: StatsRecord::with_bankroll(default_bankroll),
            dirty: false,
            last_change_ms: 0.0,
        }
    }

    pub fn load(&mut self, record: StatsRecord) {
        self.initial = record;
    }

    pub fn mark_dirty(&mut self, now_ms: f64) {
        self.dirty = true;
        self.last_change_ms = now_ms;
    }

    // Loaded totals plus this session's deltas; the streak keeps the best
    // of the stored and live values.
    pub fn cumulative(&self, session: &SessionStats, bankroll: i64) -> StatsRecord {
        StatsRecord {
            bankroll,
            hands_played: self.initial.hands_played + session.hands_played,
            hands_won: self.initial.hands_won + session.hands_won,
            hands_lost: self.initial.hands_lost + session.hands_lost,
            hands_pushed: self.initial.hands_pushed + session.hands_pushed,
            total_moves: self.initial.total_moves + session.total_moves,
            strategy_decisions: self.initial.strategy_decisions + session.strategy_decisions,
            strategy_correct: self.initial.strategy_correct + session.strategy_correct,
            strategy_streak: self.initial.strategy_streak.max(session.strategy_streak),
        }
    }

    /// Yields a record once the quiet period has elapsed since the last
    /// change; rapid successive changes keep pushing the write out.
    pub fn poll(&mut self, now_ms: f64, session: &SessionStats, bankroll: i64) -> Option<StatsRecord> {
        if self.dirty && now_ms - self.last_change_ms >= SAVE_DEBOUNCE_MS {
            self.dirty = false;
            Some(self.cumulative(session, bankroll))
        } else {
            None
        }
    }

    // Unconditional write, for round completion and exit.
    pub fn flush(&mut self, session: &SessionStats, bankroll: i64) -> StatsRecord {
        self.dirty = false;
        self.cumulative(session, bankroll)
    }
}
