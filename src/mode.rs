use serde::{Deserialize, Serialize};

/// The three ways to sit at the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Bankroll on the line, side bets open, stats persisted.
    Real,
    /// Unlimited funds with a live strategy hint.
    Practice,
    /// Fixed bet, auto-deal, every decision graded against the chart.
    Testing,
}

/// What a mode switches on and off. All mode behavior flows through this
/// table; the engine never matches on `Mode` itself.
#[derive(Debug, Clone, Copy)]
pub struct ModeConfig {
    pub unlimited_funds: bool,
    pub allow_side_bets: bool,
    pub show_hints: bool,
    pub grade_actions: bool,
    pub fixed_bet: Option<i64>,
    pub bankroll_applies: bool,
    pub persist_stats: bool,
}

impl Mode {
    pub fn config(self) -> ModeConfig {
        match self {
            Mode::Real => ModeConfig {
                unlimited_funds: false,
                allow_side_bets: true,
                show_hints: false,
                grade_actions: false,
                fixed_bet: None,
                bankroll_applies: true,
                persist_stats: true,
            },
            Mode::Practice => ModeConfig {
                unlimited_funds: true,
                allow_side_bets: false,
                show_hints: true,
                grade_actions: false,
                fixed_bet: None,
                bankroll_applies: true,
                persist_stats: false,
            },
            Mode::Testing => ModeConfig {
                unlimited_funds: true,
                allow_side_bets: false,
                show_hints: false,
                grade_actions: true,
                fixed_bet: Some(10),
                bankroll_applies: false,
                persist_stats: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_mode_is_the_only_persisted_one() {
        assert!(Mode::Real.config().persist_stats);
        assert!(!Mode::Practice.config().persist_stats);
        assert!(!Mode::Testing.config().persist_stats);
    }

    #[test]
    fn side_bets_are_real_mode_only() {
        assert!(Mode::Real.config().allow_side_bets);
        assert!(!Mode::Practice.config().allow_side_bets);
        assert!(!Mode::Testing.config().allow_side_bets);
    }

    #[test]
    fn testing_mode_fixes_the_bet_and_freezes_the_bankroll() {
        let config = Mode::Testing.config();
        assert_eq!(config.fixed_bet, Some(10));
        assert!(!config.bankroll_applies);
        assert!(config.grade_actions);
        assert!(!config.show_hints);
    }

    #[test]
    fn practice_mode_hints_without_grading() {
        let config = Mode::Practice.config();
        assert!(config.show_hints);
        assert!(!config.grade_actions);
        assert!(config.unlimited_funds);
    }
}
