use serde::Serialize;

use crate::strategy::{Action, Recommendation};

/// Counters accumulated across rounds within one session. Monotonic except
/// the streak, which resets on any incorrect decision.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub hands_played: u32,
    pub hands_won: u32,
    pub hands_lost: u32,
    pub hands_pushed: u32,
    pub total_moves: u32,
    pub strategy_decisions: u32,
    pub strategy_correct: u32,
    pub strategy_streak: u32,
}

impl SessionStats {
    pub fn record_move(&mut self) {
        self.total_moves += 1;
    }

    pub fn record_outcomes(&mut self, won: u32, lost: u32, pushed: u32) {
        self.hands_played += won + lost + pushed;
        self.hands_won += won;
        self.hands_lost += lost;
        self.hands_pushed += pushed;
    }

    pub fn record_decision(&mut self, correct: bool) {
        self.strategy_decisions += 1;
        if correct {
            self.strategy_correct += 1;
            self.strategy_streak += 1;
        } else {
            self.strategy_streak = 0;
        }
    }

    // Wins over decided hands; pushes do not count against the player.
    pub fn win_rate(&self) -> f64 {
        let decided = self.hands_won + self.hands_lost;
        if decided == 0 {
            0.0
        } else {
            self.hands_won as f64 / decided as f64
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.strategy_decisions == 0 {
            0.0
        } else {
            self.strategy_correct as f64 / self.strategy_decisions as f64
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionFeedback {
    pub is_correct: bool,
    pub player_action: Action,
    pub recommended_action: Action,
    pub reason: &'static str,
}

/// Grades player decisions against the oracle, at most once per decision
/// state: re-grading the same state with nothing changed in between is
/// suppressed.
#[derive(Debug, Default)]
pub struct DecisionGrader {
    last_state: Option<String>,
    round_decisions: u32,
    round_correct: u32,
}

impl DecisionGrader {
    pub fn grade(
        &mut self,
        state_key: String,
        chosen: Action,
        recommended: Recommendation,
        stats: &mut SessionStats,
    ) -> Option<ActionFeedback> {
        if self.last_state.as_deref() == Some(state_key.as_str()) {
            return None;
        }
        self.last_state = Some(state_key);

        let is_correct = chosen == recommended.action;
        self.round_decisions += 1;
        if is_correct {
            self.round_correct += 1;
        }
        stats.record_decision(is_correct);

        Some(ActionFeedback {
            is_correct,
            player_action: chosen,
            recommended_action: recommended.action,
            reason: recommended.reason,
        })
    }

    // Decision/correct counts for the round in progress.
    pub fn round_counts(&self) -> (u32, u32) {
        (self.round_decisions, self.round_correct)
    }

    pub fn reset_round(&mut self) {
        self.round_decisions = 0;
        self.round_correct = 0;
        self.last_state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::recommend;

    #[test]
    fn win_rate_excludes_pushes() {
        let mut stats = SessionStats::default();
        stats.record_outcomes(3, 1, 6);
        assert_eq!(stats.hands_played, 10);
        assert!((stats.win_rate() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn win_rate_zero_when_nothing_decided() {
        let mut stats = SessionStats::default();
        stats.record_outcomes(0, 0, 2);
        assert_eq!(stats.win_rate(), 0.0);
    }

    #[test]
    fn streak_resets_on_incorrect_decision() {
        let mut stats = SessionStats::default();
        stats.record_decision(true);
        stats.record_decision(true);
        assert_eq!(stats.strategy_streak, 2);
        stats.record_decision(false);
        assert_eq!(stats.strategy_streak, 0);
        assert_eq!(stats.strategy_decisions, 3);
        assert_eq!(stats.strategy_correct, 2);
    }

    #[test]
    fn grader_counts_each_state_once() {
        let mut stats = SessionStats::default();
        let mut grader = DecisionGrader::default();
        let oracle = recommend(16, 10, false, false, true, true, true);

        let first = grader.grade("0-2-16-10-1-1-Hit".into(), Action::Hit, oracle, &mut stats);
        assert!(first.is_some());
        let repeat = grader.grade("0-2-16-10-1-1-Hit".into(), Action::Hit, oracle, &mut stats);
        assert!(repeat.is_none());
        assert_eq!(stats.strategy_decisions, 1);
        assert_eq!(grader.round_counts(), (1, 0));
    }

    #[test]
    fn grader_marks_matching_action_correct() {
        let mut stats = SessionStats::default();
        let mut grader = DecisionGrader::default();
        let oracle = recommend(11, 6, false, false, true, true, true);

        let feedback = grader
            .grade("0-2-11-6-1-1-Double".into(), Action::Double, oracle, &mut stats)
            .expect("first grading event");
        assert!(feedback.is_correct);
        assert_eq!(feedback.recommended_action, Action::Double);
        assert_eq!(stats.strategy_correct, 1);
        assert_eq!(stats.strategy_streak, 1);
    }

    #[test]
    fn a_new_state_grades_again() {
        let mut stats = SessionStats::default();
        let mut grader = DecisionGrader::default();
        let oracle = recommend(16, 10, false, false, true, true, true);

        grader.grade("0-2-16-10-1-1-Hit".into(), Action::Hit, oracle, &mut stats);
        grader.grade("0-3-19-10-0-0-Stand".into(), Action::Stand, oracle, &mut stats);
        assert_eq!(stats.strategy_decisions, 2);
    }

    #[test]
    fn reset_round_clears_counters_and_dedup() {
        let mut stats = SessionStats::default();
        let mut grader = DecisionGrader::default();
        let oracle = recommend(12, 4, false, false, true, true, true);

        grader.grade("0-2-12-4-1-1-Stand".into(), Action::Stand, oracle, &mut stats);
        grader.reset_round();
        assert_eq!(grader.round_counts(), (0, 0));
        let again = grader.grade("0-2-12-4-1-1-Stand".into(), Action::Stand, oracle, &mut stats);
        assert!(again.is_some());
    }
}
