use std::collections::VecDeque;

use serde::Serialize;

use crate::{
    hand::{self, Hand},
    mode::{Mode, ModeConfig},
    session::{ActionFeedback, DecisionGrader, SessionStats},
    shoe::{Card, Shoe, HIT_MIN, RESHUFFLE_MIN, SPLIT_MIN},
    side_bet::{SideBet, SideBetType},
    strategy::{self, Action, Recommendation},
};

// Hard cap on concurrent player hands in one round.
pub const MAX_HANDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Betting,
    SideBets,
    Playing,
    Finished,
}

/// Deferred round transitions. Commands enqueue these instead of running
/// straight through so the UI can pace dealing and dealer play with its own
/// timers; `step` applies exactly one, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Followup {
    Deal,
    AdvanceHand,
    DealerPlay,
    Settle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandResult {
    Win,
    Loss,
    Push,
}

// A busted player hand loses even to a dealer bust; a natural pays 3:2
// floored to whole units.
fn determine_hand_outcome(
    player_value: u8,
    dealer_value: u8,
    player_blackjack: bool,
    dealer_blackjack: bool,
    bet: i64,
) -> (HandResult, i64) {
    if player_value > 21 {
        return (HandResult::Loss, -bet);
    }
    if dealer_value > 21 {
        return (HandResult::Win, bet);
    }
    if player_blackjack && dealer_blackjack {
        return (HandResult::Push, 0);
    }
    if player_blackjack {
        return (HandResult::Win, bet * 3 / 2);
    }
    if dealer_blackjack {
        return (HandResult::Loss, -bet);
    }
    if player_value == dealer_value {
        return (HandResult::Push, 0);
    }
    if player_value > dealer_value {
        (HandResult::Win, bet)
    } else {
        (HandResult::Loss, -bet)
    }
}

/// One table session: the live round's mutable state, the bankroll, and the
/// session aggregates. Owns its shoe and hands outright.
pub struct Game {
    mode: Mode,
    config: ModeConfig,
    shoe: Shoe,
    player_hands: Vec<Hand>,
    dealer_hand: Vec<Card>,
    current_hand_index: usize,
    phase: Phase,
    message: String,
    bankroll: i64,
    pending_bets: i64,
    main_bet: i64,
    side_bets: Vec<SideBet>,
    can_surrender: bool,
    game_over: bool,
    settled: bool,
    pending: VecDeque<Followup>,
    session: SessionStats,
    grader: DecisionGrader,
    feedback: Option<ActionFeedback>,
}

impl Game {
    pub fn new(mode: Mode, bankroll: i64, num_decks: u8, seed: Option<u64>) -> Self {
        let mut game = Game {
            mode,
            config: mode.config(),
            shoe: Shoe::new(num_decks, seed),
            player_hands: Vec::new(),
            dealer_hand: Vec::new(),
            current_hand_index: 0,
            phase: Phase::Betting,
            message: String::new(),
            bankroll,
            pending_bets: 0,
            main_bet: 0,
            side_bets: Vec::new(),
            can_surrender: false,
            game_over: false,
            settled: false,
            pending: VecDeque::new(),
            session: SessionStats::default(),
            grader: DecisionGrader::default(),
            feedback: None,
        };
        game.new_round();
        game
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bankroll(&self) -> i64 {
        self.bankroll
    }

    pub fn set_bankroll(&mut self, bankroll: i64) {
        self.bankroll = bankroll;
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    pub fn feedback(&self) -> Option<&ActionFeedback> {
        self.feedback.as_ref()
    }

    fn available_funds(&self) -> i64 {
        if self.config.unlimited_funds {
            i64::MAX
        } else {
            self.bankroll - self.pending_bets
        }
    }

    fn current_hand(&self) -> Option<&Hand> {
        self.player_hands.get(self.current_hand_index)
    }

    pub fn new_round(&mut self) {
        self.pending.clear();
        self.settled = false;
        self.player_hands.clear();
        self.dealer_hand.clear();
        self.current_hand_index = 0;
        self.side_bets.clear();
        self.can_surrender = false;
        self.game_over = false;
        self.feedback = None;
        self.grader.reset_round();

        // a fixed-bet mode has no betting step: the bet goes down and the
        // deal is queued immediately
        if let Some(bet) = self.config.fixed_bet {
            self.main_bet = bet;
            self.pending_bets = bet;
            self.phase = Phase::Playing;
            self.message = "New hand dealt - choose your action".to_string();
            self.pending.push_back(Followup::Deal);
        } else {
            self.main_bet = 0;
            self.pending_bets = 0;
            self.phase = Phase::Betting;
            self.message = "Choose your bet amount to start".to_string();
        }
    }

    /// Abandons the round mid-flight; dropped transitions never run, so no
    /// half-applied settlement can fire later.
    pub fn exit(&mut self) {
        self.pending.clear();
    }

    pub fn place_bet(&mut self, amount: i64) {
        if self.phase != Phase::Betting {
            return;
        }
        if amount <= 0 || amount > self.available_funds() {
            return;
        }

        self.main_bet = amount;
        self.pending_bets = amount;
        if self.config.allow_side_bets {
            self.phase = Phase::SideBets;
            self.message = "Place side bets or deal cards".to_string();
        } else {
            self.phase = Phase::Playing;
            self.message = "Choose your action".to_string();
            self.pending.push_back(Followup::Deal);
        }
    }

    pub fn place_side_bet(&mut self, bet_type: SideBetType, amount: i64) {
        if !self.config.allow_side_bets || self.phase != Phase::SideBets {
            return;
        }
        if !bet_type.is_supported() {
            return;
        }
        if amount <= 0 || amount > self.available_funds() {
            return;
        }

        // restaking the same type adjusts the at-risk pool by the
        // difference instead of double-counting
        let previous = self
            .side_bets
            .iter()
            .find(|b| b.bet_type == bet_type)
            .map(|b| b.amount)
            .unwrap_or(0);
        self.side_bets.retain(|b| b.bet_type != bet_type);
        self.side_bets.push(SideBet::staked(bet_type, amount));
        self.pending_bets += amount - previous;
    }

    pub fn remove_side_bet(&mut self, bet_type: SideBetType) {
        if !self.config.allow_side_bets || self.phase != Phase::SideBets {
            return;
        }
        if let Some(pos) = self.side_bets.iter().position(|b| b.bet_type == bet_type) {
            let removed = self.side_bets.remove(pos);
            self.pending_bets -= removed.amount;
        }
    }

    /// Draws the opening two cards each, player and dealer interleaved.
    /// Naturals on either side short-circuit straight to settlement; side
    /// bets resolve here either way.
    pub fn deal(&mut self) {
        if !self.player_hands.is_empty() {
            return;
        }
        if matches!(self.phase, Phase::Betting | Phase::Finished) {
            return;
        }

        self.shoe.ensure(RESHUFFLE_MIN);

        let p1 = self.shoe.deal();
        let d1 = self.shoe.deal();
        let p2 = self.shoe.deal();
        let d2 = self.shoe.deal();
        self.dealer_hand = vec![d1, d2];

        let dealer_blackjack = hand::is_blackjack(&self.dealer_hand);
        let initial = Hand::dealt(p1, p2, self.main_bet, dealer_blackjack);
        let player_blackjack = initial.is_blackjack;
        self.player_hands.push(initial);
        self.current_hand_index = 0;

        if self.config.allow_side_bets {
            let player_cards = self.player_hands[0].cards.clone();
            for bet in &mut self.side_bets {
                bet.resolve(&player_cards, d1);
            }
        }

        if dealer_blackjack || player_blackjack {
            self.phase = Phase::Finished;
            self.can_surrender = false;
            self.message = if dealer_blackjack {
                "Dealer Blackjack!".to_string()
            } else {
                "Player Blackjack!".to_string()
            };
            self.pending.push_back(Followup::Settle);
        } else {
            self.phase = Phase::Playing;
            self.can_surrender = true;
            self.message = "Choose your action".to_string();
        }
    }

    // Grades the chosen action against the oracle before it mutates
    // anything, at most once per distinct decision state.
    fn grade(&mut self, chosen: Action) {
        if !self.config.grade_actions || self.phase != Phase::Playing {
            return;
        }
        let Some(current) = self.current_hand() else {
            return;
        };
        let Some(&up) = self.dealer_hand.first() else {
            return;
        };

        let value = current.value();
        let state_key = format!(
            "{}-{}-{}-{:?}-{}-{}-{}",
            self.current_hand_index,
            current.cards.len(),
            value,
            up.rank,
            current.can_double as u8,
            self.can_surrender as u8,
            chosen.as_str(),
        );
        let recommended = strategy::recommend(
            value,
            up.value,
            current.is_soft(),
            current.is_pair(),
            current.can_double,
            self.can_surrender,
            true,
        );
        if let Some(feedback) = self
            .grader
            .grade(state_key, chosen, recommended, &mut self.session)
        {
            self.feedback = Some(feedback);
        }
    }

    pub fn hit(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        match self.current_hand() {
            Some(hand) if !hand.is_complete => {}
            _ => return,
        }

        self.grade(Action::Hit);

        self.shoe.ensure(HIT_MIN);
        let card = self.shoe.deal();
        self.player_hands[self.current_hand_index].hit(card);
        self.can_surrender = false;
        self.session.record_move();
        self.pending.push_back(Followup::AdvanceHand);
    }

    pub fn stand(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        match self.current_hand() {
            Some(hand) if !hand.is_complete => {}
            _ => return,
        }

        self.grade(Action::Stand);

        self.player_hands[self.current_hand_index].is_complete = true;
        self.can_surrender = false;
        self.session.record_move();
        self.pending.push_back(Followup::AdvanceHand);
    }

    pub fn double_down(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        let bet = match self.current_hand() {
            Some(hand) if hand.can_double && !hand.is_complete => hand.bet,
            _ => return,
        };
        if bet > self.available_funds() {
            return;
        }

        self.grade(Action::Double);

        self.shoe.ensure(HIT_MIN);
        let card = self.shoe.deal();
        self.player_hands[self.current_hand_index].double(card);
        if self.config.bankroll_applies {
            self.pending_bets += bet;
        }
        self.can_surrender = false;
        self.session.record_move();
        self.pending.push_back(Followup::AdvanceHand);
    }

    /// Replaces the current pair with two one-card hands and deals one card
    /// to each. Split aces are forced complete with one card apiece; a
    /// sub-hand reaching 21 completes without counting as blackjack.
    pub fn split(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }
        if self.player_hands.len() >= MAX_HANDS {
            return;
        }
        let (bet, first_card, second_card) = match self.current_hand() {
            Some(hand) if hand.can_split && !hand.is_complete => {
                (hand.bet, hand.cards[0], hand.cards[1])
            }
            _ => return,
        };
        if bet > self.available_funds() {
            return;
        }

        self.grade(Action::Split);

        self.shoe.ensure(SPLIT_MIN);
        let hands_after = self.player_hands.len() + 1;
        let split_aces = first_card.is_ace();

        let grow = |seed_card: Card, shoe: &mut Shoe| {
            let mut hand = Hand::from_split(seed_card, bet);
            hand.cards.push(shoe.deal());
            if split_aces {
                // one card only on split aces, no further action
                hand.is_complete = true;
                hand.can_double = false;
            } else {
                hand.can_split = hand.is_pair() && hands_after < MAX_HANDS;
                if hand.value() == 21 {
                    hand.is_complete = true;
                    hand.can_double = false;
                    hand.can_split = false;
                }
            }
            hand
        };

        let first = grow(first_card, &mut self.shoe);
        let second = grow(second_card, &mut self.shoe);

        let idx = self.current_hand_index;
        self.player_hands.splice(idx..idx + 1, [first, second]);

        // at the cap, no hand may split again
        if self.player_hands.len() >= MAX_HANDS {
            for hand in &mut self.player_hands {
                hand.can_split = false;
            }
        }

        if self.config.bankroll_applies {
            self.pending_bets += bet;
        }
        self.message = "Playing split hand 1".to_string();
        self.can_surrender = false;
        self.session.record_move();
        self.pending.push_back(Followup::AdvanceHand);
    }

    // Late surrender: half the main bet forfeited, round over on the spot,
    // dealer cards left as dealt.
    pub fn surrender(&mut self) {
        if self.phase != Phase::Playing || !self.can_surrender {
            return;
        }
        if self.player_hands.len() != 1 {
            return;
        }

        self.grade(Action::Surrender);
        self.session.record_move();

        let loss = self.main_bet / 2;
        if self.config.bankroll_applies {
            self.bankroll -= loss;
        }
        self.pending_bets = 0;
        self.can_surrender = false;
        self.message = if self.config.grade_actions {
            "Surrendered".to_string()
        } else {
            format!("Surrendered. -${loss}")
        };
        self.phase = Phase::Finished;
        self.session.record_outcomes(0, 1, 0);
        self.settled = true;
        self.pending.clear();
    }

    /// Applies the next deferred transition, if any.
    pub fn step(&mut self) -> bool {
        let Some(followup) = self.pending.pop_front() else {
            return false;
        };
        match followup {
            Followup::Deal => self.deal(),
            Followup::AdvanceHand => self.advance_hand(),
            Followup::DealerPlay => self.dealer_play(),
            Followup::Settle => self.settle(),
        }
        true
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drains every deferred transition, the delay-free path.
    pub fn resolve(&mut self) {
        while self.step() {}
    }

    // Moves play to the first incomplete hand; with none left the round
    // proceeds to the dealer.
    fn advance_hand(&mut self) {
        if self.phase != Phase::Playing {
            return;
        }

        let mut next = self.current_hand_index;
        if self
            .player_hands
            .get(next)
            .map_or(false, |hand| hand.is_complete)
        {
            next += 1;
            while next < self.player_hands.len() && self.player_hands[next].is_complete {
                next += 1;
            }
        }

        if next < self.player_hands.len() {
            self.current_hand_index = next;
            self.message = format!("Playing hand {}", next + 1);
            return;
        }

        let all_busted = self
            .player_hands
            .iter()
            .all(|hand| hand::hand_value(&hand.cards) > 21);
        self.phase = Phase::Finished;
        if all_busted {
            // dealer never plays into a dead table, but each bust still loses
            self.message = "All hands busted".to_string();
            self.pending.push_back(Followup::Settle);
        } else {
            self.message = "Dealer playing...".to_string();
            self.pending.push_back(Followup::DealerPlay);
        }
    }

    // Fixed dealer loop: draw below 17 and on soft 17, stand otherwise.
    fn dealer_play(&mut self) {
        self.shoe.ensure(SPLIT_MIN);
        loop {
            let (total, soft) = hand::score(&self.dealer_hand);
            if total < 17 || (total == 17 && soft) {
                self.dealer_hand.push(self.shoe.deal());
            } else {
                break;
            }
        }
        self.pending.push_back(Followup::Settle);
    }

    // Settles every hand and side bet, updates the bankroll and session
    // counters, and builds the end-of-round message. Latched so a second
    // call on the same round pays nothing out twice.
    fn settle(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        self.phase = Phase::Finished;

        let dealer_value = hand::hand_value(&self.dealer_hand);
        let dealer_blackjack = hand::is_blackjack(&self.dealer_hand);

        let mut main_profit: i64 = 0;
        let mut won = 0u32;
        let mut lost = 0u32;
        let mut pushed = 0u32;
        for hand in &self.player_hands {
            let player_value = hand::hand_value(&hand.cards);
            let (result, profit) = determine_hand_outcome(
                player_value,
                dealer_value,
                hand.is_blackjack,
                dealer_blackjack,
                hand.bet,
            );
            main_profit += profit;
            match result {
                HandResult::Win => won += 1,
                HandResult::Loss => lost += 1,
                HandResult::Push => pushed += 1,
            }
        }

        let mut side_profit: i64 = 0;
        if self.config.allow_side_bets {
            for bet in &self.side_bets {
                side_profit += bet.profit();
            }
        }
        let total_profit = main_profit + side_profit;

        self.message = if self.config.grade_actions {
            self.testing_summary(total_profit, dealer_blackjack)
        } else if total_profit > 0 {
            format!("You win! +${total_profit}")
        } else if total_profit < 0 {
            format!("You lose. -${}", -total_profit)
        } else if self.player_hands.len() > 1 {
            "Split hands balanced out. $0".to_string()
        } else {
            "Push! $0".to_string()
        };

        if self.config.bankroll_applies {
            self.bankroll += total_profit;
        }
        self.pending_bets = 0;
        self.session.record_outcomes(won, lost, pushed);
        self.grader.reset_round();

        if !self.config.unlimited_funds && self.bankroll <= 0 {
            self.game_over = true;
        }
    }

    // End-of-round coaching line, tiered by how closely the round's
    // decisions tracked the chart.
    fn testing_summary(&self, total_profit: i64, dealer_blackjack: bool) -> String {
        let (decisions, correct) = self.grader.round_counts();

        if decisions == 0 {
            if self.player_hands.len() == 1 {
                if self.player_hands[0].is_blackjack {
                    return "Blackjack!".to_string();
                }
                if dealer_blackjack {
                    return "Dealer Blackjack!".to_string();
                }
                return match total_profit.signum() {
                    1 => "Win. No decisions this hand.".to_string(),
                    -1 => "Loss. No decisions this hand.".to_string(),
                    _ => "Push. No decisions this hand.".to_string(),
                };
            }
            return "No decisions taken across split hands.".to_string();
        }

        let pct = (correct as f64 / decisions as f64 * 100.0).round() as u32;
        if pct == 100 {
            match total_profit.signum() {
                1 => format!("Perfect decisions led to a win ({correct}/{decisions}, 100%). Well played!"),
                -1 => format!("Perfect decisions, just bad luck ({correct}/{decisions}, 100%)."),
                _ => format!("Perfect decisions ({correct}/{decisions}, 100%)."),
            }
        } else if pct >= 80 {
            match total_profit.signum() {
                1 => format!("Strong play ({correct}/{decisions}, {pct}%)."),
                -1 => format!("Good accuracy ({correct}/{decisions}, {pct}%). Keep practicing."),
                _ => format!("Good accuracy ({correct}/{decisions}, {pct}%)."),
            }
        } else if pct >= 50 {
            match total_profit.signum() {
                1 => format!("Mixed decisions ({correct}/{decisions}, {pct}%), the win leaned on luck."),
                -1 => format!("Mixed decisions ({correct}/{decisions}, {pct}%). Study key spots."),
                _ => format!("Mixed decisions ({correct}/{decisions}, {pct}%)."),
            }
        } else {
            match total_profit.signum() {
                1 => format!("Low accuracy, but a lucky win ({correct}/{decisions}, {pct}%)."),
                -1 => format!("Low accuracy led to a loss ({correct}/{decisions}, {pct}%)."),
                _ => format!("Low accuracy ({correct}/{decisions}, {pct}%)."),
            }
        }
    }

    /// What the oracle would do with the current hand, for practice mode.
    pub fn hint(&self) -> Option<Recommendation> {
        if !self.config.show_hints || self.phase != Phase::Playing {
            return None;
        }
        let current = self.current_hand()?;
        let up = self.dealer_hand.first()?;
        Some(strategy::recommend(
            current.value(),
            up.value,
            current.is_soft(),
            current.is_pair(),
            current.can_double,
            self.can_surrender,
            true,
        ))
    }

    /// Read-only view for the UI. Hand totals are derived from cards at
    /// snapshot time; the dealer's hole card stays hidden while the player
    /// is still acting.
    pub fn snapshot(&self) -> GameSnapshot {
        let hole_hidden = self.phase == Phase::Playing && self.dealer_hand.len() >= 2;
        let dealer_cards: Vec<Card> = if hole_hidden {
            self.dealer_hand[..1].to_vec()
        } else {
            self.dealer_hand.clone()
        };
        let dealer_value = if hole_hidden || self.dealer_hand.is_empty() {
            None
        } else {
            Some(hand::hand_value(&self.dealer_hand))
        };

        GameSnapshot {
            mode: self.mode,
            phase: self.phase,
            message: self.message.clone(),
            bankroll: self.bankroll,
            pending_bets: self.pending_bets,
            main_bet: self.main_bet,
            player_hands: self.player_hands.iter().map(HandView::of).collect(),
            current_hand_index: self.current_hand_index,
            dealer_cards,
            dealer_hole_hidden: hole_hidden,
            dealer_value,
            side_bets: self.side_bets.clone(),
            can_surrender: self.can_surrender,
            game_over: self.game_over,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandView {
    pub cards: Vec<Card>,
    pub value: u8,
    pub is_soft: bool,
    pub bet: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_bet: Option<i64>,
    pub is_doubled: bool,
    pub is_complete: bool,
    pub can_double: bool,
    pub can_split: bool,
    pub is_blackjack: bool,
}

impl HandView {
    fn of(hand: &Hand) -> Self {
        HandView {
            cards: hand.cards.clone(),
            value: hand.value(),
            is_soft: hand.is_soft(),
            bet: hand.bet,
            original_bet: hand.original_bet,
            is_doubled: hand.is_doubled,
            is_complete: hand.is_complete,
            can_double: hand.can_double,
            can_split: hand.can_split,
            is_blackjack: hand.is_blackjack,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub message: String,
    pub bankroll: i64,
    pub pending_bets: i64,
    pub main_bet: i64,
    pub player_hands: Vec<HandView>,
    pub current_hand_index: usize,
    pub dealer_cards: Vec<Card>,
    pub dealer_hole_hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dealer_value: Option<u8>,
    pub side_bets: Vec<SideBet>,
    pub can_surrender: bool,
    pub game_over: bool,
}
