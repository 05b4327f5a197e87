use serde::{Deserialize, Serialize};

use crate::shoe::Card;

/// Side-bet families the table knows about. Only Perfect Pairs is live; the
/// remaining variants are reserved and cannot be staked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SideBetType {
    PerfectPairs,
    TwentyOnePlus3,
    Insurance,
    LuckyLadies,
    RoyalMatch,
    OverUnder13,
    MatchDealer,
}

impl SideBetType {
    pub fn is_supported(self) -> bool {
        matches!(self, SideBetType::PerfectPairs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SideBetResult {
    Win,
    Lose,
}

/// Resolved exactly once, at deal time, against the player's first two
/// cards and the dealer's up-card; immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct SideBet {
    #[serde(rename = "type")]
    pub bet_type: SideBetType,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SideBetResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<i64>,
}

impl SideBet {
    pub fn staked(bet_type: SideBetType, amount: i64) -> Self {
        SideBet {
            bet_type,
            amount,
            result: None,
            payout: None,
        }
    }

    // The payout includes the returned stake, so net profit is
    // `payout - amount` on a win.
    pub fn resolve(&mut self, player_cards: &[Card], dealer_up: Card) {
        let (win, payout) = evaluate(self.bet_type, player_cards, dealer_up, self.amount);
        self.result = Some(if win { SideBetResult::Win } else { SideBetResult::Lose });
        self.payout = Some(payout);
    }

    pub fn profit(&self) -> i64 {
        match (self.result, self.payout) {
            (Some(SideBetResult::Win), Some(payout)) => payout - self.amount,
            _ => -self.amount,
        }
    }
}

/// Perfect Pairs pays 25:1 suited, 12:1 same color, 6:1 mixed. Reserved
/// variants have no evaluation logic and always miss; `dealer_up` is part of
/// the interface for their benefit.
pub fn evaluate(
    bet_type: SideBetType,
    player_cards: &[Card],
    _dealer_up: Card,
    amount: i64,
) -> (bool, i64) {
    match bet_type {
        SideBetType::PerfectPairs => {
            if player_cards.len() != 2 || player_cards[0].rank != player_cards[1].rank {
                return (false, 0);
            }
            let (a, b) = (player_cards[0], player_cards[1]);
            if a.suit == b.suit {
                (true, amount + amount * 25)
            } else if a.suit.is_black() == b.suit.is_black() {
                (true, amount + amount * 12)
            } else {
                (true, amount + amount * 6)
            }
        }
        _ => (false, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shoe::{Rank, Suit};

    fn card(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    fn up() -> Card {
        card(Suit::Hearts, Rank::Seven)
    }

    #[test]
    fn suited_pair_pays_twenty_five_to_one() {
        let cards = [card(Suit::Spades, Rank::Eight), card(Suit::Spades, Rank::Eight)];
        assert_eq!(
            evaluate(SideBetType::PerfectPairs, &cards, up(), 10),
            (true, 260)
        );
    }

    #[test]
    fn colored_pair_pays_twelve_to_one() {
        let cards = [card(Suit::Spades, Rank::Eight), card(Suit::Clubs, Rank::Eight)];
        assert_eq!(
            evaluate(SideBetType::PerfectPairs, &cards, up(), 10),
            (true, 130)
        );
        let reds = [card(Suit::Hearts, Rank::Four), card(Suit::Diamonds, Rank::Four)];
        assert_eq!(
            evaluate(SideBetType::PerfectPairs, &reds, up(), 10),
            (true, 130)
        );
    }

    #[test]
    fn mixed_pair_pays_six_to_one() {
        let cards = [card(Suit::Spades, Rank::Eight), card(Suit::Hearts, Rank::Eight)];
        assert_eq!(
            evaluate(SideBetType::PerfectPairs, &cards, up(), 10),
            (true, 70)
        );
    }

    #[test]
    fn non_pair_loses() {
        let cards = [card(Suit::Spades, Rank::Eight), card(Suit::Spades, Rank::Nine)];
        assert_eq!(
            evaluate(SideBetType::PerfectPairs, &cards, up(), 10),
            (false, 0)
        );
        // equal value is not enough, ranks must match
        let tens = [card(Suit::Spades, Rank::King), card(Suit::Spades, Rank::Queen)];
        assert_eq!(
            evaluate(SideBetType::PerfectPairs, &tens, up(), 10),
            (false, 0)
        );
    }

    #[test]
    fn reserved_variants_never_pay() {
        let cards = [card(Suit::Spades, Rank::Queen), card(Suit::Hearts, Rank::Queen)];
        for bet_type in [
            SideBetType::TwentyOnePlus3,
            SideBetType::Insurance,
            SideBetType::LuckyLadies,
            SideBetType::RoyalMatch,
            SideBetType::OverUnder13,
            SideBetType::MatchDealer,
        ] {
            assert!(!bet_type.is_supported());
            assert_eq!(evaluate(bet_type, &cards, up(), 10), (false, 0));
        }
    }

    #[test]
    fn resolve_locks_result_and_profit() {
        let mut bet = SideBet::staked(SideBetType::PerfectPairs, 10);
        bet.resolve(
            &[card(Suit::Spades, Rank::Eight), card(Suit::Spades, Rank::Eight)],
            up(),
        );
        assert_eq!(bet.result, Some(SideBetResult::Win));
        assert_eq!(bet.payout, Some(260));
        assert_eq!(bet.profit(), 250);

        let mut miss = SideBet::staked(SideBetType::PerfectPairs, 10);
        miss.resolve(
            &[card(Suit::Spades, Rank::Eight), card(Suit::Spades, Rank::Nine)],
            up(),
        );
        assert_eq!(miss.result, Some(SideBetResult::Lose));
        assert_eq!(miss.profit(), -10);
    }
}
