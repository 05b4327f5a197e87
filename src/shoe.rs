use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spades,
    #[serde(rename = "♣")]
    Clubs,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♦")]
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Clubs, Suit::Hearts, Suit::Diamonds];

    pub fn is_black(self) -> bool {
        matches!(self, Suit::Spades | Suit::Clubs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    fn base_value(self) -> u8 {
        match self {
            Rank::Ace => 11,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
    }
}

/// `value` is fixed at construction (Ace = 11, faces = 10); soft-ace
/// reduction happens in the hand evaluator, never here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub value: u8,
}

impl Card {
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card {
            suit,
            rank,
            value: rank.base_value(),
        }
    }

    pub fn is_ace(self) -> bool {
        self.rank == Rank::Ace
    }
}

// General deal paths rebuild the shoe below this many remaining cards.
pub const RESHUFFLE_MIN: usize = 20;
// A hit draws one card; a split or the dealer's turn may need several in
// a row.
pub const HIT_MIN: usize = 5;
pub const SPLIT_MIN: usize = 10;

fn build(num_decks: u8) -> Vec<Card> {
    let mut cards = Vec::with_capacity(num_decks as usize * 52);
    for _ in 0..num_decks {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(suit, rank));
            }
        }
    }
    cards
}

/// The pool of cards in play, dealt LIFO from the end. Persists across
/// rounds and is rebuilt whole whenever a call site finds it below its
/// threshold.
pub struct Shoe {
    num_decks: u8,
    cards: Vec<Card>,
    rng: SmallRng,
}

impl Shoe {
    pub fn new(num_decks: u8, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut shoe = Shoe {
            num_decks,
            cards: Vec::new(),
            rng,
        };
        shoe.reshuffle();
        shoe
    }

    /// Discards whatever remains and brings back a full, freshly shuffled
    /// shoe.
    pub fn reshuffle(&mut self) {
        self.cards = build(self.num_decks);
        self.cards.shuffle(&mut self.rng);
    }

    /// Reshuffles unless at least `min` cards remain.
    pub fn ensure(&mut self, min: usize) {
        if self.cards.len() < min {
            self.reshuffle();
        }
    }

    /// Removes and returns the top card. Every call site checks a
    /// minimum-remaining threshold first; an empty shoe here is a bug.
    pub fn deal(&mut self) -> Card {
        self.cards
            .pop()
            .expect("dealt from an empty shoe: a reshuffle threshold was skipped")
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn needs_reshuffle(&self) -> bool {
        self.cards.len() < RESHUFFLE_MIN
    }

    // A shoe that deals exactly `cards`, front of the slice first.
    #[cfg(test)]
    pub(crate) fn stacked(cards: &[Card]) -> Self {
        let mut rigged: Vec<Card> = cards.to_vec();
        rigged.reverse();
        Shoe {
            num_decks: 6,
            cards: rigged,
            rng: SmallRng::seed_from_u64(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn build_produces_every_card_per_deck() {
        let cards = build(6);
        assert_eq!(cards.len(), 312);

        let mut counts: HashMap<(Suit, Rank), u32> = HashMap::new();
        for card in &cards {
            *counts.entry((card.suit, card.rank)).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 52);
        assert!(counts.values().all(|&n| n == 6));
    }

    #[test]
    fn build_order_is_deterministic() {
        let a = build(2);
        let b = build(2);
        assert_eq!(a, b);
        assert_eq!(a[0], Card::new(Suit::Spades, Rank::Ace));
        assert_eq!(a[12], Card::new(Suit::Spades, Rank::King));
        assert_eq!(a[13], Card::new(Suit::Clubs, Rank::Ace));
        assert_eq!(a[51], Card::new(Suit::Diamonds, Rank::King));
        // second deck repeats the first
        assert_eq!(a[52], a[0]);
    }

    #[test]
    fn card_values_fixed_at_creation() {
        assert_eq!(Card::new(Suit::Hearts, Rank::Ace).value, 11);
        assert_eq!(Card::new(Suit::Hearts, Rank::King).value, 10);
        assert_eq!(Card::new(Suit::Hearts, Rank::Queen).value, 10);
        assert_eq!(Card::new(Suit::Hearts, Rank::Jack).value, 10);
        assert_eq!(Card::new(Suit::Hearts, Rank::Ten).value, 10);
        assert_eq!(Card::new(Suit::Hearts, Rank::Seven).value, 7);
        assert_eq!(Card::new(Suit::Hearts, Rank::Two).value, 2);
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = Shoe::new(6, Some(42));
        let mut b = Shoe::new(6, Some(42));
        for _ in 0..312 {
            assert_eq!(a.deal(), b.deal());
        }
    }

    #[test]
    fn deal_consumes_from_the_top() {
        let mut shoe = Shoe::new(1, Some(7));
        assert_eq!(shoe.remaining(), 52);
        shoe.deal();
        assert_eq!(shoe.remaining(), 51);
    }

    #[test]
    fn reshuffle_restores_a_full_shoe() {
        let mut shoe = Shoe::new(6, Some(3));
        for _ in 0..300 {
            shoe.deal();
        }
        assert!(shoe.needs_reshuffle());
        shoe.reshuffle();
        assert_eq!(shoe.remaining(), 312);
        assert!(!shoe.needs_reshuffle());
    }

    #[test]
    fn ensure_reshuffles_only_below_threshold() {
        let mut shoe = Shoe::new(6, Some(3));
        for _ in 0..308 {
            shoe.deal();
        }
        shoe.ensure(HIT_MIN);
        assert_eq!(shoe.remaining(), 312);

        for _ in 0..10 {
            shoe.deal();
        }
        shoe.ensure(HIT_MIN);
        assert_eq!(shoe.remaining(), 302);
        shoe.ensure(SPLIT_MIN);
        assert_eq!(shoe.remaining(), 302);
    }

    #[test]
    #[should_panic(expected = "empty shoe")]
    fn dealing_from_empty_shoe_panics() {
        let mut shoe = Shoe::stacked(&[]);
        shoe.deal();
    }

    #[test]
    fn stacked_shoe_deals_in_given_order() {
        let first = Card::new(Suit::Spades, Rank::Ten);
        let second = Card::new(Suit::Hearts, Rank::Ace);
        let mut shoe = Shoe::stacked(&[first, second]);
        assert_eq!(shoe.deal(), first);
        assert_eq!(shoe.deal(), second);
    }

    // Statistical uniformity: across many reshuffles the ace of spades
    // should land in every region of a single-deck shoe about equally often.
    #[test]
    fn shuffle_spreads_positions_uniformly() {
        let mut shoe = Shoe::new(1, Some(1234));
        let ace = Card::new(Suit::Spades, Rank::Ace);
        let mut quartiles = [0u32; 4];
        for _ in 0..1000 {
            shoe.reshuffle();
            let pos = shoe
                .cards
                .iter()
                .position(|&c| c == ace)
                .expect("ace of spades must be in a full deck");
            quartiles[pos / 13] += 1;
        }
        for &count in &quartiles {
            assert!(
                (150..=350).contains(&count),
                "quartile count {count} far from uniform"
            );
        }
    }
}
