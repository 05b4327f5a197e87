use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Hit => "Hit",
            Action::Stand => "Stand",
            Action::Double => "Double",
            Action::Split => "Split",
            Action::Surrender => "Surrender",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub action: Action,
    pub reason: &'static str,
}

fn rec(action: Action, reason: &'static str) -> Recommendation {
    Recommendation { action, reason }
}

/// Basic strategy for multi-deck games where the dealer hits soft 17, with
/// double after split and late surrender. Precedence is pairs, then true
/// soft totals, then hard totals. The reason strings are coaching text only;
/// nothing branches on them.
///
/// `dealer_up` is the up-card's value with an ace normalized to 11.
pub fn recommend(
    player_total: u8,
    dealer_up: u8,
    is_soft: bool,
    is_pair: bool,
    can_double: bool,
    can_surrender: bool,
    das: bool,
) -> Recommendation {
    let up = if dealer_up == 1 { 11 } else { dealer_up };

    if is_pair {
        return pair_rule(player_total, is_soft, up, can_double, das);
    }

    // A true soft total still counts an ace as 11.
    if is_soft && player_total >= 13 {
        return soft_rule(player_total, up, can_double);
    }

    hard_rule(player_total, up, can_double, can_surrender)
}

fn pair_rule(player_total: u8, is_soft: bool, up: u8, can_double: bool, das: bool) -> Recommendation {
    // A pair of aces is the only soft 12; every other pair is hard.
    let pair_value = if is_soft { 11 } else { player_total / 2 };

    match pair_value {
        11 => rec(Action::Split, "Always split aces to start two strong hands"),
        10 => rec(Action::Stand, "Never split tens; 20 is already a winner"),
        9 => {
            if (2..=6).contains(&up) || up == 8 || up == 9 {
                rec(Action::Split, "Split 9s vs 2-9 except a dealer 7")
            } else {
                rec(Action::Stand, "Stand on 18 vs 7, 10 or ace")
            }
        }
        8 => rec(Action::Split, "Always split 8s; hard 16 is the worst hand"),
        7 => {
            if (2..=7).contains(&up) {
                rec(Action::Split, "Split 7s vs 2-7")
            } else {
                rec(Action::Hit, "Hit 14 vs 8 through ace")
            }
        }
        6 => {
            if (2..=6).contains(&up) {
                rec(Action::Split, "Split 6s vs 2-6")
            } else {
                rec(Action::Hit, "Hit 12 vs 7 through ace")
            }
        }
        5 => {
            // play as a hard 10, never split
            if can_double && (2..=9).contains(&up) {
                rec(Action::Double, "Treat 5s as hard 10 and double vs 2-9")
            } else {
                rec(Action::Hit, "Treat 5s as hard 10; hit vs 10 or ace")
            }
        }
        4 => {
            if das && (up == 5 || up == 6) {
                rec(Action::Split, "Split 4s vs 5-6 when double after split is allowed")
            } else {
                rec(Action::Hit, "Hit 8; splitting 4s only pays off vs 5-6 with DAS")
            }
        }
        _ => {
            let split = if das {
                (2..=7).contains(&up)
            } else {
                (3..=7).contains(&up)
            };
            if split {
                rec(Action::Split, "Split small pairs vs a weak dealer card")
            } else {
                rec(Action::Hit, "Hit small pairs vs a strong dealer card")
            }
        }
    }
}

fn soft_rule(total: u8, up: u8, can_double: bool) -> Recommendation {
    match total {
        20 | 21 => rec(Action::Stand, "Soft 20-21 are premium totals"),
        19 => {
            if can_double && up == 6 {
                rec(Action::Double, "Double soft 19 vs 6 when the dealer hits soft 17")
            } else {
                rec(Action::Stand, "Stand on soft 19 everywhere else")
            }
        }
        18 => {
            if can_double && (2..=6).contains(&up) {
                rec(Action::Double, "Double soft 18 vs 2-6 when the dealer hits soft 17")
            } else if up == 7 || up == 8 {
                rec(Action::Stand, "Stand soft 18 vs 7-8")
            } else {
                rec(Action::Hit, "Hit soft 18 vs 9 through ace")
            }
        }
        17 => {
            if can_double && (3..=6).contains(&up) {
                rec(Action::Double, "Double soft 17 vs 3-6")
            } else {
                rec(Action::Hit, "Hit soft 17 otherwise")
            }
        }
        15 | 16 => {
            if can_double && (4..=6).contains(&up) {
                rec(Action::Double, "Double soft 15-16 vs 4-6")
            } else {
                rec(Action::Hit, "Hit soft 15-16 otherwise")
            }
        }
        13 | 14 => {
            if can_double && (up == 5 || up == 6) {
                rec(Action::Double, "Double soft 13-14 vs 5-6")
            } else {
                rec(Action::Hit, "Hit soft 13-14 otherwise")
            }
        }
        _ => rec(Action::Hit, "Improve a weak soft total"),
    }
}

fn hard_rule(total: u8, up: u8, can_double: bool, can_surrender: bool) -> Recommendation {
    if total >= 17 {
        return rec(Action::Stand, "Stand on hard 17 and up; the bust risk is too high");
    }
    match total {
        16 => {
            if can_surrender && (up == 9 || up == 10 || up == 11) {
                rec(Action::Surrender, "Surrender 16 vs 9, 10 or ace when available")
            } else if up >= 7 {
                rec(Action::Hit, "Hit 16 vs 7 through ace")
            } else {
                rec(Action::Stand, "Stand 16 vs 2-6")
            }
        }
        15 => {
            if can_surrender && up == 10 {
                rec(Action::Surrender, "Surrender 15 vs 10 when available")
            } else if up >= 7 {
                rec(Action::Hit, "Hit 15 vs 7 through ace")
            } else {
                rec(Action::Stand, "Stand 15 vs 2-6")
            }
        }
        13 | 14 => {
            if up >= 7 {
                rec(Action::Hit, "Hit 13-14 vs 7 through ace")
            } else {
                rec(Action::Stand, "Stand 13-14 vs 2-6")
            }
        }
        12 => {
            if (4..=6).contains(&up) {
                rec(Action::Stand, "Stand 12 vs 4-6")
            } else {
                rec(Action::Hit, "Hit 12 vs 2-3 and 7 through ace")
            }
        }
        11 => {
            if can_double {
                rec(Action::Double, "Double 11 vs any up-card, ace included")
            } else {
                rec(Action::Hit, "Hit 11 when doubling is not allowed")
            }
        }
        10 => {
            if can_double && (2..=9).contains(&up) {
                rec(Action::Double, "Double 10 vs 2-9")
            } else {
                rec(Action::Hit, "Hit 10 vs 10 or ace, or when doubling is unavailable")
            }
        }
        9 => {
            if can_double && (3..=6).contains(&up) {
                rec(Action::Double, "Double 9 vs 3-6")
            } else {
                rec(Action::Hit, "Hit 9 otherwise")
            }
        }
        _ => rec(Action::Hit, "Totals of 8 or less cannot bust; always draw"),
    }
}
