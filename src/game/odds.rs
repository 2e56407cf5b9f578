//! Bet kinds, payout multipliers and bet evaluation
//!
//! The fixed lookup table is the only table used to quote and settle exact
//! bets. The probability-derived table is exposed for odds analysis only.

use super::dice::{MAX_TOTAL, MIN_TOTAL};
use crate::errors::{GameResult, InvalidBet, InvalidState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat multiplier for higher/lower bets
pub const COMPARISON_MULTIPLIER: u32 = 2;

/// Floor for every multiplier
pub const MIN_MULTIPLIER: u32 = 2;

/// Numerator of the range multiplier formula
const RANGE_MULTIPLIER_BASE: u32 = 16;

/// Number of distinct 3d6 outcomes
pub const OUTCOMES_3D6: u32 = 216;

/// Direction of a comparison bet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Higher,
    Lower,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Higher => write!(f, "higher"),
            Direction::Lower => write!(f, "lower"),
        }
    }
}

/// What the player predicted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BetKind {
    Comparison { direction: Direction },
    Exact { target: u8 },
    Range { min: u8, max: u8 },
}

impl BetKind {
    pub fn higher() -> Self {
        BetKind::Comparison {
            direction: Direction::Higher,
        }
    }

    pub fn lower() -> Self {
        BetKind::Comparison {
            direction: Direction::Lower,
        }
    }

    pub fn exact(target: u8) -> Self {
        BetKind::Exact { target }
    }

    pub fn range(min: u8, max: u8) -> Self {
        BetKind::Range { min, max }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, BetKind::Comparison { .. })
    }

    /// Check target and range bounds
    pub fn validate(&self) -> Result<(), InvalidBet> {
        match *self {
            BetKind::Comparison { .. } => Ok(()),
            BetKind::Exact { target } => {
                if is_valid_total(target) {
                    Ok(())
                } else {
                    Err(InvalidBet::TargetOutOfRange { target })
                }
            }
            BetKind::Range { min, max } => {
                if is_valid_total(min) && is_valid_total(max) && min <= max {
                    Ok(())
                } else {
                    Err(InvalidBet::InvalidRange { min, max })
                }
            }
        }
    }

    /// Payout multiplier for this kind; the kind must already be valid
    pub fn multiplier(&self) -> u32 {
        match *self {
            BetKind::Comparison { .. } => COMPARISON_MULTIPLIER,
            BetKind::Exact { target } => exact_multiplier(target),
            BetKind::Range { min, max } => range_multiplier(min, max),
        }
    }
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKind::Comparison { direction } => write!(f, "{} than previous", direction),
            BetKind::Exact { target } => write!(f, "exactly {}", target),
            BetKind::Range { min, max } => write!(f, "between {} and {}", min, max),
        }
    }
}

/// How a bet resolved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BetOutcome {
    Win,
    Loss,
    /// Comparison bet whose totals tie: stake returned, game not counted
    Push,
}

fn is_valid_total(total: u8) -> bool {
    (MIN_TOTAL..=MAX_TOTAL).contains(&total)
}

/// Canonical exact-bet multiplier, keyed by distance from the modal totals
///
/// Returns 0 for totals that cannot be rolled.
pub fn exact_multiplier(target: u8) -> u32 {
    match target {
        10 | 11 => 8,
        9 | 12 => 9,
        8 | 13 => 10,
        7 | 14 => 12,
        6 | 15 => 14,
        5 | 16 => 18,
        4 | 17 => 24,
        3 | 18 => 36,
        _ => 0,
    }
}

/// Number of the 216 equally likely 3d6 outcomes that sum to `total`
pub fn ways_to_roll(total: u8) -> u32 {
    let mut ways = 0;
    for a in 1..=6u8 {
        for b in 1..=6u8 {
            for c in 1..=6u8 {
                if a + b + c == total {
                    ways += 1;
                }
            }
        }
    }
    ways
}

/// Probability-derived multiplier `round(1 / P(target))`
///
/// Analysis only; never used for quoting or settlement.
pub fn fair_exact_multiplier(target: u8) -> u32 {
    let ways = ways_to_roll(target);
    if ways == 0 {
        return 0;
    }
    round_div(OUTCOMES_3D6, ways)
}

/// `max(2, round(16 / width))` for an inclusive range
pub fn range_multiplier(min: u8, max: u8) -> u32 {
    let width = u32::from(max.saturating_sub(min)) + 1;
    round_div(RANGE_MULTIPLIER_BASE, width).max(MIN_MULTIPLIER)
}

/// Integer division rounding half away from zero
fn round_div(numerator: u32, denominator: u32) -> u32 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Chance in 216 that a bet kind wins outright against `previous_total`
pub fn winning_ways(kind: &BetKind, previous_total: Option<u8>) -> u32 {
    (MIN_TOTAL..=MAX_TOTAL)
        .filter(|&total| matches!(evaluate(kind, previous_total, total), Ok(BetOutcome::Win)))
        .map(ways_to_roll)
        .sum()
}

/// Expected credit change per unit stake, in 216ths
///
/// Positive numbers favour the player. Pushes contribute nothing.
pub fn expected_return_216(kind: &BetKind, previous_total: Option<u8>) -> i64 {
    let multiplier = i64::from(kind.multiplier());
    (MIN_TOTAL..=MAX_TOTAL)
        .map(|total| {
            let ways = i64::from(ways_to_roll(total));
            match evaluate(kind, previous_total, total) {
                Ok(BetOutcome::Win) => ways * multiplier,
                Ok(BetOutcome::Loss) => -ways,
                Ok(BetOutcome::Push) | Err(_) => 0,
            }
        })
        .sum()
}

/// Resolve a bet against the new total
///
/// Comparison bets need the previous total; without it the call fails with
/// `InvalidState::NoPreviousRoll`.
pub fn evaluate(
    kind: &BetKind,
    previous_total: Option<u8>,
    current_total: u8,
) -> GameResult<BetOutcome> {
    let won = match *kind {
        BetKind::Comparison { direction } => {
            let previous = previous_total.ok_or(InvalidState::NoPreviousRoll)?;
            if current_total == previous {
                return Ok(BetOutcome::Push);
            }
            match direction {
                Direction::Higher => current_total > previous,
                Direction::Lower => current_total < previous,
            }
        }
        BetKind::Exact { target } => current_total == target,
        BetKind::Range { min, max } => (min..=max).contains(&current_total),
    };

    Ok(if won { BetOutcome::Win } else { BetOutcome::Loss })
}

/// One row of the exact-bet payout table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PayoutRow {
    pub total: u8,
    pub multiplier: u32,
    pub ways: u32,
}

/// Exact-bet payouts for every rollable total
pub fn payout_table() -> Vec<PayoutRow> {
    (MIN_TOTAL..=MAX_TOTAL)
        .map(|total| PayoutRow {
            total,
            multiplier: exact_multiplier(total),
            ways: ways_to_roll(total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GameError;

    #[test]
    fn test_ways_sum_to_all_outcomes() {
        let total: u32 = (3..=18).map(ways_to_roll).sum();
        assert_eq!(total, OUTCOMES_3D6);
        assert_eq!(ways_to_roll(10), 27);
        assert_eq!(ways_to_roll(3), 1);
        assert_eq!(ways_to_roll(2), 0);
    }

    #[test]
    fn test_exact_table_is_symmetric() {
        for total in 3..=18u8 {
            assert_eq!(exact_multiplier(total), exact_multiplier(21 - total));
        }
        assert_eq!(exact_multiplier(10), 8);
        assert_eq!(exact_multiplier(3), 36);
        assert_eq!(exact_multiplier(19), 0);
    }

    #[test]
    fn test_fair_table_values() {
        assert_eq!(fair_exact_multiplier(10), 8);
        assert_eq!(fair_exact_multiplier(9), 9);
        assert_eq!(fair_exact_multiplier(8), 10);
        assert_eq!(fair_exact_multiplier(7), 14);
        assert_eq!(fair_exact_multiplier(6), 22);
        assert_eq!(fair_exact_multiplier(3), 216);
    }

    #[test]
    fn test_range_multiplier() {
        assert_eq!(range_multiplier(8, 12), 3); // 16/5 = 3.2
        assert_eq!(range_multiplier(10, 10), 16);
        assert_eq!(range_multiplier(10, 12), 5); // 16/3 = 5.33
        assert_eq!(range_multiplier(9, 14), 3); // 16/6 = 2.67
        assert_eq!(range_multiplier(3, 18), 2); // 16/16 = 1, floored
        assert_eq!(range_multiplier(5, 11), 2); // 16/7 = 2.29
    }

    #[test]
    fn test_round_div_half_up() {
        assert_eq!(round_div(5, 2), 3);
        assert_eq!(round_div(16, 5), 3);
        assert_eq!(round_div(16, 7), 2);
    }

    #[test]
    fn test_validate_bounds() {
        assert!(BetKind::exact(3).validate().is_ok());
        assert_eq!(
            BetKind::exact(2).validate(),
            Err(InvalidBet::TargetOutOfRange { target: 2 })
        );
        assert_eq!(
            BetKind::range(12, 8).validate(),
            Err(InvalidBet::InvalidRange { min: 12, max: 8 })
        );
        assert_eq!(
            BetKind::range(3, 19).validate(),
            Err(InvalidBet::InvalidRange { min: 3, max: 19 })
        );
        assert!(BetKind::higher().validate().is_ok());
    }

    #[test]
    fn test_evaluate_comparison() {
        assert_eq!(evaluate(&BetKind::higher(), Some(10), 15), Ok(BetOutcome::Win));
        assert_eq!(evaluate(&BetKind::higher(), Some(10), 9), Ok(BetOutcome::Loss));
        assert_eq!(evaluate(&BetKind::lower(), Some(10), 9), Ok(BetOutcome::Win));
        assert_eq!(evaluate(&BetKind::lower(), Some(10), 10), Ok(BetOutcome::Push));
        assert_eq!(
            evaluate(&BetKind::higher(), None, 12),
            Err(GameError::InvalidState(InvalidState::NoPreviousRoll))
        );
    }

    #[test]
    fn test_evaluate_exact_and_range_never_push() {
        assert_eq!(evaluate(&BetKind::exact(10), Some(10), 10), Ok(BetOutcome::Win));
        assert_eq!(evaluate(&BetKind::exact(10), None, 11), Ok(BetOutcome::Loss));
        assert_eq!(evaluate(&BetKind::range(8, 12), None, 12), Ok(BetOutcome::Win));
        assert_eq!(evaluate(&BetKind::range(8, 12), Some(13), 13), Ok(BetOutcome::Loss));
    }

    #[test]
    fn test_winning_ways() {
        assert_eq!(winning_ways(&BetKind::exact(10), None), 27);
        assert_eq!(winning_ways(&BetKind::range(3, 18), None), 216);
        // totals 4..=18 beat a previous 3
        assert_eq!(winning_ways(&BetKind::higher(), Some(3)), 215);
        assert_eq!(winning_ways(&BetKind::higher(), None), 0);
    }

    #[test]
    fn test_expected_return() {
        // 27 ways to win 8, 189 ways to lose 1
        assert_eq!(expected_return_216(&BetKind::exact(10), None), 27);
        // 8..=12 covers 21 + 25 + 27 + 27 + 25 = 125 ways at 3x
        assert_eq!(expected_return_216(&BetKind::range(8, 12), None), 125 * 3 - 91);
        // previous 10: 108 ways higher, 81 lower, 27 tie
        assert_eq!(expected_return_216(&BetKind::higher(), Some(10)), 108 * 2 - 81);
    }

    #[test]
    fn test_payout_table_rows() {
        let table = payout_table();
        assert_eq!(table.len(), 16);
        assert_eq!(table[0], PayoutRow { total: 3, multiplier: 36, ways: 1 });
        assert!(table.iter().all(|row| row.multiplier >= MIN_MULTIPLIER));
    }

    #[test]
    fn test_bet_kind_serde_shape() {
        let json = serde_json::to_value(BetKind::range(8, 12)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "range", "min": 8, "max": 12}));

        let kind: BetKind =
            serde_json::from_str(r#"{"type":"comparison","direction":"lower"}"#).unwrap();
        assert_eq!(kind, BetKind::lower());
    }
}
