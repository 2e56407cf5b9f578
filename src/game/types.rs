use super::dice::Roll;
use super::odds::{BetKind, BetOutcome};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default starting balance for a fresh account
pub const DEFAULT_CREDITS: u64 = 1000;

/// State-machine phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Waiting,
    Betting,
    Rolling,
    Result,
}

impl Phase {
    /// Bets may be staged or replaced in this phase
    pub fn accepts_bets(&self) -> bool {
        matches!(self, Phase::Waiting | Phase::Betting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Waiting => write!(f, "waiting"),
            Phase::Betting => write!(f, "betting"),
            Phase::Rolling => write!(f, "rolling"),
            Phase::Result => write!(f, "result"),
        }
    }
}

/// A staged prediction with its stake and locked-in odds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bet {
    pub kind: BetKind,
    pub stake: u64,
    /// Fixed at placement time
    pub multiplier: u32,
}

impl Bet {
    /// Credits won on a correct prediction
    pub fn potential_payout(&self) -> u64 {
        self.stake.saturating_mul(u64::from(self.multiplier))
    }
}

/// Player balance and record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerAccount {
    pub credits: u64,
    pub wins: u32,
    pub losses: u32,
    /// Comparison ties; not part of `total_games`
    pub pushes: u32,
    pub total_games: u32,
}

impl PlayerAccount {
    pub fn new(credits: u64) -> Self {
        Self {
            credits,
            wins: 0,
            losses: 0,
            pushes: 0,
            total_games: 0,
        }
    }

    /// Percentage of counted games won, 0.0 before the first game
    pub fn win_rate_percent(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(self.total_games) * 100.0
        }
    }

    /// Apply a resolved bet; returns the signed change in credits
    pub(crate) fn settle(&mut self, bet: &Bet, outcome: BetOutcome) -> i64 {
        match outcome {
            BetOutcome::Win => {
                let payout = bet.potential_payout();
                self.total_games += 1;
                self.wins += 1;
                self.credits = self.credits.saturating_add(payout);
                i64::try_from(payout).unwrap_or(i64::MAX)
            }
            BetOutcome::Loss => {
                // stake <= credits held at placement
                let lost = bet.stake.min(self.credits);
                self.total_games += 1;
                self.losses += 1;
                self.credits -= lost;
                -i64::try_from(lost).unwrap_or(i64::MAX)
            }
            BetOutcome::Push => {
                self.pushes += 1;
                0
            }
        }
    }
}

impl Default for PlayerAccount {
    fn default() -> Self {
        Self::new(DEFAULT_CREDITS)
    }
}

/// Record of one resolved bet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settlement {
    pub bet: Bet,
    pub roll: Roll,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_total: Option<u8>,
    pub outcome: BetOutcome,
    pub credit_delta: i64,
}

impl Settlement {
    pub fn is_win(&self) -> bool {
        self.outcome == BetOutcome::Win
    }
}

/// Read-only view of the engine handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub phase: Phase,
    /// Hidden (`None`) while rolling
    pub current_roll: Option<Roll>,
    pub previous_roll: Option<Roll>,
    pub account: PlayerAccount,
    pub active_bet: Option<Bet>,
    /// `None` before any settlement, after a push, and once a new roll starts
    pub last_outcome_correct: Option<bool>,
    pub last_settlement: Option<Settlement>,
}

impl GameSnapshot {
    pub fn current_total(&self) -> Option<u8> {
        self.current_roll.map(|roll| roll.total())
    }

    pub fn previous_total(&self) -> Option<u8> {
        self.previous_roll.map(|roll| roll.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bet(kind: BetKind, stake: u64) -> Bet {
        Bet {
            kind,
            stake,
            multiplier: kind.multiplier(),
        }
    }

    #[test]
    fn test_default_account() {
        let account = PlayerAccount::default();
        assert_eq!(account.credits, 1000);
        assert_eq!(account.total_games, 0);
        assert_eq!(account.win_rate_percent(), 0.0);
    }

    #[test]
    fn test_settle_win_loss_push() {
        let mut account = PlayerAccount::default();

        assert_eq!(account.settle(&bet(BetKind::exact(10), 5), BetOutcome::Win), 40);
        assert_eq!(account.credits, 1040);

        assert_eq!(account.settle(&bet(BetKind::range(8, 12), 10), BetOutcome::Loss), -10);
        assert_eq!(account.credits, 1030);

        assert_eq!(account.settle(&bet(BetKind::higher(), 10), BetOutcome::Push), 0);
        assert_eq!(account.credits, 1030);

        assert_eq!(account.wins, 1);
        assert_eq!(account.losses, 1);
        assert_eq!(account.pushes, 1);
        assert_eq!(account.total_games, 2);
        assert_eq!(account.win_rate_percent(), 50.0);
    }

    #[test]
    fn test_potential_payout() {
        assert_eq!(bet(BetKind::higher(), 10).potential_payout(), 20);
        assert_eq!(bet(BetKind::exact(18), 3).potential_payout(), 108);
    }

    #[test]
    fn test_phase_accepts_bets() {
        assert!(Phase::Waiting.accepts_bets());
        assert!(Phase::Betting.accepts_bets());
        assert!(!Phase::Rolling.accepts_bets());
        assert!(!Phase::Result.accepts_bets());
    }
}
