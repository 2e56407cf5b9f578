//! Headless batch play on virtual time
//!
//! Runs a fixed betting strategy for many rounds and reports the realised
//! return next to the return the payout table predicts.

use crate::config::GameConfig;
use crate::errors::GameResult;
use crate::game::odds::{expected_return_216, OUTCOMES_3D6};
use crate::game::{BetKind, DiceRoller, GameEngine, ManualScheduler, PlayerAccount, RandomRoller};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Betting strategy applied every round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Higher after a total of 10 or less, lower otherwise
    HigherLower,
    /// Exact total of 10
    Exact,
    /// Range 8..=12
    Range,
}

impl Strategy {
    /// Bet for the next round; `None` means an unbetted opening roll
    pub fn choose(&self, previous_total: Option<u8>) -> Option<BetKind> {
        match self {
            Strategy::HigherLower => previous_total.map(|previous| {
                if previous <= 10 {
                    BetKind::higher()
                } else {
                    BetKind::lower()
                }
            }),
            Strategy::Exact => Some(BetKind::exact(10)),
            Strategy::Range => Some(BetKind::range(8, 12)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub rounds: u32,
    pub stake: u64,
    pub strategy: Strategy,
    /// Seed for reproducible runs
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationReport {
    pub strategy: Strategy,
    pub rounds_played: u32,
    pub opening_rolls: u32,
    pub account: PlayerAccount,
    pub total_staked: u64,
    pub net: i64,
    /// Sum over bets of `stake * expected_return_216`
    pub expected_net_216: i64,
    /// Stopped early because credits fell below the stake
    pub busted: bool,
}

impl SimulationReport {
    pub fn realised_return(&self) -> f64 {
        if self.total_staked == 0 {
            0.0
        } else {
            self.net as f64 / self.total_staked as f64
        }
    }

    pub fn expected_return(&self) -> f64 {
        if self.total_staked == 0 {
            0.0
        } else {
            self.expected_net_216 as f64 / (f64::from(OUTCOMES_3D6) * self.total_staked as f64)
        }
    }
}

/// Run with fair dice, seeded when `sim.seed` is set
pub fn run(game: GameConfig, sim: &SimulationConfig) -> GameResult<SimulationReport> {
    match sim.seed {
        Some(seed) => run_with(
            game,
            sim,
            RandomRoller::new(rand::rngs::StdRng::seed_from_u64(seed)),
        ),
        None => run_with(game, sim, RandomRoller::from_entropy()),
    }
}

/// Run with any roller
pub fn run_with<R: DiceRoller>(
    game: GameConfig,
    sim: &SimulationConfig,
    roller: R,
) -> GameResult<SimulationReport> {
    let starting_credits = game.starting_credits;
    let mut engine = GameEngine::new(game, roller, ManualScheduler::new());

    let mut report = SimulationReport {
        strategy: sim.strategy,
        rounds_played: 0,
        opening_rolls: 0,
        account: *engine.account(),
        total_staked: 0,
        net: 0,
        expected_net_216: 0,
        busted: false,
    };

    for _ in 0..sim.rounds {
        if engine.account().credits < sim.stake {
            report.busted = true;
            break;
        }

        let previous_total = engine.snapshot().previous_total();
        match sim.strategy.choose(previous_total) {
            Some(kind) => {
                let bet = engine.place_bet(kind, sim.stake)?;
                report.total_staked += bet.stake;
                report.expected_net_216 +=
                    bet.stake as i64 * expected_return_216(&bet.kind, previous_total);
            }
            None => report.opening_rolls += 1,
        }

        engine.roll_dice()?;
        engine.run_until_idle();
        report.rounds_played += 1;
    }

    report.account = *engine.account();
    report.net = report.account.credits as i64 - starting_credits as i64;
    debug!(
        rounds = report.rounds_played,
        net = report.net,
        busted = report.busted,
        "simulation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Roll, ScriptedRoller};

    fn roll(faces: [u8; 3]) -> Roll {
        Roll::new(faces).unwrap()
    }

    fn sim(strategy: Strategy, rounds: u32, stake: u64) -> SimulationConfig {
        SimulationConfig {
            rounds,
            stake,
            strategy,
            seed: Some(1),
        }
    }

    #[test]
    fn test_range_strategy_scripted() {
        let roller = ScriptedRoller::new([roll([3, 3, 4]), roll([6, 6, 1])]);
        let report = run_with(GameConfig::default(), &sim(Strategy::Range, 2, 10), roller).unwrap();

        assert_eq!(report.rounds_played, 2);
        assert_eq!(report.account.credits, 1_020);
        assert_eq!(report.net, 20);
        assert_eq!(report.total_staked, 20);
        assert_eq!(report.expected_net_216, 2 * 10 * (125 * 3 - 91));
    }

    #[test]
    fn test_higher_lower_opens_without_bet() {
        let roller = ScriptedRoller::new([roll([1, 1, 1]), roll([6, 6, 6]), roll([1, 2, 1])]);
        let report =
            run_with(GameConfig::default(), &sim(Strategy::HigherLower, 3, 100), roller).unwrap();

        assert_eq!(report.opening_rolls, 1);
        // higher after 3 wins, lower after 18 wins
        assert_eq!(report.account.wins, 2);
        assert_eq!(report.account.credits, 1_400);
    }

    #[test]
    fn test_stops_when_busted() {
        let game = GameConfig {
            starting_credits: 10,
            ..GameConfig::default()
        };
        let roller = ScriptedRoller::new([roll([1, 1, 1]), roll([1, 1, 1])]);
        let report = run_with(game, &sim(Strategy::Exact, 5, 10), roller).unwrap();

        assert!(report.busted);
        assert_eq!(report.rounds_played, 1);
        assert_eq!(report.account.credits, 0);
        assert_eq!(report.realised_return(), -1.0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let first = run(GameConfig::default(), &sim(Strategy::Exact, 200, 1)).unwrap();
        let second = run(GameConfig::default(), &sim(Strategy::Exact, 200, 1)).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.account.total_games,
            first.account.wins + first.account.losses
        );
    }

    #[test]
    fn test_expected_return_for_exact_ten() {
        let report = run(GameConfig::default(), &sim(Strategy::Exact, 10, 1)).unwrap();
        assert!((report.expected_return() - 27.0 / 216.0).abs() < 1e-9);
    }
}
