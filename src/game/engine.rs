//! Game state machine
//!
//! `GameEngine` owns the account, the staged bet and the round state. Timed
//! transitions are requested from a `Scheduler` and come back through
//! `fire`. The engine is single-writer: one driver owns it and serialises
//! every call, including timer deliveries.

use super::dice::{DiceRoller, Roll};
use super::observer::{GameEvent, GameObserver, Observers, SubscriptionId};
use super::odds::{self, BetKind, BetOutcome};
use super::scheduler::{ManualScheduler, Scheduler, TimerKind, TimerToken};
use super::types::{Bet, GameSnapshot, Phase, PlayerAccount, Settlement};
use crate::config::GameConfig;
use crate::errors::{GameResult, InvalidBet, InvalidState};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTimer {
    token: TimerToken,
    kind: TimerKind,
}

/// Dice betting state machine
pub struct GameEngine<R: DiceRoller, S: Scheduler> {
    config: GameConfig,
    roller: R,
    scheduler: S,
    phase: Phase,
    current_roll: Option<Roll>,
    previous_roll: Option<Roll>,
    account: PlayerAccount,
    active_bet: Option<Bet>,
    last_settlement: Option<Settlement>,
    pending: Option<PendingTimer>,
    next_token: u64,
    observers: Observers,
}

impl<R: DiceRoller, S: Scheduler> GameEngine<R, S> {
    pub fn new(config: GameConfig, roller: R, scheduler: S) -> Self {
        let account = PlayerAccount::new(config.starting_credits);
        Self {
            config,
            roller,
            scheduler,
            phase: Phase::Waiting,
            current_roll: None,
            previous_roll: None,
            account,
            active_bet: None,
            last_settlement: None,
            pending: None,
            next_token: 0,
            observers: Observers::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn account(&self) -> &PlayerAccount {
        &self.account
    }

    pub fn active_bet(&self) -> Option<&Bet> {
        self.active_bet.as_ref()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The timer the engine is currently waiting on
    pub fn pending_timer(&self) -> Option<(TimerToken, TimerKind)> {
        self.pending.map(|pending| (pending.token, pending.kind))
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn roller_mut(&mut self) -> &mut R {
        &mut self.roller
    }

    /// Read-only view for presentation
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            current_roll: self.current_roll,
            previous_roll: self.previous_roll,
            account: self.account,
            active_bet: self.active_bet,
            last_outcome_correct: self.last_settlement.and_then(|s| match s.outcome {
                BetOutcome::Win => Some(true),
                BetOutcome::Loss => Some(false),
                BetOutcome::Push => None,
            }),
            last_settlement: self.last_settlement,
        }
    }

    pub fn subscribe(&mut self, observer: Box<dyn GameObserver + Send>) -> SubscriptionId {
        self.observers.add(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Validate a bet and return it with its odds, without staging it
    pub fn quote(&self, kind: BetKind, stake: u64) -> GameResult<Bet> {
        if !self.phase.accepts_bets() {
            return Err(InvalidState::BettingClosed { phase: self.phase }.into());
        }
        if kind.is_comparison() && self.previous_roll.is_none() {
            return Err(InvalidState::NoPreviousRoll.into());
        }
        kind.validate()?;
        if stake == 0 {
            return Err(InvalidBet::ZeroStake.into());
        }
        if stake > self.account.credits {
            return Err(InvalidBet::InsufficientCredits {
                stake,
                credits: self.account.credits,
            }
            .into());
        }

        Ok(Bet {
            kind,
            stake,
            multiplier: kind.multiplier(),
        })
    }

    /// Stage a bet, replacing any bet already staged
    pub fn place_bet(&mut self, kind: BetKind, stake: u64) -> GameResult<Bet> {
        let bet = self.quote(kind, stake)?;
        let replaced = self.active_bet.replace(bet).map(|old| old.kind);
        self.phase = Phase::Betting;

        debug!(%kind, stake, multiplier = bet.multiplier, "bet placed");
        self.notify(GameEvent::BetPlaced { bet, replaced });
        Ok(bet)
    }

    /// Start a roll; the outcome lands when the rolling timer fires
    pub fn roll_dice(&mut self) -> GameResult<()> {
        match self.phase {
            Phase::Rolling => return Err(InvalidState::AlreadyRolling.into()),
            Phase::Waiting if self.previous_roll.is_some() && self.active_bet.is_none() => {
                return Err(InvalidState::NoBetPlaced.into());
            }
            Phase::Waiting | Phase::Betting => {}
            Phase::Result => {
                // roll again: skip the result display
                self.cancel_pending();
                self.close_round();
            }
        }

        self.start_roll();
        Ok(())
    }

    /// Return to a fresh account and cancel any pending timer
    pub fn reset_game(&mut self) {
        self.cancel_pending();
        self.phase = Phase::Waiting;
        self.current_roll = None;
        self.previous_roll = None;
        self.active_bet = None;
        self.last_settlement = None;
        self.account = PlayerAccount::new(self.config.starting_credits);

        info!(credits = self.account.credits, "game reset");
        self.notify(GameEvent::GameReset);
    }

    /// Deliver a due timer; stale or unknown tokens are ignored
    pub fn fire(&mut self, token: TimerToken) -> bool {
        let pending = match self.pending {
            Some(pending) if pending.token == token => pending,
            _ => {
                debug!(token = token.0, "ignoring stale timer");
                return false;
            }
        };
        self.pending = None;

        match pending.kind {
            TimerKind::RollComplete => self.complete_roll(),
            TimerKind::ResultExpired => {
                self.close_round();
            }
        }
        true
    }

    fn start_roll(&mut self) {
        self.phase = Phase::Rolling;
        self.current_roll = None;
        self.last_settlement = None;
        self.schedule(TimerKind::RollComplete, self.config.rolling_delay());

        let previous_total = self.previous_roll.map(|roll| roll.total());
        debug!(?previous_total, bet = self.active_bet.is_some(), "roll started");
        self.notify(GameEvent::RollStarted { previous_total });
    }

    fn complete_roll(&mut self) {
        let roll = self.roller.roll();
        let total = roll.total();
        let previous_total = self.previous_roll.map(|previous| previous.total());

        let settlement = self.active_bet.take().map(|bet| {
            let outcome = match odds::evaluate(&bet.kind, previous_total, total) {
                Ok(outcome) => outcome,
                Err(err) => {
                    // comparison bets are only accepted once a previous roll exists
                    warn!(%err, "bet could not be evaluated, returning stake");
                    BetOutcome::Push
                }
            };
            let credit_delta = self.account.settle(&bet, outcome);
            Settlement {
                bet,
                roll,
                previous_total,
                outcome,
                credit_delta,
            }
        });

        match &settlement {
            Some(s) => info!(
                %roll,
                kind = %s.bet.kind,
                outcome = ?s.outcome,
                delta = s.credit_delta,
                credits = self.account.credits,
                "bet settled"
            ),
            None => debug!(%roll, "roll landed without a bet"),
        }

        self.current_roll = Some(roll);
        self.last_settlement = settlement;
        self.phase = Phase::Result;
        self.schedule(TimerKind::ResultExpired, self.config.result_delay());
        self.notify(GameEvent::Settled { total, settlement });
    }

    /// Carry the shown roll forward and go back to waiting
    fn close_round(&mut self) {
        if let Some(roll) = self.current_roll.take() {
            self.previous_roll = Some(roll);
        }
        self.active_bet = None;
        self.phase = Phase::Waiting;

        if let Some(previous) = self.previous_roll {
            debug!(previous_total = previous.total(), "round closed");
            self.notify(GameEvent::RoundClosed {
                previous_total: previous.total(),
            });
        }
    }

    fn schedule(&mut self, kind: TimerKind, delay: Duration) {
        self.cancel_pending();
        self.next_token += 1;
        let token = TimerToken(self.next_token);
        self.scheduler.schedule(delay, token);
        self.pending = Some(PendingTimer { token, kind });
    }

    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(token = pending.token.0, kind = ?pending.kind, "timer cancelled");
            self.scheduler.cancel(pending.token);
        }
    }

    fn notify(&mut self, event: GameEvent) {
        let snapshot = self.snapshot();
        self.observers.notify(&event, &snapshot);
    }
}

impl<R: DiceRoller> GameEngine<R, ManualScheduler> {
    /// Advance virtual time, firing every timer that comes due
    ///
    /// Returns how many timers fired.
    pub fn advance(&mut self, by: Duration) -> usize {
        let deadline = self.scheduler.now() + by;
        let mut fired = 0;
        while let Some(token) = self.scheduler.pop_due(deadline) {
            if self.fire(token) {
                fired += 1;
            }
        }
        self.scheduler.set_now(deadline);
        fired
    }

    /// Fire timers until none remain; returns the virtual time consumed
    pub fn run_until_idle(&mut self) -> Duration {
        let start = self.scheduler.now();
        while let Some(deadline) = self.scheduler.next_deadline() {
            let by = deadline.saturating_sub(self.scheduler.now());
            self.advance(by);
        }
        self.scheduler.now() - start
    }

    /// Fire timers until the current roll has been settled
    pub fn run_until_result(&mut self) {
        while self.phase == Phase::Rolling {
            match self.scheduler.next_deadline() {
                Some(deadline) => {
                    let by = deadline.saturating_sub(self.scheduler.now());
                    self.advance(by);
                }
                None => break,
            }
        }
    }
}
