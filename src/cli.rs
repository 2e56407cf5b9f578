//! Terminal presentation for `tridice play`
//!
//! Parses one command per input line and renders engine updates as text.

use crate::game::odds::{fair_exact_multiplier, payout_table};
use crate::game::{BetKind, BetOutcome, GameEvent, GameSnapshot, Phase};
use crate::service::GameUpdate;
use std::fmt::Write as _;

pub const HELP: &str = "\
commands:
  higher <stake>              bet the next total beats the previous one
  lower <stake>               bet the next total is below the previous one
  exact <total> <stake>       bet on an exact total (3-18)
  range <min> <max> <stake>   bet the total lands in min..=max
  quote <bet...>              show odds for a bet without placing it
  roll                        roll the dice (again)
  reset                       start over with a fresh account
  state                       show the scoreboard
  odds                        show the exact-total payout table
  help                        this text
  quit                        leave";

/// One parsed input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    Bet { kind: BetKind, stake: u64 },
    Quote { kind: BetKind, stake: u64 },
    Roll,
    Reset,
    State,
    Odds,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    NotANumber(String),
}

pub fn parse_command(line: &str) -> Result<PlayCommand, ParseCommandError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (first, rest) = words.split_first().ok_or(ParseCommandError::Empty)?;

    match first.to_ascii_lowercase().as_str() {
        "roll" | "r" => Ok(PlayCommand::Roll),
        "reset" => Ok(PlayCommand::Reset),
        "state" | "s" => Ok(PlayCommand::State),
        "odds" => Ok(PlayCommand::Odds),
        "help" | "?" => Ok(PlayCommand::Help),
        "quit" | "q" | "exit" => Ok(PlayCommand::Quit),
        "quote" => {
            let (kind, stake) = parse_bet(rest)?;
            Ok(PlayCommand::Quote { kind, stake })
        }
        _ => {
            let (kind, stake) = parse_bet(&words)?;
            Ok(PlayCommand::Bet { kind, stake })
        }
    }
}

fn parse_bet(words: &[&str]) -> Result<(BetKind, u64), ParseCommandError> {
    let (name, args) = words
        .split_first()
        .ok_or(ParseCommandError::Usage("quote <bet...>"))?;

    match (name.to_ascii_lowercase().as_str(), args) {
        ("higher" | "h", [stake]) => Ok((BetKind::higher(), number(stake)?)),
        ("lower" | "l", [stake]) => Ok((BetKind::lower(), number(stake)?)),
        ("exact" | "e", [target, stake]) => Ok((BetKind::exact(number(target)?), number(stake)?)),
        ("range", [min, max, stake]) => Ok((
            BetKind::range(number(min)?, number(max)?),
            number(stake)?,
        )),
        ("higher" | "h", _) => Err(ParseCommandError::Usage("higher <stake>")),
        ("lower" | "l", _) => Err(ParseCommandError::Usage("lower <stake>")),
        ("exact" | "e", _) => Err(ParseCommandError::Usage("exact <total> <stake>")),
        ("range", _) => Err(ParseCommandError::Usage("range <min> <max> <stake>")),
        (other, _) => Err(ParseCommandError::Unknown(other.to_string())),
    }
}

fn number<T: std::str::FromStr>(word: &str) -> Result<T, ParseCommandError> {
    word.parse()
        .map_err(|_| ParseCommandError::NotANumber(word.to_string()))
}

fn total_or_dash(total: Option<u8>) -> String {
    total.map_or_else(|| "--".to_string(), |t| t.to_string())
}

/// Scoreboard view of a snapshot
pub fn render_snapshot(snapshot: &GameSnapshot) -> String {
    let account = &snapshot.account;
    let mut out = String::new();
    let _ = writeln!(out, "phase:     {}", snapshot.phase);
    let _ = writeln!(out, "previous:  {}", total_or_dash(snapshot.previous_total()));
    let _ = writeln!(out, "current:   {}", total_or_dash(snapshot.current_total()));
    if let Some(bet) = &snapshot.active_bet {
        let _ = writeln!(
            out,
            "bet:       {} for {} at {}x (wins {})",
            bet.kind,
            bet.stake,
            bet.multiplier,
            bet.potential_payout()
        );
    }
    let _ = writeln!(out, "credits:   {}", account.credits);
    let _ = write!(
        out,
        "record:    {}W {}L {}P of {} ({:.1}%)",
        account.wins,
        account.losses,
        account.pushes,
        account.total_games,
        account.win_rate_percent()
    );
    out
}

/// One-line description of an update, if it is worth showing
pub fn render_update(update: &GameUpdate) -> Option<String> {
    match &update.event {
        GameEvent::BetPlaced { bet, replaced } => {
            let mut line = format!(
                "bet placed: {} for {} at {}x",
                bet.kind, bet.stake, bet.multiplier
            );
            if let Some(old) = replaced {
                let _ = write!(line, " (replaces {})", old);
            }
            Some(line)
        }
        GameEvent::RollStarted { .. } => Some("rolling...".to_string()),
        GameEvent::Settled { settlement, .. } => {
            let roll = update.snapshot.current_roll?;
            let verdict = match settlement {
                None => String::new(),
                Some(s) => match s.outcome {
                    BetOutcome::Win => format!(" - correct! +{}", s.credit_delta),
                    BetOutcome::Loss => format!(" - wrong, {}", s.credit_delta),
                    BetOutcome::Push => " - tie, stake returned".to_string(),
                },
            };
            Some(format!(
                "rolled {}{} | credits {}",
                roll, verdict, update.snapshot.account.credits
            ))
        }
        GameEvent::RoundClosed { previous_total } => {
            if update.snapshot.phase == Phase::Waiting {
                Some(format!("place your bet (previous total {})", previous_total))
            } else {
                None
            }
        }
        GameEvent::GameReset => Some(format!(
            "new game with {} credits",
            update.snapshot.account.credits
        )),
    }
}

/// Exact-total payout table next to the probability-derived odds
pub fn render_odds() -> String {
    let mut out = String::from("total  pays  fair  ways/216\n");
    for row in payout_table() {
        let _ = writeln!(
            out,
            "{:>5}  {:>3}x  {:>3}x  {:>4}",
            row.total,
            row.multiplier,
            fair_exact_multiplier(row.total),
            row.ways
        );
    }
    out.push_str("higher/lower pays 2x, ranges pay max(2, round(16 / width))x");
    out
}
