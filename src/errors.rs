//! Error types for the tridice engine and its outer layers
//!
//! Game rule violations are split into two kinds: a bet whose values are bad
//! (`InvalidBet`) and an operation the current phase does not allow
//! (`InvalidState`). Both are returned synchronously and never mutate state.

use crate::game::types::Phase;

/// Errors surfaced by engine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid bet: {0}")]
    InvalidBet(#[from] InvalidBet),

    #[error("Invalid state: {0}")]
    InvalidState(#[from] InvalidState),
}

/// Bad stake, target or range values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidBet {
    #[error("stake must be greater than zero")]
    ZeroStake,

    #[error("stake {stake} exceeds available credits {credits}")]
    InsufficientCredits { stake: u64, credits: u64 },

    #[error("exact target {target} is outside 3..=18")]
    TargetOutOfRange { target: u8 },

    #[error("range {min}..={max} must satisfy 3 <= min <= max <= 18")]
    InvalidRange { min: u8, max: u8 },
}

/// Operations that are not valid in the current phase
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidState {
    #[error("dice are already rolling")]
    AlreadyRolling,

    #[error("bets are closed while the game is {phase}")]
    BettingClosed { phase: Phase },

    #[error("comparison bets need a completed previous roll")]
    NoPreviousRoll,

    #[error("place a bet before rolling again")]
    NoBetPlaced,
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// The game service task is gone
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("game service has shut down")]
    Closed,
}

/// Root error type for the binary and the server
#[derive(Debug, thiserror::Error)]
pub enum TridiceError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address error: {0}")]
    Address(#[from] std::net::AddrParseError),
}

/// Convenience type alias for engine results
pub type GameResult<T> = Result<T, GameError>;

/// Convenience type alias for outer-layer results
pub type TridiceResult<T> = Result<T, TridiceError>;
