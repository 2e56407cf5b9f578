//! Tridice - Three-Dice Betting Game
//!
//! Engine for a 3d6 game: bet higher/lower than the previous total, on an
//! exact total, or on a range, then watch the dice settle on a timer.

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod game;
pub mod logging;
pub mod service;
pub mod simulation;

pub use config::{ConfigLoader, GameConfig, TridiceConfig};
pub use errors::{GameError, TridiceError, TridiceResult};
pub use game::{BetKind, GameEngine, GameSnapshot, ManualScheduler, Phase};
pub use service::{GameHandle, GameService, GameUpdate};
