pub mod dice;
pub mod engine;
pub mod observer;
pub mod odds;
pub mod scheduler;
pub mod types;

pub use dice::{DiceRoller, RandomRoller, Roll, ScriptedRoller};
pub use engine::GameEngine;
pub use observer::{GameEvent, GameObserver, SubscriptionId};
pub use odds::{BetKind, BetOutcome, Direction};
pub use scheduler::{ManualScheduler, Scheduler, TimerKind, TimerToken};
pub use types::*;
