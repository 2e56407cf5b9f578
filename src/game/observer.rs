use super::odds::BetKind;
use super::types::{Bet, GameSnapshot, Settlement};
use serde::{Deserialize, Serialize};

/// What changed in the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A bet was staged; `replaced` holds the discarded one
    BetPlaced { bet: Bet, replaced: Option<BetKind> },
    /// Dice are in the air; `previous_total` is what comparison bets face
    RollStarted { previous_total: Option<u8> },
    /// A roll landed; `settlement` is `None` when no bet was active
    Settled {
        total: u8,
        settlement: Option<Settlement>,
    },
    /// Result display ended and the roll became the previous roll
    RoundClosed { previous_total: u8 },
    /// Account and state returned to defaults
    GameReset,
}

/// Receives every engine change
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent, snapshot: &GameSnapshot);
}

impl<F> GameObserver for F
where
    F: FnMut(&GameEvent, &GameSnapshot),
{
    fn on_event(&mut self, event: &GameEvent, snapshot: &GameSnapshot) {
        self(event, snapshot)
    }
}

/// Handle returned by `GameEngine::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);

/// Observer list owned by the engine
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn GameObserver + Send>)>,
}

impl Observers {
    pub fn add(&mut self, observer: Box<dyn GameObserver + Send>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, observer));
        id
    }

    pub fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn notify(&mut self, event: &GameEvent, snapshot: &GameSnapshot) {
        for (_, observer) in self.entries.iter_mut() {
            observer.on_event(event, snapshot);
        }
    }
}
