//! Single-writer game service
//!
//! One tokio task owns the `GameEngine`. Callers talk to it through a
//! clonable `GameHandle`; each command carries a `oneshot` reply. Timers are
//! sleeping tasks that post their token back to the same task, so engine
//! mutations never overlap. Every engine change is fanned out on a
//! `broadcast` channel.

use crate::config::GameConfig;
use crate::errors::{GameResult, ServiceError, TridiceResult};
use crate::game::{
    Bet, BetKind, DiceRoller, GameEngine, GameEvent, GameObserver, GameSnapshot, Scheduler,
    TimerToken,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

const COMMAND_BUFFER: usize = 64;
const UPDATE_BUFFER: usize = 256;

/// One engine change as seen by subscribers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameUpdate {
    pub event: GameEvent,
    pub snapshot: GameSnapshot,
}

/// Scheduler backed by `tokio::time::sleep` tasks
pub struct TokioScheduler {
    fired: mpsc::UnboundedSender<TimerToken>,
    timers: HashMap<TimerToken, AbortHandle>,
}

impl TokioScheduler {
    pub fn new(fired: mpsc::UnboundedSender<TimerToken>) -> Self {
        Self {
            fired,
            timers: HashMap::new(),
        }
    }

    /// Timers scheduled and not yet finished or cancelled
    pub fn live_timers(&self) -> usize {
        self.timers.values().filter(|handle| !handle.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration, token: TimerToken) {
        self.timers.retain(|_, handle| !handle.is_finished());

        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = fired.send(token);
        });
        self.timers.insert(token, task.abort_handle());
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(handle) = self.timers.remove(&token) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}

/// Forwards engine notifications to a broadcast channel
pub struct BroadcastObserver {
    updates: broadcast::Sender<GameUpdate>,
}

impl BroadcastObserver {
    pub fn new(updates: broadcast::Sender<GameUpdate>) -> Self {
        Self { updates }
    }
}

impl GameObserver for BroadcastObserver {
    fn on_event(&mut self, event: &GameEvent, snapshot: &GameSnapshot) {
        // no receivers is fine
        let _ = self.updates.send(GameUpdate {
            event: event.clone(),
            snapshot: snapshot.clone(),
        });
    }
}

enum Command {
    PlaceBet {
        kind: BetKind,
        stake: u64,
        reply: oneshot::Sender<GameResult<Bet>>,
    },
    Quote {
        kind: BetKind,
        stake: u64,
        reply: oneshot::Sender<GameResult<Bet>>,
    },
    Roll {
        reply: oneshot::Sender<GameResult<()>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
}

/// Clonable front door to the game task
#[derive(Clone)]
pub struct GameHandle {
    commands: mpsc::Sender<Command>,
    updates: broadcast::Sender<GameUpdate>,
}

impl GameHandle {
    pub async fn place_bet(&self, kind: BetKind, stake: u64) -> TridiceResult<Bet> {
        let bet = self
            .request(|reply| Command::PlaceBet { kind, stake, reply })
            .await??;
        Ok(bet)
    }

    pub async fn quote(&self, kind: BetKind, stake: u64) -> TridiceResult<Bet> {
        let bet = self
            .request(|reply| Command::Quote { kind, stake, reply })
            .await??;
        Ok(bet)
    }

    /// Start a roll; returns once the engine is rolling, not when it lands
    pub async fn roll_dice(&self) -> TridiceResult<()> {
        self.request(|reply| Command::Roll { reply }).await??;
        Ok(())
    }

    pub async fn reset_game(&self) -> TridiceResult<()> {
        self.request(|reply| Command::Reset { reply }).await?;
        Ok(())
    }

    pub async fn snapshot(&self) -> TridiceResult<GameSnapshot> {
        Ok(self.request(|reply| Command::Snapshot { reply }).await?)
    }

    /// Receive every change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<GameUpdate> {
        self.updates.subscribe()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ServiceError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| ServiceError::Closed)?;
        response.await.map_err(|_| ServiceError::Closed)
    }
}

/// Owner of the engine task
pub struct GameService;

impl GameService {
    /// Spawn the game task on the current runtime
    ///
    /// The task ends when every `GameHandle` has been dropped; pending timers
    /// are aborted with it.
    pub fn spawn<R>(config: GameConfig, roller: R) -> (GameHandle, JoinHandle<()>)
    where
        R: DiceRoller + Send + 'static,
    {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (updates_tx, _) = broadcast::channel(UPDATE_BUFFER);
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();

        let mut engine = GameEngine::new(config, roller, TokioScheduler::new(fired_tx));
        engine.subscribe(Box::new(BroadcastObserver::new(updates_tx.clone())));

        let task = tokio::spawn(run(engine, commands_rx, fired_rx));
        let handle = GameHandle {
            commands: commands_tx,
            updates: updates_tx,
        };
        (handle, task)
    }
}

async fn run<R: DiceRoller>(
    mut engine: GameEngine<R, TokioScheduler>,
    mut commands: mpsc::Receiver<Command>,
    mut fired: mpsc::UnboundedReceiver<TimerToken>,
) {
    info!(
        credits = engine.account().credits,
        rolling_ms = engine.config().rolling_delay_ms,
        result_ms = engine.config().result_delay_ms,
        "game service started"
    );

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => handle_command(&mut engine, command),
                None => break,
            },
            Some(token) = fired.recv() => {
                engine.fire(token);
            }
        }
    }

    info!("game service stopped");
}

fn handle_command<R: DiceRoller>(engine: &mut GameEngine<R, TokioScheduler>, command: Command) {
    match command {
        Command::PlaceBet { kind, stake, reply } => {
            let result = engine.place_bet(kind, stake);
            if let Err(err) = &result {
                warn!(%err, %kind, stake, "bet rejected");
            }
            let _ = reply.send(result);
        }
        Command::Quote { kind, stake, reply } => {
            let _ = reply.send(engine.quote(kind, stake));
        }
        Command::Roll { reply } => {
            let result = engine.roll_dice();
            if let Err(err) = &result {
                warn!(%err, phase = %engine.phase(), "roll rejected");
            }
            let _ = reply.send(result);
        }
        Command::Reset { reply } => {
            engine.reset_game();
            debug!(live_timers = engine.scheduler().live_timers(), "reset handled");
            let _ = reply.send(());
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(engine.snapshot());
        }
    }
}
