//! Game service timing on a paused tokio clock

use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::sleep;
use tridice::errors::{GameError, InvalidState};
use tridice::game::{BetKind, GameEvent, Phase, Roll, ScriptedRoller};
use tridice::{GameConfig, GameService, TridiceError};

fn roll(faces: [u8; 3]) -> Roll {
    Roll::new(faces).unwrap()
}

fn rolls(script: Vec<Roll>) -> ScriptedRoller {
    ScriptedRoller::new(script)
}

#[tokio::test(start_paused = true)]
async fn test_rolling_then_result_then_waiting() {
    let (game, task) = GameService::spawn(GameConfig::default(), rolls(vec![roll([4, 4, 2])]));

    game.place_bet(BetKind::exact(10), 5).await.unwrap();
    game.roll_dice().await.unwrap();
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Rolling);

    sleep(Duration::from_millis(2_499)).await;
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Rolling);

    sleep(Duration::from_millis(2)).await;
    let snapshot = game.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Result);
    assert_eq!(snapshot.current_total(), Some(10));
    assert_eq!(snapshot.account.credits, 1_040);

    sleep(Duration::from_millis(3_000)).await;
    let snapshot = game.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Waiting);
    assert_eq!(snapshot.previous_total(), Some(10));

    drop(game);
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_second_roll_is_rejected() {
    let (game, _task) = GameService::spawn(
        GameConfig::default(),
        rolls(vec![roll([1, 1, 1]), roll([6, 6, 6])]),
    );

    game.roll_dice().await.unwrap();
    let err = game.roll_dice().await.unwrap_err();
    assert!(matches!(
        err,
        TridiceError::Game(GameError::InvalidState(InvalidState::AlreadyRolling))
    ));

    sleep(Duration::from_secs(3)).await;
    assert_eq!(game.snapshot().await.unwrap().current_total(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_bets_closed_while_rolling() {
    let (game, _task) = GameService::spawn(GameConfig::default(), rolls(vec![roll([2, 2, 2])]));

    game.roll_dice().await.unwrap();
    let err = game.place_bet(BetKind::exact(6), 10).await.unwrap_err();
    assert!(matches!(
        err,
        TridiceError::Game(GameError::InvalidState(InvalidState::BettingClosed {
            phase: Phase::Rolling
        }))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_reset_cancels_the_roll() {
    let (game, _task) = GameService::spawn(GameConfig::default(), rolls(vec![roll([1, 2, 3])]));
    let mut updates = game.subscribe();

    game.place_bet(BetKind::range(3, 6), 100).await.unwrap();
    game.roll_dice().await.unwrap();
    game.reset_game().await.unwrap();

    sleep(Duration::from_secs(10)).await;

    let snapshot = game.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Waiting);
    assert_eq!(snapshot.current_roll, None);
    assert_eq!(snapshot.account.credits, 1_000);

    let mut events = Vec::new();
    loop {
        match updates.try_recv() {
            Ok(update) => events.push(update.event),
            Err(TryRecvError::Empty) => break,
            Err(err) => panic!("unexpected receive error: {err}"),
        }
    }
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], GameEvent::BetPlaced { replaced: None, .. }));
    assert!(matches!(events[1], GameEvent::RollStarted { previous_total: None }));
    assert_eq!(events[2], GameEvent::GameReset);
}

#[tokio::test(start_paused = true)]
async fn test_roll_again_skips_result_window() {
    let (game, _task) = GameService::spawn(
        GameConfig::default(),
        rolls(vec![roll([6, 6, 6]), roll([1, 1, 1])]),
    );

    game.place_bet(BetKind::exact(18), 1).await.unwrap();
    game.roll_dice().await.unwrap();
    sleep(Duration::from_millis(2_600)).await;
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Result);

    game.roll_dice().await.unwrap();
    let snapshot = game.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Rolling);
    assert_eq!(snapshot.previous_total(), Some(18));
    assert_eq!(snapshot.active_bet, None);

    sleep(Duration::from_millis(2_450)).await;
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Rolling);

    sleep(Duration::from_millis(100)).await;
    let snapshot = game.snapshot().await.unwrap();
    assert_eq!(snapshot.phase, Phase::Result);
    assert_eq!(snapshot.current_total(), Some(3));
    assert_eq!(snapshot.account.credits, 1_036);
    assert_eq!(snapshot.account.total_games, 1);

    // past the first result's deadline
    sleep(Duration::from_millis(500)).await;
    assert_eq!(game.snapshot().await.unwrap().phase, Phase::Result);
}

#[tokio::test(start_paused = true)]
async fn test_subscribers_follow_a_round() {
    let (game, _task) = GameService::spawn(GameConfig::default(), rolls(vec![roll([5, 5, 5])]));
    let mut updates = game.subscribe();

    game.place_bet(BetKind::exact(15), 10).await.unwrap();
    game.roll_dice().await.unwrap();

    let mut phases = Vec::new();
    for _ in 0..4 {
        let update = updates.recv().await.unwrap();
        phases.push(update.snapshot.phase);
        if let GameEvent::Settled { total, settlement } = &update.event {
            assert_eq!(*total, 15);
            assert_eq!(settlement.map(|s| s.credit_delta), Some(140));
        }
    }
    assert_eq!(
        phases,
        vec![Phase::Betting, Phase::Rolling, Phase::Result, Phase::Waiting]
    );
}
