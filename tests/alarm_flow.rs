use std::{sync::Arc, time::Duration};

use chess_alarm_lib::{
    alarm::RingState,
    bell::SilentBell,
    events::AlarmEvent,
    models::{Difficulty, PuzzleRecord},
    puzzles::PuzzleRepository,
    session::{SolvedKind, SubmitOutcome},
    settings::SettingsStore,
    AlarmError, AppState,
};
use chrono::{NaiveDate, NaiveDateTime};
use tokio_util::sync::CancellationToken;

const ITALIAN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1";

fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

struct Harness {
    state: AppState,
    bell: Arc<SilentBell>,
    _dir: tempfile::TempDir,
}

/// One known puzzle (solution `f3e5`) so tests can solve whatever fires.
fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let settings = SettingsStore::new(dir.path().join("settings.json")).unwrap();
    let repo = PuzzleRepository::load(vec![PuzzleRecord::new(
        ITALIAN,
        "Find the best move for White",
        "f3e5",
        Difficulty::Easy,
    )])
    .unwrap();
    let bell = Arc::new(SilentBell::new());
    let state = AppState::new(repo, settings, bell.clone());
    Harness {
        state,
        bell,
        _dir: dir,
    }
}

fn drain_fired(rx: &mut tokio::sync::broadcast::Receiver<AlarmEvent>) -> usize {
    let mut fired = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, AlarmEvent::AlarmFired { .. }) {
            fired += 1;
        }
    }
    fired
}

#[tokio::test]
async fn invalid_time_leaves_pending_set_alone() {
    let h = harness();
    let err = h
        .state
        .scheduler
        .schedule(25, 0, Difficulty::Easy)
        .await
        .unwrap_err();

    assert_eq!(err, AlarmError::InvalidTime { hour: 25, minute: 0 });
    assert!(h.state.scheduler.list().await.is_empty());
}

#[tokio::test]
async fn list_is_ordered_and_cancel_removes() {
    let h = harness();
    let scheduler = &h.state.scheduler;
    let now = at(6, 0, 0);

    let late = scheduler.schedule_at(now, 9, 0, Difficulty::Hard).await.unwrap();
    let early = scheduler.schedule_at(now, 7, 0, Difficulty::Easy).await.unwrap();

    let labels: Vec<String> = scheduler.list().await.iter().map(|a| a.label()).collect();
    assert_eq!(labels, vec!["07:00 - easy", "09:00 - hard"]);

    assert_eq!(scheduler.cancel(late.id).await.unwrap(), late);
    assert_eq!(
        scheduler.cancel(late.id).await.unwrap_err(),
        AlarmError::AlarmNotFound(late.id)
    );

    assert_eq!(scheduler.cancel_at(0).await.unwrap(), early);
    assert!(scheduler.cancel_at(0).await.is_err());
}

#[tokio::test]
async fn simultaneous_alarms_fire_exactly_once_each() {
    let h = harness();
    let scheduler = &h.state.scheduler;
    let mut rx = h.state.events.subscribe();
    let now = at(6, 0, 0);

    scheduler.schedule_at(now, 6, 30, Difficulty::Easy).await.unwrap();
    scheduler.schedule_at(now, 6, 30, Difficulty::Hard).await.unwrap();
    scheduler.schedule_at(now, 8, 0, Difficulty::Easy).await.unwrap();

    assert!(scheduler.tick(at(6, 29, 59)).await.is_empty());
    assert_eq!(scheduler.tick(at(6, 30, 0)).await.len(), 2);
    assert!(scheduler.tick(at(6, 30, 15)).await.is_empty());
    assert!(scheduler.tick(at(6, 45, 0)).await.is_empty());

    assert_eq!(drain_fired(&mut rx), 2);
    assert_eq!(scheduler.list().await.len(), 1);
}

#[tokio::test]
async fn late_tick_still_fires_overdue_alarm() {
    let h = harness();
    let scheduler = &h.state.scheduler;
    let alarm = scheduler
        .schedule_at(at(6, 0, 0), 6, 30, Difficulty::Medium)
        .await
        .unwrap();

    let fired = scheduler.tick(at(9, 15, 0)).await;
    assert_eq!(fired, vec![alarm]);
    assert_eq!(scheduler.ring().state(), RingState::Ringing);
}

#[tokio::test(start_paused = true)]
async fn solving_the_puzzle_stops_the_ring() {
    let h = harness();
    let scheduler = &h.state.scheduler;
    let mut rx = h.state.events.subscribe();

    scheduler
        .schedule_at(at(6, 0, 0), 6, 30, Difficulty::Easy)
        .await
        .unwrap();
    scheduler.tick(at(6, 30, 0)).await;
    assert_eq!(scheduler.ring().state(), RingState::Ringing);

    let fired = loop {
        match rx.recv().await.unwrap() {
            AlarmEvent::AlarmFired { description, .. } => break description,
            _ => continue,
        }
    };
    assert_eq!(fired, "Find the best move for White");

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert!(h.bell.rings() >= 2);

    assert_eq!(
        h.state.puzzles.submit_move("f3g5").await,
        SubmitOutcome::Rejected(chess_alarm_lib::session::MoveRejection::WrongMove)
    );
    assert_eq!(scheduler.ring().state(), RingState::Ringing);

    assert_eq!(
        h.state.puzzles.submit_move("f3e5").await,
        SubmitOutcome::Accepted(SolvedKind::AlarmStopped)
    );

    tokio::time::timeout(Duration::from_secs(3), scheduler.wait_for_sound_loop())
        .await
        .expect("sound loop must stop within one repeat interval");
    assert_eq!(scheduler.ring().state(), RingState::Idle);
    assert_eq!(h.bell.silences(), 1);

    let rings = h.bell.rings();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.bell.rings(), rings);
}

#[tokio::test(start_paused = true)]
async fn second_alarm_while_ringing_joins_the_same_ring() {
    let h = harness();
    let scheduler = &h.state.scheduler;

    scheduler
        .schedule_at(at(6, 0, 0), 6, 30, Difficulty::Easy)
        .await
        .unwrap();
    scheduler
        .schedule_at(at(6, 0, 0), 6, 31, Difficulty::Easy)
        .await
        .unwrap();

    scheduler.tick(at(6, 30, 0)).await;
    let first = h.state.puzzles.snapshot().await.ticket;
    scheduler.tick(at(6, 31, 0)).await;
    let second = h.state.puzzles.snapshot().await.ticket;
    assert!(second > first);
    assert_eq!(scheduler.ring().state(), RingState::Ringing);

    assert!(h.state.puzzles.submit_move("f3e5").await.is_accepted());
    scheduler.wait_for_sound_loop().await;
    assert_eq!(scheduler.ring().state(), RingState::Idle);
    assert_eq!(h.bell.silences(), 1);
}

#[tokio::test(start_paused = true)]
async fn next_alarm_rings_again_after_dismissal() {
    let h = harness();
    let scheduler = &h.state.scheduler;

    scheduler
        .schedule_at(at(6, 0, 0), 6, 30, Difficulty::Easy)
        .await
        .unwrap();
    scheduler
        .schedule_at(at(6, 0, 0), 7, 0, Difficulty::Easy)
        .await
        .unwrap();

    scheduler.tick(at(6, 30, 0)).await;
    assert!(h.state.puzzles.submit_move("f3e5").await.is_accepted());

    // Fire the next one straight away; it waits for the reset to Idle.
    scheduler.tick(at(7, 0, 0)).await;
    assert_eq!(scheduler.ring().state(), RingState::Ringing);

    assert!(h.state.puzzles.submit_move("f3e5").await.is_accepted());
    scheduler.wait_for_sound_loop().await;
    assert_eq!(scheduler.ring().state(), RingState::Idle);
}

#[tokio::test]
async fn practice_solve_has_no_alarm_side_effect() {
    let h = harness();
    h.state.puzzles.start_practice().await.unwrap();

    assert_eq!(
        h.state.puzzles.submit_move("f3e5").await,
        SubmitOutcome::Accepted(SolvedKind::PuzzleSolved)
    );
    assert_eq!(h.state.scheduler.ring().state(), RingState::Idle);
    assert_eq!(h.bell.rings(), 0);
}

#[tokio::test]
async fn polling_loop_stops_on_cancel() {
    let h = harness();
    let shutdown = CancellationToken::new();
    let handle = h
        .state
        .scheduler
        .spawn(Duration::from_millis(10), shutdown.clone());

    tokio::time::sleep(Duration::from_millis(30)).await;
    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler should exit after cancel")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn polling_loop_fires_an_overdue_alarm() {
    let h = harness();
    let mut rx = h.state.events.subscribe();
    let long_ago = NaiveDate::from_ymd_opt(2020, 1, 1)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();
    let alarm = h
        .state
        .scheduler
        .schedule_at(long_ago, 6, 30, Difficulty::Easy)
        .await
        .unwrap();

    let shutdown = CancellationToken::new();
    let handle = h
        .state
        .scheduler
        .spawn(Duration::from_secs(15), shutdown.clone());

    let fired = tokio::time::timeout(Duration::from_secs(20), async {
        loop {
            if let AlarmEvent::AlarmFired { alarm, .. } = rx.recv().await.unwrap() {
                break alarm;
            }
        }
    })
    .await
    .expect("the polling loop should fire the overdue alarm");

    assert_eq!(fired.id, alarm.id);
    assert!(h.state.scheduler.list().await.is_empty());
    assert_eq!(h.state.scheduler.ring().state(), RingState::Ringing);

    shutdown.cancel();
    handle.await.unwrap();
}
