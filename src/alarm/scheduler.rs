use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Local, NaiveDateTime, Timelike};
use log::{info, warn};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    bell::AlarmBell,
    error::{AlarmError, Result},
    events::{AlarmEvent, EventBroadcaster, WAKE_UP_MESSAGE},
    models::{Alarm, Difficulty},
    session::PuzzleController,
};

use super::{sound_loop::sound_loop, AlarmRing, RingState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Owns the pending alarms, fires them when due and drives the ring cycle.
#[derive(Clone)]
pub struct AlarmScheduler {
    alarms: Arc<Mutex<Vec<Alarm>>>,
    ring: AlarmRing,
    puzzles: PuzzleController,
    bell: Arc<dyn AlarmBell>,
    events: EventBroadcaster,
    ring_interval: Duration,
    sound_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

/// Today at `hour:minute:00`, or tomorrow if that is not after `now`.
pub fn next_fire_at(now: NaiveDateTime, hour: u32, minute: u32) -> Result<NaiveDateTime> {
    if hour > 23 || minute > 59 {
        return Err(AlarmError::InvalidTime { hour, minute });
    }
    let today = now
        .date()
        .and_hms_opt(hour, minute, 0)
        .ok_or(AlarmError::InvalidTime { hour, minute })?;

    if today <= now {
        Ok(today + ChronoDuration::hours(24))
    } else {
        Ok(today)
    }
}

/// Local wall-clock time truncated to whole seconds.
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

impl AlarmScheduler {
    pub fn new(
        ring: AlarmRing,
        puzzles: PuzzleController,
        bell: Arc<dyn AlarmBell>,
        events: EventBroadcaster,
        ring_interval: Duration,
    ) -> Self {
        Self {
            alarms: Arc::new(Mutex::new(Vec::new())),
            ring,
            puzzles,
            bell,
            events,
            ring_interval,
            sound_task: Arc::new(Mutex::new(None)),
        }
    }

    pub fn ring(&self) -> &AlarmRing {
        &self.ring
    }

    pub async fn schedule(&self, hour: u32, minute: u32, difficulty: Difficulty) -> Result<Alarm> {
        self.schedule_at(local_now(), hour, minute, difficulty).await
    }

    /// Like [`schedule`](Self::schedule) with an explicit "now".
    pub async fn schedule_at(
        &self,
        now: NaiveDateTime,
        hour: u32,
        minute: u32,
        difficulty: Difficulty,
    ) -> Result<Alarm> {
        let fire_at = next_fire_at(now, hour, minute)?;
        let alarm = Alarm::new(fire_at, difficulty);

        self.alarms.lock().await.push(alarm.clone());

        info!("Alarm {} set for {}", alarm.id, alarm.fire_at);
        self.events.emit(AlarmEvent::AlarmScheduled {
            alarm: alarm.clone(),
        });
        Ok(alarm)
    }

    pub async fn cancel(&self, id: Uuid) -> Result<Alarm> {
        let removed = {
            let mut alarms = self.alarms.lock().await;
            let index = alarms
                .iter()
                .position(|alarm| alarm.id == id)
                .ok_or(AlarmError::AlarmNotFound(id))?;
            alarms.remove(index)
        };

        info!("Alarm {} cancelled", removed.id);
        self.events.emit(AlarmEvent::AlarmCancelled { alarm_id: id });
        Ok(removed)
    }

    /// Cancels the alarm at `index` of the [`list`](Self::list) order.
    pub async fn cancel_at(&self, index: usize) -> Result<Alarm> {
        let id = self
            .list()
            .await
            .get(index)
            .map(|alarm| alarm.id)
            .ok_or_else(|| AlarmError::InvalidInput(format!("no alarm at position {index}")))?;
        self.cancel(id).await
    }

    /// Pending alarms, soonest first.
    pub async fn list(&self) -> Vec<Alarm> {
        let mut alarms = self.alarms.lock().await.clone();
        alarms.sort_by_key(|alarm| alarm.fire_at);
        alarms
    }

    /// Fires every alarm due at `now`. Due alarms leave the pending set under
    /// a single lock, so each fires exactly once. A failure firing one alarm
    /// is logged and does not stop the others.
    pub async fn tick(&self, now: NaiveDateTime) -> Vec<Alarm> {
        let due: Vec<Alarm> = {
            let mut alarms = self.alarms.lock().await;
            let (due, pending): (Vec<Alarm>, Vec<Alarm>) =
                alarms.drain(..).partition(|alarm| alarm.is_due(now));
            *alarms = pending;
            due
        };

        for alarm in &due {
            if let Err(err) = self.fire(alarm).await {
                log_error!("Failed to fire alarm {}: {err}", alarm.id);
                self.events.emit(AlarmEvent::AlarmFireFailed {
                    alarm_id: alarm.id,
                    error: err.to_string(),
                });
            }
        }
        due
    }

    /// Loads a puzzle for `alarm` and starts ringing. If an alarm is already
    /// ringing, the new puzzle replaces the old one and the existing sound
    /// loop keeps going.
    pub async fn fire(&self, alarm: &Alarm) -> Result<()> {
        self.wait_for_reset().await;

        let session = self.puzzles.start_for_alarm(alarm.difficulty).await?;
        let started = session.started_ringing;
        let description = session.snapshot.description.unwrap_or_default();

        log_info!(
            "Alarm {} fired ({}); puzzle: {description}",
            alarm.id,
            alarm.difficulty
        );
        self.events.emit(AlarmEvent::AlarmFired {
            alarm: alarm.clone(),
            description,
            message: WAKE_UP_MESSAGE.to_string(),
        });

        if started {
            self.spawn_sound_loop().await;
        } else {
            log_debug!("Already ringing; alarm {} joins the current ring", alarm.id);
        }
        Ok(())
    }

    /// Polls every `tick_interval` until `cancel` fires. A late tick still
    /// catches alarms whose time has passed.
    pub async fn run(&self, tick_interval: Duration, cancel: CancellationToken) {
        let mut ticker = time::interval(tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log_info!("Alarm scheduler polling every {:?}", tick_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let fired = self.tick(local_now()).await;
                    if !fired.is_empty() {
                        log_debug!("{} alarm(s) fired this tick", fired.len());
                    }
                }
                _ = cancel.cancelled() => {
                    log_info!("Alarm scheduler shutting down");
                    break;
                }
            }
        }
    }

    pub fn spawn(&self, tick_interval: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move { scheduler.run(tick_interval, cancel).await })
    }

    /// Waits until a finished sound loop for this ring has stopped.
    pub async fn wait_for_sound_loop(&self) {
        let handle = self.sound_task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("Sound loop task failed: {err}");
            }
        }
    }

    async fn spawn_sound_loop(&self) {
        let mut task = self.sound_task.lock().await;
        if let Some(previous) = task.take() {
            if !previous.is_finished() {
                previous.abort();
            }
        }
        *task = Some(tokio::spawn(sound_loop(
            self.ring.clone(),
            self.bell.clone(),
            self.events.clone(),
            self.ring_interval,
        )));
    }

    /// A dismissed ring must be reset by its sound loop before the next
    /// alarm may ring. Falls back to resetting here if the loop is gone.
    async fn wait_for_reset(&self) {
        if self.ring.state() != RingState::Dismissed {
            return;
        }

        let mut rx = self.ring.subscribe();
        let wait = async {
            while *rx.borrow_and_update() == RingState::Dismissed {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        };
        if time::timeout(self.ring_interval * 2, wait).await.is_err() {
            log_warn!("Sound loop did not reset the ring; resetting it now");
            self.ring.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bell::SilentBell, models::PuzzleRecord, puzzles::PuzzleRepository};
    use chrono::NaiveDate;

    const ITALIAN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1";

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    #[test]
    fn later_today_stays_today() {
        let now = at(6, 0, 0);
        assert_eq!(next_fire_at(now, 7, 30).unwrap(), at(7, 30, 0));
    }

    #[test]
    fn one_minute_ago_rolls_forward_a_full_day() {
        let now = at(7, 31, 0);
        let fire_at = next_fire_at(now, 7, 30).unwrap();
        assert_eq!(fire_at - at(7, 30, 0), ChronoDuration::hours(24));
        assert_eq!(fire_at - now, ChronoDuration::hours(24) - ChronoDuration::minutes(1));
    }

    #[test]
    fn exactly_now_is_not_in_the_future() {
        let now = at(7, 30, 0);
        assert_eq!(next_fire_at(now, 7, 30).unwrap(), at(7, 30, 0) + ChronoDuration::hours(24));
    }

    #[test]
    fn every_valid_time_lands_within_the_next_day() {
        let now = at(13, 17, 42);
        for hour in 0..24 {
            for minute in 0..60 {
                let fire_at = next_fire_at(now, hour, minute).unwrap();
                assert!(fire_at > now);
                assert!(fire_at - now <= ChronoDuration::hours(24));
                assert_eq!(fire_at.second(), 0);
            }
        }
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        let now = at(6, 0, 0);
        assert_eq!(
            next_fire_at(now, 25, 0).unwrap_err(),
            AlarmError::InvalidTime { hour: 25, minute: 0 }
        );
        assert!(next_fire_at(now, 23, 60).is_err());
    }

    #[tokio::test]
    async fn failed_alarm_is_reported_and_others_still_fire() {
        let repo = PuzzleRepository::unchecked(vec![
            PuzzleRecord::new("not a position", "Broken", "e2e4", Difficulty::Hard),
            PuzzleRecord::new(ITALIAN, "Find the best move for White", "f3e5", Difficulty::Easy),
        ]);
        let ring = AlarmRing::new();
        let events = EventBroadcaster::new();
        let puzzles = PuzzleController::new(Arc::new(repo), ring.clone(), events.clone());
        let scheduler = AlarmScheduler::new(
            ring.clone(),
            puzzles,
            Arc::new(SilentBell::new()),
            events.clone(),
            Duration::from_secs(3),
        );
        let mut rx = events.subscribe();

        let broken = scheduler
            .schedule_at(at(6, 0, 0), 6, 30, Difficulty::Hard)
            .await
            .unwrap();
        let good = scheduler
            .schedule_at(at(6, 0, 0), 6, 30, Difficulty::Easy)
            .await
            .unwrap();

        assert_eq!(scheduler.tick(at(6, 30, 0)).await.len(), 2);
        assert!(scheduler.list().await.is_empty());
        assert_eq!(ring.state(), RingState::Ringing);

        let mut failed = Vec::new();
        let mut fired = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                AlarmEvent::AlarmFireFailed { alarm_id, .. } => failed.push(alarm_id),
                AlarmEvent::AlarmFired { alarm, .. } => fired.push(alarm.id),
                _ => {}
            }
        }
        assert_eq!(failed, vec![broken.id]);
        assert_eq!(fired, vec![good.id]);

        // The failed alarm is gone for good, not retried.
        assert!(scheduler.tick(at(6, 31, 0)).await.is_empty());
    }
}
