use std::sync::Arc;

use tokio::time::{self, Duration, MissedTickBehavior};

use crate::{
    bell::AlarmBell,
    events::{AlarmEvent, EventBroadcaster},
};

use super::{AlarmRing, RingState};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Rings `bell` every `repeat` while the ring state is `Ringing`. Wakes as
/// soon as the state changes, so a dismissal is never missed or delayed by a
/// full repeat. On exit it silences the bell and resets the ring to `Idle`.
pub async fn sound_loop(
    ring: AlarmRing,
    bell: Arc<dyn AlarmBell>,
    events: EventBroadcaster,
    repeat: Duration,
) {
    let mut state_rx = ring.subscribe();
    let mut ticker = time::interval(repeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut count: u32 = 0;

    loop {
        if *state_rx.borrow_and_update() != RingState::Ringing {
            break;
        }

        tokio::select! {
            biased;
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = ticker.tick() => {
                if ring.state() != RingState::Ringing {
                    break;
                }
                count = count.wrapping_add(1);
                log_debug!("alarm signal #{count}");
                bell.ring();
                events.emit(AlarmEvent::AlarmSignal { count });
            }
        }
    }

    bell.silence();
    if ring.reset() {
        log_info!("sound loop stopped after {count} signals; ring reset to idle");
        events.emit(AlarmEvent::AlarmReset);
    }
}
