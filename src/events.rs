use log::debug;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    models::{Alarm, Difficulty},
    session::SessionTicket,
};

const EVENT_BUFFER_SIZE: usize = 64;

pub const WAKE_UP_MESSAGE: &str = "Time to wake up! Solve the chess puzzle to stop the alarm.";

/// Notifications for whatever front end is attached. The core never calls
/// into a UI; it only publishes these.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AlarmEvent {
    #[serde(rename_all = "camelCase")]
    AlarmScheduled { alarm: Alarm },
    #[serde(rename_all = "camelCase")]
    AlarmCancelled { alarm_id: Uuid },
    /// `onAlarmFired(description)`
    #[serde(rename_all = "camelCase")]
    AlarmFired {
        alarm: Alarm,
        description: String,
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    AlarmFireFailed { alarm_id: Uuid, error: String },
    /// One repeat of the alarm tone.
    #[serde(rename_all = "camelCase")]
    AlarmSignal { count: u32 },
    /// `onAlarmDismissed()`
    AlarmDismissed,
    /// The sound loop has stopped and the next alarm may ring.
    AlarmReset,
    #[serde(rename_all = "camelCase")]
    PuzzleLoaded {
        ticket: SessionTicket,
        description: String,
        difficulty: Difficulty,
    },
    #[serde(rename_all = "camelCase")]
    PuzzleSolved { ticket: SessionTicket },
}

#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<AlarmEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_BUFFER_SIZE);
        Self { tx }
    }

    /// Dropped silently when nobody is listening.
    pub fn emit(&self, event: AlarmEvent) {
        if self.tx.send(event).is_err() {
            debug!("No subscribers for alarm event");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlarmEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
