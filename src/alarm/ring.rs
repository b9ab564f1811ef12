use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Process-wide ring cycle: `Idle -> Ringing -> Dismissed -> Idle`.
///
/// The scheduler moves `Idle -> Ringing` and `Dismissed -> Idle`; the puzzle
/// controller moves `Ringing -> Dismissed`. Every transition is a
/// compare-and-set on the watch channel, so readers never act on a state that
/// a writer has already replaced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RingState {
    Idle,
    Ringing,
    Dismissed,
}

impl Default for RingState {
    fn default() -> Self {
        RingState::Idle
    }
}

#[derive(Clone)]
pub struct AlarmRing {
    tx: Arc<watch::Sender<RingState>>,
}

impl AlarmRing {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RingState::Idle);
        Self { tx: Arc::new(tx) }
    }

    pub fn state(&self) -> RingState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<RingState> {
        self.tx.subscribe()
    }

    /// `Idle -> Ringing`. False if a ring cycle is already in progress.
    pub(crate) fn start_ringing(&self) -> bool {
        self.transition(RingState::Idle, RingState::Ringing)
    }

    /// `Ringing -> Dismissed`. False when nothing is ringing.
    pub(crate) fn dismiss(&self) -> bool {
        self.transition(RingState::Ringing, RingState::Dismissed)
    }

    /// `Dismissed -> Idle`, once the sound loop has stopped.
    pub(crate) fn reset(&self) -> bool {
        self.transition(RingState::Dismissed, RingState::Idle)
    }

    fn transition(&self, from: RingState, to: RingState) -> bool {
        self.tx.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }
}

impl Default for AlarmRing {
    fn default() -> Self {
        Self::new()
    }
}
