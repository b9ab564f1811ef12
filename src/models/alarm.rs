use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Difficulty;

/// A one-shot wake-up. Removed from the pending set the moment it fires.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: Uuid,
    /// Local wall-clock instant, second precision.
    pub fire_at: NaiveDateTime,
    pub difficulty: Difficulty,
}

impl Alarm {
    pub fn new(fire_at: NaiveDateTime, difficulty: Difficulty) -> Self {
        Self {
            id: Uuid::new_v4(),
            fire_at,
            difficulty,
        }
    }

    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        self.fire_at <= now
    }

    /// `HH:MM - difficulty`, as shown in the alarm list.
    pub fn label(&self) -> String {
        format!("{} - {}", self.fire_at.format("%H:%M"), self.difficulty)
    }
}
