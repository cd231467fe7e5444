use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sleep session. `end` stays `None` while the baby is still asleep;
/// closing the session is an ordinary update keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub id: Uuid,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl SleepRecord {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end: None,
            notes: None,
        }
    }

    /// Session length in hours, only for sessions with both endpoints.
    pub fn duration_hours(&self) -> Option<f64> {
        self.end
            .map(|end| (end - self.start).num_minutes() as f64 / 60.0)
    }

    pub fn is_ongoing(&self) -> bool {
        self.end.is_none()
    }
}
