use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{FeedingRecord, NappyRecord, SleepRecord};

/// One entry in the merged feeding/sleep/nappy timeline.
///
/// The three record shapes share nothing but an identifier and a primary
/// timestamp, so the merged view carries the whole record and exposes a
/// single ordering key via [`RecentRecord::recorded_at`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecentRecord {
    Feeding(FeedingRecord),
    Sleep(SleepRecord),
    Nappy(NappyRecord),
}

impl RecentRecord {
    /// The ordering key for the merged timeline. Sleep sessions sort by
    /// their start, open-ended or not.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        match self {
            RecentRecord::Feeding(r) => r.timestamp,
            RecentRecord::Sleep(r) => r.start,
            RecentRecord::Nappy(r) => r.timestamp,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            RecentRecord::Feeding(r) => r.id,
            RecentRecord::Sleep(r) => r.id,
            RecentRecord::Nappy(r) => r.id,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RecentRecord::Feeding(_) => "feeding",
            RecentRecord::Sleep(_) => "sleep",
            RecentRecord::Nappy(_) => "nappy",
        }
    }
}
