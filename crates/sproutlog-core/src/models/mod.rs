//! Data models for tracked care records.
//!
//! This module contains all the data structures held by the record store:
//!
//! - `FeedingRecord`, `SleepRecord`, `NappyRecord`: day-to-day care events
//! - `Milestone`, `Achievement`: catalog-seeded progress entries
//! - `Reminder`: appointments, vaccinations and other dated to-dos
//! - `Baby`: the active profile being tracked
//! - `RecentRecord`: feeding/sleep/nappy merged into one timeline entry

pub mod baby;
pub mod feeding;
pub mod milestone;
pub mod nappy;
pub mod recent;
pub mod reminder;
pub mod sleep;

pub use baby::Baby;
pub use feeding::{BreastSide, FeedingRecord, FeedingType};
pub use milestone::{Achievement, Milestone};
pub use nappy::{NappyKind, NappyRecord};
pub use recent::RecentRecord;
pub use reminder::{Reminder, ReminderKind};
pub use sleep::SleepRecord;

use uuid::Uuid;

/// Records addressable by their generated identifier.
///
/// Identifiers are assigned once at creation and never reused; replace and
/// remove operations in the store key off this value.
pub(crate) trait Identified {
    fn ident(&self) -> Uuid;
}

impl Identified for FeedingRecord {
    fn ident(&self) -> Uuid {
        self.id
    }
}

impl Identified for SleepRecord {
    fn ident(&self) -> Uuid {
        self.id
    }
}

impl Identified for NappyRecord {
    fn ident(&self) -> Uuid {
        self.id
    }
}

impl Identified for Milestone {
    fn ident(&self) -> Uuid {
        self.id
    }
}

impl Identified for Achievement {
    fn ident(&self) -> Uuid {
        self.id
    }
}

impl Identified for Reminder {
    fn ident(&self) -> Uuid {
        self.id
    }
}
