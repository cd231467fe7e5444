//! sproutlog-core - local data persistence and caching for infant care
//! tracking.
//!
//! The crate centers on [`Tracker`]: an explicitly constructed service that
//! owns the in-memory record store for every tracked collection (feedings,
//! sleep, nappies, milestones, achievements, reminders) plus the active
//! [`Baby`] profile. Mutations are synchronous and infallible from the
//! caller's side; durability is handled by a debounced write scheduler that
//! coalesces bursts of changes into one concurrent per-collection flush to a
//! pluggable [`BackingStore`]. Frequently-read aggregates (today's counts,
//! last and next feeding) come from a time-windowed cache that mutations
//! invalidate eagerly.
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use sproutlog_core::{FeedingRecord, FeedingType, MemoryStore, Tracker};
//!
//! # async fn run() {
//! let tracker = Tracker::new(Arc::new(MemoryStore::new()));
//! tracker.load().await;
//! tracker.add_feeding(FeedingRecord::new(FeedingType::Bottle, Utc::now()));
//! assert_eq!(tracker.today_feeding_count(), 1);
//! tracker.shutdown().await;
//! # }
//! ```

pub mod cache;
mod catalog;
pub mod error;
pub mod logging;
pub mod models;
pub mod persist;
pub mod store;
pub mod tracker;

pub use cache::AggregateStats;
pub use error::StoreError;
pub use models::{
    Achievement, Baby, BreastSide, FeedingRecord, FeedingType, Milestone, NappyKind, NappyRecord,
    RecentRecord, Reminder, ReminderKind, SleepRecord,
};
pub use persist::{keys, BackingStore, FileStore, MemoryStore};
pub use store::{ChangeEvent, Collection, Collections};
pub use tracker::{Diagnostics, Tracker};
