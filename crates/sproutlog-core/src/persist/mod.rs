//! Local persistence: the backing key/value contract, the JSON codec, the
//! one-shot load pipeline and the debounced write scheduler.

pub mod backing;
pub(crate) mod codec;
pub(crate) mod loader;
pub(crate) mod writer;

pub use backing::{BackingStore, FileStore, MemoryStore};

/// Stable backing-store keys, one per collection plus the active profile.
pub mod keys {
    pub const FEEDING_RECORDS: &str = "feedingRecords";
    pub const SLEEP_RECORDS: &str = "sleepRecords";
    pub const NAPPY_RECORDS: &str = "nappyRecords";
    pub const MILESTONES: &str = "milestones";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const REMINDERS: &str = "reminders";
    pub const BABY: &str = "baby";

    /// Every key this subsystem owns; `clear_all_data` removes exactly these.
    pub const ALL: &[&str] = &[
        FEEDING_RECORDS,
        SLEEP_RECORDS,
        NAPPY_RECORDS,
        MILESTONES,
        ACHIEVEMENTS,
        REMINDERS,
        BABY,
    ];
}
