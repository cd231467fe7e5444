//! The tracking service: the one object UI layers talk to.
//!
//! A `Tracker` owns the record store, the aggregate cache, the backing
//! store and the write scheduler. It is constructed explicitly and passed
//! to consumers; nothing here is global. Mutations are synchronous and
//! never fail; persistence happens behind the debounce window and absorbs
//! its own errors. The only caller-visible effect of a persistence failure
//! is that data may not survive a restart.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::info;
use uuid::Uuid;

use crate::cache::{AggregateStats, StatsCache};
use crate::catalog;
use crate::models::{
    Achievement, Baby, FeedingRecord, Milestone, NappyRecord, RecentRecord, Reminder, SleepRecord,
};
use crate::persist::writer::{WriterHandle, DEFAULT_QUIESCENCE};
use crate::persist::{loader, BackingStore, FileStore};
use crate::store::{ChangeEvent, Collections, RecordStore};

/// Read-only operational snapshot, for debug surfaces only.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub total_records: usize,
    pub last_flush: Option<DateTime<Utc>>,
    pub cache_age: Option<chrono::Duration>,
    pub loaded: bool,
}

pub struct Tracker {
    store: RecordStore,
    cache: Arc<StatsCache>,
    backing: Arc<dyn BackingStore>,
    writer: WriterHandle,
    loaded: AtomicBool,
}

impl Tracker {
    /// Build against any backing store with the default 1 s debounce window.
    /// Must be called from within a tokio runtime.
    pub fn new(backing: Arc<dyn BackingStore>) -> Self {
        Self::with_quiescence(backing, DEFAULT_QUIESCENCE)
    }

    pub fn with_quiescence(backing: Arc<dyn BackingStore>, quiescence: Duration) -> Self {
        let store = RecordStore::new();
        let cache = Arc::new(StatsCache::new());
        let writer = WriterHandle::spawn(
            store.clone(),
            Arc::clone(&cache),
            Arc::clone(&backing),
            quiescence,
        );
        Self {
            store,
            cache,
            backing,
            writer,
            loaded: AtomicBool::new(false),
        }
    }

    /// Convenience constructor over a file-per-key store in `dir`.
    pub fn open(dir: PathBuf) -> Result<Self> {
        let backing = FileStore::new(dir.clone())
            .with_context(|| format!("opening data directory {}", dir.display()))?;
        Ok(Self::new(Arc::new(backing)))
    }

    // =========================================================================
    // Load pipeline
    // =========================================================================

    /// One-shot bootstrap from the backing store.
    ///
    /// Reads every collection (substituting empty for missing or corrupt
    /// blobs), publishes them into the store as a single atomic replace,
    /// then backfills the milestone/achievement catalogs. Returns whether
    /// this call performed the load; later and concurrent calls are no-ops.
    pub async fn load(&self) -> bool {
        if self
            .loaded
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let backing = Arc::clone(&self.backing);
        let mut collections =
            tokio::task::spawn_blocking(move || loader::load_collections(backing.as_ref()))
                .await
                .unwrap_or_default();
        let seeded = catalog::seed(&mut collections);
        let records = collections.total_records();

        self.store.replace_all(collections);
        self.cache.invalidate();
        if seeded {
            self.writer.request_save();
        }
        info!(records, seeded, "record store loaded");
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn after_mutation(&self, changed: bool, touches_stats: bool) -> bool {
        if changed {
            if touches_stats {
                self.cache.invalidate();
            }
            self.writer.request_save();
        }
        changed
    }

    // =========================================================================
    // Feedings
    // =========================================================================

    pub fn feedings(&self) -> Vec<FeedingRecord> {
        self.store.feedings()
    }

    pub fn add_feeding(&self, record: FeedingRecord) {
        self.store.push_feeding(record);
        self.after_mutation(true, true);
    }

    pub fn update_feeding(&self, record: FeedingRecord) -> bool {
        let changed = self.store.replace_feeding(record);
        self.after_mutation(changed, true)
    }

    pub fn remove_feeding(&self, id: Uuid) -> bool {
        let changed = self.store.remove_feeding(id);
        self.after_mutation(changed, true)
    }

    // =========================================================================
    // Sleep
    // =========================================================================

    pub fn sleeps(&self) -> Vec<SleepRecord> {
        self.store.sleeps()
    }

    pub fn add_sleep(&self, record: SleepRecord) {
        self.store.push_sleep(record);
        self.after_mutation(true, true);
    }

    pub fn update_sleep(&self, record: SleepRecord) -> bool {
        let changed = self.store.replace_sleep(record);
        self.after_mutation(changed, true)
    }

    pub fn remove_sleep(&self, id: Uuid) -> bool {
        let changed = self.store.remove_sleep(id);
        self.after_mutation(changed, true)
    }

    // =========================================================================
    // Nappies
    // =========================================================================

    pub fn nappies(&self) -> Vec<NappyRecord> {
        self.store.nappies()
    }

    pub fn add_nappy(&self, record: NappyRecord) {
        self.store.push_nappy(record);
        self.after_mutation(true, true);
    }

    pub fn update_nappy(&self, record: NappyRecord) -> bool {
        let changed = self.store.replace_nappy(record);
        self.after_mutation(changed, true)
    }

    pub fn remove_nappy(&self, id: Uuid) -> bool {
        let changed = self.store.remove_nappy(id);
        self.after_mutation(changed, true)
    }

    // =========================================================================
    // Milestones
    // =========================================================================

    pub fn milestones(&self) -> Vec<Milestone> {
        self.store.milestones()
    }

    pub fn add_milestone(&self, milestone: Milestone) {
        self.store.push_milestone(milestone);
        self.after_mutation(true, false);
    }

    pub fn update_milestone(&self, milestone: Milestone) -> bool {
        let changed = self.store.replace_milestone(milestone);
        self.after_mutation(changed, false)
    }

    pub fn remove_milestone(&self, id: Uuid) -> bool {
        let changed = self.store.remove_milestone(id);
        self.after_mutation(changed, false)
    }

    /// Stamp a milestone achieved. Missing id is a no-op.
    pub fn achieve_milestone(&self, id: Uuid, at: DateTime<Utc>) -> bool {
        let Some(mut milestone) = self.store.milestones().into_iter().find(|m| m.id == id) else {
            return false;
        };
        milestone.achieved_at = Some(at);
        self.update_milestone(milestone)
    }

    // =========================================================================
    // Achievements
    // =========================================================================

    pub fn achievements(&self) -> Vec<Achievement> {
        self.store.achievements()
    }

    pub fn add_achievement(&self, achievement: Achievement) {
        self.store.push_achievement(achievement);
        self.after_mutation(true, false);
    }

    pub fn update_achievement(&self, achievement: Achievement) -> bool {
        let changed = self.store.replace_achievement(achievement);
        self.after_mutation(changed, false)
    }

    pub fn remove_achievement(&self, id: Uuid) -> bool {
        let changed = self.store.remove_achievement(id);
        self.after_mutation(changed, false)
    }

    // =========================================================================
    // Reminders
    // =========================================================================

    pub fn reminders(&self) -> Vec<Reminder> {
        self.store.reminders()
    }

    pub fn add_reminder(&self, reminder: Reminder) {
        self.store.push_reminder(reminder);
        self.after_mutation(true, false);
    }

    pub fn update_reminder(&self, reminder: Reminder) -> bool {
        let changed = self.store.replace_reminder(reminder);
        self.after_mutation(changed, false)
    }

    pub fn remove_reminder(&self, id: Uuid) -> bool {
        let changed = self.store.remove_reminder(id);
        self.after_mutation(changed, false)
    }

    /// Mark a reminder done. Missing id is a no-op.
    pub fn complete_reminder(&self, id: Uuid) -> bool {
        let Some(mut reminder) = self.store.reminders().into_iter().find(|r| r.id == id) else {
            return false;
        };
        reminder.completed = true;
        self.update_reminder(reminder)
    }

    // =========================================================================
    // Active profile
    // =========================================================================

    pub fn baby(&self) -> Option<Baby> {
        self.store.baby()
    }

    pub fn set_baby(&self, baby: Option<Baby>) {
        self.store.set_baby(baby);
        self.after_mutation(true, false);
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    fn stats(&self) -> AggregateStats {
        self.cache.get_or_compute(|| self.store.snapshot())
    }

    pub fn today_feeding_count(&self) -> usize {
        self.stats().feedings_today
    }

    pub fn today_nappy_count(&self) -> usize {
        self.stats().nappies_today
    }

    pub fn today_sleep_hours(&self) -> f64 {
        self.stats().sleep_hours_today
    }

    pub fn last_feeding(&self) -> Option<(Uuid, DateTime<Utc>)> {
        self.stats().last_feeding
    }

    pub fn next_feeding_estimate(&self) -> Option<DateTime<Utc>> {
        self.stats().next_feeding_estimate
    }

    /// The full aggregate snapshot in one read.
    pub fn aggregates(&self) -> AggregateStats {
        self.stats()
    }

    /// Feeding, sleep and nappy records merged into one timeline, newest
    /// first (stable order for equal timestamps), truncated to `limit`.
    pub fn recent_records(&self, limit: usize) -> Vec<RecentRecord> {
        let snapshot = self.store.snapshot();
        let mut merged: Vec<RecentRecord> = snapshot
            .feedings
            .into_iter()
            .map(RecentRecord::Feeding)
            .chain(snapshot.sleeps.into_iter().map(RecentRecord::Sleep))
            .chain(snapshot.nappies.into_iter().map(RecentRecord::Nappy))
            .collect();
        merged.sort_by_key(|r| std::cmp::Reverse(r.recorded_at()));
        merged.truncate(limit);
        merged
    }

    // =========================================================================
    // Maintenance & diagnostics
    // =========================================================================

    /// Reset everything: empty collections plus freshly seeded catalogs in
    /// memory immediately, and every durable key removed via the worker.
    pub async fn clear_all_data(&self) {
        let mut fresh = Collections::default();
        catalog::seed(&mut fresh);
        self.store.reset(fresh);
        self.cache.invalidate();
        self.writer.clear_keys().await;
        info!("all tracked data cleared");
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            total_records: self.store.total_records(),
            last_flush: self.writer.last_flush(),
            cache_age: self.cache.age(),
            loaded: self.is_loaded(),
        }
    }

    /// Observe store changes. Independent of any UI framework.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.store.subscribe()
    }

    /// Persist immediately, bypassing the debounce window.
    pub async fn flush_now(&self) {
        self.writer.flush_now().await;
    }

    /// Flush any pending window and stop the write scheduler.
    pub async fn shutdown(&self) {
        self.writer.shutdown().await;
    }
}

// ============================================================================
// Tests
// ============================================================================
