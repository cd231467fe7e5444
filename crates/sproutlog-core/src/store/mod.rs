//! The record store: canonical in-memory state for every tracked collection.
//!
//! All collections live in one [`Collections`] value behind a single lock so
//! that bulk operations (initial load, clear-all) can swap the entire state
//! in one step and readers never observe a partially-populated store.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{
    Achievement, Baby, FeedingRecord, Identified, Milestone, NappyRecord, Reminder, SleepRecord,
};

/// Capacity of the change-event channel. Observers that fall further behind
/// than this see a lag error and resubscribe; they never block mutations.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Which collection a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Feedings,
    Sleeps,
    Nappies,
    Milestones,
    Achievements,
    Reminders,
    Baby,
}

/// Published on every state change, decoupled from any UI framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A single collection was mutated in place.
    Mutated(Collection),
    /// The load pipeline replaced the whole store.
    Loaded,
    /// `clear_all_data` reset the whole store.
    Cleared,
}

/// Every tracked collection plus the active profile, as one plain value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collections {
    pub feedings: Vec<FeedingRecord>,
    pub sleeps: Vec<SleepRecord>,
    pub nappies: Vec<NappyRecord>,
    pub milestones: Vec<Milestone>,
    pub achievements: Vec<Achievement>,
    pub reminders: Vec<Reminder>,
    pub baby: Option<Baby>,
}

impl Collections {
    pub fn total_records(&self) -> usize {
        self.feedings.len()
            + self.sleeps.len()
            + self.nappies.len()
            + self.milestones.len()
            + self.achievements.len()
            + self.reminders.len()
    }
}

/// Upsert keyed by identifier: a collection never holds two entries with
/// the same id.
fn upsert<T: Identified>(items: &mut Vec<T>, item: T) {
    match items.iter_mut().find(|x| x.ident() == item.ident()) {
        Some(slot) => *slot = item,
        None => items.push(item),
    }
}

/// Replace in place; a missing id is a no-op and returns `false`.
fn replace_by_id<T: Identified>(items: &mut [T], item: T) -> bool {
    match items.iter_mut().find(|x| x.ident() == item.ident()) {
        Some(slot) => {
            *slot = item;
            true
        }
        None => false,
    }
}

/// Remove by id; a missing id is a no-op and returns `false`.
fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: Uuid) -> bool {
    let before = items.len();
    items.retain(|x| x.ident() != id);
    items.len() != before
}

/// Shared handle to the canonical state. Cloning is cheap; all clones see
/// the same store.
#[derive(Clone)]
pub(crate) struct RecordStore {
    inner: Arc<RwLock<Collections>>,
    events: broadcast::Sender<ChangeEvent>,
}

impl RecordStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(Collections::default())),
            events,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Collections> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Collections> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, event: ChangeEvent) {
        // No receivers is fine; observers are optional.
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    /// Clone-out of the full state. Never blocks beyond the read lock.
    pub fn snapshot(&self) -> Collections {
        self.read().clone()
    }

    pub fn total_records(&self) -> usize {
        self.read().total_records()
    }

    /// The load pipeline's atomic publish: one write-lock swap.
    pub fn replace_all(&self, collections: Collections) {
        *self.write() = collections;
        self.notify(ChangeEvent::Loaded);
    }

    /// `clear_all_data`'s in-memory half.
    pub fn reset(&self, collections: Collections) {
        *self.write() = collections;
        self.notify(ChangeEvent::Cleared);
    }

    fn mutate(&self, which: Collection, op: impl FnOnce(&mut Collections) -> bool) -> bool {
        let changed = op(&mut self.write());
        if changed {
            self.notify(ChangeEvent::Mutated(which));
        }
        changed
    }

    // ===== Feedings =====

    pub fn feedings(&self) -> Vec<FeedingRecord> {
        self.read().feedings.clone()
    }

    pub fn push_feeding(&self, record: FeedingRecord) {
        self.mutate(Collection::Feedings, |c| {
            upsert(&mut c.feedings, record);
            true
        });
    }

    pub fn replace_feeding(&self, record: FeedingRecord) -> bool {
        self.mutate(Collection::Feedings, |c| replace_by_id(&mut c.feedings, record))
    }

    pub fn remove_feeding(&self, id: Uuid) -> bool {
        self.mutate(Collection::Feedings, |c| remove_by_id(&mut c.feedings, id))
    }

    // ===== Sleep =====

    pub fn sleeps(&self) -> Vec<SleepRecord> {
        self.read().sleeps.clone()
    }

    pub fn push_sleep(&self, record: SleepRecord) {
        self.mutate(Collection::Sleeps, |c| {
            upsert(&mut c.sleeps, record);
            true
        });
    }

    pub fn replace_sleep(&self, record: SleepRecord) -> bool {
        self.mutate(Collection::Sleeps, |c| replace_by_id(&mut c.sleeps, record))
    }

    pub fn remove_sleep(&self, id: Uuid) -> bool {
        self.mutate(Collection::Sleeps, |c| remove_by_id(&mut c.sleeps, id))
    }

    // ===== Nappies =====

    pub fn nappies(&self) -> Vec<NappyRecord> {
        self.read().nappies.clone()
    }

    pub fn push_nappy(&self, record: NappyRecord) {
        self.mutate(Collection::Nappies, |c| {
            upsert(&mut c.nappies, record);
            true
        });
    }

    pub fn replace_nappy(&self, record: NappyRecord) -> bool {
        self.mutate(Collection::Nappies, |c| replace_by_id(&mut c.nappies, record))
    }

    pub fn remove_nappy(&self, id: Uuid) -> bool {
        self.mutate(Collection::Nappies, |c| remove_by_id(&mut c.nappies, id))
    }

    // ===== Milestones =====

    pub fn milestones(&self) -> Vec<Milestone> {
        self.read().milestones.clone()
    }

    pub fn push_milestone(&self, milestone: Milestone) {
        self.mutate(Collection::Milestones, |c| {
            upsert(&mut c.milestones, milestone);
            true
        });
    }

    pub fn replace_milestone(&self, milestone: Milestone) -> bool {
        self.mutate(Collection::Milestones, |c| {
            replace_by_id(&mut c.milestones, milestone)
        })
    }

    pub fn remove_milestone(&self, id: Uuid) -> bool {
        self.mutate(Collection::Milestones, |c| remove_by_id(&mut c.milestones, id))
    }

    // ===== Achievements =====

    pub fn achievements(&self) -> Vec<Achievement> {
        self.read().achievements.clone()
    }

    pub fn push_achievement(&self, achievement: Achievement) {
        self.mutate(Collection::Achievements, |c| {
            upsert(&mut c.achievements, achievement);
            true
        });
    }

    pub fn replace_achievement(&self, achievement: Achievement) -> bool {
        self.mutate(Collection::Achievements, |c| {
            replace_by_id(&mut c.achievements, achievement)
        })
    }

    pub fn remove_achievement(&self, id: Uuid) -> bool {
        self.mutate(Collection::Achievements, |c| {
            remove_by_id(&mut c.achievements, id)
        })
    }

    // ===== Reminders =====

    pub fn reminders(&self) -> Vec<Reminder> {
        self.read().reminders.clone()
    }

    pub fn push_reminder(&self, reminder: Reminder) {
        self.mutate(Collection::Reminders, |c| {
            upsert(&mut c.reminders, reminder);
            true
        });
    }

    pub fn replace_reminder(&self, reminder: Reminder) -> bool {
        self.mutate(Collection::Reminders, |c| {
            replace_by_id(&mut c.reminders, reminder)
        })
    }

    pub fn remove_reminder(&self, id: Uuid) -> bool {
        self.mutate(Collection::Reminders, |c| remove_by_id(&mut c.reminders, id))
    }

    // ===== Active profile =====

    pub fn baby(&self) -> Option<Baby> {
        self.read().baby.clone()
    }

    pub fn set_baby(&self, baby: Option<Baby>) {
        self.mutate(Collection::Baby, |c| {
            c.baby = baby;
            true
        });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeedingType;
    use chrono::{TimeZone, Utc};

    fn feeding_at(hour: u32) -> FeedingRecord {
        FeedingRecord::new(
            FeedingType::Bottle,
            Utc.with_ymd_and_hms(2026, 3, 5, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn push_then_read_back() {
        let store = RecordStore::new();
        let record = feeding_at(8);
        store.push_feeding(record.clone());
        assert_eq!(store.feedings(), vec![record]);
    }

    #[test]
    fn push_with_same_id_replaces_not_duplicates() {
        let store = RecordStore::new();
        let mut record = feeding_at(8);
        store.push_feeding(record.clone());

        record.notes = Some("bigger bottle".to_string());
        store.push_feeding(record.clone());

        let feedings = store.feedings();
        assert_eq!(feedings.len(), 1);
        assert_eq!(feedings[0].notes.as_deref(), Some("bigger bottle"));
    }

    #[test]
    fn replace_missing_id_is_noop() {
        let store = RecordStore::new();
        store.push_feeding(feeding_at(8));
        assert!(!store.replace_feeding(feeding_at(9)));
        assert_eq!(store.feedings().len(), 1);
    }

    #[test]
    fn remove_missing_id_is_noop() {
        let store = RecordStore::new();
        store.push_feeding(feeding_at(8));
        assert!(!store.remove_feeding(Uuid::new_v4()));
        assert_eq!(store.feedings().len(), 1);
    }

    #[test]
    fn remove_by_id_removes_exactly_one() {
        let store = RecordStore::new();
        let victim = feeding_at(8);
        store.push_feeding(victim.clone());
        store.push_feeding(feeding_at(9));

        assert!(store.remove_feeding(victim.id));
        let rest = store.feedings();
        assert_eq!(rest.len(), 1);
        assert_ne!(rest[0].id, victim.id);
    }

    #[test]
    fn replace_all_swaps_whole_state() {
        let store = RecordStore::new();
        store.push_feeding(feeding_at(8));

        let mut fresh = Collections::default();
        fresh.reminders.push(crate::models::Reminder::new(
            "checkup",
            crate::models::ReminderKind::Appointment,
            Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap(),
        ));
        store.replace_all(fresh.clone());

        assert_eq!(store.snapshot(), fresh);
        assert!(store.feedings().is_empty());
    }

    #[test]
    fn mutations_publish_change_events() {
        let store = RecordStore::new();
        let mut events = store.subscribe();

        store.push_feeding(feeding_at(8));
        store.replace_all(Collections::default());
        store.reset(Collections::default());
        // Failed mutation publishes nothing.
        store.remove_feeding(Uuid::new_v4());

        assert_eq!(
            events.try_recv().unwrap(),
            ChangeEvent::Mutated(Collection::Feedings)
        );
        assert_eq!(events.try_recv().unwrap(), ChangeEvent::Loaded);
        assert_eq!(events.try_recv().unwrap(), ChangeEvent::Cleared);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn total_records_ignores_profile() {
        let store = RecordStore::new();
        store.push_feeding(feeding_at(8));
        store.set_baby(Some(crate::models::Baby::new(
            "Ada",
            chrono::NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
        )));
        assert_eq!(store.total_records(), 1);
    }
}
