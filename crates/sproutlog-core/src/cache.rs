//! Cached aggregate statistics over the record store.
//!
//! Aggregates are pure functions of the store contents as of their
//! `computed_at` stamp. A read inside the validity window returns the cached
//! value; a read past it recomputes first. Mutations to feeding, sleep or
//! nappy records invalidate immediately so changes are visible on the very
//! next read, while read-only bursts stay O(1).

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, Utc};
use uuid::Uuid;

use crate::store::Collections;

/// Trust a computed aggregate for 5 minutes.
/// Mutation invalidates eagerly, so the window only bounds clock-driven
/// drift of the "today" boundary and ongoing-sleep durations.
const CACHE_VALIDITY_MINUTES: i64 = 5;

/// Next expected feeding = last feeding + 3 hours.
const NEXT_FEEDING_OFFSET_HOURS: i64 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateStats {
    pub feedings_today: usize,
    pub nappies_today: usize,
    /// Sum of `end - start` in hours for sessions with both endpoints,
    /// attributed to the local day the session started.
    pub sleep_hours_today: f64,
    /// Id and timestamp of the most recent feeding record.
    pub last_feeding: Option<(Uuid, DateTime<Utc>)>,
    pub next_feeding_estimate: Option<DateTime<Utc>>,
    pub computed_at: DateTime<Utc>,
}

impl AggregateStats {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.computed_at <= Duration::minutes(CACHE_VALIDITY_MINUTES)
    }
}

/// "Today" is the local calendar day at computation time; aggregates shift
/// when computed across a midnight boundary.
fn compute(collections: &Collections, now: DateTime<Utc>) -> AggregateStats {
    let today = now.with_timezone(&Local).date_naive();
    let on_today = |ts: DateTime<Utc>| ts.with_timezone(&Local).date_naive() == today;

    let feedings_today = collections
        .feedings
        .iter()
        .filter(|f| on_today(f.timestamp))
        .count();
    let nappies_today = collections
        .nappies
        .iter()
        .filter(|n| on_today(n.timestamp))
        .count();
    let sleep_hours_today = collections
        .sleeps
        .iter()
        .filter(|s| on_today(s.start))
        .filter_map(|s| s.duration_hours())
        .sum();

    let last_feeding = collections
        .feedings
        .iter()
        .max_by_key(|f| f.timestamp)
        .map(|f| (f.id, f.timestamp));
    let next_feeding_estimate =
        last_feeding.map(|(_, ts)| ts + Duration::hours(NEXT_FEEDING_OFFSET_HOURS));

    AggregateStats {
        feedings_today,
        nappies_today,
        sleep_hours_today,
        last_feeding,
        next_feeding_estimate,
        computed_at: now,
    }
}

pub(crate) struct StatsCache {
    slot: Mutex<Option<AggregateStats>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<AggregateStats>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached aggregates, recomputing from `snapshot` only when
    /// unset or past the validity window. `snapshot` is not called on a hit.
    pub fn get_or_compute(&self, snapshot: impl FnOnce() -> Collections) -> AggregateStats {
        self.get_or_compute_at(Utc::now(), snapshot)
    }

    pub fn get_or_compute_at(
        &self,
        now: DateTime<Utc>,
        snapshot: impl FnOnce() -> Collections,
    ) -> AggregateStats {
        let mut slot = self.lock();
        if let Some(stats) = slot.as_ref() {
            if stats.is_fresh(now) {
                return stats.clone();
            }
        }
        let stats = compute(&snapshot(), now);
        *slot = Some(stats.clone());
        stats
    }

    /// Drop the computed value so the next read recomputes.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    /// Age of the cached value, for diagnostics. `None` when unset.
    pub fn age(&self) -> Option<Duration> {
        self.lock().as_ref().map(|s| Utc::now() - s.computed_at)
    }
}

// ============================================================================
// Tests
// ============================================================================
