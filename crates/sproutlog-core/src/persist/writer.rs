//! The debounced write scheduler.
//!
//! A dedicated worker task owns the debounce window: every save request
//! (re)arms a single deadline, and only quiescence lets it fire. The flush
//! snapshots the record store as of expiry, so mutations landing inside the
//! window are always included, and at most one flush happens per window.
//! Per-key writes are issued concurrently and fail independently; a failed
//! key is simply retried on whatever flush the next mutation triggers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, error, warn};

use super::{codec, keys, BackingStore};
use crate::cache::StatsCache;
use crate::error::StoreError;
use crate::store::{Collections, RecordStore};

/// How long mutations must quiesce before a flush fires.
pub(crate) const DEFAULT_QUIESCENCE: Duration = Duration::from_secs(1);

/// Command-channel depth. Save requests beyond a full buffer are dropped:
/// a request is already pending, so a flush is coming either way.
const COMMAND_BUFFER_SIZE: usize = 32;

enum Command {
    SaveRequested,
    FlushNow(oneshot::Sender<()>),
    ClearKeys(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Caller-side handle. Dropping it without `shutdown` stops the worker
/// without a final flush; in-memory state is authoritative either way.
pub(crate) struct WriterHandle {
    tx: mpsc::Sender<Command>,
    last_flush: watch::Receiver<Option<DateTime<Utc>>>,
}

impl WriterHandle {
    /// Spawn the worker. Must be called from within a tokio runtime.
    pub fn spawn(
        store: RecordStore,
        cache: Arc<StatsCache>,
        backing: Arc<dyn BackingStore>,
        quiescence: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let (flush_tx, flush_rx) = watch::channel(None);
        let scheduler = WriteScheduler {
            store,
            cache,
            backing,
            rx,
            last_flush: flush_tx,
            quiescence,
        };
        tokio::spawn(scheduler.run());
        Self {
            tx,
            last_flush: flush_rx,
        }
    }

    /// (Re)arm the debounce window. Never blocks and never fails from the
    /// caller's point of view.
    pub fn request_save(&self) {
        match self.tx.try_send(Command::SaveRequested) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("save request dropped, a flush is already pending");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("save request after scheduler shutdown");
            }
        }
    }

    /// Flush immediately, bypassing the debounce window.
    pub async fn flush_now(&self) {
        self.command(Command::FlushNow).await;
    }

    /// Remove every known key from the backing store.
    pub async fn clear_keys(&self) {
        self.command(Command::ClearKeys).await;
    }

    /// Flush any pending window, then stop the worker.
    pub async fn shutdown(&self) {
        self.command(Command::Shutdown).await;
    }

    /// Completion time of the most recent flush.
    pub fn last_flush(&self) -> Option<DateTime<Utc>> {
        *self.last_flush.borrow()
    }

    #[cfg(test)]
    pub fn last_flush_watch(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.last_flush.clone()
    }

    async fn command(&self, make: impl FnOnce(oneshot::Sender<()>) -> Command) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(make(ack_tx)).await.is_err() {
            return;
        }
        let _ = ack_rx.await;
    }
}

struct WriteScheduler {
    store: RecordStore,
    cache: Arc<StatsCache>,
    backing: Arc<dyn BackingStore>,
    rx: mpsc::Receiver<Command>,
    last_flush: watch::Sender<Option<DateTime<Utc>>>,
    quiescence: Duration,
}

impl WriteScheduler {
    async fn run(mut self) {
        let mut deadline: Option<Instant> = None;
        loop {
            let timer = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };
            tokio::select! {
                () = timer => {
                    deadline = None;
                    self.cache.invalidate();
                    self.flush().await;
                }
                cmd = self.rx.recv() => match cmd {
                    Some(Command::SaveRequested) => {
                        deadline = Some(Instant::now() + self.quiescence);
                    }
                    Some(Command::FlushNow(ack)) => {
                        deadline = None;
                        self.cache.invalidate();
                        self.flush().await;
                        let _ = ack.send(());
                    }
                    Some(Command::ClearKeys(ack)) => {
                        deadline = None;
                        self.clear_keys();
                        let _ = ack.send(());
                    }
                    Some(Command::Shutdown(ack)) => {
                        if deadline.is_some() {
                            self.flush().await;
                        }
                        let _ = ack.send(());
                        break;
                    }
                    // Handle dropped without shutdown; an unflushed window
                    // is lost, matching fire-and-forget save semantics.
                    None => break,
                },
            }
        }
        debug!("write scheduler stopped");
    }

    /// Persist the store as of now. Per-key failures are logged and skipped;
    /// nothing propagates.
    ///
    /// `write_bytes` is synchronous, so each key gets its own blocking-pool
    /// task: a slow key never delays another's write and never stalls the
    /// runtime.
    async fn flush(&self) {
        let snapshot = self.store.snapshot();
        let records = snapshot.total_records();

        let writes = encode_jobs(&snapshot).into_iter().map(|(key, encoded)| {
            let backing = Arc::clone(&self.backing);
            tokio::task::spawn_blocking(move || match encoded {
                Ok(bytes) => {
                    if let Err(e) = backing.write_bytes(key, &bytes) {
                        error!(key, error = %e, "failed to persist collection, will retry on next flush");
                    }
                }
                Err(e) => {
                    error!(key, error = %e, "failed to encode collection, skipping this flush");
                }
            })
        });
        for joined in join_all(writes).await {
            if let Err(e) = joined {
                error!(error = %e, "flush write task panicked");
            }
        }

        let _ = self.last_flush.send(Some(Utc::now()));
        debug!(records, "flushed record store");
    }

    fn clear_keys(&self) {
        for key in keys::ALL {
            if let Err(e) = self.backing.remove_bytes(key) {
                warn!(key, error = %e, "failed to remove stored key");
            }
        }
    }
}

/// One serialization job per collection plus the profile. Encode failures
/// ride along as values so one bad collection never aborts the rest.
fn encode_jobs(
    snapshot: &Collections,
) -> Vec<(&'static str, Result<Vec<u8>, StoreError>)> {
    vec![
        (
            keys::FEEDING_RECORDS,
            codec::encode(keys::FEEDING_RECORDS, &snapshot.feedings),
        ),
        (
            keys::SLEEP_RECORDS,
            codec::encode(keys::SLEEP_RECORDS, &snapshot.sleeps),
        ),
        (
            keys::NAPPY_RECORDS,
            codec::encode(keys::NAPPY_RECORDS, &snapshot.nappies),
        ),
        (
            keys::MILESTONES,
            codec::encode(keys::MILESTONES, &snapshot.milestones),
        ),
        (
            keys::ACHIEVEMENTS,
            codec::encode(keys::ACHIEVEMENTS, &snapshot.achievements),
        ),
        (
            keys::REMINDERS,
            codec::encode(keys::REMINDERS, &snapshot.reminders),
        ),
        (keys::BABY, codec::encode(keys::BABY, &snapshot.baby)),
    ]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeedingRecord, FeedingType, NappyKind, NappyRecord};
    use crate::persist::MemoryStore;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
    use std::sync::Mutex;

    /// Counts writes per key on top of a MemoryStore.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        writes: Mutex<HashMap<String, usize>>,
    }

    impl CountingStore {
        fn writes_for(&self, key: &str) -> usize {
            self.writes.lock().unwrap().get(key).copied().unwrap_or(0)
        }

        fn total_writes(&self) -> usize {
            self.writes.lock().unwrap().values().sum()
        }
    }

    impl BackingStore for CountingStore {
        fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.read_bytes(key)
        }

        fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
            *self.writes.lock().unwrap().entry(key.to_string()).or_insert(0) += 1;
            self.inner.write_bytes(key, bytes)
        }

        fn remove_bytes(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove_bytes(key)
        }
    }

    /// Fails writes for the listed keys, passes everything else through.
    struct FlakyStore {
        inner: MemoryStore,
        fail_keys: Vec<&'static str>,
    }

    impl FlakyStore {
        fn failing(fail_keys: Vec<&'static str>) -> Self {
            Self {
                inner: MemoryStore::new(),
                fail_keys,
            }
        }
    }

    impl BackingStore for FlakyStore {
        fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.read_bytes(key)
        }

        fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
            if self.fail_keys.contains(&key) {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "injected write failure",
                    ),
                });
            }
            self.inner.write_bytes(key, bytes)
        }

        fn remove_bytes(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove_bytes(key)
        }
    }

    fn feeding_at(hour: u32) -> FeedingRecord {
        FeedingRecord::new(
            FeedingType::Bottle,
            Utc.with_ymd_and_hms(2026, 3, 5, hour, 0, 0).unwrap(),
        )
    }

    fn spawn_with<B: BackingStore>(backing: Arc<B>) -> (RecordStore, WriterHandle) {
        let store = RecordStore::new();
        let cache = Arc::new(StatsCache::new());
        let handle = WriterHandle::spawn(store.clone(), cache, backing, DEFAULT_QUIESCENCE);
        (store, handle)
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_requests_coalesce_into_one_flush_with_all_records() {
        let counting = Arc::new(CountingStore::default());
        let (store, handle) = spawn_with(counting.clone());
        let mut flushed = handle.last_flush_watch();

        for hour in 8..13 {
            store.push_feeding(feeding_at(hour));
            handle.request_save();
        }

        flushed.changed().await.unwrap();
        assert_eq!(counting.writes_for(keys::FEEDING_RECORDS), 1);
        assert!(handle.last_flush().is_some());

        let bytes = counting.read_bytes(keys::FEEDING_RECORDS).unwrap().unwrap();
        let persisted: Vec<FeedingRecord> =
            codec::decode(keys::FEEDING_RECORDS, &bytes).unwrap();
        assert_eq!(persisted.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_request_restarts_the_quiescence_window() {
        let counting = Arc::new(CountingStore::default());
        let (store, handle) = spawn_with(counting.clone());
        let mut flushed = handle.last_flush_watch();

        store.push_feeding(feeding_at(8));
        handle.request_save();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        tokio::time::advance(Duration::from_millis(600)).await;
        handle.request_save();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        // 1.2s after the first request, but only 0.6s after the second:
        // the restarted window must not have fired.
        tokio::time::advance(Duration::from_millis(600)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(counting.total_writes(), 0);

        flushed.changed().await.unwrap();
        assert_eq!(counting.writes_for(keys::FEEDING_RECORDS), 1);
    }

    #[tokio::test]
    async fn flush_now_writes_every_key() {
        let backing = Arc::new(MemoryStore::new());
        let (store, handle) = spawn_with(backing.clone());

        store.push_feeding(feeding_at(8));
        store.push_nappy(NappyRecord::new(
            NappyKind::Wet,
            Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap(),
        ));
        handle.flush_now().await;

        for key in keys::ALL {
            assert!(
                backing.read_bytes(key).unwrap().is_some(),
                "missing key {key}"
            );
        }
    }

    /// Delays every write and records how many were in flight at once.
    #[derive(Default)]
    struct SlowStore {
        inner: MemoryStore,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl SlowStore {
        fn max_concurrent_writes(&self) -> usize {
            self.max_in_flight.load(SeqCst)
        }
    }

    impl BackingStore for SlowStore {
        fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
            self.inner.read_bytes(key)
        }

        fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
            let now = self.in_flight.fetch_add(1, SeqCst) + 1;
            self.max_in_flight.fetch_max(now, SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            self.in_flight.fetch_sub(1, SeqCst);
            self.inner.write_bytes(key, bytes)
        }

        fn remove_bytes(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove_bytes(key)
        }
    }

    #[tokio::test]
    async fn per_key_writes_overlap_within_one_flush() {
        let slow = Arc::new(SlowStore::default());
        let (store, handle) = spawn_with(slow.clone());

        store.push_feeding(feeding_at(8));
        handle.flush_now().await;

        // All seven keys sleep 50ms each; a sequential flush would never
        // have more than one write in flight.
        assert!(
            slow.max_concurrent_writes() >= 2,
            "writes ran one at a time (max in flight = {})",
            slow.max_concurrent_writes()
        );
        for key in keys::ALL {
            assert!(slow.read_bytes(key).unwrap().is_some(), "missing key {key}");
        }
    }

    #[tokio::test]
    async fn one_failing_key_does_not_stop_the_others() {
        let flaky = Arc::new(FlakyStore::failing(vec![keys::FEEDING_RECORDS]));
        let (store, handle) = spawn_with(flaky.clone());

        store.push_feeding(feeding_at(8));
        store.push_nappy(NappyRecord::new(
            NappyKind::Dirty,
            Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap(),
        ));
        handle.flush_now().await;

        assert!(flaky.read_bytes(keys::FEEDING_RECORDS).unwrap().is_none());
        let bytes = flaky.read_bytes(keys::NAPPY_RECORDS).unwrap().unwrap();
        let persisted: Vec<NappyRecord> = codec::decode(keys::NAPPY_RECORDS, &bytes).unwrap();
        assert_eq!(persisted.len(), 1);
        // Bookkeeping still records the flush cycle.
        assert!(handle.last_flush().is_some());
    }

    #[tokio::test]
    async fn an_unencodable_collection_does_not_stop_the_others() {
        let backing = Arc::new(MemoryStore::new());
        let (store, handle) = spawn_with(backing.clone());

        // serde_json rejects non-finite floats, so this record poisons the
        // whole feeding blob's encoding.
        let mut poisoned = feeding_at(8);
        poisoned.amount_ml = Some(f64::NAN);
        store.push_feeding(poisoned);
        store.push_nappy(NappyRecord::new(
            NappyKind::Mixed,
            Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap(),
        ));
        handle.flush_now().await;

        assert!(backing.read_bytes(keys::FEEDING_RECORDS).unwrap().is_none());
        let bytes = backing.read_bytes(keys::NAPPY_RECORDS).unwrap().unwrap();
        let persisted: Vec<NappyRecord> = codec::decode(keys::NAPPY_RECORDS, &bytes).unwrap();
        assert_eq!(persisted.len(), 1);
        assert!(handle.last_flush().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flushes_a_pending_window() {
        let counting = Arc::new(CountingStore::default());
        let (store, handle) = spawn_with(counting.clone());

        store.push_feeding(feeding_at(8));
        handle.request_save();
        // No time advanced: the window is still open when we shut down.
        handle.shutdown().await;

        assert_eq!(counting.writes_for(keys::FEEDING_RECORDS), 1);
    }

    #[tokio::test]
    async fn clear_keys_removes_everything_it_wrote() {
        let backing = Arc::new(MemoryStore::new());
        let (store, handle) = spawn_with(backing.clone());

        store.push_feeding(feeding_at(8));
        handle.flush_now().await;
        assert!(!backing.is_empty());

        handle.clear_keys().await;
        assert!(backing.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fire_invalidates_the_cache() {
        let store = RecordStore::new();
        let cache = Arc::new(StatsCache::new());
        let backing = Arc::new(MemoryStore::new());
        let handle = WriterHandle::spawn(
            store.clone(),
            cache.clone(),
            backing,
            DEFAULT_QUIESCENCE,
        );
        let mut flushed = handle.last_flush_watch();

        cache.get_or_compute(Collections::default);
        assert!(cache.age().is_some());

        handle.request_save();
        flushed.changed().await.unwrap();
        assert!(cache.age().is_none());
    }
}
