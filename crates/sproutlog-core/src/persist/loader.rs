//! One-shot best-effort reconstruction of the record store from the backing
//! store.
//!
//! Each key is read and decoded independently: a missing or corrupt blob
//! falls back to the empty default for that key only and is logged, so one
//! bad collection can never stop the others from loading. The caller
//! publishes the assembled [`Collections`] into the record store in a single
//! atomic swap.

use serde::de::DeserializeOwned;
use tracing::warn;

use super::{codec, keys, BackingStore};
use crate::models::Baby;
use crate::store::Collections;

pub(crate) fn load_collections(backing: &dyn BackingStore) -> Collections {
    Collections {
        feedings: read_collection(backing, keys::FEEDING_RECORDS),
        sleeps: read_collection(backing, keys::SLEEP_RECORDS),
        nappies: read_collection(backing, keys::NAPPY_RECORDS),
        milestones: read_collection(backing, keys::MILESTONES),
        achievements: read_collection(backing, keys::ACHIEVEMENTS),
        reminders: read_collection(backing, keys::REMINDERS),
        baby: read_profile(backing),
    }
}

fn read_collection<T: DeserializeOwned>(backing: &dyn BackingStore, key: &str) -> Vec<T> {
    read_value(backing, key).unwrap_or_default()
}

fn read_profile(backing: &dyn BackingStore) -> Option<Baby> {
    read_value::<Option<Baby>>(backing, keys::BABY).flatten()
}

/// `None` covers all three non-success cases: key never written, read
/// failure, decode failure. The latter two are logged and absorbed.
fn read_value<T: DeserializeOwned>(backing: &dyn BackingStore, key: &str) -> Option<T> {
    let bytes = match backing.read_bytes(key) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read stored collection, starting empty");
            return None;
        }
    };
    match codec::decode(key, &bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "stored collection is corrupt, starting empty");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
