//! Fixed reference catalogs for milestones and achievements, and the
//! merge-by-title seeding that backfills them.
//!
//! Seeding policy: for both catalogs, any entry whose title is missing from
//! the stored collection is appended; entries already present are left
//! untouched, including their achieved/earned state. Title is the natural
//! key, so user-modified entries survive catalog updates, and running the
//! seed any number of times changes nothing after the first.

use crate::models::{Achievement, Milestone};
use crate::store::Collections;

/// (title, category)
const MILESTONE_CATALOG: &[(&str, &str)] = &[
    ("First smile", "Social"),
    ("Holds head up", "Motor"),
    ("Rolls over", "Motor"),
    ("First laugh", "Social"),
    ("Sits without support", "Motor"),
    ("First tooth", "Physical"),
    ("Responds to own name", "Language"),
    ("Starts crawling", "Motor"),
    ("First babble", "Language"),
    ("Pulls to stand", "Motor"),
    ("Waves bye-bye", "Social"),
    ("Claps hands", "Social"),
    ("First word", "Language"),
    ("First steps", "Motor"),
];

/// (title, detail)
const ACHIEVEMENT_CATALOG: &[(&str, &str)] = &[
    ("First full night of sleep", "Six hours or more without waking"),
    ("First night in own room", "Moved out of the bedside crib"),
    ("First bath", "Survived, possibly enjoyed"),
    ("First outing", "Out of the house, pram and all"),
    ("First solid meal", "More in the mouth than on the floor"),
    ("One month tracked", "Thirty days of records in a row"),
    ("First checkup done", "Weighed, measured, approved"),
    ("Vaccinations up to date", "Every scheduled jab recorded"),
];

/// Backfill missing catalog entries into `collections`.
///
/// Returns `true` if anything was added, so the caller knows to persist.
pub(crate) fn seed(collections: &mut Collections) -> bool {
    let mut added = false;

    for (title, category) in MILESTONE_CATALOG {
        if !collections.milestones.iter().any(|m| m.title == *title) {
            collections.milestones.push(Milestone::new(title, category));
            added = true;
        }
    }

    for (title, detail) in ACHIEVEMENT_CATALOG {
        if !collections.achievements.iter().any(|a| a.title == *title) {
            collections.achievements.push(Achievement::new(title, detail));
            added = true;
        }
    }

    added
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn seeding_empty_collections_fills_both_catalogs() {
        let mut collections = Collections::default();
        assert!(seed(&mut collections));
        assert_eq!(collections.milestones.len(), MILESTONE_CATALOG.len());
        assert_eq!(collections.achievements.len(), ACHIEVEMENT_CATALOG.len());
    }

    #[test]
    fn seeding_twice_is_idempotent() {
        let mut collections = Collections::default();
        assert!(seed(&mut collections));
        let after_first = collections.clone();

        assert!(!seed(&mut collections));
        assert_eq!(collections, after_first);
    }

    #[test]
    fn seeding_preserves_user_state_on_existing_titles() {
        let mut collections = Collections::default();
        seed(&mut collections);

        let achieved_at = Utc.with_ymd_and_hms(2026, 4, 1, 10, 0, 0).unwrap();
        collections.milestones[0].achieved_at = Some(achieved_at);
        collections.achievements[0].earned_at = Some(achieved_at);

        seed(&mut collections);

        assert_eq!(collections.milestones[0].achieved_at, Some(achieved_at));
        assert_eq!(collections.achievements[0].earned_at, Some(achieved_at));
        assert_eq!(collections.milestones.len(), MILESTONE_CATALOG.len());
        assert_eq!(collections.achievements.len(), ACHIEVEMENT_CATALOG.len());
    }

    #[test]
    fn seeding_backfills_only_missing_titles() {
        let mut collections = Collections::default();
        seed(&mut collections);

        // Drop one milestone and one achievement, keep the rest.
        collections.milestones.remove(3);
        collections.achievements.remove(1);

        assert!(seed(&mut collections));
        assert_eq!(collections.milestones.len(), MILESTONE_CATALOG.len());
        assert_eq!(collections.achievements.len(), ACHIEVEMENT_CATALOG.len());
    }
}
