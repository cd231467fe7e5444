use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A developmental milestone.
///
/// `title` is the natural key used by catalog seeding: two milestones with
/// the same title are the same logical item even across catalog versions,
/// while `id` stays unique per stored entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub achieved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Milestone {
    pub fn new(title: &str, category: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            category: category.to_string(),
            achieved_at: None,
            notes: None,
        }
    }

    pub fn is_achieved(&self) -> bool {
        self.achieved_at.is_some()
    }
}

/// A parent-facing achievement, seeded from a fixed catalog like milestones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub title: String,
    pub detail: String,
    pub earned_at: Option<DateTime<Utc>>,
}

impl Achievement {
    pub fn new(title: &str, detail: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            detail: detail.to_string(),
            earned_at: None,
        }
    }

    pub fn is_earned(&self) -> bool {
        self.earned_at.is_some()
    }
}
