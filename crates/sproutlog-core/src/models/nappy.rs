use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NappyKind {
    Wet,
    Dirty,
    Mixed,
}

impl std::fmt::Display for NappyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NappyKind::Wet => write!(f, "Wet"),
            NappyKind::Dirty => write!(f, "Dirty"),
            NappyKind::Mixed => write!(f, "Mixed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NappyRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: NappyKind,
    pub notes: Option<String>,
}

impl NappyRecord {
    pub fn new(kind: NappyKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            kind,
            notes: None,
        }
    }
}
