use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedingType {
    Breast,
    Bottle,
    Solid,
}

impl std::fmt::Display for FeedingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedingType::Breast => write!(f, "Breast"),
            FeedingType::Bottle => write!(f, "Bottle"),
            FeedingType::Solid => write!(f, "Solid"),
        }
    }
}

/// Which side a breast feed was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreastSide {
    Left,
    Right,
    Both,
}

impl std::fmt::Display for BreastSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BreastSide::Left => write!(f, "Left"),
            BreastSide::Right => write!(f, "Right"),
            BreastSide::Both => write!(f, "Both"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub feeding_type: FeedingType,
    /// Bottle/solid amount in millilitres, when measured.
    pub amount_ml: Option<f64>,
    pub duration_minutes: Option<u32>,
    pub side: Option<BreastSide>,
    pub notes: Option<String>,
}

impl FeedingRecord {
    pub fn new(feeding_type: FeedingType, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            feeding_type,
            amount_ml: None,
            duration_minutes: None,
            side: None,
            notes: None,
        }
    }
}
