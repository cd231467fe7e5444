use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The active profile being tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baby {
    pub id: Uuid,
    pub name: String,
    pub birth_date: NaiveDate,
    pub birth_weight_kg: Option<f64>,
    pub birth_length_cm: Option<f64>,
}

impl Baby {
    pub fn new(name: &str, birth_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            birth_date,
            birth_weight_kg: None,
            birth_length_cm: None,
        }
    }

    /// Age in whole days as of the local calendar date.
    pub fn age_days(&self) -> i64 {
        (Local::now().date_naive() - self.birth_date).num_days()
    }
}
