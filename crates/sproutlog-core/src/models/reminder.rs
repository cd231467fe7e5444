use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderKind {
    Appointment,
    Vaccination,
    Other,
}

impl std::fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderKind::Appointment => write!(f, "Appointment"),
            ReminderKind::Vaccination => write!(f, "Vaccination"),
            ReminderKind::Other => write!(f, "Other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub title: String,
    pub due: DateTime<Utc>,
    pub kind: ReminderKind,
    pub completed: bool,
    pub notes: Option<String>,
}

impl Reminder {
    pub fn new(title: &str, kind: ReminderKind, due: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            due,
            kind,
            completed: false,
            notes: None,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.due < now
    }
}
