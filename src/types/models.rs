use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Soft-delete state shared by habits and goals.
///
/// Serialized as the boolean `is_deleted` so the wire format stays flat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "bool", into = "bool")]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted,
}

impl Lifecycle {
    #[must_use]
    pub fn is_deleted(self) -> bool {
        matches!(self, Lifecycle::Deleted)
    }
}

impl From<bool> for Lifecycle {
    fn from(is_deleted: bool) -> Self {
        if is_deleted {
            Lifecycle::Deleted
        } else {
            Lifecycle::Active
        }
    }
}

impl From<Lifecycle> for bool {
    fn from(lifecycle: Lifecycle) -> Self {
        lifecycle.is_deleted()
    }
}

/// Number of completions required per Monday-Sunday week. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct WeeklyTarget(u32);

impl WeeklyTarget {
    pub fn new(value: i64) -> Result<Self> {
        if value < 1 {
            return Err(Error::Validation(format!(
                "weekly target must be at least 1, got {value}"
            )));
        }
        u32::try_from(value)
            .map(WeeklyTarget)
            .map_err(|_| Error::Validation(format!("weekly target {value} is too large")))
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for WeeklyTarget {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        WeeklyTarget::new(value)
    }
}

impl From<WeeklyTarget> for u32 {
    fn from(target: WeeklyTarget) -> Self {
        target.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "is_deleted", default)]
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A time-scoped configuration snapshot. Immutable once its week has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitVersion {
    pub id: String,
    pub weekly_target: WeeklyTarget,
    #[serde(default)]
    pub requires_text_on_completion: bool,
    #[serde(default)]
    pub linked_goal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub effective_week_start: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub order_index: i32,
    #[serde(rename = "is_deleted", default)]
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Versions in no particular order.
    #[serde(default)]
    pub versions: Vec<HabitVersion>,
}

impl Habit {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.lifecycle.is_deleted()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub id: String,
    pub habit_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Completion {
    /// True when the completion carries non-blank text.
    #[must_use]
    pub fn has_note(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}
