mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use chrono::NaiveDate;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Goal operations
    fn create_goal(&self, goal: &Goal) -> Result<()>;
    fn get_goal(&self, id: &str) -> Result<Option<Goal>>;
    /// Active goals, ordered by year then creation time.
    fn list_goals(&self, year: Option<i32>) -> Result<Vec<Goal>>;
    fn update_goal(&self, goal: &Goal) -> Result<()>;
    /// Soft delete. Returns false if the goal is missing or already deleted.
    fn delete_goal(&self, id: &str) -> Result<bool>;

    // Habit operations (versions are loaded with their habit)
    /// Inserts the habit together with every version it carries.
    fn create_habit(&self, habit: &Habit) -> Result<()>;
    fn get_habit(&self, id: &str) -> Result<Option<Habit>>;
    fn list_habits(&self, include_deleted: bool) -> Result<Vec<Habit>>;
    /// Updates name, order and `updated_at`. Versions are untouched.
    fn update_habit(&self, habit: &Habit) -> Result<()>;
    fn delete_habit(&self, id: &str) -> Result<bool>;

    // Version operations
    /// Inserts a version, or replaces the rules of the habit's existing
    /// version for the same starting week. Returns the stored version.
    fn upsert_habit_version(&self, habit_id: &str, version: &HabitVersion)
    -> Result<HabitVersion>;

    // Completion operations
    fn create_completion(&self, completion: &Completion) -> Result<()>;
    fn get_completion(&self, id: &str) -> Result<Option<Completion>>;
    /// Completions dated within `start..=end`, newest first.
    fn list_completions(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Completion>>;
    fn list_habit_completions(
        &self,
        habit_id: &str,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<Completion>>;
    fn delete_completion(&self, id: &str) -> Result<bool>;

    fn close(&self) -> Result<()>;
}
