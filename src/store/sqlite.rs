use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::engine::calendar::{DATE_FORMAT, format_date};
use crate::error::{Error, Result};
use crate::types::*;

const VERSION_COLUMNS: &str = "id, weekly_target, requires_text_on_completion, linked_goal_id, \
                               description, effective_week_start, created_at";

const COMPLETION_COLUMNS: &str = "id, habit_id, date, text, created_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// An in-memory database, used by tests and throwaway runs.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
        description: row.get(3)?,
        lifecycle: Lifecycle::from(row.get::<_, bool>(4)?),
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
    Ok(Habit {
        id: row.get(0)?,
        name: row.get(1)?,
        order_index: row.get(2)?,
        lifecycle: Lifecycle::from(row.get::<_, bool>(3)?),
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
        versions: Vec::new(),
    })
}

fn version_from_row(row: &Row<'_>) -> rusqlite::Result<HabitVersion> {
    let target: i64 = row.get(1)?;
    let weekly_target = WeeklyTarget::new(target)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Integer, Box::new(e)))?;

    Ok(HabitVersion {
        id: row.get(0)?,
        weekly_target,
        requires_text_on_completion: row.get(2)?,
        linked_goal_id: row.get(3)?,
        description: row.get(4)?,
        effective_week_start: date_column(row, 5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<Completion> {
    Ok(Completion {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        date: date_column(row, 2)?,
        text: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn insert_version(conn: &Connection, habit_id: &str, version: &HabitVersion) -> Result<()> {
    conn.execute(
        "INSERT INTO habit_versions (id, habit_id, weekly_target, requires_text_on_completion,
                                     linked_goal_id, description, effective_week_start, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(habit_id, effective_week_start) DO UPDATE SET
             weekly_target = excluded.weekly_target,
             requires_text_on_completion = excluded.requires_text_on_completion,
             linked_goal_id = excluded.linked_goal_id,
             description = excluded.description,
             created_at = excluded.created_at",
        params![
            version.id,
            habit_id,
            version.weekly_target.get(),
            version.requires_text_on_completion,
            version.linked_goal_id,
            version.description,
            format_date(version.effective_week_start),
            format_datetime(&version.created_at),
        ],
    )?;
    Ok(())
}

fn load_versions(conn: &Connection, habit_id: &str) -> Result<Vec<HabitVersion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {VERSION_COLUMNS} FROM habit_versions
         WHERE habit_id = ?1 ORDER BY effective_week_start DESC"
    ))?;
    let rows = stmt.query_map(params![habit_id], version_from_row)?;
    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Goal operations

    fn create_goal(&self, goal: &Goal) -> Result<()> {
        self.conn().execute(
            "INSERT INTO goals (id, title, year, description, is_deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                goal.id,
                goal.title,
                goal.year,
                goal.description,
                goal.lifecycle.is_deleted(),
                format_datetime(&goal.created_at),
                format_datetime(&goal.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_goal(&self, id: &str) -> Result<Option<Goal>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, title, year, description, is_deleted, created_at, updated_at
             FROM goals WHERE id = ?1",
            params![id],
            goal_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_goals(&self, year: Option<i32>) -> Result<Vec<Goal>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, title, year, description, is_deleted, created_at, updated_at
             FROM goals
             WHERE is_deleted = 0 AND (?1 IS NULL OR year = ?1)
             ORDER BY year, created_at",
        )?;

        let rows = stmt.query_map(params![year], goal_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_goal(&self, goal: &Goal) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE goals SET title = ?1, year = ?2, description = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                goal.title,
                goal.year,
                goal.description,
                format_datetime(&goal.updated_at),
                goal.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_goal(&self, id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE goals SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(rows > 0)
    }

    // Habit operations

    fn create_habit(&self, habit: &Habit) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO habits (id, name, order_index, is_deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                habit.id,
                habit.name,
                habit.order_index,
                habit.lifecycle.is_deleted(),
                format_datetime(&habit.created_at),
                format_datetime(&habit.updated_at),
            ],
        )?;
        for version in &habit.versions {
            insert_version(&tx, &habit.id, version)?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_habit(&self, id: &str) -> Result<Option<Habit>> {
        let conn = self.conn();
        let habit = conn
            .query_row(
                "SELECT id, name, order_index, is_deleted, created_at, updated_at
                 FROM habits WHERE id = ?1",
                params![id],
                habit_from_row,
            )
            .optional()?;

        match habit {
            Some(mut habit) => {
                habit.versions = load_versions(&conn, &habit.id)?;
                Ok(Some(habit))
            }
            None => Ok(None),
        }
    }

    fn list_habits(&self, include_deleted: bool) -> Result<Vec<Habit>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, order_index, is_deleted, created_at, updated_at
             FROM habits
             WHERE ?1 OR is_deleted = 0
             ORDER BY order_index, created_at",
        )?;

        let mut habits = stmt
            .query_map(params![include_deleted], habit_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for habit in &mut habits {
            habit.versions = load_versions(&conn, &habit.id)?;
        }
        Ok(habits)
    }

    fn update_habit(&self, habit: &Habit) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE habits SET name = ?1, order_index = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                habit.name,
                habit.order_index,
                format_datetime(&habit.updated_at),
                habit.id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_habit(&self, id: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE habits SET is_deleted = 1, updated_at = ?1 WHERE id = ?2 AND is_deleted = 0",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(rows > 0)
    }

    // Version operations

    fn upsert_habit_version(
        &self,
        habit_id: &str,
        version: &HabitVersion,
    ) -> Result<HabitVersion> {
        let conn = self.conn();
        insert_version(&conn, habit_id, version)?;

        conn.query_row(
            &format!(
                "SELECT {VERSION_COLUMNS} FROM habit_versions
                 WHERE habit_id = ?1 AND effective_week_start = ?2"
            ),
            params![habit_id, format_date(version.effective_week_start)],
            version_from_row,
        )
        .map_err(Error::from)
    }

    // Completion operations

    fn create_completion(&self, completion: &Completion) -> Result<()> {
        self.conn().execute(
            "INSERT INTO habit_completions (id, habit_id, date, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                completion.id,
                completion.habit_id,
                format_date(completion.date),
                completion.text,
                format_datetime(&completion.created_at),
            ],
        )?;
        Ok(())
    }

    fn get_completion(&self, id: &str) -> Result<Option<Completion>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {COMPLETION_COLUMNS} FROM habit_completions WHERE id = ?1"),
            params![id],
            completion_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_completions(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Completion>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date DESC, created_at DESC"
        ))?;

        let rows = stmt.query_map(
            params![format_date(start), format_date(end)],
            completion_from_row,
        )?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_habit_completions(
        &self,
        habit_id: &str,
        limit: i32,
        offset: i32,
    ) -> Result<Vec<Completion>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMPLETION_COLUMNS} FROM habit_completions
             WHERE habit_id = ?1
             ORDER BY date DESC, created_at DESC
             LIMIT ?2 OFFSET ?3"
        ))?;

        let rows = stmt.query_map(params![habit_id, limit, offset], completion_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_completion(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM habit_completions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn version(id: &str, start: &str, target: i64) -> HabitVersion {
        HabitVersion {
            id: id.to_string(),
            weekly_target: WeeklyTarget::new(target).unwrap(),
            requires_text_on_completion: false,
            linked_goal_id: None,
            description: None,
            effective_week_start: d(start),
            created_at: ts("2024-01-01T09:00:00Z"),
        }
    }

    fn habit(id: &str, order_index: i32, versions: Vec<HabitVersion>) -> Habit {
        Habit {
            id: id.to_string(),
            name: format!("habit {id}"),
            order_index,
            lifecycle: Lifecycle::Active,
            created_at: ts("2024-01-01T09:00:00Z"),
            updated_at: ts("2024-01-01T09:00:00Z"),
            versions,
        }
    }

    fn completion(id: &str, habit_id: &str, date: &str, created_at: &str) -> Completion {
        Completion {
            id: id.to_string(),
            habit_id: habit_id.to_string(),
            date: d(date),
            text: None,
            created_at: ts(created_at),
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let (_temp, store) = test_store();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"goals".to_string()));
        assert!(tables.contains(&"habits".to_string()));
        assert!(tables.contains(&"habit_versions".to_string()));
        assert!(tables.contains(&"habit_completions".to_string()));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_temp, store) = test_store();
        store.initialize().unwrap();
    }

    #[test]
    fn test_goal_crud_and_soft_delete() {
        let (_temp, store) = test_store();

        let goal = Goal {
            id: "goal-1".to_string(),
            title: "Run a marathon".to_string(),
            year: 2024,
            description: Some("Autumn race".to_string()),
            lifecycle: Lifecycle::Active,
            created_at: ts("2024-01-01T09:00:00Z"),
            updated_at: ts("2024-01-01T09:00:00Z"),
        };
        store.create_goal(&goal).unwrap();

        let fetched = store.get_goal("goal-1").unwrap().unwrap();
        assert_eq!(fetched.title, "Run a marathon");
        assert_eq!(fetched.description.as_deref(), Some("Autumn race"));

        assert_eq!(store.list_goals(Some(2024)).unwrap().len(), 1);
        assert!(store.list_goals(Some(2025)).unwrap().is_empty());

        let mut updated = fetched.clone();
        updated.title = "Run two marathons".to_string();
        store.update_goal(&updated).unwrap();
        assert_eq!(
            store.get_goal("goal-1").unwrap().unwrap().title,
            "Run two marathons"
        );

        assert!(store.delete_goal("goal-1").unwrap());
        assert!(!store.delete_goal("goal-1").unwrap());
        assert!(store.list_goals(None).unwrap().is_empty());

        let deleted = store.get_goal("goal-1").unwrap().unwrap();
        assert!(deleted.lifecycle.is_deleted());
    }

    #[test]
    fn test_deleting_goal_keeps_version_link() {
        let (_temp, store) = test_store();
        let now = ts("2024-01-01T09:00:00Z");
        store
            .create_goal(&Goal {
                id: "goal-1".to_string(),
                title: "Read more".to_string(),
                year: 2024,
                description: None,
                lifecycle: Lifecycle::Active,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let mut v = version("v1", "2024-01-01", 3);
        v.linked_goal_id = Some("goal-1".to_string());
        store.create_habit(&habit("h1", 0, vec![v])).unwrap();

        store.delete_goal("goal-1").unwrap();

        let h = store.get_habit("h1").unwrap().unwrap();
        assert_eq!(h.versions[0].linked_goal_id.as_deref(), Some("goal-1"));
    }

    #[test]
    fn test_habit_with_versions_round_trip() {
        let (_temp, store) = test_store();
        let h = habit(
            "h1",
            0,
            vec![version("v1", "2024-01-01", 3), version("v2", "2024-01-15", 5)],
        );
        store.create_habit(&h).unwrap();

        let fetched = store.get_habit("h1").unwrap().unwrap();
        assert_eq!(fetched.versions.len(), 2);
        // Newest first
        assert_eq!(fetched.versions[0].id, "v2");
        assert_eq!(fetched.versions[0].weekly_target.get(), 5);
        assert_eq!(fetched.versions[1].effective_week_start, d("2024-01-01"));

        assert!(store.get_habit("missing").unwrap().is_none());
    }

    #[test]
    fn test_upsert_replaces_same_week_version() {
        let (_temp, store) = test_store();
        store
            .create_habit(&habit("h1", 0, vec![version("v1", "2024-01-01", 3)]))
            .unwrap();

        let pending = store
            .upsert_habit_version("h1", &version("v2", "2024-01-08", 4))
            .unwrap();
        assert_eq!(pending.id, "v2");

        let mut replacement = version("v3", "2024-01-08", 6);
        replacement.requires_text_on_completion = true;
        let stored = store.upsert_habit_version("h1", &replacement).unwrap();

        // The row keeps its identity; the rules change
        assert_eq!(stored.id, "v2");
        assert_eq!(stored.weekly_target.get(), 6);
        assert!(stored.requires_text_on_completion);

        let h = store.get_habit("h1").unwrap().unwrap();
        assert_eq!(h.versions.len(), 2);
        assert!(crate::engine::check_timeline(&h).is_ok());
    }

    #[test]
    fn test_list_habits_orders_and_filters_deleted() {
        let (_temp, store) = test_store();
        store
            .create_habit(&habit("h1", 2, vec![version("v1", "2024-01-01", 1)]))
            .unwrap();
        store
            .create_habit(&habit("h2", 1, vec![version("v2", "2024-01-01", 1)]))
            .unwrap();
        store
            .create_habit(&habit("h3", 0, vec![version("v3", "2024-01-01", 1)]))
            .unwrap();

        assert!(store.delete_habit("h3").unwrap());
        assert!(!store.delete_habit("h3").unwrap());

        let active: Vec<String> = store
            .list_habits(false)
            .unwrap()
            .into_iter()
            .map(|h| h.id)
            .collect();
        assert_eq!(active, vec!["h2", "h1"]);

        let all = store.list_habits(true).unwrap();
        assert_eq!(all.len(), 3);
        assert!(all[0].lifecycle.is_deleted());
        assert_eq!(all[0].versions.len(), 1);
    }

    #[test]
    fn test_update_habit_missing_is_not_found() {
        let (_temp, store) = test_store();
        let result = store.update_habit(&habit("ghost", 0, vec![]));
        assert!(matches!(result, Err(Error::NotFound)));
    }

    #[test]
    fn test_completion_range_and_pagination() {
        let (_temp, store) = test_store();
        store
            .create_habit(&habit("h1", 0, vec![version("v1", "2024-01-01", 3)]))
            .unwrap();

        store
            .create_completion(&completion("c1", "h1", "2024-01-01", "2024-01-01T08:00:00Z"))
            .unwrap();
        store
            .create_completion(&completion("c2", "h1", "2024-01-03", "2024-01-03T08:00:00Z"))
            .unwrap();
        store
            .create_completion(&completion("c3", "h1", "2024-01-03", "2024-01-03T20:00:00Z"))
            .unwrap();
        store
            .create_completion(&completion("c4", "h1", "2024-01-08", "2024-01-08T08:00:00Z"))
            .unwrap();

        let week: Vec<String> = store
            .list_completions(d("2024-01-01"), d("2024-01-07"))
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(week, vec!["c3", "c2", "c1"]);

        let page: Vec<String> = store
            .list_habit_completions("h1", 2, 1)
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(page, vec!["c3", "c2"]);

        assert!(store.delete_completion("c2").unwrap());
        assert!(!store.delete_completion("c2").unwrap());
        assert!(store.get_completion("c2").unwrap().is_none());
    }

    #[test]
    fn test_completion_requires_existing_habit() {
        let (_temp, store) = test_store();
        let result =
            store.create_completion(&completion("c1", "nope", "2024-01-01", "2024-01-01T08:00:00Z"));
        assert!(matches!(result, Err(Error::Database(_))));
    }

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        assert!(store.list_habits(true).unwrap().is_empty());
    }
}
