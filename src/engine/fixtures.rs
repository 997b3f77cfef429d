use chrono::{DateTime, NaiveDate, Utc};

use crate::engine::calendar::parse_date;
use crate::types::{Completion, Habit, HabitVersion, Lifecycle, WeeklyTarget};

pub fn d(s: &str) -> NaiveDate {
    parse_date(s).unwrap()
}

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

pub fn version(id: &str, start: &str, target: i64) -> HabitVersion {
    HabitVersion {
        id: id.to_string(),
        weekly_target: WeeklyTarget::new(target).unwrap(),
        requires_text_on_completion: false,
        linked_goal_id: None,
        description: None,
        effective_week_start: d(start),
        created_at: ts("2024-01-01T00:00:00Z"),
    }
}

pub fn habit(id: &str, versions: Vec<HabitVersion>) -> Habit {
    Habit {
        id: id.to_string(),
        name: format!("habit {id}"),
        order_index: 0,
        lifecycle: Lifecycle::Active,
        created_at: ts("2024-01-01T00:00:00Z"),
        updated_at: ts("2024-01-01T00:00:00Z"),
        versions,
    }
}

pub fn completion(id: &str, habit_id: &str, date: &str) -> Completion {
    Completion {
        id: id.to_string(),
        habit_id: habit_id.to_string(),
        date: d(date),
        text: None,
        created_at: ts("2024-01-01T00:00:00Z"),
    }
}
