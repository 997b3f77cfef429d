use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::{HabitDayPlan, HabitWeekRow, WeekProgress, latest_version};
use crate::types::Habit;

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub title: String,
    pub year: i32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListGoalsParams {
    #[serde(default)]
    pub year: Option<i32>,
}

/// Body for both creating and editing a habit.
#[derive(Debug, Deserialize)]
pub struct HabitRequest {
    pub name: String,
    pub weekly_target: i64,
    #[serde(default)]
    pub requires_text_on_completion: bool,
    #[serde(default)]
    pub linked_goal_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Serialize)]
pub struct HabitResponse {
    #[serde(flatten)]
    pub habit: Habit,
    /// Goal link of the newest version, for display.
    pub linked_goal_id: Option<String>,
}

impl From<Habit> for HabitResponse {
    fn from(habit: Habit) -> Self {
        let linked_goal_id = latest_version(&habit).and_then(|v| v.linked_goal_id.clone());
        Self {
            habit,
            linked_goal_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub limit: Option<i32>,
    #[serde(default)]
    pub offset: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionRangeParams {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompletionRequest {
    pub habit_id: String,
    pub date: String,
    #[serde(default)]
    pub text: Option<String>,
    /// Minutes east of UTC used to decide what "today" is for the client.
    #[serde(default)]
    pub client_tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientOffsetParams {
    #[serde(default)]
    pub client_tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateParams {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub client_tz_offset_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DailyView {
    pub date: NaiveDate,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub is_today: bool,
    pub is_past: bool,
    pub habits: Vec<HabitDayPlan>,
}

#[derive(Debug, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<WeekProgress>,
}

#[derive(Debug, Serialize)]
pub struct WeekView {
    pub progress: WeekProgress,
    pub grid: Vec<HabitWeekRow>,
}
