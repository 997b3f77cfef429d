use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::calendar::{in_week, week_end, week_start, weeks_of_month};
use super::resolver::active_version;
use crate::error::Result;
use crate::types::{Completion, Habit};

const RED_BELOW: f64 = 25.0;
const GREEN_ABOVE: f64 = 75.0;

/// Colour classification of a week's completion percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Red,
    Yellow,
    Green,
    /// Nothing was required, or the week has not started yet.
    #[serde(rename = "none")]
    Unscored,
}

impl Band {
    #[must_use]
    pub fn classify(percentage: f64) -> Self {
        if percentage < RED_BELOW {
            Band::Red
        } else if percentage <= GREEN_ABOVE {
            Band::Yellow
        } else {
            Band::Green
        }
    }

    #[must_use]
    pub fn is_scored(self) -> bool {
        !matches!(self, Band::Unscored)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Band::Red => "red",
            Band::Yellow => "yellow",
            Band::Green => "green",
            Band::Unscored => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekProgress {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub required: u32,
    pub completed: u32,
    /// `completed / required * 100`; can exceed 100. Zero when nothing is required.
    pub percentage: f64,
    pub band: Band,
}

/// Habits that count for the week: active and resolving a version.
fn scored_habits(habits: &[Habit], week: NaiveDate) -> impl Iterator<Item = (&Habit, u32)> {
    habits.iter().filter(|h| h.is_active()).filter_map(move |h| {
        active_version(h, week).map(|v| (h, v.weekly_target.get()))
    })
}

fn count_in_week(completions: &[Completion], habit_id: &str, week: NaiveDate) -> u32 {
    let count = completions
        .iter()
        .filter(|c| c.habit_id == habit_id && in_week(c.date, week))
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Required and completed totals for the week containing `week_start`.
///
/// Deleted habits, and habits without a version for the week, contribute
/// nothing to either total.
#[must_use]
pub fn weekly_progress(
    habits: &[Habit],
    completions: &[Completion],
    week_start_date: NaiveDate,
    today: NaiveDate,
) -> WeekProgress {
    let week = week_start(week_start_date);

    let (required, completed) =
        scored_habits(habits, week).fold((0u32, 0u32), |(req, done), (habit, target)| {
            (
                req.saturating_add(target),
                done.saturating_add(count_in_week(completions, &habit.id, week)),
            )
        });

    let percentage = if required > 0 {
        f64::from(completed) / f64::from(required) * 100.0
    } else {
        0.0
    };

    let band = if required == 0 || week > today {
        Band::Unscored
    } else {
        Band::classify(percentage)
    };

    WeekProgress {
        week_start: week,
        week_end: week_end(week),
        required,
        completed,
        percentage,
        band,
    }
}

/// Weekly progress for every week overlapping the given month.
pub fn monthly_progress(
    habits: &[Habit],
    completions: &[Completion],
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<Vec<WeekProgress>> {
    Ok(weeks_of_month(year, month)?
        .into_iter()
        .map(|week| weekly_progress(habits, completions, week, today))
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub completed: bool,
    pub has_note: bool,
}

/// A habit's Monday-to-Sunday row in the calendar grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitWeekRow {
    pub habit_id: String,
    pub name: String,
    pub weekly_target: u32,
    pub days: [DayCell; 7],
}

#[must_use]
pub fn daily_grid(
    habits: &[Habit],
    completions: &[Completion],
    week_start_date: NaiveDate,
) -> Vec<HabitWeekRow> {
    let week = week_start(week_start_date);

    let mut rows: Vec<(&Habit, u32)> = scored_habits(habits, week).collect();
    rows.sort_by(|(a, _), (b, _)| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    rows.into_iter()
        .map(|(habit, target)| {
            let days = std::array::from_fn(|i| {
                let date = week + Duration::days(i as i64);
                let mut on_day = completions
                    .iter()
                    .filter(|c| c.habit_id == habit.id && c.date == date)
                    .peekable();
                let completed = on_day.peek().is_some();
                let has_note = on_day.any(Completion::has_note);
                DayCell {
                    date,
                    completed,
                    has_note,
                }
            });
            HabitWeekRow {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                weekly_target: target,
                days,
            }
        })
        .collect()
}
