use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::calendar::{in_week, is_today, week_start};
use super::resolver::active_version;
use crate::types::{Completion, Habit, HabitVersion};

/// How many checkable instances of a habit to surface on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstancePlan {
    /// Completions across the whole week containing the selected date.
    pub completed_count: u32,
    pub remaining: u32,
    /// Empty instances to show. Non-zero only on today.
    pub render_count: u32,
    pub completed_for_date: Vec<Completion>,
}

/// Plans the instances of one habit for `selected_date`.
///
/// `completions` may hold other habits' or other weeks' records; only those
/// for `habit` in the selected week are counted. Monday through
/// Saturday surface at most one instance; Sunday surfaces everything left so
/// the weekly target is still reachable.
#[must_use]
pub fn plan_instances(
    habit: &Habit,
    version: &HabitVersion,
    completions: &[Completion],
    selected_date: NaiveDate,
    today: NaiveDate,
) -> InstancePlan {
    let week = week_start(selected_date);
    let mine = || completions.iter().filter(|c| c.habit_id == habit.id);

    let completed_count = u32::try_from(mine().filter(|c| in_week(c.date, week)).count())
        .unwrap_or(u32::MAX);
    let remaining = version.weekly_target.get().saturating_sub(completed_count);

    let completed_for_date: Vec<Completion> = mine()
        .filter(|c| c.date == selected_date)
        .cloned()
        .collect();

    let render_count = if remaining == 0
        || !completed_for_date.is_empty()
        || !is_today(selected_date, today)
    {
        0
    } else if selected_date.weekday() == Weekday::Sun {
        remaining
    } else {
        remaining.min(1)
    };

    InstancePlan {
        completed_count,
        remaining,
        render_count,
        completed_for_date,
    }
}

/// One habit's row in the day view.
#[derive(Debug, Clone, Serialize)]
pub struct HabitDayPlan {
    pub habit_id: String,
    pub name: String,
    pub weekly_target: u32,
    pub requires_text_on_completion: bool,
    #[serde(flatten)]
    pub plan: InstancePlan,
}

/// Plans every active habit that has a version in effect for the week of
/// `selected_date`, in display order.
#[must_use]
pub fn plan_day(
    habits: &[Habit],
    completions: &[Completion],
    selected_date: NaiveDate,
    today: NaiveDate,
) -> Vec<HabitDayPlan> {
    let week = week_start(selected_date);
    let mut active: Vec<&Habit> = habits.iter().filter(|h| h.is_active()).collect();
    active.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    active
        .into_iter()
        .filter_map(|habit| {
            let version = active_version(habit, week)?;
            Some(HabitDayPlan {
                habit_id: habit.id.clone(),
                name: habit.name.clone(),
                weekly_target: version.weekly_target.get(),
                requires_text_on_completion: version.requires_text_on_completion,
                plan: plan_instances(habit, version, completions, selected_date, today),
            })
        })
        .collect()
}
