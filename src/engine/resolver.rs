use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;

use super::calendar::{format_date, is_monday};
use crate::error::{Error, Result};
use crate::types::{Habit, HabitVersion};

/// Orders versions by effective week, breaking ties on creation time and then id.
fn version_order(a: &HabitVersion, b: &HabitVersion) -> Ordering {
    a.effective_week_start
        .cmp(&b.effective_week_start)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// The version in effect for the week starting `week_start`.
///
/// Picks the latest `effective_week_start` that is on or before the week.
/// Returns `None` when the habit has no version yet for that week, which
/// callers treat as "habit does not exist this week".
///
/// Two versions sharing a start date break the timeline invariant; the most
/// recently created one wins so the answer stays deterministic. Use
/// [`check_timeline`] to detect that case.
#[must_use]
pub fn active_version(habit: &Habit, week_start: NaiveDate) -> Option<&HabitVersion> {
    habit
        .versions
        .iter()
        .filter(|v| v.effective_week_start <= week_start)
        .max_by(|a, b| version_order(a, b))
}

/// The newest version regardless of week, including versions scheduled for a future week.
#[must_use]
pub fn latest_version(habit: &Habit) -> Option<&HabitVersion> {
    habit.versions.iter().max_by(|a, b| version_order(a, b))
}

/// Versions sorted oldest to newest.
#[must_use]
pub fn timeline(habit: &Habit) -> Vec<&HabitVersion> {
    let mut versions: Vec<&HabitVersion> = habit.versions.iter().collect();
    versions.sort_by(|a, b| version_order(a, b));
    versions
}

/// Verifies every version starts on a Monday and no two share a start week.
pub fn check_timeline(habit: &Habit) -> Result<()> {
    let mut seen = HashSet::new();
    for version in &habit.versions {
        let start = version.effective_week_start;
        if !is_monday(start) {
            return Err(Error::Validation(format!(
                "habit {} version {} starts on {}, which is not a Monday",
                habit.id,
                version.id,
                format_date(start)
            )));
        }
        if !seen.insert(start) {
            return Err(Error::Validation(format!(
                "habit {} has more than one version effective {}",
                habit.id,
                format_date(start)
            )));
        }
    }
    Ok(())
}
