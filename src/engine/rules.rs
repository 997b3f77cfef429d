//! Admission rules for mutating completions, and the week a new habit
//! version takes effect.

use chrono::NaiveDate;

use super::calendar::{is_today, next_monday, week_start};
use super::resolver::active_version;
use crate::error::{Error, Result};
use crate::types::{Completion, Habit};

/// Checks whether a completion may be recorded for `habit` on `date`.
///
/// `week_completions` must contain at least this habit's completions for the
/// week of `date`; anything else in it is ignored. On success returns the
/// trimmed note, with blank text collapsed to `None`.
pub fn admit_completion(
    habit: &Habit,
    week_completions: &[Completion],
    date: NaiveDate,
    text: Option<&str>,
    today: NaiveDate,
) -> Result<Option<String>> {
    if !is_today(date, today) {
        return Err(Error::PastDateReadonly);
    }
    if !habit.is_active() {
        return Err(Error::HabitDeleted);
    }

    let week = week_start(date);
    let version = active_version(habit, week).ok_or(Error::HabitNotActiveForWeek)?;

    let done = week_completions
        .iter()
        .filter(|c| c.habit_id == habit.id && week_start(c.date) == week)
        .count();
    if done >= version.weekly_target.get() as usize {
        return Err(Error::WeeklyTargetAlreadyMet);
    }

    let text = text.map(str::trim).filter(|t| !t.is_empty());
    if version.requires_text_on_completion && text.is_none() {
        return Err(Error::TextRequired);
    }

    Ok(text.map(str::to_string))
}

/// Completions can only be removed on the day they were recorded.
pub fn admit_deletion(completion: &Completion, today: NaiveDate) -> Result<()> {
    if is_today(completion.date, today) {
        Ok(())
    } else {
        Err(Error::CompletionNotToday)
    }
}

/// A new habit's first version applies to the current week.
#[must_use]
pub fn initial_effective_week(today: NaiveDate) -> NaiveDate {
    week_start(today)
}

/// Edits never rewrite a week in progress; they apply from next Monday.
#[must_use]
pub fn next_effective_week(today: NaiveDate) -> NaiveDate {
    next_monday(today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::*;
    use crate::types::Lifecycle;

    fn reading() -> Habit {
        habit("h1", vec![version("v1", "2024-01-01", 2)])
    }

    #[test]
    fn test_admits_first_completion_today() {
        let today = d("2024-01-03");
        let text = admit_completion(&reading(), &[], today, Some("  chapter 3 "), today).unwrap();
        assert_eq!(text.as_deref(), Some("chapter 3"));

        let blank = admit_completion(&reading(), &[], today, Some("   "), today).unwrap();
        assert!(blank.is_none());
    }

    #[test]
    fn test_rejects_other_days() {
        let today = d("2024-01-03");
        let result = admit_completion(&reading(), &[], d("2024-01-02"), None, today);
        assert!(matches!(result, Err(Error::PastDateReadonly)));
        let result = admit_completion(&reading(), &[], d("2024-01-04"), None, today);
        assert!(matches!(result, Err(Error::PastDateReadonly)));
    }

    #[test]
    fn test_rejects_deleted_habit() {
        let mut h = reading();
        h.lifecycle = Lifecycle::Deleted;
        let today = d("2024-01-03");
        assert!(matches!(
            admit_completion(&h, &[], today, None, today),
            Err(Error::HabitDeleted)
        ));
    }

    #[test]
    fn test_rejects_habit_without_version_this_week() {
        let h = habit("h1", vec![version("v1", "2024-01-08", 2)]);
        let today = d("2024-01-03");
        assert!(matches!(
            admit_completion(&h, &[], today, None, today),
            Err(Error::HabitNotActiveForWeek)
        ));
    }

    #[test]
    fn test_rejects_when_target_met() {
        let today = d("2024-01-03");
        let completions = vec![
            completion("c1", "h1", "2024-01-01"),
            completion("c2", "h1", "2024-01-02"),
            completion("c0", "h1", "2023-12-31"),
        ];
        assert!(matches!(
            admit_completion(&reading(), &completions, today, None, today),
            Err(Error::WeeklyTargetAlreadyMet)
        ));
        assert!(admit_completion(&reading(), &completions[1..], today, None, today).is_ok());
    }

    #[test]
    fn test_requires_text_when_version_demands_it() {
        let mut v = version("v1", "2024-01-01", 2);
        v.requires_text_on_completion = true;
        let h = habit("h1", vec![v]);
        let today = d("2024-01-03");
        assert!(matches!(
            admit_completion(&h, &[], today, None, today),
            Err(Error::TextRequired)
        ));
        assert!(matches!(
            admit_completion(&h, &[], today, Some(" \t"), today),
            Err(Error::TextRequired)
        ));
        assert!(admit_completion(&h, &[], today, Some("done"), today).is_ok());
    }

    #[test]
    fn test_deletion_only_same_day() {
        let c = completion("c1", "h1", "2024-01-03");
        assert!(admit_deletion(&c, d("2024-01-03")).is_ok());
        assert!(matches!(
            admit_deletion(&c, d("2024-01-04")),
            Err(Error::CompletionNotToday)
        ));
    }

    #[test]
    fn test_effective_weeks() {
        assert_eq!(initial_effective_week(d("2024-01-03")), d("2024-01-01"));
        assert_eq!(next_effective_week(d("2024-01-03")), d("2024-01-08"));
        assert_eq!(next_effective_week(d("2024-01-01")), d("2024-01-08"));
    }
}
