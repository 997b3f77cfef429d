use crate::server::response::ApiError;
use crate::types::WeeklyTarget;

const MAX_HABIT_NAME_LEN: usize = 80;
const MAX_GOAL_TITLE_LEN: usize = 120;
const MIN_GOAL_YEAR: i32 = 2000;
const MAX_GOAL_YEAR: i32 = 2100;

fn validate_label(value: &str, entity: &str, field: &str, max_len: usize) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{entity} {field} cannot be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(format!("{entity} {field} cannot exceed {max_len} characters"));
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed name.
pub fn validate_habit_name(name: &str) -> Result<String, ApiError> {
    validate_label(name, "Habit", "name", MAX_HABIT_NAME_LEN).map_err(ApiError::validation)
}

/// Returns the trimmed title.
pub fn validate_goal_title(title: &str) -> Result<String, ApiError> {
    validate_label(title, "Goal", "title", MAX_GOAL_TITLE_LEN).map_err(ApiError::validation)
}

pub fn validate_goal_year(year: i32) -> Result<(), ApiError> {
    if !(MIN_GOAL_YEAR..=MAX_GOAL_YEAR).contains(&year) {
        return Err(ApiError::validation(format!(
            "Goal year must be between {MIN_GOAL_YEAR} and {MAX_GOAL_YEAR}"
        )));
    }
    Ok(())
}

pub fn validate_weekly_target(target: i64) -> Result<WeeklyTarget, ApiError> {
    WeeklyTarget::new(target).map_err(ApiError::from)
}

/// Blank optional text becomes `None`.
#[must_use]
pub fn normalize_optional(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
