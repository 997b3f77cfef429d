//! Read-only views derived from habits, versions and completions.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{Datelike, Duration, NaiveDate};

use super::request_today;
use crate::engine::calendar::{is_past, is_today, parse_date, week_range, weeks_of_month};
use crate::engine::{daily_grid, monthly_progress, plan_day, weekly_progress};
use crate::server::AppState;
use crate::server::dto::{DailyView, DateParams, MonthParams, MonthView, WeekView};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

fn selected_date(params: &DateParams, today: NaiveDate) -> Result<NaiveDate, ApiError> {
    match params.date.as_deref() {
        Some(raw) => Ok(parse_date(raw)?),
        None => Ok(today),
    }
}

pub async fn daily(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let today = request_today(&state, params.client_tz_offset_minutes)?;
    let date = selected_date(&params, today)?;
    let (week_start, week_end) = week_range(date);

    let habits = store.list_habits(false).api_err("Failed to list habits")?;
    let completions = store
        .list_completions(week_start, week_end)
        .api_err("Failed to list completions")?;

    let view = DailyView {
        date,
        week_start,
        week_end,
        is_today: is_today(date, today),
        is_past: is_past(date, today),
        habits: plan_day(&habits, &completions, date, today),
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

/// Week-by-week scores for every week that overlaps the month.
pub async fn month_progress(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MonthParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let today = state.clock.today();
    let year = params.year.unwrap_or_else(|| today.year());
    let month = params.month.unwrap_or_else(|| today.month());

    let weeks = weeks_of_month(year, month)?;
    let (Some(first), Some(last)) = (weeks.first(), weeks.last()) else {
        return Err(ApiError::validation("month has no weeks"));
    };

    let habits = store.list_habits(false).api_err("Failed to list habits")?;
    let completions = store
        .list_completions(*first, *last + Duration::days(6))
        .api_err("Failed to list completions")?;

    let view = MonthView {
        year,
        month,
        weeks: monthly_progress(&habits, &completions, year, month, today)?,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}

pub async fn week_progress(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DateParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let today = request_today(&state, params.client_tz_offset_minutes)?;
    let date = selected_date(&params, today)?;
    let (week_start, week_end) = week_range(date);

    let habits = store.list_habits(false).api_err("Failed to list habits")?;
    let completions = store
        .list_completions(week_start, week_end)
        .api_err("Failed to list completions")?;

    let view = WeekView {
        progress: weekly_progress(&habits, &completions, week_start, today),
        grid: daily_grid(&habits, &completions, week_start),
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(view)))
}
