use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::request_today;
use crate::engine::calendar::{parse_date, week_range};
use crate::engine::rules::{admit_completion, admit_deletion};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{ClientOffsetParams, CompletionRangeParams, CreateCompletionRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::types::Completion;

pub async fn list_completions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CompletionRangeParams>,
) -> impl IntoResponse {
    let start = parse_date(&params.start)?;
    let end = parse_date(&params.end)?;
    if start > end {
        return Err(ApiError::from(Error::InvalidDate(format!(
            "start {start} is after end {end}"
        ))));
    }

    let completions = state
        .store
        .list_completions(start, end)
        .api_err("Failed to list completions")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(completions)))
}

/// Records a completion for the client's today, within the habit's weekly target.
pub async fn create_completion(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCompletionRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let date = parse_date(&req.date)?;
    let today = request_today(&state, req.client_tz_offset_minutes)?;

    let habit = store
        .get_habit(&req.habit_id)
        .api_err("Failed to get habit")?
        .or_api_err(Error::HabitNotFound)?;

    let (week_start, week_end) = week_range(date);
    let week_completions = store
        .list_completions(week_start, week_end)
        .api_err("Failed to list completions")?;

    let text = admit_completion(&habit, &week_completions, date, req.text.as_deref(), today)?;

    let completion = Completion {
        id: Uuid::new_v4().to_string(),
        habit_id: habit.id,
        date,
        text,
        created_at: state.clock.now(),
    };

    store
        .create_completion(&completion)
        .api_err("Failed to create completion")?;

    tracing::debug!(
        completion_id = %completion.id,
        habit_id = %completion.habit_id,
        date = %completion.date,
        "recorded completion"
    );

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(completion))))
}

pub async fn delete_completion(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ClientOffsetParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let completion = store
        .get_completion(&id)
        .api_err("Failed to get completion")?
        .or_api_err(Error::CompletionNotFound)?;

    let today = request_today(&state, params.client_tz_offset_minutes)?;
    admit_deletion(&completion, today)?;

    store
        .delete_completion(&id)
        .api_err("Failed to delete completion")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
