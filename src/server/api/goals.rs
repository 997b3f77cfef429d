use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{GoalRequest, ListGoalsParams};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt, StoreResultExt};
use crate::server::validation::{normalize_optional, validate_goal_title, validate_goal_year};
use crate::store::Store;
use crate::types::{Goal, Lifecycle};

fn load_active_goal(store: &dyn Store, id: &str) -> Result<Goal, ApiError> {
    let goal = store
        .get_goal(id)
        .api_err("Failed to get goal")?
        .or_api_err(Error::GoalNotFound)?;
    if goal.lifecycle.is_deleted() {
        return Err(ApiError::from(Error::GoalNotFound));
    }
    Ok(goal)
}

pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListGoalsParams>,
) -> impl IntoResponse {
    let goals = state
        .store
        .list_goals(params.year)
        .api_err("Failed to list goals")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(goals)))
}

pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoalRequest>,
) -> impl IntoResponse {
    let title = validate_goal_title(&req.title)?;
    validate_goal_year(req.year)?;

    let now = state.clock.now();
    let goal = Goal {
        id: Uuid::new_v4().to_string(),
        title,
        year: req.year,
        description: normalize_optional(req.description),
        lifecycle: Lifecycle::Active,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .create_goal(&goal)
        .api_err("Failed to create goal")?;

    tracing::debug!(goal_id = %goal.id, "created goal");

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(goal))))
}

pub async fn get_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let goal = load_active_goal(state.store.as_ref(), &id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(goal)))
}

pub async fn update_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<GoalRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();
    let mut goal = load_active_goal(store, &id)?;

    goal.title = validate_goal_title(&req.title)?;
    validate_goal_year(req.year)?;
    goal.year = req.year;
    goal.description = normalize_optional(req.description);
    goal.updated_at = state.clock.now();

    store.update_goal(&goal).api_err("Failed to update goal")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(goal)))
}

/// Soft delete. Habit versions keep their link to the goal.
pub async fn delete_goal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_goal(&id)
        .api_err("Failed to delete goal")?;

    if !deleted {
        return Err(ApiError::from(Error::GoalNotFound));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
