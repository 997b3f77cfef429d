use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use super::require_linkable_goal;
use crate::engine::rules::{initial_effective_week, next_effective_week};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{HabitRequest, HabitResponse, PageParams};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PaginatedResponse, StoreOptionExt,
    StoreResultExt,
};
use crate::server::validation::{normalize_optional, validate_habit_name, validate_weekly_target};
use crate::types::{Habit, HabitVersion, Lifecycle};

pub async fn list_habits(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let habits = state
        .store
        .list_habits(false)
        .api_err("Failed to list habits")?;

    let habits: Vec<HabitResponse> = habits.into_iter().map(HabitResponse::from).collect();

    Ok::<_, ApiError>(Json(ApiResponse::success(habits)))
}

pub async fn create_habit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HabitRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let name = validate_habit_name(&req.name)?;
    let weekly_target = validate_weekly_target(req.weekly_target)?;
    require_linkable_goal(store, req.linked_goal_id.as_deref())?;

    let now = state.clock.now();
    let today = state.clock.today();
    let habit = Habit {
        id: Uuid::new_v4().to_string(),
        name,
        order_index: req.order_index,
        lifecycle: Lifecycle::Active,
        created_at: now,
        updated_at: now,
        versions: vec![HabitVersion {
            id: Uuid::new_v4().to_string(),
            weekly_target,
            requires_text_on_completion: req.requires_text_on_completion,
            linked_goal_id: req.linked_goal_id,
            description: normalize_optional(req.description),
            effective_week_start: initial_effective_week(today),
            created_at: now,
        }],
    };

    store.create_habit(&habit).api_err("Failed to create habit")?;

    tracing::debug!(habit_id = %habit.id, "created habit");

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(HabitResponse::from(habit))),
    ))
}

/// Returns the habit even when it has been deleted, so history stays viewable.
pub async fn get_habit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let habit = state
        .store
        .get_habit(&id)
        .api_err("Failed to get habit")?
        .or_api_err(Error::HabitNotFound)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(HabitResponse::from(habit))))
}

/// Renames and reorders immediately. Rule changes become a version that
/// starts next Monday, replacing any version already pending for that week.
pub async fn update_habit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<HabitRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let mut habit = store
        .get_habit(&id)
        .api_err("Failed to get habit")?
        .or_api_err(Error::HabitNotFound)?;
    if !habit.is_active() {
        return Err(ApiError::from(Error::HabitDeleted));
    }

    let name = validate_habit_name(&req.name)?;
    let weekly_target = validate_weekly_target(req.weekly_target)?;
    require_linkable_goal(store, req.linked_goal_id.as_deref())?;

    let now = state.clock.now();
    habit.name = name;
    habit.order_index = req.order_index;
    habit.updated_at = now;
    store.update_habit(&habit).api_err("Failed to update habit")?;

    let version = HabitVersion {
        id: Uuid::new_v4().to_string(),
        weekly_target,
        requires_text_on_completion: req.requires_text_on_completion,
        linked_goal_id: req.linked_goal_id,
        description: normalize_optional(req.description),
        effective_week_start: next_effective_week(state.clock.today()),
        created_at: now,
    };
    let stored = store
        .upsert_habit_version(&habit.id, &version)
        .api_err("Failed to save habit version")?;

    tracing::debug!(
        habit_id = %habit.id,
        effective_week_start = %stored.effective_week_start,
        "scheduled habit version"
    );

    let habit = store
        .get_habit(&id)
        .api_err("Failed to get habit")?
        .or_api_err(Error::HabitNotFound)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(HabitResponse::from(habit))))
}

/// Soft delete. Versions and completions are retained.
pub async fn delete_habit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let deleted = state
        .store
        .delete_habit(&id)
        .api_err("Failed to delete habit")?;

    if !deleted {
        return Err(ApiError::from(Error::HabitNotFound));
    }

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn list_habit_completions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }
    let offset = params.offset.unwrap_or(0);
    if offset < 0 {
        return Err(ApiError::validation("offset cannot be negative"));
    }

    store
        .get_habit(&id)
        .api_err("Failed to get habit")?
        .or_api_err(Error::HabitNotFound)?;

    let completions = store
        .list_habit_completions(&id, limit + 1, offset)
        .api_err("Failed to list completions")?;

    Ok::<_, ApiError>(Json(PaginatedResponse::from_overfetch(
        completions,
        limit,
        offset,
    )))
}
