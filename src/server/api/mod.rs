mod completions;
mod goals;
mod habits;
mod views;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;

use crate::engine::calendar::client_today;
use crate::error::Error;
use crate::server::AppState;
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::store::Store;

async fn health() -> &'static str {
    "OK"
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        // Goals
        .route("/goals", get(goals::list_goals))
        .route("/goals", post(goals::create_goal))
        .route("/goals/{id}", get(goals::get_goal))
        .route("/goals/{id}", put(goals::update_goal))
        .route("/goals/{id}", delete(goals::delete_goal))
        // Habits (rule edits become versions)
        .route("/habits", get(habits::list_habits))
        .route("/habits", post(habits::create_habit))
        .route("/habits/{id}", get(habits::get_habit))
        .route("/habits/{id}", put(habits::update_habit))
        .route("/habits/{id}", delete(habits::delete_habit))
        .route(
            "/habits/{id}/completions",
            get(habits::list_habit_completions),
        )
        // Completions
        .route("/completions", get(completions::list_completions))
        .route("/completions", post(completions::create_completion))
        .route("/completions/{id}", delete(completions::delete_completion))
        // Derived views
        .route("/daily", get(views::daily))
        .route("/progress", get(views::month_progress))
        .route("/progress/week", get(views::week_progress))
}

/// The requesting client's calendar day. Falls back to the server clock.
fn request_today(state: &AppState, offset_minutes: Option<i32>) -> Result<NaiveDate, ApiError> {
    match offset_minutes {
        Some(minutes) => Ok(client_today(state.clock.now(), minutes)?),
        None => Ok(state.clock.today()),
    }
}

/// A habit version may only link to a goal that exists and is not deleted.
fn require_linkable_goal(store: &dyn Store, goal_id: Option<&str>) -> Result<(), ApiError> {
    let Some(id) = goal_id else {
        return Ok(());
    };

    let goal = store
        .get_goal(id)
        .api_err("Failed to get goal")?
        .or_api_err(Error::GoalNotFound)?;

    if goal.lifecycle.is_deleted() {
        return Err(Error::GoalDeleted.into());
    }
    Ok(())
}
