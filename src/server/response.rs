use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result as StoreResult};

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }
}

/// Offset-paginated response for history endpoints
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<i32>,
    pub has_more: bool,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Builds a page from `limit + 1` fetched rows.
    #[must_use]
    pub fn from_overfetch(mut items: Vec<T>, limit: i32, offset: i32) -> Self {
        let page_size = usize::try_from(limit).unwrap_or(0);
        let has_more = items.len() > page_size;
        items.truncate(page_size);
        Self {
            data: items,
            next_offset: has_more.then_some(offset + limit),
            has_more,
        }
    }
}

/// API error that converts to a proper HTTP response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let message = e.to_string();
        match e {
            Error::Validation(m) => Self::validation(m),
            Error::InvalidDate(m) => Self::new(StatusCode::BAD_REQUEST, "INVALID_DATE", m),
            Error::PastDateReadonly => {
                Self::new(StatusCode::BAD_REQUEST, "PAST_DATE_READONLY", message)
            }
            Error::HabitNotFound | Error::NotFound => {
                Self::new(StatusCode::NOT_FOUND, "HABIT_NOT_FOUND", "habit not found")
            }
            Error::HabitDeleted => Self::new(StatusCode::BAD_REQUEST, "HABIT_DELETED", message),
            Error::HabitNotActiveForWeek => {
                Self::new(StatusCode::BAD_REQUEST, "HABIT_NOT_ACTIVE_FOR_WEEK", message)
            }
            Error::WeeklyTargetAlreadyMet => {
                Self::new(StatusCode::BAD_REQUEST, "WEEKLY_TARGET_ALREADY_MET", message)
            }
            Error::TextRequired => Self::new(StatusCode::BAD_REQUEST, "TEXT_REQUIRED", message),
            Error::CompletionNotFound => {
                Self::new(StatusCode::NOT_FOUND, "COMPLETION_NOT_FOUND", message)
            }
            Error::CompletionNotToday => {
                Self::new(StatusCode::BAD_REQUEST, "COMPLETION_NOT_TODAY", message)
            }
            Error::GoalNotFound => Self::new(StatusCode::NOT_FOUND, "GOAL_NOT_FOUND", message),
            Error::GoalDeleted => Self::new(StatusCode::BAD_REQUEST, "GOAL_DELETED", message),
            Error::Database(_) | Error::Io(_) | Error::Config(_) => {
                tracing::error!("internal error: {message}");
                Self::internal("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "data": null, "error": self.message, "code": self.code });
        (self.status, Json(body)).into_response()
    }
}

pub const DEFAULT_PAGE_SIZE: i32 = 20;
pub const MAX_PAGE_SIZE: i32 = 100;

/// Extension trait for converting store results to API errors with a custom message.
pub trait StoreResultExt<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn api_err(self, message: &'static str) -> Result<T, ApiError> {
        self.map_err(|e| {
            tracing::error!("{message}: {e}");
            ApiError::internal(message)
        })
    }
}

/// Extension for Option types from store operations.
pub trait StoreOptionExt<T> {
    fn or_api_err(self, error: Error) -> Result<T, ApiError>;
}

impl<T> StoreOptionExt<T> for Option<T> {
    fn or_api_err(self, error: Error) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::from(error))
    }
}
