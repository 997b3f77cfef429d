use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("not found")]
    NotFound,

    #[error("completions can only be created for today")]
    PastDateReadonly,

    #[error("habit not found")]
    HabitNotFound,

    #[error("habit has been deleted")]
    HabitDeleted,

    #[error("habit is not active for this week")]
    HabitNotActiveForWeek,

    #[error("weekly target has already been met")]
    WeeklyTargetAlreadyMet,

    #[error("text is required for this habit")]
    TextRequired,

    #[error("completion not found")]
    CompletionNotFound,

    #[error("completions can only be deleted on the same day")]
    CompletionNotToday,

    #[error("goal not found")]
    GoalNotFound,

    #[error("goal has been deleted")]
    GoalDeleted,
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
