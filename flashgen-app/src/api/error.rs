use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flashgen_core::{ApiErrorBody, CoreError, ValidationIssue};

pub const INVALID_INPUT: &str = "Invalid input data";
pub const INVALID_JSON: &str = "Invalid JSON";
pub const GENERATION_FAILED: &str = "An error occurred while generating flashcards";
pub const SAVE_FAILED: &str = "Failed to save flashcards";
pub const LOAD_FAILED: &str = "Failed to load flashcards";

/// Error type for the HTTP handlers.
///
/// 4xx bodies carry `{error, details}`, 5xx bodies carry `{error, message}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid input data")]
    InvalidInput(Vec<ValidationIssue>),

    #[error("Invalid JSON")]
    InvalidJson(Vec<ValidationIssue>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{error}: {message}")]
    Internal { error: &'static str, message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn internal(error: &'static str, err: impl std::fmt::Display) -> Self {
        ApiError::Internal { error, message: err.to_string() }
    }

    /// Maps a pipeline error; anything that is not a client mistake becomes a
    /// 500 under `context`.
    pub fn from_core(context: &'static str, err: CoreError) -> Self {
        match err {
            CoreError::Validation(issues) => ApiError::InvalidInput(issues),
            CoreError::NotFound("generation") => ApiError::InvalidInput(vec![ValidationIssue::new(
                "generation_id",
                "invalid_generation_id",
                "generation does not exist",
            )]),
            other => ApiError::internal(context, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ApiErrorBody {
        match self {
            ApiError::InvalidInput(details) => ApiErrorBody {
                error: Some(INVALID_INPUT.to_string()),
                message: None,
                details: Some(details.clone()),
            },
            ApiError::InvalidJson(details) => ApiErrorBody {
                error: Some(INVALID_JSON.to_string()),
                message: None,
                details: Some(details.clone()),
            },
            ApiError::NotFound(_) => ApiErrorBody {
                error: Some(self.to_string()),
                ..Default::default()
            },
            ApiError::Internal { error, message } => ApiErrorBody {
                error: Some(error.to_string()),
                message: Some(message.clone()),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { error, message } = &self {
            tracing::error!(error = %message, "{error}");
        }
        (self.status(), axum::Json(self.body())).into_response()
    }
}
