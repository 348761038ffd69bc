use crate::error::GenerationError;
use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::Serialize;
use thiserror::Error;

/// Error returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("failed to store upload: {0}")]
    Upload(#[source] std::io::Error),

    /// A generation call failed; `context` names the operation
    #[error("{context}: {source}")]
    Generation {
        context: &'static str,
        #[source]
        source: GenerationError,
    },
}

impl AppError {
    /// Wrap a pipeline failure, logging it on the way out
    pub fn processing(context: &'static str) -> impl FnOnce(GenerationError) -> AppError {
        move |source| {
            error!("{}: {} (stage: {})", context, source, source.stage());
            AppError::Generation { context, source }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Generation { source, .. } => match source {
                GenerationError::Load(_) => StatusCode::BAD_REQUEST,
                GenerationError::Provider { .. } => StatusCode::BAD_GATEWAY,
                GenerationError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                GenerationError::Index { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Upload(_) => "UPLOAD_ERROR",
            AppError::Generation { source, .. } => match source {
                GenerationError::Load(_) => "LOAD_ERROR",
                GenerationError::Provider { .. } => "PROVIDER_ERROR",
                GenerationError::Timeout { .. } => "TIMEOUT",
                GenerationError::Index { .. } => "INDEX_ERROR",
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.error_code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
