use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("TTS backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unsupported operating system for lip sync: {0}")]
    UnsupportedPlatform(String),

    #[error("Lip sync failed: {0}")]
    LipSync(String),

    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Hide the underlying failure behind a route-level message.
    ///
    /// Client errors pass through untouched so callers still see why their
    /// request was rejected.
    pub fn with_public_message(self, message: &'static str) -> Self {
        match self {
            AppError::BadRequest(_) | AppError::Internal { .. } => self,
            other => AppError::Internal {
                message,
                source: Box::new(other),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Backend(_) => "TTS_BACKEND_ERROR",
            AppError::IoError(_) => "IO_ERROR",
            AppError::UnsupportedPlatform(_) => "UNSUPPORTED_PLATFORM",
            AppError::LipSync(_) => "LIP_SYNC_ERROR",
            AppError::Internal { source, .. } => source.code(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Internal { message, source } => {
                tracing::error!("Request failed: {} - {} ({})", code, message, source);
                message.to_string()
            }
            other => other.to_string(),
        };

        if !matches!(self, AppError::Internal { .. }) {
            tracing::error!("Request failed: {} - {}", code, message);
        }

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
