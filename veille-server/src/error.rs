//! The API error type. Every failure a handler can produce maps to one
//! variant, and every variant renders as `{error, code}` JSON with an
//! optional `message`, so clients always get the same shape whatever went
//! wrong.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use veille_core::{CompletionError, ValidationError};

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, malformed, unknown or expired bearer token.
    #[error("Authentication required")]
    Unauthorized,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A veille addressed by path id does not exist.
    #[error("Veille not found")]
    NotFound,

    /// A veille referenced by `veilleId` in a body does not exist.
    #[error("Veille not found")]
    VeilleNotFound,

    #[error("Access denied")]
    Forbidden,

    /// Ownership failure when appending historique, with its own wording.
    #[error("You do not have permission to add historique to this veille")]
    HistoriqueForbidden,

    /// The row vanished between the ownership check and the write.
    #[error("Update failed")]
    UpdateFailed,

    #[error("Delete failed")]
    DeleteFailed,

    #[error("OpenAI API key not configured")]
    OpenAiKeyMissing,

    #[error("Invalid OpenAI API key")]
    OpenAiAuth,

    #[error("OpenAI rate limit exceeded")]
    OpenAiRateLimit,

    /// The model answered with an empty report.
    #[error("No content generated")]
    GenerationFailed,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::VeilleNotFound => StatusCode::NOT_FOUND,
            ApiError::Forbidden | ApiError::HistoriqueForbidden => StatusCode::FORBIDDEN,
            ApiError::OpenAiRateLimit => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpdateFailed
            | ApiError::DeleteFailed
            | ApiError::OpenAiKeyMissing
            | ApiError::OpenAiAuth
            | ApiError::GenerationFailed
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "UNAUTHORIZED",
            ApiError::Validation(err) => err.code(),
            ApiError::NotFound => "NOT_FOUND",
            ApiError::VeilleNotFound => "VEILLE_NOT_FOUND",
            ApiError::Forbidden | ApiError::HistoriqueForbidden => "FORBIDDEN",
            ApiError::UpdateFailed => "UPDATE_FAILED",
            ApiError::DeleteFailed => "DELETE_FAILED",
            ApiError::OpenAiKeyMissing => "OPENAI_KEY_MISSING",
            ApiError::OpenAiAuth => "OPENAI_AUTH_ERROR",
            ApiError::OpenAiRateLimit => "OPENAI_RATE_LIMIT",
            ApiError::GenerationFailed => "GENERATION_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// French operator hint carried alongside OpenAI failures.
    fn message(&self) -> Option<&'static str> {
        match self {
            ApiError::OpenAiKeyMissing => {
                Some("Veuillez configurer la clé API OpenAI dans les variables d'environnement")
            }
            ApiError::OpenAiAuth => Some("La clé API OpenAI est invalide"),
            ApiError::OpenAiRateLimit => {
                Some("Limite de requêtes OpenAI atteinte. Veuillez réessayer plus tard.")
            }
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<CompletionError> for ApiError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::MissingApiKey => ApiError::OpenAiKeyMissing,
            CompletionError::Auth(_) => ApiError::OpenAiAuth,
            CompletionError::RateLimited(_) => ApiError::OpenAiRateLimit,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status().is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        if let Some(message) = self.message() {
            body["message"] = serde_json::Value::String(message.to_string());
        }

        (self.status(), Json(body)).into_response()
    }
}
