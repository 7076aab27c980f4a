//! Report generation endpoint.
//!
//! `POST /generate-veille` drives the whole pipeline: validate the request,
//! check ownership, call OpenAI, then persist the report to the veille and
//! its historique in a single transaction. Nothing is written when the
//! model returns a blank answer.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use veille_core::models::Veille;
use veille_core::openai::{CompletionConfig, OpenAiClient};
use veille_core::report::{build_prompt, SYSTEM_PROMPT};
use veille_core::{store, validate};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::http::HttpState;

use super::parse_body;

/// Body of a successful `POST /generate-veille`.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub veille: Veille,
    pub content: String,
}

// ============================================================================
// Inner (directly testable) business logic function
// ============================================================================

pub async fn generate_inner(
    pool: &PgPool,
    completion: &CompletionConfig,
    user_id: &str,
    body: Value,
) -> Result<GenerateResponse, ApiError> {
    let request = validate::generate_request(&body)?;

    let veille = store::veille::fetch(pool, request.veille_id)
        .await?
        .ok_or(ApiError::VeilleNotFound)?;
    if veille.user_id != user_id {
        return Err(ApiError::Forbidden);
    }

    // Key problems surface here, before any tokens are spent.
    let client = OpenAiClient::new(completion.clone())?;

    let prompt = build_prompt(&request.sujet, request.contexte.as_deref());
    let content = client.complete(SYSTEM_PROMPT, &prompt).await?;
    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::GenerationFailed);
    }

    let (veille, entry) =
        store::veille::record_generation(pool, request.veille_id, user_id, &content, Utc::now())
            .await?
            .ok_or(ApiError::VeilleNotFound)?;

    tracing::info!(
        veille_id = veille.id,
        historique_id = entry.id,
        user_id,
        "Generated veille report"
    );

    Ok(GenerateResponse {
        success: true,
        veille,
        content,
    })
}

// ============================================================================
// Axum handler wrapper (thin - delegates to the inner function)
// ============================================================================

pub async fn generate_handler(
    State(state): State<Arc<HttpState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body = parse_body(&body)?;
    let response = generate_inner(&state.pool, &state.completion, &user_id, body).await?;
    Ok(Json(response))
}
