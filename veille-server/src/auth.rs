//! Bearer-token session middleware.
//!
//! Every route except `/health` runs through [`require_session`]: the
//! `Authorization` header is resolved against the `session` table and the
//! matching user id is stashed in request extensions as [`AuthUser`].
//! Handlers never see an unauthenticated request.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use veille_core::store;

use crate::error::ApiError;
use crate::http::HttpState;

/// The authenticated caller, inserted into request extensions by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

/// Extract the bearer token from an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub async fn require_session(
    State(state): State<Arc<HttpState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        return ApiError::Unauthorized.into_response();
    };

    let session = match store::session::find_by_token(&state.pool, token).await {
        Ok(session) => session,
        Err(err) => return ApiError::from(err).into_response(),
    };

    match session {
        Some(session) if session.is_valid(Utc::now()) => {
            request.extensions_mut().insert(AuthUser(session.user_id));
            next.run(request).await
        }
        // Unknown and expired tokens are indistinguishable to the caller.
        _ => ApiError::Unauthorized.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parses_well_formed_headers() {
        assert_eq!(bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(bearer_token("Bearer abc123  "), Some("abc123"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic abc123"), None);
        assert_eq!(bearer_token("bearer abc123"), None);
        assert_eq!(bearer_token("abc123"), None);
    }

    #[test]
    fn bearer_token_rejects_empty_credentials() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
    }
}
