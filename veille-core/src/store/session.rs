use crate::models::Session;
use sqlx::PgPool;

/// Look a bearer token up in the session table. Expiry is not checked here;
/// callers decide with [`Session::is_valid`] against their own clock.
pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Session>, sqlx::Error> {
    sqlx::query_as::<_, Session>(
        r#"
        SELECT token, user_id, expires_at
        FROM session
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await
}
