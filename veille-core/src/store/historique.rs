//! SQL access for the append-only historique_veille table. Rows are never
//! updated or deleted by this service.

use crate::models::HistoriqueEntry;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub async fn insert(
    pool: &PgPool,
    veille_id: i64,
    user_id: &str,
    contenu: &str,
    now: DateTime<Utc>,
) -> Result<HistoriqueEntry, sqlx::Error> {
    sqlx::query_as::<_, HistoriqueEntry>(
        r#"
        INSERT INTO historique_veille (veille_id, user_id, contenu, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, veille_id, user_id, contenu, created_at
        "#,
    )
    .bind(veille_id)
    .bind(user_id)
    .bind(contenu)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// List the caller's entries, newest first, optionally restricted to one
/// veille. The filter still scopes by user, so entries of a veille that was
/// never the caller's stay invisible.
pub async fn list(
    pool: &PgPool,
    user_id: &str,
    veille_id: Option<i64>,
    limit: i64,
    offset: i64,
) -> Result<Vec<HistoriqueEntry>, sqlx::Error> {
    match veille_id {
        Some(veille_id) => {
            sqlx::query_as::<_, HistoriqueEntry>(
                r#"
                SELECT id, veille_id, user_id, contenu, created_at
                FROM historique_veille
                WHERE user_id = $1 AND veille_id = $2
                ORDER BY created_at DESC, id DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(user_id)
            .bind(veille_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, HistoriqueEntry>(
                r#"
                SELECT id, veille_id, user_id, contenu, created_at
                FROM historique_veille
                WHERE user_id = $1
                ORDER BY created_at DESC, id DESC
                LIMIT $2 OFFSET $3
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
    }
}
