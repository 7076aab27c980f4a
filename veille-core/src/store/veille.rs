//! SQL access for the veille table.
//!
//! Every function is scoped to a caller where the operation mutates or lists;
//! `fetch` alone is unscoped so handlers can distinguish "not found" from
//! "someone else's" when building 404 vs 403 responses.

use crate::models::{HistoriqueEntry, Veille};
use crate::validate::{CreateVeille, Patch, UpdateVeille};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

pub async fn insert(
    pool: &PgPool,
    user_id: &str,
    create: &CreateVeille,
    now: DateTime<Utc>,
) -> Result<Veille, sqlx::Error> {
    sqlx::query_as::<_, Veille>(
        r#"
        INSERT INTO veille (user_id, titre, sujet, contexte, resultat, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $6)
        RETURNING id, user_id, titre, sujet, contexte, resultat, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&create.titre)
    .bind(&create.sujet)
    .bind(&create.contexte)
    .bind(&create.resultat)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub async fn fetch(pool: &PgPool, id: i64) -> Result<Option<Veille>, sqlx::Error> {
    sqlx::query_as::<_, Veille>(
        r#"
        SELECT id, user_id, titre, sujet, contexte, resultat, created_at, updated_at
        FROM veille
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// List the caller's veilles, newest first, optionally filtered by a
/// case-insensitive substring match on titre or sujet. LIKE wildcards in
/// the search term are escaped so they match literally.
pub async fn list(
    pool: &PgPool,
    user_id: &str,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Veille>, sqlx::Error> {
    let pattern = search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| format!("%{}%", escape_like(term)));

    match pattern {
        Some(pattern) => {
            sqlx::query_as::<_, Veille>(
                r#"
                SELECT id, user_id, titre, sujet, contexte, resultat, created_at, updated_at
                FROM veille
                WHERE user_id = $1
                  AND (titre ILIKE $2 ESCAPE '\' OR sujet ILIKE $2 ESCAPE '\')
                ORDER BY created_at DESC, id DESC
                LIMIT $3 OFFSET $4
                "#,
            )
            .bind(user_id)
            .bind(pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Veille>(
                r#"
                SELECT id, user_id, titre, sujet, contexte, resultat, created_at, updated_at
                FROM veille
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

/// Partial update. Each column is written only when its flag bind is true,
/// so absent fields keep their stored value and a null `contexte`/`resultat`
/// patch clears the column. `updated_at` is always refreshed, even for an
/// empty patch. Returns `None` when the row no longer exists for this caller.
pub async fn update(
    pool: &PgPool,
    id: i64,
    user_id: &str,
    patch: &UpdateVeille,
    now: DateTime<Utc>,
) -> Result<Option<Veille>, sqlx::Error> {
    let (set_contexte, contexte) = patch_binds(&patch.contexte);
    let (set_resultat, resultat) = patch_binds(&patch.resultat);

    sqlx::query_as::<_, Veille>(
        r#"
        UPDATE veille
        SET titre      = CASE WHEN $1 THEN $2 ELSE titre END,
            sujet      = CASE WHEN $3 THEN $4 ELSE sujet END,
            contexte   = CASE WHEN $5 THEN $6 ELSE contexte END,
            resultat   = CASE WHEN $7 THEN $8 ELSE resultat END,
            updated_at = $9
        WHERE id = $10 AND user_id = $11
        RETURNING id, user_id, titre, sujet, contexte, resultat, created_at, updated_at
        "#,
    )
    .bind(patch.titre.is_some())
    .bind(patch.titre.as_deref())
    .bind(patch.sujet.is_some())
    .bind(patch.sujet.as_deref())
    .bind(set_contexte)
    .bind(contexte)
    .bind(set_resultat)
    .bind(resultat)
    .bind(now)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

fn patch_binds(patch: &Patch<String>) -> (bool, Option<&str>) {
    match patch {
        Patch::Keep => (false, None),
        Patch::Clear => (true, None),
        Patch::Set(value) => (true, Some(value.as_str())),
    }
}

/// Hard delete, returning a snapshot of the removed row. Historique rows
/// pointing at it are left untouched.
pub async fn delete(pool: &PgPool, id: i64, user_id: &str) -> Result<Option<Veille>, sqlx::Error> {
    sqlx::query_as::<_, Veille>(
        r#"
        DELETE FROM veille
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, titre, sujet, contexte, resultat, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Persist a generated report: set `resultat` on the veille and append the
/// same content to the historique, in one transaction so a crash between
/// the two writes cannot leave them disagreeing. Returns `None` when the
/// veille disappeared after the caller's ownership check.
pub async fn record_generation(
    pool: &PgPool,
    id: i64,
    user_id: &str,
    contenu: &str,
    now: DateTime<Utc>,
) -> Result<Option<(Veille, HistoriqueEntry)>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, Veille>(
        r#"
        UPDATE veille
        SET resultat = $1, updated_at = $2
        WHERE id = $3
        RETURNING id, user_id, titre, sujet, contexte, resultat, created_at, updated_at
        "#,
    )
    .bind(contenu)
    .bind(now)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(veille) = updated else {
        return Ok(None);
    };

    let entry = sqlx::query_as::<_, HistoriqueEntry>(
        r#"
        INSERT INTO historique_veille (veille_id, user_id, contenu, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, veille_id, user_id, contenu, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(contenu)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some((veille, entry)))
}

fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }
}
