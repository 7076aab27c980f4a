use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Idempotent schema bootstrap, run once at server startup.
///
/// The `session` table is written by the external auth system; this service
/// only reads it, but creates it so a fresh database is usable in dev.
/// `historique_veille.veille_id` carries no foreign key: ownership and parent
/// existence are checked per operation, and deleting a veille leaves its
/// historique rows in place.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS session (
            token      TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS veille (
            id         BIGSERIAL PRIMARY KEY,
            user_id    TEXT NOT NULL,
            titre      TEXT NOT NULL,
            sujet      TEXT NOT NULL,
            contexte   TEXT,
            resultat   TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS historique_veille (
            id         BIGSERIAL PRIMARY KEY,
            veille_id  BIGINT NOT NULL,
            user_id    TEXT NOT NULL,
            contenu    TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_veille_user_created
            ON veille (user_id, created_at DESC)
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_historique_user_created
            ON historique_veille (user_id, created_at DESC)
        "#,
        r#"
        CREATE INDEX IF NOT EXISTS idx_historique_veille
            ON historique_veille (veille_id)
        "#,
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}
