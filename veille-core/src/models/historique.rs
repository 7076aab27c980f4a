use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of a generated report. `veille_id` deliberately has
/// no foreign key: deleting a veille keeps its history readable.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HistoriqueEntry {
    pub id: i64,
    pub veille_id: i64,
    pub user_id: String,
    pub contenu: String,
    pub created_at: DateTime<Utc>,
}
