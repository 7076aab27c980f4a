use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-owned research topic. `resultat` stays null until a generation
/// completes. Serialized with camelCase keys to match the public API.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Veille {
    pub id: i64,
    pub user_id: String,
    pub titre: String,
    pub sujet: String,
    pub contexte: Option<String>,
    pub resultat: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
