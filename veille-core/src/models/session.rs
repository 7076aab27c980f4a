use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authentication session keyed by its opaque bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid strictly before its expiry instant. A session
    /// expiring exactly at `now` is already expired.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}
