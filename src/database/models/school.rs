use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A persisted row of the `schools` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: i64,
    pub email_id: String,
    /// Bare filename (local store) or `https://` URL (remote store)
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Column values for an INSERT; `id` and `created_at` are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchool {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: i64,
    pub email_id: String,
    pub image: Option<String>,
}
