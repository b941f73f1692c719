//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sign-in record. One row is created per successful login; there is
/// no upsert, session limit, or revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub last_session: DateTime<Utc>,
    pub app_version: String,
    pub platform: String,
    pub ip: String,
    /// Opaque geo blob forwarded by the client, stored as-is.
    pub geo: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    pub user_id: Uuid,
    pub app_version: String,
    pub platform: String,
    pub ip: String,
    pub geo: serde_json::Value,
}
