//! Organization profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile for organization signups. One-to-one with `User`; mutually
/// exclusive with `PersonProfile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub org_name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrgProfile {
    pub user_id: Uuid,
    pub org_name: String,
    pub description: Option<String>,
}
