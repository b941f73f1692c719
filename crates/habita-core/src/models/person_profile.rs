//! Person profile domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile for individual (non-organization) signups. One-to-one with
/// `User`; mutually exclusive with `OrgProfile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// ISO-8601 date, as sent by the client. Optional.
    pub birth_date: Option<String>,
    pub has_org_membership: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonProfile {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: Option<String>,
}
