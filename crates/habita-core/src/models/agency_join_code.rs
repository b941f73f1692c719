//! Agency join code domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JoinCodeKind {
    OneTime,
    MultiUse,
}

/// Short code letting additional members attach themselves to an
/// organization profile. Minted once, on organization confirmation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgencyJoinCode {
    pub id: Uuid,
    pub org_profile_id: Uuid,
    /// 6 alphanumeric characters, unique.
    pub join_code: String,
    pub kind: JoinCodeKind,
    pub max_uses: u32,
    pub expires_at: DateTime<Utc>,
    /// User that triggered the mint.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgencyJoinCode {
    pub org_profile_id: Uuid,
    pub join_code: String,
    pub kind: JoinCodeKind,
    pub max_uses: u32,
    pub expires_at: DateTime<Utc>,
    pub created_by: Uuid,
}
