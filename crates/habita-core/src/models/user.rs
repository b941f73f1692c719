//! User domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user_type::UserTypeId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserStatus {
    Unconfirmed,
    Confirmed,
    Suspended,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique across users, case-sensitive as stored.
    pub email: String,
    pub status: UserStatus,
    pub user_type_id: UserTypeId,
    pub country_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Caller-chosen id. Shared with the identity provider as the
    /// principal's external id so both stores agree on identity.
    pub id: Uuid,
    pub email: String,
    pub user_type_id: UserTypeId,
    pub country_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub status: Option<UserStatus>,
    pub user_type_id: Option<UserTypeId>,
    pub country_id: Option<String>,
}
