//! Identity document domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An identity document attached to a user.
///
/// `details` is an open key-value object whose keys must match the
/// `attributes` declared by the referenced `DocumentType`. The pair
/// (`document_type_id`, `details.documentNumber`) is unique across all
/// documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type_id: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    pub user_id: Uuid,
    pub document_type_id: String,
    pub details: serde_json::Value,
}
