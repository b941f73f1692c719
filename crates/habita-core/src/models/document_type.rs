//! Document type reference data.

use serde::{Deserialize, Serialize};

/// Declares which fields a document of this type carries. The ordered
/// `attributes` list drives dynamic projection of `Document.details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentType {
    /// National document code, e.g. `CC`, `NIT`, `PASSPORT`.
    pub id: String,
    pub attributes: Vec<String>,
    pub country_id: String,
}
