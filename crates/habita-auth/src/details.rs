//! Schema-driven projection of document details.
//!
//! A `DocumentType` declares the ordered list of field names a document
//! of that type carries. Only declared attributes with an explicit
//! request-field mapping are copied; declared attributes this code does
//! not know how to source are logged and skipped rather than trusted
//! blindly from the input bag.

use habita_core::models::document_type::DocumentType;
use serde_json::{Map, Value};
use tracing::warn;

use crate::signup::SignUpDocument;

pub fn project_details(document_type: &DocumentType, document: &SignUpDocument) -> Value {
    let mut details = Map::new();
    for attribute in &document_type.attributes {
        match attribute.as_str() {
            "documentNumber" => {
                details.insert(
                    "documentNumber".into(),
                    Value::String(document.document_number.clone()),
                );
            }
            "dv" => {
                if let Some(dv) = &document.dv {
                    details.insert("dv".into(), Value::String(dv.clone()));
                }
            }
            other => {
                warn!(
                    document_type = %document_type.id,
                    attribute = other,
                    "declared document attribute has no mapping, skipping"
                );
            }
        }
    }
    Value::Object(details)
}
