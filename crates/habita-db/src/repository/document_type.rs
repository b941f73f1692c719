//! SurrealDB implementation of [`DocumentTypeRepository`].

use habita_core::error::HabitaResult;
use habita_core::models::document_type::DocumentType;
use habita_core::repository::DocumentTypeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DocumentTypeRowWithId {
    record_id: String,
    attributes: Vec<String>,
    country_id: String,
}

impl DocumentTypeRowWithId {
    fn into_document_type(self) -> DocumentType {
        DocumentType {
            id: self.record_id,
            attributes: self.attributes,
            country_id: self.country_id,
        }
    }
}

pub struct SurrealDocumentTypeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealDocumentTypeRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealDocumentTypeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DocumentTypeRepository for SurrealDocumentTypeRepository<C> {
    async fn get_by_id(&self, id: &str) -> HabitaResult<Option<DocumentType>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('document_type', $id)",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentTypeRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().next().map(|row| row.into_document_type()))
    }

    async fn list_all(&self) -> HabitaResult<Vec<DocumentType>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM document_type")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentTypeRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows.into_iter().map(|row| row.into_document_type()).collect())
    }
}
