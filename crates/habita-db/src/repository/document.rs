//! SurrealDB implementation of [`DocumentRepository`].
//!
//! The (`document_type_id`, `details.documentNumber`) pair is covered
//! by a unique index (see `schema.rs`), so uniqueness violations on
//! concurrent inserts surface as database errors rather than silent
//! duplicates.

use chrono::{DateTime, Utc};
use habita_core::error::HabitaResult;
use habita_core::models::document::{CreateDocument, Document};
use habita_core::repository::DocumentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DocumentRowWithId {
    record_id: String,
    user_id: String,
    document_type_id: String,
    details: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DocumentRowWithId {
    fn try_into_document(self) -> Result<Document, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
        Ok(Document {
            id,
            user_id,
            document_type_id: self.document_type_id,
            details: self.details,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct SurrealDocumentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealDocumentRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealDocumentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DocumentRepository for SurrealDocumentRepository<C> {
    async fn create(&self, input: CreateDocument) -> HabitaResult<Document> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('document', $id) SET \
                 user_id = $user_id, \
                 document_type_id = $document_type_id, \
                 details = $details \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("document_type_id", input.document_type_id))
            .bind(("details", input.details))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "document".into(),
            id: id_str,
        })?;

        Ok(row.try_into_document()?)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> HabitaResult<Vec<Document>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM document \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_document())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn find_by_document_number(
        &self,
        document_type_id: &str,
        document_number: &str,
    ) -> HabitaResult<Option<Document>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM document \
                 WHERE document_type_id = $document_type_id \
                 AND details.documentNumber = $document_number",
            )
            .bind(("document_type_id", document_type_id.to_string()))
            .bind(("document_number", document_number.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DocumentRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_document()?)),
            None => Ok(None),
        }
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> HabitaResult<()> {
        self.db
            .query("DELETE FROM document WHERE user_id = $user_id")
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
