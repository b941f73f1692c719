//! Database-specific error types and conversions.

use habita_core::error::HabitaError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored row failed to decode into its domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for HabitaError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => HabitaError::NotFound { entity, id },
            other => HabitaError::Database(other.to_string()),
        }
    }
}
