//! SurrealDB implementation of [`UserTypeRepository`].

use habita_core::error::HabitaResult;
use habita_core::models::user_type::{UserType, UserTypeId};
use habita_core::repository::UserTypeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserTypeRowWithId {
    record_id: String,
    description: String,
}

impl UserTypeRowWithId {
    fn try_into_user_type(self) -> Result<UserType, DbError> {
        let id = UserTypeId::parse(&self.record_id)
            .ok_or_else(|| DbError::Corrupt(format!("unknown user type: {}", self.record_id)))?;
        Ok(UserType {
            id,
            description: self.description,
        })
    }
}

pub struct SurrealUserTypeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealUserTypeRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealUserTypeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserTypeRepository for SurrealUserTypeRepository<C> {
    async fn get_by_id(&self, id: UserTypeId) -> HabitaResult<Option<UserType>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user_type', $id)",
            )
            .bind(("id", id.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserTypeRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user_type()?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> HabitaResult<Vec<UserType>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user_type")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserTypeRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_user_type())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
