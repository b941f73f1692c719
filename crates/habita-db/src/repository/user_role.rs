//! SurrealDB implementation of [`UserRoleRepository`].

use chrono::{DateTime, Utc};
use habita_core::error::HabitaResult;
use habita_core::models::user_role::{CreateUserRole, UserRole};
use habita_core::repository::UserRoleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRoleRowWithId {
    record_id: String,
    user_id: String,
    role_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRoleRowWithId {
    fn try_into_user_role(self) -> Result<UserRole, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
        let role_id = Uuid::parse_str(&self.role_id)
            .map_err(|e| DbError::Corrupt(format!("invalid role UUID: {e}")))?;
        Ok(UserRole {
            id,
            user_id,
            role_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct SurrealUserRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealUserRoleRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealUserRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRoleRepository for SurrealUserRoleRepository<C> {
    async fn create(&self, input: CreateUserRole) -> HabitaResult<UserRole> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user_role', $id) SET \
                 user_id = $user_id, \
                 role_id = $role_id \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("role_id", input.role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UserRoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user_role".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user_role()?)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> HabitaResult<Vec<UserRole>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user_role \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRoleRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_user_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> HabitaResult<()> {
        self.db
            .query("DELETE FROM user_role WHERE user_id = $user_id")
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
