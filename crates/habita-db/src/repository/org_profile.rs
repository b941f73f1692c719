//! SurrealDB implementation of [`OrgProfileRepository`].

use chrono::{DateTime, Utc};
use habita_core::error::HabitaResult;
use habita_core::models::org_profile::{CreateOrgProfile, OrgProfile};
use habita_core::repository::OrgProfileRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrgProfileRowWithId {
    record_id: String,
    user_id: String,
    org_name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrgProfileRowWithId {
    fn try_into_profile(self) -> Result<OrgProfile, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
        Ok(OrgProfile {
            id,
            user_id,
            org_name: self.org_name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct SurrealOrgProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealOrgProfileRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealOrgProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrgProfileRepository for SurrealOrgProfileRepository<C> {
    async fn create(&self, input: CreateOrgProfile) -> HabitaResult<OrgProfile> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('org_profile', $id) SET \
                 user_id = $user_id, \
                 org_name = $org_name, \
                 description = $description \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("org_name", input.org_name))
            .bind(("description", input.description))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<OrgProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "org_profile".into(),
            id: id_str,
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> HabitaResult<Option<OrgProfile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM org_profile \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrgProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_profile()?)),
            None => Ok(None),
        }
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> HabitaResult<()> {
        self.db
            .query("DELETE FROM org_profile WHERE user_id = $user_id")
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
