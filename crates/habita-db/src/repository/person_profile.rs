//! SurrealDB implementation of [`PersonProfileRepository`].

use chrono::{DateTime, Utc};
use habita_core::error::HabitaResult;
use habita_core::models::person_profile::{CreatePersonProfile, PersonProfile};
use habita_core::repository::PersonProfileRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PersonProfileRowWithId {
    record_id: String,
    user_id: String,
    first_name: String,
    last_name: String,
    birth_date: Option<String>,
    has_org_membership: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonProfileRowWithId {
    fn try_into_profile(self) -> Result<PersonProfile, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
        Ok(PersonProfile {
            id,
            user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            birth_date: self.birth_date,
            has_org_membership: self.has_org_membership,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct SurrealPersonProfileRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealPersonProfileRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealPersonProfileRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PersonProfileRepository for SurrealPersonProfileRepository<C> {
    async fn create(&self, input: CreatePersonProfile) -> HabitaResult<PersonProfile> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('person_profile', $id) SET \
                 user_id = $user_id, \
                 first_name = $first_name, \
                 last_name = $last_name, \
                 birth_date = $birth_date, \
                 has_org_membership = false \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("birth_date", input.birth_date))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<PersonProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person_profile".into(),
            id: id_str,
        })?;

        Ok(row.try_into_profile()?)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> HabitaResult<Option<PersonProfile>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM person_profile \
                 WHERE user_id = $user_id",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_profile()?)),
            None => Ok(None),
        }
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> HabitaResult<()> {
        self.db
            .query("DELETE FROM person_profile WHERE user_id = $user_id")
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
