//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use habita_core::error::HabitaResult;
use habita_core::models::user::{CreateUser, UpdateUser, User, UserStatus};
use habita_core::models::user_type::UserTypeId;
use habita_core::repository::{
    PaginatedResult, Pagination, UpdateOutcome, UserRepository,
};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    email: String,
    status: String,
    user_type_id: String,
    country_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    email: String,
    status: String,
    user_type_id: String,
    country_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_status(s: &str) -> Result<UserStatus, DbError> {
    match s {
        "Unconfirmed" => Ok(UserStatus::Unconfirmed),
        "Confirmed" => Ok(UserStatus::Confirmed),
        "Suspended" => Ok(UserStatus::Suspended),
        other => Err(DbError::Corrupt(format!("unknown user status: {other}"))),
    }
}

pub(crate) fn status_to_string(s: &UserStatus) -> &'static str {
    match s {
        UserStatus::Unconfirmed => "Unconfirmed",
        UserStatus::Confirmed => "Confirmed",
        UserStatus::Suspended => "Suspended",
    }
}

fn parse_user_type(s: &str) -> Result<UserTypeId, DbError> {
    UserTypeId::parse(s).ok_or_else(|| DbError::Corrupt(format!("unknown user type: {s}")))
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            email: self.email,
            status: parse_status(&self.status)?,
            user_type_id: parse_user_type(&self.user_type_id)?,
            country_id: self.country_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            email: self.email,
            status: parse_status(&self.status)?,
            user_type_id: parse_user_type(&self.user_type_id)?,
            country_id: self.country_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Strip `Some("")` down to `None` so a partial update cannot null a
/// field by sending an empty string.
fn non_blank(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

/// SurrealDB implementation of the User repository.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> HabitaResult<User> {
        let id = input.id;
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 email = $email, \
                 status = $status, \
                 user_type_id = $user_type_id, \
                 country_id = $country_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("status", "Unconfirmed".to_string()))
            .bind(("user_type_id", input.user_type_id.as_str().to_string()))
            .bind(("country_id", input.country_id))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> HabitaResult<Option<User>> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_user(id)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> HabitaResult<Option<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_user()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> HabitaResult<UpdateOutcome> {
        let id_str = id.to_string();

        let email = non_blank(input.email);
        let country_id = non_blank(input.country_id);

        let mut sets = Vec::new();
        if email.is_some() {
            sets.push("email = $email");
        }
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.user_type_id.is_some() {
            sets.push("user_type_id = $user_type_id");
        }
        if country_id.is_some() {
            sets.push("country_id = $country_id");
        }

        // Nothing left after stripping: report without writing.
        if sets.is_empty() {
            return Ok(UpdateOutcome { id, updated: false });
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str));

        if let Some(email) = email {
            builder = builder.bind(("email", email));
        }
        if let Some(ref status) = input.status {
            builder = builder.bind(("status", status_to_string(status).to_string()));
        }
        if let Some(user_type_id) = input.user_type_id {
            builder = builder.bind(("user_type_id", user_type_id.as_str().to_string()));
        }
        if let Some(country_id) = country_id {
            builder = builder.bind(("country_id", country_id));
        }

        let result = builder.await.map_err(DbError::from)?;
        result.check().map_err(DbError::from)?;

        Ok(UpdateOutcome { id, updated: true })
    }

    async fn delete(&self, id: Uuid) -> HabitaResult<()> {
        let id_str = id.to_string();

        self.db
            .query("DELETE type::record('user', $id)")
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> HabitaResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
