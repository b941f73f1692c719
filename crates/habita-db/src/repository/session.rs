//! SurrealDB implementation of [`SessionRepository`].
//!
//! Sessions are append-only: one row per successful sign-in, no upsert
//! and no revocation.

use chrono::{DateTime, Utc};
use habita_core::error::HabitaResult;
use habita_core::models::session::{CreateSession, Session};
use habita_core::repository::SessionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SessionRowWithId {
    record_id: String,
    user_id: String,
    last_session: DateTime<Utc>,
    app_version: String,
    platform: String,
    ip: String,
    geo: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRowWithId {
    fn try_into_session(self) -> Result<Session, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
        Ok(Session {
            id,
            user_id,
            last_session: self.last_session,
            app_version: self.app_version,
            platform: self.platform,
            ip: self.ip,
            geo: self.geo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealSessionRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn create(&self, input: CreateSession) -> HabitaResult<Session> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('session', $id) SET \
                 user_id = $user_id, \
                 last_session = time::now(), \
                 app_version = $app_version, \
                 platform = $platform, \
                 ip = $ip, \
                 geo = $geo \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("app_version", input.app_version))
            .bind(("platform", input.platform))
            .bind(("ip", input.ip))
            .bind(("geo", input.geo))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "session".into(),
            id: id_str,
        })?;

        Ok(row.try_into_session()?)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> HabitaResult<Vec<Session>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM session \
                 WHERE user_id = $user_id \
                 ORDER BY created_at ASC",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_session())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
