//! SurrealDB implementation of [`AgencyJoinCodeRepository`].

use chrono::{DateTime, Utc};
use habita_core::error::HabitaResult;
use habita_core::models::agency_join_code::{
    AgencyJoinCode, CreateAgencyJoinCode, JoinCodeKind,
};
use habita_core::repository::AgencyJoinCodeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct JoinCodeRowWithId {
    record_id: String,
    org_profile_id: String,
    join_code: String,
    kind: String,
    max_uses: u32,
    expires_at: DateTime<Utc>,
    created_by: String,
    created_at: DateTime<Utc>,
}

fn parse_kind(s: &str) -> Result<JoinCodeKind, DbError> {
    match s {
        "OneTime" => Ok(JoinCodeKind::OneTime),
        "MultiUse" => Ok(JoinCodeKind::MultiUse),
        other => Err(DbError::Corrupt(format!("unknown join code kind: {other}"))),
    }
}

fn kind_to_string(kind: &JoinCodeKind) -> &'static str {
    match kind {
        JoinCodeKind::OneTime => "OneTime",
        JoinCodeKind::MultiUse => "MultiUse",
    }
}

impl JoinCodeRowWithId {
    fn try_into_join_code(self) -> Result<AgencyJoinCode, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid UUID: {e}")))?;
        let org_profile_id = Uuid::parse_str(&self.org_profile_id)
            .map_err(|e| DbError::Corrupt(format!("invalid org profile UUID: {e}")))?;
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Corrupt(format!("invalid creator UUID: {e}")))?;
        Ok(AgencyJoinCode {
            id,
            org_profile_id,
            join_code: self.join_code,
            kind: parse_kind(&self.kind)?,
            max_uses: self.max_uses,
            expires_at: self.expires_at,
            created_by,
            created_at: self.created_at,
        })
    }
}

pub struct SurrealAgencyJoinCodeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealAgencyJoinCodeRepository<C> {
    fn clone(&self) -> Self {
        Self { db: self.db.clone() }
    }
}

impl<C: Connection> SurrealAgencyJoinCodeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AgencyJoinCodeRepository for SurrealAgencyJoinCodeRepository<C> {
    async fn create(&self, input: CreateAgencyJoinCode) -> HabitaResult<AgencyJoinCode> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('agency_join_code', $id) SET \
                 org_profile_id = $org_profile_id, \
                 join_code = $join_code, \
                 kind = $kind, \
                 max_uses = $max_uses, \
                 expires_at = $expires_at, \
                 created_by = $created_by \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("org_profile_id", input.org_profile_id.to_string()))
            .bind(("join_code", input.join_code))
            .bind(("kind", kind_to_string(&input.kind).to_string()))
            .bind(("max_uses", input.max_uses))
            .bind(("expires_at", input.expires_at))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<JoinCodeRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "agency_join_code".into(),
            id: id_str,
        })?;

        Ok(row.try_into_join_code()?)
    }

    async fn find_by_join_code(&self, join_code: &str) -> HabitaResult<Option<AgencyJoinCode>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM agency_join_code \
                 WHERE join_code = $join_code",
            )
            .bind(("join_code", join_code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<JoinCodeRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_join_code()?)),
            None => Ok(None),
        }
    }
}
