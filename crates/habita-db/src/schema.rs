//! Schema definitions, migration runner, and reference-data seeding.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.
//!
//! Every secondary lookup the repositories expose is backed by an
//! index defined here: user email, `user_id` on the five child tables,
//! role code, join code, and the (document type, document number) pair.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['Unconfirmed', 'Confirmed', 'Suspended'];
DEFINE FIELD user_type_id ON TABLE user TYPE string \
    ASSERT $value IN ['PROPERTY_OWNER', 'PROSPECT', \
    'INDEPENDENT_AGENT', 'REAL_ESTATE'];
DEFINE FIELD country_id ON TABLE user TYPE string;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- User types (reference data, record id is the wire code)
-- =======================================================================
DEFINE TABLE user_type SCHEMAFULL;
DEFINE FIELD description ON TABLE user_type TYPE string;

-- =======================================================================
-- Person profiles
-- =======================================================================
DEFINE TABLE person_profile SCHEMAFULL;
DEFINE FIELD user_id ON TABLE person_profile TYPE string;
DEFINE FIELD first_name ON TABLE person_profile TYPE string;
DEFINE FIELD last_name ON TABLE person_profile TYPE string;
DEFINE FIELD birth_date ON TABLE person_profile TYPE option<string>;
DEFINE FIELD has_org_membership ON TABLE person_profile TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE person_profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE person_profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_person_profile_user ON TABLE person_profile \
    COLUMNS user_id;

-- =======================================================================
-- Org profiles
-- =======================================================================
DEFINE TABLE org_profile SCHEMAFULL;
DEFINE FIELD user_id ON TABLE org_profile TYPE string;
DEFINE FIELD org_name ON TABLE org_profile TYPE string;
DEFINE FIELD description ON TABLE org_profile TYPE option<string>;
DEFINE FIELD created_at ON TABLE org_profile TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE org_profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_org_profile_user ON TABLE org_profile COLUMNS user_id;

-- =======================================================================
-- Document types (reference data, record id is the document code)
-- =======================================================================
DEFINE TABLE document_type SCHEMAFULL;
DEFINE FIELD attributes ON TABLE document_type TYPE array;
DEFINE FIELD attributes.* ON TABLE document_type TYPE string;
DEFINE FIELD country_id ON TABLE document_type TYPE string;

-- =======================================================================
-- Documents
-- =======================================================================
DEFINE TABLE document SCHEMAFULL;
DEFINE FIELD user_id ON TABLE document TYPE string;
DEFINE FIELD document_type_id ON TABLE document TYPE string;
DEFINE FIELD details ON TABLE document TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE document TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_document_user ON TABLE document COLUMNS user_id;
DEFINE INDEX idx_document_number ON TABLE document \
    COLUMNS document_type_id, details.documentNumber UNIQUE;

-- =======================================================================
-- Roles (reference data)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD code ON TABLE role TYPE string;
DEFINE FIELD scope ON TABLE role TYPE string;
DEFINE FIELD permissions ON TABLE role TYPE array;
DEFINE FIELD permissions.* ON TABLE role TYPE string;
DEFINE FIELD status ON TABLE role TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_code ON TABLE role COLUMNS code UNIQUE;

-- =======================================================================
-- User roles
-- =======================================================================
DEFINE TABLE user_role SCHEMAFULL;
DEFINE FIELD user_id ON TABLE user_role TYPE string;
DEFINE FIELD role_id ON TABLE user_role TYPE string;
DEFINE FIELD created_at ON TABLE user_role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user_role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_role_user ON TABLE user_role COLUMNS user_id;

-- =======================================================================
-- Sessions
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD last_session ON TABLE session TYPE datetime;
DEFINE FIELD app_version ON TABLE session TYPE string;
DEFINE FIELD platform ON TABLE session TYPE string;
DEFINE FIELD ip ON TABLE session TYPE string;
DEFINE FIELD geo ON TABLE session TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_user ON TABLE session COLUMNS user_id;

-- =======================================================================
-- Agency join codes
-- =======================================================================
DEFINE TABLE agency_join_code SCHEMAFULL;
DEFINE FIELD org_profile_id ON TABLE agency_join_code TYPE string;
DEFINE FIELD join_code ON TABLE agency_join_code TYPE string;
DEFINE FIELD kind ON TABLE agency_join_code TYPE string \
    ASSERT $value IN ['OneTime', 'MultiUse'];
DEFINE FIELD max_uses ON TABLE agency_join_code TYPE int DEFAULT 3;
DEFINE FIELD expires_at ON TABLE agency_join_code TYPE datetime;
DEFINE FIELD created_by ON TABLE agency_join_code TYPE string;
DEFINE FIELD created_at ON TABLE agency_join_code TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_join_code ON TABLE agency_join_code \
    COLUMNS join_code UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum. The
/// version gate is what makes re-running safe; the versioned DDL
/// itself only runs once.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(version = migration.version, "Migration applied successfully");
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Reference data
// -----------------------------------------------------------------------

const USER_TYPES: &[(&str, &str)] = &[
    ("PROPERTY_OWNER", "Property owner"),
    ("PROSPECT", "Prospect looking for a property"),
    ("INDEPENDENT_AGENT", "Independent real-estate agent"),
    ("REAL_ESTATE", "Real-estate organization"),
];

const DOCUMENT_TYPES: &[(&str, &[&str], &str)] = &[
    ("CC", &["documentNumber"], "CO"),
    ("CE", &["documentNumber"], "CO"),
    ("NIT", &["documentNumber", "dv"], "CO"),
    ("PASSPORT", &["documentNumber"], "CO"),
];

const ROLES: &[(&str, &str, &[&str])] = &[
    (
        "ROLE_PROPERTY_OWNER",
        "app",
        &["property:read", "property:write", "visit:manage"],
    ),
    ("ROLE_PROSPECT", "app", &["property:read", "visit:request"]),
    (
        "ROLE_INDEPENDENT_AGENT",
        "app",
        &["property:read", "property:write", "visit:manage", "quote:manage"],
    ),
    (
        "ROLE_REAL_ESTATE",
        "app",
        &[
            "property:read",
            "property:write",
            "visit:manage",
            "quote:manage",
            "agency:manage",
        ],
    ),
];

#[derive(Debug, SurrealValue)]
struct ExistsRow {
    #[allow(dead_code)]
    record_id: String,
}

/// Seed the read-only reference tables (user types, document types,
/// roles). Idempotent: rows already present are left untouched, so the
/// seed is safe to run on every startup.
pub async fn seed_reference_data<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    for (id, description) in USER_TYPES {
        let mut result = db
            .query("SELECT meta::id(id) AS record_id FROM type::record('user_type', $id)")
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<ExistsRow> = result.take(0)?;
        if rows.is_empty() {
            db.query("CREATE type::record('user_type', $id) SET description = $description")
                .bind(("id", id.to_string()))
                .bind(("description", description.to_string()))
                .await?
                .check()
                .map_err(|e| DbError::Migration(e.to_string()))?;
        }
    }

    for (id, attributes, country_id) in DOCUMENT_TYPES {
        let mut result = db
            .query("SELECT meta::id(id) AS record_id FROM type::record('document_type', $id)")
            .bind(("id", id.to_string()))
            .await?;
        let rows: Vec<ExistsRow> = result.take(0)?;
        if rows.is_empty() {
            let attrs: Vec<String> = attributes.iter().map(|a| a.to_string()).collect();
            db.query(
                "CREATE type::record('document_type', $id) SET \
                 attributes = $attributes, country_id = $country_id",
            )
            .bind(("id", id.to_string()))
            .bind(("attributes", attrs))
            .bind(("country_id", country_id.to_string()))
            .await?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;
        }
    }

    for (code, scope, permissions) in ROLES {
        let mut result = db
            .query("SELECT meta::id(id) AS record_id FROM role WHERE code = $code")
            .bind(("code", code.to_string()))
            .await?;
        let rows: Vec<ExistsRow> = result.take(0)?;
        if rows.is_empty() {
            let id = uuid::Uuid::new_v4().to_string();
            let perms: Vec<String> = permissions.iter().map(|p| p.to_string()).collect();
            db.query(
                "CREATE type::record('role', $id) SET \
                 code = $code, scope = $scope, permissions = $permissions, \
                 status = 'Active'",
            )
            .bind(("id", id))
            .bind(("code", code.to_string()))
            .bind(("scope", scope.to_string()))
            .bind(("permissions", perms))
            .await?
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;
        }
    }

    info!("Reference data seeded");
    Ok(())
}
