//! Repository integration tests against an in-memory SurrealDB.

use habita_core::models::agency_join_code::{CreateAgencyJoinCode, JoinCodeKind};
use habita_core::models::document::CreateDocument;
use habita_core::models::org_profile::CreateOrgProfile;
use habita_core::models::person_profile::CreatePersonProfile;
use habita_core::models::session::CreateSession;
use habita_core::models::user::{CreateUser, UpdateUser, UserStatus};
use habita_core::models::user_role::CreateUserRole;
use habita_core::models::user_type::UserTypeId;
use habita_core::repository::{
    AgencyJoinCodeRepository, DocumentRepository, DocumentTypeRepository, OrgProfileRepository,
    Pagination, PersonProfileRepository, RoleRepository, SessionRepository, UserRepository,
    UserRoleRepository, UserTypeRepository,
};
use habita_db::repository::{
    SurrealAgencyJoinCodeRepository, SurrealDocumentRepository, SurrealDocumentTypeRepository,
    SurrealOrgProfileRepository, SurrealPersonProfileRepository, SurrealRoleRepository,
    SurrealSessionRepository, SurrealUserRepository, SurrealUserRoleRepository,
    SurrealUserTypeRepository,
};
use habita_db::{run_migrations, seed_reference_data};
use chrono::{Duration, Utc};
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn test_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    run_migrations(&db).await.unwrap();
    seed_reference_data(&db).await.unwrap();
    db
}

fn new_user(email: &str) -> CreateUser {
    CreateUser {
        id: Uuid::new_v4(),
        email: email.to_string(),
        user_type_id: UserTypeId::Prospect,
        country_id: "CO".to_string(),
    }
}

#[tokio::test]
async fn user_create_and_lookups() {
    let db = test_db().await;
    let users = SurrealUserRepository::new(db);

    let input = new_user("ana@example.com");
    let id = input.id;
    let created = users.create(input).await.unwrap();
    assert_eq!(created.id, id);
    assert_eq!(created.status, UserStatus::Unconfirmed);
    assert_eq!(created.user_type_id, UserTypeId::Prospect);
    assert_eq!(created.country_id, "CO");

    let by_id = users.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "ana@example.com");

    let by_email = users.find_by_email("ana@example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, id);

    assert!(users.get_by_id(Uuid::new_v4()).await.unwrap().is_none());
    assert!(users.find_by_email("nobody@example.com").await.unwrap().is_none());
}

#[tokio::test]
async fn user_email_is_unique() {
    let db = test_db().await;
    let users = SurrealUserRepository::new(db);

    users.create(new_user("dup@example.com")).await.unwrap();
    assert!(users.create(new_user("dup@example.com")).await.is_err());
}

#[tokio::test]
async fn user_update_strips_blank_fields() {
    let db = test_db().await;
    let users = SurrealUserRepository::new(db);

    let input = new_user("update@example.com");
    let id = input.id;
    users.create(input).await.unwrap();

    // Only a blank email: nothing left to apply, no write issued.
    let outcome = users
        .update(
            id,
            UpdateUser {
                email: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!outcome.updated);
    let unchanged = users.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(unchanged.email, "update@example.com");

    let outcome = users
        .update(
            id,
            UpdateUser {
                status: Some(UserStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(outcome.updated);
    let updated = users.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(updated.status, UserStatus::Confirmed);
    assert_eq!(updated.email, "update@example.com");
}

#[tokio::test]
async fn user_delete_and_list_pagination() {
    let db = test_db().await;
    let users = SurrealUserRepository::new(db);

    let mut ids = Vec::new();
    for i in 0..3 {
        let input = new_user(&format!("user{i}@example.com"));
        ids.push(input.id);
        users.create(input).await.unwrap();
    }

    let page = users
        .list(Pagination { offset: 0, limit: 2 })
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);

    let rest = users
        .list(Pagination { offset: 2, limit: 2 })
        .await
        .unwrap();
    assert_eq!(rest.items.len(), 1);

    users.delete(ids[0]).await.unwrap();
    assert!(users.get_by_id(ids[0]).await.unwrap().is_none());
    // Deleting again is not an error.
    users.delete(ids[0]).await.unwrap();
}

#[tokio::test]
async fn person_profile_roundtrip() {
    let db = test_db().await;
    let profiles = SurrealPersonProfileRepository::new(db);
    let user_id = Uuid::new_v4();

    let created = profiles
        .create(CreatePersonProfile {
            user_id,
            first_name: "Ana".to_string(),
            last_name: "Gomez".to_string(),
            birth_date: Some("1990-05-01".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(created.user_id, user_id);
    assert!(!created.has_org_membership);

    let found = profiles.find_by_user_id(user_id).await.unwrap().unwrap();
    assert_eq!(found.first_name, "Ana");
    assert_eq!(found.birth_date.as_deref(), Some("1990-05-01"));

    profiles.delete_by_user_id(user_id).await.unwrap();
    assert!(profiles.find_by_user_id(user_id).await.unwrap().is_none());
    profiles.delete_by_user_id(user_id).await.unwrap();
}

#[tokio::test]
async fn org_profile_roundtrip() {
    let db = test_db().await;
    let profiles = SurrealOrgProfileRepository::new(db);
    let user_id = Uuid::new_v4();

    profiles
        .create(CreateOrgProfile {
            user_id,
            org_name: "Inmobiliaria Sol".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let found = profiles.find_by_user_id(user_id).await.unwrap().unwrap();
    assert_eq!(found.org_name, "Inmobiliaria Sol");
    assert!(found.description.is_none());

    profiles.delete_by_user_id(user_id).await.unwrap();
    assert!(profiles.find_by_user_id(user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn document_number_lookup_and_uniqueness() {
    let db = test_db().await;
    let documents = SurrealDocumentRepository::new(db);
    let user_id = Uuid::new_v4();

    documents
        .create(CreateDocument {
            user_id,
            document_type_id: "CC".to_string(),
            details: json!({"documentNumber": "10203040"}),
        })
        .await
        .unwrap();

    let found = documents
        .find_by_document_number("CC", "10203040")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.user_id, user_id);
    assert!(
        documents
            .find_by_document_number("CC", "99999999")
            .await
            .unwrap()
            .is_none()
    );

    // Same pair for another user violates the unique index.
    assert!(
        documents
            .create(CreateDocument {
                user_id: Uuid::new_v4(),
                document_type_id: "CC".to_string(),
                details: json!({"documentNumber": "10203040"}),
            })
            .await
            .is_err()
    );

    // Same number under a different type is a distinct document.
    documents
        .create(CreateDocument {
            user_id: Uuid::new_v4(),
            document_type_id: "PASSPORT".to_string(),
            details: json!({"documentNumber": "10203040"}),
        })
        .await
        .unwrap();

    documents.delete_by_user_id(user_id).await.unwrap();
    assert!(documents.find_by_user_id(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reference_data_is_seeded() {
    let db = test_db().await;

    let user_types = SurrealUserTypeRepository::new(db.clone());
    assert_eq!(user_types.list_all().await.unwrap().len(), 4);
    assert!(
        user_types
            .get_by_id(UserTypeId::RealEstate)
            .await
            .unwrap()
            .is_some()
    );

    let document_types = SurrealDocumentTypeRepository::new(db.clone());
    let cc = document_types.get_by_id("CC").await.unwrap().unwrap();
    assert_eq!(cc.country_id, "CO");
    assert!(cc.attributes.contains(&"documentNumber".to_string()));
    let nit = document_types.get_by_id("NIT").await.unwrap().unwrap();
    assert!(nit.attributes.contains(&"dv".to_string()));
    assert!(document_types.get_by_id("DNI").await.unwrap().is_none());

    let roles = SurrealRoleRepository::new(db.clone());
    assert_eq!(roles.list_all().await.unwrap().len(), 4);
    for code in [
        "ROLE_PROPERTY_OWNER",
        "ROLE_PROSPECT",
        "ROLE_INDEPENDENT_AGENT",
        "ROLE_REAL_ESTATE",
    ] {
        assert!(roles.find_by_code(code).await.unwrap().is_some(), "{code}");
    }

    // Re-seeding leaves the tables untouched.
    seed_reference_data(&db).await.unwrap();
    assert_eq!(user_types.list_all().await.unwrap().len(), 4);
    assert_eq!(roles.list_all().await.unwrap().len(), 4);
}

#[tokio::test]
async fn user_role_roundtrip() {
    let db = test_db().await;
    let roles = SurrealRoleRepository::new(db.clone());
    let user_roles = SurrealUserRoleRepository::new(db);
    let user_id = Uuid::new_v4();

    let role = roles.find_by_code("ROLE_PROSPECT").await.unwrap().unwrap();
    user_roles
        .create(CreateUserRole {
            user_id,
            role_id: role.id,
        })
        .await
        .unwrap();

    let assigned = user_roles.find_by_user_id(user_id).await.unwrap();
    assert_eq!(assigned.len(), 1);
    assert_eq!(assigned[0].role_id, role.id);

    user_roles.delete_by_user_id(user_id).await.unwrap();
    assert!(user_roles.find_by_user_id(user_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn session_rows_are_append_only() {
    let db = test_db().await;
    let sessions = SurrealSessionRepository::new(db);
    let user_id = Uuid::new_v4();

    for platform in ["ios", "android"] {
        sessions
            .create(CreateSession {
                user_id,
                app_version: "1.2.0".to_string(),
                platform: platform.to_string(),
                ip: "203.0.113.9".to_string(),
                geo: json!({"city": "Bogota"}),
            })
            .await
            .unwrap();
    }

    let rows = sessions.find_by_user_id(user_id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].app_version, "1.2.0");
    assert_eq!(rows[0].geo, json!({"city": "Bogota"}));
}

#[tokio::test]
async fn join_code_lookup_and_uniqueness() {
    let db = test_db().await;
    let join_codes = SurrealAgencyJoinCodeRepository::new(db);
    let org_profile_id = Uuid::new_v4();
    let created_by = Uuid::new_v4();

    let create = |code: &str| CreateAgencyJoinCode {
        org_profile_id,
        join_code: code.to_string(),
        kind: JoinCodeKind::MultiUse,
        max_uses: 3,
        expires_at: Utc::now() + Duration::days(730),
        created_by,
    };

    let created = join_codes.create(create("A1B2C3")).await.unwrap();
    assert_eq!(created.kind, JoinCodeKind::MultiUse);
    assert_eq!(created.max_uses, 3);

    let found = join_codes.find_by_join_code("A1B2C3").await.unwrap().unwrap();
    assert_eq!(found.org_profile_id, org_profile_id);
    assert!(join_codes.find_by_join_code("ZZZZZZ").await.unwrap().is_none());

    // Duplicate code violates the unique index.
    assert!(join_codes.create(create("A1B2C3")).await.is_err());
}
