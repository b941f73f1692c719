//! Use-case integration tests: real repositories over an in-memory
//! SurrealDB, stubbed identity provider.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use habita_auth::confirm::{ConfirmSignUpInput, ConfirmSignUpService, MSG_CONFIRMED};
use habita_auth::signin::{MSG_NOT_CONFIRMED, RequestContext, SignInInput, SignInService};
use habita_auth::signup::{
    MSG_CODE_RESENT, MSG_REGISTERED, SignUpDocument, SignUpInput, SignUpService,
};
use habita_core::error::HabitaError;
use habita_core::identity::{IdentityError, IdentityProvider};
use habita_core::models::user::UserStatus;
use habita_core::models::user_type::UserTypeId;
use habita_core::repository::{
    DocumentRepository, OrgProfileRepository, PersonProfileRepository, SessionRepository,
    UserRepository, UserRoleRepository,
};
use habita_db::repository::{
    SurrealAgencyJoinCodeRepository, SurrealDocumentRepository, SurrealDocumentTypeRepository,
    SurrealOrgProfileRepository, SurrealPersonProfileRepository, SurrealRoleRepository,
    SurrealSessionRepository, SurrealUserRepository, SurrealUserRoleRepository,
    SurrealUserTypeRepository,
};
use habita_db::{run_migrations, seed_reference_data};
use habita_identity::StubIdentityProvider;
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use surrealdb_types::SurrealValue;

type Stub = Arc<StubIdentityProvider>;

type TestSignUp = SignUpService<
    SurrealUserTypeRepository<Db>,
    SurrealUserRepository<Db>,
    SurrealPersonProfileRepository<Db>,
    SurrealOrgProfileRepository<Db>,
    SurrealDocumentRepository<Db>,
    SurrealDocumentTypeRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealUserRoleRepository<Db>,
    Stub,
>;

type TestConfirm = ConfirmSignUpService<
    SurrealUserRepository<Db>,
    SurrealOrgProfileRepository<Db>,
    SurrealAgencyJoinCodeRepository<Db>,
    Stub,
>;

type TestSignIn =
    SignInService<SurrealUserRepository<Db>, SurrealSessionRepository<Db>, Stub>;

async fn test_db() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    run_migrations(&db).await.unwrap();
    seed_reference_data(&db).await.unwrap();
    db
}

fn signup_service(db: &Surreal<Db>, idp: Stub) -> TestSignUp {
    SignUpService::new(
        SurrealUserTypeRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealPersonProfileRepository::new(db.clone()),
        SurrealOrgProfileRepository::new(db.clone()),
        SurrealDocumentRepository::new(db.clone()),
        SurrealDocumentTypeRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        SurrealUserRoleRepository::new(db.clone()),
        idp,
    )
}

fn confirm_service(db: &Surreal<Db>, idp: Stub) -> TestConfirm {
    ConfirmSignUpService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealOrgProfileRepository::new(db.clone()),
        SurrealAgencyJoinCodeRepository::new(db.clone()),
        idp,
    )
}

fn signin_service(db: &Surreal<Db>, idp: Stub) -> TestSignIn {
    SignInService::new(
        SurrealUserRepository::new(db.clone()),
        SurrealSessionRepository::new(db.clone()),
        idp,
    )
}

fn person_input(email: &str, document_number: &str) -> SignUpInput {
    SignUpInput {
        user_type_id: "PROSPECT".to_string(),
        email: email.to_string(),
        password: "Secret123!".to_string(),
        first_name: Some("Ana".to_string()),
        last_name: Some("Gomez".to_string()),
        birth_date: Some("1990-05-01".to_string()),
        org_name: None,
        document: SignUpDocument {
            document_type_id: "CC".to_string(),
            document_number: document_number.to_string(),
            dv: None,
        },
    }
}

fn org_input(email: &str, document_number: &str) -> SignUpInput {
    SignUpInput {
        user_type_id: "REAL_ESTATE".to_string(),
        email: email.to_string(),
        password: "Secret123!".to_string(),
        first_name: None,
        last_name: None,
        birth_date: None,
        org_name: Some("Inmobiliaria Sol".to_string()),
        document: SignUpDocument {
            document_type_id: "NIT".to_string(),
            document_number: document_number.to_string(),
            dv: Some("7".to_string()),
        },
    }
}

fn confirm_input(email: &str, code: &str, user_type_id: &str) -> ConfirmSignUpInput {
    ConfirmSignUpInput {
        email: email.to_string(),
        code: code.to_string(),
        flow: "signup".to_string(),
        user_type_id: user_type_id.to_string(),
    }
}

fn signin_input(email: &str, password: &str) -> SignInInput {
    SignInInput {
        email: email.to_string(),
        password: password.to_string(),
        context: RequestContext::default(),
    }
}

#[derive(Debug, SurrealValue)]
struct JoinCodeProbe {
    join_code: String,
    max_uses: u32,
    expires_at: DateTime<Utc>,
    created_by: String,
    org_profile_id: String,
}

async fn join_codes(db: &Surreal<Db>) -> Vec<JoinCodeProbe> {
    let mut result = db
        .query(
            "SELECT join_code, max_uses, expires_at, created_by, \
             org_profile_id FROM agency_join_code",
        )
        .await
        .unwrap();
    result.take(0).unwrap()
}

#[tokio::test]
async fn fresh_person_signup_creates_full_entity_set() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());

    let output = signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap();
    assert_eq!(output.message, MSG_REGISTERED);

    let users = SurrealUserRepository::new(db.clone());
    let user = users.find_by_email("ana@example.com").await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Unconfirmed);
    assert_eq!(user.user_type_id, UserTypeId::Prospect);
    assert_eq!(user.country_id, "CO");

    let profile = SurrealPersonProfileRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.first_name, "Ana");
    assert!(
        SurrealOrgProfileRepository::new(db.clone())
            .find_by_user_id(user.id)
            .await
            .unwrap()
            .is_none()
    );

    let documents = SurrealDocumentRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].document_type_id, "CC");
    assert_eq!(documents[0].details, json!({"documentNumber": "10203040"}));

    let assigned = SurrealUserRoleRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);

    assert!(idp.is_registered("ana@example.com"));
    assert!(!idp.is_confirmed("ana@example.com"));
}

#[tokio::test]
async fn org_signup_creates_org_profile_and_dv_detail() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());

    signup
        .execute(org_input("agency@example.com", "900123456"))
        .await
        .unwrap();

    let user = SurrealUserRepository::new(db.clone())
        .find_by_email("agency@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.user_type_id, UserTypeId::RealEstate);

    let org = SurrealOrgProfileRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(org.org_name, "Inmobiliaria Sol");
    assert!(
        SurrealPersonProfileRepository::new(db.clone())
            .find_by_user_id(user.id)
            .await
            .unwrap()
            .is_none()
    );

    let documents = SurrealDocumentRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap();
    assert_eq!(
        documents[0].details,
        json!({"documentNumber": "900123456", "dv": "7"})
    );
}

#[tokio::test]
async fn signup_rejects_confirmed_email_without_side_effects() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());

    signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap();
    confirm
        .execute(confirm_input("ana@example.com", "000000", "PROSPECT"))
        .await
        .unwrap();

    let err = signup
        .execute(person_input("ana@example.com", "99999999"))
        .await
        .unwrap_err();
    assert!(matches!(err, HabitaError::Conflict { .. }));

    // The retry document was never written.
    assert!(
        SurrealDocumentRepository::new(db.clone())
            .find_by_document_number("CC", "99999999")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn signup_rejects_duplicate_document() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());

    signup
        .execute(person_input("first@example.com", "10203040"))
        .await
        .unwrap();

    let err = signup
        .execute(person_input("second@example.com", "10203040"))
        .await
        .unwrap_err();
    assert!(matches!(err, HabitaError::Conflict { .. }));

    assert!(
        SurrealUserRepository::new(db.clone())
            .find_by_email("second@example.com")
            .await
            .unwrap()
            .is_none()
    );
    assert!(!idp.is_registered("second@example.com"));
}

#[tokio::test]
async fn signup_rejects_unknown_reference_values() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());

    let mut input = person_input("ana@example.com", "10203040");
    input.user_type_id = "WIZARD".to_string();
    assert!(matches!(
        signup.execute(input).await.unwrap_err(),
        HabitaError::Conflict { .. }
    ));

    let mut input = person_input("ana@example.com", "10203040");
    input.document.document_type_id = "DNI".to_string();
    assert!(matches!(
        signup.execute(input).await.unwrap_err(),
        HabitaError::Conflict { .. }
    ));

    assert!(matches!(
        signup
            .execute(person_input("not-an-email", "10203040"))
            .await
            .unwrap_err(),
        HabitaError::Validation { .. }
    ));
}

#[tokio::test]
async fn signup_missing_role_reference_is_internal() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());

    db.query("DELETE role WHERE code = 'ROLE_PROSPECT'")
        .await
        .unwrap()
        .check()
        .unwrap();

    let err = signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap_err();
    assert!(matches!(err, HabitaError::Internal(_)));
}

#[tokio::test]
async fn unconfirmed_retry_overwrites_children_and_resends_code() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());

    signup
        .execute(person_input("switch@example.com", "10203040"))
        .await
        .unwrap();
    let users = SurrealUserRepository::new(db.clone());
    let first = users.find_by_email("switch@example.com").await.unwrap().unwrap();

    // Same email retries as an organization before confirming.
    let output = signup
        .execute(org_input("switch@example.com", "900123456"))
        .await
        .unwrap();
    assert_eq!(output.message, MSG_CODE_RESENT);
    assert_eq!(idp.resend_count("switch@example.com"), 1);

    let second = users.find_by_email("switch@example.com").await.unwrap().unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.user_type_id, UserTypeId::RealEstate);
    assert_eq!(second.status, UserStatus::Unconfirmed);

    assert!(
        SurrealPersonProfileRepository::new(db.clone())
            .find_by_user_id(first.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        SurrealOrgProfileRepository::new(db.clone())
            .find_by_user_id(first.id)
            .await
            .unwrap()
            .is_some()
    );

    let documents = SurrealDocumentRepository::new(db.clone())
        .find_by_user_id(first.id)
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].document_type_id, "NIT");

    let assigned = SurrealUserRoleRepository::new(db.clone())
        .find_by_user_id(first.id)
        .await
        .unwrap();
    assert_eq!(assigned.len(), 1);
}

#[tokio::test]
async fn unconfirmed_retry_rejects_another_users_document() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());

    signup
        .execute(person_input("first@example.com", "10203040"))
        .await
        .unwrap();
    signup
        .execute(person_input("second@example.com", "55667788"))
        .await
        .unwrap();

    // Second user retries with the first user's document number.
    let err = signup
        .execute(person_input("second@example.com", "10203040"))
        .await
        .unwrap_err();
    assert!(matches!(err, HabitaError::Conflict { .. }));

    // The retry never touched the second user's children.
    let user = SurrealUserRepository::new(db.clone())
        .find_by_email("second@example.com")
        .await
        .unwrap()
        .unwrap();
    let documents = SurrealDocumentRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].details, json!({"documentNumber": "55667788"}));

    // Retrying with their own document number is still allowed.
    let output = signup
        .execute(person_input("second@example.com", "55667788"))
        .await
        .unwrap();
    assert_eq!(output.message, MSG_CODE_RESENT);
}

#[tokio::test]
async fn signup_continues_when_principal_exists_upstream() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    // A previous attempt registered upstream but never wrote locally.
    idp.preregister("ghost@example.com", "Secret123!", false);
    let signup = signup_service(&db, idp.clone());

    let output = signup
        .execute(person_input("ghost@example.com", "10203040"))
        .await
        .unwrap();
    assert_eq!(output.message, MSG_REGISTERED);
    assert_eq!(idp.resend_count("ghost@example.com"), 1);
    assert!(
        SurrealUserRepository::new(db.clone())
            .find_by_email("ghost@example.com")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn confirm_flips_status_and_mints_org_join_code() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());

    signup
        .execute(org_input("agency@example.com", "900123456"))
        .await
        .unwrap();
    let output = confirm
        .execute(confirm_input("agency@example.com", "000000", "REAL_ESTATE"))
        .await
        .unwrap();
    assert_eq!(output.message, MSG_CONFIRMED);

    let user = SurrealUserRepository::new(db.clone())
        .find_by_email("agency@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.status, UserStatus::Confirmed);
    assert!(idp.is_confirmed("agency@example.com"));

    let org = SurrealOrgProfileRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap()
        .unwrap();

    let codes = join_codes(&db).await;
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].join_code.len(), 6);
    assert!(codes[0].join_code.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(codes[0].max_uses, 3);
    assert_eq!(codes[0].created_by, user.id.to_string());
    assert_eq!(codes[0].org_profile_id, org.id.to_string());
    let lifetime = codes[0].expires_at - Utc::now();
    assert!(lifetime > Duration::days(729) && lifetime < Duration::days(731));
}

#[tokio::test]
async fn confirm_skips_join_code_for_person_signups() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());

    signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap();
    confirm
        .execute(confirm_input("ana@example.com", "000000", "PROSPECT"))
        .await
        .unwrap();

    assert!(join_codes(&db).await.is_empty());
}

#[tokio::test]
async fn confirm_skips_join_code_when_org_profile_missing() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());

    signup
        .execute(org_input("agency@example.com", "900123456"))
        .await
        .unwrap();
    db.query("DELETE org_profile")
        .await
        .unwrap()
        .check()
        .unwrap();

    let output = confirm
        .execute(confirm_input("agency@example.com", "000000", "REAL_ESTATE"))
        .await
        .unwrap();
    assert_eq!(output.message, MSG_CONFIRMED);

    let user = SurrealUserRepository::new(db.clone())
        .find_by_email("agency@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.status, UserStatus::Confirmed);
    assert!(join_codes(&db).await.is_empty());
}

#[tokio::test]
async fn confirm_rejections() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());

    signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap();

    // Wrong code: rejected upstream, status untouched.
    let err = confirm
        .execute(confirm_input("ana@example.com", "999999", "PROSPECT"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HabitaError::Identity(IdentityError::CodeMismatch)
    ));
    let users = SurrealUserRepository::new(db.clone());
    let user = users.find_by_email("ana@example.com").await.unwrap().unwrap();
    assert_eq!(user.status, UserStatus::Unconfirmed);

    let mut input = confirm_input("ana@example.com", "000000", "PROSPECT");
    input.flow = "reset".to_string();
    assert!(matches!(
        confirm.execute(input).await.unwrap_err(),
        HabitaError::Validation { .. }
    ));

    assert!(matches!(
        confirm
            .execute(confirm_input("nobody@example.com", "000000", "PROSPECT"))
            .await
            .unwrap_err(),
        HabitaError::Conflict { .. }
    ));

    // Second confirm of the same user is a conflict.
    confirm
        .execute(confirm_input("ana@example.com", "000000", "PROSPECT"))
        .await
        .unwrap();
    assert!(matches!(
        confirm
            .execute(confirm_input("ana@example.com", "000000", "PROSPECT"))
            .await
            .unwrap_err(),
        HabitaError::Conflict { .. }
    ));
}

#[tokio::test]
async fn confirm_reconciles_principal_already_confirmed_upstream() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());

    signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap();

    // A previous confirm reached the provider but the local flip was
    // lost.
    idp.confirm_principal("ana@example.com", "000000")
        .await
        .unwrap();

    let output = confirm
        .execute(confirm_input("ana@example.com", "000000", "PROSPECT"))
        .await
        .unwrap();
    assert_eq!(output.message, MSG_CONFIRMED);

    let user = SurrealUserRepository::new(db.clone())
        .find_by_email("ana@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.status, UserStatus::Confirmed);
}

#[tokio::test]
async fn signin_returns_tokens_and_records_session() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());
    let signin = signin_service(&db, idp.clone());

    signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap();
    confirm
        .execute(confirm_input("ana@example.com", "000000", "PROSPECT"))
        .await
        .unwrap();

    let mut input = signin_input("ana@example.com", "Secret123!");
    input.context = RequestContext {
        app_version: "1.2.0".to_string(),
        platform: "ios".to_string(),
        ip: "203.0.113.9".to_string(),
        geo: json!({"city": "Bogota"}),
    };
    let output = signin.execute(input).await.unwrap();
    assert!(!output.access_token.is_empty());
    assert!(!output.refresh_token.is_empty());
    assert!(!output.id_token.is_empty());
    assert!(output.expiration > Utc::now());

    let user = SurrealUserRepository::new(db.clone())
        .find_by_email("ana@example.com")
        .await
        .unwrap()
        .unwrap();
    let sessions = SurrealSessionRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].platform, "ios");
    assert_eq!(sessions[0].ip, "203.0.113.9");

    // A second login appends a second session.
    signin
        .execute(signin_input("ana@example.com", "Secret123!"))
        .await
        .unwrap();
    let sessions = SurrealSessionRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[1].platform, "unknown");
}

#[tokio::test]
async fn signin_rejections_record_no_session() {
    let db = test_db().await;
    let idp: Stub = Arc::new(StubIdentityProvider::new());
    let signup = signup_service(&db, idp.clone());
    let confirm = confirm_service(&db, idp.clone());
    let signin = signin_service(&db, idp.clone());

    assert!(matches!(
        signin
            .execute(signin_input("nobody@example.com", "pw"))
            .await
            .unwrap_err(),
        HabitaError::Conflict { .. }
    ));

    signup
        .execute(person_input("ana@example.com", "10203040"))
        .await
        .unwrap();
    let users = SurrealUserRepository::new(db.clone());
    let user = users.find_by_email("ana@example.com").await.unwrap().unwrap();

    // Not confirmed yet.
    let err = signin
        .execute(signin_input("ana@example.com", "Secret123!"))
        .await
        .unwrap_err();
    match err {
        HabitaError::Conflict { message } => assert_eq!(message, MSG_NOT_CONFIRMED),
        other => panic!("unexpected error: {other}"),
    }

    confirm
        .execute(confirm_input("ana@example.com", "000000", "PROSPECT"))
        .await
        .unwrap();

    assert!(matches!(
        signin
            .execute(signin_input("ana@example.com", "wrong"))
            .await
            .unwrap_err(),
        HabitaError::Identity(IdentityError::NotAuthorized)
    ));

    let sessions = SurrealSessionRepository::new(db.clone())
        .find_by_user_id(user.id)
        .await
        .unwrap();
    assert!(sessions.is_empty());
}
