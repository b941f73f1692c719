//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups the use cases branch on
//! return `Option` rather than erroring on absence; `delete` operations
//! are idempotent from the caller's perspective.
//!
//! Secondary lookups (`find_by_email`, `find_by_user_id`, `find_by_code`,
//! `find_by_join_code`, `find_by_document_number`) are a design
//! requirement: implementations must back each with an index, never a
//! table scan.

use uuid::Uuid;

use crate::error::HabitaResult;
use crate::models::{
    agency_join_code::{AgencyJoinCode, CreateAgencyJoinCode},
    document::{CreateDocument, Document},
    document_type::DocumentType,
    org_profile::{CreateOrgProfile, OrgProfile},
    person_profile::{CreatePersonProfile, PersonProfile},
    role::Role,
    session::{CreateSession, Session},
    user::{CreateUser, UpdateUser, User},
    user_role::{CreateUserRole, UserRole},
    user_type::{UserType, UserTypeId},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Outcome of a partial update.
///
/// `updated` is `false` when nothing remained to apply after stripping
/// absent and empty-string fields; in that case no write was issued.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub id: Uuid,
    pub updated: bool,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = HabitaResult<User>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HabitaResult<Option<User>>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = HabitaResult<Option<User>>> + Send;

    /// Partial merge. Empty-string fields are stripped like absent ones,
    /// so a caller cannot null out a field by sending `""`.
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = HabitaResult<UpdateOutcome>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = HabitaResult<()>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = HabitaResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

pub trait PersonProfileRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePersonProfile,
    ) -> impl Future<Output = HabitaResult<PersonProfile>> + Send;

    fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HabitaResult<Option<PersonProfile>>> + Send;

    /// Idempotent: deleting for a user with no profile is not an error.
    fn delete_by_user_id(&self, user_id: Uuid) -> impl Future<Output = HabitaResult<()>> + Send;
}

pub trait OrgProfileRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrgProfile,
    ) -> impl Future<Output = HabitaResult<OrgProfile>> + Send;

    fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HabitaResult<Option<OrgProfile>>> + Send;

    fn delete_by_user_id(&self, user_id: Uuid) -> impl Future<Output = HabitaResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

pub trait DocumentRepository: Send + Sync {
    fn create(&self, input: CreateDocument) -> impl Future<Output = HabitaResult<Document>> + Send;

    fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HabitaResult<Vec<Document>>> + Send;

    /// Index-backed lookup on the (`document_type_id`,
    /// `details.documentNumber`) pair.
    fn find_by_document_number(
        &self,
        document_type_id: &str,
        document_number: &str,
    ) -> impl Future<Output = HabitaResult<Option<Document>>> + Send;

    fn delete_by_user_id(&self, user_id: Uuid) -> impl Future<Output = HabitaResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

pub trait UserTypeRepository: Send + Sync {
    fn get_by_id(
        &self,
        id: UserTypeId,
    ) -> impl Future<Output = HabitaResult<Option<UserType>>> + Send;

    /// Drains the full table. Intended for small reference data only.
    fn list_all(&self) -> impl Future<Output = HabitaResult<Vec<UserType>>> + Send;
}

pub trait DocumentTypeRepository: Send + Sync {
    fn get_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = HabitaResult<Option<DocumentType>>> + Send;

    fn list_all(&self) -> impl Future<Output = HabitaResult<Vec<DocumentType>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn find_by_code(&self, code: &str)
    -> impl Future<Output = HabitaResult<Option<Role>>> + Send;

    fn list_all(&self) -> impl Future<Output = HabitaResult<Vec<Role>>> + Send;
}

// ---------------------------------------------------------------------------
// User roles
// ---------------------------------------------------------------------------

pub trait UserRoleRepository: Send + Sync {
    fn create(&self, input: CreateUserRole)
    -> impl Future<Output = HabitaResult<UserRole>> + Send;

    fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HabitaResult<Vec<UserRole>>> + Send;

    fn delete_by_user_id(&self, user_id: Uuid) -> impl Future<Output = HabitaResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = HabitaResult<Session>> + Send;

    fn find_by_user_id(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = HabitaResult<Vec<Session>>> + Send;
}

// ---------------------------------------------------------------------------
// Agency join codes
// ---------------------------------------------------------------------------

pub trait AgencyJoinCodeRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAgencyJoinCode,
    ) -> impl Future<Output = HabitaResult<AgencyJoinCode>> + Send;

    fn find_by_join_code(
        &self,
        join_code: &str,
    ) -> impl Future<Output = HabitaResult<Option<AgencyJoinCode>>> + Send;
}
