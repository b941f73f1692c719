//! SurrealDB repository implementations for the `habita-core` traits.

mod agency_join_code;
mod document;
mod document_type;
mod org_profile;
mod person_profile;
mod role;
mod session;
mod user;
mod user_role;
mod user_type;

pub use agency_join_code::SurrealAgencyJoinCodeRepository;
pub use document::SurrealDocumentRepository;
pub use document_type::SurrealDocumentTypeRepository;
pub use org_profile::SurrealOrgProfileRepository;
pub use person_profile::SurrealPersonProfileRepository;
pub use role::SurrealRoleRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;
pub use user_role::SurrealUserRoleRepository;
pub use user_type::SurrealUserTypeRepository;
