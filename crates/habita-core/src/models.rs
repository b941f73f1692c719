//! Domain models.
//!
//! All entities are immutable-by-replacement: updates are partial merges
//! applied by the repository layer through `Update*` structs.

pub mod agency_join_code;
pub mod document;
pub mod document_type;
pub mod org_profile;
pub mod person_profile;
pub mod role;
pub mod session;
pub mod user;
pub mod user_role;
pub mod user_type;
