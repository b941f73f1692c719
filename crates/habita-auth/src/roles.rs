//! Static user-type to default-role mapping.

use habita_core::models::user_type::UserTypeId;

/// The role code assigned to a fresh signup of each user type.
pub fn default_role_code(user_type: UserTypeId) -> &'static str {
    match user_type {
        UserTypeId::PropertyOwner => "ROLE_PROPERTY_OWNER",
        UserTypeId::Prospect => "ROLE_PROSPECT",
        UserTypeId::IndependentAgent => "ROLE_INDEPENDENT_AGENT",
        UserTypeId::RealEstate => "ROLE_REAL_ESTATE",
    }
}
