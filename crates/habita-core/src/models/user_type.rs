//! User type reference data.

use serde::{Deserialize, Serialize};

/// Closed enumeration of user categories. Serialized as the wire codes
/// the mobile apps send (`PROPERTY_OWNER`, `PROSPECT`, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserTypeId {
    PropertyOwner,
    Prospect,
    IndependentAgent,
    /// The organization category. Signups of this type get an
    /// `OrgProfile` instead of a `PersonProfile` and mint an agency
    /// join code on confirmation.
    RealEstate,
}

impl UserTypeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserTypeId::PropertyOwner => "PROPERTY_OWNER",
            UserTypeId::Prospect => "PROSPECT",
            UserTypeId::IndependentAgent => "INDEPENDENT_AGENT",
            UserTypeId::RealEstate => "REAL_ESTATE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PROPERTY_OWNER" => Some(UserTypeId::PropertyOwner),
            "PROSPECT" => Some(UserTypeId::Prospect),
            "INDEPENDENT_AGENT" => Some(UserTypeId::IndependentAgent),
            "REAL_ESTATE" => Some(UserTypeId::RealEstate),
            _ => None,
        }
    }

    /// Organization signups take the `OrgProfile` path.
    pub fn is_organization(&self) -> bool {
        matches!(self, UserTypeId::RealEstate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserType {
    pub id: UserTypeId,
    pub description: String,
}
