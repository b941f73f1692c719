//! ConfirmSignUp use case.
//!
//! Validates the one-time code with the identity provider, flips the
//! user to confirmed, and for organization signups mints a durable
//! agency join code.

use chrono::{Duration, Utc};
use habita_core::error::{HabitaError, HabitaResult};
use habita_core::identity::{IdentityError, IdentityProvider};
use habita_core::models::agency_join_code::{CreateAgencyJoinCode, JoinCodeKind};
use habita_core::models::user::{UpdateUser, UserStatus};
use habita_core::models::user_type::UserTypeId;
use habita_core::repository::{
    AgencyJoinCodeRepository, OrgProfileRepository, UserRepository,
};
use habita_core::validate;
use tracing::{info, warn};

use crate::join_code::generate_join_code;

pub const MSG_CONFIRMED: &str = "User confirmed successfully, proceed to sign in";

pub const JOIN_CODE_MAX_USES: u32 = 3;
pub const JOIN_CODE_LIFETIME_DAYS: i64 = 365 * 2;

/// Input for the confirmation flow. `flow` must be the literal
/// `"signup"`.
#[derive(Debug, Clone)]
pub struct ConfirmSignUpInput {
    pub email: String,
    pub code: String,
    pub flow: String,
    pub user_type_id: String,
}

#[derive(Debug, Clone)]
pub struct ConfirmSignUpOutput {
    pub message: &'static str,
}

/// Confirmation orchestration service.
pub struct ConfirmSignUpService<U, OP, AJ, IP> {
    users: U,
    org_profiles: OP,
    join_codes: AJ,
    identity: IP,
}

impl<U, OP, AJ, IP> ConfirmSignUpService<U, OP, AJ, IP>
where
    U: UserRepository,
    OP: OrgProfileRepository,
    AJ: AgencyJoinCodeRepository,
    IP: IdentityProvider,
{
    pub fn new(users: U, org_profiles: OP, join_codes: AJ, identity: IP) -> Self {
        Self {
            users,
            org_profiles,
            join_codes,
            identity,
        }
    }

    pub async fn execute(&self, input: ConfirmSignUpInput) -> HabitaResult<ConfirmSignUpOutput> {
        validate::required("email", &input.email)?;
        validate::required("code", &input.code)?;
        validate::required("flow", &input.flow)?;
        validate::required("userTypeId", &input.user_type_id)?;
        validate::email_shape(&input.email)?;
        if input.flow != "signup" {
            return Err(HabitaError::validation("invalid flow"));
        }
        let user_type = UserTypeId::parse(&input.user_type_id)
            .ok_or_else(|| HabitaError::conflict("invalid user type"))?;

        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| HabitaError::conflict("user not found"))?;
        if user.status == UserStatus::Confirmed {
            return Err(HabitaError::conflict("user already confirmed"));
        }

        // An already-confirmed principal upstream means a previous
        // confirm succeeded there but the local status flip was lost;
        // continue and reconcile instead of failing.
        match self.identity.confirm_principal(&input.email, &input.code).await {
            Ok(()) => {}
            Err(IdentityError::AlreadyConfirmed) => {
                info!(user_id = %user.id, "principal already confirmed upstream, reconciling");
            }
            Err(e) => return Err(e.into()),
        }

        self.users
            .update(
                user.id,
                UpdateUser {
                    status: Some(UserStatus::Confirmed),
                    ..Default::default()
                },
            )
            .await?;

        if user_type.is_organization() {
            self.mint_join_code(user.id).await?;
        }

        Ok(ConfirmSignUpOutput {
            message: MSG_CONFIRMED,
        })
    }

    /// Best-effort side operation: a missing org profile is logged and
    /// skipped, not a hard failure.
    async fn mint_join_code(&self, user_id: uuid::Uuid) -> HabitaResult<()> {
        let Some(org_profile) = self.org_profiles.find_by_user_id(user_id).await? else {
            warn!(%user_id, "org profile missing, skipping join code mint");
            return Ok(());
        };

        let join_code = generate_join_code();
        self.join_codes
            .create(CreateAgencyJoinCode {
                org_profile_id: org_profile.id,
                join_code,
                kind: JoinCodeKind::MultiUse,
                max_uses: JOIN_CODE_MAX_USES,
                expires_at: Utc::now() + Duration::days(JOIN_CODE_LIFETIME_DAYS),
                created_by: user_id,
            })
            .await?;
        Ok(())
    }
}
