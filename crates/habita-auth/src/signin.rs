//! SignIn use case.
//!
//! Authenticates against the identity provider and records a session
//! row. Every successful login creates a new session; there is no
//! session limit or revocation.

use chrono::{DateTime, Duration, Utc};
use habita_core::error::{HabitaError, HabitaResult};
use habita_core::identity::IdentityProvider;
use habita_core::models::session::CreateSession;
use habita_core::models::user::UserStatus;
use habita_core::repository::{SessionRepository, UserRepository};
use habita_core::validate;

pub const MSG_NOT_CONFIRMED: &str = "user not confirmed, confirm first";

/// Client context captured from request headers. Absent values default
/// to `"unknown"` (strings) and `{}` (geo).
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub app_version: String,
    pub platform: String,
    pub ip: String,
    pub geo: serde_json::Value,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            app_version: "unknown".into(),
            platform: "unknown".into(),
            ip: "unknown".into(),
            geo: serde_json::json!({}),
        }
    }
}

/// Input for the sign-in flow.
#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
    pub context: RequestContext,
}

/// Successful sign-in result.
#[derive(Debug, Clone)]
pub struct SignInOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    pub expiration: DateTime<Utc>,
}

/// Sign-in orchestration service.
pub struct SignInService<U, S, IP> {
    users: U,
    sessions: S,
    identity: IP,
}

impl<U, S, IP> SignInService<U, S, IP>
where
    U: UserRepository,
    S: SessionRepository,
    IP: IdentityProvider,
{
    pub fn new(users: U, sessions: S, identity: IP) -> Self {
        Self {
            users,
            sessions,
            identity,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> HabitaResult<SignInOutput> {
        validate::required("email", &input.email)?;
        validate::required("password", &input.password)?;
        validate::email_shape(&input.email)?;

        let user = self
            .users
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| HabitaError::conflict("user not found"))?;
        if user.status != UserStatus::Confirmed {
            return Err(HabitaError::conflict(MSG_NOT_CONFIRMED));
        }

        let tokens = self
            .identity
            .authenticate_principal(&input.email, &input.password)
            .await?;
        let expiration = Utc::now() + Duration::seconds(tokens.expires_in as i64);

        self.sessions
            .create(CreateSession {
                user_id: user.id,
                app_version: input.context.app_version,
                platform: input.context.platform,
                ip: input.context.ip,
                geo: input.context.geo,
            })
            .await?;

        Ok(SignInOutput {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            id_token: tokens.id_token,
            expiration,
        })
    }
}
