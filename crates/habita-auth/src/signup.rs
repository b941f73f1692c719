//! SignUp use case.
//!
//! Validates input, registers the principal with the identity provider,
//! and persists User + profile + document + default role. An email that
//! already has an unconfirmed user takes the retry/overwrite path: the
//! user row is updated in place and its child rows are replaced, then
//! the confirmation code is re-sent.

use habita_core::error::{HabitaError, HabitaResult};
use habita_core::identity::{IdentityError, IdentityProvider};
use habita_core::models::document::CreateDocument;
use habita_core::models::document_type::DocumentType;
use habita_core::models::org_profile::CreateOrgProfile;
use habita_core::models::person_profile::CreatePersonProfile;
use habita_core::models::user::{CreateUser, UpdateUser, User, UserStatus};
use habita_core::models::user_role::CreateUserRole;
use habita_core::models::user_type::UserTypeId;
use habita_core::repository::{
    DocumentRepository, DocumentTypeRepository, OrgProfileRepository, PersonProfileRepository,
    RoleRepository, UserRepository, UserRoleRepository, UserTypeRepository,
};
use habita_core::validate;
use tracing::info;
use uuid::Uuid;

use crate::details::project_details;
use crate::roles::default_role_code;

pub const MSG_REGISTERED: &str = "User registered, pending confirmation";
pub const MSG_CODE_RESENT: &str = "User already registered, confirmation code resent";

/// Identity document fields sent with a signup request.
#[derive(Debug, Clone)]
pub struct SignUpDocument {
    pub document_type_id: String,
    pub document_number: String,
    pub dv: Option<String>,
}

/// Input for the signup flow.
#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub user_type_id: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub org_name: Option<String>,
    pub document: SignUpDocument,
}

#[derive(Debug, Clone)]
pub struct SignUpOutput {
    pub message: &'static str,
}

/// Signup orchestration service.
///
/// Generic over repository and identity-provider implementations so the
/// use case has no dependency on the database or wire-client crates.
pub struct SignUpService<UT, U, PP, OP, D, DT, R, UR, IP> {
    user_types: UT,
    users: U,
    person_profiles: PP,
    org_profiles: OP,
    documents: D,
    document_types: DT,
    roles: R,
    user_roles: UR,
    identity: IP,
}

impl<UT, U, PP, OP, D, DT, R, UR, IP> SignUpService<UT, U, PP, OP, D, DT, R, UR, IP>
where
    UT: UserTypeRepository,
    U: UserRepository,
    PP: PersonProfileRepository,
    OP: OrgProfileRepository,
    D: DocumentRepository,
    DT: DocumentTypeRepository,
    R: RoleRepository,
    UR: UserRoleRepository,
    IP: IdentityProvider,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_types: UT,
        users: U,
        person_profiles: PP,
        org_profiles: OP,
        documents: D,
        document_types: DT,
        roles: R,
        user_roles: UR,
        identity: IP,
    ) -> Self {
        Self {
            user_types,
            users,
            person_profiles,
            org_profiles,
            documents,
            document_types,
            roles,
            user_roles,
            identity,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> HabitaResult<SignUpOutput> {
        // 1. Validate before any side effect.
        validate::required("email", &input.email)?;
        validate::required("password", &input.password)?;
        validate::required("userTypeId", &input.user_type_id)?;
        validate::required("document.documentTypeId", &input.document.document_type_id)?;
        validate::required("document.documentNumber", &input.document.document_number)?;
        validate::email_shape(&input.email)?;

        // 2. Resolve reference data.
        let user_type = UserTypeId::parse(&input.user_type_id)
            .ok_or_else(|| HabitaError::conflict("invalid user type"))?;
        self.user_types
            .get_by_id(user_type)
            .await?
            .ok_or_else(|| HabitaError::conflict("invalid user type"))?;
        let document_type = self
            .document_types
            .get_by_id(&input.document.document_type_id)
            .await?
            .ok_or_else(|| HabitaError::conflict("invalid document type"))?;

        // 3. Branch on the existing user, if any.
        match self.users.find_by_email(&input.email).await? {
            Some(user) if user.status == UserStatus::Confirmed => Err(HabitaError::conflict(
                "email already registered and confirmed",
            )),
            Some(user) => self.retry_signup(user, &input, user_type, &document_type).await,
            None => self.fresh_signup(&input, user_type, &document_type).await,
        }
    }

    /// Retry/overwrite path: the email exists but was never confirmed,
    /// so the new signup fully supersedes the old one. The user row is
    /// updated in place (same id) and each child set is replaced. The
    /// principal is not re-registered here.
    async fn retry_signup(
        &self,
        user: User,
        input: &SignUpInput,
        user_type: UserTypeId,
        document_type: &DocumentType,
    ) -> HabitaResult<SignUpOutput> {
        // The new document may belong to someone else; the retrying
        // user's own row is about to be replaced and does not count.
        if let Some(existing) = self
            .documents
            .find_by_document_number(
                &input.document.document_type_id,
                &input.document.document_number,
            )
            .await?
        {
            if existing.user_id != user.id {
                return Err(HabitaError::conflict("document already registered"));
            }
        }

        info!(user_id = %user.id, "unconfirmed signup retry, overwriting");

        self.users
            .update(
                user.id,
                UpdateUser {
                    email: Some(input.email.clone()),
                    status: Some(UserStatus::Unconfirmed),
                    user_type_id: Some(user_type),
                    country_id: Some(document_type.country_id.clone()),
                },
            )
            .await?;

        // Replace children. Deletes are idempotent and run before each
        // create, so a partially-failed retry converges on the next
        // attempt.
        self.person_profiles.delete_by_user_id(user.id).await?;
        self.org_profiles.delete_by_user_id(user.id).await?;
        self.create_profile(user.id, input, user_type).await?;

        self.documents.delete_by_user_id(user.id).await?;
        self.create_document(user.id, input, document_type).await?;

        self.user_roles.delete_by_user_id(user.id).await?;
        self.assign_default_role(user.id, user_type).await?;

        self.identity.resend_confirmation_code(&input.email).await?;

        Ok(SignUpOutput {
            message: MSG_CODE_RESENT,
        })
    }

    async fn fresh_signup(
        &self,
        input: &SignUpInput,
        user_type: UserTypeId,
        document_type: &DocumentType,
    ) -> HabitaResult<SignUpOutput> {
        // Document uniqueness on the (type, number) pair.
        if self
            .documents
            .find_by_document_number(
                &input.document.document_type_id,
                &input.document.document_number,
            )
            .await?
            .is_some()
        {
            return Err(HabitaError::conflict("document already registered"));
        }

        // Register the principal. The provider may already hold this
        // email from an attempt that crashed before the local user
        // write; in that case re-send the code instead of failing.
        let id = Uuid::new_v4();
        match self
            .identity
            .register_principal(&input.email, &input.password, id)
            .await
        {
            Ok(()) => {}
            Err(IdentityError::PrincipalExists) => {
                info!(email = %input.email, "principal already registered upstream, resending code");
                self.identity.resend_confirmation_code(&input.email).await?;
            }
            Err(e) => return Err(e.into()),
        }

        self.users
            .create(CreateUser {
                id,
                email: input.email.clone(),
                user_type_id: user_type,
                country_id: document_type.country_id.clone(),
            })
            .await?;

        self.create_profile(id, input, user_type).await?;
        self.create_document(id, input, document_type).await?;
        self.assign_default_role(id, user_type).await?;

        Ok(SignUpOutput {
            message: MSG_REGISTERED,
        })
    }

    /// Organization signups get an OrgProfile, every other type a
    /// PersonProfile. Never both.
    async fn create_profile(
        &self,
        user_id: Uuid,
        input: &SignUpInput,
        user_type: UserTypeId,
    ) -> HabitaResult<()> {
        if user_type.is_organization() {
            self.org_profiles
                .create(CreateOrgProfile {
                    user_id,
                    org_name: input.org_name.clone().unwrap_or_default(),
                    description: None,
                })
                .await?;
        } else {
            self.person_profiles
                .create(CreatePersonProfile {
                    user_id,
                    first_name: input.first_name.clone().unwrap_or_default(),
                    last_name: input.last_name.clone().unwrap_or_default(),
                    birth_date: input.birth_date.clone(),
                })
                .await?;
        }
        Ok(())
    }

    async fn create_document(
        &self,
        user_id: Uuid,
        input: &SignUpInput,
        document_type: &DocumentType,
    ) -> HabitaResult<()> {
        let details = project_details(document_type, &input.document);
        self.documents
            .create(CreateDocument {
                user_id,
                document_type_id: document_type.id.clone(),
                details,
            })
            .await?;
        Ok(())
    }

    /// Missing role reference data is an operational misconfiguration,
    /// not a user input problem, and surfaces as an internal error.
    async fn assign_default_role(&self, user_id: Uuid, user_type: UserTypeId) -> HabitaResult<()> {
        let code = default_role_code(user_type);
        let role = self
            .roles
            .find_by_code(code)
            .await?
            .ok_or_else(|| HabitaError::Internal(format!("role reference data missing: {code}")))?;
        self.user_roles
            .create(CreateUserRole {
                user_id,
                role_id: role.id,
            })
            .await?;
        Ok(())
    }
}
