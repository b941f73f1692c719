//! Identity provider gateway contract.
//!
//! The external identity service owns credentials, password verification,
//! token minting, and one-time-code delivery. This module defines the
//! narrow interface the use cases consume; the concrete wire client lives
//! in `habita-identity`.

use thiserror::Error;
use uuid::Uuid;

/// Token material returned by a successful password authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Domain-level translation of identity provider outcomes.
///
/// Every variant except [`IdentityError::Provider`] corresponds to a
/// specific upstream rejection and maps to a specific bad-request
/// message at the HTTP boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// A principal with this email is already registered upstream.
    #[error("principal already registered")]
    PrincipalExists,

    #[error("confirmation code does not match")]
    CodeMismatch,

    #[error("confirmation code has expired")]
    CodeExpired,

    /// The principal is already confirmed upstream. During confirm this
    /// is absorbed as success-path continuation, not surfaced.
    #[error("principal already confirmed")]
    AlreadyConfirmed,

    #[error("not authorized")]
    NotAuthorized,

    #[error("principal is not confirmed")]
    NotConfirmed,

    #[error("principal not found")]
    PrincipalNotFound,

    #[error("too many requests")]
    RateLimited,

    /// Transport failure or an unmapped provider error. Surfaces as a
    /// generic internal error.
    #[error("provider error: {0}")]
    Provider(String),
}

impl IdentityError {
    /// Whether this error maps to a bad request (as opposed to an
    /// internal error) at the HTTP boundary.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, IdentityError::Provider(_))
    }
}

/// Gateway to the external identity service.
///
/// The only component permitted to hold provider credentials or region
/// configuration. Use cases depend on this trait, never on the wire
/// client directly.
pub trait IdentityProvider: Send + Sync {
    /// Create a credential record for `email`. The chosen `external_id`
    /// becomes the domain `User.id` so both stores agree on identity.
    ///
    /// Returns [`IdentityError::PrincipalExists`] when the provider
    /// already holds this email (a previous attempt registered there
    /// but crashed before the local user write).
    fn register_principal(
        &self,
        email: &str,
        password: &str,
        external_id: Uuid,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Re-send the one-time confirmation code for an unconfirmed
    /// principal.
    fn resend_confirmation_code(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Validate a one-time code. "Already confirmed" surfaces as
    /// [`IdentityError::AlreadyConfirmed`]; bad and expired codes are
    /// distinct kinds.
    fn confirm_principal(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Password-based login.
    fn authenticate_principal(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<TokenSet, IdentityError>> + Send;
}

// Shared gateways: one provider instance can back every request-scoped
// use case.
impl<T: IdentityProvider> IdentityProvider for std::sync::Arc<T> {
    fn register_principal(
        &self,
        email: &str,
        password: &str,
        external_id: Uuid,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send {
        (**self).register_principal(email, password, external_id)
    }

    fn resend_confirmation_code(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send {
        (**self).resend_confirmation_code(email)
    }

    fn confirm_principal(
        &self,
        email: &str,
        code: &str,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send {
        (**self).confirm_principal(email, code)
    }

    fn authenticate_principal(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<TokenSet, IdentityError>> + Send {
        (**self).authenticate_principal(email, password)
    }
}
