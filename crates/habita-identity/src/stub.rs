//! In-memory identity provider stub for integration tests.
//!
//! Mimics the provider's observable behavior (principal registry,
//! confirmation state, code validation) without any network. Outcomes
//! can additionally be scripted per call via [`StubIdentityProvider::fail_next`].

use std::collections::HashMap;
use std::sync::Mutex;

use habita_core::identity::{IdentityError, IdentityProvider, TokenSet};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Principal {
    password: String,
    confirmed: bool,
    resend_count: u32,
}

pub struct StubIdentityProvider {
    expected_code: String,
    principals: Mutex<HashMap<String, Principal>>,
    fail_next: Mutex<Option<IdentityError>>,
}

impl StubIdentityProvider {
    /// Stub accepting `000000` as the valid confirmation code.
    pub fn new() -> Self {
        Self {
            expected_code: "000000".into(),
            principals: Mutex::new(HashMap::new()),
            fail_next: Mutex::new(None),
        }
    }

    /// Seed a principal as if a previous signup had registered it.
    pub fn preregister(&self, email: &str, password: &str, confirmed: bool) {
        self.principals.lock().unwrap().insert(
            email.to_string(),
            Principal {
                password: password.to_string(),
                confirmed,
                resend_count: 0,
            },
        );
    }

    /// Script the next provider call to fail with `err`.
    pub fn fail_next(&self, err: IdentityError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn is_registered(&self, email: &str) -> bool {
        self.principals.lock().unwrap().contains_key(email)
    }

    pub fn is_confirmed(&self, email: &str) -> bool {
        self.principals
            .lock()
            .unwrap()
            .get(email)
            .is_some_and(|p| p.confirmed)
    }

    /// Number of times a confirmation code was re-sent for this email.
    pub fn resend_count(&self, email: &str) -> u32 {
        self.principals
            .lock()
            .unwrap()
            .get(email)
            .map(|p| p.resend_count)
            .unwrap_or(0)
    }

    fn take_scripted_failure(&self) -> Option<IdentityError> {
        self.fail_next.lock().unwrap().take()
    }
}

impl IdentityProvider for StubIdentityProvider {
    async fn register_principal(
        &self,
        email: &str,
        password: &str,
        _external_id: Uuid,
    ) -> Result<(), IdentityError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        let mut principals = self.principals.lock().unwrap();
        if principals.contains_key(email) {
            return Err(IdentityError::PrincipalExists);
        }
        principals.insert(
            email.to_string(),
            Principal {
                password: password.to_string(),
                confirmed: false,
                resend_count: 0,
            },
        );
        Ok(())
    }

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), IdentityError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        let mut principals = self.principals.lock().unwrap();
        match principals.get_mut(email) {
            Some(principal) => {
                principal.resend_count += 1;
                Ok(())
            }
            None => Err(IdentityError::PrincipalNotFound),
        }
    }

    async fn confirm_principal(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        let mut principals = self.principals.lock().unwrap();
        let principal = principals
            .get_mut(email)
            .ok_or(IdentityError::PrincipalNotFound)?;
        if principal.confirmed {
            return Err(IdentityError::AlreadyConfirmed);
        }
        if code != self.expected_code {
            return Err(IdentityError::CodeMismatch);
        }
        principal.confirmed = true;
        Ok(())
    }

    async fn authenticate_principal(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenSet, IdentityError> {
        if let Some(err) = self.take_scripted_failure() {
            return Err(err);
        }
        let principals = self.principals.lock().unwrap();
        let principal = principals
            .get(email)
            .ok_or(IdentityError::PrincipalNotFound)?;
        if !principal.confirmed {
            return Err(IdentityError::NotConfirmed);
        }
        if principal.password != password {
            return Err(IdentityError::NotAuthorized);
        }
        Ok(TokenSet {
            access_token: format!("stub-access-{}", Uuid::new_v4()),
            refresh_token: format!("stub-refresh-{}", Uuid::new_v4()),
            id_token: format!("stub-id-{}", Uuid::new_v4()),
            expires_in: 3600,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn register_confirm_authenticate_round_trip() {
        let stub = StubIdentityProvider::new();
        let id = Uuid::new_v4();

        stub.register_principal("a@b.com", "Secret123!", id)
            .await
            .unwrap();
        assert_eq!(
            stub.register_principal("a@b.com", "Secret123!", id).await,
            Err(IdentityError::PrincipalExists)
        );

        assert_eq!(
            stub.authenticate_principal("a@b.com", "Secret123!").await,
            Err(IdentityError::NotConfirmed)
        );

        assert_eq!(
            stub.confirm_principal("a@b.com", "999999").await,
            Err(IdentityError::CodeMismatch)
        );
        stub.confirm_principal("a@b.com", "000000").await.unwrap();
        assert_eq!(
            stub.confirm_principal("a@b.com", "000000").await,
            Err(IdentityError::AlreadyConfirmed)
        );

        let tokens = stub
            .authenticate_principal("a@b.com", "Secret123!")
            .await
            .unwrap();
        assert!(!tokens.access_token.is_empty());
        assert_eq!(
            stub.authenticate_principal("a@b.com", "wrong").await,
            Err(IdentityError::NotAuthorized)
        );
    }

    #[tokio::test]
    async fn scripted_failure_applies_once() {
        let stub = StubIdentityProvider::new();
        stub.preregister("a@b.com", "pw", false);

        stub.fail_next(IdentityError::RateLimited);
        assert_eq!(
            stub.resend_confirmation_code("a@b.com").await,
            Err(IdentityError::RateLimited)
        );
        stub.resend_confirmation_code("a@b.com").await.unwrap();
        assert_eq!(stub.resend_count("a@b.com"), 1);
    }
}
