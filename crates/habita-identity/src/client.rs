//! Wire client for the Cognito-compatible identity provider API.
//!
//! Every call is a JSON POST to the regional endpoint with an
//! `X-Amz-Target` header selecting the action. Provider rejections come
//! back as a JSON body with a `__type` field; `translate_rejection`
//! maps those 1:1 onto [`IdentityError`] kinds.

use habita_core::identity::{IdentityError, IdentityProvider, TokenSet};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::IdentityConfig;

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

const ACTION_SIGN_UP: &str = "SignUp";
const ACTION_CONFIRM_SIGN_UP: &str = "ConfirmSignUp";
const ACTION_RESEND_CODE: &str = "ResendConfirmationCode";
const ACTION_INITIATE_AUTH: &str = "InitiateAuth";

/// Error body shape shared by all provider actions.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InitiateAuthResponse {
    #[serde(rename = "AuthenticationResult")]
    authentication_result: Option<AuthenticationResult>,
}

#[derive(Debug, Deserialize)]
struct AuthenticationResult {
    #[serde(rename = "AccessToken")]
    access_token: String,
    #[serde(rename = "RefreshToken")]
    refresh_token: String,
    #[serde(rename = "IdToken")]
    id_token: String,
    #[serde(rename = "ExpiresIn")]
    expires_in: u64,
}

/// Map a provider `__type` (optionally namespace-prefixed, e.g.
/// `com.amazonaws...#CodeMismatchException`) onto a domain error kind.
///
/// `action` disambiguates the one context-sensitive case: during
/// confirmation the provider reports an already-confirmed principal as
/// `NotAuthorizedException` with a "Current status is CONFIRMED"
/// message, which the confirm flow treats as success-equivalent.
fn translate_rejection(action: &str, kind: &str, message: &str) -> IdentityError {
    let kind = kind.rsplit('#').next().unwrap_or(kind);
    match kind {
        "UsernameExistsException" => IdentityError::PrincipalExists,
        "CodeMismatchException" => IdentityError::CodeMismatch,
        "ExpiredCodeException" => IdentityError::CodeExpired,
        "NotAuthorizedException" => {
            if action == ACTION_CONFIRM_SIGN_UP && message.contains("CONFIRMED") {
                IdentityError::AlreadyConfirmed
            } else {
                IdentityError::NotAuthorized
            }
        }
        "UserNotConfirmedException" => IdentityError::NotConfirmed,
        "UserNotFoundException" => IdentityError::PrincipalNotFound,
        "TooManyRequestsException" | "LimitExceededException" => IdentityError::RateLimited,
        other => IdentityError::Provider(format!("{other}: {message}")),
    }
}

/// Identity provider gateway over the Cognito-compatible wire protocol.
#[derive(Clone)]
pub struct CognitoIdentityProvider {
    http: reqwest::Client,
    config: IdentityConfig,
}

impl CognitoIdentityProvider {
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IdentityError::Provider(format!("http client init: {e}")))?;
        Ok(Self { http, config })
    }

    /// POST one action and return the raw response body on HTTP 200,
    /// or the translated rejection otherwise.
    async fn call(
        &self,
        action: &str,
        body: serde_json::Value,
    ) -> Result<String, IdentityError> {
        debug!(action, "identity provider call");

        let response = self
            .http
            .post(self.config.endpoint_url())
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| IdentityError::Provider(format!("{action} transport: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| IdentityError::Provider(format!("{action} body: {e}")))?;

        if status.is_success() {
            return Ok(text);
        }

        let parsed: ProviderErrorBody = serde_json::from_str(&text).unwrap_or(ProviderErrorBody {
            kind: None,
            message: None,
        });
        let kind = parsed.kind.unwrap_or_default();
        let message = parsed.message.unwrap_or_default();
        let err = translate_rejection(action, &kind, &message);
        warn!(action, %status, kind, "identity provider rejected call");
        Err(err)
    }
}

impl IdentityProvider for CognitoIdentityProvider {
    async fn register_principal(
        &self,
        email: &str,
        password: &str,
        external_id: Uuid,
    ) -> Result<(), IdentityError> {
        let body = json!({
            "ClientId": self.config.client_id,
            "Username": email,
            "Password": password,
            "UserAttributes": [
                { "Name": "email", "Value": email },
                { "Name": "custom:external_id", "Value": external_id.to_string() },
            ],
        });
        self.call(ACTION_SIGN_UP, body).await?;
        Ok(())
    }

    async fn resend_confirmation_code(&self, email: &str) -> Result<(), IdentityError> {
        let body = json!({
            "ClientId": self.config.client_id,
            "Username": email,
        });
        self.call(ACTION_RESEND_CODE, body).await?;
        Ok(())
    }

    async fn confirm_principal(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        let body = json!({
            "ClientId": self.config.client_id,
            "Username": email,
            "ConfirmationCode": code,
        });
        self.call(ACTION_CONFIRM_SIGN_UP, body).await?;
        Ok(())
    }

    async fn authenticate_principal(
        &self,
        email: &str,
        password: &str,
    ) -> Result<TokenSet, IdentityError> {
        let body = json!({
            "ClientId": self.config.client_id,
            "AuthFlow": "USER_PASSWORD_AUTH",
            "AuthParameters": {
                "USERNAME": email,
                "PASSWORD": password,
            },
        });
        let text = self.call(ACTION_INITIATE_AUTH, body).await?;

        let parsed: InitiateAuthResponse = serde_json::from_str(&text)
            .map_err(|e| IdentityError::Provider(format!("auth response decode: {e}")))?;
        let result = parsed
            .authentication_result
            .ok_or_else(|| IdentityError::Provider("auth response missing token set".into()))?;

        Ok(TokenSet {
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            id_token: result.id_token,
            expires_in: result.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_namespace_prefix() {
        let err = translate_rejection(
            ACTION_CONFIRM_SIGN_UP,
            "com.amazonaws.cognito#CodeMismatchException",
            "Invalid verification code provided",
        );
        assert_eq!(err, IdentityError::CodeMismatch);
    }

    #[test]
    fn already_confirmed_only_during_confirm() {
        let msg = "User cannot be confirmed. Current status is CONFIRMED";
        assert_eq!(
            translate_rejection(ACTION_CONFIRM_SIGN_UP, "NotAuthorizedException", msg),
            IdentityError::AlreadyConfirmed
        );
        assert_eq!(
            translate_rejection(ACTION_INITIATE_AUTH, "NotAuthorizedException", msg),
            IdentityError::NotAuthorized
        );
        assert_eq!(
            translate_rejection(
                ACTION_INITIATE_AUTH,
                "NotAuthorizedException",
                "Incorrect username or password."
            ),
            IdentityError::NotAuthorized
        );
    }

    #[test]
    fn distinct_kinds_for_each_rejection() {
        let cases = [
            ("UsernameExistsException", IdentityError::PrincipalExists),
            ("ExpiredCodeException", IdentityError::CodeExpired),
            ("UserNotConfirmedException", IdentityError::NotConfirmed),
            ("UserNotFoundException", IdentityError::PrincipalNotFound),
            ("TooManyRequestsException", IdentityError::RateLimited),
            ("LimitExceededException", IdentityError::RateLimited),
        ];
        for (kind, expected) in cases {
            assert_eq!(translate_rejection(ACTION_SIGN_UP, kind, ""), expected);
        }
    }

    #[test]
    fn unknown_kind_is_internal() {
        let err = translate_rejection(ACTION_SIGN_UP, "InternalErrorException", "boom");
        assert!(matches!(err, IdentityError::Provider(_)));
        assert!(!err.is_rejection());
    }
}
