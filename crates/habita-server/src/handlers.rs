//! Route handlers and the HTTP error envelope.
//!
//! Every successful response carries `{"code": "PROCESS_OK", ...}`.
//! Caller-correctable failures map to 400 with a cause-specific
//! message; everything else maps to 500 with a generic body and the
//! full detail logged server side.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use habita_auth::confirm::{ConfirmSignUpInput, ConfirmSignUpService};
use habita_auth::signin::{SignInInput, SignInService};
use habita_auth::signup::{SignUpDocument, SignUpInput, SignUpService};
use habita_core::error::HabitaError;
use habita_core::identity::{IdentityError, IdentityProvider};
use serde::{Deserialize, Serialize};
use surrealdb::Connection;
use tracing::error;

use crate::AppState;
use crate::context::request_context;

pub const CODE_OK: &str = "PROCESS_OK";
pub const CODE_BAD_REQUEST: &str = "BAD_REQUEST";
pub const CODE_INTERNAL: &str = "INTERNAL_ERROR";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpDocumentRequest {
    pub document_type_id: String,
    pub document_number: String,
    pub dv: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub user_type_id: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub org_name: Option<String>,
    pub document: SignUpDocumentRequest,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub email: String,
    pub code: String,
    pub flow: String,
    pub user_type_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
    pub id_token: String,
    pub expiration: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub code: &'static str,
    pub data: TokenData,
}

/// Error newtype so `?` works inside handlers. The `IntoResponse` impl
/// is the single place domain errors become HTTP ones.
pub struct ApiError(HabitaError);

impl From<HabitaError> for ApiError {
    fn from(err: HabitaError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            HabitaError::Validation { message } | HabitaError::Conflict { message } => {
                (StatusCode::BAD_REQUEST, CODE_BAD_REQUEST, message.clone())
            }
            HabitaError::Identity(cause) if cause.is_rejection() => (
                StatusCode::BAD_REQUEST,
                CODE_BAD_REQUEST,
                rejection_message(cause).to_string(),
            ),
            other => {
                error!(error = %other, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    CODE_INTERNAL,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(MessageResponse { code, message })).into_response()
    }
}

/// Caller-facing text for each identity rejection. Kept out of the
/// error display impls so logs retain the domain wording.
fn rejection_message(cause: &IdentityError) -> &'static str {
    match cause {
        IdentityError::PrincipalExists => "email already registered",
        IdentityError::CodeMismatch => "invalid confirmation code",
        IdentityError::CodeExpired => "confirmation code expired",
        IdentityError::AlreadyConfirmed => "user already confirmed",
        IdentityError::NotAuthorized => "incorrect email or password",
        IdentityError::NotConfirmed => "user not confirmed, confirm first",
        IdentityError::PrincipalNotFound => "user not found",
        IdentityError::RateLimited => "too many requests, try again later",
        IdentityError::Provider(_) => "internal error",
    }
}

pub async fn signup<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Json(body): Json<SignUpRequest>,
) -> Result<Json<MessageResponse>, ApiError>
where
    C: Connection,
    P: IdentityProvider,
{
    let service = SignUpService::new(
        state.user_types.clone(),
        state.users.clone(),
        state.person_profiles.clone(),
        state.org_profiles.clone(),
        state.documents.clone(),
        state.document_types.clone(),
        state.roles.clone(),
        state.user_roles.clone(),
        state.identity.clone(),
    );
    let output = service
        .execute(SignUpInput {
            user_type_id: body.user_type_id,
            email: body.email,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            birth_date: body.birth_date,
            org_name: body.org_name,
            document: SignUpDocument {
                document_type_id: body.document.document_type_id,
                document_number: body.document.document_number,
                dv: body.document.dv,
            },
        })
        .await?;
    Ok(Json(MessageResponse {
        code: CODE_OK,
        message: output.message.to_string(),
    }))
}

pub async fn confirm<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    Json(body): Json<ConfirmRequest>,
) -> Result<Json<MessageResponse>, ApiError>
where
    C: Connection,
    P: IdentityProvider,
{
    let service = ConfirmSignUpService::new(
        state.users.clone(),
        state.org_profiles.clone(),
        state.join_codes.clone(),
        state.identity.clone(),
    );
    let output = service
        .execute(ConfirmSignUpInput {
            email: body.email,
            code: body.code,
            flow: body.flow,
            user_type_id: body.user_type_id,
        })
        .await?;
    Ok(Json(MessageResponse {
        code: CODE_OK,
        message: output.message.to_string(),
    }))
}

pub async fn signin<C, P>(
    State(state): State<Arc<AppState<C, P>>>,
    headers: HeaderMap,
    Json(body): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, ApiError>
where
    C: Connection,
    P: IdentityProvider,
{
    let service = SignInService::new(
        state.users.clone(),
        state.sessions.clone(),
        state.identity.clone(),
    );
    let output = service
        .execute(SignInInput {
            email: body.email,
            password: body.password,
            context: request_context(&headers),
        })
        .await?;
    Ok(Json(SignInResponse {
        code: CODE_OK,
        data: TokenData {
            access_token: output.access_token,
            refresh_token: output.refresh_token,
            id_token: output.id_token,
            expiration: output.expiration,
        },
    }))
}
