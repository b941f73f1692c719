//! HTTP adapter and composition root for Habita.
//!
//! Three POST routes (`/signup`, `/confirm`, `/signin`) over the
//! use-case services. Handlers receive already-decoded JSON bodies;
//! error mapping to the `{code, message|data}` envelope lives in
//! [`handlers::ApiError`].

pub mod config;
pub mod context;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::post;
use habita_core::identity::IdentityProvider;
use habita_db::repository::{
    SurrealAgencyJoinCodeRepository, SurrealDocumentRepository, SurrealDocumentTypeRepository,
    SurrealOrgProfileRepository, SurrealPersonProfileRepository, SurrealRoleRepository,
    SurrealSessionRepository, SurrealUserRepository, SurrealUserRoleRepository,
    SurrealUserTypeRepository,
};
use surrealdb::{Connection, Surreal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
///
/// Holds one repository per entity (cheap clones of the same database
/// handle) and the shared identity gateway. Handlers assemble the
/// request-scoped use-case services from these.
pub struct AppState<C: Connection, P> {
    pub user_types: SurrealUserTypeRepository<C>,
    pub users: SurrealUserRepository<C>,
    pub person_profiles: SurrealPersonProfileRepository<C>,
    pub org_profiles: SurrealOrgProfileRepository<C>,
    pub documents: SurrealDocumentRepository<C>,
    pub document_types: SurrealDocumentTypeRepository<C>,
    pub roles: SurrealRoleRepository<C>,
    pub user_roles: SurrealUserRoleRepository<C>,
    pub sessions: SurrealSessionRepository<C>,
    pub join_codes: SurrealAgencyJoinCodeRepository<C>,
    pub identity: Arc<P>,
}

impl<C: Connection, P> AppState<C, P> {
    pub fn new(db: Surreal<C>, identity: Arc<P>) -> Self {
        Self {
            user_types: SurrealUserTypeRepository::new(db.clone()),
            users: SurrealUserRepository::new(db.clone()),
            person_profiles: SurrealPersonProfileRepository::new(db.clone()),
            org_profiles: SurrealOrgProfileRepository::new(db.clone()),
            documents: SurrealDocumentRepository::new(db.clone()),
            document_types: SurrealDocumentTypeRepository::new(db.clone()),
            roles: SurrealRoleRepository::new(db.clone()),
            user_roles: SurrealUserRoleRepository::new(db.clone()),
            sessions: SurrealSessionRepository::new(db.clone()),
            join_codes: SurrealAgencyJoinCodeRepository::new(db),
            identity,
        }
    }
}

/// Build the router with the three auth routes, CORS, and request
/// tracing.
///
/// `cors_origins` is the allow-list; `None` allows any origin
/// (development default).
pub fn build_router<C, P>(
    state: Arc<AppState<C, P>>,
    cors_origins: Option<Vec<String>>,
) -> Router
where
    C: Connection,
    P: IdentityProvider + 'static,
{
    let cors = match cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_methods(Any)
                .allow_headers(Any)
                .allow_origin(origins)
        }
        None => CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .allow_origin(Any),
    };

    Router::new()
        .route("/signup", post(handlers::signup::<C, P>))
        .route("/confirm", post(handlers::confirm::<C, P>))
        .route("/signin", post(handlers::signin::<C, P>))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
