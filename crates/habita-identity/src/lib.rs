//! Habita Identity — gateway to the external managed identity provider.
//!
//! Implements the [`habita_core::identity::IdentityProvider`] trait over
//! the provider's Cognito-compatible JSON wire protocol. The client-side
//! operations used here (sign-up, confirm, resend code, password auth)
//! are unauthenticated apart from the app client id, so no request
//! signing is involved.
//!
//! Also provides [`StubIdentityProvider`] for integration tests.

mod client;
mod config;
mod stub;

pub use client::CognitoIdentityProvider;
pub use config::IdentityConfig;
pub use stub::StubIdentityProvider;
