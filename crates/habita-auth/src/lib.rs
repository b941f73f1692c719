//! Habita Auth — signup, confirmation, and sign-in orchestration.
//!
//! Each use case is a self-contained service generic over the
//! `habita-core` repository and identity-provider traits, so this crate
//! has no dependency on the database or wire-client crates. A use case
//! executes one request-scoped chain: validate, then side effects, then
//! response; nothing is retried automatically.

pub mod confirm;
mod details;
mod join_code;
pub mod roles;
pub mod signin;
pub mod signup;

pub use confirm::{ConfirmSignUpInput, ConfirmSignUpOutput, ConfirmSignUpService};
pub use signin::{RequestContext, SignInInput, SignInOutput, SignInService};
pub use signup::{SignUpDocument, SignUpInput, SignUpOutput, SignUpService};
