//! Habita Core — domain models, repository traits, and the identity
//! provider gateway contract.
//!
//! This crate has no dependency on any storage or HTTP SDK. The use-case
//! layer (`habita-auth`) depends only on the traits defined here, so both
//! persistence and the external identity provider can be swapped (or
//! stubbed in tests) without touching business logic.

pub mod error;
pub mod identity;
pub mod models;
pub mod repository;
pub mod validate;
