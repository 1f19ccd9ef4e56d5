//! Request extractors.
//!
//! - [`auth::AuthUser`] -- Resolves the authenticated wallet from a JWT Bearer token.

pub mod auth;
