//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`scope::ScopedUser`] -- Authenticated user plus the client records they may see.

pub mod auth;
pub mod rbac;
pub mod scope;
