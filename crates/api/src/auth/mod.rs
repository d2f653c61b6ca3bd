//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing, verification and length rules.
//! - [`jwt`] -- Access-token signing/validation and refresh-token helpers.

pub mod jwt;
pub mod password;
