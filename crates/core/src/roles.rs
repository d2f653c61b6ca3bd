//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000002_create_roles_table.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";
pub const ROLE_VENDOR: &str = "vendor";

/// All role names accepted when creating or updating users.
pub const ALL_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_STAFF, ROLE_VENDOR];
