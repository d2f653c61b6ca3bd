//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! [`legacy`] holds the read-only rows of the legacy reference database.

pub mod category;
pub mod document;
pub mod legacy;
pub mod role;
pub mod session;
pub mod user;
