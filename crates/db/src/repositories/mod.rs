//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. [`ClientRepo`], [`SegmentRepo`] and
//! [`VendorRepo`] read from the legacy pool; the others use the primary pool.

pub mod category_repo;
pub mod client_repo;
pub mod document_repo;
pub mod role_repo;
pub mod segment_repo;
pub mod session_repo;
pub mod user_repo;
pub mod vendor_repo;

pub use category_repo::CategoryRepo;
pub use client_repo::ClientRepo;
pub use document_repo::DocumentRepo;
pub use role_repo::RoleRepo;
pub use segment_repo::SegmentRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
pub use vendor_repo::VendorRepo;
