//! Request handlers, one submodule per resource.
//!
//! Handlers delegate to the repositories in `docvault_db`, apply the rules in
//! `docvault_core`, and map errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod auth;
pub mod categories;
pub mod clients;
pub mod documents;
pub mod multipart;
pub mod pdf_split;
pub mod vendors;
