//! Domain rules for the document vault: errors, access scope, upload
//! validation, PDF-split temp files, pagination and the storage abstraction.

pub mod access;
pub mod documents;
pub mod error;
pub mod pagination;
pub mod pdf_split;
pub mod roles;
pub mod storage;
pub mod types;
