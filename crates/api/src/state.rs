use std::sync::Arc;

use docvault_core::storage::StorageDisk;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: pools are reference-counted and the rest sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Primary database (users, categories, documents).
    pub pool: docvault_db::DbPool,
    /// Read-only legacy database (clients, vendors, segments).
    pub legacy_pool: docvault_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// File storage disk for documents and split temp files.
    pub storage: Arc<dyn StorageDisk>,
}
