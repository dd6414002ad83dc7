//! Core persistence and use-case logic for the item catalog.
//! This crate is the single source of truth for catalog invariants.

pub mod blob;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use blob::{
    content_address, BlobError, BlobResult, FetchedImage, FsImageStore, ImageStore,
    MemoryImageStore,
};
pub use config::CatalogConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::category::{Category, CategoryId};
pub use model::item::{Item, ItemId, ItemSummary, ItemValidationError, NewItem};
pub use repo::category_registry::resolve_or_create_category;
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use service::catalog_service::CatalogService;
pub use service::error::{ServiceError, ServiceResult};
pub use service::item_query_service::ItemQueryService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
