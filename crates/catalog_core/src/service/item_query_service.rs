//! Read-side use-cases over an item repository.
//!
//! # Invariants
//! - Read paths fail closed: repository errors are returned, never masked.
//! - The list/search projection omits the image reference.

use crate::model::category::Category;
use crate::model::item::{Item, ItemId, ItemSummary};
use crate::repo::item_repo::ItemRepository;
use crate::service::error::{ServiceError, ServiceResult};

/// Query facade for by-id, list and search reads.
pub struct ItemQueryService<R: ItemRepository> {
    repo: R,
}

impl<R: ItemRepository> ItemQueryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Gets one item with its category name and image reference.
    pub fn get_item(&self, id: ItemId) -> ServiceResult<Item> {
        self.repo
            .get_item(id)
            .map_err(|err| ServiceError::from(err).log_server_fault("item_get"))
    }

    /// Lists every item in insertion order.
    pub fn list_items(&self) -> ServiceResult<Vec<ItemSummary>> {
        self.repo
            .list_items()
            .map_err(|err| ServiceError::from(err).log_server_fault("item_list"))
    }

    /// Lists items whose name contains `keyword` (ASCII case-insensitive).
    ///
    /// An empty keyword matches every item.
    pub fn search_items(&self, keyword: &str) -> ServiceResult<Vec<ItemSummary>> {
        self.repo
            .search_items(keyword)
            .map_err(|err| ServiceError::from(err).log_server_fault("item_search"))
    }

    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        self.repo
            .list_categories()
            .map_err(|err| ServiceError::from(err).log_server_fault("category_list"))
    }
}
