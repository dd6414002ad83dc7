//! Catalog use-case service.
//!
//! # Responsibility
//! - Accept item submissions: store the image, then persist the item.
//! - Expose the read paths and image serving to outer layers.
//!
//! # Invariants
//! - The repository and image store are injected; no process-wide handle.
//! - Image bytes never reach the repository, only their content address.
//! - A blob stored for a submission whose item insert then fails is left
//!   in place; it is content-addressed and reused by the next identical
//!   upload.

use crate::blob::{FetchedImage, ImageStore};
use crate::model::category::Category;
use crate::model::item::{Item, ItemId, ItemSummary, NewItem};
use crate::repo::item_repo::ItemRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::item_query_service::ItemQueryService;
use crate::logging::sanitize_message;
use log::info;

const MAX_LOGGED_FIELD_CHARS: usize = 64;

/// Catalog facade over an item repository and an image store.
pub struct CatalogService<R: ItemRepository, S: ImageStore> {
    repo: R,
    images: S,
}

impl<R: ItemRepository, S: ImageStore> CatalogService<R, S> {
    /// Creates a service from its storage collaborators.
    pub fn new(repo: R, images: S) -> Self {
        Self { repo, images }
    }

    /// Borrows the read-side facade.
    pub fn queries(&self) -> ItemQueryService<&R> {
        ItemQueryService::new(&self.repo)
    }

    /// Stores the image and creates the item referencing it.
    ///
    /// # Contract
    /// - `image = None` is a validation error; nothing is written.
    /// - Text fields are validated before the image is stored.
    /// - Returns the storage-assigned item id.
    pub fn submit_item(
        &self,
        name: &str,
        category: &str,
        image: Option<&[u8]>,
    ) -> ServiceResult<ItemId> {
        info!(
            "event=item_submit module=service status=start {}",
            submission_log_fields(name, category)
        );

        let Some(image) = image else {
            return Err(ServiceError::Validation(
                "image payload is required".to_string(),
            ));
        };

        let mut item = NewItem::new(name, category, None);
        item.validate()
            .map_err(|err| ServiceError::Validation(err.to_string()))?;

        let image_ref = self
            .images
            .put(image)
            .map_err(|err| ServiceError::from(err).log_server_fault("item_submit"))?;
        item.image_ref = Some(image_ref);

        let id = self
            .repo
            .create_item(&item)
            .map_err(|err| ServiceError::from(err).log_server_fault("item_submit"))?;

        info!("event=item_submit module=service status=ok item_id={id}");
        Ok(id)
    }

    pub fn get_item(&self, id: ItemId) -> ServiceResult<Item> {
        self.queries().get_item(id)
    }

    pub fn list_items(&self) -> ServiceResult<Vec<ItemSummary>> {
        self.queries().list_items()
    }

    pub fn search_items(&self, keyword: &str) -> ServiceResult<Vec<ItemSummary>> {
        self.queries().search_items(keyword)
    }

    pub fn list_categories(&self) -> ServiceResult<Vec<Category>> {
        self.queries().list_categories()
    }

    /// Loads image bytes for `reference`.
    ///
    /// Missing blobs resolve to the placeholder (`FetchedImage::placeholder`);
    /// only malformed references or I/O failures are errors.
    pub fn get_image(&self, reference: &str) -> ServiceResult<FetchedImage> {
        self.images
            .get(reference)
            .map_err(|err| ServiceError::from(err).log_server_fault("image_get"))
    }
}

/// Renders caller-supplied text as quoted, single-line, bounded log values.
fn submission_log_fields(name: &str, category: &str) -> String {
    format!(
        "name={:?} category={:?}",
        sanitize_message(name, MAX_LOGGED_FIELD_CHARS),
        sanitize_message(category, MAX_LOGGED_FIELD_CHARS)
    )
}
