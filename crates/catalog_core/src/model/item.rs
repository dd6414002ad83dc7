//! Item domain model.
//!
//! # Responsibility
//! - Define the write shape (`NewItem`) and both read projections
//!   (`Item` for by-id lookups, `ItemSummary` for list/search).
//!
//! # Invariants
//! - An item always references an existing category at commit time.
//! - `image_ref` is either a content address produced by the image store
//!   or absent; the bytes themselves never live on the item.

use crate::blob::is_content_address;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned item identifier.
pub type ItemId = i64;

/// Input for item creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    /// Category label; resolved to an id (or created) at insert time.
    pub category: String,
    pub image_ref: Option<String>,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        image_ref: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            image_ref,
        }
    }

    /// Validates input before any storage mutation happens.
    ///
    /// # Errors
    /// - `EmptyName` / `EmptyCategory` for blank text fields.
    /// - `InvalidImageRef` when `image_ref` is not a content address.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.name.trim().is_empty() {
            return Err(ItemValidationError::EmptyName);
        }
        if self.category.trim().is_empty() {
            return Err(ItemValidationError::EmptyCategory);
        }
        if let Some(image_ref) = self.image_ref.as_deref() {
            if !is_content_address(image_ref) {
                return Err(ItemValidationError::InvalidImageRef(image_ref.to_string()));
            }
        }
        Ok(())
    }
}

/// Materialized by-id view: item joined with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    #[serde(rename = "image_name")]
    pub image_ref: Option<String>,
}

/// List/search projection. The image reference is only exposed by-id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub name: String,
    pub category: String,
}

impl From<Item> for ItemSummary {
    fn from(value: Item) -> Self {
        Self {
            name: value.name,
            category: value.category,
        }
    }
}

/// Input validation failures for item writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    EmptyName,
    EmptyCategory,
    InvalidImageRef(String),
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "item name must not be empty"),
            Self::EmptyCategory => write!(f, "item category must not be empty"),
            Self::InvalidImageRef(value) => {
                write!(f, "item image reference is not a content address: {value}")
            }
        }
    }
}

impl Error for ItemValidationError {}
