//! Category domain model.
//!
//! # Invariants
//! - `name` is unique across all categories.
//! - Once created, `(id, name)` is immutable.

use serde::{Deserialize, Serialize};

/// Storage-assigned category identifier.
pub type CategoryId = i64;

/// Normalized label referenced many-to-one by items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}
