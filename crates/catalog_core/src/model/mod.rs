//! Catalog domain model.
//!
//! # Responsibility
//! - Define canonical records for categories and items.
//! - Keep input validation next to the shapes it guards.
//!
//! # Invariants
//! - Category and item ids are assigned by storage and never reused.
//! - Records are created once and never updated by core.

pub mod category;
pub mod item;
