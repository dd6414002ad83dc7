//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and image store calls into use-case level APIs.
//! - Keep outer layers (HTTP, CLI) decoupled from storage details.

pub mod catalog_service;
pub mod error;
pub mod item_query_service;
