//! # Showdeck Common Library
//!
//! Shared code for the Showdeck page orchestration crates:
//! - Archive document data model and JSON schema
//! - Year grouping for archive lists
//! - UI lifecycle event types (UiEvent enum)
//! - Site configuration loading
//! - Common error taxonomy

pub mod config;
pub mod error;
pub mod events;
pub mod groups;
pub mod model;

pub use error::{Error, Result};
pub use model::{ArchiveDocument, ArchiveItem, MediaKind, Platform};
