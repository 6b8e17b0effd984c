//! MangaDex Extension Library
//!
//! This library exposes the MangaDex catalogue's public REST API through a
//! uniform extension interface, with a client-side rate-limit guard and cover
//! enrichment of search results.

pub mod api;
pub mod core;
pub mod extension;

// Re-export commonly used types
pub use api::{ApiGateway, RateLimitGuard};
pub use crate::core::{Config, ExtensionError};
pub use extension::{Extension, MangaDexExtension};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = crate::core::error::Result<T>;
