//! Extension layer
//!
//! This module provides the host-facing side of the crate:
//! - The `Extension` trait and its option records
//! - Cover enrichment and the fallback combinator
//! - The MangaDex implementation

pub mod enrichment;
pub mod mangadex;
pub mod types;

pub use enrichment::{enrich, enrich_all, Fallback};
pub use mangadex::MangaDexExtension;
pub use types::{
    ChapterOptions, ContentRating, Extension, ExplorerOptions, ExplorerSections, ExtensionMetadata,
    SearchOptions, SortDirection, SortOrder,
};
