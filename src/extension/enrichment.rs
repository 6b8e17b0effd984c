//! Cover enrichment
//!
//! A manga fetched from the catalogue only names its cover by id. Enrichment
//! looks the cover up and attaches its filename. A failed lookup leaves the
//! manga as it was: enrichment never turns a successful fetch into an error.

use futures::future::join_all;

use crate::api::models::{Cover, Entity, Manga};
use crate::api::ApiGateway;
use crate::core::error::Result;

/// Result-with-fallback combinator
///
/// Makes "attempt, on error substitute a default" explicit at call sites.
pub trait Fallback<T> {
    /// Substitute `fallback` on error, logging what was lost
    fn or_fallback(self, context: &str, fallback: T) -> T;

    fn or_fallback_default(self, context: &str) -> T
    where
        T: Default,
        Self: Sized,
    {
        self.or_fallback(context, T::default())
    }
}

impl<T> Fallback<T> for Result<T> {
    fn or_fallback(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    error_type = e.error_type(),
                    error = %e,
                    "{} failed, using fallback",
                    context
                );
                fallback
            }
        }
    }
}

/// Filename of a cover resource, if the catalogue reports one
pub async fn fetch_cover_file_name(gateway: &ApiGateway, cover_id: &str) -> Result<Option<String>> {
    let cover: Entity<Cover> = gateway.get(&format!("/cover/{}", cover_id), None).await?;
    Ok(cover.data.and_then(|cover| cover.attributes.file_name))
}

/// Attach the cover filename to a manga
///
/// Returns the input unchanged when it has no `cover_art` relationship or the
/// lookup fails.
pub async fn enrich(gateway: &ApiGateway, manga: Manga) -> Manga {
    let Some(cover) = manga.cover_relationship() else {
        return manga;
    };

    let lookup = fetch_cover_file_name(gateway, &cover.id)
        .await
        .map(|file_name| manga.with_cover_file_name(file_name));

    lookup.or_fallback(&format!("Cover lookup for manga {}", manga.id), manga)
}

/// Enrich every manga concurrently, keeping the input order
pub async fn enrich_all(gateway: &ApiGateway, list: Vec<Manga>) -> Vec<Manga> {
    join_all(list.into_iter().map(|manga| enrich(gateway, manga))).await
}
