//! MangaDex implementation of the extension interface

use async_trait::async_trait;
use std::sync::Arc;

use super::enrichment::{enrich, enrich_all, Fallback};
use super::types::{
    ChapterOptions, ContentRating, Extension, ExplorerOptions, ExplorerSections, ExtensionMetadata,
    SearchOptions, SortDirection, SortOrder,
};
use crate::api::models::{AtHomeServer, Chapter, Collection, Entity, Manga, COVER_ART};
use crate::api::query::QueryParams;
use crate::api::rate_limit::RateLimitGuard;
use crate::api::transport::ReqwestTransport;
use crate::api::ApiGateway;
use crate::core::config::ApiConfig;
use crate::core::error::Result;

pub const EXTENSION_ID: &str = "mangadex-extension";
pub const EXTENSION_NAME: &str = "Mangadex";
pub const EXTENSION_VERSION: &str = "1.0.0";

pub struct MangaDexExtension {
    metadata: ExtensionMetadata,
    gateway: ApiGateway,
}

impl MangaDexExtension {
    pub fn new(gateway: ApiGateway) -> Self {
        Self {
            metadata: ExtensionMetadata {
                id: EXTENSION_ID.to_string(),
                name: EXTENSION_NAME.to_string(),
                version: EXTENSION_VERSION.to_string(),
            },
            gateway,
        }
    }

    /// Build the extension over a `reqwest` transport
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        let rate_limit = RateLimitGuard::new(config.cooldown());

        Ok(Self::new(ApiGateway::new(
            config.trimmed_base_url(),
            transport,
            rate_limit,
        )))
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    fn search_params(query: &str, options: &SearchOptions) -> QueryParams {
        let ratings = ContentRating::filter(options.mature_content)
            .iter()
            .map(ContentRating::as_str);

        QueryParams::new()
            .scalar("title", query)
            .scalar("limit", options.limit)
            .object("order", options.order.to_nested())
            .array("contentRating", ratings)
            .array("includes", [COVER_ART])
    }

    fn feed_params(options: &ChapterOptions) -> QueryParams {
        QueryParams::new()
            .array("translatedLanguage", [options.language.as_str()])
            .object("order", SortOrder::by("chapter", SortDirection::Asc).to_nested())
            .scalar("limit", options.limit)
            .scalar("offset", options.offset())
    }

    /// `?_=<epoch ms>` so intermediaries never serve a stale search page
    fn cache_buster(&self) -> String {
        format!("?_={}", self.gateway.rate_limit().clock().now_ms())
    }
}

#[async_trait]
impl Extension for MangaDexExtension {
    fn metadata(&self) -> &ExtensionMetadata {
        &self.metadata
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<Manga>> {
        let params = Self::search_params(query, options);
        let list: Collection<Manga> = self
            .gateway
            .call("/manga", Some(&params), &self.cache_buster())
            .await?;

        tracing::debug!(query = %query, results = list.data.len(), "Search completed");

        Ok(enrich_all(&self.gateway, list.data).await)
    }

    async fn explorer(&self, options: &ExplorerOptions) -> ExplorerSections {
        let latest_options = SearchOptions {
            limit: options.limit,
            mature_content: options.mature_content,
            order: SortOrder::latest_uploaded_chapter(),
        };
        let followed_options = SearchOptions {
            order: SortOrder::followed_count(),
            ..latest_options.clone()
        };

        let (latest, most_followed) = tokio::join!(
            self.search("", &latest_options),
            self.search("", &followed_options),
        );

        ExplorerSections {
            latest: latest.or_fallback_default("Latest manga query"),
            most_followed: most_followed.or_fallback_default("Most followed manga query"),
        }
    }

    async fn informations(&self, manga_id: &str) -> Result<Option<Manga>> {
        let params = QueryParams::new().array("includes", [COVER_ART]);
        let entity: Entity<Manga> = self
            .gateway
            .get(&format!("/manga/{}", manga_id), Some(&params))
            .await?;

        match entity.data {
            Some(manga) => Ok(Some(enrich(&self.gateway, manga).await)),
            None => Ok(None),
        }
    }

    async fn chapters(&self, manga_id: &str, options: &ChapterOptions) -> Result<Vec<Chapter>> {
        let params = Self::feed_params(options);
        let feed: Collection<Chapter> = self
            .gateway
            .get(&format!("/manga/{}/feed", manga_id), Some(&params))
            .await?;

        Ok(feed.data)
    }

    async fn reader(&self, chapter_id: &str) -> Result<Vec<String>> {
        let server: AtHomeServer = self
            .gateway
            .get(&format!("/at-home/server/{}", chapter_id), None)
            .await?;

        let pages = server.page_urls();
        if pages.is_empty() {
            tracing::info!(chapter_id = %chapter_id, "At-home server returned no usable pages");
        }
        Ok(pages)
    }

    fn is_api_rate_limited(&self) -> bool {
        self.gateway.rate_limit().is_limited()
    }
}
