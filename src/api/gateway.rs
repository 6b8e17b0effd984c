//! Rate-limited request path to the catalogue API

use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::query::{append_suffix, build_url, QueryParams};
use super::rate_limit::RateLimitGuard;
use super::transport::HttpTransport;
use crate::core::error::{ExtensionError, Result};

const TOO_MANY_REQUESTS: u16 = 429;

/// Single entry point for catalogue requests
///
/// Applies the rate-limit gate before any I/O, classifies the response
/// status and decodes the JSON body into the requested record.
#[derive(Clone)]
pub struct ApiGateway {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    rate_limit: RateLimitGuard,
}

impl ApiGateway {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        rate_limit: RateLimitGuard,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            transport,
            rate_limit,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rate_limit(&self) -> &RateLimitGuard {
        &self.rate_limit
    }

    /// GET `endpoint` with `params`, then append the raw `url_suffix`
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: Option<&QueryParams>,
        url_suffix: &str,
    ) -> Result<T> {
        self.rate_limit.check()?;

        let url = append_suffix(&build_url(&self.base_url, endpoint, params), url_suffix);
        tracing::debug!(url = %url, "Calling catalogue API");

        let response = self.transport.get(&url).await?;

        if response.status == TOO_MANY_REQUESTS {
            self.rate_limit.trip();
            return Err(ExtensionError::RateLimited);
        }

        if !response.is_success() {
            tracing::warn!(url = %url, status = response.status, "Catalogue API returned an error status");
            return Err(ExtensionError::ApiError(response.status));
        }

        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Shorthand for a call without a suffix
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, params: Option<&QueryParams>) -> Result<T> {
        self.call(endpoint, params, "").await
    }
}
