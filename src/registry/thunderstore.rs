//! Thunderstore registry implementation.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};

use crate::error::ModError;
use crate::http::HttpClient;
use crate::runtime::Runtime;

use super::{PackageListing, Registry};

/// Registry API of the Lethal Company community.
pub const DEFAULT_API_URL: &str = "https://thunderstore.io/c/lethal-company/api/v1";

/// File the raw catalog response is dumped to.
pub const CATALOG_CACHE_FILE: &str = "full_modlist.json";

/// Thunderstore package registry.
pub struct ThunderstoreRegistry<'a, R: Runtime> {
    runtime: &'a R,
    http_client: HttpClient,
    api_url: String,
    cache_path: Option<PathBuf>,
}

impl<'a, R: Runtime> ThunderstoreRegistry<'a, R> {
    pub fn new(runtime: &'a R, http_client: HttpClient, api_url: &str) -> Self {
        Self {
            runtime,
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache_path: None,
        }
    }

    /// Dump every fetched catalog to `path`. The dump is never read back.
    pub fn with_cache_file(mut self, path: PathBuf) -> Self {
        self.cache_path = Some(path);
        self
    }

    fn write_cache(&self, body: &str) {
        if let Some(path) = &self.cache_path
            && let Err(e) = self.runtime.write(path, body.as_bytes())
        {
            warn!("Failed to write catalog cache {:?}: {}", path, e);
        }
    }
}

fn unavailable(url: &str, reason: impl ToString) -> anyhow::Error {
    ModError::RegistryUnavailable {
        url: url.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[async_trait]
impl<'a, R: Runtime> Registry for ThunderstoreRegistry<'a, R> {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch_catalog(&self) -> Result<Vec<PackageListing>> {
        let url = format!("{}/package/", self.api_url);
        debug!("Updating full mod list from {}...", url);

        let body = self
            .http_client
            .get_text(&url)
            .await
            .map_err(|e| unavailable(&url, e))?;
        self.write_cache(&body);

        let listings: Vec<PackageListing> =
            serde_json::from_str(&body).map_err(|e| unavailable(&url, e))?;
        debug!("Catalog contains {} package(s)", listings.len());
        Ok(listings)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn fetch_package(&self, uuid4: &str) -> Result<PackageListing> {
        let url = format!("{}/package/{}", self.api_url, uuid4);
        self.http_client
            .get_json(&url)
            .await
            .map_err(|e| unavailable(&url, e))
    }
}
