//! Giphy search for subtitle-theme GIF enrichment.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::config::GiphyConfig;

const SEARCH_URL: &str = "https://api.giphy.com/v1/gifs/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<GifRecord>,
}

#[derive(Debug, Deserialize)]
struct GifRecord {
    images: GifImages,
}

#[derive(Debug, Deserialize)]
struct GifImages {
    original: GifRendition,
}

#[derive(Debug, Deserialize)]
struct GifRendition {
    url: String,
}

/// Giphy search API client
#[derive(Clone)]
pub struct GiphyClient {
    client: Client,
    api_key: String,
}

impl GiphyClient {
    /// Create a client from configuration; the API key comes from the config
    /// or the GIPHY_API_KEY environment variable.
    pub fn new(config: &GiphyConfig) -> Result<Self> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| anyhow!("No Giphy API key configured (set giphy.api_key or GIPHY_API_KEY)"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self { client, api_key })
    }

    /// Search for GIFs and return the original-rendition URLs.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        info!("🔍 Searching Giphy for: {}", query);

        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("q", query),
                ("api_key", &self.api_key),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .context("Giphy search request failed")?
            .error_for_status()
            .context("Giphy search returned an error status")?;

        let search: SearchResponse = response
            .json()
            .await
            .context("Unexpected Giphy response shape")?;

        Ok(search.data.into_iter().map(|gif| gif.images.original.url).collect())
    }

    /// Download a GIF URL into `output_dir`, named after its position.
    pub async fn download(&self, url: &str, output_dir: &Path, index: usize) -> Result<PathBuf> {
        tokio::fs::create_dir_all(output_dir).await?;
        let dest = output_dir.join(format!("gif_{:03}.gif", index));

        let bytes = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()?
            .bytes()
            .await?;

        tokio::fs::write(&dest, &bytes).await?;
        info!("⬇️ Saved {} ({} bytes)", dest.display(), bytes.len());
        Ok(dest)
    }
}
