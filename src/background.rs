//! Background photo lookup against the Pexels search API.
//!
//! Every failure here is degraded-but-continue: callers get an empty result
//! and substitute the fallback background.

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::PhotoSearchConfig;
use crate::{Error, Result};

/// A resolved background photo plus its attribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    /// Image URL embedded in the template
    pub url: String,
    pub photographer: String,
    pub photographer_url: String,
    /// Photo page on the provider's site
    pub source_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    url: String,
    photographer: String,
    photographer_url: String,
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large: String,
}

impl From<Photo> for BackgroundImage {
    fn from(p: Photo) -> Self {
        Self {
            url: p.src.large,
            photographer: p.photographer,
            photographer_url: p.photographer_url,
            source_url: p.url,
        }
    }
}

/// Thin client over the photo search endpoint
#[derive(Clone)]
pub struct PexelsClient {
    http: Client,
    config: PhotoSearchConfig,
}

impl PexelsClient {
    pub fn new(http: Client, config: PhotoSearchConfig) -> Self {
        Self { http, config }
    }

    /// Search landscape photos for `query`, surfacing every failure.
    pub async fn try_search(&self, query: &str) -> Result<Vec<BackgroundImage>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::ConfigError("no photo search API key configured".into()))?;

        let per_page = self.config.per_page.to_string();
        let res = self
            .http
            .get(&self.config.api_url)
            .query(&[
                ("query", query),
                ("orientation", "landscape"),
                ("per_page", per_page.as_str()),
            ])
            .header("Authorization", api_key)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::NetworkError(format!(
                "photo search rejected the API key (401): {}",
                truncate(&body, 200)
            )));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(Error::NetworkError(format!(
                "photo search returned {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        let parsed: SearchResponse = res
            .json()
            .await
            .map_err(|e| Error::NetworkError(format!("malformed photo search response: {}", e)))?;
        Ok(parsed.photos.into_iter().map(BackgroundImage::from).collect())
    }

    /// Best-effort search: one photo drawn uniformly from the results, or
    /// `None` (logged) on any failure.
    pub async fn search<R: Rng + Send + ?Sized>(&self, query: &str, rng: &mut R) -> Option<BackgroundImage> {
        if self.config.api_key.is_none() {
            debug!("photo search skipped: no API key configured");
            return None;
        }
        match self.try_search(query).await {
            Ok(photos) => {
                let chosen = pick_photo(&photos, rng);
                if chosen.is_none() {
                    warn!("photo search for {:?} returned no results", query);
                }
                chosen
            }
            Err(e) => {
                warn!("photo search for {:?} failed: {}", query, e);
                None
            }
        }
    }
}

/// Background URL for `theme`, substituting `fallback` when the search yields nothing.
pub async fn resolve_background_url<R: Rng + Send + ?Sized>(
    client: &PexelsClient,
    theme: &str,
    fallback: &str,
    rng: &mut R,
) -> String {
    let chosen = client.search(theme, rng).await;
    if let Some(photo) = &chosen {
        info!("background by {} ({})", photo.photographer, photo.source_url);
    }
    background_url_or(chosen.as_ref(), fallback)
}

/// Pick one candidate uniformly at random.
pub fn pick_photo<R: Rng + ?Sized>(photos: &[BackgroundImage], rng: &mut R) -> Option<BackgroundImage> {
    photos.choose(rng).cloned()
}

/// URL of the chosen photo, or `fallback` when there is none.
fn background_url_or(chosen: Option<&BackgroundImage>, fallback: &str) -> String {
    chosen.map(|b| b.url.clone()).unwrap_or_else(|| fallback.to_string())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
