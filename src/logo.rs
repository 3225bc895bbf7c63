//! Logo lookup: a caller-supplied URL first, then the bundled asset.
//!
//! The result is a `data:` URI so the composed document carries the logo
//! inline and the browser never has to fetch it.

use std::path::Path;

use base64::Engine as Base64Engine;
use log::warn;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::config::LogoConfig;
use crate::{Error, Result};

/// Bundled logo candidates, in lookup order
const BUNDLED_LOGOS: [(&str, &str); 2] = [("logo.png", "png"), ("logo.webp", "webp")];

/// Resolves logos into embeddable data URIs
#[derive(Clone)]
pub struct LogoResolver {
    http: Client,
    config: LogoConfig,
}

impl LogoResolver {
    pub fn new(http: Client, config: LogoConfig) -> Self {
        Self { http, config }
    }

    /// Return a data URI for the logo, or `None` when it should be omitted.
    ///
    /// Never fails: download and disk errors fall through to the next source.
    pub async fn resolve(&self, logo_url: Option<&str>, show_logo: bool) -> Option<String> {
        if !show_logo {
            return None;
        }

        if let Some(url) = logo_url.filter(|u| !u.trim().is_empty()) {
            match self.download(url).await {
                Ok(uri) => return Some(uri),
                Err(e) => warn!("logo download from {} failed, using bundled logo: {}", url, e),
            }
        }

        match load_bundled(&self.config.asset_dir).await {
            Ok(found) => found,
            Err(e) => {
                warn!("failed to read bundled logo: {}", e);
                None
            }
        }
    }

    async fn download(&self, url: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await?
            .error_for_status()?;

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::NetworkError("logo response body was empty".into()));
        }

        let ext = infer_extension(url, content_type.as_deref());
        Ok(data_uri(ext, &bytes))
    }
}

/// Image extension from the URL suffix, then the content type, else `png`.
pub fn infer_extension(url: &str, content_type: Option<&str>) -> &'static str {
    let lower = url.to_ascii_lowercase();
    if lower.ends_with(".webp") || lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        if let Some(idx) = lower.rfind('.') {
            return match &lower[idx + 1..] {
                "webp" => "webp",
                "jpg" => "jpg",
                _ => "jpeg",
            };
        }
    }
    if let Some(ct) = content_type.map(str::to_ascii_lowercase) {
        if ct.contains("webp") {
            return "webp";
        }
        if ct.contains("jpeg") || ct.contains("jpg") {
            return "jpg";
        }
    }
    "png"
}

/// `data:image/<ext>;base64,<payload>`
pub fn data_uri(ext: &str, bytes: &[u8]) -> String {
    let b64 = Base64Engine::encode(&base64::engine::general_purpose::STANDARD, bytes);
    format!("data:image/{};base64,{}", ext, b64)
}

async fn load_bundled(dir: &Path) -> Result<Option<String>> {
    for (name, ext) in BUNDLED_LOGOS {
        let path = dir.join(name);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            continue;
        }
        let bytes = tokio::fs::read(&path).await?;
        return Ok(Some(data_uri(ext, &bytes)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_url_suffix() {
        assert_eq!(infer_extension("https://cdn.example/logo.WEBP", None), "webp");
        assert_eq!(infer_extension("https://cdn.example/logo.jpg", Some("image/png")), "jpg");
        assert_eq!(infer_extension("https://cdn.example/logo.jpeg", None), "jpeg");
    }

    #[test]
    fn extension_from_content_type() {
        assert_eq!(infer_extension("https://cdn.example/logo?id=3", Some("image/webp")), "webp");
        assert_eq!(infer_extension("https://cdn.example/logo", Some("image/jpeg")), "jpg");
        assert_eq!(infer_extension("https://cdn.example/logo", Some("image/svg+xml")), "png");
        assert_eq!(infer_extension("https://cdn.example/logo", None), "png");
    }

    #[test]
    fn data_uri_is_standard_base64() {
        assert_eq!(data_uri("png", b"hi?"), "data:image/png;base64,aGk/");
    }
}
