//! Service configuration, read once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::Viewport;

/// Public Pexels search endpoint
pub const DEFAULT_PEXELS_API_URL: &str = "https://api.pexels.com/v1/search";

/// Background used whenever the photo search yields nothing
pub const DEFAULT_BACKGROUND_IMAGE: &str =
    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=800&h=1200&fit=crop";

/// Header carrying the caller's API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Configuration for the whole service
///
/// The defaults are conservative: no API key is enforced, rate limiting is
/// on, and renders are bounded by a 30 second timeout.
///
/// # Examples
///
/// ```
/// let cfg = cardshot::ServiceConfig::default();
/// assert_eq!(cfg.render.output.width, 1280);
/// assert_eq!(cfg.render.output.height, 720);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub bind: SocketAddr,
    /// Photo search settings
    pub photos: PhotoSearchConfig,
    /// Logo lookup settings
    pub logo: LogoConfig,
    /// Renderer settings
    pub render: RenderConfig,
    /// Request boundary settings
    pub boundary: BoundaryConfig,
    /// URL substituted when the background lookup fails
    pub fallback_background: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            photos: PhotoSearchConfig::default(),
            logo: LogoConfig::default(),
            render: RenderConfig::default(),
            boundary: BoundaryConfig::default(),
            fallback_background: DEFAULT_BACKGROUND_IMAGE.to_string(),
        }
    }
}

/// Pexels client configuration
#[derive(Debug, Clone)]
pub struct PhotoSearchConfig {
    /// API credential; lookups are skipped when absent
    pub api_key: Option<String>,
    /// Search endpoint
    pub api_url: String,
    /// Number of candidates requested per search
    pub per_page: u32,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for PhotoSearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_PEXELS_API_URL.to_string(),
            per_page: 30,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogoConfig {
    /// Directory holding the bundled `logo.png` / `logo.webp`
    pub asset_dir: PathBuf,
    /// Download timeout for caller-supplied logo URLs
    pub timeout: Duration,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("."),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Area the template is authored against and captured at
    pub canvas: Viewport,
    /// Canonical size of every returned image
    pub output: Viewport,
    /// Upper bound for one full render (launch, load, capture, post-process)
    pub timeout: Duration,
    /// Extra delay after load for webfonts and the background photo
    pub settle: Duration,
    /// Explicit Chrome binary; auto-detected when `None`
    pub chrome_path: Option<PathBuf>,
    /// Where scratch HTML/PNG files are written
    pub scratch_dir: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas: crate::AUTHORING_CANVAS,
            output: crate::OUTPUT_SIZE,
            timeout: Duration::from_secs(30),
            settle: Duration::from_millis(500),
            chrome_path: None,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl RenderConfig {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Optional boundary concerns in front of the pipeline
#[derive(Debug, Clone)]
pub struct BoundaryConfig {
    /// Required value of the `X-API-Key` header, if any
    pub api_key: Option<String>,
    /// CORS allow-list
    pub allowed_origins: Vec<String>,
    pub rate_limit_enabled: bool,
    pub rate_limit_per_minute: u32,
    pub rate_limit_per_hour: u32,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:8080".to_string(),
                "http://localhost:8000".to_string(),
                "http://localhost:8001".to_string(),
            ],
            rate_limit_enabled: true,
            rate_limit_per_minute: 60,
            rate_limit_per_hour: 1000,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServiceConfig {
    /// Reject settings the pipeline cannot honour.
    pub fn validate(&self) -> crate::Result<()> {
        let r = &self.render;
        if r.canvas.width == 0 || r.canvas.height == 0 || r.output.width == 0 || r.output.height == 0 {
            return Err(crate::Error::ConfigError("viewport dimensions must be non-zero".into()));
        }
        if r.timeout.is_zero() {
            return Err(crate::Error::ConfigError("render timeout must be positive".into()));
        }
        if self.boundary.rate_limit_enabled
            && (self.boundary.rate_limit_per_minute == 0 || self.boundary.rate_limit_per_hour == 0)
        {
            return Err(crate::Error::ConfigError(
                "rate limits must be positive when rate limiting is enabled".into(),
            ));
        }
        if self.boundary.allowed_origins.iter().any(|o| o.trim() == "*") {
            return Err(crate::Error::ConfigError(
                "wildcard CORS origin is not allowed with credentials; list origins explicitly".into(),
            ));
        }
        if url::Url::parse(&self.photos.api_url).is_err() {
            return Err(crate::Error::ConfigError(format!(
                "invalid photo search URL: {}",
                self.photos.api_url
            )));
        }
        Ok(())
    }
}
