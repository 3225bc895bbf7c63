//! Cardshot
//!
//! Renders themed "card" images: a stock photo background, a category badge,
//! a rich-text headline and an optional logo, composed as HTML and rasterized
//! by headless Chrome into a 1280×720 PNG.
//!
//! # Features
//!
//! - **CDP Backend** (default): captures through Chrome DevTools Protocol via
//!   the `headless_chrome` crate
//! - **Best-effort inputs**: photo search and logo download degrade to
//!   defaults instead of failing the render
//! - **HTTP service**: an axum router exposing `POST /generate-image`
//!
//! # Example
//!
//! ```no_run
//! use cardshot::{Pipeline, RenderRequest, ServiceConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = Pipeline::with_default_backend(ServiceConfig::default())?;
//! let request: RenderRequest = serde_json::from_str(r##"{
//!     "category_name": "AI",
//!     "category_bg_color": "#00D4FF",
//!     "category_text_color": "#FFFFFF",
//!     "content": "<h1>HELLO</h1>",
//!     "background_theme": "technology",
//!     "show_logo": false
//! }"##)?;
//! let image = pipeline.generate(&request).await?;
//! assert_eq!((image.width, image.height), (1280, 720));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::ServiceConfig;

pub mod request;
pub use request::RenderRequest;

// Best-effort inputs
pub mod background;
pub mod logo;

pub mod compose;
pub use compose::{ComposedDocument, TextPlacement};

pub mod render;
pub use render::{CaptureBackend, CaptureJob, RenderedImage, Renderer};

pub mod pipeline;
pub use pipeline::Pipeline;

// HTTP surface
pub mod server;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        OUTPUT_SIZE
    }
}

/// The area the HTML template is laid out against
pub const AUTHORING_CANVAS: Viewport = Viewport {
    width: 1280,
    height: 850,
};

/// Size of every image the service returns
pub const OUTPUT_SIZE: Viewport = Viewport {
    width: 1280,
    height: 720,
};
