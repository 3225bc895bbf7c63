//! The per-request pipeline: background → logo → compose → render.

use std::sync::Arc;
use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Client;

use crate::background::{self, PexelsClient};
use crate::compose::{self, ComposedDocument, TextPlacement};
use crate::logo::LogoResolver;
use crate::render::{CaptureBackend, RenderedImage, Renderer};
use crate::{Error, RenderRequest, Result, ServiceConfig};

/// Everything needed to turn a [`RenderRequest`] into a PNG
///
/// Holds no per-request state; clones share the HTTP connection pool only.
#[derive(Clone)]
pub struct Pipeline {
    photos: PexelsClient,
    logos: LogoResolver,
    renderer: Renderer,
    fallback_background: String,
}

impl Pipeline {
    /// Build a pipeline around an explicit capture backend.
    pub fn new(config: ServiceConfig, backend: Arc<dyn CaptureBackend>) -> Result<Self> {
        config.validate()?;
        let http = Client::builder()
            .user_agent(concat!("cardshot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            photos: PexelsClient::new(http.clone(), config.photos),
            logos: LogoResolver::new(http, config.logo),
            renderer: Renderer::new(backend, config.render),
            fallback_background: config.fallback_background,
        })
    }

    /// Pipeline rendering through headless Chrome
    #[cfg(feature = "cdp")]
    pub fn with_default_backend(config: ServiceConfig) -> Result<Self> {
        let backend = crate::render::cdp::CdpBackend::new(config.render.chrome_path.clone());
        Self::new(config, Arc::new(backend))
    }

    /// Resolve inputs and compose the document, drawing randomness from `rng`.
    pub async fn compose_with<R: Rng + Send>(&self, request: &RenderRequest, rng: &mut R) -> ComposedDocument {
        let placement = TextPlacement::resolve(request.text_align, rng);

        let background_url =
            background::resolve_background_url(&self.photos, &request.background_theme, &self.fallback_background, rng)
                .await;

        let logo = self
            .logos
            .resolve(request.logo_url.as_deref(), request.show_logo)
            .await;

        compose::compose_html(request, &background_url, logo.as_deref(), placement)
    }

    /// Compose with a fresh entropy-seeded random source.
    pub async fn compose(&self, request: &RenderRequest) -> ComposedDocument {
        let mut rng = StdRng::from_entropy();
        self.compose_with(request, &mut rng).await
    }

    /// Full request: compose then render.
    pub async fn generate(&self, request: &RenderRequest) -> Result<RenderedImage> {
        let started = Instant::now();
        let doc = self.compose(request).await;
        let composed_in = started.elapsed();

        let image = self.renderer.render(&doc.html).await?;
        info!(
            "generated card category={:?} placement={} logo={} compose={:?} total={:?}",
            request.category_name,
            doc.placement,
            doc.has_logo,
            composed_in,
            started.elapsed()
        );
        Ok(image)
    }
}
