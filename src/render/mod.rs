//! HTML → PNG rendering.
//!
//! A [`Renderer`] owns the request-scoped parts of a render (scratch files,
//! the timeout, the alternate load path, post-processing) and delegates the
//! actual rasterization to a [`CaptureBackend`]. Each render runs on its own
//! worker thread so the blocking browser calls never stall the async runtime.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tokio::sync::oneshot;

use crate::config::RenderConfig;
use crate::{Error, Result, Viewport};

#[cfg(feature = "cdp")]
pub mod cdp;
pub mod postprocess;
pub mod scratch;

pub use scratch::ScratchFile;

/// Final PNG returned to the caller
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// How the backend should load the document
#[derive(Debug, Clone, Copy)]
pub enum DocumentSource<'a> {
    /// Scratch file on disk, loaded through a `file://` URL
    File(&'a Path),
    /// Markup written into a blank page
    Inline(&'a str),
}

/// One capture request handed to a backend
#[derive(Debug, Clone, Copy)]
pub struct CaptureJob<'a> {
    pub source: DocumentSource<'a>,
    /// The backend must write the PNG here and nowhere else
    pub output_path: &'a Path,
    /// Region to capture, starting at the page origin
    pub canvas: Viewport,
    pub settle: Duration,
    pub timeout: Duration,
}

/// Rasterizes a document into a PNG file
///
/// Implementations are called from a dedicated worker thread and may block.
pub trait CaptureBackend: Send + Sync + 'static {
    /// Load `job.source`, capture `job.canvas` and write it to `job.output_path`.
    fn capture(&self, job: &CaptureJob<'_>) -> Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str {
        "backend"
    }
}

/// Renders composed documents into canonical PNGs
#[derive(Clone)]
pub struct Renderer {
    backend: Arc<dyn CaptureBackend>,
    config: RenderConfig,
}

impl Renderer {
    pub fn new(backend: Arc<dyn CaptureBackend>, config: RenderConfig) -> Self {
        Self { backend, config }
    }

    /// Render `html`, bounded by the configured timeout.
    pub async fn render(&self, html: &str) -> Result<RenderedImage> {
        let (tx, rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();
        let html = html.to_string();

        thread::Builder::new()
            .name("cardshot-render".into())
            .spawn(move || {
                let res = render_blocking(backend.as_ref(), &config, &html);
                // Receiver is gone when the caller timed out
                let _ = tx.send(res);
            })
            .map_err(|e| Error::InitializationError(format!("Failed to spawn render worker: {}", e)))?;

        match tokio::time::timeout(self.config.timeout, rx).await {
            Ok(Ok(res)) => res,
            Ok(Err(e)) => Err(Error::RenderError(format!("Render worker exited early: {}", e))),
            Err(_) => Err(Error::Timeout(self.config.timeout_ms())),
        }
    }
}

/// Synchronous render: scratch files in, normalized PNG out.
///
/// Both scratch files are removed before this returns, whatever the outcome.
pub fn render_blocking(backend: &dyn CaptureBackend, config: &RenderConfig, html: &str) -> Result<RenderedImage> {
    let started = Instant::now();
    let html_file = ScratchFile::new(&config.scratch_dir, "html");
    let png_file = ScratchFile::new(&config.scratch_dir, "png");

    std::fs::write(html_file.path(), html)?;

    let mut job = CaptureJob {
        source: DocumentSource::File(html_file.path()),
        output_path: png_file.path(),
        canvas: config.canvas,
        settle: config.settle,
        timeout: config.timeout,
    };

    if let Err(first) = backend.capture(&job) {
        warn!("{} capture from file failed, retrying inline: {}", backend.name(), first);
        let _ = std::fs::remove_file(png_file.path());
        job.source = DocumentSource::Inline(html);
        backend.capture(&job).map_err(|second| {
            Error::RenderError(format!("capture failed from file ({}) and inline ({})", first, second))
        })?;
    }

    let raw = std::fs::read(png_file.path()).map_err(|e| {
        Error::RenderError(format!(
            "{} reported success but wrote no image to {}: {}",
            backend.name(),
            png_file.path().display(),
            e
        ))
    })?;
    let image = postprocess::normalize(&raw, config.output)?;

    debug!(
        "rendered {}x{} png ({} bytes) in {:?}",
        image.width,
        image.height,
        image.bytes.len(),
        started.elapsed()
    );
    Ok(image)
}
