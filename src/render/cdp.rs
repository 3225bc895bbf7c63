//! Chrome DevTools Protocol capture backend

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;

use crate::render::{CaptureBackend, CaptureJob, DocumentSource};
use crate::{Error, Result};

/// Flags for running inside containers: no sandbox, no GPU, no /dev/shm
const CHROME_ARGS: [&str; 4] = [
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--hide-scrollbars",
];

/// Resolves once the document and every subresource have finished loading
const WAIT_FOR_LOAD: &str = r#"new Promise(function(resolve){
    if (document.readyState === 'complete') { resolve(true); return; }
    window.addEventListener('load', function(){ resolve(true); });
})"#;

/// CDP-based capture backend (uses the `headless_chrome` crate)
///
/// Every capture launches its own Chrome process and tears it down afterwards;
/// nothing is shared between renders.
pub struct CdpBackend {
    chrome_path: Option<PathBuf>,
}

impl CdpBackend {
    pub fn new(chrome_path: Option<PathBuf>) -> Self {
        Self { chrome_path }
    }

    fn launch(&self, job: &CaptureJob<'_>) -> Result<Browser> {
        let args: Vec<&OsStr> = CHROME_ARGS.iter().map(OsStr::new).collect();
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .window_size(Some((job.canvas.width, job.canvas.height)))
            .path(self.chrome_path.clone())
            .idle_browser_timeout(job.timeout)
            .args(args)
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))
    }
}

impl CaptureBackend for CdpBackend {
    fn capture(&self, job: &CaptureJob<'_>) -> Result<()> {
        let browser = self.launch(job)?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(job.timeout);

        load(&tab, &job.source)?;

        // Webfonts come from @import and may still be in flight after `load`
        if let Err(e) = tab.evaluate("document.fonts.ready.then(function(){ return true; })", true) {
            debug!("document.fonts.ready did not resolve: {}", e);
        }
        std::thread::sleep(job.settle);

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: f64::from(job.canvas.width),
            height: f64::from(job.canvas.height),
            scale: 1.0,
        };
        let png = tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;

        std::fs::write(job.output_path, &png)?;

        // Drop the tab before the browser so the child process exits promptly
        drop(tab);
        drop(browser);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cdp"
    }
}

fn load(tab: &Arc<Tab>, source: &DocumentSource<'_>) -> Result<()> {
    match source {
        DocumentSource::File(path) => {
            let url = url::Url::from_file_path(path)
                .map_err(|_| Error::LoadError(format!("Not an absolute path: {}", path.display())))?;
            tab.navigate_to(url.as_str())
                .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;
            tab.wait_until_navigated()
                .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;
        }
        DocumentSource::Inline(html) => {
            tab.navigate_to("about:blank")
                .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;
            tab.wait_until_navigated()
                .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

            let literal = serde_json::to_string(html)
                .map_err(|e| Error::LoadError(format!("Failed to encode document: {}", e)))?;
            let script = format!("document.open(); document.write({}); document.close(); true", literal);
            tab.evaluate(&script, false)
                .map_err(|e| Error::LoadError(format!("Writing document failed: {}", e)))?;
        }
    }

    tab.evaluate(WAIT_FOR_LOAD, true)
        .map_err(|e| Error::LoadError(format!("Waiting for load failed: {}", e)))?;
    Ok(())
}
