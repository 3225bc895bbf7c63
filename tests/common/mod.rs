//! Shared fixtures: stand-in photo/logo hosts and a Chrome-free capture backend.

#![allow(dead_code)]

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cardshot::render::{CaptureBackend, CaptureJob};
use cardshot::{Error, RenderRequest, ServiceConfig};
use image::{ImageFormat, Rgba, RgbaImage};
use tiny_http::{Header, Response, Server};

/// What the fake photo search answers
#[derive(Clone, Copy, Debug)]
pub enum SearchMode {
    /// Two photos
    Photos,
    Empty,
    Unauthorized,
    Malformed,
}

pub const PHOTO_A: &str = "https://images.test/a-large.jpg";
pub const PHOTO_B: &str = "https://images.test/b-large.jpg";

/// A request seen by a fake server: URL and Authorization header
#[derive(Clone, Debug)]
pub struct Seen {
    pub url: String,
    pub authorization: Option<String>,
}

fn json_header() -> Header {
    "Content-Type: application/json".parse::<Header>().unwrap()
}

/// Start a fake Pexels endpoint; returns its search URL and the request log.
pub fn start_photo_search(mode: SearchMode) -> (String, Arc<Mutex<Vec<Seen>>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let authorization = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            log.lock().unwrap().push(Seen {
                url: request.url().to_string(),
                authorization,
            });

            let response = match mode {
                SearchMode::Photos => Response::from_string(format!(
                    r#"{{"page":1,"per_page":30,"photos":[
                        {{"id":1,"url":"https://pexels.test/photo/1","photographer":"Ana","photographer_url":"https://pexels.test/@ana","src":{{"large":"{PHOTO_A}"}}}},
                        {{"id":2,"url":"https://pexels.test/photo/2","photographer":"Bo","photographer_url":"https://pexels.test/@bo","src":{{"large":"{PHOTO_B}"}}}}
                    ]}}"#
                ))
                .with_header(json_header()),
                SearchMode::Empty => {
                    Response::from_string(r#"{"page":1,"photos":[]}"#).with_header(json_header())
                }
                SearchMode::Unauthorized => Response::from_string(r#"{"error":"Unauthorized"}"#)
                    .with_status_code(401)
                    .with_header(json_header()),
                SearchMode::Malformed => Response::from_string("<html>oops</html>"),
            };
            let _ = request.respond(response);
        }
    });

    (format!("http://{}/v1/search", addr), seen)
}

/// Serve `body` with `content_type` at every path.
pub fn start_logo_host(body: Vec<u8>, content_type: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            let header = format!("Content-Type: {}", content_type).parse::<Header>().unwrap();
            let _ = request.respond(Response::from_data(body.clone()).with_header(header));
        }
    });
    format!("http://{}", addr)
}

/// An address nothing listens on
pub fn dead_address() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Writes a synthetic capture: the canvas filled opaque except a transparent
/// 5px strip at the bottom, like the template's trailing marker.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: AtomicUsize,
    pub fail: bool,
    /// Panic inside `capture` instead of returning
    pub panic: bool,
    pub delay: Option<Duration>,
    pub last_html: Mutex<Option<String>>,
}

impl FakeBackend {
    pub fn failing() -> Self {
        Self { fail: true, ..Default::default() }
    }

    pub fn panicking() -> Self {
        Self { panic: true, ..Default::default() }
    }

    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CaptureBackend for FakeBackend {
    fn capture(&self, job: &CaptureJob<'_>) -> cardshot::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            std::thread::sleep(d);
        }
        if self.panic {
            panic!("capture backend crashed");
        }
        if self.fail {
            return Err(Error::InitializationError("chrome not installed".into()));
        }

        let html = match job.source {
            cardshot::render::DocumentSource::File(p) => std::fs::read_to_string(p)?,
            cardshot::render::DocumentSource::Inline(s) => s.to_string(),
        };
        *self.last_html.lock().unwrap() = Some(html);

        let (w, h) = (job.canvas.width, job.canvas.height);
        let mut img = RgbaImage::from_pixel(w, h, Rgba([30, 60, 90, 255]));
        for y in h.saturating_sub(5)..h {
            for x in 0..w {
                img.put_pixel(x, y, Rgba([0, 0, 0, 0]));
            }
        }
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        std::fs::write(job.output_path, buf)?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Config pointing at the given search URL, an empty asset dir and a private
/// scratch dir.
pub fn test_config(search_url: &str, asset_dir: &Path, scratch_dir: &Path) -> ServiceConfig {
    let mut cfg = ServiceConfig::default();
    cfg.photos.api_key = Some("test-key".into());
    cfg.photos.api_url = search_url.to_string();
    cfg.photos.timeout = Duration::from_secs(5);
    cfg.logo.asset_dir = asset_dir.to_path_buf();
    cfg.logo.timeout = Duration::from_secs(5);
    cfg.render.scratch_dir = scratch_dir.to_path_buf();
    cfg.render.settle = Duration::ZERO;
    cfg.render.timeout = Duration::from_secs(10);
    cfg
}

pub fn sample_request() -> RenderRequest {
    RenderRequest {
        category_name: "AI".into(),
        category_bg_color: "#00D4FF".into(),
        category_text_color: "#FFFFFF".into(),
        content: "<h1>HELLO</h1>".into(),
        background_theme: "technology".into(),
        logo_url: None,
        show_logo: false,
        text_align: None,
    }
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
