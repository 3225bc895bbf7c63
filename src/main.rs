use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use cardshot::config::{DEFAULT_BACKGROUND_IMAGE, DEFAULT_PEXELS_API_URL};
use cardshot::{Pipeline, RenderRequest, ServiceConfig};

#[derive(Parser, Debug)]
#[command(name = "cardshot", version, about = "Render themed HTML cards into 1280x720 PNGs")]
struct Cli {
    #[command(flatten)]
    opts: Options,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Render a single request file without starting the server
    Render {
        /// JSON file in the `POST /generate-image` format
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Write the composed HTML instead of the PNG
        #[arg(long)]
        html_only: bool,
    },
}

#[derive(Args, Debug)]
struct Options {
    /// Listen address for the HTTP service
    #[arg(long, env = "CARDSHOT_BIND", default_value = "0.0.0.0:8000", global = true)]
    bind: SocketAddr,

    #[arg(long, env = "PEXELS_API_KEY", hide_env_values = true, global = true)]
    pexels_api_key: Option<String>,

    #[arg(long, env = "PEXELS_API_URL", default_value = DEFAULT_PEXELS_API_URL, global = true)]
    pexels_api_url: String,

    /// Required `X-API-Key` value for `POST /generate-image`
    #[arg(long, env = "CARDSHOT_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Comma-separated CORS allow-list
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',', global = true)]
    allowed_origins: Vec<String>,

    #[arg(long, env = "CARDSHOT_RATE_LIMIT_PER_MINUTE", default_value_t = 60, global = true)]
    rate_limit_per_minute: u32,

    #[arg(long, env = "CARDSHOT_RATE_LIMIT_PER_HOUR", default_value_t = 1000, global = true)]
    rate_limit_per_hour: u32,

    #[arg(long, env = "CARDSHOT_NO_RATE_LIMIT", global = true)]
    no_rate_limit: bool,

    #[arg(long, env = "CARDSHOT_MAX_BODY_BYTES", default_value_t = 10 * 1024 * 1024, global = true)]
    max_body_bytes: usize,

    #[arg(long, env = "CARDSHOT_RENDER_TIMEOUT_SECS", default_value_t = 30, global = true)]
    render_timeout_secs: u64,

    #[arg(long, env = "CARDSHOT_SETTLE_MS", default_value_t = 500, global = true)]
    settle_ms: u64,

    #[arg(long, env = "CHROME_PATH", global = true)]
    chrome_path: Option<PathBuf>,

    /// Directory containing the bundled logo.png / logo.webp
    #[arg(long, env = "CARDSHOT_ASSET_DIR", default_value = ".", global = true)]
    asset_dir: PathBuf,

    #[arg(long, env = "CARDSHOT_SCRATCH_DIR", global = true)]
    scratch_dir: Option<PathBuf>,

    #[arg(long, env = "CARDSHOT_FALLBACK_BACKGROUND", default_value = DEFAULT_BACKGROUND_IMAGE, global = true)]
    fallback_background: String,
}

impl Options {
    fn into_config(self) -> ServiceConfig {
        let mut cfg = ServiceConfig::default();
        cfg.bind = self.bind;
        cfg.photos.api_key = self.pexels_api_key.filter(|k| !k.is_empty());
        cfg.photos.api_url = self.pexels_api_url;
        cfg.boundary.api_key = self.api_key.filter(|k| !k.is_empty());
        if !self.allowed_origins.is_empty() {
            cfg.boundary.allowed_origins = self.allowed_origins;
        }
        cfg.boundary.rate_limit_enabled = !self.no_rate_limit;
        cfg.boundary.rate_limit_per_minute = self.rate_limit_per_minute;
        cfg.boundary.rate_limit_per_hour = self.rate_limit_per_hour;
        cfg.boundary.max_body_bytes = self.max_body_bytes;
        cfg.render.timeout = Duration::from_secs(self.render_timeout_secs);
        cfg.render.settle = Duration::from_millis(self.settle_ms);
        cfg.render.chrome_path = self.chrome_path;
        if let Some(dir) = self.scratch_dir {
            cfg.render.scratch_dir = dir;
        }
        cfg.logo.asset_dir = self.asset_dir;
        cfg.fallback_background = self.fallback_background;
        cfg
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        None | Some(Command::Serve) => serve(cli.opts.into_config()).await,
        Some(Command::Render { request, out, html_only }) => {
            render_once(cli.opts.into_config(), request, out, html_only).await
        }
    }
}

async fn serve(config: ServiceConfig) -> Result<()> {
    if config.photos.api_key.is_none() {
        log::warn!("no PEXELS_API_KEY set; every card will use the fallback background");
    }
    let pipeline = Pipeline::with_default_backend(config.clone()).context("failed to build pipeline")?;
    cardshot::server::serve(config, pipeline).await.context("server error")
}

async fn render_once(config: ServiceConfig, request: PathBuf, out: PathBuf, html_only: bool) -> Result<()> {
    let body = tokio::fs::read_to_string(&request)
        .await
        .with_context(|| format!("failed to read {}", request.display()))?;
    let request: RenderRequest = serde_json::from_str(&body).context("invalid request JSON")?;

    let pipeline = Pipeline::with_default_backend(config).context("failed to build pipeline")?;
    if html_only {
        let doc = pipeline.compose(&request).await;
        tokio::fs::write(&out, doc.html).await?;
        info!("wrote {} ({} layout)", out.display(), doc.placement);
        return Ok(());
    }

    let image = pipeline.generate(&request).await?;
    if image.bytes.is_empty() {
        bail!("renderer produced an empty image");
    }
    tokio::fs::write(&out, &image.bytes).await?;
    info!("wrote {} ({}x{})", out.display(), image.width, image.height);
    Ok(())
}
