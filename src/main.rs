use clap::Parser;
use prezishot::{
    capture_presentation,
    chrome::{ChromeDocument, LaunchConfig},
    CaptureConfig, CaptureError, CaptureSession, Selectors, Termination, Viewport,
};
use serde::Serialize;
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    /// Presentation URL
    #[arg(long)]
    url: Option<String>,
    /// Directory for prezi-<n>.png files (created if missing)
    #[arg(long, default_value = "img")]
    out: PathBuf,
    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 595, value_parser = clap::value_parser!(u32).range(1..))]
    width: u32,
    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 842, value_parser = clap::value_parser!(u32).range(1..))]
    height: u32,
    /// JSON file overriding viewer selectors
    #[arg(long)]
    selectors: Option<PathBuf>,
    /// Milliseconds to let each slide settle before capture
    #[arg(long, default_value_t = 1800)]
    slide_settle_ms: u64,
    /// Seconds allowed for the initial page load
    #[arg(long, default_value_t = 180)]
    nav_timeout_secs: u64,
    /// User agent override (defaults to a realistic desktop browser)
    #[arg(long)]
    user_agent: Option<String>,
    /// Run Chrome in headful mode
    #[arg(long)]
    headful: bool,
}

#[derive(Serialize)]
struct Output {
    input_url: String,
    out_dir: String,
    slides: usize,
    files: Vec<String>,
    termination: Termination,
    started_at: String,
    elapsed_ms: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Cli::parse();

    let output = match run(args).await {
        Ok(output) => output,
        Err(e) => {
            let code = e.exit_code();
            error!(error = %e, "capture failed");
            eprintln!("{:#}", anyhow::Error::from(e));
            return ExitCode::from(code);
        }
    };

    match print_json(output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<Output, CaptureError> {
    let started_at = chrono::Local::now();
    let start = std::time::Instant::now();

    let url = args
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(CaptureError::MissingUrl)?;
    url::Url::parse(&url).map_err(|source| CaptureError::InvalidUrl {
        url: url.clone(),
        source,
    })?;

    let mut config = CaptureConfig::default();
    if let Some(p) = &args.selectors {
        config.selectors = Selectors::from_file(p).map_err(CaptureError::Config)?;
    }
    config.timings.slide_settle = Duration::from_millis(args.slide_settle_ms);
    config.timings.navigation_timeout = Duration::from_secs(args.nav_timeout_secs);
    if let Some(ua) = args.user_agent {
        config.user_agent = ua;
    }

    std::fs::create_dir_all(&args.out).map_err(|source| CaptureError::OutputDir {
        path: args.out.clone(),
        source,
    })?;

    let viewport = Viewport {
        width: args.width,
        height: args.height,
    };
    let mut doc = ChromeDocument::launch(&LaunchConfig {
        viewport,
        headful: args.headful,
        idle_timeout: config.timings.navigation_timeout + Duration::from_secs(60),
    })
    .map_err(CaptureError::Setup)?;

    let session = CaptureSession::new(url.clone(), args.out.clone(), viewport);
    let report = capture_presentation(&mut doc, session, &config).await?;

    let out_dir = dunce::canonicalize(&args.out).unwrap_or(args.out);
    Ok(Output {
        input_url: url,
        out_dir: out_dir.display().to_string(),
        slides: report.slides.len(),
        files: report
            .slides
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        termination: report.termination,
        started_at: started_at.to_rfc3339(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_json<T: Serialize>(v: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&v)?);
    Ok(())
}
