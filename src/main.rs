use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use cloudrun_import::config::{Config, DiscoveryTarget};
use cloudrun_import::gcp::auth::validate_region;
use cloudrun_import::gcp::client::{ClientOptions, GcpClient};
use cloudrun_import::output::{ImportManifest, OutputFormat};
use cloudrun_import::resource::{self, ListOptions};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Discover Cloud Run services and jobs for import
#[derive(Parser, Debug)]
#[command(name = "cloudrun-import", version = cloudrun_import::VERSION, about, long_about = None)]
struct Args {
    /// GCP project to scan
    #[arg(short, long)]
    project: Option<String>,

    /// Regions to scan (comma separated or repeated)
    #[arg(short, long, value_delimiter = ',')]
    region: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Write the manifest to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Cloud Run API endpoint override
    #[arg(long, env = "CLOUDRUN_IMPORT_ENDPOINT")]
    endpoint: Option<String>,

    /// OAuth access token to use instead of Application Default Credentials
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Page size for list calls
    #[arg(long)]
    page_size: Option<u32>,

    /// Configuration file (defaults to <config dir>/cloudrun-import/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let (non_blocking, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            tracing_appender::non_blocking(file)
        },
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing_level).into())
        .with_env_var("CLOUDRUN_IMPORT_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(
        "cloudrun-import {} started with log level: {:?}",
        cloudrun_import::VERSION,
        level
    );

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    let config = match args.config.as_deref() {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    }
    .with_overrides(args.project, args.region, args.endpoint, args.page_size);

    let project = config.effective_project();
    if project.is_empty() {
        return Err(anyhow::anyhow!(
            "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project flag"
        ));
    }
    let regions = config.effective_regions();
    if let Some(region) = regions.iter().find(|r| !validate_region(r)) {
        return Err(anyhow::anyhow!("Invalid region: '{}'", region));
    }

    tracing::info!("Using project: {}, regions: {}", project, regions.join(","));

    let client_options = ClientOptions {
        endpoint: config.endpoint.clone(),
        access_token: args.access_token,
    };
    let client = GcpClient::new(&client_options)
        .await
        .context("Cannot create Cloud Run client")?;
    let list_options = ListOptions {
        page_size: config.page_size,
    };

    let mut resources = Vec::new();
    for region in &regions {
        let target = DiscoveryTarget::new(&project, region);
        resources.extend(resource::discover_with_client(&client, &target, list_options).await);
    }

    tracing::info!("Discovered {} resources", resources.len());

    ImportManifest::new(&project, &regions, resources).write(args.format, args.output.as_deref())
}
