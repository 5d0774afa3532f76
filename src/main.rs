use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tvh_m3u_sync::{
    backend::TvheadendClient,
    config::{Config, defaults::DEFAULT_LOG_LEVEL},
    errors::AppError,
    playlist::{MalformedPolicy, PlaylistParser},
    sync::{ChannelErrorPolicy, ConsoleObserver, SyncDriver, SyncSummary},
    utils::UrlUtils,
};

#[derive(Parser)]
#[command(name = "tvh-m3u-sync")]
#[command(version)]
#[command(about = "Bulk-add channels to Tvheadend, from a M3U file")]
#[command(long_about = None)]
struct Cli {
    /// M3U playlist to read ('-' for standard input)
    m3u_file: PathBuf,

    /// URL to Tvheadend, e.g. http://192.168.1.2:9981 [default: backend.url from config]
    tvheadend_url: Option<String>,

    /// User name
    #[arg(long)]
    user: Option<String>,

    /// Password
    #[arg(long)]
    password: Option<String>,

    /// Interface name Tvheadend tunes on (e.g. eth0) [default: eth0]
    #[arg(long)]
    interface: Option<String>,

    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Timeout for each API request, e.g. 30s [default: 30s]
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Keep going when adding a channel fails
    #[arg(long)]
    keep_going: bool,

    /// Skip playlist entries with malformed directives instead of aborting
    #[arg(long)]
    skip_malformed: bool,

    /// Report what would be added without changing Tvheadend
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl Cli {
    /// Command-line values win over the file and environment layers
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.tvheadend_url {
            config.backend.url = Some(url.clone());
        }
        if let Some(user) = &self.user {
            config.backend.username = Some(user.clone());
        }
        if let Some(password) = &self.password {
            config.backend.password = Some(password.clone());
        }
        if let Some(interface) = &self.interface {
            config.backend.interface = interface.clone();
        }
        if let Some(timeout) = self.timeout {
            config.backend.timeout = timeout;
        }
        if self.keep_going {
            config.sync.on_error = ChannelErrorPolicy::Continue;
        }
        if self.skip_malformed {
            config.sync.malformed = MalformedPolicy::SkipEntry;
        }
        if self.dry_run {
            config.sync.dry_run = true;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_filter = format!("tvh_m3u_sync={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    match run(cli).await {
        Ok(summary) if summary.failed > 0 => {
            eprintln!("{} channel(s) could not be added", summary.failed);
            ExitCode::from(2)
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<AppError>().map_or(1, AppError::exit_code);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<SyncSummary> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    info!("Starting tvh-m3u-sync v{}", env!("CARGO_PKG_VERSION"));

    let client = TvheadendClient::new(&config.backend)?;
    info!(
        "Syncing {} into {}",
        cli.m3u_file.display(),
        UrlUtils::obfuscate_credentials(client.base_url().as_str())
    );
    let driver = SyncDriver::new(&client, config.backend.interface.as_str())
        .with_error_policy(config.sync.on_error)
        .with_dry_run(config.sync.dry_run);
    let mut observer = ConsoleObserver::stdout();

    let (summary, skipped_entries) = if cli.m3u_file == Path::new("-") {
        let mut parser =
            PlaylistParser::from_reader(io::stdin().lock(), "<stdin>", config.sync.malformed);
        let summary = driver.run(parser.by_ref(), &mut observer).await?;
        (summary, parser.skipped_entries())
    } else {
        let mut parser =
            PlaylistParser::open(&cli.m3u_file, config.sync.malformed).map_err(AppError::from)?;
        let summary = driver.run(parser.by_ref(), &mut observer).await?;
        (summary, parser.skipped_entries())
    };

    if skipped_entries > 0 {
        warn!("{} malformed playlist entries were skipped", skipped_entries);
    }

    Ok(summary)
}
