use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use flowlist_server::config::{AppConfig, CliConfig, FileConfig};
use flowlist_server::server::{metrics, run_server, RequestsLoggingLevel};
use flowlist_server::{RemoteServiceClient, SelectionStore};

#[derive(Parser, Debug)]
struct CliArgs {
    /// Base URL of the upstream music service.
    #[clap(long)]
    pub upstream_url: Option<String>,

    /// Timeout in seconds for upstream requests.
    #[clap(long, default_value_t = 30)]
    pub upstream_timeout_sec: u64,

    /// Path to an optional TOML config file; values there override CLI args.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,

    /// Seconds a stored selection stays alive before pruning.
    #[clap(long, default_value_t = 3600)]
    pub selection_ttl_secs: i64,

    /// Interval in seconds between selection pruning runs.
    #[clap(long, default_value_t = 600)]
    pub selection_prune_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };

    let cli_config = CliConfig {
        upstream_url: cli_args.upstream_url,
        upstream_timeout_sec: cli_args.upstream_timeout_sec,
        port: cli_args.port,
        metrics_port: cli_args.metrics_port,
        logging_level: cli_args.logging_level,
        frontend_dir_path: cli_args.frontend_dir_path,
        selection_ttl_secs: cli_args.selection_ttl_secs,
        selection_prune_interval_secs: cli_args.selection_prune_interval_secs,
    };
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    info!(
        "Connecting to upstream music service at {}...",
        app_config.upstream_url
    );
    let music_service = Arc::new(RemoteServiceClient::new(
        app_config.upstream_url.clone(),
        app_config.upstream_timeout_sec,
    ));
    if let Err(err) = music_service.health_check().await {
        warn!("Upstream music service is not reachable yet: {:#}", err);
    }

    let selection_store = Arc::new(SelectionStore::new(app_config.selection_ttl_secs));

    // Spawn background task for selection pruning
    {
        let prune_interval = app_config.selection_prune_interval_secs;
        let pruning_store = selection_store.clone();

        info!(
            "Selection pruning enabled: ttl {}s, pruning every {}s",
            app_config.selection_ttl_secs, prune_interval
        );

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(prune_interval));

            // Skip the first immediate tick, wait for the first interval
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let pruned = pruning_store.cleanup_expired().await;
                if pruned > 0 {
                    info!("Pruned {} expired selections", pruned);
                }
                metrics::set_selections_live(pruning_store.len().await);
            }
        });
    }

    info!("Ready to serve at port {}!", app_config.port);
    info!("Metrics available at port {}!", app_config.metrics_port);
    if let Err(err) = run_server(
        music_service,
        selection_store,
        app_config.logging_level,
        app_config.port,
        app_config.metrics_port,
        app_config.frontend_dir_path,
    )
    .await
    {
        error!("Server terminated with error: {:#}", err);
        return Err(err);
    }
    Ok(())
}
