use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rank_tracker::api::{self, state::AppState};
use rank_tracker::config::AppConfig;
use rank_tracker::hub::NotificationHub;
use rank_tracker::ladder::RankLadder;
use rank_tracker::models::{Outcome, StatField};
use rank_tracker::progression::RankProgress;
use rank_tracker::service::RankService;
use rank_tracker::storage::{
    JsonFileStore, MemoryStore, StatsPersistence, StatsStore, StorageConfig,
};

#[derive(Parser)]
#[command(name = "rank-tracker")]
#[command(about = "Ranked ladder progress tracker with live stats broadcast")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server and stats hub
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Keep stats in memory only
        #[arg(long)]
        in_memory: bool,
    },

    /// Print current stats and rank progress
    Show,

    /// Record a match outcome (win, loss, tie)
    Record { outcome: Outcome },

    /// Set a single stat field
    Set {
        field: StatField,

        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Zero every stat
    Reset,

    /// Print the rank ladder
    Ladder,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(level) = cli.log_level.clone() {
        config.log_level = level;
    }

    init_tracing(&config.log_level, cli.json_logs);
    tracing::info!("Starting rank-tracker v{}", env!("CARGO_PKG_VERSION"));

    let in_memory = matches!(cli.command, Commands::Serve { in_memory: true, .. });
    let service = build_service(&config, in_memory)?;

    match cli.command {
        Commands::Serve { host, port, .. } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let app = api::build_router(AppState::new(service))
                .layer(api::cors_layer(&config.server.cors_origin));
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("binding {}", addr))?;
            tracing::info!("Listening on http://{} (hub at /hubs/stats)", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Show => {
            let stats = service.get_stats().await?;
            let progress = service.progress().await?;
            print_stats(&stats);
            print_progress(&progress);
        }
        Commands::Record { outcome } => {
            let stats = service.record_outcome(outcome).await?;
            print_stats(&stats);
            print_progress(&RankProgress::from_stats(service.ladder(), &stats));
        }
        Commands::Set { field, value } => {
            let stats = service.set_field(field, value).await?;
            print_stats(&stats);
        }
        Commands::Reset => {
            let stats = service.reset().await?;
            println!("Stats reset");
            print_stats(&stats);
        }
        Commands::Ladder => {
            println!("{:>6}  {:<14} {}", "POINTS", "RANK", "TIER");
            for entry in service.ladder().entries() {
                println!(
                    "{:>6}  {:<14} {}",
                    entry.threshold, entry.label, entry.tier
                );
            }
        }
    }

    Ok(())
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // stdout carries command output
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn build_service(config: &AppConfig, in_memory: bool) -> Result<RankService> {
    let backend: Arc<dyn StatsPersistence> = if in_memory {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonFileStore::from_config(&StorageConfig::new(
            config.data_dir.clone(),
        )))
    };
    tracing::info!("Stats backend: {}", backend.describe());

    let store = StatsStore::new(backend, config.store.lock_timeout()?);
    Ok(RankService::new(
        store,
        Arc::new(RankLadder::standard()),
        NotificationHub::new(config.hub.channel_capacity),
    ))
}

fn print_stats(stats: &rank_tracker::Stats) {
    for field in StatField::ALL {
        println!("{:<15} {}", field.name(), stats.get(field));
    }
}

fn print_progress(progress: &RankProgress) {
    println!();
    println!("Rank            {} ({})", progress.label, progress.tier);
    match &progress.next_rank {
        Some(next) => println!(
            "Next rank       {} at {} ({} points, {} wins)",
            next.label, next.threshold, next.points_needed, progress.wins_to_next_rank
        ),
        None => println!("Next rank       none, top of the ladder"),
    }
    println!(
        "Next hundred    {} ({} wins)",
        progress.next_hundred, progress.wins_to_next_hundred
    );
    println!(
        "Win rate        {:.1}% over {} games",
        progress.win_rate * 100.0,
        progress.games_played
    );
    println!("Since start     {:+}", progress.points_since_start);
}
