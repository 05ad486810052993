use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vtrack_core::{AppConfig, Settings, SettingsStore, Timeframe};
use vtrack_db::{IngestMode, Store, StoreConfig};

mod analytics;
mod backup;
mod fmt;
mod ingest;
mod settings;
mod videos;

use analytics::{run_series, run_trending};
use backup::BackupCommands;
use settings::SettingsCommands;
use videos::VideosCommands;

#[derive(Debug, Parser)]
#[command(name = "vtrack")]
#[command(about = "Track daily short-video performance snapshots")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Ingest one or more daily snapshot files
    Ingest {
        /// Snapshot JSON files exported from the analytics dashboard
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Delete everything stored for the snapshot's date before writing
        #[arg(long, conflicts_with = "merge")]
        replace: bool,
        /// Overwrite matching rows for the snapshot's date and keep the rest
        #[arg(long)]
        merge: bool,
        /// Report what would be ingested without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Delete every performance row stored for a date
    Clear {
        /// Date to clear (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
    },
    /// Create, list, or restore database backups
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Browse tracked videos
    Videos {
        #[command(subcommand)]
        command: VideosCommands,
    },
    /// Chart one metric of one video over time
    Series {
        video_id: String,
        /// Metric column name, e.g. vv, likes, ctr, video_finish_rate
        #[arg(long)]
        metric: String,
        /// Bucket width: daily, weekly, or monthly
        #[arg(long, default_value = "daily")]
        timeframe: Timeframe,
    },
    /// Score every video-day and list the trending videos
    Trending {
        /// Only consider days on or after this date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Only consider days on or before this date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Minimum trending score, inclusive
        #[arg(long, default_value_t = vtrack_analytics::DEFAULT_TRENDING_THRESHOLD)]
        threshold: f64,
    },
    /// Rank the videos of one day by views
    Top {
        /// Day to rank; defaults to the most recent stored day
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database can be opened and queried
    Ping,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = vtrack_core::load_app_config_from_env()?;

    // Tables go to stdout; keep log lines on stderr.
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("vtrack ready; run `vtrack --help` to list commands");
        return Ok(());
    };

    tracing::debug!(env = %config.env, database = %config.database_path.display(), "starting");
    run(command, &config).await
}

async fn run(command: Commands, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Db { command } => run_db(command, &StoreConfig::from_app_config(config)).await,
        Commands::Settings { command } => settings::run_settings(&config.settings_path, command),
        Commands::Ingest {
            files,
            replace,
            merge,
            dry_run,
        } => {
            let mut store = open_store(config).await?;
            let settings = load_settings(config)?;
            ingest::run_ingest(
                &mut store,
                &settings,
                &files,
                requested_mode(replace, merge),
                dry_run,
            )
            .await
        }
        Commands::Clear { date } => {
            let mut store = open_store(config).await?;
            ingest::run_clear(&mut store, date).await
        }
        Commands::Backup { command } => {
            let mut store = open_store(config).await?;
            backup::run_backup(&mut store, command).await
        }
        Commands::Videos { command } => {
            let mut store = open_store(config).await?;
            videos::run_videos(&mut store, command).await
        }
        Commands::Series {
            video_id,
            metric,
            timeframe,
        } => {
            let mut store = open_store(config).await?;
            let settings = load_settings(config)?;
            run_series(&mut store, &video_id, &metric, timeframe, settings.week_start).await
        }
        Commands::Trending {
            start,
            end,
            threshold,
        } => {
            let mut store = open_store(config).await?;
            run_trending(&mut store, start, end, threshold).await
        }
        Commands::Top { date } => {
            let mut store = open_store(config).await?;
            videos::run_top(&mut store, date).await
        }
    }
}

async fn run_db(command: DbCommands, config: &StoreConfig) -> anyhow::Result<()> {
    let pool = vtrack_db::open_pool(config).await?;
    match command {
        DbCommands::Migrate => {
            let applied = vtrack_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            vtrack_db::ping(&pool).await?;
            println!("database ok: {}", config.database_path.display());
        }
    }
    pool.close().await;
    Ok(())
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Store> {
    Ok(Store::open(StoreConfig::from_app_config(config)).await?)
}

fn load_settings(config: &AppConfig) -> anyhow::Result<Settings> {
    Ok(SettingsStore::load(&config.settings_path)?.settings())
}

/// `None` when neither flag was given; the ingest handler then refuses dates
/// that already hold data.
fn requested_mode(replace: bool, merge: bool) -> Option<IngestMode> {
    if replace {
        Some(IngestMode::Replace)
    } else if merge {
        Some(IngestMode::Merge)
    } else {
        None
    }
}
