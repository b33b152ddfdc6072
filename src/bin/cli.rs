//! news-crawler CLI
//!
//! Local execution entry point for single captures and continuous watching.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use news_crawler::{
    error::{AppError, Result},
    models::{CaptureMode, Config, RunnerKind},
    pipeline::{self, janitor, CycleRunner, ExternalProcessRunner, InProcessRunner, Scheduler},
    services::HttpFetcher,
    storage::{CsvStore, RecordStore},
    utils::log::Logger,
};

/// news-crawler - Headline Capture Engine
#[derive(Parser, Debug)]
#[command(
    name = "news-crawler",
    version,
    about = "Captures a ranked headline list into a deduplicated CSV ledger"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Artifact settings that override the configuration file.
#[derive(Args, Debug, Clone, Default)]
struct Overrides {
    /// Do not write page-state snapshots
    #[arg(long, global = true)]
    no_snapshots: bool,

    /// Do not write raw HTML dumps
    #[arg(long, global = true)]
    no_html_cache: bool,

    /// Newest files kept per artifact directory
    #[arg(long, global = true)]
    max_cache_files: Option<usize>,

    /// Age in days after which artifacts count as expired
    #[arg(long, global = true)]
    cache_days: Option<u32>,
}

impl Overrides {
    fn apply(&self, config: &mut Config) {
        if self.no_snapshots {
            config.artifacts.snapshots = false;
        }
        if self.no_html_cache {
            config.artifacts.html_cache = false;
        }
        if let Some(max_files) = self.max_cache_files {
            config.janitor.max_files = max_files;
        }
        if let Some(days) = self.cache_days {
            config.janitor.keep_days = days;
        }
    }

    /// The same overrides as command-line arguments, for child processes.
    fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::new();
        if self.no_snapshots {
            args.push("--no-snapshots".into());
        }
        if self.no_html_cache {
            args.push("--no-html-cache".into());
        }
        if let Some(max_files) = self.max_cache_files {
            args.push("--max-cache-files".into());
            args.push(max_files.to_string().into());
        }
        if let Some(days) = self.cache_days {
            args.push("--cache-days".into());
            args.push(days.to_string().into());
        }
        args
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum RunnerArg {
    InProcess,
    ExternalProcess,
}

impl From<RunnerArg> for RunnerKind {
    fn from(arg: RunnerArg) -> Self {
        match arg {
            RunnerArg::InProcess => RunnerKind::InProcess,
            RunnerArg::ExternalProcess => RunnerKind::ExternalProcess,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture once into a fresh store (plus a TSV spreadsheet copy)
    Capture {
        /// Store path (default: data/news_<date>_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Capture repeatedly into one growing store until interrupted
    Watch {
        /// Store path (default: data/continuous_news_<date>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Minutes between cycle starts
        #[arg(short, long)]
        interval: Option<f64>,

        /// How each cycle is executed
        #[arg(long, value_enum)]
        runner: Option<RunnerArg>,
    },

    /// Run one continuous-mode cycle and print its result as JSON
    #[command(hide = true)]
    Cycle {
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Apply the artifact retention policy once
    Clean,

    /// Validate configuration file
    Validate,

    /// Show the state of a store
    Info {
        /// Store path (default: today's continuous store)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str, logger: &Logger) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .target(env_logger::Target::Pipe(Box::new(logger.tee())))
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, load_error) = match Config::load(&cli.config) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    cli.overrides.apply(&mut config);

    let (logger, open_error) = match Logger::open(Path::new(&config.paths.log_dir)) {
        Ok(logger) => (logger, None),
        Err(e) => (Logger::console(), Some(e)),
    };
    init_logging(cli.verbose, &config.logging.level, &logger);

    if let Some(e) = load_error {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }
    if let Some(e) = open_error {
        log::warn!("Log file unavailable, console only: {}", e);
    }

    let result = run(cli, config, &logger).await;
    if let Err(e) = &result {
        log::error!("{}", e);
    }
    logger.shutdown();
    result
}

async fn run(cli: Cli, mut config: Config, logger: &Logger) -> Result<()> {
    match cli.command {
        Command::Capture { output } => {
            config.validate()?;
            let store_path = output.unwrap_or_else(|| config.paths.single_store(&Local::now()));
            logger.header("Single capture");

            let fetcher = HttpFetcher::new(&config)?;
            let result =
                pipeline::run_cycle(&config, &fetcher, CaptureMode::Single, &store_path, logger)
                    .await;
            if !result.success {
                return Err(AppError::capture(result.error.unwrap_or_default()));
            }
            log::info!("Saved {} records to {}", result.news_count, store_path.display());
        }

        Command::Watch {
            output,
            interval,
            runner,
        } => {
            if let Some(minutes) = interval {
                config.schedule.interval_minutes = minutes;
            }
            if let Some(runner) = runner {
                config.schedule.runner = runner.into();
            }
            config.validate()?;
            let store_path = output.unwrap_or_else(|| config.paths.continuous_store(&Local::now()));
            log::info!("Store: {}", store_path.display());

            let runner: Box<dyn CycleRunner> = match config.schedule.runner {
                RunnerKind::InProcess => Box::new(InProcessRunner::new(
                    config.clone(),
                    Box::new(HttpFetcher::new(&config)?),
                    store_path,
                    logger.clone(),
                )),
                RunnerKind::ExternalProcess => {
                    let mut args: Vec<OsString> =
                        vec!["--config".into(), cli.config.clone().into_os_string()];
                    if cli.verbose {
                        args.push("--verbose".into());
                    }
                    args.extend(cli.overrides.to_args());
                    args.extend(["cycle".into(), "--output".into(), store_path.into_os_string()]);
                    Box::new(ExternalProcessRunner::current_exe(args)?)
                }
            };

            let mut scheduler = Scheduler::new(
                runner,
                config.schedule.interval(),
                config.janitor.clone(),
                config.paths.artifact_dirs().to_vec(),
                logger.clone(),
            );
            scheduler.stop_on_ctrl_c();
            scheduler.run().await?;
        }

        Command::Cycle { output } => {
            let fetcher = HttpFetcher::new(&config)?;
            let result =
                pipeline::run_cycle(&config, &fetcher, CaptureMode::Continuous, &output, logger)
                    .await;
            println!("{}", serde_json::to_string(&result)?);
        }

        Command::Clean => {
            logger.header("Cleaning artifact directories");
            let stats = janitor::clean_all(&config.paths.artifact_dirs(), &config.janitor).await;
            logger.summary(
                "Janitor",
                &[
                    ("Scanned", stats.scanned.to_string()),
                    ("Expired", stats.expired.to_string()),
                    ("Overflow", stats.overflow.to_string()),
                    ("Failed", stats.failed.to_string()),
                ],
            );
        }

        Command::Validate => {
            pipeline::run_validate(&config, logger)?;
            log::info!("All validations passed!");
        }

        Command::Info { store } => {
            let store_path = store.unwrap_or_else(|| config.paths.continuous_store(&Local::now()));
            if !store_path.exists() {
                log::info!("No store at {} yet.", store_path.display());
                return Ok(());
            }

            let store = CsvStore::new(&store_path);
            let state = store.load_state().await?;
            let records = store.load_records().await?;
            logger.summary(
                "Store",
                &[
                    ("Path", store_path.display().to_string()),
                    ("Records", records.len().to_string()),
                    ("Distinct fingerprints", state.len().to_string()),
                    ("Next number", state.next_number().to_string()),
                    (
                        "Last captured",
                        records
                            .last()
                            .map(|r| r.collect_time.clone())
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                ],
            );
        }
    }

    Ok(())
}
