//! tmt-gen - medal time generator
//!
//! **Usage:**
//! ```bash
//! tmt-gen --author <NAME> --prefix <PREFIX> [--out <FILE|->] [--max-maps <N>]
//! ```
//!
//! The JSON report goes to stdout (or `--out`); logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tmt_common::config::{load_config, CliOverrides, Settings};
use tmt_gen::pipeline::{MedalPipeline, PipelineOptions};
use tmt_gen::report::{self, STDOUT_TARGET};
use tmt_gen::{Endpoints, ReqwestGateway};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Medal time generator
#[derive(Parser, Debug)]
#[clap(name = "tmt-gen")]
#[clap(about = "Compute medal times for an author's trackmania.exchange tracks")]
struct Args {
    /// Track author (uploader or co-author), case-insensitive
    #[clap(long)]
    author: String,

    /// Track name prefix, case-insensitive
    #[clap(long)]
    prefix: String,

    /// Output file, `-` for stdout
    #[clap(long, value_name = "FILE", default_value = STDOUT_TARGET)]
    out: String,

    /// HTTP User-Agent header
    #[clap(long)]
    user_agent: Option<String>,

    /// Maximum number of tracks to process
    #[clap(long)]
    max_maps: Option<usize>,

    /// Tracks fetched concurrently (1-16)
    #[clap(long)]
    workers: Option<usize>,

    /// Config file (default: $TMT_CONFIG, then <config_dir>/tmt/config.toml)
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also compute from TMX replays and log the comparison
    #[clap(long)]
    diagnose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml_config = load_config(args.config.as_deref()).context("Failed to load configuration")?;

    let cli = CliOverrides {
        user_agent: args.user_agent.clone(),
        max_maps: args.max_maps,
        workers: args.workers,
    };
    let settings = Settings::resolve(&cli, &toml_config);

    // Logs to stderr; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        author = %args.author,
        prefix = %args.prefix,
        max_maps = settings.max_maps,
        workers = settings.workers,
        user_agent = %settings.user_agent,
        "Starting medal time generation"
    );

    let gateway = ReqwestGateway::new(
        settings.user_agent.clone(),
        Duration::from_secs(settings.request_timeout_secs),
        settings.requests_per_second,
    )
    .context("Failed to build HTTP client")?;

    let pipeline = MedalPipeline::new(
        Arc::new(gateway),
        Endpoints::default(),
        PipelineOptions {
            max_maps: settings.max_maps,
            workers: settings.workers,
            leaderboard_length: settings.leaderboard_length,
            diagnose: args.diagnose,
        },
    );

    let report = pipeline
        .run(&args.author, &args.prefix)
        .await
        .context("Medal time generation failed")?;

    report::write_report(&report, &args.out)
        .with_context(|| format!("Failed to write report to {}", args.out))?;

    Ok(())
}
