mod cmd;
mod modules;

use crate::cmd::{
    analyze::{self, AnalyzeArgs},
    plan::{self, PlanArgs},
    recommend::{self, RecommendArgs},
    server::{self, ServerArgs},
    summary::{self, SummaryArgs},
    sync::{self, SyncArgs},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "cp_coach")]
#[command(about = "Practice analytics and problem recommendations for Codeforces and LeetCode")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Pull accepted submissions and rating changes into the history store
    Sync(SyncArgs),
    /// Print the weak/strong tag classification
    Analyze(AnalyzeArgs),
    /// Print today's training plan
    Plan(PlanArgs),
    /// Print recommended practice problems
    Recommend(RecommendArgs),
    /// Print the practice summary of the last days
    Summary(SummaryArgs),
    /// Run the HTTP API
    Server(ServerArgs),
}

fn main() -> Result<()> {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_str(&log_level)
                .context("couldn't parse specified log level")?
                .into(),
        )
        .from_env_lossy();
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(OffsetTime::local_rfc_3339().context("couldn't determine local time offset")?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;

    match Cli::parse().command {
        Commands::Sync(args) => runtime.block_on(sync::run(args)),
        Commands::Analyze(args) => runtime.block_on(analyze::run(args)),
        Commands::Plan(args) => runtime.block_on(plan::run(args)),
        Commands::Recommend(args) => runtime.block_on(recommend::run(args)),
        Commands::Summary(args) => runtime.block_on(summary::run(args)),
        Commands::Server(args) => runtime.block_on(server::run(args)),
    }
}
