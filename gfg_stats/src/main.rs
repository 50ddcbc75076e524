mod cmd;
mod modules;

use crate::cmd::{
    fetch::{self, FetchArgs},
    server::{self, ServerArgs},
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, process, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "gfg_stats")]
#[command(about = "GeeksforGeeks profile statistics API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the statistics API
    Server(ServerArgs),
    /// Fetch statistics of one user and print them as JSON
    Fetch(FetchArgs),
}

fn main() {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let level = LevelFilter::from_str(&log_level).unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let timer = match OffsetTime::local_rfc_3339() {
        Ok(timer) => timer,
        Err(e) => {
            eprintln!("couldn't determine local time offset: {}", e);
            process::exit(1);
        }
    };
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(timer);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set tracing subscriber: {}", e);
        process::exit(1);
    }

    let runtime = match Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("failed to build async runtime: {}", e);
            process::exit(1);
        }
    };

    let result = match Cli::parse().command {
        Commands::Server(args) => runtime.block_on(server::run(args)),
        Commands::Fetch(args) => runtime.block_on(fetch::run(args)),
    };

    if let Err(e) = result {
        tracing::error!("command failed: {:?}", e);
        process::exit(1);
    }
}
