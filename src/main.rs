//! Game service runner (default binary).
//!
//! Serves the line-delimited JSON protocol over TCP. Settings come from the
//! `BLOCKFIT_*` environment variables; command-line flags override them.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::prelude::*;

use blockfit::adapter::{run_server, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "blockfit-server", version, about = "8x8 block-placement puzzle server")]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count, help = "Increase verbosity level (-v = INFO, -vv = DEBUG, -vvv = TRACE)")]
    verbose: u8,

    #[arg(long, help = "Bind address (overrides BLOCKFIT_HOST)")]
    host: Option<String>,

    #[arg(long, help = "Port number (overrides BLOCKFIT_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "JSON-lines file for finished games (overrides BLOCKFIT_RESULTS_PATH)")]
    results_path: Option<PathBuf>,

    #[arg(long, help = "Base seed for reproducible dealing (overrides BLOCKFIT_SEED)")]
    seed: Option<u64>,
}

impl Cli {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(path) = self.results_path {
            config.results_path = Some(path);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config
    }
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = log_level(cli.verbose);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();

    let config = cli.apply(ServerConfig::from_env());
    tracing::info!(?config, "starting blockfit-server");

    run_server(config, None).await
}
