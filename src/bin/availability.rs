use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tableside::availability::AvailabilityServer;
use tableside::common::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tableside-availability")]
#[command(about = "tableside availability store - owns table availability flags")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the availability store
    Serve {
        /// Bind address for HTTP
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Start with no tables
        #[arg(long)]
        no_seed: bool,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load();

    let Commands::Serve {
        bind,
        no_seed,
        log_level,
    } = args.command;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.unwrap_or(config.log_level.clone()).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut avail_config = config.availability_or_default();
    if let Some(bind) = bind {
        avail_config.bind_addr = bind;
    }
    if no_seed {
        avail_config.seed_tables = false;
    }

    AvailabilityServer::new(avail_config).serve().await?;

    Ok(())
}
