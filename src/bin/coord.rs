//! Coordinator binary

use clap::{Parser, Subcommand};
use tableside::availability::TableStore;
use tableside::common::{parse_duration, Config, CoordinatorConfig};
use tableside::coordinator::{AvailabilitySource, Coordinator};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tableside-coord")]
#[command(about = "tableside reservation coordinator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start coordinator server
    Serve {
        /// Bind address for HTTP
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Availability store base URL
        #[arg(long)]
        availability: Option<String>,

        /// Bound on each availability store call (e.g. 500ms, 2s)
        #[arg(long)]
        upstream_timeout: Option<String>,

        /// Start with empty waitlists
        #[arg(long)]
        no_seed: bool,

        /// Run an in-process availability store instead of calling a remote one
        #[arg(long)]
        embedded: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config file first so its log level can seed the filter
    let config = Config::load();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            availability,
            upstream_timeout,
            no_seed,
            embedded,
        } => {
            // File config, then CLI overrides
            let mut coord_config: CoordinatorConfig = config.coordinator_or_default();
            if let Some(bind) = bind {
                coord_config.bind_addr = bind;
            }
            if let Some(url) = availability {
                coord_config.availability_url = url;
            }
            if let Some(timeout) = upstream_timeout {
                coord_config.upstream_timeout_ms = parse_duration(&timeout)?.as_millis() as u64;
            }
            if no_seed {
                coord_config.seed_waitlists = false;
            }

            let mut coord = Coordinator::new(coord_config);
            if embedded {
                coord = coord
                    .with_availability(AvailabilitySource::Embedded(Arc::new(TableStore::seeded())));
            }
            coord.serve().await?;
        }
    }

    Ok(())
}
