//! CLI for reservation operations

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tableside::common::encode_segment;
use tableside::coordinator::ReservationRequest;

#[derive(Parser)]
#[command(name = "tableside")]
#[command(about = "tableside reservation CLI")]
#[command(version)]
struct Cli {
    /// Coordinator URL
    #[arg(long, default_value = "http://localhost:3001")]
    coordinator: String,

    /// Availability store URL
    #[arg(long, default_value = "http://localhost:3000")]
    availability: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reserve a table (joins the waitlist if it is taken)
    Reserve {
        table_id: String,
        customer_id: String,

        /// Seating preference, repeatable
        #[arg(long = "pref")]
        preferences: Vec<String>,
    },

    /// Cancel a reservation or leave a waitlist
    Cancel {
        table_id: String,
        customer_id: String,
    },

    /// List tables in the availability store
    Tables,

    /// List active reservations
    Reservations,

    /// Show a table's waitlist
    Waitlist { table_id: String },

    /// List cancellations whose table release failed
    Divergences,

    /// Settle a flagged table
    Reconcile { table_id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let coord = cli.coordinator.trim_end_matches('/');

    let response = match cli.command {
        Commands::Reserve {
            table_id,
            customer_id,
            preferences,
        } => {
            let mut request = ReservationRequest::reserve(table_id, customer_id);
            if !preferences.is_empty() {
                request = request.with_preferences(preferences);
            }
            client
                .post(format!("{}/reservations", coord))
                .json(&request)
                .send()
                .await
        }
        Commands::Cancel {
            table_id,
            customer_id,
        } => {
            client
                .post(format!("{}/reservations", coord))
                .json(&ReservationRequest::cancel(table_id, customer_id))
                .send()
                .await
        }
        Commands::Tables => {
            let url = format!("{}/tables", cli.availability.trim_end_matches('/'));
            client.get(url).send().await
        }
        Commands::Reservations => client.get(format!("{}/reservations", coord)).send().await,
        Commands::Waitlist { table_id } => {
            let url = format!("{}/waitlists/{}", coord, encode_segment(&table_id));
            client.get(url).send().await
        }
        Commands::Divergences => {
            client
                .get(format!("{}/admin/divergences", coord))
                .send()
                .await
        }
        Commands::Reconcile { table_id } => {
            let url = format!("{}/admin/reconcile/{}", coord, encode_segment(&table_id));
            client.post(url).send().await
        }
    }
    .context("request failed")?;

    let status = response.status();
    let body: Value = response.json().await.context("response was not JSON")?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        anyhow::bail!("server answered {}", status);
    }
    Ok(())
}
