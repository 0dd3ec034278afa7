//! Coordinator server

use crate::availability::TableStore;
use crate::common::utils::shutdown_signal;
use crate::common::{CoordinatorConfig, Result};
use crate::coordinator::availability_client::{AvailabilityClient, HttpAvailabilityClient};
use crate::coordinator::engine::ReservationEngine;
use crate::coordinator::http::{create_router, CoordState};
use crate::coordinator::ledger::{MemLedger, ReservationLedger};
use crate::coordinator::seed::Seed;
use std::sync::Arc;

/// Where the coordinator reads and commands table availability
pub enum AvailabilitySource {
    /// Remote store at `CoordinatorConfig::availability_url`
    Remote,
    /// In-process store, for single-binary demos
    Embedded(Arc<TableStore>),
}

pub struct Coordinator {
    config: CoordinatorConfig,
    source: AvailabilitySource,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            config,
            source: AvailabilitySource::Remote,
        }
    }

    pub fn with_availability(mut self, source: AvailabilitySource) -> Self {
        self.source = source;
        self
    }

    /// Build the engine with its initial state. Split from `serve` so tests can drive it.
    pub fn build_engine(&self) -> Result<ReservationEngine> {
        let availability: Arc<dyn AvailabilityClient> = match &self.source {
            AvailabilitySource::Remote => {
                let client = HttpAvailabilityClient::new(
                    &self.config.availability_url,
                    self.config.upstream_timeout(),
                )?;
                Arc::new(client) as Arc<dyn AvailabilityClient>
            }
            AvailabilitySource::Embedded(store) => store.clone() as Arc<dyn AvailabilityClient>,
        };

        let ledger: Arc<dyn ReservationLedger> = Arc::new(MemLedger::new());
        if self.config.seed_waitlists {
            Seed::house().apply(ledger.as_ref());
        }

        Ok(ReservationEngine::new(
            availability,
            ledger,
            self.config.upstream_timeout(),
        ))
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting reservation coordinator");
        tracing::info!("  HTTP API: {}", self.config.bind_addr);
        match &self.source {
            AvailabilitySource::Remote => {
                tracing::info!("  Availability store: {}", self.config.availability_url)
            }
            AvailabilitySource::Embedded(_) => tracing::info!("  Availability store: embedded"),
        }
        tracing::info!("  Upstream timeout: {:?}", self.config.upstream_timeout());

        let engine = Arc::new(self.build_engine()?);
        let router = create_router(CoordState { engine }, self.config.max_body_bytes);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("✓ Coordinator ready");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Coordinator stopped");
        Ok(())
    }
}
