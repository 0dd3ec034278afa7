//! Availability store server

use crate::availability::http::{create_router, AvailabilityState};
use crate::availability::store::TableStore;
use crate::common::utils::shutdown_signal;
use crate::common::{AvailabilityConfig, Result};
use std::sync::Arc;

pub struct AvailabilityServer {
    config: AvailabilityConfig,
    store: Arc<TableStore>,
}

impl AvailabilityServer {
    pub fn new(config: AvailabilityConfig) -> Self {
        let store = if config.seed_tables {
            TableStore::seeded()
        } else {
            TableStore::new()
        };
        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: AvailabilityConfig, store: Arc<TableStore>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> Arc<TableStore> {
        self.store.clone()
    }

    pub async fn serve(self) -> Result<()> {
        tracing::info!("Starting availability store");
        tracing::info!("  HTTP API: {}", self.config.bind_addr);
        tracing::info!("  Tables: {}", self.store.list().len());

        let router = create_router(AvailabilityState {
            store: self.store.clone(),
        });

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!("✓ Availability store ready");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Availability store stopped");
        Ok(())
    }
}
