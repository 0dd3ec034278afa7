//! Client side of the availability store contract
//!
//! `HttpAvailabilityClient` talks to a remote store; `TableStore` answers in-process when the
//! coordinator runs with an embedded store.

use crate::availability::TableStore;
use crate::common::{encode_segment, AvailabilityUpdate, Error, Result, Table};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Read and command table availability. A missing table is `Error::TableNotFound`; every
/// other failure is `Error::UpstreamUnavailable`.
#[async_trait]
pub trait AvailabilityClient: Send + Sync {
    async fn get_table(&self, table_id: &str) -> Result<Table>;

    async fn set_table_availability(&self, table_id: &str, available: bool) -> Result<Table>;
}

pub struct HttpAvailabilityClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAvailabilityClient {
    /// `timeout` bounds each whole request, connect included.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table_id: &str) -> String {
        format!("{}/tables/{}", self.base_url, encode_segment(table_id))
    }

    async fn read_table(table_id: &str, response: reqwest::Response) -> Result<Table> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::TableNotFound(table_id.to_string())),
            status if !status.is_success() => Err(Error::UpstreamUnavailable(format!(
                "availability store answered {} for table {}",
                status, table_id
            ))),
            _ => Ok(response.json::<Table>().await?),
        }
    }
}

#[async_trait]
impl AvailabilityClient for HttpAvailabilityClient {
    async fn get_table(&self, table_id: &str) -> Result<Table> {
        let response = self.client.get(self.table_url(table_id)).send().await?;
        Self::read_table(table_id, response).await
    }

    async fn set_table_availability(&self, table_id: &str, available: bool) -> Result<Table> {
        let response = self
            .client
            .put(self.table_url(table_id))
            .json(&AvailabilityUpdate { available })
            .send()
            .await?;
        Self::read_table(table_id, response).await
    }
}

#[async_trait]
impl AvailabilityClient for TableStore {
    async fn get_table(&self, table_id: &str) -> Result<Table> {
        self.get(table_id)
            .ok_or_else(|| Error::TableNotFound(table_id.to_string()))
    }

    async fn set_table_availability(&self, table_id: &str, available: bool) -> Result<Table> {
        self.set_available(table_id, available)
            .ok_or_else(|| Error::TableNotFound(table_id.to_string()))
    }
}
