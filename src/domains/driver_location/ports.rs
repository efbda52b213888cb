use super::types::{AgentPosition, IndexHit};
use crate::common::{IndexError, IndexResult};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

/// Port for the geospatial store holding one position per driver id.
/// Adapters provide in-memory or Postgres-backed implementations.
#[async_trait]
pub trait GeoIndex: Send + Sync {
    /// Insert or replace the position for `driver_id`. Returns `true` when the id was new.
    async fn upsert(&self, driver_id: &str, latitude: f64, longitude: f64) -> IndexResult<bool>;

    /// Remove the stored position. Returns `false` when nothing was stored.
    async fn remove(&self, driver_id: &str) -> IndexResult<bool>;

    async fn position(&self, driver_id: &str) -> IndexResult<Option<AgentPosition>>;

    /// Drivers within `radius_km` of the center, ascending by distance, at most `limit` of them.
    async fn radius_query(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
        limit: usize,
    ) -> IndexResult<Vec<IndexHit>>;
}

/// Runs one index call, failing with `IndexError::Timeout` once `timeout` elapses.
pub async fn bounded<T, F>(timeout: Option<Duration>, call: F) -> IndexResult<T>
where
    F: Future<Output = IndexResult<T>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| IndexError::Timeout(limit))?,
        None => call.await,
    }
}
