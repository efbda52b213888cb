#![allow(dead_code)]

use async_trait::async_trait;
use driver_location::adapters::outbound::InMemoryGeoIndex;
use driver_location::application::DriverLocationService;
use driver_location::config::LocationConfig;
use driver_location::domains::driver_location::{offset_north, AgentPosition, GeoIndex, IndexHit};
use driver_location::{IndexError, IndexResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub const CENTER: (f64, f64) = (28.6139, 77.2090);

/// Wraps the in-memory index, counting calls and optionally failing reads or writes.
#[derive(Default)]
pub struct CountingIndex {
    inner: InMemoryGeoIndex,
    pub calls: AtomicUsize,
    pub radius_queries: AtomicUsize,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl CountingIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn radius_queries(&self) -> usize {
        self.radius_queries.load(Ordering::SeqCst)
    }

    fn write_guard(&self) -> IndexResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("write refused".to_string()));
        }
        Ok(())
    }

    fn read_guard(&self) -> IndexResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(IndexError::Unavailable("read refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl GeoIndex for CountingIndex {
    async fn upsert(&self, driver_id: &str, latitude: f64, longitude: f64) -> IndexResult<bool> {
        self.write_guard()?;
        self.inner.upsert(driver_id, latitude, longitude).await
    }

    async fn remove(&self, driver_id: &str) -> IndexResult<bool> {
        self.write_guard()?;
        self.inner.remove(driver_id).await
    }

    async fn position(&self, driver_id: &str) -> IndexResult<Option<AgentPosition>> {
        self.read_guard()?;
        self.inner.position(driver_id).await
    }

    async fn radius_query(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
        limit: usize,
    ) -> IndexResult<Vec<IndexHit>> {
        self.radius_queries.fetch_add(1, Ordering::SeqCst);
        self.read_guard()?;
        self.inner
            .radius_query(center_lat, center_lon, radius_km, limit)
            .await
    }
}

pub fn location_config(required: usize, max_radius_km: f64) -> LocationConfig {
    LocationConfig {
        required_result_count: required,
        max_search_radius_km: max_radius_km,
        radius_ladder_km: vec![2.0, 5.0, 7.0, 10.0, 15.0],
    }
}

pub fn service(index: Arc<dyn GeoIndex>, config: LocationConfig) -> DriverLocationService {
    DriverLocationService::new(index, config)
}

/// Stores `driver_id` `km` due north of `CENTER`.
pub async fn place_north(service: &DriverLocationService, driver_id: &str, km: f64) {
    service
        .save_driver_location(driver_id, offset_north(CENTER.0, km), CENTER.1)
        .await
        .unwrap();
}
