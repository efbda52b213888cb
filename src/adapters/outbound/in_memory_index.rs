use crate::common::IndexResult;
use crate::domains::driver_location::{haversine_km, AgentPosition, GeoIndex, IndexHit};
use async_trait::async_trait;
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory geo index for tests and single-process deployments.
/// Radius queries compute the haversine distance to every stored driver.
#[derive(Debug, Default)]
pub struct InMemoryGeoIndex {
    positions: RwLock<HashMap<String, (f64, f64)>>,
}

impl InMemoryGeoIndex {
    pub fn new() -> Self {
        Self {
            positions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.positions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.positions.read().await.is_empty()
    }
}

#[async_trait]
impl GeoIndex for InMemoryGeoIndex {
    async fn upsert(&self, driver_id: &str, latitude: f64, longitude: f64) -> IndexResult<bool> {
        let mut store = self.positions.write().await;
        let previous = store.insert(driver_id.to_string(), (latitude, longitude));
        Ok(previous.is_none())
    }

    async fn remove(&self, driver_id: &str) -> IndexResult<bool> {
        let mut store = self.positions.write().await;
        Ok(store.remove(driver_id).is_some())
    }

    async fn position(&self, driver_id: &str) -> IndexResult<Option<AgentPosition>> {
        let store = self.positions.read().await;
        Ok(store
            .get(driver_id)
            .map(|&(latitude, longitude)| AgentPosition {
                agent_id: driver_id.to_string(),
                latitude,
                longitude,
            }))
    }

    async fn radius_query(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
        limit: usize,
    ) -> IndexResult<Vec<IndexHit>> {
        let store = self.positions.read().await;

        let mut hits: Vec<IndexHit> = store
            .iter()
            .filter_map(|(id, &(latitude, longitude))| {
                let distance_km = haversine_km(center_lat, center_lon, latitude, longitude);
                (distance_km <= radius_km).then(|| IndexHit {
                    agent_id: id.clone(),
                    latitude,
                    longitude,
                    distance_km,
                })
            })
            .collect();

        // Ties broken by id so results are stable across HashMap iteration orders.
        hits.sort_by(|a, b| {
            OrderedFloat(a.distance_km)
                .cmp(&OrderedFloat(b.distance_km))
                .then_with(|| a.agent_id.cmp(&b.agent_id))
        });
        hits.truncate(limit);

        Ok(hits)
    }
}
