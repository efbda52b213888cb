use crate::common::{DomainError, DomainResult};
use crate::config::LocationConfig;
use crate::domains::driver_location::{
    bounded, require_driver_id, validate_coordinates, validate_driver_id, AgentPosition,
    ExpandingRadiusSearch, GeoIndex, ProximityCandidate, SearchSpec,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Entry point for saving, finding, reading and removing driver positions.
///
/// Inputs are validated before any index call. Write paths fail fast on index errors;
/// nearby searches absorb failures per radius tier and only report `IndexUnavailable`
/// when no tier could be read at all.
pub struct DriverLocationService {
    index: Arc<dyn GeoIndex>,
    search: ExpandingRadiusSearch,
    defaults: LocationConfig,
    call_timeout: Option<Duration>,
}

impl DriverLocationService {
    pub fn new(index: Arc<dyn GeoIndex>, defaults: LocationConfig) -> Self {
        Self {
            search: ExpandingRadiusSearch::new(index.clone()),
            index,
            defaults,
            call_timeout: None,
        }
    }

    /// Bounds every individual index call made by this service.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self.search = match timeout {
            Some(t) => ExpandingRadiusSearch::new(self.index.clone()).with_call_timeout(t),
            None => ExpandingRadiusSearch::new(self.index.clone()),
        };
        self
    }

    pub fn defaults(&self) -> &LocationConfig {
        &self.defaults
    }

    pub async fn save_driver_location(
        &self,
        driver_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> DomainResult<()> {
        validate_driver_id(driver_id)?;
        validate_coordinates(latitude, longitude)?;

        let created = bounded(
            self.call_timeout,
            self.index.upsert(driver_id, latitude, longitude),
        )
        .await
        .map_err(|e| {
            error!(driver_id, error = %e, "Failed to save driver location");
            DomainError::from(e)
        })?;

        if created {
            info!(driver_id, lat = latitude, lon = longitude, "Driver location saved");
        } else {
            info!(driver_id, lat = latitude, lon = longitude, "Driver location updated");
        }
        Ok(())
    }

    /// Nearby drivers using the configured ladder; `max_radius_km` replaces the configured cap.
    pub async fn find_nearby_drivers(
        &self,
        latitude: f64,
        longitude: f64,
        max_radius_km: Option<f64>,
    ) -> DomainResult<Vec<ProximityCandidate>> {
        self.find_nearby(latitude, longitude, max_radius_km, None)
            .await
    }

    /// Like [`find_nearby_drivers`](Self::find_nearby_drivers), but stops widening the
    /// search once `deadline` has passed and returns what was found so far.
    pub async fn find_nearby_drivers_until(
        &self,
        latitude: f64,
        longitude: f64,
        max_radius_km: Option<f64>,
        deadline: Instant,
    ) -> DomainResult<Vec<ProximityCandidate>> {
        self.find_nearby(latitude, longitude, max_radius_km, Some(deadline))
            .await
    }

    async fn find_nearby(
        &self,
        latitude: f64,
        longitude: f64,
        max_radius_km: Option<f64>,
        deadline: Option<Instant>,
    ) -> DomainResult<Vec<ProximityCandidate>> {
        validate_coordinates(latitude, longitude)?;
        let spec = self.search_spec(latitude, longitude, max_radius_km)?;

        let outcome = self.search.run_until(&spec, deadline).await;

        if outcome.index_unreachable() {
            error!(
                lat = latitude,
                lon = longitude,
                tiers = outcome.tiers_attempted,
                "Every radius tier failed"
            );
            return Err(DomainError::IndexUnavailable {
                reason: "Failed to retrieve nearby drivers".to_string(),
            });
        }

        if outcome.tiers_failed > 0 {
            warn!(
                failed = outcome.tiers_failed,
                attempted = outcome.tiers_attempted,
                "Nearby search returned partial results"
            );
        }

        info!(
            lat = latitude,
            lon = longitude,
            found = outcome.candidates.len(),
            "Found nearby drivers"
        );
        Ok(outcome.candidates)
    }

    pub async fn get_driver_location(&self, driver_id: &str) -> DomainResult<AgentPosition> {
        require_driver_id(driver_id)?;

        let position = bounded(self.call_timeout, self.index.position(driver_id))
            .await
            .map_err(|e| {
                error!(driver_id, error = %e, "Failed to get driver location");
                DomainError::from(e)
            })?;

        position.ok_or_else(|| DomainError::NotFound {
            driver_id: driver_id.to_string(),
        })
    }

    /// Idempotent: removing a driver that has no stored position succeeds.
    pub async fn delete_driver_location(&self, driver_id: &str) -> DomainResult<()> {
        require_driver_id(driver_id)?;

        let removed = bounded(self.call_timeout, self.index.remove(driver_id))
            .await
            .map_err(|e| {
                error!(driver_id, error = %e, "Failed to delete driver location");
                DomainError::from(e)
            })?;

        if removed {
            info!(driver_id, "Driver location deleted");
        } else {
            warn!(driver_id, "Driver location not found for deletion");
        }
        Ok(())
    }

    fn search_spec(
        &self,
        latitude: f64,
        longitude: f64,
        max_radius_km: Option<f64>,
    ) -> DomainResult<SearchSpec> {
        SearchSpec::new(
            latitude,
            longitude,
            self.defaults.radius_ladder_km.clone(),
            max_radius_km.unwrap_or(self.defaults.max_search_radius_km),
            self.defaults.required_result_count,
        )
    }
}
