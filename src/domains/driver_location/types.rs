use super::validation::{validate_coordinates, validate_max_radius, validate_radius_ladder};
use crate::common::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};

/// The single stored position of a driver. A newer upsert for the same id replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPosition {
    pub agent_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A driver accepted by the expanding search, with its distance rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityCandidate {
    pub agent_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

/// One raw entry of a radius query, before dedup and acceptance.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexHit {
    pub agent_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_km: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpec {
    pub center_lat: f64,
    pub center_lon: f64,
    /// Radius ladder in km, strictly increasing.
    pub radii: Vec<f64>,
    pub max_radius_km: f64,
    pub target_count: usize,
}

impl SearchSpec {
    pub fn new(
        center_lat: f64,
        center_lon: f64,
        radii: Vec<f64>,
        max_radius_km: f64,
        target_count: usize,
    ) -> DomainResult<Self> {
        validate_coordinates(center_lat, center_lon)?;
        validate_radius_ladder(&radii)?;
        validate_max_radius(max_radius_km)?;

        if target_count == 0 {
            return Err(DomainError::InvalidSearchSpec {
                reason: "Target count must be greater than zero".to_string(),
            });
        }

        Ok(Self {
            center_lat,
            center_lon,
            radii,
            max_radius_km,
            target_count,
        })
    }

    /// Per-tier fetch cap; extra room absorbs drivers already accepted at a smaller radius.
    pub fn overfetch_limit(&self) -> usize {
        self.target_count.saturating_mul(2)
    }
}

impl From<IndexHit> for ProximityCandidate {
    fn from(hit: IndexHit) -> Self {
        Self {
            agent_id: hit.agent_id,
            latitude: hit.latitude,
            longitude: hit.longitude,
            distance_km: super::geo::round_km(hit.distance_km),
        }
    }
}
