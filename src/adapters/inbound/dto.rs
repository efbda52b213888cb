use crate::domains::driver_location::{
    validate_driver_id, validate_max_radius, AgentPosition, ProximityCandidate,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name to validation message.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveDriverLocationRequest {
    pub driver_id: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NearbyDriversRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub max_radius_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverLocationDto {
    pub driver_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub distance_km: Option<f64>,
}

/// Envelope shared by every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<T>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: &str, data: Option<T>) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data,
            timestamp: Utc::now(),
        }
    }
}

impl SaveDriverLocationRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        match self.driver_id.as_deref() {
            None => {
                errors.insert("driver_id".to_string(), "Driver ID is required".to_string());
            }
            Some(id) => {
                if let Err(e) = validate_driver_id(id) {
                    errors.insert("driver_id".to_string(), reason(&e));
                }
            }
        }
        check_latitude(self.latitude, &mut errors);
        check_longitude(self.longitude, &mut errors);

        finish(errors)
    }
}

impl NearbyDriversRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        check_latitude(self.latitude, &mut errors);
        check_longitude(self.longitude, &mut errors);
        if let Some(max) = self.max_radius_km {
            if let Err(e) = validate_max_radius(max) {
                errors.insert("max_radius_km".to_string(), reason(&e));
            }
        }

        finish(errors)
    }
}

fn check_latitude(value: Option<f64>, errors: &mut FieldErrors) {
    match value {
        None => {
            errors.insert("latitude".to_string(), "Latitude is required".to_string());
        }
        Some(lat) if !(-90.0..=90.0).contains(&lat) => {
            errors.insert(
                "latitude".to_string(),
                "Latitude must be between -90 and 90".to_string(),
            );
        }
        Some(_) => {}
    }
}

fn check_longitude(value: Option<f64>, errors: &mut FieldErrors) {
    match value {
        None => {
            errors.insert("longitude".to_string(), "Longitude is required".to_string());
        }
        Some(lon) if !(-180.0..=180.0).contains(&lon) => {
            errors.insert(
                "longitude".to_string(),
                "Longitude must be between -180 and 180".to_string(),
            );
        }
        Some(_) => {}
    }
}

fn reason(err: &crate::common::DomainError) -> String {
    use crate::common::DomainError::*;
    match err {
        InvalidCoordinate { reason }
        | InvalidIdentifier { reason }
        | InvalidSearchSpec { reason }
        | IndexUnavailable { reason } => reason.clone(),
        NotFound { .. } => err.to_string(),
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl From<AgentPosition> for DriverLocationDto {
    fn from(position: AgentPosition) -> Self {
        Self {
            driver_id: position.agent_id,
            latitude: position.latitude,
            longitude: position.longitude,
            distance_km: None,
        }
    }
}

impl From<ProximityCandidate> for DriverLocationDto {
    fn from(candidate: ProximityCandidate) -> Self {
        Self {
            driver_id: candidate.agent_id,
            latitude: candidate.latitude,
            longitude: candidate.longitude,
            distance_km: Some(candidate.distance_km),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_request_collects_every_field_error() {
        let request = SaveDriverLocationRequest {
            driver_id: Some("ab".to_string()),
            latitude: None,
            longitude: Some(200.0),
        };

        let errors = request.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors["latitude"], "Latitude is required");
        assert_eq!(errors["longitude"], "Longitude must be between -180 and 180");
        assert!(errors["driver_id"].contains("between 3 and 50"));
    }

    #[test]
    fn nearby_request_accepts_missing_max_radius() {
        let request: NearbyDriversRequest =
            serde_json::from_str(r#"{"latitude": 28.6139, "longitude": 77.2090}"#).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.max_radius_km, None);
    }

    #[test]
    fn nearby_request_rejects_non_positive_max_radius() {
        let request = NearbyDriversRequest {
            latitude: Some(0.0),
            longitude: Some(0.0),
            max_radius_km: Some(-1.0),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.contains_key("max_radius_km"));
    }

    #[test]
    fn lookup_dto_omits_distance() {
        let dto: DriverLocationDto = AgentPosition {
            agent_id: "DRV-1".to_string(),
            latitude: 1.5,
            longitude: 2.5,
        }
        .into();
        let json = serde_json::to_value(&dto).unwrap();
        assert!(json.get("distance_km").is_none());
        assert_eq!(json["driver_id"], "DRV-1");
    }

    #[test]
    fn empty_response_omits_data() {
        let response: ApiResponse<()> = ApiResponse::success("ok", None);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("data").is_none());
        assert!(json.get("timestamp").is_some());
    }
}
