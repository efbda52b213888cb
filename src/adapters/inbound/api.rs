use super::dto::{
    ApiResponse, DriverLocationDto, FieldErrors, NearbyDriversRequest, SaveDriverLocationRequest,
};
use crate::application::DriverLocationService;
use crate::common::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

pub const STATUS_OK: u16 = 200;
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

#[derive(Debug, Clone, Serialize)]
pub struct ApiReply<T> {
    pub status: u16,
    pub body: ApiResponse<T>,
}

/// Failures carry field errors only for request validation; otherwise `data` is empty.
pub type ApiOutcome<T> = Result<ApiReply<T>, ApiReply<FieldErrors>>;

/// One line of the JSON-lines protocol, tagged by `op`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ApiRequest {
    SaveDriverLocation(SaveDriverLocationRequest),
    FindNearbyDrivers(NearbyDriversRequest),
    GetDriverLocation { driver_id: String },
    DeleteDriverLocation { driver_id: String },
}

impl ApiRequest {
    fn name(&self) -> &'static str {
        match self {
            ApiRequest::SaveDriverLocation(_) => "save_driver_location",
            ApiRequest::FindNearbyDrivers(_) => "find_nearby_drivers",
            ApiRequest::GetDriverLocation { .. } => "get_driver_location",
            ApiRequest::DeleteDriverLocation { .. } => "delete_driver_location",
        }
    }
}

/// Turns transport-level requests into service calls and service results into
/// status codes plus an `ApiResponse` envelope.
#[derive(Clone)]
pub struct LocationApi {
    service: Arc<DriverLocationService>,
}

impl LocationApi {
    pub fn new(service: Arc<DriverLocationService>) -> Self {
        Self { service }
    }

    pub async fn save_driver_location(&self, request: SaveDriverLocationRequest) -> ApiOutcome<()> {
        request.validate().map_err(validation_failed)?;
        let driver_id = request.driver_id.unwrap_or_default();
        info!(driver_id = %driver_id, "Saving location for driver");

        self.service
            .save_driver_location(
                &driver_id,
                request.latitude.unwrap_or(f64::NAN),
                request.longitude.unwrap_or(f64::NAN),
            )
            .await
            .map_err(|e| failure(e, "Failed to save driver location"))?;

        Ok(ApiReply {
            status: STATUS_CREATED,
            body: ApiResponse::success("Driver location saved successfully", None),
        })
    }

    pub async fn find_nearby_drivers(
        &self,
        request: NearbyDriversRequest,
    ) -> ApiOutcome<Vec<DriverLocationDto>> {
        request.validate().map_err(validation_failed)?;
        let latitude = request.latitude.unwrap_or(f64::NAN);
        let longitude = request.longitude.unwrap_or(f64::NAN);
        info!(lat = latitude, lon = longitude, "Searching for drivers");

        let drivers = self
            .service
            .find_nearby_drivers(latitude, longitude, request.max_radius_km)
            .await
            .map_err(|e| failure(e, "Failed to retrieve nearby drivers"))?;

        let drivers: Vec<DriverLocationDto> = drivers.into_iter().map(Into::into).collect();
        info!(found = drivers.len(), "Found nearby drivers");

        Ok(ApiReply {
            status: STATUS_OK,
            body: ApiResponse::success("Nearby drivers retrieved successfully", Some(drivers)),
        })
    }

    pub async fn get_driver_location(&self, driver_id: &str) -> ApiOutcome<DriverLocationDto> {
        info!(driver_id, "Fetching location for driver");

        let position = self
            .service
            .get_driver_location(driver_id)
            .await
            .map_err(|e| failure(e, "Failed to retrieve driver location"))?;

        Ok(ApiReply {
            status: STATUS_OK,
            body: ApiResponse::success(
                "Driver location retrieved successfully",
                Some(position.into()),
            ),
        })
    }

    pub async fn delete_driver_location(&self, driver_id: &str) -> ApiOutcome<()> {
        info!(driver_id, "Deleting location for driver");

        self.service
            .delete_driver_location(driver_id)
            .await
            .map_err(|e| failure(e, "Failed to delete driver location"))?;

        Ok(ApiReply {
            status: STATUS_OK,
            body: ApiResponse::success("Driver location deleted successfully", None),
        })
    }

    pub async fn handle(&self, request: ApiRequest) -> Value {
        let span = info_span!("request", request_id = %Uuid::new_v4(), op = request.name());

        async move {
            match request {
                ApiRequest::SaveDriverLocation(req) => to_json(self.save_driver_location(req).await),
                ApiRequest::FindNearbyDrivers(req) => to_json(self.find_nearby_drivers(req).await),
                ApiRequest::GetDriverLocation { driver_id } => {
                    to_json(self.get_driver_location(&driver_id).await)
                }
                ApiRequest::DeleteDriverLocation { driver_id } => {
                    to_json(self.delete_driver_location(&driver_id).await)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Handles one JSON-lines request and renders the reply as a single JSON line.
    pub async fn handle_line(&self, line: &str) -> String {
        let reply = match serde_json::from_str::<ApiRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                error!(error = %e, "Malformed request");
                let body: ApiResponse<()> =
                    ApiResponse::error(&format!("Malformed request: {}", e), None);
                to_json::<(), ()>(Err(ApiReply {
                    status: STATUS_BAD_REQUEST,
                    body,
                }))
            }
        };
        reply.to_string()
    }
}

fn validation_failed(errors: FieldErrors) -> ApiReply<FieldErrors> {
    error!(?errors, "Validation failed");
    ApiReply {
        status: STATUS_BAD_REQUEST,
        body: ApiResponse::error("Validation failed", Some(errors)),
    }
}

/// Maps a service error to its status code. Index failures get `operation_failure`
/// as their message so store internals stay out of responses.
fn failure(err: DomainError, operation_failure: &str) -> ApiReply<FieldErrors> {
    let (status, message) = match &err {
        DomainError::NotFound { .. } => (STATUS_NOT_FOUND, err.to_string()),
        DomainError::IndexUnavailable { .. } => {
            error!(error = %err, "Location service error");
            (STATUS_INTERNAL_ERROR, operation_failure.to_string())
        }
        DomainError::InvalidCoordinate { reason }
        | DomainError::InvalidIdentifier { reason }
        | DomainError::InvalidSearchSpec { reason } => (STATUS_BAD_REQUEST, reason.clone()),
    };

    ApiReply {
        status,
        body: ApiResponse::error(&message, None),
    }
}

fn to_json<T: Serialize, E: Serialize>(outcome: Result<ApiReply<T>, ApiReply<E>>) -> Value {
    let rendered = match outcome {
        Ok(reply) => serde_json::to_value(reply),
        Err(reply) => serde_json::to_value(reply),
    };
    rendered.unwrap_or_else(|e| {
        json!({
            "status": STATUS_INTERNAL_ERROR,
            "body": {
                "success": false,
                "message": format!("Failed to render response: {}", e),
            }
        })
    })
}
