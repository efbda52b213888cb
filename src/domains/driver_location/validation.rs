use crate::common::{DomainError, DomainResult};

pub const MIN_DRIVER_ID_LEN: usize = 3;
pub const MAX_DRIVER_ID_LEN: usize = 50;

/// Rejects NaN (absent) values and anything outside [-90, 90] / [-180, 180].
pub fn validate_coordinates(latitude: f64, longitude: f64) -> DomainResult<()> {
    if latitude.is_nan() || longitude.is_nan() {
        return Err(DomainError::InvalidCoordinate {
            reason: "Latitude and longitude cannot be null".to_string(),
        });
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(DomainError::InvalidCoordinate {
            reason: "Latitude must be between -90 and 90".to_string(),
        });
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::InvalidCoordinate {
            reason: "Longitude must be between -180 and 180".to_string(),
        });
    }

    Ok(())
}

/// Id check for lookups and deletes: present and non-blank.
pub fn require_driver_id(driver_id: &str) -> DomainResult<()> {
    if driver_id.trim().is_empty() {
        return Err(DomainError::InvalidIdentifier {
            reason: "Driver ID is required".to_string(),
        });
    }
    Ok(())
}

/// Id check for writes: non-blank and within the accepted length bounds.
pub fn validate_driver_id(driver_id: &str) -> DomainResult<()> {
    require_driver_id(driver_id)?;

    let len = driver_id.chars().count();
    if !(MIN_DRIVER_ID_LEN..=MAX_DRIVER_ID_LEN).contains(&len) {
        return Err(DomainError::InvalidIdentifier {
            reason: format!(
                "Driver ID must be between {} and {} characters",
                MIN_DRIVER_ID_LEN, MAX_DRIVER_ID_LEN
            ),
        });
    }
    Ok(())
}

pub fn validate_radius_ladder(radii: &[f64]) -> DomainResult<()> {
    if radii.is_empty() {
        return Err(DomainError::InvalidSearchSpec {
            reason: "Radius ladder must not be empty".to_string(),
        });
    }

    if radii.iter().any(|r| !r.is_finite() || *r <= 0.0) {
        return Err(DomainError::InvalidSearchSpec {
            reason: "Every radius must be a positive number of kilometers".to_string(),
        });
    }

    if radii.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(DomainError::InvalidSearchSpec {
            reason: "Radius ladder must be strictly increasing".to_string(),
        });
    }

    Ok(())
}

pub fn validate_max_radius(max_radius_km: f64) -> DomainResult<()> {
    if !max_radius_km.is_finite() || max_radius_km <= 0.0 {
        return Err(DomainError::InvalidSearchSpec {
            reason: "Maximum search radius must be a positive number of kilometers".to_string(),
        });
    }
    Ok(())
}
