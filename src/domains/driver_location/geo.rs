/// Mean Earth radius used by Redis GEO commands, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6372.797560856;

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();
    EARTH_RADIUS_KM * c
}

/// Rounds a distance to two decimal places.
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}

/// Latitude reached by moving `distance_km` due north (negative moves south).
pub fn offset_north(latitude: f64, distance_km: f64) -> f64 {
    latitude + (distance_km / EARTH_RADIUS_KM).to_degrees()
}
