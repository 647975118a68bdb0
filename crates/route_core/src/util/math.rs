use crate::{constants::EARTH_RADIUS_KM, network::Coord};

/// Great-circle distance between two coordinates in kilometres (Haversine formula)
pub fn haversine_km(src: &Coord, dst: &Coord) -> f64 {
    let lat1 = src.lat.to_radians();
    let lat2 = dst.lat.to_radians();
    let lon1 = src.lon.to_radians();
    let lon2 = dst.lon.to_radians();
    let a = (lat2 - lat1) / 2.0;
    let b = (lon2 - lon1) / 2.0;
    let c = a.sin().powi(2) + lat1.cos() * lat2.cos() * b.sin().powi(2);
    let d = 2.0 * c.sqrt().asin();

    EARTH_RADIUS_KM * d
}

/// Minutes needed to cover `distance_km` at `speed_kmh`
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / speed_kmh * 60.0
}
