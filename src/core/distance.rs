use crate::models::Coordinate;

/// Earth's radius in meters
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Calculate the great-circle distance between two coordinates in meters
/// using the Haversine formula.
#[inline]
pub fn haversine_meters(from: Coordinate, to: Coordinate) -> f64 {
    let from_lat = from.lat.to_radians();
    let to_lat = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_distance() {
        let point = Coordinate { lat: 52.52, lng: 13.405 };
        assert!(haversine_meters(point, point) < 0.01);
    }

    #[test]
    fn test_haversine_london_to_paris() {
        // London to Paris is approximately 344 km
        let london = Coordinate { lat: 51.5074, lng: -0.1278 };
        let paris = Coordinate { lat: 48.8566, lng: 2.3522 };

        let distance = haversine_meters(london, paris);
        assert!(
            (distance - 344_000.0).abs() < 10_000.0,
            "Distance should be ~344km, got {}m",
            distance
        );
    }

    #[test]
    fn test_haversine_short_hop() {
        // Two points ~1.2km apart in Manhattan
        let a = Coordinate { lat: 40.7128, lng: -74.0060 };
        let b = Coordinate { lat: 40.7200, lng: -74.0100 };

        let distance = haversine_meters(a, b);
        assert!(distance > 500.0 && distance < 2_000.0, "got {}m", distance);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Coordinate { lat: 40.7128, lng: -74.0060 };
        let b = Coordinate { lat: 34.0522, lng: -118.2437 };

        let forward = haversine_meters(a, b);
        let backward = haversine_meters(b, a);
        assert!((forward - backward).abs() < 1e-6);
    }
}
