use super::types::{AmenityFact, Coordinate};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters (haversine).
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let d_phi = (b.lat() - a.lat()).to_radians();
    let d_lambda = (b.lng() - a.lng()).to_radians();

    // Rounding can push h just past 1 for antipodal points
    let h = ((d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2))
    .min(1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Nearest amenity to `origin`. On equal distance the earlier one wins.
pub fn nearest(origin: Coordinate, amenities: &[AmenityFact]) -> Option<(&AmenityFact, f64)> {
    let mut best: Option<(&AmenityFact, f64)> = None;
    for amenity in amenities {
        let d = distance_m(origin, amenity.coordinate);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((amenity, d)),
        }
    }
    best
}

/// Number of amenities within `radius_m` (inclusive).
pub fn count_within(origin: Coordinate, amenities: &[AmenityFact], radius_m: f64) -> usize {
    amenities
        .iter()
        .filter(|a| distance_m(origin, a.coordinate) <= radius_m)
        .count()
}
